// Adapters layer: concrete implementations of the transport ports.

pub mod console;

pub use console::{run_console, ConsoleSender};
