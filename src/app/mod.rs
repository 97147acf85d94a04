pub mod commands;
pub mod dispatcher;

pub use commands::Command;
pub use dispatcher::Dispatcher;
