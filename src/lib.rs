pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliArgs, Mode};

pub use app::Dispatcher;
pub use config::AppConfig;
pub use crate::core::broadcast::{
    BroadcastConfig, BroadcastHandle, BroadcastScheduler, CycleOutcome,
};
pub use crate::core::{
    SubscriberId, SubscriberRegistry, Translator, VerseCache, VerseFetcher, VerseRecord,
    VerseReference,
};
pub use utils::error::{BotError, DeliveryError, Result};
