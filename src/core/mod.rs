pub mod broadcast;
pub mod cache;
pub mod fetcher;
pub mod format;
pub mod parser;
pub mod registry;

pub use crate::domain::model::{
    Commentary, SubscriberId, Translator, VerseRecord, VerseReference, MAX_SURAH, MIN_SURAH,
};
pub use crate::domain::ports::{ConfigProvider, MessageSender, PageParser, ReferencePicker};
pub use crate::utils::error::Result;
pub use cache::VerseCache;
pub use fetcher::VerseFetcher;
pub use registry::SubscriberRegistry;
