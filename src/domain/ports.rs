use crate::domain::model::{SubscriberId, Translator, VerseRecord, VerseReference};
use crate::utils::error::{DeliveryError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Turns a fetched verse page into a record. Never fails: missing fragments become placeholders.
pub trait PageParser: Send + Sync {
    fn parse(&self, html: &str) -> VerseRecord;
}

/// Outbound half of the chat transport.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        recipient: SubscriberId,
        text: &str,
    ) -> std::result::Result<(), DeliveryError>;
}

/// Chooses the reference for the next broadcast.
pub trait ReferencePicker: Send + Sync {
    fn pick(&self) -> Result<VerseReference>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn default_translator(&self) -> Translator;
}
