use crate::app::commands::Command;
use crate::core::format::{lookup_message, not_found_message};
use crate::core::{SubscriberId, SubscriberRegistry, Translator, VerseFetcher, VerseReference};
use std::sync::Arc;

pub const WELCOME_TEXT: &str = "Assalamu alaikum! Send a verse reference like `2:67` \
(optionally followed by a translator, e.g. `2:67 osmanov`) and I will reply with the verse \
text, its translation and commentaries.\n\n\
📌 Commands:\n\
`/subscribe` - receive the verse of the day\n\
`/unsubscribe` - stop the daily verse\n\
`/translators` - list available translations";

/// Routes inbound commands to the verse lookup and the subscriber registry.
pub struct Dispatcher {
    fetcher: Arc<VerseFetcher>,
    registry: Arc<SubscriberRegistry>,
    default_translator: Translator,
}

impl Dispatcher {
    pub fn new(
        fetcher: Arc<VerseFetcher>,
        registry: Arc<SubscriberRegistry>,
        default_translator: Translator,
    ) -> Self {
        Self {
            fetcher,
            registry,
            default_translator,
        }
    }

    /// Handles one inbound message and returns the reply text.
    pub async fn handle(&self, from: SubscriberId, text: &str) -> String {
        let command = Command::parse(text, self.default_translator);
        tracing::debug!(chat = %from, ?command, "Dispatching command");
        self.execute(from, command).await
    }

    pub async fn execute(&self, from: SubscriberId, command: Command) -> String {
        match command {
            Command::Start | Command::Help => WELCOME_TEXT.to_string(),
            Command::Subscribe => self.subscribe(from),
            Command::Unsubscribe => self.unsubscribe(from),
            Command::Translators => translators_text(),
            Command::Lookup(reference) => self.lookup(&reference).await,
            Command::InvalidReference { input, reason } => format!(
                "⚠️ `{}` is not a valid reference: {}. Example: `2:67` or `2:67 osmanov`.",
                input, reason
            ),
            Command::Unknown(_) => {
                "🤔 I did not understand that. Send /help for the list of commands.".to_string()
            }
        }
    }

    pub async fn lookup(&self, reference: &VerseReference) -> String {
        match self.fetcher.resolve(reference).await {
            Some(record) => lookup_message(reference, &record),
            None => not_found_message(reference),
        }
    }

    pub fn subscribe(&self, id: SubscriberId) -> String {
        if self.registry.subscribe(id) {
            "✅ You are subscribed to the daily verse!".to_string()
        } else {
            "✅ You are already subscribed.".to_string()
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> String {
        if self.registry.unsubscribe(id) {
            "❌ You have unsubscribed from the daily verse.".to_string()
        } else {
            "You were not subscribed.".to_string()
        }
    }
}

fn translators_text() -> String {
    let lines: Vec<String> = Translator::ALL
        .iter()
        .map(|t| format!("`{}` - {}", t.slug(), t.label()))
        .collect();
    format!("📚 Available translations:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VerseCache;

    fn dispatcher() -> (Dispatcher, Arc<SubscriberRegistry>) {
        let cache = Arc::new(VerseCache::new());
        let fetcher = Arc::new(VerseFetcher::new("http://127.0.0.1:9", cache).unwrap());
        let registry = Arc::new(SubscriberRegistry::new());
        (
            Dispatcher::new(fetcher, Arc::clone(&registry), Translator::Kuliev),
            registry,
        )
    }

    #[tokio::test]
    async fn test_subscribe_flow() {
        let (dispatcher, registry) = dispatcher();
        let me = SubscriberId(5);

        assert!(dispatcher.handle(me, "/subscribe").await.contains("subscribed"));
        assert!(dispatcher.handle(me, "/subscribe").await.contains("already"));
        assert_eq!(registry.len(), 1);

        assert!(dispatcher.handle(me, "/unsubscribe").await.contains("unsubscribed"));
        assert!(dispatcher.handle(me, "/unsubscribe").await.contains("not subscribed"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_help_and_translators() {
        let (dispatcher, _) = dispatcher();

        assert_eq!(dispatcher.handle(SubscriberId(1), "/start").await, WELCOME_TEXT);
        let translators = dispatcher.handle(SubscriberId(1), "/translators").await;
        assert!(translators.contains("osmanov"));
        assert!(translators.contains("Порохова"));
    }

    #[tokio::test]
    async fn test_invalid_reference_reply() {
        let (dispatcher, _) = dispatcher();
        let reply = dispatcher.handle(SubscriberId(1), "300:1").await;
        assert!(reply.contains("not a valid reference"));
        assert!(reply.contains("surah must be between 1 and 114"));

        let reply = dispatcher.handle(SubscriberId(1), "2:67 sahih").await;
        assert!(reply.contains("unknown translator"));
        assert!(!reply.contains("surah must be"));
    }
}
