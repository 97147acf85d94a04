use crate::core::{Translator, VerseReference};
use crate::utils::error::{BotError, Result};

/// Inbound user command, parsed from a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Subscribe,
    Unsubscribe,
    Translators,
    Lookup(VerseReference),
    /// Looked like a lookup but the reference did not parse.
    InvalidReference { input: String, reason: String },
    Unknown(String),
}

impl Command {
    pub fn parse(text: &str, default_translator: Translator) -> Self {
        let text = text.trim();

        let Some(rest) = text.strip_prefix('/') else {
            return match lookup(text, default_translator) {
                Ok(reference) => Command::Lookup(reference),
                Err(e) if looks_like_reference(text) => invalid(text, e),
                Err(_) => Command::Unknown(text.to_string()),
            };
        };

        let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        // "/subscribe@my_bot" in group chats
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

        match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "subscribe" => Command::Subscribe,
            "unsubscribe" => Command::Unsubscribe,
            "translators" => Command::Translators,
            "ayah" | "ayat" => match lookup(args, default_translator) {
                Ok(reference) => Command::Lookup(reference),
                Err(e) => invalid(args.trim(), e),
            },
            _ => Command::Unknown(text.to_string()),
        }
    }
}

fn lookup(text: &str, default_translator: Translator) -> Result<VerseReference> {
    VerseReference::parse_with_default(text, default_translator)
}

fn invalid(input: &str, error: BotError) -> Command {
    let reason = match error {
        BotError::InvalidReferenceError { reason, .. } => reason,
        other => other.to_string(),
    };
    Command::InvalidReference {
        input: input.to_string(),
        reason,
    }
}

fn looks_like_reference(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit()) && text.contains(':')
}
