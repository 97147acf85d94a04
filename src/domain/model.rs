use crate::utils::error::{BotError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

pub const MIN_SURAH: u16 = 1;
pub const MAX_SURAH: u16 = 114;

pub const ARABIC_PLACEHOLDER: &str = "Verse not found";
pub const TRANSLATION_PLACEHOLDER: &str = "Translation unavailable";
pub const NO_COMMENTARY_AUTHOR: &str = "no data";
pub const NO_COMMENTARY_TEXT: &str = "commentary unavailable";

// "2:67", "2 : 67", "2:67 osmanov"
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,3})\s*:\s*(\d{1,4})(?:\s+([A-Za-z]+))?\s*$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Translator {
    #[default]
    Kuliev,
    Osmanov,
    Porohova,
}

impl Translator {
    pub const ALL: [Translator; 3] = [Translator::Kuliev, Translator::Osmanov, Translator::Porohova];

    /// Value of the `translator` query parameter on the source site.
    pub fn slug(&self) -> &'static str {
        match self {
            Translator::Kuliev => "kuliev",
            Translator::Osmanov => "osmanov",
            Translator::Porohova => "porohova",
        }
    }

    /// Display name; never sent over the network.
    pub fn label(&self) -> &'static str {
        match self {
            Translator::Kuliev => "Кулиев",
            Translator::Osmanov => "Османов",
            Translator::Porohova => "Порохова",
        }
    }
}

impl fmt::Display for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Translator {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Translator::ALL
            .into_iter()
            .find(|t| t.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Translator::ALL.iter().map(|t| t.slug()).collect();
                BotError::invalid_reference(
                    s,
                    format!("unknown translator, expected one of: {}", known.join(", ")),
                )
            })
    }
}

/// A (surah, ayah, translator) triple. Also the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VerseReference {
    surah: u16,
    ayah: u16,
    translator: Translator,
}

impl VerseReference {
    pub fn new(surah: u16, ayah: u16, translator: Translator) -> Result<Self> {
        if !(MIN_SURAH..=MAX_SURAH).contains(&surah) {
            return Err(BotError::invalid_reference(
                format!("{}:{}", surah, ayah),
                format!("surah must be between {} and {}", MIN_SURAH, MAX_SURAH),
            ));
        }
        if ayah == 0 {
            return Err(BotError::invalid_reference(
                format!("{}:{}", surah, ayah),
                "ayah must be a positive number",
            ));
        }
        Ok(Self {
            surah,
            ayah,
            translator,
        })
    }

    pub fn surah(&self) -> u16 {
        self.surah
    }

    pub fn ayah(&self) -> u16 {
        self.ayah
    }

    pub fn translator(&self) -> Translator {
        self.translator
    }

    pub fn with_translator(self, translator: Translator) -> Self {
        Self { translator, ..self }
    }

    /// Parses `S:A` with an optional trailing translator slug, falling back to `default_translator`.
    pub fn parse_with_default(input: &str, default_translator: Translator) -> Result<Self> {
        let caps = REFERENCE_RE
            .captures(input)
            .ok_or_else(|| BotError::invalid_reference(input, "expected the surah:ayah format"))?;

        let surah: u16 = caps[1]
            .parse()
            .map_err(|_| BotError::invalid_reference(input, "surah is not a number"))?;
        let ayah: u16 = caps[2]
            .parse()
            .map_err(|_| BotError::invalid_reference(input, "ayah is not a number"))?;
        let translator = match caps.get(3) {
            Some(m) => m.as_str().parse()?,
            None => default_translator,
        };

        Self::new(surah, ayah, translator)
    }
}

impl fmt::Display for VerseReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.surah, self.ayah)
    }
}

impl FromStr for VerseReference {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with_default(s, Translator::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    pub author: String,
    pub text: String,
}

impl Commentary {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(NO_COMMENTARY_AUTHOR, NO_COMMENTARY_TEXT)
    }
}

/// Parsed verse page. Built once per reference and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub arabic_text: String,
    pub translation_text: String,
    pub commentaries: Vec<Commentary>,
}

impl VerseRecord {
    /// Applies the placeholder fallbacks, so no field of the result is ever empty.
    pub fn new(
        arabic_text: Option<String>,
        translation_text: Option<String>,
        mut commentaries: Vec<Commentary>,
    ) -> Self {
        if commentaries.is_empty() {
            commentaries.push(Commentary::unavailable());
        }
        Self {
            arabic_text: non_empty_or(arabic_text, ARABIC_PLACEHOLDER),
            translation_text: non_empty_or(translation_text, TRANSLATION_PLACEHOLDER),
            commentaries,
        }
    }
}

fn non_empty_or(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder.to_string(),
    }
}

/// Opaque recipient address from the chat transport (a chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(pub i64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
