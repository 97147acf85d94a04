use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid verse reference '{input}': {reason}")]
    InvalidReferenceError { input: String, reason: String },

    #[error("Invalid page selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },
}

impl BotError {
    pub fn invalid_reference(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReferenceError {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BotError::HttpError(_) => "Could not reach the verse source".to_string(),
            BotError::IoError(e) => format!("File system error: {}", e),
            BotError::ConfigValidationError { field, .. }
            | BotError::InvalidConfigValueError { field, .. } => {
                format!("Configuration problem with '{}'", field)
            }
            BotError::InvalidReferenceError { input, reason } => {
                format!("'{}' is not a valid verse reference: {}", input, reason)
            }
            BotError::SelectorError { .. } => "Internal parser setup failed".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BotError::HttpError(_) => "Check network connectivity and source.base_url",
            BotError::IoError(_) => "Make sure the config file exists and is readable",
            BotError::ConfigValidationError { .. } => "Fix the TOML syntax in the config file",
            BotError::InvalidConfigValueError { .. } => {
                "Correct the value in the config file or on the command line"
            }
            BotError::InvalidReferenceError { .. } => {
                "Use the surah:ayah format, e.g. 2:67, with surah between 1 and 114"
            }
            BotError::SelectorError { .. } => "This is a bug; please report it",
        }
    }
}

/// Why a single outbound message did not reach its recipient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("recipient {0} blocked the bot")]
    Blocked(i64),

    #[error("recipient {0} is unreachable")]
    Unreachable(i64),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
