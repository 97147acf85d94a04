use crate::core::broadcast::{BroadcastConfig, DEFAULT_MAX_AYAH, DEFAULT_PERIOD, MAX_AYAH_LIMIT};
use crate::core::fetcher::DEFAULT_BASE_URL;
use crate::core::{ConfigProvider, Translator};
use crate::utils::error::{BotError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub broadcast: BroadcastSection,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub default_translator: Translator,
    pub request_timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_translator: Translator::default(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastSection {
    pub enabled: bool,
    pub period_secs: u64,
    pub max_ayah: u16,
    pub translator: Translator,
}

impl Default for BroadcastSection {
    fn default() -> Self {
        Self {
            enabled: true,
            period_secs: DEFAULT_PERIOD.as_secs(),
            max_ayah: DEFAULT_MAX_AYAH,
            translator: Translator::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Chat id used for console lines that do not start with one.
    pub default_chat_id: i64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { default_chat_id: 1 }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BotError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BotError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Defaults when no file is given, otherwise the file contents.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn broadcast_config(&self) -> BroadcastConfig {
        BroadcastConfig {
            period: Duration::from_secs(self.broadcast.period_secs),
            max_ayah: self.broadcast.max_ayah,
            translator: self.broadcast.translator,
        }
    }
}

impl ConfigProvider for AppConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.request_timeout_secs.map(Duration::from_secs)
    }

    fn default_translator(&self) -> Translator {
        self.source.default_translator
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source.base_url", &self.source.base_url)?;

        if let Some(timeout) = self.source.request_timeout_secs {
            validate_positive_number("source.request_timeout_secs", timeout, 1)?;
        }

        validate_positive_number("broadcast.period_secs", self.broadcast.period_secs, 1)?;
        validate_range("broadcast.max_ayah", self.broadcast.max_ayah, 1, MAX_AYAH_LIMIT)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();

        assert_eq!(config.base_url(), "https://quran-online.ru");
        assert_eq!(config.default_translator(), Translator::Kuliev);
        assert!(config.request_timeout().is_none());
        assert!(config.broadcast.enabled);
        assert_eq!(config.broadcast_config().period, Duration::from_secs(86_400));
        assert_eq!(config.console.default_chat_id, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[source]
default_translator = "osmanov"
request_timeout_secs = 15

[broadcast]
period_secs = 3600
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_url(), "https://quran-online.ru");
        assert_eq!(config.default_translator(), Translator::Osmanov);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.broadcast.period_secs, 3600);
        assert_eq!(config.broadcast.max_ayah, 7);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("AYAT_BOT_TEST_SOURCE", "https://mirror.example.com");

        let toml_content = r#"
[source]
base_url = "${AYAT_BOT_TEST_SOURCE}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.base_url, "https://mirror.example.com");

        std::env::remove_var("AYAT_BOT_TEST_SOURCE");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = AppConfig::from_toml_str("[source]\nbase_url = \"not-a-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let zero_period = AppConfig::from_toml_str("[broadcast]\nperiod_secs = 0\n").unwrap();
        assert!(zero_period.validate().is_err());

        let zero_ayah = AppConfig::from_toml_str("[broadcast]\nmax_ayah = 0\n").unwrap();
        assert!(zero_ayah.validate().is_err());
    }

    #[test]
    fn test_max_ayah_upper_bound() {
        let longest = AppConfig::from_toml_str("[broadcast]\nmax_ayah = 286\n").unwrap();
        assert!(longest.validate().is_ok());

        let too_many = AppConfig::from_toml_str("[broadcast]\nmax_ayah = 300\n").unwrap();
        match too_many.validate() {
            Err(BotError::InvalidConfigValueError { field, value, .. }) => {
                assert_eq!(field, "broadcast.max_ayah");
                assert_eq!(value, "300");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_translator_is_rejected() {
        let result = AppConfig::from_toml_str("[source]\ndefault_translator = \"sahih\"\n");
        assert!(matches!(result, Err(BotError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[console]\ndefault_chat_id = 777\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.console.default_chat_id, 777);
    }
}
