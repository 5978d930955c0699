use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::services::chat::{ChatLimits, DEFAULT_EXCERPT_SIZE, FREE_MESSAGE_LIMIT, MAX_INPUT_CHARS};
use crate::services::llm::{CompletionSettings, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3001 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { path: default_catalog_path() }
    }
}

fn default_catalog_path() -> String { "data/regional_services.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_excerpt_size")]
    pub excerpt_size: usize,
    #[serde(default = "default_free_message_limit")]
    pub free_message_limit: u32,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            excerpt_size: default_excerpt_size(),
            free_message_limit: default_free_message_limit(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl ChatSettings {
    pub fn completion(&self) -> CompletionSettings {
        CompletionSettings {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn limits(&self) -> ChatLimits {
        ChatLimits {
            free_message_limit: self.free_message_limit,
            max_input_chars: self.max_input_chars,
        }
    }
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_max_tokens() -> u32 { DEFAULT_MAX_TOKENS }
fn default_timeout_secs() -> u64 { 60 }
fn default_excerpt_size() -> usize { DEFAULT_EXCERPT_SIZE }
fn default_free_message_limit() -> u32 { FREE_MESSAGE_LIMIT }
fn default_max_input_chars() -> usize { MAX_INPUT_CHARS }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with DIRECTORY_)
    /// 5. `OPENAI_API_KEY`, for the chat key only
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., DIRECTORY_SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings = apply_api_key_override(settings, std::env::var("OPENAI_API_KEY").ok())?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("DIRECTORY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// The provider's conventional variable wins over the config file
fn apply_api_key_override(settings: Config, api_key: Option<String>) -> Result<Config, ConfigError> {
    let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
        return Ok(settings);
    };

    Config::builder()
        .add_source(settings)
        .set_override("chat.api_key", api_key)?
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_sources() {
        let settings: Settings = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.chat.model, "gpt-4-turbo-preview");
        assert_eq!(settings.chat.excerpt_size, 50);
        assert_eq!(settings.chat.free_message_limit, 5);
        assert_eq!(settings.chat.max_input_chars, 50);
        assert!(settings.chat.api_key.is_none());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\n\n[chat]\nmodel = \"gpt-4o-mini\"\nfree_message_limit = 10"
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.chat.model, "gpt-4o-mini");
        assert_eq!(settings.chat.limits().free_message_limit, 10);
        assert_eq!(settings.chat.limits().max_input_chars, 50);
    }

    #[test]
    fn test_api_key_override() {
        let base = Config::builder().build().unwrap();
        let settings: Settings = apply_api_key_override(base, Some("sk-test".to_string()))
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.chat.completion().api_key.as_deref(), Some("sk-test"));

        let base = Config::builder().build().unwrap();
        let settings: Settings = apply_api_key_override(base, Some(" ".to_string()))
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(settings.chat.api_key.is_none());
    }
}
