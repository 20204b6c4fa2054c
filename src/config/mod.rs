//! Configuration management.
//!
//! Settings come from a TOML file, then environment variables override
//! individual keys. Every key is optional; a missing file yields defaults.

use crate::storage::DEFAULT_STORAGE_KEY;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for recordpro.
#[derive(Debug, Clone)]
pub struct RecordProConfig {
    /// Directory holding the record snapshot.
    pub data_dir: PathBuf,
    /// Name of the snapshot key.
    pub storage_key: String,
    /// AI provider configuration.
    pub ai: AiConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// AI provider configuration.
#[derive(Debug, Clone, Default)]
pub struct AiConfig {
    /// Provider to talk to.
    pub provider: AiProvider,
    /// Model name; the provider default when absent.
    pub model: Option<String>,
    /// API key; read from the provider's env variable when absent.
    pub api_key: Option<SecretString>,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Available AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    /// Google Gemini.
    #[default]
    Gemini,
    /// `OpenAI` GPT.
    OpenAi,
}

impl AiProvider {
    /// Parses a provider string. Unknown names fall back to Gemini.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "open-ai" => Self::OpenAi,
            _ => Self::Gemini,
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }
}

/// Logging settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directive, e.g. `info` or `recordpro=debug`.
    pub filter: Option<String>,
    /// Append log output to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Snapshot key.
    pub storage_key: Option<String>,
    /// AI configuration.
    pub ai: Option<ConfigFileAi>,
    /// Logging configuration.
    pub logging: Option<LoggingSettings>,
}

/// AI section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileAi {
    /// Provider name.
    pub provider: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for RecordProConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            ai: AiConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Platform data directory joined with `recordpro`, or `.recordpro`.
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".recordpro"),
        |dirs| dirs.data_dir().join("recordpro"),
    )
}

impl RecordProConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/recordpro/` on macOS)
    /// 2. XDG config dir (`~/.config/recordpro/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("recordpro").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("recordpro")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `RecordProConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = expand_home(&data_dir);
        }
        if let Some(key) = file.storage_key.filter(|k| !k.trim().is_empty()) {
            config.storage_key = key;
        }
        if let Some(ai) = file.ai {
            if let Some(provider) = ai.provider {
                config.ai.provider = AiProvider::parse(&provider);
            }
            config.ai.model = ai.model;
            config.ai.api_key = ai
                .api_key
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from);
            config.ai.base_url = ai.base_url;
            config.ai.timeout_ms = ai.timeout_ms;
            config.ai.connect_timeout_ms = ai.connect_timeout_ms;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies `RECORDPRO_*` environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = env_value("RECORDPRO_DATA_DIR") {
            self.data_dir = expand_home(&dir);
        }
        if let Some(provider) = env_value("RECORDPRO_AI_PROVIDER") {
            self.ai.provider = AiProvider::parse(&provider);
        }
        if let Some(model) = env_value("RECORDPRO_AI_MODEL") {
            self.ai.model = Some(model);
        }
        if let Some(timeout) = env_value("RECORDPRO_AI_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.ai.timeout_ms = Some(timeout);
        }
        if let Some(timeout) =
            env_value("RECORDPRO_AI_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok())
        {
            self.ai.connect_timeout_ms = Some(timeout);
        }
        if let Some(format) = env_value("RECORDPRO_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Returns the path of the snapshot file.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Expands a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config = RecordProConfig::default();
        assert_eq!(config.storage_key, "student_records");
        assert_eq!(config.ai.provider, AiProvider::Gemini);
        assert!(config.ai.api_key.is_none());
        assert!(config.data_dir.ends_with("recordpro"));
    }

    #[test]
    fn test_from_toml_full() {
        let config = RecordProConfig::from_toml(
            r#"
data_dir = "/srv/records"
storage_key = "cohort_2025"

[ai]
provider = "openai"
model = "gpt-4o"
api_key = "sk-test"
base_url = "http://localhost:8080/v1"
timeout_ms = 5000

[logging]
format = "json"
filter = "recordpro=debug"
"#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/records"));
        assert_eq!(config.storage_key, "cohort_2025");
        assert_eq!(config.ai.provider, AiProvider::OpenAi);
        assert_eq!(config.ai.model.as_deref(), Some("gpt-4o"));
        assert_eq!(
            config.ai.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("sk-test".to_string())
        );
        assert_eq!(config.ai.timeout_ms, Some(5000));
        assert_eq!(config.ai.connect_timeout_ms, None);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/srv/records/cohort_2025.json")
        );
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let config = RecordProConfig::from_toml("").unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        assert!(RecordProConfig::from_toml("storage_key = 5").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = RecordProConfig::load_from_file(Path::new("/nonexistent/recordpro.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("read_config_file"));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(AiProvider::parse("OpenAI"), AiProvider::OpenAi);
        assert_eq!(AiProvider::parse("gemini"), AiProvider::Gemini);
        assert_eq!(AiProvider::parse("unknown"), AiProvider::Gemini);
        assert_eq!(AiProvider::OpenAi.as_str(), "openai");
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = RecordProConfig::from_toml("[ai]\napi_key = \"  \"\n").unwrap();
        assert!(config.ai.api_key.is_none());
    }
}
