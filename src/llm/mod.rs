//! LLM client abstraction.
//!
//! Provides a unified interface over the generative-AI providers the AI
//! gateway can talk to.

mod gemini;
mod openai;
mod schema;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use schema::ResponseSchema;

use crate::Result;
use std::time::Duration;

/// Trait for LLM providers.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// Generates free text for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be read.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Generates JSON text constrained by a declared schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be read.
    ///
    /// Default implementation embeds the schema in the prompt. Providers with
    /// native structured output should override this.
    fn complete_structured(&self, prompt: &str, schema: &ResponseSchema) -> Result<String> {
        let combined = format!(
            "{prompt}\n\nRespond only with JSON matching this JSON Schema:\n{}",
            schema.to_json_schema()
        );
        self.complete(&combined)
    }
}

/// HTTP client configuration for LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Loads HTTP configuration from config file settings.
    #[must_use]
    pub fn from_config(config: &crate::config::AiConfig) -> Self {
        let mut settings = Self::default();
        if let Some(timeout_ms) = config.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = config.connect_timeout_ms {
            settings.connect_timeout_ms = connect_timeout_ms;
        }
        settings
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(timeout_ms) = env_u64("RECORDPRO_AI_TIMEOUT_MS") {
            self.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = env_u64("RECORDPRO_AI_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = connect_timeout_ms;
        }
        self
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Builds a blocking HTTP client for LLM requests with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build LLM HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Names the failure class of a transport error, for logs.
fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else if e.is_decode() {
        "decode"
    } else {
        "unknown"
    }
}

/// Checks that an API key is safe to place in a request header.
fn is_header_safe_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_graphic())
}

/// Extracts JSON from an LLM response, handling markdown code blocks.
#[must_use]
pub fn extract_json_from_response(response: &str) -> &str {
    let trimmed = response.trim();

    // ```json ... ``` or plain ``` ... ``` fences
    if let Some(start) = trimmed.find("```") {
        let after_marker = &trimmed[start + 3..];
        let body_start = after_marker.strip_prefix("json").unwrap_or(after_marker);
        if let Some(end) = body_start.find("```") {
            return body_start[..end].trim();
        }
    }

    let first = trimmed.find(['[', '{']);
    let last = trimmed.rfind([']', '}']);
    match (first, last) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_raw_array() {
        let response = r#"[{"name": "Ann"}]"#;
        assert_eq!(extract_json_from_response(response), response);
    }

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n[{\"name\": \"Ann\"}]\n```";
        assert_eq!(extract_json_from_response(response), r#"[{"name": "Ann"}]"#);
    }

    #[test]
    fn test_extract_json_unlabelled_fence() {
        let response = "Here you go:\n```\n{\"key\": 1}\n```";
        assert_eq!(extract_json_from_response(response), r#"{"key": 1}"#);
    }

    #[test]
    fn test_extract_json_with_prose() {
        let response = "Sure! [1, 2, 3] hope this helps";
        assert_eq!(extract_json_from_response(response), "[1, 2, 3]");
    }

    #[test]
    fn test_extract_json_no_json() {
        assert_eq!(extract_json_from_response("  nothing  "), "nothing");
    }

    #[test]
    fn test_http_config_defaults() {
        let config = LlmHttpConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.connect_timeout_ms, 3_000);
    }

    #[test]
    fn test_is_header_safe_key() {
        assert!(is_header_safe_key("AIzaSyD-example_key"));
        assert!(!is_header_safe_key(""));
        assert!(!is_header_safe_key("key with space"));
        assert!(!is_header_safe_key("key\n"));
    }
}
