//! LLM client factory functions for CLI commands.
//!
//! Provides builders for creating LLM clients from configuration.

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::config::{AiConfig, AiProvider};
use crate::llm::{GeminiClient, LlmHttpConfig, LlmProvider, OpenAiClient};
use crate::services::AiGateway;

/// Builds HTTP configuration from AI config with environment overrides.
#[must_use]
pub fn build_http_config(ai_config: &AiConfig) -> LlmHttpConfig {
    LlmHttpConfig::from_config(ai_config).with_env_overrides()
}

/// Builds a Gemini client from configuration.
#[must_use]
pub fn build_gemini_client(ai_config: &AiConfig) -> GeminiClient {
    let mut client = GeminiClient::new();
    if let Some(ref api_key) = ai_config.api_key {
        client = client.with_api_key(api_key.expose_secret());
    }
    if let Some(ref model) = ai_config.model {
        client = client.with_model(model);
    }
    if let Some(ref base_url) = ai_config.base_url {
        client = client.with_endpoint(base_url);
    }
    client.with_http_config(build_http_config(ai_config))
}

/// Builds an `OpenAI` client from configuration.
#[must_use]
pub fn build_openai_client(ai_config: &AiConfig) -> OpenAiClient {
    let mut client = OpenAiClient::new();
    if let Some(ref api_key) = ai_config.api_key {
        client = client.with_api_key(api_key.expose_secret());
    }
    if let Some(ref model) = ai_config.model {
        client = client.with_model(model);
    }
    if let Some(ref base_url) = ai_config.base_url {
        client = client.with_endpoint(base_url);
    }
    client.with_http_config(build_http_config(ai_config))
}

/// Builds the configured provider.
#[must_use]
pub fn build_provider(ai_config: &AiConfig) -> Arc<dyn LlmProvider> {
    match ai_config.provider {
        AiProvider::Gemini => Arc::new(build_gemini_client(ai_config)),
        AiProvider::OpenAi => Arc::new(build_openai_client(ai_config)),
    }
}

/// Builds an AI gateway over the configured provider.
#[must_use]
pub fn build_gateway(ai_config: &AiConfig) -> AiGateway {
    AiGateway::new(build_provider(ai_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_build_provider_follows_config() {
        let mut config = AiConfig {
            api_key: Some(SecretString::from("test-key".to_string())),
            ..AiConfig::default()
        };
        assert_eq!(build_provider(&config).name(), "gemini");

        config.provider = AiProvider::OpenAi;
        assert_eq!(build_provider(&config).name(), "openai");
    }

    #[test]
    fn test_build_gemini_client_applies_overrides() {
        let config = AiConfig {
            model: Some("gemini-2.5-flash".to_string()),
            ..AiConfig::default()
        };
        assert_eq!(build_gemini_client(&config).model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_build_http_config_uses_config_timeouts() {
        let config = AiConfig {
            timeout_ms: Some(1234),
            connect_timeout_ms: Some(56),
            ..AiConfig::default()
        };
        let http = LlmHttpConfig::from_config(&config);
        assert_eq!(http.timeout_ms, 1234);
        assert_eq!(http.connect_timeout_ms, 56);
    }

    #[test]
    fn test_build_gateway_names_provider() {
        let gateway = build_gateway(&AiConfig::default());
        assert_eq!(gateway.provider_name(), Some("gemini"));
        assert!(!gateway.is_busy());
    }
}
