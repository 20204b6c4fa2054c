//! Google Gemini client.
//!
//! Talks to the Generative Language `generateContent` endpoint. Structured
//! generation uses the native `responseSchema` support, which accepts array
//! roots.

use super::{
    LlmHttpConfig, LlmProvider, ResponseSchema, build_http_client, error_kind, is_header_safe_key,
};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Gemini LLM client.
pub struct GeminiClient {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-3-flash-preview";

    /// Creates a new Gemini client.
    ///
    /// The API key is read from `GEMINI_API_KEY`, then `API_KEY`.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: build_http_client(LlmHttpConfig::from_env()),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Returns the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Validates that the client has a usable API key.
    fn validate(&self) -> Result<&SecretString> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::OperationFailed {
                operation: "gemini_request".to_string(),
                cause: "GEMINI_API_KEY not set".to_string(),
            })?;

        if !is_header_safe_key(key.expose_secret()) {
            return Err(Error::OperationFailed {
                operation: "gemini_request".to_string(),
                cause: "Invalid API key format: unexpected characters".to_string(),
            });
        }

        Ok(key)
    }

    /// Makes a `generateContent` request and returns the concatenated text.
    fn request(&self, prompt: &str, config: Option<GenerationConfig>) -> Result<String> {
        let api_key = self.validate()?;

        tracing::info!(provider = "gemini", model = %self.model, "Making LLM request");

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: config,
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.endpoint, self.model
            ))
            .header("x-goog-api-key", api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| {
                let kind = error_kind(&e);
                tracing::error!(
                    provider = "gemini",
                    model = %self.model,
                    error = %e,
                    error_kind = kind,
                    "LLM request failed"
                );
                Error::OperationFailed {
                    operation: "gemini_request".to_string(),
                    cause: format!("{kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "gemini",
                model = %self.model,
                status = %status,
                body = %body,
                "LLM API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "gemini_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: GenerateContentResponse = response.json().map_err(|e| {
            tracing::error!(
                provider = "gemini",
                model = %self.model,
                error = %e,
                "Failed to parse LLM response"
            );
            Error::OperationFailed {
                operation: "gemini_response".to_string(),
                cause: e.to_string(),
            }
        })?;

        Ok(response.text())
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(prompt, None)
    }

    fn complete_structured(&self, prompt: &str, schema: &ResponseSchema) -> Result<String> {
        self.request(
            prompt,
            Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.to_gemini_schema(),
            }),
        )
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// One conversation turn.
#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<RequestPart>,
}

/// A text part of a request turn.
#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

/// Structured output settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Response body from `generateContent`.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyless() -> GeminiClient {
        GeminiClient {
            api_key: None,
            endpoint: GeminiClient::DEFAULT_ENDPOINT.to_string(),
            model: GeminiClient::DEFAULT_MODEL.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    #[test]
    fn test_client_configuration() {
        let client = keyless()
            .with_api_key("AIza-test")
            .with_endpoint("https://custom.endpoint/v1/")
            .with_model("gemini-2.5-pro");

        assert_eq!(client.name(), "gemini");
        assert_eq!(client.endpoint, "https://custom.endpoint/v1");
        assert_eq!(client.model(), "gemini-2.5-pro");
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_validate_no_key() {
        let err = keyless().validate().unwrap_err();
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn test_validate_rejects_unsafe_key() {
        let client = keyless().with_api_key("bad key\n");
        assert!(client.validate().is_err());
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![RequestPart {
                    text: "hi".to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: ResponseSchema::String.to_gemini_schema(),
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "STRING");
    }

    #[test]
    fn test_request_without_config_omits_field() {
        let request = GenerateContentRequest {
            contents: Vec::new(),
            generation_config: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), "Hello, world");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
    }
}
