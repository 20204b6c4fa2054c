//! `OpenAI` client.
//!
//! Uses the Chat Completions API. Structured generation goes through the
//! `json_schema` response format, which only accepts object roots, so array
//! schemas are wrapped in an `items` property and unwrapped again on the way
//! back.

use super::{
    LlmHttpConfig, LlmProvider, ResponseSchema, build_http_client, error_kind,
    extract_json_from_response, is_header_safe_key,
};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Property name used to wrap non-object schemas.
const WRAPPER_PROPERTY: &str = "items";

/// `OpenAI` LLM client.
pub struct OpenAiClient {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// Token limit per completion.
    max_tokens: u32,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Default token limit.
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;

    /// Creates a new `OpenAI` client.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
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

    /// Sets the token limit per completion.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
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

    /// Validates that the client is configured.
    fn validate(&self) -> Result<&SecretString> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: "OPENAI_API_KEY not set".to_string(),
            })?;

        if !is_header_safe_key(key.expose_secret()) {
            return Err(Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: "Invalid API key format: unexpected characters".to_string(),
            });
        }

        Ok(key)
    }

    /// Checks if the model is a reasoning-family model.
    ///
    /// These take `max_completion_tokens` instead of `max_tokens` and only
    /// support the default temperature.
    fn is_reasoning_model(&self) -> bool {
        self.model.starts_with("gpt-5")
            || self.model.starts_with("o1")
            || self.model.starts_with("o3")
            || self.model.starts_with("o4")
    }

    /// Builds the request body.
    fn build_request(&self, prompt: &str, response_format: Option<Value>) -> ChatCompletionRequest {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }];

        if self.is_reasoning_model() {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: None,
                max_completion_tokens: Some(self.max_tokens),
                temperature: None,
                response_format,
            }
        } else {
            ChatCompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: Some(self.max_tokens),
                max_completion_tokens: None,
                temperature: Some(0.7),
                response_format,
            }
        }
    }

    /// Makes a request to the `OpenAI` API.
    fn request(&self, request: &ChatCompletionRequest) -> Result<String> {
        let api_key = self.validate()?;

        tracing::info!(provider = "openai", model = %self.model, "Making LLM request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .map_err(|e| {
                let kind = error_kind(&e);
                tracing::error!(
                    provider = "openai",
                    model = %self.model,
                    error = %e,
                    error_kind = kind,
                    "LLM request failed"
                );
                Error::OperationFailed {
                    operation: "openai_request".to_string(),
                    cause: format!("{kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "openai",
                model = %self.model,
                status = %status,
                body = %body,
                "LLM API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "openai_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: ChatCompletionResponse =
            response.json().map_err(|e| Error::OperationFailed {
                operation: "openai_response".to_string(),
                cause: e.to_string(),
            })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| Error::OperationFailed {
                operation: "openai_response".to_string(),
                cause: "No choices in response".to_string(),
            })
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt, None);
        self.request(&request)
    }

    fn complete_structured(&self, prompt: &str, schema: &ResponseSchema) -> Result<String> {
        let wrapped = !schema.is_object();
        let request = self.build_request(prompt, Some(response_format(schema)));
        let text = self.request(&request)?;

        if wrapped { unwrap_items(&text) } else { Ok(text) }
    }
}

/// Builds a `json_schema` response format, wrapping non-object roots.
fn response_format(schema: &ResponseSchema) -> Value {
    let rendered = if schema.is_object() {
        schema.to_json_schema()
    } else {
        let mut properties = Map::new();
        properties.insert(WRAPPER_PROPERTY.to_string(), schema.to_json_schema());
        json!({
            "type": "object",
            "properties": properties,
            "required": [WRAPPER_PROPERTY],
        })
    };

    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "structured_response",
            "schema": rendered,
        },
    })
}

/// Pulls the wrapped value back out of `{"items": ...}`.
fn unwrap_items(text: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(extract_json_from_response(text)).map_err(|e| {
            Error::OperationFailed {
                operation: "openai_structured_response".to_string(),
                cause: format!("Invalid JSON: {e}"),
            }
        })?;

    let inner = match value {
        Value::Object(mut map) => map.remove(WRAPPER_PROPERTY).unwrap_or(Value::Null),
        other => other,
    };
    Ok(inner.to_string())
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

/// A message sent in the chat.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

/// A message received in the chat. Refusals carry no content.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyless() -> OpenAiClient {
        OpenAiClient {
            api_key: None,
            endpoint: OpenAiClient::DEFAULT_ENDPOINT.to_string(),
            model: OpenAiClient::DEFAULT_MODEL.to_string(),
            max_tokens: OpenAiClient::DEFAULT_MAX_TOKENS,
            client: reqwest::blocking::Client::new(),
        }
    }

    #[test]
    fn test_client_configuration() {
        let client = keyless()
            .with_api_key("sk-test")
            .with_endpoint("https://custom.endpoint/")
            .with_model("gpt-4o")
            .with_max_tokens(512);

        assert_eq!(client.name(), "openai");
        assert_eq!(client.endpoint, "https://custom.endpoint");
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.max_tokens, 512);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_validate_no_key() {
        assert!(keyless().validate().is_err());
    }

    #[test]
    fn test_reasoning_model_detection() {
        assert!(keyless().with_model("gpt-5-mini").is_reasoning_model());
        assert!(keyless().with_model("o1-preview").is_reasoning_model());
        assert!(keyless().with_model("o3-mini").is_reasoning_model());
        assert!(!keyless().with_model("gpt-4o").is_reasoning_model());
        assert!(!keyless().with_model("gpt-3.5-turbo").is_reasoning_model());
    }

    #[test]
    fn test_build_request_token_fields() {
        let request = keyless().with_model("gpt-5").build_request("hi", None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["max_completion_tokens"], 2048);
        assert!(json.get("temperature").is_none());

        let request = keyless().build_request("hi", None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 2048);
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_response_format_wraps_array_root() {
        let schema = ResponseSchema::array(ResponseSchema::String);
        let format = response_format(&schema);
        assert_eq!(format["type"], "json_schema");
        let root = &format["json_schema"]["schema"];
        assert_eq!(root["type"], "object");
        assert_eq!(root["properties"]["items"]["type"], "array");
    }

    #[test]
    fn test_unwrap_items() {
        assert_eq!(unwrap_items(r#"{"items": [1, 2]}"#).unwrap(), "[1,2]");
        assert_eq!(unwrap_items("[3]").unwrap(), "[3]");
        assert_eq!(unwrap_items("{}").unwrap(), "null");
        assert!(unwrap_items("not json").is_err());
    }

    #[test]
    fn test_response_with_null_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
