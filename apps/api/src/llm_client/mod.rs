/// LLM Client — the single point of entry for all generative-model calls in SEO Maestro.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module, either through `LlmClient`
/// or through the `GenerativeModel` trait it implements.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in SEO Maestro.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// True when the transport gave up waiting for the provider.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Http(e) if e.is_timeout())
    }

    /// True when the provider rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, LlmError::Api { status: 401 | 403, .. })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content. Block types we do not act on (thinking,
/// server tools, …) deserialize as `Unsupported` and are never sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Echoes an assistant turn back to the provider, dropping blocks it would reject.
    pub fn assistant(blocks: &[ContentBlock]) -> Self {
        Self {
            role: Role::Assistant,
            content: blocks
                .iter()
                .filter(|b| !matches!(b, ContentBlock::Unsupported))
                .cloned()
                .collect(),
        }
    }

    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// A callable action declared to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Everything a single model turn needs.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub system: &'a str,
    pub messages: &'a [ChatMessage],
    pub tools: &'a [ToolSpec],
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolSpec],
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Copy)]
pub struct ToolCall<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a Value,
}

impl LlmResponse {
    /// Concatenated text of every text block, or `None` when the turn had no text.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.concat())
        }
    }

    pub fn tool_calls(&self) -> Vec<ToolCall<'_>> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall { id, name, input }),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// GenerativeModel trait
// ────────────────────────────────────────────────────────────────────────────

/// The generative capability seen by the flows. `LlmClient` is the production
/// backend; tests swap in a scripted double.
///
/// Carried in `AppState` as `Arc<dyn GenerativeModel>`.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<LlmResponse, LlmError>;
}

/// The single LLM client used by all flows in SEO Maestro.
/// Wraps the Anthropic Messages API. Requests are sent once: the pipeline never retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    pub async fn call(&self, request: ModelRequest<'_>) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: request.system,
            messages: request.messages,
            tools: request.tools,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}, stop_reason={:?}",
            llm_response.usage.input_tokens,
            llm_response.usage.output_tokens,
            llm_response.stop_reason
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl GenerativeModel for LlmClient {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<LlmResponse, LlmError> {
        self.call(request).await
    }
}

/// Deserializes a model's final text answer as JSON.
/// The prompt must instruct the model to return valid JSON.
pub fn parse_json_output<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    // Strip markdown code fences if the model wraps JSON in them
    let text = json_object_span(strip_json_fences(text));

    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Narrows the text to its outermost `{ ... }`, dropping any lead-in sentence or
/// trailing fence the model wrapped around the object. Text without an object
/// is returned unchanged so the parser reports it.
fn json_object_span(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test double
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_output_skips_lead_in_and_fences() {
        let text = "Aquí tienes el resultado:\n```json\n{\"analysis\":\"ok\"}\n```";
        let value: Value = parse_json_output(text).unwrap();
        assert_eq!(value["analysis"], "ok");

        let trailing = "{\"analysis\":\"ok\"}\n\nEspero que te sirva.";
        let value: Value = parse_json_output(trailing).unwrap();
        assert_eq!(value["analysis"], "ok");
    }

    #[test]
    fn test_parse_json_output_without_object_is_parse_error() {
        let err = parse_json_output::<Value>("no hay JSON aquí").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_parse_json_output_rejects_blank_text() {
        let result: Result<Value, _> = parse_json_output("  ```json\n```  ");
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_response_with_tool_use_and_unknown_blocks_deserializes() {
        let body = json!({
            "content": [
                {"type": "thinking", "thinking": "...", "signature": "abc"},
                {"type": "text", "text": "Voy a analizar."},
                {"type": "tool_use", "id": "toolu_1", "name": "analyzeSERP",
                 "input": {"topic": "café", "country": "Colombia"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        let response: LlmResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.content[0], ContentBlock::Unsupported);
        assert_eq!(response.text().as_deref(), Some("Voy a analizar."));

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "analyzeSERP");
        assert_eq!(calls[0].input["country"], "Colombia");

        let echoed = ChatMessage::assistant(&response.content);
        assert_eq!(echoed.content.len(), 2);
    }

    #[test]
    fn test_tool_result_omits_is_error_when_false() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: "ok".to_string(),
            is_error: false,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert!(value.get("is_error").is_none());
    }

    #[test]
    fn test_request_omits_empty_tools() {
        let messages = vec![ChatMessage::user_text("hola")];
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: "sys",
            messages: &messages,
            tools: &[],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("tools").is_none());
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
    }

    #[test]
    fn test_auth_failure_detection() {
        let err = LlmError::Api {
            status: 401,
            message: "invalid x-api-key".to_string(),
        };
        assert!(err.is_auth_failure());
        assert!(!err.is_timeout());
    }
}
