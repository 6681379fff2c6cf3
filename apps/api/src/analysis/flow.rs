//! Flow runner — one prompt/response cycle against the generative model.
//!
//! The model may answer with tool calls; those are executed in order against the
//! flow's registry and fed back until the model produces its final JSON answer.
//! The answer is deserialized into the flow's output contract. Any failure ends
//! the flow with a single `FlowError`: there is no partial output.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::tools::ToolRegistry;
use crate::llm_client::{
    parse_json_output, ChatMessage, ContentBlock, GenerativeModel, LlmError, ModelRequest,
};

/// Upper bound on model turns that request tools within one flow.
pub const MAX_TOOL_ROUNDS: usize = 8;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{flow} failed: {source}")]
    Model {
        flow: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("{flow} returned output that violates its contract: {detail}")]
    Contract { flow: &'static str, detail: String },

    #[error("{flow} did not produce an answer after {rounds} tool rounds")]
    ToolRoundsExhausted { flow: &'static str, rounds: usize },
}

impl FlowError {
    /// The provider error underneath, when the model call itself failed.
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            FlowError::Model { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// What a flow sends to the model.
pub struct FlowSpec<'a> {
    pub name: &'static str,
    pub system: &'a str,
    pub prompt: String,
    /// Tools declared to the model; `None` for single-shot flows.
    pub tools: Option<&'a ToolRegistry>,
}

pub async fn run_flow<T: DeserializeOwned>(
    model: &dyn GenerativeModel,
    spec: FlowSpec<'_>,
) -> Result<T, FlowError> {
    let flow = spec.name;
    let tool_specs = spec.tools.map(ToolRegistry::specs).unwrap_or_default();
    let mut messages = vec![ChatMessage::user_text(spec.prompt)];
    let mut tool_rounds = 0;

    loop {
        let response = model
            .complete(ModelRequest {
                system: spec.system,
                messages: &messages,
                tools: &tool_specs,
            })
            .await
            .map_err(|source| FlowError::Model { flow, source })?;

        let calls = response.tool_calls();

        if calls.is_empty() {
            let text = response.text().ok_or(FlowError::Model {
                flow,
                source: LlmError::EmptyContent,
            })?;
            return parse_json_output::<T>(&text).map_err(|e| match e {
                LlmError::Parse(err) => FlowError::Contract {
                    flow,
                    detail: err.to_string(),
                },
                other => FlowError::Model {
                    flow,
                    source: other,
                },
            });
        }

        let Some(registry) = spec.tools else {
            return Err(FlowError::Contract {
                flow,
                detail: "model requested tools but the flow declares none".to_string(),
            });
        };

        if tool_rounds == MAX_TOOL_ROUNDS {
            return Err(FlowError::ToolRoundsExhausted {
                flow,
                rounds: MAX_TOOL_ROUNDS,
            });
        }
        tool_rounds += 1;

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            debug!(flow, tool = call.name, round = tool_rounds, "model requested tool");
            let block = match registry.invoke(call.name, call.input.clone()).await {
                Ok(output) => ContentBlock::ToolResult {
                    tool_use_id: call.id.to_string(),
                    content: render_tool_output(output),
                    is_error: false,
                },
                Err(e) => {
                    warn!(flow, tool = call.name, "tool call failed: {e}");
                    ContentBlock::ToolResult {
                        tool_use_id: call.id.to_string(),
                        content: e.to_string(),
                        is_error: true,
                    }
                }
            };
            results.push(block);
        }

        messages.push(ChatMessage::assistant(&response.content));
        messages.push(ChatMessage::tool_results(results));
    }
}

/// Tool results travel as text: strings verbatim, anything else as compact JSON.
fn render_tool_output(output: Value) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
