use std::sync::Arc;

use crate::analysis::tools::ToolRegistry;
use crate::llm_client::GenerativeModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data, so concurrent analyses never share state.
#[derive(Clone)]
pub struct AppState {
    /// Generative model behind every flow. Default: LlmClient (Anthropic).
    pub model: Arc<dyn GenerativeModel>,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            tools: Arc::new(ToolRegistry::seo_defaults()),
        }
    }
}
