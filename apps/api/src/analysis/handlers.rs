//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::analysis::action::{perform_full_analysis, AnalysisError};
use crate::analysis::export::{export_filename_for, render_markdown};
use crate::analysis::keyword_flow::run_keyword_suggestion;
use crate::analysis::schema::{AnalysisRequest, AnalysisResult, KeywordFlowInput, KeywordSet};
use crate::errors::AppError;
use crate::llm_client::ToolSpec;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolSpec>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Runs benchmark → titles/headers. Either both sections come back or a single
/// localized error does.
pub async fn handle_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let request = request.normalized();
    request.validate().map_err(AppError::Validation)?;

    let result = perform_full_analysis(state.model.as_ref(), &state.tools, request).await?;

    Ok(Json(result))
}

/// POST /api/v1/analysis/export
///
/// Renders a previously returned AnalysisResult as a Markdown download.
pub async fn handle_export(Json(result): Json<AnalysisResult>) -> Response {
    let filename = export_filename_for(&result);
    let markdown = render_markdown(&result, Local::now());
    info!("Exporting analysis as {filename}");

    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        markdown,
    )
        .into_response()
}

/// POST /api/v1/keywords
pub async fn handle_keywords(
    State(state): State<AppState>,
    Json(input): Json<KeywordFlowInput>,
) -> Result<Json<KeywordSet>, AppError> {
    let input = input.normalized();
    input.validate().map_err(AppError::Validation)?;

    let keywords = run_keyword_suggestion(state.model.as_ref(), &input)
        .await
        .map_err(|e| {
            error!("Error in keyword suggestion: {e}");
            AnalysisError::from_flow(&e)
        })?;

    Ok(Json(keywords))
}

/// GET /api/v1/tools
pub async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.tools.specs(),
    })
}

/// POST /api/v1/tools/:name
///
/// Invokes one capability tool directly, outside any flow.
pub async fn handle_invoke_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let output = state.tools.invoke(&name, input).await?;
    Ok(Json(output))
}
