//! Content benchmark flow.
//!
//! One prompt instructs the model to call analyzeContent → suggestKeywords →
//! analyzeSERP, then synthesize the DOFA and the overall analysis. The order is
//! a prompt convention; nothing schedules it. Output is all-or-nothing.

use tracing::info;

use crate::analysis::flow::{run_flow, FlowError, FlowSpec};
use crate::analysis::prompts::{BENCHMARK_PROMPT_TEMPLATE, BENCHMARK_SYSTEM};
use crate::analysis::schema::{schema_text, AnalysisRequest, BenchmarkResult};
use crate::analysis::tools::ToolRegistry;
use crate::llm_client::prompts::{
    fill_template, language_instruction, optional_line, output_contract_instruction,
    JSON_ONLY_SYSTEM, NOT_PROVIDED,
};
use crate::llm_client::GenerativeModel;

pub const FLOW_NAME: &str = "contentBenchmarkFlow";

pub async fn run_benchmark(
    model: &dyn GenerativeModel,
    tools: &ToolRegistry,
    request: &AnalysisRequest,
) -> Result<BenchmarkResult, FlowError> {
    let system = format!("{BENCHMARK_SYSTEM} {JSON_ONLY_SYSTEM}");
    let result: BenchmarkResult = run_flow(
        model,
        FlowSpec {
            name: FLOW_NAME,
            system: &system,
            prompt: build_benchmark_prompt(request),
            tools: Some(tools),
        },
    )
    .await?;

    info!(
        "Benchmark complete: primary_keyword={}, secondary={}, lsi={}",
        result.primary_keyword.is_some(),
        result.secondary_keywords.len(),
        result.lsi_keywords.len()
    );

    Ok(result)
}

/// Fills the benchmark template. Optional context appears only when provided.
pub fn build_benchmark_prompt(request: &AnalysisRequest) -> String {
    let funnel = request
        .funnel_stage()
        .map(|stage| stage.label())
        .or(request.funnel_step.as_deref());

    let context_lines = [
        format!("Tema: {}\n", request.topic),
        format!("País: {}\n", request.country),
        optional_line("Objetivo del Contenido", request.content_objective.as_deref()),
        optional_line("Público Objetivo", request.target_audience.as_deref()),
        optional_line("Etapa del Funnel", funnel),
        optional_line("Tono deseado", request.tone.as_deref()),
        optional_line("Voz deseada", request.voice.as_deref()),
        optional_line("Estilo de escritura deseado", request.writing_style.as_deref()),
        optional_line("Contenido existente", request.content.as_deref()),
    ]
    .concat();

    let language = language_instruction();
    let contract = output_contract_instruction(&schema_text::<BenchmarkResult>());

    fill_template(
        BENCHMARK_PROMPT_TEMPLATE,
        &[
            ("language_instruction", language.as_str()),
            ("topic", request.topic.as_str()),
            ("country", request.country.as_str()),
            (
                "content_objective",
                request.content_objective.as_deref().unwrap_or(NOT_PROVIDED),
            ),
            (
                "target_audience",
                request.target_audience.as_deref().unwrap_or(NOT_PROVIDED),
            ),
            ("funnel_step", funnel.unwrap_or(NOT_PROVIDED)),
            ("context_lines", context_lines.as_str()),
            ("output_contract", contract.as_str()),
        ],
    )
}
