//! Title/header flow — turns a finished benchmark into title and H1 candidates.
//!
//! The input can only be built from a request plus its `BenchmarkResult`, so the
//! dependency on the benchmark stage is carried by the types.

use tracing::info;

use crate::analysis::flow::{run_flow, FlowError, FlowSpec};
use crate::analysis::keywords::PlainKeywords;
use crate::analysis::prompts::{TITLES_PROMPT_TEMPLATE, TITLES_SYSTEM};
use crate::analysis::schema::{
    schema_text, AnalysisRequest, BenchmarkResult, TitleHeaderInput, TitleHeaderResult,
    DEFAULT_TONE, DEFAULT_VOICE, DEFAULT_WRITING_STYLE,
};
use crate::llm_client::prompts::{
    fill_template, language_instruction, output_contract_instruction, JSON_ONLY_SYSTEM,
};
use crate::llm_client::GenerativeModel;

pub const FLOW_NAME: &str = "generateTitlesHeadersFlow";

impl TitleHeaderInput {
    /// Bridges the two stages: plain keywords from the benchmark, style defaults
    /// for anything the request left out, and a content excerpt that is never empty.
    pub fn from_stages(request: &AnalysisRequest, benchmark: &BenchmarkResult) -> Self {
        let keywords = PlainKeywords::from_benchmark(benchmark);

        Self {
            topic: request.topic.clone(),
            country: request.country.clone(),
            content: content_for_titles(request, benchmark),
            primary_keyword: keywords.primary.clone(),
            secondary_keywords: keywords.secondary_joined(),
            lsi_keywords: keywords.lsi_joined(),
            tone: style_or(request.tone.as_deref(), DEFAULT_TONE),
            voice: style_or(request.voice.as_deref(), DEFAULT_VOICE),
            writing_style: style_or(request.writing_style.as_deref(), DEFAULT_WRITING_STYLE),
        }
    }
}

/// The draft if there is one, else the benchmark analysis, else a sentence about the topic.
pub fn content_for_titles(request: &AnalysisRequest, benchmark: &BenchmarkResult) -> String {
    [request.content.as_deref(), Some(benchmark.analysis.as_str())]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Contenido sobre {}.", request.topic))
}

fn style_or(value: Option<&str>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

pub async fn run_title_headers(
    model: &dyn GenerativeModel,
    input: &TitleHeaderInput,
) -> Result<TitleHeaderResult, FlowError> {
    let system = format!("{TITLES_SYSTEM} {JSON_ONLY_SYSTEM}");
    let result: TitleHeaderResult = run_flow(
        model,
        FlowSpec {
            name: FLOW_NAME,
            system: &system,
            prompt: build_titles_prompt(input),
            tools: None,
        },
    )
    .await?;

    if result.title_suggestions.is_empty() || result.header_suggestions.is_empty() {
        return Err(FlowError::Contract {
            flow: FLOW_NAME,
            detail: "titleSuggestions and headerSuggestions must both be non-empty".to_string(),
        });
    }

    info!(
        "Generated {} titles and {} headers",
        result.title_suggestions.len(),
        result.header_suggestions.len()
    );

    Ok(result)
}

pub fn build_titles_prompt(input: &TitleHeaderInput) -> String {
    let input_lines = format!(
        "Tema: {}\n\
         País (para contexto): {}\n\
         Contenido (puede incluir análisis SEO previo): {}\n\
         Palabra Clave Principal: {}\n\
         Palabras Clave Secundarias: {}\n\
         Palabras Clave LSI: {}\n\
         Tono deseado: {}\n\
         Voz deseada: {}\n\
         Estilo de Escritura deseado: {}\n",
        input.topic,
        input.country,
        input.content,
        input.primary_keyword,
        input.secondary_keywords,
        input.lsi_keywords,
        input.tone,
        input.voice,
        input.writing_style,
    );

    let language = language_instruction();
    let contract = output_contract_instruction(&schema_text::<TitleHeaderResult>());

    fill_template(
        TITLES_PROMPT_TEMPLATE,
        &[
            ("language_instruction", language.as_str()),
            ("country", input.country.as_str()),
            ("input_lines", input_lines.as_str()),
            ("tone", input.tone.as_str()),
            ("voice", input.voice.as_str()),
            ("writing_style", input.writing_style.as_str()),
            ("output_contract", contract.as_str()),
        ],
    )
}
