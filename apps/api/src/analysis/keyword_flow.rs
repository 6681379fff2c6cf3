//! Standalone keyword-suggestion flow. Single model call, no tools.

use crate::analysis::flow::{run_flow, FlowError, FlowSpec};
use crate::analysis::prompts::{KEYWORDS_PROMPT_TEMPLATE, KEYWORDS_SYSTEM};
use crate::analysis::schema::{schema_text, KeywordFlowInput, KeywordSet};
use crate::llm_client::prompts::{
    fill_template, language_instruction, or_not_provided, output_contract_instruction,
    JSON_ONLY_SYSTEM,
};
use crate::llm_client::GenerativeModel;

pub const FLOW_NAME: &str = "keywordSuggestionFlow";

pub async fn run_keyword_suggestion(
    model: &dyn GenerativeModel,
    input: &KeywordFlowInput,
) -> Result<KeywordSet, FlowError> {
    let system = format!("{KEYWORDS_SYSTEM} {JSON_ONLY_SYSTEM}");
    run_flow(
        model,
        FlowSpec {
            name: FLOW_NAME,
            system: &system,
            prompt: build_keywords_prompt(input),
            tools: None,
        },
    )
    .await
}

pub fn build_keywords_prompt(input: &KeywordFlowInput) -> String {
    let input_lines = format!(
        "Tema: {}\nPaís: {}\nContenido: {}\nTono: {}\nVoz: {}\nEstilo de escritura: {}\n",
        input.topic,
        input.country,
        or_not_provided(input.content.as_deref()),
        or_not_provided(input.tone.as_deref()),
        or_not_provided(input.voice.as_deref()),
        or_not_provided(input.writing_style.as_deref()),
    );

    let language = language_instruction();
    let contract = output_contract_instruction(&schema_text::<KeywordSet>());

    fill_template(
        KEYWORDS_PROMPT_TEMPLATE,
        &[
            ("language_instruction", language.as_str()),
            ("input_lines", input_lines.as_str()),
            ("output_contract", contract.as_str()),
        ],
    )
}
