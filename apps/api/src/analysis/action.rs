//! Full analysis — the single public entry point of the analysis pipeline.
//!
//! Flow: content benchmark → plain keyword extraction → title/header generation.
//!
//! Strictly sequential and all-or-nothing: a failure in either stage discards
//! everything computed so far and surfaces one localized `AnalysisError`.

use thiserror::Error;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::analysis::benchmark::run_benchmark;
use crate::analysis::flow::FlowError;
use crate::analysis::schema::{AnalysisRequest, AnalysisResult, TitleHeaderInput};
use crate::analysis::titles::run_title_headers;
use crate::analysis::tools::ToolRegistry;
use crate::llm_client::GenerativeModel;

pub const TIMEOUT_MESSAGE: &str =
    "La solicitud tardó demasiado tiempo en procesarse. Inténtalo de nuevo.";
pub const AUTH_MESSAGE: &str = "Hubo un problema de autenticación con el servicio de IA. \
    Por favor, verifica la configuración.";
pub const UNKNOWN_MESSAGE: &str = "Ocurrió un error desconocido durante el análisis.";

/// Why a pipeline run failed. Internal: callers only get the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    Timeout,
    Authentication,
    Generic,
    /// The error rendered to blank text. Every `FlowError` variant renders a
    /// non-empty message, so this only guards the message classifier itself.
    Unknown,
}

/// The only error the caller ever sees: a display string in the output language.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AnalysisError {
    kind: FailureKind,
    message: String,
}

impl AnalysisError {
    pub fn message(&self) -> &str {
        &self.message
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Classifies a flow failure and attaches the matching user message.
    pub fn from_flow(err: &FlowError) -> Self {
        let detail = err.to_string();
        let kind = classify(err);
        let message = match kind {
            FailureKind::Timeout => TIMEOUT_MESSAGE.to_string(),
            FailureKind::Authentication => AUTH_MESSAGE.to_string(),
            FailureKind::Generic => format!("Error al procesar la solicitud: {detail}"),
            FailureKind::Unknown => UNKNOWN_MESSAGE.to_string(),
        };
        Self { kind, message }
    }
}

/// Structured checks on the provider error first, then the message text.
pub(crate) fn classify(err: &FlowError) -> FailureKind {
    if let Some(llm) = err.llm_error() {
        if llm.is_timeout() {
            return FailureKind::Timeout;
        }
        if llm.is_auth_failure() {
            return FailureKind::Authentication;
        }
    }
    classify_message(&err.to_string())
}

pub(crate) fn classify_message(message: &str) -> FailureKind {
    if message.trim().is_empty() {
        return FailureKind::Unknown;
    }

    let lower = message.to_lowercase();
    if ["deadline", "timeout", "timed out"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        FailureKind::Timeout
    } else if ["api key", "api-key", "auth"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        FailureKind::Authentication
    } else {
        FailureKind::Generic
    }
}

/// Runs benchmark → title/header generation for one request.
///
/// `request` is expected to be normalized and validated by the caller.
pub async fn perform_full_analysis(
    model: &dyn GenerativeModel,
    tools: &ToolRegistry,
    request: AnalysisRequest,
) -> Result<AnalysisResult, AnalysisError> {
    let span = tracing::info_span!("analysis", request_id = %Uuid::new_v4());

    async move {
        info!(
            "Starting analysis: topic={:?}, country={:?}",
            request.topic, request.country
        );

        run_pipeline(model, tools, request).await.map_err(|e| {
            let err = AnalysisError::from_flow(&e);
            error!(kind = ?err.kind, "Error in full analysis: {e}");
            err
        })
    }
    .instrument(span)
    .await
}

async fn run_pipeline(
    model: &dyn GenerativeModel,
    tools: &ToolRegistry,
    request: AnalysisRequest,
) -> Result<AnalysisResult, FlowError> {
    // Stage 1: benchmark (tools: analyzeContent, suggestKeywords, analyzeSERP)
    let benchmark = run_benchmark(model, tools, &request).await?;

    // Stage 2: plain keywords + defaults bridge into the title/header input
    let titles_input = TitleHeaderInput::from_stages(&request, &benchmark);

    // Stage 3: titles and H1 headers
    let titles_headers = match run_title_headers(model, &titles_input).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Title/header stage failed; discarding completed benchmark");
            return Err(e);
        }
    };

    info!("Analysis complete");

    Ok(AnalysisResult {
        benchmark: Some(benchmark),
        titles_headers: Some(titles_headers),
        submitted_request: Some(request),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::keywords::KEYWORD_PATTERN;
    use crate::analysis::tools::{ANALYZE_CONTENT, ANALYZE_SERP, SUGGEST_KEYWORDS};
    use crate::llm_client::testing::{json_reply, tool_reply, ScriptedModel};
    use crate::llm_client::LlmError;
    use regex::Regex;
    use serde_json::{json, Value};

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            topic: "marketing digital".to_string(),
            country: "México".to_string(),
            ..Default::default()
        }
    }

    fn tool_round() -> Vec<Result<crate::llm_client::LlmResponse, LlmError>> {
        let args = json!({"topic": "marketing digital", "country": "México"});
        vec![Ok(tool_reply(vec![
            ("t1", ANALYZE_CONTENT, args.clone()),
            ("t2", SUGGEST_KEYWORDS, args.clone()),
            ("t3", ANALYZE_SERP, args),
        ]))]
    }

    fn benchmark_json(analysis: &str) -> Value {
        json!({
            "analysis": analysis,
            "primaryKeyword": "marketing digital (volumen: 1500, dificultad: media)",
            "secondaryKeywords": ["qué es marketing digital (volumen: 700, dificultad: baja)"],
            "lsiKeywords": ["guía de marketing digital (volumen: 100, dificultad: baja)"],
            "serpAnalysis": "Dominan guías extensas.",
            "dofaAnalysis": "Oportunidad: casos locales."
        })
    }

    fn titles_json() -> Value {
        json!({
            "titleSuggestions": ["Marketing Digital: la guía definitiva para pymes"],
            "headerSuggestions": ["Cómo empezar con el marketing digital"]
        })
    }

    #[tokio::test]
    async fn test_full_analysis_populates_every_section() {
        let mut replies = tool_round();
        replies.push(Ok(json_reply(&benchmark_json("Análisis general"))));
        replies.push(Ok(json_reply(&titles_json())));
        let model = ScriptedModel::new(replies);

        let result = perform_full_analysis(&model, &ToolRegistry::seo_defaults(), request())
            .await
            .unwrap();

        let benchmark = result.benchmark.unwrap();
        let pattern = Regex::new(KEYWORD_PATTERN).unwrap();
        assert!(pattern.is_match(&benchmark.primary_keyword.unwrap().to_string()));

        let titles = result.titles_headers.unwrap();
        assert!(titles
            .title_suggestions
            .iter()
            .any(|t| t.to_lowercase().contains("marketing digital")));
        assert_eq!(result.submitted_request.unwrap(), request());

        // Title stage received plain keywords, not formatted ones
        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        let title_prompt = requests[2].prompt();
        assert!(title_prompt.contains("Palabra Clave Principal: marketing digital\n"));
        assert!(title_prompt.contains("Palabras Clave Secundarias: qué es marketing digital\n"));
    }

    #[tokio::test]
    async fn test_empty_benchmark_analysis_uses_default_sentence() {
        let model = ScriptedModel::new(vec![
            Ok(json_reply(&benchmark_json(""))),
            Ok(json_reply(&titles_json())),
        ]);
        let request = AnalysisRequest {
            content: Some(String::new()),
            ..request()
        };

        perform_full_analysis(&model, &ToolRegistry::seo_defaults(), request)
            .await
            .unwrap();

        let title_prompt = model.requests()[1].prompt();
        assert!(title_prompt
            .contains("Contenido (puede incluir análisis SEO previo): Contenido sobre marketing digital.\n"));
    }

    #[tokio::test]
    async fn test_title_failure_discards_benchmark() {
        let model = ScriptedModel::new(vec![
            Ok(json_reply(&benchmark_json("Análisis"))),
            Err(LlmError::Api {
                status: 500,
                message: "internal".to_string(),
            }),
        ]);

        let err = perform_full_analysis(&model, &ToolRegistry::seo_defaults(), request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Generic);
        assert!(err.message().starts_with("Error al procesar la solicitud: "));
        assert!(err.message().contains("internal"));
    }

    #[tokio::test]
    async fn test_benchmark_failure_skips_title_stage() {
        let model = ScriptedModel::new(vec![Err(LlmError::Api {
            status: 401,
            message: "invalid x-api-key".to_string(),
        })]);

        let err = perform_full_analysis(&model, &ToolRegistry::seo_defaults(), request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Authentication);
        assert_eq!(err.message(), AUTH_MESSAGE);
        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure_is_independent() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::Api {
                status: 504,
                message: "upstream deadline exceeded".to_string(),
            }),
            Ok(json_reply(&benchmark_json("Análisis"))),
            Ok(json_reply(&titles_json())),
        ]);
        let tools = ToolRegistry::seo_defaults();

        let first = perform_full_analysis(&model, &tools, request()).await.unwrap_err();
        assert_eq!(first.kind(), FailureKind::Timeout);
        assert_eq!(first.message(), TIMEOUT_MESSAGE);

        let second = perform_full_analysis(&model, &tools, request()).await.unwrap();
        assert!(second.benchmark.is_some());
        assert!(second.titles_headers.is_some());
    }

    #[test]
    fn test_classify_message_categories() {
        assert_eq!(classify_message("Deadline exceeded"), FailureKind::Timeout);
        assert_eq!(classify_message("operation timed out"), FailureKind::Timeout);
        assert_eq!(classify_message("Invalid API key"), FailureKind::Authentication);
        assert_eq!(classify_message("401 invalid x-api-key"), FailureKind::Authentication);
        assert_eq!(classify_message("OAuth token expired"), FailureKind::Authentication);
        assert_eq!(classify_message("schema mismatch"), FailureKind::Generic);
        assert_eq!(classify_message("   "), FailureKind::Unknown);
    }

    #[test]
    fn test_flow_errors_never_classify_as_unknown() {
        let errors = [
            FlowError::Model {
                flow: "contentBenchmarkFlow",
                source: LlmError::EmptyContent,
            },
            FlowError::Contract {
                flow: "generateTitlesHeadersFlow",
                detail: String::new(),
            },
            FlowError::ToolRoundsExhausted {
                flow: "contentBenchmarkFlow",
                rounds: 8,
            },
        ];
        for err in &errors {
            assert_ne!(classify(err), FailureKind::Unknown, "{err}");
        }
        assert_eq!(
            AnalysisError {
                kind: classify_message(""),
                message: UNKNOWN_MESSAGE.to_string(),
            }
            .kind(),
            FailureKind::Unknown
        );
    }

    #[test]
    fn test_contract_violation_maps_to_generic_message() {
        let err = AnalysisError::from_flow(&FlowError::Contract {
            flow: "contentBenchmarkFlow",
            detail: "missing field `analysis`".to_string(),
        });
        assert_eq!(err.kind(), FailureKind::Generic);
        assert!(err.to_string().contains("missing field `analysis`"));
        assert!(!err.message().is_empty());
    }
}
