//! Capability tools — named actions the benchmark flow declares to the model.
//!
//! Each tool is also invokable on its own (`POST /api/v1/tools/:name`).
//! The current backends are deterministic, offline syntheses: no keyword volumes
//! are computed and no SERP is crawled. A real backend replaces `invoke` without
//! touching the flow or the contracts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::analysis::keywords::{Difficulty, KeywordSuggestion};
use crate::analysis::schema::{
    json_schema_of, AnalyzeContentInput, FunnelStep, KeywordSet, KeywordToolInput, SerpToolInput,
};
use crate::llm_client::prompts::{or_not_provided, OUTPUT_LANGUAGE};
use crate::llm_client::ToolSpec;

pub const ANALYZE_CONTENT: &str = "analyzeContent";
pub const SUGGEST_KEYWORDS: &str = "suggestKeywords";
pub const ANALYZE_SERP: &str = "analyzeSERP";

/// Number of organic results the SERP summary covers.
pub const SERP_DEPTH: usize = 20;

/// Longest excerpt of the user's draft quoted back in the content analysis.
const CONTENT_EXCERPT_CHARS: usize = 280;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input for {tool}: {source}")]
    InvalidInput {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode output of {tool}: {source}")]
    Output {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A named, independently invokable function exposed to the model.
#[async_trait]
pub trait CapabilityTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn input_schema(&self) -> Value;

    async fn invoke(&self, input: Value) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

fn parse_input<T: DeserializeOwned>(tool: &'static str, input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|source| ToolError::InvalidInput { tool, source })
}

// ────────────────────────────────────────────────────────────────────────────
// analyzeContent
// ────────────────────────────────────────────────────────────────────────────

pub struct AnalyzeContentTool;

#[async_trait]
impl CapabilityTool for AnalyzeContentTool {
    fn name(&self) -> &'static str {
        ANALYZE_CONTENT
    }

    fn description(&self) -> &'static str {
        "Analiza el contenido proporcionado basándose en el tema y el país para \
         identificar áreas de mejora. Toda la respuesta DEBE estar en ESPAÑOL."
    }

    fn input_schema(&self) -> Value {
        json_schema_of::<AnalyzeContentInput>()
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let input: AnalyzeContentInput = parse_input(ANALYZE_CONTENT, input)?;
        Ok(Value::String(analyze_content(&input)))
    }
}

/// Content critique text. Every absent field is named explicitly as not provided.
pub fn analyze_content(input: &AnalyzeContentInput) -> String {
    let content = match input.content.as_deref() {
        Some(text) => {
            let total = text.chars().count();
            let excerpt: String = text.chars().take(CONTENT_EXCERPT_CHARS).collect();
            let ellipsis = if total > CONTENT_EXCERPT_CHARS { "…" } else { "" };
            format!("{total} caracteres, comienza con \"{excerpt}{ellipsis}\"")
        }
        None => or_not_provided(None).to_string(),
    };

    let funnel = input
        .funnel_step
        .as_deref()
        .map(|step| FunnelStep::parse(step).map(FunnelStep::label).unwrap_or(step));

    format!(
        "Análisis del contenido sobre \"{topic}\" para {country}. \
         Contenido actual: {content}. \
         Objetivo: {objective}. \
         Audiencia: {audience}. \
         Etapa del funnel: {funnel}. \
         Revisar la calidad, la estructura de encabezados, la profundidad frente a la \
         intención de búsqueda y la relevancia para el mercado de {country}. \
         (Respuesta en {OUTPUT_LANGUAGE}.)",
        topic = input.topic,
        country = input.country,
        objective = or_not_provided(input.content_objective.as_deref()),
        audience = or_not_provided(input.target_audience.as_deref()),
        funnel = or_not_provided(funnel),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// suggestKeywords
// ────────────────────────────────────────────────────────────────────────────

pub struct SuggestKeywordsTool;

#[async_trait]
impl CapabilityTool for SuggestKeywordsTool {
    fn name(&self) -> &'static str {
        SUGGEST_KEYWORDS
    }

    fn description(&self) -> &'static str {
        "Sugiere palabras clave primarias, secundarias y LSI con volumen de búsqueda \
         estimado y dificultad de ranking, con el formato \
         \"palabra (volumen: NÚMERO, dificultad: baja/media/alta)\". El volumen debe ser \
         un número entero y la dificultad \"baja\", \"media\" o \"alta\". \
         Toda la respuesta DEBE estar en ESPAÑOL."
    }

    fn input_schema(&self) -> Value {
        json_schema_of::<KeywordToolInput>()
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let input: KeywordToolInput = parse_input(SUGGEST_KEYWORDS, input)?;
        serde_json::to_value(suggest_keywords(&input)).map_err(|source| ToolError::Output {
            tool: SUGGEST_KEYWORDS,
            source,
        })
    }
}

/// Keyword set for a topic. Every entry is built through `KeywordSuggestion`, so
/// the serialized strings always follow the volume/difficulty format.
pub fn suggest_keywords(input: &KeywordToolInput) -> KeywordSet {
    let topic = input.topic.trim().to_lowercase();

    KeywordSet {
        primary_keyword: Some(KeywordSuggestion::new(&topic, 1500, Difficulty::Media)),
        secondary_keywords: vec![
            KeywordSuggestion::new(&format!("qué es {topic}"), 700, Difficulty::Baja),
            KeywordSuggestion::new(&format!("mejores prácticas de {topic}"), 300, Difficulty::Alta),
        ],
        lsi_keywords: vec![
            KeywordSuggestion::new(&format!("guía de {topic}"), 100, Difficulty::Baja),
            KeywordSuggestion::new(&format!("herramientas para {topic}"), 50, Difficulty::Media),
        ],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// analyzeSERP
// ────────────────────────────────────────────────────────────────────────────

pub struct AnalyzeSerpTool;

#[async_trait]
impl CapabilityTool for AnalyzeSerpTool {
    fn name(&self) -> &'static str {
        ANALYZE_SERP
    }

    fn description(&self) -> &'static str {
        "Analiza los primeros 20 resultados de las SERPs para un tema y país dados, y \
         devuelve hallazgos clave para el posicionamiento: patrones comunes, tipos de \
         contenido dominantes y oportunidades. Toda la respuesta DEBE estar en ESPAÑOL."
    }

    fn input_schema(&self) -> Value {
        json_schema_of::<SerpToolInput>()
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let input: SerpToolInput = parse_input(ANALYZE_SERP, input)?;
        Ok(Value::String(analyze_serp(&input)))
    }
}

/// Summary of the hypothetical top `SERP_DEPTH` results. No network access.
pub fn analyze_serp(input: &SerpToolInput) -> String {
    format!(
        "Análisis SERP para \"{topic}\" en {country} (primeros {SERP_DEPTH} resultados): \
         identificar los tipos de contenido dominantes (artículos de blog, videos, páginas \
         de producto), la intención de búsqueda predominante (informativa o transaccional), \
         la autoridad estimada de los dominios principales y las brechas de contenido \
         aprovechables, como guías completas ausentes o subtemas poco cubiertos.",
        topic = input.topic,
        country = input.country,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// The set of tools a flow may declare. Cheap to clone.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn CapabilityTool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn CapabilityTool>>) -> Self {
        Self { tools }
    }

    /// The three SEO tools, in the order the benchmark prompt uses them.
    pub fn seo_defaults() -> Self {
        Self::new(vec![
            Arc::new(AnalyzeContentTool),
            Arc::new(SuggestKeywordsTool),
            Arc::new(AnalyzeSerpTool),
        ])
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CapabilityTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub async fn invoke(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!(tool = name, "invoking capability tool");
        tool.invoke(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::keywords::KEYWORD_PATTERN;
    use regex::Regex;
    use serde_json::json;

    fn topic_country(topic: &str, country: &str) -> Value {
        json!({ "topic": topic, "country": country })
    }

    #[test]
    fn test_analyze_content_marks_missing_fields() {
        let text = analyze_content(&AnalyzeContentInput {
            topic: "marketing digital".to_string(),
            country: "México".to_string(),
            content: None,
            content_objective: None,
            target_audience: None,
            funnel_step: None,
        });

        assert!(text.contains("\"marketing digital\""));
        assert!(text.contains("Contenido actual: No proporcionado"));
        assert!(text.contains("Objetivo: No proporcionado"));
        assert!(text.contains("Audiencia: No proporcionado"));
        assert!(text.contains("Etapa del funnel: No proporcionado"));
    }

    #[test]
    fn test_analyze_content_labels_known_funnel_and_excerpts_content() {
        let long = "a".repeat(CONTENT_EXCERPT_CHARS + 50);
        let text = analyze_content(&AnalyzeContentInput {
            topic: "café".to_string(),
            country: "Colombia".to_string(),
            content: Some(long),
            content_objective: Some("educar".to_string()),
            target_audience: None,
            funnel_step: Some("tofu".to_string()),
        });

        assert!(text.contains("TOFU / Descubrimiento"));
        assert!(text.contains(&format!("{} caracteres", CONTENT_EXCERPT_CHARS + 50)));
        assert!(text.contains('…'));
        assert!(text.contains("Objetivo: educar"));
    }

    #[test]
    fn test_suggest_keywords_follow_format() {
        let pattern = Regex::new(KEYWORD_PATTERN).unwrap();
        let set = suggest_keywords(&KeywordToolInput {
            topic: "Marketing Digital".to_string(),
            country: "México".to_string(),
        });

        let value = serde_json::to_value(&set).unwrap();
        let mut strings = vec![value["primaryKeyword"].as_str().unwrap().to_string()];
        for field in ["secondaryKeywords", "lsiKeywords"] {
            for s in value[field].as_array().unwrap() {
                strings.push(s.as_str().unwrap().to_string());
            }
        }

        assert_eq!(strings.len(), 5);
        for s in &strings {
            assert!(pattern.is_match(s), "{s:?} breaks the keyword format");
        }
        assert_eq!(
            strings[0],
            "marketing digital (volumen: 1500, dificultad: media)"
        );
    }

    #[test]
    fn test_suggest_keywords_survives_separator_in_topic() {
        let set = suggest_keywords(&KeywordToolInput {
            topic: "SEO (avanzado)".to_string(),
            country: "Chile".to_string(),
        });
        let value = serde_json::to_value(&set).unwrap();
        let back: KeywordSet = serde_json::from_value(value).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_analyze_serp_mentions_depth() {
        let text = analyze_serp(&SerpToolInput {
            topic: "recetas veganas".to_string(),
            country: "España".to_string(),
        });
        assert!(text.contains("primeros 20 resultados"));
        assert!(text.contains("España"));
    }

    #[tokio::test]
    async fn test_registry_invokes_by_name() {
        let registry = ToolRegistry::seo_defaults();

        let serp = registry
            .invoke(ANALYZE_SERP, topic_country("seo", "Perú"))
            .await
            .unwrap();
        assert!(serp.as_str().unwrap().contains("Perú"));

        let keywords = registry
            .invoke(SUGGEST_KEYWORDS, topic_country("seo", "Perú"))
            .await
            .unwrap();
        assert!(keywords["primaryKeyword"].is_string());
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_tool_and_bad_input() {
        let registry = ToolRegistry::seo_defaults();

        let unknown = registry.invoke("crawlWeb", json!({})).await;
        assert!(matches!(unknown, Err(ToolError::UnknownTool(name)) if name == "crawlWeb"));

        let bad = registry
            .invoke(ANALYZE_CONTENT, json!({ "topic": "seo" }))
            .await;
        assert!(matches!(
            bad,
            Err(ToolError::InvalidInput { tool: ANALYZE_CONTENT, .. })
        ));
    }

    #[test]
    fn test_specs_declare_object_schemas() {
        let specs = ToolRegistry::seo_defaults().specs();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![ANALYZE_CONTENT, SUGGEST_KEYWORDS, ANALYZE_SERP]);
        for spec in &specs {
            assert_eq!(spec.input_schema["type"], "object");
            assert!(spec.description.contains("ESPAÑOL"));
        }
    }
}
