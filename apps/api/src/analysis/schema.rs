//! Schema contracts — the typed input/output shape of every flow and tool.
//!
//! Field descriptions are written for the model: the JSON schema generated from
//! these types is spliced verbatim into the prompts and the tool declarations,
//! so editing a description changes model behaviour.
//!
//! Construction from JSON rejects missing required fields and wrong primitive
//! kinds (string vs array vs optional). Nothing here checks cross-field rules.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::analysis::keywords::KeywordSuggestion;

/// Minimum trimmed length of `topic` accepted at the request boundary.
pub const MIN_TOPIC_CHARS: usize = 3;
/// Minimum trimmed length of `country` accepted at the request boundary.
pub const MIN_COUNTRY_CHARS: usize = 2;

pub const DEFAULT_TONE: &str = "neutral";
pub const DEFAULT_VOICE: &str = "informativa";
pub const DEFAULT_WRITING_STYLE: &str = "claro";

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

/// What the caller submits. Also the input contract of the benchmark flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[schemars(description = "El tema del contenido.")]
    pub topic: String,

    #[schemars(description = "El país de destino para el contenido.")]
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El contenido a analizar, si está disponible.")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "El objetivo principal del contenido (ej: educar, generar leads)."
    )]
    pub content_objective: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "El público específico al que se dirige el contenido (ej: emprendedores, madres jóvenes)."
    )]
    pub target_audience: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "La etapa del embudo de conversión a la que pertenece el contenido (ej: TOFU, MOFU, BOFU)."
    )]
    pub funnel_step: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El tono deseado del contenido.")]
    pub tone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "La voz deseada del contenido.")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El estilo de escritura deseado para el contenido.")]
    pub writing_style: Option<String>,
}

impl AnalysisRequest {
    /// Trims every field and turns blank optional fields into `None`.
    pub fn normalized(self) -> Self {
        Self {
            topic: self.topic.trim().to_string(),
            country: self.country.trim().to_string(),
            content: non_blank(self.content),
            content_objective: non_blank(self.content_objective),
            target_audience: non_blank(self.target_audience),
            funnel_step: non_blank(self.funnel_step),
            tone: non_blank(self.tone),
            voice: non_blank(self.voice),
            writing_style: non_blank(self.writing_style),
        }
    }

    /// Boundary rules for topic and country. Messages are user-facing.
    pub fn validate(&self) -> Result<(), String> {
        validate_topic_country(&self.topic, &self.country)
    }

    /// The recognized funnel stage, if `funnel_step` names one.
    pub fn funnel_stage(&self) -> Option<FunnelStep> {
        self.funnel_step.as_deref().and_then(FunnelStep::parse)
    }
}

pub(crate) fn validate_topic_country(topic: &str, country: &str) -> Result<(), String> {
    let mut problems = Vec::new();
    if topic.trim().chars().count() < MIN_TOPIC_CHARS {
        problems.push(format!(
            "El tema debe tener al menos {MIN_TOPIC_CHARS} caracteres."
        ));
    }
    if country.trim().chars().count() < MIN_COUNTRY_CHARS {
        problems.push(format!(
            "El país debe tener al menos {MIN_COUNTRY_CHARS} caracteres."
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join(" "))
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Stage of the marketing conversion funnel.
///
/// The contract keeps `funnelStep` a free string; this is only used to give
/// recognized values a readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunnelStep {
    Tofu,
    Mofu,
    Bofu,
}

impl FunnelStep {
    /// Case-insensitive; accepts `"tofu"`, `"TOFU"`, `"TOFU / Descubrimiento"`.
    pub fn parse(value: &str) -> Option<Self> {
        let head = value
            .trim()
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match head.as_str() {
            "tofu" => Some(Self::Tofu),
            "mofu" => Some(Self::Mofu),
            "bofu" => Some(Self::Bofu),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tofu => "TOFU / Descubrimiento",
            Self::Mofu => "MOFU / Consideración",
            Self::Bofu => "BOFU / Decisión",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Benchmark flow output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    #[schemars(description = "El análisis del contenido y sugerencias de mejora. En ESPAÑOL.")]
    pub analysis: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Palabra clave principal sugerida (formato: \"keyword (volumen: NÚMERO, dificultad: baja/media/alta)\"). En ESPAÑOL."
    )]
    pub primary_keyword: Option<KeywordSuggestion>,

    #[serde(
        default,
        deserialize_with = "nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    #[schemars(
        description = "Palabras clave secundarias sugeridas (formato: \"keyword (volumen: NÚMERO, dificultad: baja/media/alta)\"). En ESPAÑOL."
    )]
    pub secondary_keywords: Vec<KeywordSuggestion>,

    #[serde(
        default,
        deserialize_with = "nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    #[schemars(
        description = "Palabras clave LSI sugeridas (formato: \"keyword (volumen: NÚMERO, dificultad: baja/media/alta)\"). En ESPAÑOL."
    )]
    pub lsi_keywords: Vec<KeywordSuggestion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Hallazgos clave del análisis de los primeros 20 resultados de las SERPs. En ESPAÑOL."
    )]
    pub serp_analysis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Análisis DOFA (Debilidades, Oportunidades, Fortalezas, Amenazas) basado en toda la información. En ESPAÑOL."
    )]
    pub dofa_analysis: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Title/header flow
// ────────────────────────────────────────────────────────────────────────────

/// Input of the title/header flow. Built from the request and a finished
/// benchmark (see `TitleHeaderInput::from_stages`), never from raw form values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitleHeaderInput {
    #[schemars(description = "El tema del contenido.")]
    pub topic: String,

    #[schemars(
        description = "El país de destino. Solo da contexto sobre cómo se busca en esa región; NO debe incluirse en títulos ni encabezados salvo que el tema lo haga esencial."
    )]
    pub country: String,

    #[schemars(
        description = "El contenido a analizar. Puede incluir el análisis SEO previo del benchmark."
    )]
    pub content: String,

    #[schemars(description = "La palabra clave principal, sin metadatos.")]
    pub primary_keyword: String,

    #[schemars(description = "Palabras clave secundarias separadas por comas.")]
    pub secondary_keywords: String,

    #[schemars(description = "Palabras clave LSI separadas por comas.")]
    pub lsi_keywords: String,

    #[schemars(description = "El tono deseado (ej: formal, cercano, humorístico).")]
    pub tone: String,

    #[schemars(description = "La voz deseada (ej: autoritaria, amigable, profesional).")]
    pub voice: String,

    #[schemars(description = "El estilo de escritura deseado (ej: descriptivo, persuasivo).")]
    pub writing_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitleHeaderResult {
    #[schemars(description = "Títulos sugeridos para el contenido. En ESPAÑOL.")]
    pub title_suggestions: Vec<String>,

    #[schemars(description = "Encabezados H1 sugeridos para el contenido. En ESPAÑOL.")]
    pub header_suggestions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate
// ────────────────────────────────────────────────────────────────────────────

/// What the orchestration hands back to the caller. Built fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles_headers: Option<TitleHeaderResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_request: Option<AnalysisRequest>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tool contracts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeContentInput {
    #[schemars(description = "El tema del contenido.")]
    pub topic: String,

    #[schemars(description = "El país de destino para el contenido.")]
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El contenido a ser analizado, si está disponible.")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El objetivo del contenido.")]
    pub content_objective: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El público objetivo.")]
    pub target_audience: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "La etapa del funnel.")]
    pub funnel_step: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeywordToolInput {
    #[schemars(description = "El tema del contenido.")]
    pub topic: String,

    #[schemars(description = "El país de destino para el contenido.")]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SerpToolInput {
    #[schemars(description = "El tema para el cual analizar las SERPs.")]
    pub topic: String,

    #[schemars(description = "El país para el cual analizar las SERPs.")]
    pub country: String,
}

/// Keyword suggestions as produced by the keyword tool and the standalone keyword flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Palabra clave principal sugerida (formato: \"keyword (volumen: NÚMERO, dificultad: baja/media/alta)\"). En ESPAÑOL."
    )]
    pub primary_keyword: Option<KeywordSuggestion>,

    #[serde(
        default,
        deserialize_with = "nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    #[schemars(
        description = "Palabras clave secundarias sugeridas (formato: \"keyword (volumen: NÚMERO, dificultad: baja/media/alta)\"). En ESPAÑOL."
    )]
    pub secondary_keywords: Vec<KeywordSuggestion>,

    #[serde(
        default,
        deserialize_with = "nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    #[schemars(
        description = "Palabras clave LSI sugeridas (formato: \"keyword (volumen: NÚMERO, dificultad: baja/media/alta)\"). En ESPAÑOL."
    )]
    pub lsi_keywords: Vec<KeywordSuggestion>,
}

/// Input of the standalone keyword-suggestion flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeywordFlowInput {
    #[schemars(description = "El tema del contenido.")]
    pub topic: String,

    #[schemars(description = "El país de destino para el contenido.")]
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El contenido a analizar, si está disponible.")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El tono del contenido (ej: formal, informal).")]
    pub tone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "La voz del contenido (ej: autoritaria, amigable).")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "El estilo de escritura (ej: persuasivo, informativo).")]
    pub writing_style: Option<String>,
}

impl KeywordFlowInput {
    pub fn normalized(self) -> Self {
        Self {
            topic: self.topic.trim().to_string(),
            country: self.country.trim().to_string(),
            content: non_blank(self.content),
            tone: non_blank(self.tone),
            voice: non_blank(self.voice),
            writing_style: non_blank(self.writing_style),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_topic_country(&self.topic, &self.country)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Schema rendering
// ────────────────────────────────────────────────────────────────────────────

/// JSON schema of `T`, as declared to the model (tool `input_schema`).
pub fn json_schema_of<T: JsonSchema>() -> Value {
    let mut root = schema_for!(T);
    root.meta_schema = None;
    serde_json::to_value(root).unwrap_or_default()
}

/// Pretty JSON schema of `T` for splicing into prompt text.
pub fn schema_text<T: JsonSchema>() -> String {
    serde_json::to_string_pretty(&json_schema_of::<T>()).unwrap_or_default()
}

/// Accepts `null` where a list is expected; models emit it for "no suggestions".
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
