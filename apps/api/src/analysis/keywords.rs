//! Keyword suggestions and their display format.
//!
//! On the wire (and in every prompt) a suggestion is the single string
//! `"<keyword> (volumen: <n>, dificultad: <baja|media|alta>)"`. Internally it is a
//! structured record; the string is parsed once at the serde boundary, so a
//! malformed suggestion fails deserialization of the whole flow output.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject, StringValidation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::schema::BenchmarkResult;

/// Separates the keyword from its metadata. Plain keyword extraction splits here.
pub const METADATA_SEPARATOR: &str = " (";

/// Pattern of a complete suggestion string, as declared in the output schemas.
/// At most 19 digits, so every accepted volume fits in a `u64`.
pub const KEYWORD_PATTERN: &str = r"^.+ \(volumen: \d{1,19}, dificultad: (baja|media|alta)\)$";

/// Same shape as `KEYWORD_PATTERN`, with the keyword captured. The metadata is an
/// anchored suffix, so a keyword may itself contain parentheses.
static SUGGESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?) \(volumen: (\d{1,19}), dificultad: (baja|media|alta)\)$")
        .expect("keyword suggestion regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("keyword suggestion {0:?} does not match \"<keyword> (volumen: <n>, dificultad: baja|media|alta)\"")]
pub struct KeywordFormatError(pub String);

/// Ranking difficulty. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Baja,
    Media,
    Alta,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baja => "baja",
            Self::Media => "media",
            Self::Alta => "alta",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = KeywordFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baja" => Ok(Self::Baja),
            "media" => Ok(Self::Media),
            "alta" => Ok(Self::Alta),
            other => Err(KeywordFormatError(other.to_string())),
        }
    }
}

/// A suggested keyword with its estimated monthly volume and ranking difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeywordSuggestion {
    pub keyword: String,
    pub volume: u64,
    pub difficulty: Difficulty,
}

impl KeywordSuggestion {
    pub fn new(keyword: &str, volume: u64, difficulty: Difficulty) -> Self {
        Self {
            keyword: keyword.trim().to_string(),
            volume,
            difficulty,
        }
    }

    /// The bare keyword handed to later stages: the display string cut at the
    /// first `" ("`.
    pub fn plain(&self) -> &str {
        extract_keyword(&self.keyword)
    }
}

impl fmt::Display for KeywordSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (volumen: {}, dificultad: {})",
            self.keyword, self.volume, self.difficulty
        )
    }
}

impl FromStr for KeywordSuggestion {
    type Err = KeywordFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KeywordFormatError(s.to_string());

        let captures = SUGGESTION.captures(s.trim()).ok_or_else(invalid)?;
        let keyword = captures[1].trim();
        if keyword.is_empty() {
            return Err(invalid());
        }

        let volume = captures[2].parse::<u64>().map_err(|_| invalid())?;
        let difficulty = captures[3].parse::<Difficulty>()?;

        Ok(Self {
            keyword: keyword.to_string(),
            volume,
            difficulty,
        })
    }
}

impl TryFrom<String> for KeywordSuggestion {
    type Error = KeywordFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeywordSuggestion> for String {
    fn from(value: KeywordSuggestion) -> Self {
        value.to_string()
    }
}

impl JsonSchema for KeywordSuggestion {
    fn schema_name() -> String {
        "KeywordSuggestion".to_string()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                pattern: Some(KEYWORD_PATTERN.to_string()),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Plain keyword extraction
// ────────────────────────────────────────────────────────────────────────────

/// Leading keyword of a formatted suggestion: everything before the first `" ("`.
/// Total: a string without metadata is returned unchanged. This is the only
/// rule the title stage sees, so `"zapatillas (running) (volumen: …)"` yields
/// `"zapatillas"`.
pub fn extract_keyword(formatted: &str) -> &str {
    formatted
        .split_once(METADATA_SEPARATOR)
        .map(|(keyword, _)| keyword)
        .unwrap_or(formatted)
}

/// Plain keywords handed from the benchmark to the title/header flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainKeywords {
    pub primary: String,
    pub secondary: Vec<String>,
    pub lsi: Vec<String>,
}

impl PlainKeywords {
    /// Absent fields normalize to `""` / empty lists.
    pub fn from_benchmark(benchmark: &BenchmarkResult) -> Self {
        Self {
            primary: benchmark
                .primary_keyword
                .as_ref()
                .map(|k| k.plain().to_string())
                .unwrap_or_default(),
            secondary: plain(&benchmark.secondary_keywords),
            lsi: plain(&benchmark.lsi_keywords),
        }
    }

    pub fn secondary_joined(&self) -> String {
        self.secondary.join(", ")
    }

    pub fn lsi_joined(&self) -> String {
        self.lsi.join(", ")
    }
}

fn plain(suggestions: &[KeywordSuggestion]) -> Vec<String> {
    suggestions.iter().map(|k| k.plain().to_string()).collect()
}
