// Shared prompt constants and prompt-building utilities.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"));

/// Fills `{name}` placeholders in one pass over the template. Substituted values
/// are never scanned again, so user text that looks like a placeholder stays
/// literal. Unknown placeholders are left as written.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// The language every generated field is written in. Process-wide, never per request.
pub const OUTPUT_LANGUAGE: &str = "ESPAÑOL";

/// System prompt fragment that enforces JSON-only final answers.
pub const JSON_ONLY_SYSTEM: &str = "Tu respuesta final DEBE ser únicamente un objeto JSON válido. \
    NO incluyas texto fuera del objeto JSON. \
    NO uses bloques de código markdown. \
    NO incluyas explicaciones ni disculpas.";

/// Instruction appended to every prompt that produces user-visible text.
pub fn language_instruction() -> String {
    format!(
        "IMPORTANTE: Toda tu respuesta DEBE estar en {OUTPUT_LANGUAGE}, \
         sin importar el idioma de los datos de entrada."
    )
}

/// Instruction that splices the output JSON schema into the prompt.
pub fn output_contract_instruction(schema_json: &str) -> String {
    format!(
        "Devuelve un objeto JSON que cumpla EXACTAMENTE este esquema \
         (las descripciones de cada campo son instrucciones obligatorias):\n{schema_json}"
    )
}

/// Marker substituted for optional context the user did not provide.
pub const NOT_PROVIDED: &str = "No proporcionado";

/// Renders an optional value for a prompt, falling back to the "not provided" marker.
pub fn or_not_provided(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_PROVIDED)
}

/// Renders `"<label>: <value>\n"` when the value is present, nothing otherwise.
pub fn optional_line(label: &str, value: Option<&str>) -> String {
    value
        .map(|v| format!("{label}: {v}\n"))
        .unwrap_or_default()
}
