//! Markdown export of a finished analysis, plus the download filename.

use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::analysis::keywords::KeywordSuggestion;
use crate::analysis::schema::AnalysisResult;

pub const DEFAULT_EXPORT_TOPIC: &str = "analisis";
pub const DEFAULT_EXPORT_COUNTRY: &str = "general";

const NOT_AVAILABLE: &str = "N/A";

pub fn render_markdown(result: &AnalysisResult, generated_at: DateTime<Local>) -> String {
    let mut out = String::from("# Resultados del Análisis SEO Content Helper\n\n");
    let _ = write!(
        out,
        "Fecha del análisis: {}\n\n",
        generated_at.format("%d/%m/%Y %H:%M:%S")
    );

    if let Some(benchmark) = &result.benchmark {
        out.push_str("## Análisis de Contenido y Benchmarking\n\n");
        let analysis = if benchmark.analysis.trim().is_empty() {
            NOT_AVAILABLE
        } else {
            benchmark.analysis.as_str()
        };
        let _ = write!(out, "### Análisis General:\n{analysis}\n\n");

        if let Some(primary) = &benchmark.primary_keyword {
            let _ = write!(out, "### Palabra Clave Principal Sugerida:\n- {primary}\n\n");
        }
        keyword_section(
            &mut out,
            "Palabras Clave Secundarias Sugeridas",
            &benchmark.secondary_keywords,
        );
        keyword_section(&mut out, "Palabras Clave LSI Sugeridas", &benchmark.lsi_keywords);

        if let Some(serp) = benchmark.serp_analysis.as_deref().filter(|s| !s.trim().is_empty()) {
            let _ = write!(out, "## Análisis de Resultados de Búsqueda (SERP)\n\n{serp}\n\n");
        }
        if let Some(dofa) = benchmark.dofa_analysis.as_deref().filter(|s| !s.trim().is_empty()) {
            let _ = write!(out, "## Análisis DOFA\n\n{dofa}\n\n");
        }
    }

    if let Some(titles) = &result.titles_headers {
        out.push_str("## Sugerencias de Títulos y Encabezados (H1)\n\n");
        list_section(&mut out, "Títulos Sugeridos", &titles.title_suggestions);
        list_section(&mut out, "Encabezados H1 Sugeridos", &titles.header_suggestions);
    }

    out
}

fn keyword_section(out: &mut String, heading: &str, keywords: &[KeywordSuggestion]) {
    if keywords.is_empty() {
        return;
    }
    let _ = writeln!(out, "### {heading}:");
    for keyword in keywords {
        let _ = writeln!(out, "- {keyword}");
    }
    out.push('\n');
}

fn list_section(out: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(out, "### {heading}:");
    if items.is_empty() {
        let _ = writeln!(out, " {NOT_AVAILABLE}");
    } else {
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
    }
    out.push('\n');
}

/// `analisis_seo_<topic>_<country>.md`, with the submitted topic and country
/// when the result carries them.
pub fn export_filename_for(result: &AnalysisResult) -> String {
    let request = result.submitted_request.as_ref();
    let topic = request
        .map(|r| r.topic.as_str())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_EXPORT_TOPIC);
    let country = request
        .map(|r| r.country.as_str())
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(DEFAULT_EXPORT_COUNTRY);
    export_filename(topic, country)
}

pub fn export_filename(topic: &str, country: &str) -> String {
    format!(
        "analisis_seo_{}_{}.md",
        filename_safe(topic),
        filename_safe(country)
    )
}

fn filename_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
