// All LLM prompt constants for the analysis flows.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for the content benchmark flow.
pub const BENCHMARK_SYSTEM: &str = "Eres un experto SEO y estratega de contenidos. \
    Usas las herramientas disponibles antes de responder y nunca inventas datos que \
    una herramienta puede proporcionar.";

/// Content benchmark prompt template.
/// Replace: {language_instruction}, {topic}, {country}, {content_objective},
///          {target_audience}, {funnel_step}, {context_lines}, {output_contract}
pub const BENCHMARK_PROMPT_TEMPLATE: &str = r#"{language_instruction}

El usuario quiere optimizar contenido para el tema "{topic}" en "{country}".
Considera también el objetivo del contenido "{content_objective}", el público objetivo "{target_audience}" y la etapa del funnel "{funnel_step}".

Sigue estos pasos EN ORDEN:
1. Analiza el contenido proporcionado (si existe) con la herramienta 'analyzeContent', pasando tema, país, contenido, objetivo, audiencia y etapa del funnel.
2. Sugiere palabras clave (principal, secundarias, LSI) con volumen de búsqueda estimado y dificultad de ranking usando la herramienta 'suggestKeywords' (solo tema y país). El formato es "palabra (volumen: NÚMERO, dificultad: baja/media/alta)", por ejemplo "marketing digital (volumen: 2500, dificultad: media)".
3. Analiza los primeros 20 resultados de las SERPs para el tema y país con la herramienta 'analyzeSERP' (solo tema y país). Identifica patrones, tipos de contenido dominantes y oportunidades de posicionamiento.
4. Con toda la información recopilada (análisis de contenido, palabras clave, SERPs, objetivo, audiencia y funnel), realiza un análisis DOFA (Debilidades, Oportunidades, Fortalezas, Amenazas) detallado y específico para la estrategia de contenido. Guárdalo en el campo 'dofaAnalysis'.
5. Redacta un análisis general ('analysis') que resuma los hallazgos, compare el contenido actual (si existe) y dé recomendaciones concretas para mejorar el ranking, integrando contenido, palabras clave, SERPs y DOFA.
6. Rellena 'serpAnalysis' con los hallazgos detallados de 'analyzeSERP'.
7. Todos los campos de palabras clave deben seguir EXACTAMENTE el formato "palabra (volumen: NÚMERO, dificultad: baja/media/alta)": volumen entero sin separadores de miles, dificultad en minúsculas.

Datos de entrada:
{context_lines}
{output_contract}"#;

/// System prompt for title/header generation.
pub const TITLES_SYSTEM: &str = "Eres un experto redactor SEO especializado en generar \
    títulos y encabezados atractivos y optimizados para artículos.";

/// Title/header prompt template.
/// Replace: {language_instruction}, {country}, {input_lines}, {tone}, {voice},
///          {writing_style}, {output_contract}
pub const TITLES_PROMPT_TEMPLATE: &str = r#"{language_instruction}

A partir de los detalles del contenido, el país de destino, las palabras clave SEO y las preferencias de estilo, genera una lista de títulos y de encabezados H1 adecuados.

Consideraciones importantes:
- El país de destino ({country}) se proporciona para darte contexto sobre cómo buscan los usuarios en esa región y sobre el mercado objetivo.
- NO incluyas el nombre del país ({country}) en los títulos ni en los encabezados H1, salvo que el análisis SEO (que puede venir en el 'Contenido') o la naturaleza del 'Tema' y la 'Palabra Clave Principal' lo hagan esencial. Por ejemplo, para "Los mejores restaurantes en {country}" sí sería apropiado; en la mayoría de los casos, evita mencionarlo.

Información de entrada:
{input_lines}
Requisitos:
- Los títulos deben ser llamativos e incorporar la palabra clave principal de forma natural.
- Los encabezados H1 deben ser claros, concisos, relevantes para el contenido e incorporar la palabra clave principal cuando sea pertinente.
- Refleja el tono ({tone}), la voz ({voice}) y el estilo de escritura ({writing_style}) indicados.
- Devuelve al menos un título y al menos un encabezado.

{output_contract}"#;

/// System prompt for the standalone keyword flow.
pub const KEYWORDS_SYSTEM: &str =
    "Eres un experto SEO especializado en investigación de palabras clave.";

/// Standalone keyword prompt template.
/// Replace: {language_instruction}, {input_lines}, {output_contract}
pub const KEYWORDS_PROMPT_TEMPLATE: &str = r#"{language_instruction}

Con el tema, el país de destino, el contenido, el tono, la voz y el estilo de escritura siguientes, sugiere una palabra clave principal, palabras clave secundarias y palabras clave LSI con su volumen de búsqueda estimado y su dificultad de ranking.

{input_lines}
Cada palabra clave DEBE tener el formato "palabra (volumen: NÚMERO, dificultad: baja/media/alta)".

{output_contract}"#;
