// SEO content analysis engine
// Implements: capability tools, benchmark flow, keyword normalization, title/header flow,
// full-analysis orchestration, standalone keyword flow, Markdown export.
// All LLM calls go through llm_client; flows only see the GenerativeModel trait.

pub mod action;
pub mod benchmark;
pub mod export;
pub mod flow;
pub mod handlers;
pub mod keyword_flow;
pub mod keywords;
pub mod prompts;
pub mod schema;
pub mod titles;
pub mod tools;
