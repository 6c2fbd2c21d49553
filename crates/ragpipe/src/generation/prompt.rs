//! Prompt assembly from retrieved context

use crate::index::SearchResult;

const DEFAULT_TEMPLATE: &str = "Answer the following question in spanish based only on the provided context:\n\n<context>\n{context}\n</context>\n\nQuestion: {input}";

/// A template with `{context}` and `{input}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill the placeholders with retrieved context and the user question
    pub fn render(&self, context: &str, input: &str) -> String {
        self.template
            .replace("{context}", context)
            .replace("{input}", input)
    }
}

/// Join retrieved chunks into a single context block
pub fn build_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
