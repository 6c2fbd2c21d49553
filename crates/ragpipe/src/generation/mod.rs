//! Answer generation from retrieved context

pub mod prompt;

pub use prompt::{build_context, PromptTemplate};

use std::sync::Arc;

use crate::error::Result;
use crate::index::SearchResult;
use crate::providers::LlmProvider;

/// Renders a prompt from retrieved chunks and asks the LLM for an answer
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
    template: PromptTemplate,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            template: PromptTemplate::default(),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Answer `question` grounded only in the retrieved `context` chunks
    pub async fn answer(&self, question: &str, context: &[SearchResult]) -> Result<String> {
        let prompt = self.template.render(&build_context(context), question);
        tracing::debug!(
            model = self.llm.model(),
            prompt_len = prompt.len(),
            "generating answer"
        );
        self.llm.generate(&prompt).await
    }
}
