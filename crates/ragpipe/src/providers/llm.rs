//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Generates text from a fully rendered prompt
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run the model on a prompt and return its text answer
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check whether the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
