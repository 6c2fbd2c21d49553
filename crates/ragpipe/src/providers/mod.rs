//! Provider abstractions for embeddings and answer generation
//!
//! Trait seams so the pipeline can run against a live Ollama server or
//! against stubs in tests.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm, OllamaProvider};
