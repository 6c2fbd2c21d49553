//! ragpipe: retrieval-augmented question answering over local documents
//!
//! Loads a document source (web page, CSV, directory, JSON, Markdown, PDF),
//! splits it into overlapping chunks, embeds them with Ollama, and answers a
//! query by retrieving the most similar chunks and prompting an LLM with them.
//! The pipeline is strictly linear and runs once per invocation.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::{RagConfig, SearchMode};
pub use error::{Error, Result};
pub use index::{ChunkIndex, SearchResult};
pub use pipeline::RagPipeline;
pub use types::{Chunk, Document, SourceKind, SourceRef};
