//! Core types for the RAG pipeline

pub mod document;

pub use document::{hash_content, Chunk, Document, SourceKind, SourceRef};
