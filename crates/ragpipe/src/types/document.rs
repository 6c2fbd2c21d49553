//! Document and chunk types with source tracking

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Supported document source kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// HTTP-fetchable web page
    Web,
    /// CSV file (one document per row)
    Csv,
    /// Directory of supported files
    Directory,
    /// JSON file with a fixed field path
    Json,
    /// Markdown file
    Markdown,
    /// PDF file
    Pdf,
    /// Plain text file (directory walks only)
    Text,
}

impl SourceKind {
    /// Detect source kind from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "md" | "markdown" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// Display name for status lines
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Web => "web page",
            Self::Csv => "CSV",
            Self::Directory => "directory",
            Self::Json => "JSON",
            Self::Markdown => "Markdown",
            Self::Pdf => "PDF",
            Self::Text => "text",
        }
    }
}

/// Where a document (and every chunk cut from it) came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// URL or filesystem path
    pub location: String,
    /// Kind of source
    pub kind: SourceKind,
    /// Total pages in the source document (PDF only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Row number (1-indexed, CSV only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
}

impl SourceRef {
    /// Create a source reference with no page/row position
    pub fn new(location: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            location: location.into(),
            kind,
            page_count: None,
            row: None,
        }
    }

    /// Source reference for a CSV row
    pub fn csv_row(location: impl Into<String>, row: u32) -> Self {
        Self {
            location: location.into(),
            kind: SourceKind::Csv,
            page_count: None,
            row: Some(row),
        }
    }
}

/// A loaded document: raw text plus source metadata
///
/// Immutable once loaded; identity is the generated id, equality of interest
/// is content equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Raw text content
    pub content: String,
    /// Source identifier and optional position
    pub source: SourceRef,
    /// Content hash for deduplication
    pub content_hash: String,
    /// Load timestamp
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document, hashing its content
    pub fn new(content: String, source: SourceRef) -> Self {
        let content_hash = hash_content(&content);
        Self {
            id: Uuid::new_v4(),
            content,
            source,
            content_hash,
            loaded_at: chrono::Utc::now(),
        }
    }
}

/// A bounded-length fragment of a document, the unit of embedding and retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Position within the parent document (ordering is preserved)
    pub chunk_index: u32,
    /// Text content (substring of the parent document)
    pub content: String,
    /// Inherited source metadata
    pub source: SourceRef,
    /// Embedding vector; empty until the embedder has run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a chunk without an embedding
    pub fn new(document_id: Uuid, chunk_index: u32, content: String, source: SourceRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            chunk_index,
            content,
            source,
            embedding: Vec::new(),
        }
    }
}

/// Hash content for deduplication
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
