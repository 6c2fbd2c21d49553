//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::SourceKind;

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Document source
    #[serde(default)]
    pub source: SourceConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Index snapshot configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Query used when the CLI is invoked without arguments
    #[serde(default = "default_query")]
    pub default_query: String,
}

fn default_query() -> String {
    "que paso en la primera tetrarquia?".to_string()
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            chunking: ChunkingConfig::default(),
            llm: LlmConfig::default(),
            retrieval: RetrievalConfig::default(),
            index: IndexConfig::default(),
            default_query: default_query(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load from `$RAGPIPE_CONFIG`, then `./ragpipe.toml`, else defaults
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var("RAGPIPE_CONFIG") {
            return Self::load(Path::new(&path));
        }
        let local = Path::new("ragpipe.toml");
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }
}

/// Document source selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source kind (web, csv, directory, json, markdown, pdf)
    pub kind: SourceKind,
    /// URL or filesystem path
    pub location: String,
    /// JSON Pointer to the array of records (JSON sources only)
    #[serde(default = "default_json_pointer")]
    pub json_pointer: String,
    /// Field extracted from each record (JSON sources only)
    #[serde(default = "default_json_field")]
    pub json_field: String,
}

fn default_json_pointer() -> String {
    "/messages".to_string()
}

fn default_json_field() -> String {
    "content".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Web,
            location: "https://es.wikipedia.org/wiki/Constantino_I".to_string(),
            json_pointer: default_json_pointer(),
            json_field: default_json_field(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Splitting strategy
    pub strategy: ChunkingStrategy,
    /// Target chunk size: characters for the character strategy, serialized
    /// bytes per fragment for the JSON strategy
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters (character strategy only)
    pub chunk_overlap: usize,
    /// Separators tried in order, most coarse first (character strategy only)
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

/// How document content is split into chunks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Recursive character splitting on a separator list
    #[default]
    Characters,
    /// Recursive JSON splitting along structural boundaries
    Json,
}

fn default_separators() -> Vec<String> {
    vec![
        "\n\n".to_string(),
        "\n".to_string(),
        " ".to_string(),
        String::new(),
    ]
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::default(),
            chunk_size: 2000,
            chunk_overlap: 100,
            separators: default_separators(),
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3:instruct".to_string(),
            dimensions: 768,
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

/// Search mode for retrieval
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Plain nearest-neighbor search
    #[default]
    Similarity,
    /// Maximal marginal relevance (diversity reranking)
    Mmr,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Search mode
    pub mode: SearchMode,
    /// Number of chunks returned
    pub top_k: usize,
    /// Candidates fetched before MMR reranking
    pub fetch_k: usize,
    /// MMR balance: 1.0 = pure relevance, 0.0 = pure diversity
    pub lambda: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Similarity,
            top_k: 4,
            fetch_k: 20,
            lambda: 0.5,
        }
    }
}

/// Index snapshot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Where to persist the index; `None` keeps it in memory only
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_pipeline() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.strategy, ChunkingStrategy::Characters);
        assert_eq!(config.chunking.chunk_size, 2000);
        assert_eq!(config.chunking.chunk_overlap, 100);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.llm.generate_model, "llama3:instruct");
        assert!(config.index.snapshot_path.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let config: RagConfig = toml::from_str(
            r#"
            [source]
            kind = "markdown"
            location = "notes.md"

            [chunking]
            strategy = "json"
            chunk_size = 100
            chunk_overlap = 20

            [retrieval]
            mode = "mmr"
            top_k = 3
            fetch_k = 10
            lambda = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.source.kind, crate::types::SourceKind::Markdown);
        assert_eq!(config.chunking.chunk_size, 100);
        assert_eq!(config.chunking.strategy, ChunkingStrategy::Json);
        assert_eq!(config.retrieval.mode, SearchMode::Mmr);
        // Untouched sections keep their defaults.
        assert_eq!(config.llm.embed_model, "nomic-embed-text");
        assert_eq!(config.default_query, "que paso en la primera tetrarquia?");
    }
}
