//! In-memory similarity index over embedded chunks
//!
//! Exact cosine nearest-neighbor over a flat chunk list. The index is built
//! once from the full chunk set and treated as read-only afterwards; the only
//! persistence is a wholesale JSON snapshot.

pub mod mmr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

use mmr::mmr_rerank;

/// A retrieved chunk with its similarity to the query
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is better)
    pub similarity: f32,
}

/// Snapshot file layout
#[derive(Serialize, Deserialize)]
struct Snapshot {
    dimensions: usize,
    chunks: Vec<Chunk>,
}

/// Flat cosine similarity index over embedded chunks
pub struct ChunkIndex {
    dimensions: usize,
    chunks: RwLock<Vec<Chunk>>,
}

impl ChunkIndex {
    /// Create an empty index for a fixed embedding dimension
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Embed every chunk and build the index in one synchronous pass
    pub async fn from_chunks(
        embedder: &dyn EmbeddingProvider,
        mut chunks: Vec<Chunk>,
    ) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        let index = Self::new(embedder.dimensions());
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
            index.insert(chunk.clone())?;
        }

        tracing::info!(chunks = index.len(), dimensions = index.dimensions, "built index");
        Ok(index)
    }

    /// Insert an embedded chunk
    pub fn insert(&self, chunk: Chunk) -> Result<()> {
        if chunk.embedding.is_empty() {
            return Err(Error::Index("chunk has no embedding".to_string()));
        }
        if chunk.embedding.len() != self.dimensions {
            return Err(Error::Index(format!(
                "embedding has {} dimensions, index expects {}",
                chunk.embedding.len(),
                self.dimensions
            )));
        }
        self.chunks.write().push(chunk);
        Ok(())
    }

    /// Exact top-k nearest neighbors by cosine similarity
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimensions {
            return Err(Error::Index(format!(
                "query has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let chunks = self.chunks.read();
        let mut results: Vec<SearchResult> = chunks
            .iter()
            .map(|chunk| SearchResult {
                similarity: cosine_similarity(query, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    /// Top-k with maximal marginal relevance diversity reranking
    ///
    /// Fetches `fetch_k` candidates by similarity, then selects `k` of them
    /// balancing relevance against redundancy with `lambda`.
    pub fn search_mmr(
        &self,
        query: &[f32],
        k: usize,
        fetch_k: usize,
        lambda: f32,
    ) -> Result<Vec<SearchResult>> {
        let candidates = self.search(query, fetch_k.max(k))?;
        Ok(mmr_rerank(query, candidates, k, lambda))
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension of the index
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Write the whole index to a JSON snapshot file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let snapshot = Snapshot {
            dimensions: self.dimensions,
            chunks: self.chunks.read().clone(),
        };
        std::fs::write(path, serde_json::to_string(&snapshot)?)?;
        tracing::info!(path = %path.display(), chunks = snapshot.chunks.len(), "saved index snapshot");
        Ok(())
    }

    /// Restore a whole index from a JSON snapshot file
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;

        let index = Self::new(snapshot.dimensions);
        for chunk in snapshot.chunks {
            index.insert(chunk)?;
        }
        tracing::info!(path = %path.display(), chunks = index.len(), "loaded index snapshot");
        Ok(index)
    }
}

/// Cosine similarity of two vectors; zero vectors yield 0.0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
