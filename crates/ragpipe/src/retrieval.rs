//! Query-time retrieval over the chunk index

use std::sync::Arc;

use crate::config::{RetrievalConfig, SearchMode};
use crate::error::Result;
use crate::index::{ChunkIndex, SearchResult};
use crate::providers::EmbeddingProvider;

/// Embeds queries and fetches the most relevant chunks from the index
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<ChunkIndex>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<ChunkIndex>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    /// Retrieve the chunks most relevant to `query` per the configured mode
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await?;

        let results = match self.config.mode {
            SearchMode::Similarity => self.index.search(&embedding, self.config.top_k)?,
            SearchMode::Mmr => self.index.search_mmr(
                &embedding,
                self.config.top_k,
                self.config.fetch_k,
                self.config.lambda,
            )?,
        };

        tracing::debug!(
            query_len = query.len(),
            results = results.len(),
            mode = ?self.config.mode,
            "retrieved chunks"
        );
        Ok(results)
    }
}
