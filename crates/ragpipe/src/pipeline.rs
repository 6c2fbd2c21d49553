//! End-to-end pipeline: load, split, embed, index, retrieve, generate

use std::sync::Arc;

use crate::config::{ChunkingConfig, ChunkingStrategy, RagConfig};
use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::index::ChunkIndex;
use crate::ingestion::{
    loader_for, RecursiveCharacterSplitter, RecursiveJsonSplitter, TextSplitter,
};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::Retriever;

/// Wires the stages together around injected providers
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    config: RagConfig,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        config: RagConfig,
    ) -> Self {
        Self {
            embedder,
            llm,
            config,
        }
    }

    /// Load the configured source, split it, embed every chunk, and build the index
    pub async fn ingest(&self) -> Result<ChunkIndex> {
        let loader = loader_for(&self.config.source)?;
        let documents = loader.load().await?;
        tracing::info!(documents = documents.len(), "loaded documents");

        let splitter = splitter_for(&self.config.chunking);
        let chunks = splitter.process(&documents)?;

        ChunkIndex::from_chunks(self.embedder.as_ref(), chunks).await
    }

    /// Retrieve relevant chunks for `question` and generate a grounded answer
    pub async fn answer(&self, index: Arc<ChunkIndex>, question: &str) -> Result<String> {
        let retriever = Retriever::new(
            self.embedder.clone(),
            index,
            self.config.retrieval.clone(),
        );
        let context = retriever.retrieve(question).await?;
        tracing::info!(chunks = context.len(), "retrieved context");

        AnswerGenerator::new(self.llm.clone())
            .answer(question, &context)
            .await
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }
}

/// Select the configured splitting strategy
pub fn splitter_for(config: &ChunkingConfig) -> Box<dyn TextSplitter> {
    match config.strategy {
        ChunkingStrategy::Characters => Box::new(
            RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap)
                .with_separators(config.separators.clone()),
        ),
        ChunkingStrategy::Json => Box::new(RecursiveJsonSplitter::new(config.chunk_size)),
    }
}

/// Join CLI arguments into a query, falling back to the configured default
pub fn query_from_args(args: &[String], default_query: &str) -> String {
    if args.is_empty() {
        default_query.to_string()
    } else {
        args.join(" ")
    }
}
