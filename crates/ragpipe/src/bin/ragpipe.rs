//! ragpipe binary
//!
//! Run with: cargo run -p ragpipe -- "your question here"

use std::sync::Arc;

use ragpipe::config::RagConfig;
use ragpipe::index::ChunkIndex;
use ragpipe::pipeline::{query_from_args, RagPipeline};
use ragpipe::providers::OllamaProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragpipe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::discover()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Source: {} ({})", config.source.location, config.source.kind.display_name());
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let query = query_from_args(&args, &config.default_query);

    let provider = OllamaProvider::new(&config.llm)?;
    if !provider.health_check().await.unwrap_or(false) {
        tracing::warn!("Ollama not reachable at {}", config.llm.base_url);
        tracing::warn!("Start it with: ollama serve");
        tracing::warn!(
            "Then pull models: ollama pull {} && ollama pull {}",
            config.llm.embed_model,
            config.llm.generate_model
        );
    }

    let snapshot_path = config.index.snapshot_path.clone();
    let (embedder, llm) = provider.split();
    let pipeline = RagPipeline::new(Arc::new(embedder), Arc::new(llm), config);

    let index = match &snapshot_path {
        Some(path) if path.exists() => {
            let index = ChunkIndex::load_from(path)?;
            println!("Loaded index snapshot: {} chunks", index.len());
            index
        }
        _ => {
            let index = pipeline.ingest().await?;
            println!("Ingested source: {} chunks indexed", index.len());
            if let Some(path) = &snapshot_path {
                index.save_to(path)?;
                println!("Saved index snapshot to {}", path.display());
            }
            index
        }
    };

    println!("Question: {query}");
    let answer = pipeline.answer(Arc::new(index), &query).await?;
    println!("\n{answer}");

    Ok(())
}
