//! End-to-end pipeline test with deterministic offline providers

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use ragpipe::config::{ChunkingConfig, RagConfig, SourceConfig};
use ragpipe::providers::{EmbeddingProvider, LlmProvider};
use ragpipe::types::SourceKind;
use ragpipe::{RagPipeline, Result};

const DIMS: usize = 64;

/// Deterministic embedder: hashed character trigram counts in a fixed space.
/// Texts sharing vocabulary land close together, disjoint texts far apart.
struct TrigramEmbedder;

fn trigram_embed(text: &str) -> Vec<f32> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut vector = vec![0.0_f32; DIMS];
    for window in chars.windows(3) {
        let mut hash: u64 = 1469598103934665603;
        for c in window {
            hash ^= *c as u64;
            hash = hash.wrapping_mul(1099511628211);
        }
        vector[(hash % DIMS as u64) as usize] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(trigram_embed(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "trigram"
    }
}

/// LLM stub that records the prompt and answers with a fixed string
struct RecordingLlm {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok("respuesta".to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "recording-model"
    }
}

fn markdown_fixture(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("notes.md");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "# Historia romana").unwrap();
    writeln!(file).unwrap();
    writeln!(
        file,
        "La primera tetrarquia fue instaurada por Diocleciano en el anio 293. \
         Cuatro emperadores gobernaron el imperio de forma simultanea."
    )
    .unwrap();
    writeln!(file).unwrap();
    writeln!(
        file,
        "Los acueductos transportaban agua potable hacia las ciudades. \
         Las calzadas conectaban las provincias con la capital."
    )
    .unwrap();
    writeln!(file).unwrap();
    writeln!(
        file,
        "El senado perdio influencia durante el periodo imperial tardio. \
         Las reformas administrativas dividieron las provincias antiguas."
    )
    .unwrap();
    path
}

fn fixture_config(location: &std::path::Path) -> RagConfig {
    RagConfig {
        source: SourceConfig {
            kind: SourceKind::Markdown,
            location: location.display().to_string(),
            ..SourceConfig::default()
        },
        chunking: ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 20,
            ..ChunkingConfig::default()
        },
        ..RagConfig::default()
    }
}

#[tokio::test]
async fn ingest_builds_a_searchable_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = markdown_fixture(&dir);

    let llm = Arc::new(RecordingLlm {
        prompts: Mutex::new(Vec::new()),
    });
    let pipeline = RagPipeline::new(Arc::new(TrigramEmbedder), llm, fixture_config(&path));

    let index = pipeline.ingest().await.unwrap();
    assert!(index.len() > 1, "fixture should split into several chunks");
    assert_eq!(index.dimensions(), DIMS);
}

#[tokio::test]
async fn answer_grounds_the_prompt_in_the_matching_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let path = markdown_fixture(&dir);

    let llm = Arc::new(RecordingLlm {
        prompts: Mutex::new(Vec::new()),
    });
    let pipeline = RagPipeline::new(
        Arc::new(TrigramEmbedder),
        llm.clone(),
        fixture_config(&path),
    );

    let index = Arc::new(pipeline.ingest().await.unwrap());
    let answer = pipeline
        .answer(index, "que paso en la primera tetrarquia?")
        .await
        .unwrap();
    assert_eq!(answer, "respuesta");

    let prompts = llm.prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert!(
        prompts[0].contains("tetrarquia"),
        "prompt should contain the chunk about the tetrarchy: {}",
        prompts[0]
    );
    assert!(prompts[0].contains("Question: que paso en la primera tetrarquia?"));
}

#[tokio::test]
async fn snapshot_round_trip_answers_without_reingesting() {
    let dir = tempfile::tempdir().unwrap();
    let path = markdown_fixture(&dir);
    let snapshot = dir.path().join("index.json");

    let llm = Arc::new(RecordingLlm {
        prompts: Mutex::new(Vec::new()),
    });
    let pipeline = RagPipeline::new(
        Arc::new(TrigramEmbedder),
        llm.clone(),
        fixture_config(&path),
    );

    let index = pipeline.ingest().await.unwrap();
    index.save_to(&snapshot).unwrap();

    let restored = Arc::new(ragpipe::ChunkIndex::load_from(&snapshot).unwrap());
    assert_eq!(restored.len(), index.len());

    let answer = pipeline
        .answer(restored, "que paso en la primera tetrarquia?")
        .await
        .unwrap();
    assert_eq!(answer, "respuesta");
    assert!(llm.prompts.lock()[0].contains("tetrarquia"));
}
