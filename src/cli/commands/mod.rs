//! CLI command implementations.

pub mod ask;
pub mod demo;
pub mod search;
pub mod stats;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::store::InMemoryDocumentStore;
use crate::domain::models::{Config, DocumentInput};
use crate::services::RagPipeline;

/// Documents ingested before the command runs
#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// Document file to ingest (repeatable)
    #[arg(short, long = "doc", value_name = "FILE", required = true)]
    pub docs: Vec<PathBuf>,

    /// Source label for the documents (defaults to the file path)
    #[arg(short, long)]
    pub source: Option<String>,
}

/// Build a pipeline over a fresh in-memory store
pub fn build_pipeline(config: &Config) -> Result<RagPipeline> {
    let store = Arc::new(InMemoryDocumentStore::new());
    RagPipeline::from_config(config, store).context("Failed to build pipeline")
}

/// Read the documents named by `args` and ingest them as one batch
pub async fn ingest_documents(pipeline: &RagPipeline, args: &DocumentArgs) -> Result<()> {
    let mut inputs = Vec::with_capacity(args.docs.len());
    for path in &args.docs {
        inputs.push(read_document(path, args.source.as_deref()).await?);
    }

    let reports = pipeline.ingest_batch(inputs).await;
    for report in reports.iter().filter(|r| !r.is_complete()) {
        tracing::warn!(
            title = %report.title,
            failed = report.failed(),
            total = report.total_chunks,
            "Document only partially ingested"
        );
    }

    Ok(())
}

async fn read_document(path: &Path, source: Option<&str>) -> Result<DocumentInput> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document {}", path.display()))?;

    let title = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    let source = source.map_or_else(|| path.display().to_string(), str::to_string);

    Ok(DocumentInput::new(title, content).with_source(source))
}
