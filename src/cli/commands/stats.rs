//! Stats CLI command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::commands::{build_pipeline, ingest_documents, DocumentArgs};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, KnowledgeBaseStats};

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct StatsOutput {
    pub stats: KnowledgeBaseStats,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        format!(
            "Knowledge Base Stats:\n{}",
            TableFormatter::new().format_stats(&self.stats)
        )
    }
}

pub async fn execute(args: StatsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    ingest_documents(&pipeline, &args.documents).await?;

    let stats = pipeline
        .stats()
        .await
        .context("Failed to compute knowledge base stats")?;

    output(&StatsOutput { stats }, json_mode);
    Ok(())
}
