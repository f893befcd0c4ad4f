//! Search CLI command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::commands::{build_pipeline, ingest_documents, DocumentArgs};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, Fallback, ScoredChunk};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    #[command(flatten)]
    pub documents: DocumentArgs,

    /// Maximum number of results (defaults to rag.max_results)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub results: Vec<ScoredChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if self.results.is_empty() {
            return format!("No results for '{}'.", self.query);
        }

        let mut lines = vec![
            format!("Results for '{}':", self.query),
            TableFormatter::new().format_results(&self.results),
        ];
        if let Some(fallback) = &self.fallback {
            lines.push(format!("Note: degraded ({})", fallback));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: SearchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    ingest_documents(&pipeline, &args.documents).await?;

    let (results, fallback) = pipeline.search(&args.query, args.limit).await.into_parts();

    output(
        &SearchOutput {
            query: args.query,
            results,
            fallback,
        },
        json_mode,
    );
    Ok(())
}
