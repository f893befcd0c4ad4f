//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::{ask::AskArgs, search::SearchArgs, stats::StatsArgs};

#[derive(Parser, Debug)]
#[command(name = "ragline")]
#[command(about = "Ragline - chunk, embed, retrieve and answer over a document store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .ragline/config.yaml layering)
    #[arg(short, long, global = true, env = "RAGLINE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question from the given documents
    Ask(AskArgs),

    /// Rank chunks of the given documents against a query
    Search(SearchArgs),

    /// Show knowledge base statistics for the given documents
    Stats(StatsArgs),

    /// Ingest sample documents, then run sample searches and questions
    Demo,
}
