//! Command-line interface
//!
//! Every command builds a fresh in-memory knowledge base, ingests the
//! documents it was given and runs one pipeline operation against it.

pub mod commands;
pub mod output;
pub mod types;

use std::path::Path;

use anyhow::Result;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

pub use types::{Cli, Commands};

/// Load configuration from `path`, or the default layering when `None`
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Dispatch a parsed command
pub async fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Ask(args) => commands::ask::execute(args, config, cli.json).await,
        Commands::Search(args) => commands::search::execute(args, config, cli.json).await,
        Commands::Stats(args) => commands::stats::execute(args, config, cli.json).await,
        Commands::Demo => commands::demo::execute(config, cli.json).await,
    }
}

/// Report a command failure and exit non-zero
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{:#}", err),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {:#}", err);
    }
    std::process::exit(1)
}
