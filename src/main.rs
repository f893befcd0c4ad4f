//! Ragline CLI entry point.

use clap::Parser;

use ragline::cli::{self, Cli};
use ragline::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, json_mode),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(err, json_mode),
    };

    if let Err(err) = cli::run(cli, &config).await {
        cli::handle_error(err, json_mode);
    }
}
