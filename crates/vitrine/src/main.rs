//! Vitrine CLI binary.
//!
//! This binary runs the media workflows against the configured backends:
//! - Replace or remove an entity's media
//! - Append, remove and reorder gallery images
//! - Promote inline images of article bodies and sweep the temp namespace
//! - List and delete entities

use clap::Parser;
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    use cli::{Cli, Context, dispatch};

    // Secrets such as VITRINE__BACKEND__API_KEY may live in .env
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    if let Err(e) = vitrine::init_logging(cli.verbose, cli.log_format) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match Context::open(&cli) {
        Ok(ctx) => dispatch(&ctx, cli.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(class = %e.class(), "{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
