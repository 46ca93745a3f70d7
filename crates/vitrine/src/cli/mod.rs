//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the vitrine binary.

mod commands;
mod content;
mod gallery;
mod media;

pub use commands::{Cli, Commands, GalleryCommands, OutputFormat};

use serde::Serialize;
use vitrine::{Backends, JsonError, ValidationError, VitrineConfig, VitrineResult};

/// Configuration, backends and output settings shared by every handler.
#[derive(Debug)]
pub struct Context {
    pub config: VitrineConfig,
    pub backends: Backends,
    pub format: OutputFormat,
}

impl Context {
    /// Load configuration and open the configured backends.
    pub fn open(cli: &Cli) -> VitrineResult<Self> {
        let config = match &cli.config {
            Some(path) => VitrineConfig::from_file(path)?,
            None => VitrineConfig::load()?,
        };
        let backends = Backends::from_config(&config)?;
        Ok(Self {
            config,
            backends,
            format: cli.format,
        })
    }

    /// Print a value as JSON, or the human summary.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> VitrineResult<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value)
                    .map_err(|e| JsonError::new(e.to_string()))?;
                println!("{}", json);
            }
            OutputFormat::Human => human(),
        }
        Ok(())
    }
}

/// Read a local file.
pub async fn read_file(path: &std::path::Path) -> VitrineResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        ValidationError::invalid("file", format!("cannot read {}: {}", path.display(), e)).into()
    })
}

/// Run a parsed command. Returns `false` when the command ran but its
/// workflow reported a failure.
pub async fn dispatch(ctx: &Context, command: Commands) -> VitrineResult<bool> {
    match command {
        Commands::ReplaceMedia {
            kind,
            id,
            file,
            fields,
        } => media::replace_media(ctx, kind, id.into(), file.as_deref(), fields.as_deref()).await,
        Commands::RemoveMedia { kind, id } => media::remove_media(ctx, kind, id.into()).await,
        Commands::Gallery(cmd) => gallery::handle_gallery_command(ctx, cmd).await,
        Commands::Promote { kind, id, html } => {
            content::promote(ctx, kind, id.into(), html.as_deref()).await
        }
        Commands::List {
            kind,
            search,
            created,
            page,
            page_size,
        } => content::list(ctx, kind, search.as_deref(), created, page, page_size).await,
        Commands::DeleteEntity { kind, id } => content::delete_entity(ctx, kind, id.into()).await,
        Commands::SweepTemp { max_age_hours } => content::sweep_temp(ctx, max_age_hours).await,
    }
}
