//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vitrine::{EntityKind, LogFormat, SortDirection};

/// Vitrine - keep portfolio content rows and their media in step
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Keep portfolio content rows and their stored media in step", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file used instead of the standard search locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a new file for an entity and write its path (and other fields)
    ReplaceMedia {
        /// Entity kind, e.g. `project` or `about-banner`
        kind: EntityKind,

        /// Entity id
        id: String,

        /// File to upload
        #[arg(long)]
        file: Option<PathBuf>,

        /// Other changed fields as a JSON update, e.g. `{"shape":"banner","title":"Studio"}`
        #[arg(long)]
        fields: Option<String>,
    },

    /// Delete an entity's media and clear its reference
    RemoveMedia {
        /// Entity kind
        kind: EntityKind,

        /// Entity id
        id: String,
    },

    /// Gallery commands
    #[command(subcommand)]
    Gallery(GalleryCommands),

    /// Move temp inline images of an article body to permanent names
    Promote {
        /// Entity kind with a rich-text body, e.g. `news-article`
        kind: EntityKind,

        /// Article id
        id: String,

        /// Rewrite this HTML file instead of the stored body
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// List entities in display order
    List {
        /// Entity kind
        kind: EntityKind,

        /// Keep rows whose title contains this text
        #[arg(long)]
        search: Option<String>,

        /// Sort by creation time instead of display order
        #[arg(long)]
        created: Option<SortDirection>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Delete an entity with its media and gallery rows
    DeleteEntity {
        /// Entity kind
        kind: EntityKind,

        /// Entity id
        id: String,
    },

    /// Delete temp objects older than the configured age
    SweepTemp {
        /// Maximum age in hours (defaults to the configured value)
        #[arg(long)]
        max_age_hours: Option<u64>,
    },
}

/// Gallery subcommands
#[derive(Subcommand, Debug)]
pub enum GalleryCommands {
    /// Upload images and append them to a parent's gallery
    Add {
        /// Parent kind, e.g. `project`
        kind: EntityKind,

        /// Parent id
        id: String,

        /// Image files, appended in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Order value of the first image; later ones follow it
        #[arg(long)]
        sort: Option<i64>,
    },

    /// Delete one gallery image row and its object
    Remove {
        /// Child kind, e.g. `project-gallery-image`
        kind: EntityKind,

        /// Row id
        id: String,
    },

    /// Write new order values as `ID=ORDER` pairs
    Reorder {
        /// Row kind
        kind: EntityKind,

        /// `ID=ORDER` pairs
        #[arg(required = true, value_parser = parse_order)]
        orders: Vec<(String, i64)>,
    },
}

fn parse_order(raw: &str) -> Result<(String, i64), String> {
    let (id, order) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=ORDER, got '{}'", raw))?;
    let order = order
        .trim()
        .parse()
        .map_err(|e| format!("invalid order in '{}': {}", raw, e))?;
    Ok((id.trim().to_string(), order))
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
