//! CLI mode implementation
//!
//! Provides the command-line interface for one-shot searches

use clap::{Parser, Subcommand};

/// Search API base used when neither `--api-base` nor the environment
/// variable is given.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Userlens CLI
#[derive(Parser)]
#[command(name = "userlens")]
#[command(about = "People search over the user index", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Search API base URL
    #[arg(long, global = true, env = "USERLENS_API", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search users matching the given criteria
    Find(FindArgs),
    /// Suggest nicknames for a partial input
    Suggest(SuggestArgs),
    /// Show facet buckets for the given criteria
    Facets(FacetsArgs),
}

/// Find command arguments
#[derive(Parser, Clone, Debug)]
pub struct FindArgs {
    /// Free text to match (lower-cased before sending)
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Wildcard matching (pass without a value to enable)
    #[arg(short = 'w', long, num_args = 0..=1, default_missing_value = "true")]
    pub wildcard: Option<bool>,

    /// Point of interest latitude
    #[arg(long, requires = "lon")]
    pub lat: Option<f64>,

    /// Point of interest longitude
    #[arg(long, requires = "lat")]
    pub lon: Option<f64>,

    /// Geo radius in kilometres around the point of interest
    #[arg(short = 'd', long)]
    pub distance: Option<String>,

    /// Restrict free-text matching to one document field
    #[arg(short = 'f', long)]
    pub field: Option<String>,

    /// Result page to fetch
    #[arg(short = 'p', long, default_value_t = 1)]
    pub page: u64,
}

/// Suggest command arguments
#[derive(Parser, Clone, Debug)]
pub struct SuggestArgs {
    /// Partial nickname to complete
    pub nick: String,
}

/// Facets command arguments
#[derive(Parser, Clone, Debug)]
pub struct FacetsArgs {
    /// Free text to match (lower-cased before sending)
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Wildcard matching (pass without a value to enable)
    #[arg(short = 'w', long, num_args = 0..=1, default_missing_value = "true")]
    pub wildcard: Option<bool>,

    /// Point of interest latitude
    #[arg(long, requires = "lon")]
    pub lat: Option<f64>,

    /// Point of interest longitude
    #[arg(long, requires = "lat")]
    pub lon: Option<f64>,

    /// Geo radius in kilometres around the point of interest
    #[arg(short = 'd', long)]
    pub distance: Option<String>,

    /// Restrict free-text matching to one document field
    #[arg(short = 'f', long)]
    pub field: Option<String>,
}
