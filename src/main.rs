//! userlens: people search client
//!
//! Dual-mode application:
//! - Session Mode (default): interactive search shell over stdio
//! - CLI Mode: one-shot command execution
//!
//! Implements three commands:
//! - `find` - Paged user search with the given criteria
//! - `suggest` - Nickname suggestions for a partial input
//! - `facets` - Facet buckets over the full filtered set

mod query;
mod service;
mod markers;
mod controller;
mod autocomplete;
mod facets;
mod notify;
mod session;
mod error;
mod http;
mod cli;

use anyhow::Result;
use autocomplete::NickCompleter;
use clap::Parser;
use cli::{Cli, Commands};
use controller::SearchController;
use facets::FacetAggregator;
use notify::TermNotifier;
use query::UserQuery;
use service::{HttpSearchService, SearchService};
use session::Session;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Detect mode: CLI if args present, interactive session otherwise
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        run_cli_mode().await
    } else {
        run_session_mode().await
    }
}

/// Run in CLI mode
async fn run_cli_mode() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();

    let Some(command) = cli.command else {
        eprintln!("Error: No command specified. Use --help for usage information.");
        std::process::exit(1);
    };

    let result = execute_command(command, &cli.api_base).await;

    // Handle result and exit with appropriate code
    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

async fn execute_command(command: Commands, api_base: &str) -> Result<String> {
    let service: Arc<dyn SearchService> = Arc::new(
        HttpSearchService::new(api_base)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL: {}", e))?,
    );

    match command {
        Commands::Find(args) => execute_find(service, args).await,
        Commands::Suggest(args) => execute_suggest(service, args).await,
        Commands::Facets(args) => execute_facets(service, args).await,
    }
}

/// Execute find command in CLI mode
async fn execute_find(service: Arc<dyn SearchService>, args: cli::FindArgs) -> Result<String> {
    let controller = SearchController::new(service, Arc::new(TermNotifier));

    controller.set_free_text(args.query).await;
    controller.set_wildcard(args.wildcard).await;
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        controller.map_click(lat, lon).await;
    }
    controller.set_distance(args.distance).await;
    controller.set_field(args.field).await;

    // The initial page binding never searches on its own, so the one
    // explicit search below is the only request this command sends
    controller.set_page(args.page).await;
    controller.search().await;

    let state = controller.results().await;
    if !state.has_searched {
        anyhow::bail!("search request failed");
    }

    Ok(session::render_results_text(
        &state,
        controller.current_page().await,
        controller.items_per_page(),
    ))
}

/// Execute suggest command in CLI mode
async fn execute_suggest(
    service: Arc<dyn SearchService>,
    args: cli::SuggestArgs,
) -> Result<String> {
    let completer = NickCompleter::new(service);
    Ok(completer.suggest(&args.nick).await.join("\n"))
}

/// Execute facets command in CLI mode
async fn execute_facets(service: Arc<dyn SearchService>, args: cli::FacetsArgs) -> Result<String> {
    let mut query = UserQuery::new();
    query.set_free_text(args.query);
    query.set_wildcard(args.wildcard);
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        query.set_map_click(lat, lon);
    }
    query.set_distance(args.distance);
    query.set_field(args.field);

    let aggregator = FacetAggregator::new(service);
    aggregator.refresh(&query).await;

    Ok(session::render_buckets_text(&aggregator.buckets().await))
}

/// Map an error to an exit code
fn get_exit_code(err: &anyhow::Error) -> i32 {
    let err_str = err.to_string().to_lowercase();

    if err_str.contains("invalid") || err_str.contains("usage") {
        1 // Invalid arguments or usage error
    } else if err_str.contains("failed") || err_str.contains("connection") {
        2 // Network or transport error
    } else if err_str.contains("timeout") {
        4 // Timeout error
    } else {
        5 // Other application errors
    }
}

/// Run in interactive session mode
async fn run_session_mode() -> Result<()> {
    // Log to stderr so the prompt and replies own stdout
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting userlens session");

    let api_base =
        std::env::var("USERLENS_API").unwrap_or_else(|_| cli::DEFAULT_API_BASE.to_string());
    let service: Arc<dyn SearchService> = Arc::new(HttpSearchService::new(&api_base)?);

    let session = Session::new(service, Arc::new(TermNotifier));
    session.run().await
}
