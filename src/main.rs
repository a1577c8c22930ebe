//! Pokedex CLI - Browse and catch Pokemon from the command line
//!
//! An interactive REPL that pages through PokeAPI location areas, explores
//! them, and catches Pokemon. API responses are held in an expiring in-memory
//! cache so repeated commands do not re-fetch the same URLs.

mod api;
mod cache;
mod cli;
mod pokedex;
mod repl;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use cli::{Cli, StartupConfig};
use repl::Repl;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging is off unless RUST_LOG asks for it, so the REPL output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;

    let api = ApiClient::with_base_url(&config.base_url, config.cache_ttl);
    let mut repl = Repl::new(api);
    repl.run().await?;

    Ok(())
}
