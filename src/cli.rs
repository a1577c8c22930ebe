//! Command-line interface parsing for the Pokedex CLI
//!
//! This module handles parsing of CLI arguments using clap: the cache TTL
//! for API responses and an optional PokeAPI base-URL override.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::api::POKEAPI_BASE_URL;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The cache TTL must be a positive number of seconds
    #[error("Invalid TTL: {0} seconds. The cache TTL must be at least 1 second")]
    InvalidTtl(u64),
}

/// Pokedex CLI - Browse and catch Pokemon from the PokeAPI
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "An interactive Pokedex backed by the PokeAPI")]
#[command(version)]
pub struct Cli {
    /// Cache TTL for API responses, in seconds
    ///
    /// Responses are kept in memory and reused for this long; the same
    /// duration sets how often the background reaper evicts stale entries.
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub ttl: u64,

    /// Base URL of the PokeAPI root
    #[arg(long, value_name = "URL", default_value = POKEAPI_BASE_URL)]
    pub base_url: String,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// How long cached API responses stay valid
    pub cache_ttl: Duration,
    /// PokeAPI root to issue requests against
    pub base_url: String,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the TTL is zero
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.ttl == 0 {
            return Err(CliError::InvalidTtl(cli.ttl));
        }
        Ok(StartupConfig {
            cache_ttl: Duration::from_secs(cli.ttl),
            base_url: cli.base_url.clone(),
        })
    }
}
