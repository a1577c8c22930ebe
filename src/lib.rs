//! Pokedex CLI Library
//!
//! This module exposes the cache, API client, and REPL modules for use in
//! integration tests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod pokedex;
pub mod repl;
