//! PokeAPI client and response models
//!
//! This module contains the HTTP client that talks to the PokeAPI (routing
//! every fetch through the expiring response cache) and the serde types for
//! the response shapes the REPL consumes.

pub mod client;
pub mod models;

pub use client::{ApiClient, ApiError, POKEAPI_BASE_URL};
pub use models::{LocationArea, NamedApiResource, NamedApiResourceList, Pokemon};
