//! PokeAPI HTTP client with response caching
//!
//! This module provides functionality to fetch PokeAPI resources as raw bytes,
//! cache them by URL, and decode them into the typed models. The cache stores
//! the not-yet-decoded body, so it stays format-agnostic: a hit skips the
//! network entirely and is decoded the same way as a fresh response.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::models::{LocationArea, NamedApiResourceList, Pokemon};
use crate::cache::Cache;

/// Base URL for the PokeAPI
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Errors that can occur when fetching PokeAPI data
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for fetching PokeAPI resources
///
/// Owns the expiring response cache; every successful fetch is cached under
/// its full request URL, and lookups consult the cache before touching the
/// network.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    cache: Cache,
}

impl ApiClient {
    /// Creates a new ApiClient against the public PokeAPI.
    ///
    /// # Arguments
    /// * `cache_ttl` - TTL for cached response bodies
    pub fn new(cache_ttl: Duration) -> Self {
        Self::with_base_url(POKEAPI_BASE_URL, cache_ttl)
    }

    /// Creates a new ApiClient against a custom API root.
    ///
    /// Useful for testing or for pointing at a PokeAPI mirror.
    pub fn with_base_url(base_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Cache::new(cache_ttl),
        }
    }

    /// Returns the URL of the first page of the location-area listing.
    pub fn location_areas_url(&self) -> String {
        format!("{}/location-area?offset=0&limit=20", self.base_url)
    }

    /// Returns the URL of a single location area by name or id.
    pub fn location_area_url(&self, name: &str) -> String {
        format!("{}/location-area/{}", self.base_url, name)
    }

    /// Returns the URL of a single Pokemon by name or id.
    pub fn pokemon_url(&self, name: &str) -> String {
        format!("{}/pokemon/{}", self.base_url, name)
    }

    /// Fetches one page of the location-area listing.
    ///
    /// # Arguments
    /// * `url` - Full page URL, typically taken from a previous page's
    ///   `next`/`previous` link or from `location_areas_url`
    pub async fn location_areas_page(&self, url: &str) -> Result<NamedApiResourceList, ApiError> {
        self.get_json(url).await
    }

    /// Fetches a location area by name or id.
    pub async fn location_area(&self, name: &str) -> Result<LocationArea, ApiError> {
        let url = self.location_area_url(name);
        self.get_json(&url).await
    }

    /// Fetches a Pokemon by name or id.
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let url = self.pokemon_url(name);
        self.get_json(&url).await
    }

    /// Stops the cache's background reaper.
    ///
    /// Called once at shutdown so the process exits with no task still
    /// holding the entry map.
    pub async fn shutdown(&self) {
        self.cache.stop().await;
    }

    /// Fetches `url` and decodes the body as JSON.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let body = self.fetch_bytes(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Returns the raw response body for `url`, from cache when possible.
    ///
    /// On a miss the body is fetched over HTTP, cached verbatim under the full
    /// URL, and returned. Non-success statuses are surfaced as
    /// `ApiError::UnexpectedStatus` and nothing is cached.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        if let Some(body) = self.cache.get(url).await {
            debug!(url, "cache hit");
            return Ok(body);
        }

        debug!(url, "cache miss, fetching");
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::UnexpectedStatus(status));
        }

        let body = response.bytes().await?.to_vec();
        self.cache.add(url, body.clone()).await;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ApiClient {
        ApiClient::with_base_url("https://pokeapi.co/api/v2/", Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let client = test_client();
        assert_eq!(
            client.pokemon_url("pikachu"),
            "https://pokeapi.co/api/v2/pokemon/pikachu"
        );
    }

    #[tokio::test]
    async fn test_location_areas_url_first_page() {
        let client = test_client();
        assert_eq!(
            client.location_areas_url(),
            "https://pokeapi.co/api/v2/location-area?offset=0&limit=20"
        );
    }

    #[tokio::test]
    async fn test_cached_body_is_decoded_without_network() {
        // Point at an unroutable host: any network attempt would error, so a
        // successful decode proves the body came from the cache.
        let client = ApiClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(60));
        let url = client.pokemon_url("pikachu");
        let body = br#"{
            "id": 25, "name": "pikachu", "base_experience": 112,
            "height": 4, "weight": 60, "stats": [], "types": []
        }"#;
        client.cache.add(&url, body.to_vec()).await;

        let pokemon = client.pokemon("pikachu").await.expect("Should hit cache");
        assert_eq!(pokemon.name, "pikachu");
        assert_eq!(pokemon.id, 25);
    }

    #[tokio::test]
    async fn test_corrupt_cached_body_is_parse_error() {
        let client = ApiClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(60));
        let url = client.pokemon_url("garbled");
        client.cache.add(&url, b"not json".to_vec()).await;

        let err = client.pokemon("garbled").await.unwrap_err();
        assert!(matches!(err, ApiError::ParseError(_)));
    }
}
