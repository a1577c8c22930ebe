//! Serde models for the PokeAPI response shapes
//!
//! Only the fields the REPL actually renders are deserialized; everything else
//! in the responses is ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// A name plus the canonical URL of the resource it refers to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedApiResource {
    /// Resource name, e.g. "canalave-city-area" or "pikachu"
    pub name: String,
    /// Fully-qualified URL of the resource
    pub url: String,
}

impl NamedApiResource {
    /// Extracts the numeric id from the trailing path segment of the URL.
    ///
    /// PokeAPI resource URLs end in `/{id}/`, e.g.
    /// `https://pokeapi.co/api/v2/location-area/1/`.
    pub fn id(&self) -> Option<&str> {
        let mut segments = self.url.rsplit('/').filter(|s| !s.is_empty());
        segments.next()
    }
}

/// One page of a paginated resource listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedApiResourceList {
    /// Total number of resources across all pages
    pub count: u32,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// URL of the previous page, if any
    pub previous: Option<String>,
    /// The resources on this page
    pub results: Vec<NamedApiResource>,
}

/// A location area and the Pokemon that can be encountered there
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationArea {
    pub name: String,
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

/// A single encounter slot within a location area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedApiResource,
}

/// A Pokemon with the fields shown by `catch` and `inspect`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Base experience yield; higher means harder to catch.
    /// The API reports null for some Pokemon; those decode as 0.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub base_experience: u32,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    pub stats: Vec<PokemonStat>,
    pub types: Vec<PokemonType>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// A named base stat, e.g. "hp" or "speed"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    pub stat: NamedApiResource,
}

/// One of a Pokemon's type slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonType {
    #[serde(rename = "type")]
    pub kind: NamedApiResource,
}
