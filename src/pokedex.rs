//! Caught-Pokemon registry and catch mechanics
//!
//! Tracks which Pokemon the user has caught during this session, along with
//! when each was caught. The catch roll scales inversely with a Pokemon's
//! base experience: stronger Pokemon are harder to catch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::api::Pokemon;

/// Observed bounds for base experience across the PokeAPI roster, used to
/// normalize catch difficulty.
const MIN_BASE_EXPERIENCE: u32 = 36;
const MAX_BASE_EXPERIENCE: u32 = 635;

/// Catch probability for the weakest and strongest Pokemon respectively
const MAX_CATCH_CHANCE: f64 = 0.9;
const MIN_CATCH_CHANCE: f64 = 0.1;

/// A Pokemon the user has caught, with the time of capture
#[derive(Debug, Clone)]
pub struct CaughtPokemon {
    pub pokemon: Pokemon,
    pub caught_at: DateTime<Utc>,
}

/// Session-local registry of caught Pokemon, keyed by name
#[derive(Debug, Default)]
pub struct Pokedex {
    caught: HashMap<String, CaughtPokemon>,
}

/// Returns the probability of catching a Pokemon with the given base
/// experience, linearly interpolated between the chance bounds.
pub fn catch_chance(base_experience: u32) -> f64 {
    let clamped = base_experience.clamp(MIN_BASE_EXPERIENCE, MAX_BASE_EXPERIENCE) as f64;
    let normalized = (clamped - MIN_BASE_EXPERIENCE as f64)
        / (MAX_BASE_EXPERIENCE - MIN_BASE_EXPERIENCE) as f64;
    MAX_CATCH_CHANCE - normalized * (MAX_CATCH_CHANCE - MIN_CATCH_CHANCE)
}

impl Pokedex {
    /// Creates an empty Pokedex.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rolls a catch attempt for `pokemon` and records it on success.
    ///
    /// # Returns
    /// * `true` if the Pokemon was caught (and is now in the registry)
    /// * `false` if it escaped
    pub fn attempt_catch<R: Rng>(&mut self, rng: &mut R, pokemon: &Pokemon) -> bool {
        let caught = rng.gen_bool(catch_chance(pokemon.base_experience));
        if caught {
            self.record_catch(pokemon.clone());
        }
        caught
    }

    /// Records `pokemon` as caught right now.
    ///
    /// Catching the same Pokemon again replaces the earlier record.
    pub fn record_catch(&mut self, pokemon: Pokemon) {
        let entry = CaughtPokemon {
            caught_at: Utc::now(),
            pokemon,
        };
        self.caught.insert(entry.pokemon.name.clone(), entry);
    }

    /// Looks up a caught Pokemon by name.
    pub fn get(&self, name: &str) -> Option<&CaughtPokemon> {
        self.caught.get(name)
    }

    /// Returns whether this session is empty of catches.
    pub fn is_empty(&self) -> bool {
        self.caught.is_empty()
    }

    /// Returns the names of all caught Pokemon, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.caught.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
