//! Domain types for Pokedex
//!
//! Defines the persisted `Pokemon` record, its write-side inputs and the
//! listing payload returned by the remote catalogue API.

use crate::error::{PokedexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default page size when the caller gives none
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Store-assigned document identifier (24 hexadecimal characters)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PokemonId(String);

impl PokemonId {
    /// Length of the hex form of a document id
    pub const HEX_LEN: usize = 24;

    /// Parse an id, returning `None` when `value` is not a valid document id
    pub fn parse(value: &str) -> Option<Self> {
        if Self::is_valid(value) {
            Some(Self(value.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Check whether `value` has the shape of a document id
    pub fn is_valid(value: &str) -> bool {
        value.len() == Self::HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Build an id from a timestamp and a counter, ObjectId style
    pub fn from_parts(timestamp: u32, counter: u64) -> Self {
        Self(format!("{:08x}{:016x}", timestamp, counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PokemonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted Pokemon record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: PokemonId,
    pub no: i32,
    pub name: String,
}

/// Input for a new record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPokemon {
    pub name: String,
    pub no: i32,
}

impl NewPokemon {
    pub fn new(name: impl Into<String>, no: i32) -> Self {
        Self {
            name: name.into(),
            no,
        }
    }

    /// Normalize the name and check field constraints
    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            no: validate_no(self.no)?,
        })
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<i32>,
}

impl PokemonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.no.is_none()
    }

    /// Builder: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set ordinal number
    pub fn with_no(mut self, no: i32) -> Self {
        self.no = Some(no);
        self
    }

    /// Normalize the name and check field constraints of present fields
    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            name: self.name.as_deref().map(normalize_name).transpose()?,
            no: self.no.map(validate_no).transpose()?,
        })
    }

    /// Apply this patch onto a record
    pub fn apply_to(&self, pokemon: &mut Pokemon) {
        if let Some(ref name) = self.name {
            pokemon.name = name.clone();
        }
        if let Some(no) = self.no {
            pokemon.no = no;
        }
    }
}

/// Offset/limit pagination as requested by a caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self { limit, offset }
    }

    /// Resolve missing fields against `default_limit`
    pub fn resolve(&self, default_limit: u32) -> Result<Page> {
        let limit = self.limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(PokedexError::bad_request("limit must be at least 1"));
        }
        Ok(Page {
            limit,
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// Fully resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

/// Trim and lowercase a name; empty names are rejected
pub fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(PokedexError::bad_request("name must not be empty"));
    }
    Ok(name)
}

/// Read a lookup term as an ordinal number
///
/// Accepts plain integers and any decimal or exponent form with an integral
/// value in `i32` range, so `"25"`, `"25.0"` and `"2.5e1"` all read as 25.
pub fn parse_ordinal(term: &str) -> Option<i32> {
    let term = term.trim();
    if let Ok(no) = term.parse::<i32>() {
        return Some(no);
    }

    let value = term.parse::<f64>().ok()?;
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i32)
}

fn validate_no(no: i32) -> Result<i32> {
    if no < 1 {
        return Err(PokedexError::bad_request(format!(
            "no must be a positive integer, got {}",
            no
        )));
    }
    Ok(no)
}

// ============================================================================
// Remote listing payload
// ============================================================================

/// One page of the remote catalogue listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokeListing {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<ListingEntry>,
}

/// `{ name, url }` pair from the catalogue listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub url: String,
}

impl ListingEntry {
    /// Ordinal number taken from the trailing path segment of the entry url
    ///
    /// `https://pokeapi.co/api/v2/pokemon/25/` yields `25`.
    pub fn ordinal(&self) -> Result<i32> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse::<i32>().ok())
            .ok_or_else(|| PokedexError::Serialization {
                message: format!("no ordinal number in listing url {}", self.url),
                source: None,
            })
    }

    /// Convert into a normalized insert
    pub fn to_new_pokemon(&self) -> Result<NewPokemon> {
        NewPokemon::new(&self.name, self.ordinal()?).normalized()
    }
}
