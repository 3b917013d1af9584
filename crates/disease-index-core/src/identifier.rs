//! Stable short identifiers derived from a disease's canonical address.
//!
//! The default [`IdScheme`] (SHA-1, 10 hex characters) reproduces the
//! identifiers the collector writes, so identifiers computed here can be
//! compared against upstream ones. Truncation shrinks the collision space
//! to 40 bits; large corpora should widen `length` or register addresses
//! through an [`IdRegistry`], which rejects collisions at insertion time.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::IdCollision;

pub const DEFAULT_ID_LENGTH: usize = 10;

/// Hash function used to derive identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdDigest {
    #[default]
    Sha1,
    Sha256,
}

impl IdDigest {
    /// Full digest length in hex characters.
    pub fn hex_len(self) -> usize {
        match self {
            IdDigest::Sha1 => 40,
            IdDigest::Sha256 => 64,
        }
    }
}

/// Digest + truncation length. Immutable for the lifetime of a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdScheme {
    pub digest: IdDigest,
    pub length: usize,
}

impl Default for IdScheme {
    fn default() -> Self {
        Self {
            digest: IdDigest::Sha1,
            length: DEFAULT_ID_LENGTH,
        }
    }
}

impl IdScheme {
    /// Identifier for `address`: the first `length` hex chars of its digest.
    pub fn assign(&self, address: &str) -> String {
        let mut full = match self.digest {
            IdDigest::Sha1 => hex::encode(Sha1::digest(address.as_bytes())),
            IdDigest::Sha256 => hex::encode(Sha256::digest(address.as_bytes())),
        };
        full.truncate(self.length.min(self.digest.hex_len()));
        full
    }
}

/// [`IdScheme::assign`] with the default scheme.
pub fn assign(address: &str) -> String {
    IdScheme::default().assign(address)
}

/// Identifiers that occur more than once in `ids`. Only reports.
pub fn detect_duplicates<'a, I>(ids: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut dups = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            dups.insert(id.to_string());
        }
    }
    dups
}

/// Outcome of registering an address with an [`IdRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// First time this identifier was seen.
    New(String),
    /// The same address was registered before.
    Duplicate(String),
}

impl Registration {
    pub fn id(&self) -> &str {
        match self {
            Registration::New(id) | Registration::Duplicate(id) => id,
        }
    }
}

/// Assigns identifiers while rejecting truncation collisions.
#[derive(Debug, Default)]
pub struct IdRegistry {
    scheme: IdScheme,
    by_id: HashMap<String, String>,
}

impl IdRegistry {
    pub fn new(scheme: IdScheme) -> Self {
        Self {
            scheme,
            by_id: HashMap::new(),
        }
    }

    pub fn insert(&mut self, address: &str) -> Result<Registration, IdCollision> {
        let id = self.scheme.assign(address);
        match self.by_id.get(&id) {
            Some(existing) if existing == address => Ok(Registration::Duplicate(id)),
            Some(existing) => Err(IdCollision {
                id,
                address: address.to_string(),
                existing: existing.clone(),
            }),
            None => {
                self.by_id.insert(id.clone(), address.to_string());
                Ok(Registration::New(id))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
