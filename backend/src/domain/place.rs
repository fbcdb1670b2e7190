//! Place queries and cache-key normalisation.
//!
//! A [`PlaceQuery`] is the free-text city name supplied by a caller, e.g.
//! `"Volgograd, Russia"`. A [`CacheKey`] is derived from it
//! deterministically: inputs differing only in case or surrounding
//! whitespace always map to the same key. Collisions between genuinely
//! distinct place names are an accepted risk, not a correctness bug, since
//! the external source disambiguates by the same text.

use std::fmt;

use sha2::{Digest, Sha256};

use super::error::GraphError;

/// Maximum key length before the fingerprint suffix kicks in.
const MAX_KEY_CHARS: usize = 100;
/// Hex characters of the SHA-256 fingerprint appended on truncation.
const FINGERPRINT_CHARS: usize = 12;

/// A validated, trimmed free-text place name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery(String);

impl PlaceQuery {
    /// Validate a raw query string.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidQuery`] when the input is empty or
    /// whitespace-only.
    pub fn new(raw: &str) -> Result<Self, GraphError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GraphError::invalid_query(
                "place name must not be empty or whitespace-only",
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the place name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for PlaceQuery {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Canonical cache identity for a place.
///
/// Keys are lower-cased alphanumerics joined by `_`. Unicode letters are
/// kept as-is, so `Волгоград` keys as `волгоград`; the result contains no
/// whitespace, path separators, or punctuation and is safe both as a file
/// name in the durable tier and inside a namespaced Redis key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a place query.
    ///
    /// Lower-cases the name, drops everything outside alphanumerics,
    /// spaces, and hyphens, then collapses separator runs into single
    /// underscores. Keys longer than the cap are truncated and suffixed
    /// with a SHA-256 fingerprint of the full normalised text so distinct
    /// long names stay collision-free.
    #[must_use]
    pub fn from_place(place: &PlaceQuery) -> Self {
        let lowered = place.as_str().to_lowercase();
        let kept: String = lowered
            .chars()
            .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace() || *ch == '-' || *ch == '_')
            .collect();

        let mut normalised = String::with_capacity(kept.len());
        let mut pending_separator = false;
        for ch in kept.chars() {
            if ch.is_whitespace() || ch == '-' || ch == '_' {
                pending_separator = !normalised.is_empty();
            } else {
                if pending_separator {
                    normalised.push('_');
                    pending_separator = false;
                }
                normalised.push(ch);
            }
        }

        if normalised.chars().count() > MAX_KEY_CHARS {
            let digest = Sha256::digest(normalised.as_bytes());
            let fingerprint: String = hex::encode(digest).chars().take(FINGERPRINT_CHARS).collect();
            let keep = MAX_KEY_CHARS - FINGERPRINT_CHARS - 1;
            let head: String = normalised.chars().take(keep).collect();
            normalised = format!("{head}_{fingerprint}");
        }

        Self(normalised)
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
