//! Identifiers used across the domain.
//!
//! All identifiers are opaque strings. Wedding and event ids come from the
//! routing layer unchanged; entity ids are minted by [`EntityId::generate`]
//! as `<kind>_<32 hex chars>`.

use core::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Builder;

use crate::error::DomainError;

/// Identifier of a wedding (the partition key of every collection).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeddingId(String);

/// Identifier of a wedding event (ceremony, reception, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

/// Identifier of a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an identifier without validation.
            ///
            /// Use `str::parse` for untrusted input.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: must not be blank", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_newtype!(WeddingId, "WeddingId");
impl_string_newtype!(EventId, "EventId");
impl_string_newtype!(EntityId, "EntityId");

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

impl EntityId {
    /// Mint a fresh id for an entity of the given kind.
    ///
    /// The suffix carries 122 random bits from the OS random source. When that
    /// source is unavailable a clock-seeded generator is used instead, mixed
    /// with a process-wide counter so ids stay distinct within the process.
    pub fn generate(kind: &str) -> Self {
        let suffix = Builder::from_random_bytes(random_bytes()).into_uuid();
        Self(format!("{kind}_{}", suffix.simple()))
    }

    /// Kind prefix of a generated id (empty for ids without one).
    pub fn kind(&self) -> &str {
        self.0.split_once('_').map_or("", |(kind, _)| kind)
    }
}

fn random_bytes() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "os random source unavailable, using seeded fallback");
            fallback_bytes()
        }
    }
}

pub(crate) fn fallback_bytes() -> [u8; 16] {
    let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let seed = nanos ^ (u64::from(std::process::id()) << 32) ^ counter.rotate_left(29);

    let mut bytes = [0u8; 16];
    StdRng::seed_from_u64(seed).fill_bytes(&mut bytes);

    // Low 48 bits hold the counter; bytes 6 and 8 are overwritten by the uuid
    // version/variant, so the counter stays clear of them.
    bytes[10..].copy_from_slice(&counter.to_be_bytes()[2..]);
    bytes
}
