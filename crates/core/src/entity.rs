//! Entity trait: identity + partition + timestamps.

use chrono::{DateTime, Utc};

use crate::id::{EntityId, WeddingId};

/// Contract every stored record fulfils.
///
/// `id`, `wedding_id` and `created_at` are fixed when the store creates the
/// entity and are checked again after every mutation.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Prefix of ids minted for this kind (`guest`, `vendor`, ...).
    const KIND: &'static str;

    fn id(&self) -> &EntityId;

    fn wedding_id(&self) -> &WeddingId;

    fn created_at(&self) -> DateTime<Utc>;

    /// Record a modification time.
    fn touch(&mut self, at: DateTime<Utc>);
}

/// Identity assigned by the store to an entity being created.
///
/// Factories passed to [`crate::EntityStore::create`] build the entity from
/// this record; `updated_at` starts equal to `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub id: EntityId,
    pub wedding_id: WeddingId,
    pub created_at: DateTime<Utc>,
}
