use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weddingdesk_core::{
    DomainResult, Entity, EntityId, EntityStore, InMemoryEntityStore, NewRecord, WeddingId,
};

/// Participants every wedding starts with: (name, role, primary).
const DEFAULT_PARTICIPANTS: [(&str, &str, bool); 3] = [
    ("Bride", "bride", true),
    ("Groom", "groom", true),
    ("Parent", "parent", false),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingParticipant {
    pub id: EntityId,
    pub wedding_id: WeddingId,
    pub name: String,
    pub role: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for WeddingParticipant {
    const KIND: &'static str = "participant";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn wedding_id(&self) -> &WeddingId {
        &self.wedding_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// Participant lists, seeded with defaults on first request per wedding.
#[derive(Debug)]
pub struct ParticipantRoster<S = InMemoryEntityStore<WeddingParticipant>> {
    store: S,
    seeded: Mutex<HashSet<WeddingId>>,
}

impl ParticipantRoster {
    pub fn in_memory() -> Self {
        Self::new(InMemoryEntityStore::new())
    }
}

impl Default for ParticipantRoster {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S> ParticipantRoster<S>
where
    S: EntityStore<WeddingParticipant>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            seeded: Mutex::new(HashSet::new()),
        }
    }

    /// Participants of the wedding; the first call seeds the defaults.
    pub fn list_participants(&self, wedding_id: &WeddingId) -> DomainResult<Vec<WeddingParticipant>> {
        self.ensure_seeded(wedding_id)?;
        Ok(self.store.list_by_partition(wedding_id))
    }

    pub fn find_participant(&self, id: &EntityId) -> Option<(WeddingParticipant, WeddingId)> {
        self.store.find_by_id(id)
    }

    fn ensure_seeded(&self, wedding_id: &WeddingId) -> DomainResult<()> {
        // Held across seeding so concurrent first requests seed once.
        let mut seeded = self.seeded.lock().unwrap_or_else(PoisonError::into_inner);
        if seeded.contains(wedding_id) {
            return Ok(());
        }

        if self.store.count(wedding_id) == 0 {
            for (name, role, is_primary) in DEFAULT_PARTICIPANTS {
                self.store.create(wedding_id, |record: NewRecord| WeddingParticipant {
                    id: record.id,
                    wedding_id: record.wedding_id,
                    name: name.to_string(),
                    role: role.to_string(),
                    is_primary,
                    created_at: record.created_at,
                    updated_at: record.created_at,
                })?;
            }
            tracing::info!(wedding_id = %wedding_id, "default participants seeded");
        }

        seeded.insert(wedding_id.clone());
        Ok(())
    }
}
