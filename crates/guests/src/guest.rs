use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weddingdesk_core::{
    DomainError, DomainResult, Entity, EntityId, NewRecord, WeddingId, deserialize_present,
    non_blank, patch_optional,
};

/// A single invited person.
///
/// `household_id`, when set, names a household of the same wedding; `None`
/// means the guest is ungrouped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: EntityId,
    pub wedding_id: WeddingId,
    pub household_id: Option<EntityId>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Free-form tag such as `family` or `friend`.
    pub role: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    pub(crate) fn from_fields(record: NewRecord, fields: NewGuest) -> Self {
        Self {
            id: record.id,
            wedding_id: record.wedding_id,
            household_id: fields.household_id,
            first_name: fields.first_name.trim().to_string(),
            last_name: non_blank(fields.last_name),
            email: non_blank(fields.email),
            role: non_blank(fields.role),
            notes: non_blank(fields.notes),
            created_at: record.created_at,
            updated_at: record.created_at,
        }
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::validation("guest first name cannot be empty"));
        }
        Ok(())
    }

    /// Name used when the guest is listed (first and last name).
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

impl Entity for Guest {
    const KIND: &'static str = "guest";

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

/// Fields accepted when creating a guest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGuest {
    pub household_id: Option<EntityId>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub notes: Option<String>,
}

impl NewGuest {
    pub fn named(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            ..Self::default()
        }
    }

    pub fn in_household(mut self, household_id: EntityId) -> Self {
        self.household_id = Some(household_id);
        self
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::validation("guest first name cannot be empty"));
        }
        Ok(())
    }
}

/// Partial update of a guest.
///
/// `household_id`: absent keeps the current household, `null` ungroups the
/// guest, an id moves the guest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestPatch {
    #[serde(deserialize_with = "deserialize_present")]
    pub household_id: Option<Option<EntityId>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub notes: Option<String>,
}

impl GuestPatch {
    pub fn apply(self, mut guest: Guest) -> Guest {
        if let Some(household_id) = self.household_id {
            guest.household_id = household_id;
        }
        if let Some(first_name) = self.first_name {
            guest.first_name = first_name.trim().to_string();
        }
        guest.last_name = patch_optional(guest.last_name, self.last_name);
        guest.email = patch_optional(guest.email, self.email);
        guest.role = patch_optional(guest.role, self.role);
        guest.notes = patch_optional(guest.notes, self.notes);
        guest
    }
}
