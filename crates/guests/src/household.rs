use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weddingdesk_core::{
    DomainError, DomainResult, Entity, EntityId, NewRecord, WeddingId, non_blank, patch_optional,
};

/// Optional postal address of a household.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostalAddress {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl PostalAddress {
    fn cleaned(self) -> Self {
        Self {
            address_line1: non_blank(self.address_line1),
            address_line2: non_blank(self.address_line2),
            city: non_blank(self.city),
            region: non_blank(self.region),
            postal_code: non_blank(self.postal_code),
            country: non_blank(self.country),
        }
    }
}

/// A group of guests invited and addressed together (a family, a couple).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: EntityId,
    pub wedding_id: WeddingId,
    pub name: String,
    #[serde(flatten)]
    pub address: PostalAddress,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Household {
    pub(crate) fn from_fields(record: NewRecord, fields: NewHousehold) -> Self {
        Self {
            id: record.id,
            wedding_id: record.wedding_id,
            name: fields.name.trim().to_string(),
            address: fields.address.cleaned(),
            notes: non_blank(fields.notes),
            created_at: record.created_at,
            updated_at: record.created_at,
        }
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("household name cannot be empty"));
        }
        Ok(())
    }
}

impl Entity for Household {
    const KIND: &'static str = "household";

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

/// Fields accepted when creating a household.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewHousehold {
    pub name: String,
    #[serde(flatten)]
    pub address: PostalAddress,
    pub notes: Option<String>,
}

impl NewHousehold {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("household name cannot be empty"));
        }
        Ok(())
    }
}

/// Partial update of a household.
///
/// Absent fields are kept; blank strings clear optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseholdPatch {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

impl HouseholdPatch {
    pub fn apply(self, mut household: Household) -> Household {
        if let Some(name) = self.name {
            household.name = name.trim().to_string();
        }
        let address = household.address;
        household.address = PostalAddress {
            address_line1: patch_optional(address.address_line1, self.address_line1),
            address_line2: patch_optional(address.address_line2, self.address_line2),
            city: patch_optional(address.city, self.city),
            region: patch_optional(address.region, self.region),
            postal_code: patch_optional(address.postal_code, self.postal_code),
            country: patch_optional(address.country, self.country),
        };
        household.notes = patch_optional(household.notes, self.notes);
        household
    }
}
