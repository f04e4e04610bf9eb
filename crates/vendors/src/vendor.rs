use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weddingdesk_core::{
    DomainError, DomainResult, Entity, EntityId, EventId, NewRecord, WeddingId, closed_enum,
    deserialize_present, non_blank, normalize, patch_optional,
};

closed_enum! {
    "vendor status";
    /// Booking pipeline of a vendor.
    pub enum VendorStatus {
        Shortlisted => "shortlisted",
        Contacted => "contacted",
        Negotiating => "negotiating",
        Booked => "booked",
        Declined => "declined",
    }
}

impl Default for VendorStatus {
    fn default() -> Self {
        VendorStatus::Shortlisted
    }
}

closed_enum! {
    "vendor priority";
    pub enum VendorPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// How to reach a vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorContact {
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub website_url: Option<String>,
    pub instagram_handle: Option<String>,
}

impl VendorContact {
    fn cleaned(self) -> Self {
        Self {
            contact_name: non_blank(self.contact_name),
            contact_phone: non_blank(self.contact_phone),
            whatsapp_number: non_blank(self.whatsapp_number),
            website_url: non_blank(self.website_url),
            instagram_handle: non_blank(self.instagram_handle),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: EntityId,
    pub wedding_id: WeddingId,
    pub name: String,
    pub category: Option<String>,
    #[serde(flatten)]
    pub contact: VendorContact,
    pub notes: Option<String>,
    pub status: VendorStatus,
    pub priority: Option<VendorPriority>,
    /// Events this vendor serves; order kept, no duplicates.
    pub linked_event_ids: Vec<EventId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    pub(crate) fn from_fields(record: NewRecord, fields: NewVendor) -> Self {
        Self {
            id: record.id,
            wedding_id: record.wedding_id,
            name: fields.name.trim().to_string(),
            category: non_blank(fields.category),
            contact: fields.contact.cleaned(),
            notes: non_blank(fields.notes),
            status: normalize(fields.status.as_deref(), VendorStatus::default()),
            priority: normalize(fields.priority.as_deref(), Priority(None)).0,
            linked_event_ids: dedup_events(fields.linked_event_ids),
            created_at: record.created_at,
            updated_at: record.created_at,
        }
    }

    /// Check required fields and restore the link-set shape after a mutation.
    pub(crate) fn validated(mut self) -> DomainResult<Self> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("vendor name cannot be empty"));
        }
        self.linked_event_ids = dedup_events(self.linked_event_ids);
        Ok(self)
    }

    pub fn is_linked_to(&self, event_id: &EventId) -> bool {
        self.linked_event_ids.contains(event_id)
    }
}

impl Entity for Vendor {
    const KIND: &'static str = "vendor";

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

/// `Option<VendorPriority>` seen through `FromStr`, so creation can reuse
/// [`normalize`] with "no priority" as fallback.
struct Priority(Option<VendorPriority>);

impl core::str::FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<VendorPriority>().map(|p| Priority(Some(p)))
    }
}

fn dedup_events(events: Vec<EventId>) -> Vec<EventId> {
    let mut unique: Vec<EventId> = Vec::with_capacity(events.len());
    for event in events {
        if !unique.contains(&event) {
            unique.push(event);
        }
    }
    unique
}

/// Fields accepted when creating a vendor.
///
/// `status` and `priority` are raw strings: unknown values fall back to
/// shortlisted / no priority instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewVendor {
    pub name: String,
    pub category: Option<String>,
    #[serde(flatten)]
    pub contact: VendorContact,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub linked_event_ids: Vec<EventId>,
}

impl NewVendor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn linked_to(mut self, events: impl IntoIterator<Item = EventId>) -> Self {
        self.linked_event_ids.extend(events);
        self
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("vendor name cannot be empty"));
        }
        Ok(())
    }
}

/// Partial update of a vendor.
///
/// Unknown `status`/`priority` values leave the field unchanged;
/// `priority: null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub website_url: Option<String>,
    pub instagram_handle: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "deserialize_present")]
    pub priority: Option<Option<String>>,
    pub linked_event_ids: Option<Vec<EventId>>,
}

impl VendorPatch {
    pub fn apply(self, mut vendor: Vendor) -> Vendor {
        if let Some(name) = self.name {
            vendor.name = name.trim().to_string();
        }
        vendor.category = patch_optional(vendor.category, self.category);

        let contact = vendor.contact;
        vendor.contact = VendorContact {
            contact_name: patch_optional(contact.contact_name, self.contact_name),
            contact_phone: patch_optional(contact.contact_phone, self.contact_phone),
            whatsapp_number: patch_optional(contact.whatsapp_number, self.whatsapp_number),
            website_url: patch_optional(contact.website_url, self.website_url),
            instagram_handle: patch_optional(contact.instagram_handle, self.instagram_handle),
        };
        vendor.notes = patch_optional(vendor.notes, self.notes);

        vendor.status = normalize(self.status.as_deref(), vendor.status);
        vendor.priority = match self.priority {
            None => vendor.priority,
            Some(None) => None,
            Some(Some(raw)) => normalize(Some(&raw), Priority(vendor.priority)).0,
        };

        if let Some(events) = self.linked_event_ids {
            vendor.linked_event_ids = dedup_events(events);
        }
        vendor
    }
}
