use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weddingdesk_core::{
    DomainError, DomainResult, Entity, EntityId, EventId, NewRecord, WeddingId, closed_enum,
    deserialize_present, non_blank, patch_optional,
};

closed_enum! {
    "invitation status";
    /// RSVP state of an invitation.
    pub enum InvitationStatus {
        NotInvited => "not_invited",
        Invited => "invited",
        Accepted => "accepted",
        Declined => "declined",
        Maybe => "maybe",
    }
}

closed_enum! {
    "invite level";
    /// Whether an invitation addresses one guest or a whole household.
    pub enum InviteLevel {
        Guest => "guest",
        Household => "household",
    }
}

/// Who an invitation is addressed to.
///
/// Serialized inline as `inviteLevel` plus `guestId` or `householdId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "inviteLevel", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum InvitationSubject {
    Guest { guest_id: EntityId },
    Household { household_id: EntityId },
}

impl InvitationSubject {
    pub fn level(&self) -> InviteLevel {
        match self {
            InvitationSubject::Guest { .. } => InviteLevel::Guest,
            InvitationSubject::Household { .. } => InviteLevel::Household,
        }
    }

    pub fn subject_id(&self) -> &EntityId {
        match self {
            InvitationSubject::Guest { guest_id } => guest_id,
            InvitationSubject::Household { household_id } => household_id,
        }
    }
}

/// Invitation of one subject to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: EntityId,
    pub wedding_id: WeddingId,
    pub event_id: EventId,
    #[serde(flatten)]
    pub subject: InvitationSubject,
    pub status: InvitationStatus,
    pub invited_count: u32,
    /// `None` (serialized as `null`) until set explicitly or defaulted to
    /// `invited_count` by an acceptance; readers treat `null` as 0 attendees
    /// unless the invitation is accepted.
    pub attending_count: Option<u32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    pub(crate) fn from_entry(record: NewRecord, event_id: EventId, entry: ValidEntry) -> Self {
        Self {
            id: record.id,
            wedding_id: record.wedding_id,
            event_id,
            subject: entry.subject,
            status: entry.status,
            invited_count: entry.invited_count,
            attending_count: entry.attending_count,
            notes: entry.notes,
            created_at: record.created_at,
            updated_at: record.created_at,
        }
        .with_default_attending()
    }

    /// Replace the mutable fields with those of a re-submitted entry.
    pub(crate) fn replace_with(mut self, entry: ValidEntry) -> Self {
        self.status = entry.status;
        self.invited_count = entry.invited_count;
        self.attending_count = entry.attending_count;
        self.notes = entry.notes;
        self.with_default_attending()
    }

    /// An accepted invitation without an explicit attending count attends
    /// with its invited count.
    pub(crate) fn with_default_attending(mut self) -> Self {
        if self.status == InvitationStatus::Accepted && self.attending_count.is_none() {
            self.attending_count = Some(self.invited_count);
        }
        self
    }

    /// Head count this invitation contributes when accepted.
    pub fn attending_or_invited(&self) -> u32 {
        match self.attending_count {
            Some(count) => count,
            None if self.invited_count > 0 => self.invited_count,
            None => 1,
        }
    }
}

impl Entity for Invitation {
    const KIND: &'static str = "invitation";

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

/// One invitation as submitted by a collaborator.
///
/// Exactly one of `guest_id`/`household_id` must be set, matching
/// `invite_level`. When `invite_level` is omitted it follows from the id
/// that is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvitationEntry {
    pub invite_level: Option<String>,
    pub guest_id: Option<EntityId>,
    pub household_id: Option<EntityId>,
    pub status: Option<String>,
    pub invited_count: Option<u32>,
    pub attending_count: Option<u32>,
    pub notes: Option<String>,
}

impl InvitationEntry {
    pub fn guest(guest_id: EntityId) -> Self {
        Self {
            invite_level: Some(InviteLevel::Guest.as_str().to_string()),
            guest_id: Some(guest_id),
            ..Self::default()
        }
    }

    pub fn household(household_id: EntityId) -> Self {
        Self {
            invite_level: Some(InviteLevel::Household.as_str().to_string()),
            household_id: Some(household_id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_invited_count(mut self, count: u32) -> Self {
        self.invited_count = Some(count);
        self
    }

    pub fn with_attending_count(mut self, count: u32) -> Self {
        self.attending_count = Some(count);
        self
    }

    /// Check the entry and apply creation defaults.
    pub(crate) fn validate(self) -> DomainResult<ValidEntry> {
        let guest_id = present(self.guest_id);
        let household_id = present(self.household_id);

        let level = match self.invite_level.as_deref() {
            Some(raw) => raw.parse::<InviteLevel>()?,
            None => match (&guest_id, &household_id) {
                (Some(_), None) => InviteLevel::Guest,
                (None, Some(_)) => InviteLevel::Household,
                _ => {
                    return Err(DomainError::validation(
                        "invite level is required when both or neither subject ids are set",
                    ));
                }
            },
        };

        let subject = match (level, guest_id, household_id) {
            (InviteLevel::Guest, Some(guest_id), None) => InvitationSubject::Guest { guest_id },
            (InviteLevel::Household, None, Some(household_id)) => {
                InvitationSubject::Household { household_id }
            }
            (InviteLevel::Guest, _, _) => {
                return Err(DomainError::validation(
                    "guest-level invitation needs a guestId and no householdId",
                ));
            }
            (InviteLevel::Household, _, _) => {
                return Err(DomainError::validation(
                    "household-level invitation needs a householdId and no guestId",
                ));
            }
        };

        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<InvitationStatus>()?,
            None => InvitationStatus::Invited,
        };
        Ok(ValidEntry {
            subject,
            status,
            invited_count: self.invited_count.unwrap_or(1),
            attending_count: self.attending_count,
            notes: non_blank(self.notes),
        })
    }
}

/// A subject id with surrounding whitespace removed; blank ids count as unset.
fn present(id: Option<EntityId>) -> Option<EntityId> {
    non_blank(id.map(String::from)).map(EntityId::new)
}

/// An entry that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidEntry {
    pub(crate) subject: InvitationSubject,
    pub(crate) status: InvitationStatus,
    pub(crate) invited_count: u32,
    pub(crate) attending_count: Option<u32>,
    pub(crate) notes: Option<String>,
}

/// Partial update of an invitation's mutable fields.
///
/// `attending_count: null` resets the count to "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvitationPatch {
    pub status: Option<String>,
    pub invited_count: Option<u32>,
    #[serde(deserialize_with = "deserialize_present")]
    pub attending_count: Option<Option<u32>>,
    pub notes: Option<String>,
}

impl InvitationPatch {
    /// Validate the patch and turn it into a mutator.
    ///
    /// An unknown status rejects the whole patch.
    pub fn into_mutator(self) -> DomainResult<impl FnOnce(Invitation) -> Invitation> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<InvitationStatus>)
            .transpose()?;

        Ok(move |mut invitation: Invitation| {
            if let Some(status) = status {
                invitation.status = status;
            }
            if let Some(count) = self.invited_count {
                invitation.invited_count = count;
            }
            if let Some(count) = self.attending_count {
                invitation.attending_count = count;
            }
            invitation.notes = patch_optional(invitation.notes, self.notes);
            invitation
        })
    }
}
