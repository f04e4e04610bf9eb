//! Invitation book: per-wedding, per-event invitations and RSVP summaries.
//!
//! # Invariants
//! - At most one invitation per (wedding, event, subject); re-submitting a
//!   subject updates the existing invitation in place.
//! - Event and subject of a stored invitation never change.
//! - Summaries are computed from the store on every call.

use serde::Serialize;

use weddingdesk_core::{
    DomainError, DomainResult, EntityId, EntityStore, EventId, InMemoryEntityStore, WeddingId,
};
use weddingdesk_guests::{Guest, GuestDirectory, Household};

use crate::invitation::{
    Invitation, InvitationEntry, InvitationPatch, InvitationStatus, InvitationSubject,
};

/// RSVP totals of one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationSummary {
    pub not_invited: usize,
    pub invited: usize,
    pub accepted: usize,
    pub declined: usize,
    pub maybe: usize,
    /// Head count over accepted invitations.
    pub attending_count: u64,
}

impl InvitationSummary {
    pub fn count(&self, status: InvitationStatus) -> usize {
        match status {
            InvitationStatus::NotInvited => self.not_invited,
            InvitationStatus::Invited => self.invited,
            InvitationStatus::Accepted => self.accepted,
            InvitationStatus::Declined => self.declined,
            InvitationStatus::Maybe => self.maybe,
        }
    }

    pub fn total(&self) -> usize {
        InvitationStatus::ALL.iter().map(|s| self.count(*s)).sum()
    }

    fn record(&mut self, invitation: &Invitation) {
        let bucket = match invitation.status {
            InvitationStatus::NotInvited => &mut self.not_invited,
            InvitationStatus::Invited => &mut self.invited,
            InvitationStatus::Accepted => &mut self.accepted,
            InvitationStatus::Declined => &mut self.declined,
            InvitationStatus::Maybe => &mut self.maybe,
        };
        *bucket += 1;

        if invitation.status == InvitationStatus::Accepted {
            self.attending_count += u64::from(invitation.attending_or_invited());
        }
    }
}

/// An invitation with the display name of its guest or household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: Invitation,
    /// `None` when the subject cannot be found in the invitation's wedding.
    pub display_name: Option<String>,
}

/// Owner of the invitation collection.
#[derive(Debug)]
pub struct InvitationBook<S = InMemoryEntityStore<Invitation>> {
    store: S,
}

impl InvitationBook {
    pub fn in_memory() -> Self {
        Self::new(InMemoryEntityStore::new())
    }
}

impl Default for InvitationBook {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S> InvitationBook<S>
where
    S: EntityStore<Invitation>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create or update one invitation per entry, returned in input order.
    ///
    /// All entries are validated before anything is written: one invalid
    /// entry rejects the whole batch.
    pub fn add_or_update_invitations(
        &self,
        wedding_id: &WeddingId,
        event_id: &EventId,
        entries: Vec<InvitationEntry>,
    ) -> DomainResult<Vec<Invitation>> {
        let valid = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.validate().map_err(|err| {
                    DomainError::validation(format!("invitation entry {index}: {err}"))
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let mut affected = Vec::with_capacity(valid.len());
        for entry in valid {
            let subject = entry.subject.clone();
            let replacement = entry.clone();
            let invitation = self.store.upsert(
                wedding_id,
                |existing: &Invitation| {
                    &existing.event_id == event_id && existing.subject == subject
                },
                |existing: Invitation| Ok(existing.replace_with(replacement)),
                |record| Invitation::from_entry(record, event_id.clone(), entry),
            )?;
            affected.push(invitation);
        }

        tracing::info!(
            wedding_id = %wedding_id,
            event_id = %event_id,
            invitations = affected.len(),
            "invitations saved"
        );
        Ok(affected)
    }

    /// Apply `mutator` to an invitation; `Ok(None)` means the id is unknown.
    ///
    /// Only status, counts and notes may change. Accepting an invitation
    /// without an attending count sets it to the invited count.
    pub fn update_invitation<F>(&self, id: &EntityId, mutator: F) -> DomainResult<Option<Invitation>>
    where
        F: FnOnce(Invitation) -> Invitation,
    {
        let updated = self.store.update_by_id(id, |current: Invitation| {
            let event_id = current.event_id.clone();
            let subject = current.subject.clone();
            let next = mutator(current);
            if next.event_id != event_id || next.subject != subject {
                return Err(DomainError::invariant(
                    "invitation event and subject are immutable",
                ));
            }
            Ok(next.with_default_attending())
        })?;

        match &updated {
            Some(invitation) => tracing::info!(
                invitation_id = %id,
                status = %invitation.status,
                "invitation updated"
            ),
            None => tracing::debug!(invitation_id = %id, "invitation update skipped: unknown id"),
        }
        Ok(updated)
    }

    /// Validate and apply a partial update.
    pub fn apply_patch(
        &self,
        id: &EntityId,
        patch: InvitationPatch,
    ) -> DomainResult<Option<Invitation>> {
        let mutator = patch.into_mutator()?;
        self.update_invitation(id, mutator)
    }

    pub fn find_invitation(&self, id: &EntityId) -> Option<(Invitation, WeddingId)> {
        self.store.find_by_id(id)
    }

    /// Invitations of one event, in insertion order.
    pub fn list_invitations(&self, wedding_id: &WeddingId, event_id: &EventId) -> Vec<Invitation> {
        self.store
            .list_by_partition(wedding_id)
            .into_iter()
            .filter(|invitation| &invitation.event_id == event_id)
            .collect()
    }

    pub fn invitation_summary(&self, wedding_id: &WeddingId, event_id: &EventId) -> InvitationSummary {
        let mut summary = InvitationSummary::default();
        for invitation in self.list_invitations(wedding_id, event_id) {
            summary.record(&invitation);
        }

        tracing::debug!(
            wedding_id = %wedding_id,
            event_id = %event_id,
            accepted = summary.accepted,
            attending = summary.attending_count,
            "invitation summary computed"
        );
        summary
    }

    /// Invitations of one event joined with their subjects' display names.
    ///
    /// Subjects are resolved through the directory's read operations.
    pub fn list_invitations_with_subjects<H, G>(
        &self,
        wedding_id: &WeddingId,
        event_id: &EventId,
        directory: &GuestDirectory<H, G>,
    ) -> Vec<InvitationView>
    where
        H: EntityStore<Household>,
        G: EntityStore<Guest>,
    {
        self.list_invitations(wedding_id, event_id)
            .into_iter()
            .map(|invitation| {
                let display_name = match &invitation.subject {
                    InvitationSubject::Guest { guest_id } => directory
                        .find_guest(guest_id)
                        .filter(|(_, owner)| owner == wedding_id)
                        .map(|(guest, _)| guest.display_name()),
                    InvitationSubject::Household { household_id } => directory
                        .find_household(household_id)
                        .filter(|(_, owner)| owner == wedding_id)
                        .map(|(household, _)| household.name),
                };
                if display_name.is_none() {
                    tracing::warn!(
                        invitation_id = %invitation.id,
                        subject_id = %invitation.subject.subject_id(),
                        "invitation subject not found"
                    );
                }
                InvitationView {
                    invitation,
                    display_name,
                }
            })
            .collect()
    }
}
