//! Household and guest directory of each wedding.
//!
//! # Invariants
//! - A guest's household belongs to the guest's wedding, checked on create and
//!   whenever an update moves the guest.
//! - Updates never change id, wedding or creation time.
//! - Unknown ids on update yield `Ok(None)` and leave both stores unchanged.

use std::collections::HashMap;

use serde::Serialize;

use weddingdesk_core::{
    DomainError, DomainResult, EntityId, EntityStore, InMemoryEntityStore, WeddingId,
};

use crate::guest::{Guest, NewGuest};
use crate::household::{Household, NewHousehold};

/// A household together with its guests, both in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdWithGuests {
    #[serde(flatten)]
    pub household: Household,
    pub guests: Vec<Guest>,
}

/// Owner of the household and guest collections.
#[derive(Debug)]
pub struct GuestDirectory<H = InMemoryEntityStore<Household>, G = InMemoryEntityStore<Guest>> {
    households: H,
    guests: G,
}

impl GuestDirectory {
    /// Directory backed by fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(InMemoryEntityStore::new(), InMemoryEntityStore::new())
    }
}

impl Default for GuestDirectory {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<H, G> GuestDirectory<H, G>
where
    H: EntityStore<Household>,
    G: EntityStore<Guest>,
{
    pub fn new(households: H, guests: G) -> Self {
        Self { households, guests }
    }

    pub fn add_household(
        &self,
        wedding_id: &WeddingId,
        fields: NewHousehold,
    ) -> DomainResult<Household> {
        fields.validate()?;
        let household = self
            .households
            .create(wedding_id, |record| Household::from_fields(record, fields))?;

        tracing::info!(
            wedding_id = %wedding_id,
            household_id = %household.id,
            "household added"
        );
        Ok(household)
    }

    pub fn add_guest(&self, wedding_id: &WeddingId, fields: NewGuest) -> DomainResult<Guest> {
        fields.validate()?;
        if let Some(household_id) = &fields.household_id {
            self.ensure_household_in_wedding(wedding_id, household_id)?;
        }

        let guest = self
            .guests
            .create(wedding_id, |record| Guest::from_fields(record, fields))?;

        tracing::info!(
            wedding_id = %wedding_id,
            guest_id = %guest.id,
            household_id = guest.household_id.as_ref().map(EntityId::as_str),
            "guest added"
        );
        Ok(guest)
    }

    /// Apply `mutator` to a household.
    ///
    /// The result is re-validated; `Ok(None)` means the id is unknown.
    pub fn update_household<F>(&self, id: &EntityId, mutator: F) -> DomainResult<Option<Household>>
    where
        F: FnOnce(Household) -> Household,
    {
        let updated = self.households.update_by_id(id, |current: Household| {
            let next = mutator(current);
            next.validate()?;
            Ok(next)
        })?;

        match &updated {
            Some(_) => tracing::info!(household_id = %id, "household updated"),
            None => tracing::debug!(household_id = %id, "household update skipped: unknown id"),
        }
        Ok(updated)
    }

    /// Apply `mutator` to a guest.
    ///
    /// A changed household must exist in the guest's wedding; `Ok(None)` means
    /// the id is unknown.
    pub fn update_guest<F>(&self, id: &EntityId, mutator: F) -> DomainResult<Option<Guest>>
    where
        F: FnOnce(Guest) -> Guest,
    {
        let updated = self.guests.update_by_id(id, |current: Guest| {
            let previous_household = current.household_id.clone();
            let next = mutator(current);
            next.validate()?;
            if next.household_id != previous_household {
                if let Some(household_id) = &next.household_id {
                    self.ensure_household_in_wedding(&next.wedding_id, household_id)?;
                }
            }
            Ok(next)
        })?;

        match &updated {
            Some(_) => tracing::info!(guest_id = %id, "guest updated"),
            None => tracing::debug!(guest_id = %id, "guest update skipped: unknown id"),
        }
        Ok(updated)
    }

    pub fn find_household(&self, id: &EntityId) -> Option<(Household, WeddingId)> {
        self.households.find_by_id(id)
    }

    pub fn find_guest(&self, id: &EntityId) -> Option<(Guest, WeddingId)> {
        self.guests.find_by_id(id)
    }

    /// First household of the wedding whose trimmed name equals `name`.
    pub fn find_household_by_name(&self, wedding_id: &WeddingId, name: &str) -> Option<Household> {
        let name = name.trim();
        self.households
            .list_by_partition(wedding_id)
            .into_iter()
            .find(|household| household.name == name)
    }

    pub fn list_households(&self, wedding_id: &WeddingId) -> Vec<Household> {
        self.households.list_by_partition(wedding_id)
    }

    pub fn list_guests(&self, wedding_id: &WeddingId) -> Vec<Guest> {
        self.guests.list_by_partition(wedding_id)
    }

    /// Every household of the wedding with the guests assigned to it.
    ///
    /// Ungrouped guests are not part of the result; see
    /// [`Self::list_ungrouped_guests`].
    pub fn list_households_with_guests(&self, wedding_id: &WeddingId) -> Vec<HouseholdWithGuests> {
        let mut by_household: HashMap<EntityId, Vec<Guest>> = HashMap::new();
        for guest in self.guests.list_by_partition(wedding_id) {
            if let Some(household_id) = guest.household_id.clone() {
                by_household.entry(household_id).or_default().push(guest);
            }
        }

        self.households
            .list_by_partition(wedding_id)
            .into_iter()
            .map(|household| {
                let guests = by_household.remove(&household.id).unwrap_or_default();
                HouseholdWithGuests { household, guests }
            })
            .collect()
    }

    /// Guests of the wedding without a household, in insertion order.
    pub fn list_ungrouped_guests(&self, wedding_id: &WeddingId) -> Vec<Guest> {
        self.guests
            .list_by_partition(wedding_id)
            .into_iter()
            .filter(|guest| guest.household_id.is_none())
            .collect()
    }

    fn ensure_household_in_wedding(
        &self,
        wedding_id: &WeddingId,
        household_id: &EntityId,
    ) -> DomainResult<()> {
        match self.households.find_by_id(household_id) {
            Some((_, owner)) if &owner == wedding_id => Ok(()),
            Some(_) => Err(DomainError::invariant(format!(
                "household {household_id} belongs to another wedding"
            ))),
            None => Err(DomainError::validation(format!(
                "household {household_id} does not exist"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guest::GuestPatch;
    use crate::household::HouseholdPatch;

    fn wedding(id: &str) -> WeddingId {
        WeddingId::new(id)
    }

    #[test]
    fn added_guest_is_listed_once_and_only_in_its_wedding() {
        let directory = GuestDirectory::in_memory();
        let w1 = wedding("w1");
        let w2 = wedding("w2");
        directory.add_guest(&w2, NewGuest::named("Other")).unwrap();

        let guest = directory.add_guest(&w1, NewGuest::named("Sunil")).unwrap();

        let listed = directory.list_guests(&w1);
        assert_eq!(listed.iter().filter(|g| g.id == guest.id).count(), 1);
        assert!(directory.list_guests(&w2).iter().all(|g| g.id != guest.id));
    }

    #[test]
    fn guest_requires_first_name() {
        let directory = GuestDirectory::in_memory();
        let err = directory
            .add_guest(&wedding("w1"), NewGuest::named("   "))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(directory.list_guests(&wedding("w1")).is_empty());
    }

    #[test]
    fn household_requires_name() {
        let directory = GuestDirectory::in_memory();
        let err = directory
            .add_household(&wedding("w1"), NewHousehold::named(""))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn guest_household_must_exist_in_same_wedding() {
        let directory = GuestDirectory::in_memory();
        let foreign = directory
            .add_household(&wedding("w2"), NewHousehold::named("Silva"))
            .unwrap();

        let missing = directory
            .add_guest(
                &wedding("w1"),
                NewGuest::named("Asha").in_household(EntityId::new("household_missing")),
            )
            .unwrap_err();
        let cross = directory
            .add_guest(&wedding("w1"), NewGuest::named("Asha").in_household(foreign.id))
            .unwrap_err();

        assert!(matches!(missing, DomainError::Validation(_)));
        assert!(matches!(cross, DomainError::InvariantViolation(_)));
        assert!(directory.list_guests(&wedding("w1")).is_empty());
    }

    #[test]
    fn households_with_guests_groups_in_insertion_order() {
        let directory = GuestDirectory::in_memory();
        let w = wedding("w1");
        let perera = directory.add_household(&w, NewHousehold::named("Perera")).unwrap();
        let fernando = directory.add_household(&w, NewHousehold::named("Fernando")).unwrap();

        let sunil = directory
            .add_guest(&w, NewGuest::named("Sunil").in_household(perera.id.clone()))
            .unwrap();
        let asha = directory
            .add_guest(&w, NewGuest::named("Asha").in_household(fernando.id.clone()))
            .unwrap();
        let loner = directory.add_guest(&w, NewGuest::named("Nimal")).unwrap();
        let amaya = directory
            .add_guest(&w, NewGuest::named("Amaya").in_household(perera.id.clone()))
            .unwrap();

        let grouped = directory.list_households_with_guests(&w);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].household.id, perera.id);
        assert_eq!(grouped[0].guests, vec![sunil, amaya]);
        assert_eq!(grouped[1].household.id, fernando.id);
        assert_eq!(grouped[1].guests, vec![asha]);
        assert_eq!(directory.list_ungrouped_guests(&w), vec![loner]);
    }

    #[test]
    fn update_of_unknown_ids_is_absent_and_changes_nothing() {
        let directory = GuestDirectory::in_memory();
        let w = wedding("w1");
        let household = directory.add_household(&w, NewHousehold::named("Perera")).unwrap();
        let guest = directory.add_guest(&w, NewGuest::named("Sunil")).unwrap();

        let missing = EntityId::new("guest_missing");
        assert_eq!(
            directory
                .update_guest(&missing, |mut g| {
                    g.first_name = "x".to_string();
                    g
                })
                .unwrap(),
            None
        );
        assert_eq!(
            directory
                .update_household(&missing, |mut h| {
                    h.name = "x".to_string();
                    h
                })
                .unwrap(),
            None
        );

        assert_eq!(directory.list_households(&w), vec![household]);
        assert_eq!(directory.list_guests(&w), vec![guest]);
    }

    #[test]
    fn update_household_applies_patch_and_revalidates() {
        let directory = GuestDirectory::in_memory();
        let w = wedding("w1");
        let household = directory.add_household(&w, NewHousehold::named("Perera")).unwrap();

        let renamed = directory
            .update_household(&household.id, |h| {
                HouseholdPatch {
                    name: Some("Perera-Silva".to_string()),
                    ..HouseholdPatch::default()
                }
                .apply(h)
            })
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Perera-Silva");
        assert_eq!(renamed.id, household.id);

        let err = directory
            .update_household(&household.id, |mut h| {
                h.name = " ".to_string();
                h
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(
            directory.find_household(&household.id).unwrap().0.name,
            "Perera-Silva"
        );
    }

    #[test]
    fn moving_guest_checks_target_household() {
        let directory = GuestDirectory::in_memory();
        let w = wedding("w1");
        let perera = directory.add_household(&w, NewHousehold::named("Perera")).unwrap();
        let guest = directory.add_guest(&w, NewGuest::named("Sunil")).unwrap();

        let moved = directory
            .update_guest(&guest.id, |g| {
                GuestPatch {
                    household_id: Some(Some(perera.id.clone())),
                    ..GuestPatch::default()
                }
                .apply(g)
            })
            .unwrap()
            .unwrap();
        assert_eq!(moved.household_id, Some(perera.id.clone()));

        let err = directory
            .update_guest(&guest.id, |mut g| {
                g.household_id = Some(EntityId::new("household_missing"));
                g
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(
            directory.find_guest(&guest.id).unwrap().0.household_id,
            Some(perera.id)
        );
    }

    #[test]
    fn find_returns_entity_with_owning_wedding() {
        let directory = GuestDirectory::in_memory();
        let guest = directory.add_guest(&wedding("w9"), NewGuest::named("Kamal")).unwrap();

        let (found, owner) = directory.find_guest(&guest.id).unwrap();
        assert_eq!(found, guest);
        assert_eq!(owner, wedding("w9"));
        assert!(directory.find_guest(&EntityId::new("guest_nope")).is_none());
    }

    #[test]
    fn find_household_by_name_matches_trimmed_name() {
        let directory = GuestDirectory::in_memory();
        let w = wedding("w1");
        let perera = directory.add_household(&w, NewHousehold::named("Perera")).unwrap();

        assert_eq!(directory.find_household_by_name(&w, " Perera "), Some(perera));
        assert_eq!(directory.find_household_by_name(&w, "perera"), None);
    }
}
