//! Vendor registry of each wedding.

use weddingdesk_core::{
    DomainResult, EntityId, EntityStore, EventId, InMemoryEntityStore, WeddingId,
};

use crate::vendor::{NewVendor, Vendor, VendorPatch};

/// Owner of the vendor collection.
#[derive(Debug)]
pub struct VendorRegistry<S = InMemoryEntityStore<Vendor>> {
    store: S,
}

impl VendorRegistry {
    pub fn in_memory() -> Self {
        Self::new(InMemoryEntityStore::new())
    }
}

impl Default for VendorRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S> VendorRegistry<S>
where
    S: EntityStore<Vendor>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn add_vendor(&self, wedding_id: &WeddingId, fields: NewVendor) -> DomainResult<Vendor> {
        fields.validate()?;
        let vendor = self
            .store
            .create(wedding_id, |record| Vendor::from_fields(record, fields))?;

        tracing::info!(
            wedding_id = %wedding_id,
            vendor_id = %vendor.id,
            status = %vendor.status,
            "vendor added"
        );
        Ok(vendor)
    }

    /// Apply `mutator` to a vendor; `Ok(None)` means the id is unknown.
    pub fn update_vendor<F>(&self, id: &EntityId, mutator: F) -> DomainResult<Option<Vendor>>
    where
        F: FnOnce(Vendor) -> Vendor,
    {
        let updated = self
            .store
            .update_by_id(id, |current: Vendor| mutator(current).validated())?;

        match &updated {
            Some(vendor) => tracing::info!(vendor_id = %id, status = %vendor.status, "vendor updated"),
            None => tracing::debug!(vendor_id = %id, "vendor update skipped: unknown id"),
        }
        Ok(updated)
    }

    pub fn apply_patch(&self, id: &EntityId, patch: VendorPatch) -> DomainResult<Option<Vendor>> {
        self.update_vendor(id, |vendor| patch.apply(vendor))
    }

    /// Add `event_id` to the vendor's links (no-op when already linked).
    pub fn link_event(&self, id: &EntityId, event_id: &EventId) -> DomainResult<Option<Vendor>> {
        self.update_vendor(id, |mut vendor| {
            vendor.linked_event_ids.push(event_id.clone());
            vendor
        })
    }

    pub fn unlink_event(&self, id: &EntityId, event_id: &EventId) -> DomainResult<Option<Vendor>> {
        self.update_vendor(id, |mut vendor| {
            vendor.linked_event_ids.retain(|linked| linked != event_id);
            vendor
        })
    }

    pub fn find_vendor(&self, id: &EntityId) -> Option<(Vendor, WeddingId)> {
        self.store.find_by_id(id)
    }

    pub fn list_vendors(&self, wedding_id: &WeddingId) -> Vec<Vendor> {
        self.store.list_by_partition(wedding_id)
    }

    /// Vendors of the wedding linked to `event_id`, in insertion order.
    pub fn list_vendors_for_event(&self, wedding_id: &WeddingId, event_id: &EventId) -> Vec<Vendor> {
        self.store
            .list_by_partition(wedding_id)
            .into_iter()
            .filter(|vendor| vendor.is_linked_to(event_id))
            .collect()
    }
}
