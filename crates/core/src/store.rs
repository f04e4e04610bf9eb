//! Wedding-partitioned keyed entity store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::entity::{Entity, NewRecord};
use crate::error::{DomainError, DomainResult};
use crate::id::{EntityId, WeddingId};

/// Keyed collection of one entity kind, partitioned by wedding.
///
/// Every mutating operation is atomic with respect to the entity it touches:
/// no other call observes a half-applied create, update or upsert.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Assign a fresh id and timestamps, build the entity and append it to the
    /// wedding's ordered sequence.
    fn create<F>(&self, wedding_id: &WeddingId, factory: F) -> DomainResult<E>
    where
        F: FnOnce(NewRecord) -> E;

    /// Entity plus the wedding owning it, or `None` for an unknown id.
    fn find_by_id(&self, id: &EntityId) -> Option<(E, WeddingId)>;

    /// Replace an entity with the mutator's result.
    ///
    /// Returns `Ok(None)` for an unknown id. A mutator error, or a result that
    /// changes id, wedding or creation time, leaves the stored entity as it was.
    fn update_by_id<F>(&self, id: &EntityId, mutator: F) -> DomainResult<Option<E>>
    where
        F: FnOnce(E) -> DomainResult<E>;

    /// Update the first entity of the wedding accepted by `matches`, or create
    /// one when none is, as a single atomic step.
    fn upsert<M, U, C>(
        &self,
        wedding_id: &WeddingId,
        matches: M,
        update: U,
        create: C,
    ) -> DomainResult<E>
    where
        M: Fn(&E) -> bool,
        U: FnOnce(E) -> DomainResult<E>,
        C: FnOnce(NewRecord) -> E;

    /// Entities of a wedding in insertion order (empty for unknown weddings).
    fn list_by_partition(&self, wedding_id: &WeddingId) -> Vec<E>;

    fn count(&self, wedding_id: &WeddingId) -> usize;
}

impl<E, S> EntityStore<E> for Arc<S>
where
    E: Entity,
    S: EntityStore<E> + ?Sized,
{
    fn create<F>(&self, wedding_id: &WeddingId, factory: F) -> DomainResult<E>
    where
        F: FnOnce(NewRecord) -> E,
    {
        (**self).create(wedding_id, factory)
    }

    fn find_by_id(&self, id: &EntityId) -> Option<(E, WeddingId)> {
        (**self).find_by_id(id)
    }

    fn update_by_id<F>(&self, id: &EntityId, mutator: F) -> DomainResult<Option<E>>
    where
        F: FnOnce(E) -> DomainResult<E>,
    {
        (**self).update_by_id(id, mutator)
    }

    fn upsert<M, U, C>(
        &self,
        wedding_id: &WeddingId,
        matches: M,
        update: U,
        create: C,
    ) -> DomainResult<E>
    where
        M: Fn(&E) -> bool,
        U: FnOnce(E) -> DomainResult<E>,
        C: FnOnce(NewRecord) -> E,
    {
        (**self).upsert(wedding_id, matches, update, create)
    }

    fn list_by_partition(&self, wedding_id: &WeddingId) -> Vec<E> {
        (**self).list_by_partition(wedding_id)
    }

    fn count(&self, wedding_id: &WeddingId) -> usize {
        (**self).count(wedding_id)
    }
}

/// Process-local store; contents live as long as the instance.
///
/// The whole store is serialized behind one lock. Mutators run on owned
/// copies, so a panicking mutator cannot leave a partial write behind and a
/// poisoned lock is safe to keep using.
#[derive(Debug)]
pub struct InMemoryEntityStore<E> {
    inner: RwLock<Partitions<E>>,
}

#[derive(Debug)]
struct Partitions<E> {
    records: HashMap<EntityId, E>,
    order: HashMap<WeddingId, Vec<EntityId>>,
}

impl<E> InMemoryEntityStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Partitions {
                records: HashMap::new(),
                order: HashMap::new(),
            }),
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> RwLockReadGuard<'_, Partitions<E>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Partitions<E>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Partitions<E> {
    fn insert_new<F>(&mut self, wedding_id: &WeddingId, factory: F) -> DomainResult<E>
    where
        F: FnOnce(NewRecord) -> E,
    {
        let mut id = EntityId::generate(E::KIND);
        while self.records.contains_key(&id) {
            id = EntityId::generate(E::KIND);
        }

        let record = NewRecord {
            id,
            wedding_id: wedding_id.clone(),
            created_at: Utc::now(),
        };
        let entity = factory(record.clone());
        if entity.id() != &record.id || entity.wedding_id() != &record.wedding_id {
            return Err(DomainError::invariant(format!(
                "{} factory must keep the assigned id and wedding",
                E::KIND
            )));
        }

        self.records.insert(record.id.clone(), entity.clone());
        self.order
            .entry(record.wedding_id)
            .or_default()
            .push(record.id);
        Ok(entity)
    }

    fn replace<F>(&mut self, id: &EntityId, mutator: F) -> DomainResult<Option<E>>
    where
        F: FnOnce(E) -> DomainResult<E>,
    {
        let Some(current) = self.records.get(id).cloned() else {
            return Ok(None);
        };

        let mut next = mutator(current.clone())?;
        ensure_identity_preserved(&current, &next)?;
        next.touch(Utc::now());

        self.records.insert(id.clone(), next.clone());
        Ok(Some(next))
    }

    fn first_match<M>(&self, wedding_id: &WeddingId, matches: M) -> Option<EntityId>
    where
        M: Fn(&E) -> bool,
    {
        self.order.get(wedding_id)?.iter().find_map(|id| {
            self.records
                .get(id)
                .filter(|entity| matches(*entity))
                .map(|_| id.clone())
        })
    }
}

fn ensure_identity_preserved<E: Entity>(before: &E, after: &E) -> DomainResult<()> {
    if after.id() != before.id() {
        return Err(DomainError::invariant(format!("{} id is immutable", E::KIND)));
    }
    if after.wedding_id() != before.wedding_id() {
        return Err(DomainError::invariant(format!(
            "{} wedding is immutable",
            E::KIND
        )));
    }
    if after.created_at() != before.created_at() {
        return Err(DomainError::invariant(format!(
            "{} creation time is immutable",
            E::KIND
        )));
    }
    Ok(())
}

impl<E: Entity> EntityStore<E> for InMemoryEntityStore<E> {
    fn create<F>(&self, wedding_id: &WeddingId, factory: F) -> DomainResult<E>
    where
        F: FnOnce(NewRecord) -> E,
    {
        self.write().insert_new(wedding_id, factory)
    }

    fn find_by_id(&self, id: &EntityId) -> Option<(E, WeddingId)> {
        let inner = self.read();
        inner
            .records
            .get(id)
            .map(|entity| (entity.clone(), entity.wedding_id().clone()))
    }

    fn update_by_id<F>(&self, id: &EntityId, mutator: F) -> DomainResult<Option<E>>
    where
        F: FnOnce(E) -> DomainResult<E>,
    {
        self.write().replace(id, mutator)
    }

    fn upsert<M, U, C>(
        &self,
        wedding_id: &WeddingId,
        matches: M,
        update: U,
        create: C,
    ) -> DomainResult<E>
    where
        M: Fn(&E) -> bool,
        U: FnOnce(E) -> DomainResult<E>,
        C: FnOnce(NewRecord) -> E,
    {
        let mut inner = self.write();
        match inner.first_match(wedding_id, matches) {
            Some(id) => inner
                .replace(&id, update)?
                .ok_or_else(|| DomainError::invariant(format!("{} vanished during upsert", E::KIND))),
            None => inner.insert_new(wedding_id, create),
        }
    }

    fn list_by_partition(&self, wedding_id: &WeddingId) -> Vec<E> {
        let inner = self.read();
        inner
            .order
            .get(wedding_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.records.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn count(&self, wedding_id: &WeddingId) -> usize {
        self.read().order.get(wedding_id).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{DateTime, Utc};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: EntityId,
        wedding_id: WeddingId,
        text: String,
        hits: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Entity for Note {
        const KIND: &'static str = "note";

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

    fn note(text: &str) -> impl FnOnce(NewRecord) -> Note + '_ {
        move |record| Note {
            id: record.id,
            wedding_id: record.wedding_id,
            text: text.to_string(),
            hits: 0,
            created_at: record.created_at,
            updated_at: record.created_at,
        }
    }

    fn wedding(name: &str) -> WeddingId {
        WeddingId::new(name)
    }

    #[test]
    fn create_assigns_prefixed_id_and_preserves_insertion_order() {
        let store = InMemoryEntityStore::new();
        let w = wedding("w1");

        let a = store.create(&w, note("a")).unwrap();
        let b = store.create(&w, note("b")).unwrap();
        let c = store.create(&w, note("c")).unwrap();

        assert_eq!(a.id.kind(), "note");
        let texts: Vec<_> = store.list_by_partition(&w).into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_ne!(b.id, c.id);
        assert_eq!(store.count(&w), 3);
    }

    #[test]
    fn unknown_partition_lists_empty() {
        let store: InMemoryEntityStore<Note> = InMemoryEntityStore::new();
        assert!(store.list_by_partition(&wedding("nope")).is_empty());
        assert_eq!(store.count(&wedding("nope")), 0);
    }

    #[test]
    fn partitions_are_isolated() {
        let store = InMemoryEntityStore::new();
        let created = store.create(&wedding("w1"), note("a")).unwrap();

        assert!(store.list_by_partition(&wedding("w2")).is_empty());
        let (found, owner) = store.find_by_id(&created.id).unwrap();
        assert_eq!(found, created);
        assert_eq!(owner, wedding("w1"));
    }

    #[test]
    fn factory_that_rewrites_identity_is_rejected() {
        let store = InMemoryEntityStore::new();
        let w = wedding("w1");

        let err = store
            .create(&w, |record| Note {
                id: EntityId::new("note_forged"),
                ..note("x")(record)
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(store.list_by_partition(&w).is_empty());
    }

    #[test]
    fn update_replaces_entity_and_refreshes_updated_at() {
        let store = InMemoryEntityStore::new();
        let created = store.create(&wedding("w1"), note("a")).unwrap();

        let updated = store
            .update_by_id(&created.id, |mut n: Note| {
                n.text = "b".to_string();
                Ok(n)
            })
            .unwrap()
            .unwrap();

        assert_eq!(updated.text, "b");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.find_by_id(&created.id).unwrap().0.text, "b");
    }

    #[test]
    fn update_of_unknown_id_is_absent_and_changes_nothing() {
        let store = InMemoryEntityStore::new();
        let w = wedding("w1");
        let created = store.create(&w, note("a")).unwrap();

        let result = store
            .update_by_id(&EntityId::new("note_missing"), |mut n: Note| {
                n.text = "x".to_string();
                Ok(n)
            })
            .unwrap();

        assert!(result.is_none());
        assert_eq!(store.list_by_partition(&w), vec![created]);
    }

    #[test]
    fn update_cannot_move_entity_to_another_wedding() {
        let store = InMemoryEntityStore::new();
        let created = store.create(&wedding("w1"), note("a")).unwrap();

        let err = store
            .update_by_id(&created.id, |mut n: Note| {
                n.wedding_id = wedding("w2");
                Ok(n)
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(store.find_by_id(&created.id).unwrap().1, wedding("w1"));
        assert!(store.list_by_partition(&wedding("w2")).is_empty());
    }

    #[test]
    fn failing_mutator_leaves_entity_untouched() {
        let store = InMemoryEntityStore::new();
        let created = store.create(&wedding("w1"), note("a")).unwrap();

        let err = store
            .update_by_id(&created.id, |_| Err(DomainError::validation("nope")))
            .unwrap_err();

        assert_eq!(err, DomainError::validation("nope"));
        assert_eq!(store.find_by_id(&created.id).unwrap().0, created);
    }

    #[test]
    fn upsert_updates_matching_entity_or_creates_one() {
        let store = InMemoryEntityStore::new();
        let w = wedding("w1");

        let first = store
            .upsert(&w, |n: &Note| n.text == "a", |n: Note| Ok(n), note("a"))
            .unwrap();
        let second = store
            .upsert(
                &w,
                |n: &Note| n.text == "a",
                |mut n: Note| {
                    n.hits += 1;
                    Ok(n)
                },
                note("a"),
            )
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.hits, 1);
        assert_eq!(store.count(&w), 1);
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        let store = InMemoryEntityStore::arc();
        let created = store.create(&wedding("w1"), note("a")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let id = created.id.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update_by_id(&id, |mut n: Note| {
                                n.hits += 1;
                                Ok(n)
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.find_by_id(&created.id).unwrap().0.hits, 800);
    }
}
