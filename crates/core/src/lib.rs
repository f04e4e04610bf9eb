//! `weddingdesk-core`: foundation shared by every wedding-planning module.
//!
//! Identifiers, the domain error model, the `Entity` contract and the keyed
//! entity store all live here. Nothing in this crate knows about households,
//! guests, invitations or vendors.

pub mod choice;
pub mod entity;
pub mod error;
pub mod field;
pub mod id;
pub mod store;

pub use choice::normalize;
pub use entity::{Entity, NewRecord};
pub use error::{DomainError, DomainResult};
pub use field::{deserialize_present, non_blank, patch_optional};
pub use id::{EntityId, EventId, WeddingId};
pub use store::{EntityStore, InMemoryEntityStore};
