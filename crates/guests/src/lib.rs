//! Households, guests and guest-list CSV import.
//!
//! [`GuestDirectory`] owns the household and guest collections of every
//! wedding; [`GuestImporter`] turns uploaded spreadsheets into directory
//! records.

pub mod directory;
pub mod guest;
pub mod household;
pub mod import;

pub use directory::{GuestDirectory, HouseholdWithGuests};
pub use guest::{Guest, GuestPatch, NewGuest};
pub use household::{Household, HouseholdPatch, NewHousehold, PostalAddress};
pub use import::{GuestImporter, ImportError, ImportOptions, ImportSummary, RowError};
