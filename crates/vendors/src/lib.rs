//! Vendors (caterers, photographers, venues, ...) and their event links.

pub mod registry;
pub mod vendor;

pub use registry::VendorRegistry;
pub use vendor::{NewVendor, Vendor, VendorContact, VendorPatch, VendorPriority, VendorStatus};
