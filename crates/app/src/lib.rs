//! Wiring of the WeddingDesk services.
//!
//! [`WeddingDesk`] is the composition root handed to collaborators; the
//! `weddingdesk` binary uses it for command-line CSV imports.

pub mod config;
pub mod desk;

pub use config::WeddingDeskConfig;
pub use desk::WeddingDesk;
