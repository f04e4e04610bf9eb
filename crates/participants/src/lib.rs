//! Wedding participants (the couple and their families), read path only.

pub mod participant;

pub use participant::{ParticipantRoster, WeddingParticipant};
