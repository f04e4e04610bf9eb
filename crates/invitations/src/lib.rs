//! Per-event invitations (RSVPs) of guests and households.

pub mod book;
pub mod invitation;

pub use book::{InvitationBook, InvitationSummary, InvitationView};
pub use invitation::{
    Invitation, InvitationEntry, InvitationPatch, InvitationStatus, InvitationSubject, InviteLevel,
};
