//! Space membership lifecycle.
//!
//! - Inviting people by email: create, restore a soft-deleted row, or leave
//!   an existing row untouched
//! - Removing (soft-deleting) members
//! - Activating a membership when the invitee claims it
//!
//! Persistence, account lookup and space lookup are collaborators behind the
//! traits in [`repository`].

mod email;
mod key_lock;
mod lifecycle;
pub mod repository;
mod types;

pub use email::{Email, InvalidEmail, MAX_EMAIL_LEN};
pub use key_lock::KeyedLocks;
pub use lifecycle::MembershipLifecycleManager;
pub use repository::{MembershipRepository, SpaceDirectory, UserDirectory};
pub use types::{
    InvitationFailure, InvitationOutcome, InvitationReport, InvitationResult, MemberError,
    MemberStatus, Membership, RestoreFields, Space, User,
};
