//! Request shapes accepted by the daemon and their validation.
//!
//! Each request's `validate` reports every offending field at once and, on
//! success, yields the checked input the services take.

mod member;
mod rubbish;
mod validation;

pub use member::{ActivateMemberRequest, InviteCommand, InviteMembersRequest, RemoveMembersRequest};
pub use rubbish::{DeleteRubbishRequest, ListRubbishRequest, NodeRecoverRequest};
pub use validation::{FieldViolation, ValidationErrors};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "../dto_tests.rs"]
mod dto_tests;
