//! Membership type definitions and error types.

use super::email::{Email, InvalidEmail};
use crate::storage::StoreError;
use crate::utils::{new_id, now};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted activation status. Always mirrors `Membership::is_active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    #[must_use]
    pub fn from_active(is_active: bool) -> Self {
        if is_active {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

/// The record binding a person (by email, optionally by account) to a space.
///
/// `is_active` and `status` are private and only change together through
/// [`Membership::set_active`], so the pair can never diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub member_id: String,
    pub space_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub email: Email,
    is_active: bool,
    pub is_point: bool,
    status: MemberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Membership {
    /// A fresh invitation row: unconfirmed, flagged as invitation-created.
    #[must_use]
    pub fn invited(
        space_id: &str,
        email: Email,
        user_id: Option<String>,
        invited_by: Option<String>,
    ) -> Self {
        let ts = now();
        Self {
            member_id: new_id(),
            space_id: space_id.to_string(),
            user_id,
            email,
            is_active: false,
            is_point: true,
            status: MemberStatus::Inactive,
            invited_by,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        }
    }

    /// A member that joined directly with an existing account (not through an
    /// email invitation): active, and not invitation-created.
    #[must_use]
    pub fn joined(space_id: &str, email: Email, user_id: &str) -> Self {
        let mut member = Self::invited(space_id, email, Some(user_id.to_string()), None);
        member.is_point = false;
        member.set_active(true);
        member
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn status(&self) -> MemberStatus {
        self.status
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Flip activation; keeps `status` in step.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.status = MemberStatus::from_active(active);
        self.updated_at = now();
    }

    /// Set the soft-delete marker. Every other field is left alone.
    pub fn mark_deleted(&mut self) {
        let ts = now();
        self.deleted_at = Some(ts);
        self.updated_at = ts;
    }

    /// Clear the soft-delete marker and force the unconfirmed state.
    /// `member_id` and `is_point` survive.
    pub fn restore(&mut self, fields: RestoreFields) {
        self.deleted_at = None;
        if self.user_id.is_none() {
            self.user_id = fields.user_id;
        }
        if fields.invited_by.is_some() {
            self.invited_by = fields.invited_by;
        }
        self.set_active(false);
    }

    /// True when the persisted status agrees with the activation flag.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.status == MemberStatus::from_active(self.is_active)
    }
}

/// Fields a restoration may fill in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreFields {
    /// Account found for the address; only applied when the row has none
    pub user_id: Option<String>,
    pub invited_by: Option<String>,
}

/// A workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub space_id: String,
    pub name: String,
    pub root_node_id: String,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub email: Email,
    pub name: String,
}

impl User {
    #[must_use]
    pub fn new(email: Email, name: &str) -> Self {
        Self {
            user_id: new_id(),
            email,
            name: name.to_string(),
        }
    }
}

/// What an invitation did for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationOutcome {
    /// No row existed; a new one was created
    Created,
    /// A soft-deleted row was brought back under its original id
    Restored,
    /// An unconfirmed row already existed; left untouched
    AlreadyInvited,
    /// The person is already a confirmed member; left untouched
    AlreadyActive,
}

impl InvitationOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Restored => "RESTORED",
            Self::AlreadyInvited => "ALREADY_INVITED",
            Self::AlreadyActive => "ALREADY_ACTIVE",
        }
    }

    /// Whether an invitation notice goes out for this outcome.
    #[must_use]
    pub fn sends_notice(self) -> bool {
        !matches!(self, Self::AlreadyActive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationResult {
    pub email: Email,
    pub member_id: String,
    pub outcome: InvitationOutcome,
}

#[derive(Debug)]
pub struct InvitationFailure {
    pub email: Email,
    pub error: MemberError,
}

/// Per-address results of one invitation call.
#[derive(Debug, Default)]
pub struct InvitationReport {
    pub outcomes: Vec<InvitationResult>,
    pub failures: Vec<InvitationFailure>,
}

impl InvitationReport {
    /// Outcome recorded for an address, if it succeeded.
    #[must_use]
    pub fn outcome_for(&self, email: &Email) -> Option<&InvitationResult> {
        self.outcomes.iter().find(|r| &r.email == email)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Membership-related errors
#[derive(Error, Debug)]
pub enum MemberError {
    #[error("Space '{0}' not found")]
    SpaceNotFound(String),

    #[error("Member '{0}' not found")]
    MemberNotFound(String),

    #[error(transparent)]
    InvalidEmail(#[from] InvalidEmail),

    #[error("Too many emails in one invitation: {count} (max {max})")]
    TooManyEmails { count: usize, max: usize },

    #[error("Membership for '{email}' in space '{space_id}' still conflicted after {attempts} attempts")]
    ConflictRetriesExhausted {
        space_id: String,
        email: String,
        attempts: u32,
    },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "types_tests.rs"]
mod tests;
