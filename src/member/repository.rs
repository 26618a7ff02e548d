//! Collaborator contracts consumed by the lifecycle manager.

use super::email::Email;
use super::types::{Membership, RestoreFields, Space};
use crate::storage::StoreError;
use async_trait::async_trait;

/// Membership persistence.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Look up by `(space_id, email)`, soft-deleted rows included. When
    /// several rows match, the non-deleted one wins, then the most recently
    /// updated.
    async fn find_including_deleted(
        &self,
        space_id: &str,
        email: &Email,
    ) -> Result<Option<Membership>, StoreError>;

    /// Look up by id, soft-deleted rows included.
    async fn find_by_id(&self, member_id: &str) -> Result<Option<Membership>, StoreError>;

    /// Non-deleted membership of an account in a space.
    async fn find_by_user_and_space(
        &self,
        user_id: &str,
        space_id: &str,
    ) -> Result<Option<Membership>, StoreError>;

    async fn list_by_space(
        &self,
        space_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Membership>, StoreError>;

    /// Insert a new row. Fails with [`StoreError::Conflict`] when a row for
    /// the same `(space_id, email)` already exists.
    async fn create(&self, membership: Membership) -> Result<String, StoreError>;

    /// Bring a row back in place (see [`Membership::restore`]).
    async fn restore(&self, member_id: &str, fields: RestoreFields)
        -> Result<Membership, StoreError>;

    /// Set the soft-delete marker on each id. Returns the ids that changed;
    /// unknown and already-deleted ids are skipped.
    async fn soft_delete(&self, member_ids: &[String]) -> Result<Vec<String>, StoreError>;

    /// Replace a row by id.
    async fn update(&self, membership: &Membership) -> Result<(), StoreError>;
}

/// Account lookup.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<String>, StoreError>;
}

/// Space lookup.
#[async_trait]
pub trait SpaceDirectory: Send + Sync {
    async fn find_space(&self, space_id: &str) -> Result<Option<Space>, StoreError>;
}
