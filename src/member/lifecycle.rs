//! Invitation, removal and activation of space memberships.

use super::email::Email;
use super::key_lock::KeyedLocks;
use super::repository::{MembershipRepository, SpaceDirectory, UserDirectory};
use super::types::{
    InvitationFailure, InvitationOutcome, InvitationReport, InvitationResult, MemberError,
    Membership, RestoreFields,
};
use crate::config::InvitationConfig;
use crate::events::{DomainEvent, EventPublisher};
use crate::storage::StoreError;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Resolves email invitations against existing membership rows.
///
/// The lookup-then-create/restore sequence for one address runs under a lock
/// keyed by `(space_id, email)`. The repository's unique constraint is the
/// second line: a create that still loses a race is re-read and handled as
/// "row exists".
pub struct MembershipLifecycleManager {
    members: Arc<dyn MembershipRepository>,
    users: Arc<dyn UserDirectory>,
    spaces: Arc<dyn SpaceDirectory>,
    events: Arc<dyn EventPublisher>,
    locks: KeyedLocks<(String, Email)>,
    settings: InvitationConfig,
}

impl MembershipLifecycleManager {
    #[must_use]
    pub fn new(
        members: Arc<dyn MembershipRepository>,
        users: Arc<dyn UserDirectory>,
        spaces: Arc<dyn SpaceDirectory>,
        events: Arc<dyn EventPublisher>,
        settings: InvitationConfig,
    ) -> Self {
        Self {
            members,
            users,
            spaces,
            events,
            locks: KeyedLocks::new(),
            settings,
        }
    }

    /// Invite every address in `emails` to `space_id`.
    ///
    /// Fails as a whole only when the space is unknown or the batch is too
    /// large. Otherwise each address is an independent unit of work: failures
    /// are collected in the report and never undo the other addresses.
    #[instrument(skip(self, emails), fields(email_count = emails.len()))]
    pub async fn invite_by_email(
        &self,
        space_id: &str,
        inviter_user_id: &str,
        emails: &BTreeSet<Email>,
    ) -> Result<InvitationReport, MemberError> {
        let max = self.settings.max_emails_per_request;
        if emails.len() > max {
            return Err(MemberError::TooManyEmails {
                count: emails.len(),
                max,
            });
        }
        if self.spaces.find_space(space_id).await?.is_none() {
            return Err(MemberError::SpaceNotFound(space_id.to_string()));
        }

        let results = join_all(
            emails
                .iter()
                .map(|email| self.invite_one(space_id, inviter_user_id, email)),
        )
        .await;

        let mut report = InvitationReport::default();
        for (email, result) in emails.iter().zip(results) {
            match result {
                Ok(result) => {
                    if result.outcome.sends_notice() {
                        self.notify_invited(space_id, inviter_user_id, &result);
                    }
                    report.outcomes.push(result);
                }
                Err(error) => {
                    warn!(%email, "Invitation failed: {error}");
                    report.failures.push(InvitationFailure {
                        email: email.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            invited = report.outcomes.len(),
            failed = report.failures.len(),
            "Processed email invitation"
        );
        Ok(report)
    }

    async fn invite_one(
        &self,
        space_id: &str,
        inviter_user_id: &str,
        email: &Email,
    ) -> Result<InvitationResult, MemberError> {
        let _guard = self
            .locks
            .lock((space_id.to_string(), email.clone()))
            .await;

        let user_id = self.users.find_by_email(email).await?;
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            if let Some(existing) = self.members.find_including_deleted(space_id, email).await? {
                return self
                    .resolve_existing(existing, user_id, inviter_user_id)
                    .await;
            }

            let fresh = Membership::invited(
                space_id,
                email.clone(),
                user_id.clone(),
                Some(inviter_user_id.to_string()),
            );
            match self.members.create(fresh).await {
                Ok(member_id) => {
                    debug!(%email, %member_id, "Created membership");
                    return Ok(InvitationResult {
                        email: email.clone(),
                        member_id,
                        outcome: InvitationOutcome::Created,
                    });
                }
                Err(StoreError::Conflict { .. }) if attempts <= self.settings.conflict_retries => {
                    debug!(%email, attempts, "Create conflicted; re-reading");
                }
                Err(StoreError::Conflict { .. }) => {
                    return Err(MemberError::ConflictRetriesExhausted {
                        space_id: space_id.to_string(),
                        email: email.to_string(),
                        attempts,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn resolve_existing(
        &self,
        existing: Membership,
        user_id: Option<String>,
        inviter_user_id: &str,
    ) -> Result<InvitationResult, MemberError> {
        let outcome = if existing.is_deleted() {
            let fields = RestoreFields {
                user_id,
                invited_by: Some(inviter_user_id.to_string()),
            };
            self.members.restore(&existing.member_id, fields).await?;
            debug!(member_id = %existing.member_id, "Restored membership");
            InvitationOutcome::Restored
        } else if existing.is_active() {
            InvitationOutcome::AlreadyActive
        } else {
            InvitationOutcome::AlreadyInvited
        };

        Ok(InvitationResult {
            email: existing.email,
            member_id: existing.member_id,
            outcome,
        })
    }

    fn notify_invited(&self, space_id: &str, inviter_user_id: &str, result: &InvitationResult) {
        let event = DomainEvent::InvitationSent {
            space_id: space_id.to_string(),
            inviter_user_id: inviter_user_id.to_string(),
            email: result.email.to_string(),
            member_id: result.member_id.clone(),
        };
        if let Err(e) = self.events.publish(event) {
            warn!(email = %result.email, "Invitation notice not sent: {e}");
        }
    }

    /// Soft-delete members. Unknown and already-removed ids are no-ops.
    #[instrument(skip(self, member_ids), fields(count = member_ids.len()))]
    pub async fn remove_members(
        &self,
        member_ids: &BTreeSet<String>,
    ) -> Result<Vec<String>, MemberError> {
        let ids: Vec<String> = member_ids.iter().cloned().collect();
        let removed = self.members.soft_delete(&ids).await?;
        info!(removed = removed.len(), "Removed members");
        Ok(removed)
    }

    /// The invitee claims the membership under their account.
    #[instrument(skip(self))]
    pub async fn activate_member(
        &self,
        member_id: &str,
        user_id: &str,
    ) -> Result<Membership, MemberError> {
        let key = self
            .members
            .find_by_id(member_id)
            .await?
            .map(|m| (m.space_id, m.email))
            .ok_or_else(|| MemberError::MemberNotFound(member_id.to_string()))?;
        let _guard = self.locks.lock(key).await;

        // re-read under the lock; a removal may have landed in between
        let mut member = self
            .members
            .find_by_id(member_id)
            .await?
            .filter(|m| !m.is_deleted())
            .ok_or_else(|| MemberError::MemberNotFound(member_id.to_string()))?;

        if member.is_active() && member.user_id.as_deref() == Some(user_id) {
            return Ok(member);
        }
        member.user_id = Some(user_id.to_string());
        member.set_active(true);
        self.members.update(&member).await?;
        info!(%member_id, "Activated member");
        Ok(member)
    }

    /// Any membership by id, soft-deleted rows included.
    pub async fn get_member(&self, member_id: &str) -> Result<Membership, MemberError> {
        self.members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| MemberError::MemberNotFound(member_id.to_string()))
    }

    /// The non-deleted membership for an address.
    pub async fn get_by_space_and_email(
        &self,
        space_id: &str,
        email: &Email,
    ) -> Result<Option<Membership>, MemberError> {
        Ok(self
            .members
            .find_including_deleted(space_id, email)
            .await?
            .filter(|m| !m.is_deleted()))
    }

    /// The non-deleted membership of an account.
    pub async fn get_by_user_and_space(
        &self,
        user_id: &str,
        space_id: &str,
    ) -> Result<Option<Membership>, MemberError> {
        Ok(self.members.find_by_user_and_space(user_id, space_id).await?)
    }

    pub async fn list_members(
        &self,
        space_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Membership>, MemberError> {
        if self.spaces.find_space(space_id).await?.is_none() {
            return Err(MemberError::SpaceNotFound(space_id.to_string()));
        }
        Ok(self.members.list_by_space(space_id, include_deleted).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "lifecycle_tests.rs"]
mod tests;
