use super::validation::ValidationErrors;
use crate::member::Email;
use std::collections::BTreeSet;

/// Invite people to a space by email address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteMembersRequest {
    pub space_id: String,
    pub inviter_user_id: String,
    pub emails: Vec<String>,
}

/// A checked invitation: normalized, de-duplicated addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCommand {
    pub space_id: String,
    pub inviter_user_id: String,
    pub emails: BTreeSet<Email>,
}

impl InviteMembersRequest {
    /// Addresses that differ only in case or surrounding whitespace collapse
    /// into one; `max_emails` applies after that.
    pub fn validate(&self, max_emails: usize) -> Result<InviteCommand, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("space_id", &self.space_id);
        errors.require_non_blank("inviter_user_id", &self.inviter_user_id);

        let mut emails = BTreeSet::new();
        for (i, raw) in self.emails.iter().enumerate() {
            match Email::parse(raw) {
                Ok(email) => {
                    emails.insert(email);
                }
                Err(e) => errors.add(format!("emails[{i}]"), e.to_string()),
            }
        }
        if self.emails.is_empty() {
            errors.add("emails", "must contain at least one address");
        } else if emails.len() > max_emails {
            errors.add(
                "emails",
                format!("at most {max_emails} addresses per request, got {}", emails.len()),
            );
        }

        errors.finish(InviteCommand {
            space_id: self.space_id.trim().to_string(),
            inviter_user_id: self.inviter_user_id.trim().to_string(),
            emails,
        })
    }
}

/// Soft-delete members by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveMembersRequest {
    pub member_ids: Vec<String>,
}

impl RemoveMembersRequest {
    pub fn validate(&self) -> Result<BTreeSet<String>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.member_ids.is_empty() {
            errors.add("member_ids", "must contain at least one id");
        }
        for (i, id) in self.member_ids.iter().enumerate() {
            errors.require_non_blank(&format!("member_ids[{i}]"), id);
        }
        let ids = self.member_ids.iter().map(|id| id.trim().to_string()).collect();
        errors.finish(ids)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateMemberRequest {
    pub member_id: String,
    pub user_id: String,
}

impl ActivateMemberRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("member_id", &self.member_id);
        errors.require_non_blank("user_id", &self.user_id);
        errors.finish(())
    }
}
