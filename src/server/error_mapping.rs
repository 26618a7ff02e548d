use crate::dto::ValidationErrors;
use crate::member::{InvalidEmail, MemberError};
use crate::rubbish::RubbishError;
use crate::storage::StoreError;

/// Trait for mapping domain errors to structured error codes and optional tips.
pub trait ToStructuredError {
    fn error_code_and_tip(&self) -> (&str, Option<&str>);
}

impl ToStructuredError for StoreError {
    fn error_code_and_tip(&self) -> (&str, Option<&str>) {
        match self {
            StoreError::Io(_) => ("IO_ERROR", None),
            StoreError::Json(_) => ("JSON_ERROR", None),
            StoreError::Conflict { .. } => ("CONFLICT", Some("Retry the request")),
            StoreError::NotFound(_) => ("NOT_FOUND", None),
            StoreError::DuplicateId(_) => ("DUPLICATE_ID", None),
            StoreError::Corrupt(_) => (
                "STATE_CORRUPT",
                Some("Inspect the state file; the daemon refuses to load inconsistent data"),
            ),
        }
    }
}

impl ToStructuredError for InvalidEmail {
    fn error_code_and_tip(&self) -> (&str, Option<&str>) {
        ("INVALID_EMAIL", None)
    }
}

impl ToStructuredError for MemberError {
    fn error_code_and_tip(&self) -> (&str, Option<&str>) {
        match self {
            MemberError::SpaceNotFound(_) => ("SPACE_NOT_FOUND", None),
            MemberError::MemberNotFound(_) => ("MEMBER_NOT_FOUND", None),
            MemberError::InvalidEmail(e) => e.error_code_and_tip(),
            MemberError::TooManyEmails { .. } => (
                "TOO_MANY_EMAILS",
                Some("Split the invitation into smaller batches"),
            ),
            MemberError::ConflictRetriesExhausted { .. } => (
                "CONFLICT_RETRIES_EXHAUSTED",
                Some("Another request is inviting the same address; retry shortly"),
            ),
            MemberError::Store(e) => e.error_code_and_tip(),
        }
    }
}

impl ToStructuredError for RubbishError {
    fn error_code_and_tip(&self) -> (&str, Option<&str>) {
        match self {
            RubbishError::SpaceNotFound(_) => ("SPACE_NOT_FOUND", None),
            RubbishError::NodeNotFound(_) => ("NODE_NOT_FOUND", None),
            RubbishError::ParentNotFound(_) => (
                "PARENT_NOT_FOUND",
                Some("Omit parent_id to recover under the space root"),
            ),
            RubbishError::PermissionDenied { .. } => ("PERMISSION_DENIED", None),
            RubbishError::LocateFailed(_) => (
                "LOCATE_FAILED",
                Some("Reload the rubbish bin from the first page"),
            ),
            RubbishError::Store(e) => e.error_code_and_tip(),
        }
    }
}

impl ToStructuredError for ValidationErrors {
    fn error_code_and_tip(&self) -> (&str, Option<&str>) {
        ("VALIDATION_ERROR", None)
    }
}

#[cfg(test)]
#[path = "error_mapping_tests.rs"]
mod tests;
