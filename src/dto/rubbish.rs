use super::validation::ValidationErrors;
use crate::config::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::rubbish::{RecoverTarget, RubbishListQuery};
use crate::utils::is_blank;

/// Blank optional ids are treated as absent.
fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .filter(|v| !is_blank(v))
        .map(|v| v.trim().to_string())
}

/// Page through a space's rubbish bin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRubbishRequest {
    pub space_id: String,
    pub member_id: String,
    /// Page size; the configured default when absent
    pub size: Option<u32>,
    pub is_over_limit: bool,
    pub last_node_id: Option<String>,
}

impl ListRubbishRequest {
    pub fn validate(&self, default_size: u32) -> Result<RubbishListQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("space_id", &self.space_id);
        errors.require_non_blank("member_id", &self.member_id);

        let size = self.size.unwrap_or(default_size);
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) {
            errors.add(
                "size",
                format!("must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}, got {size}"),
            );
        }

        errors.finish(RubbishListQuery {
            size: usize::try_from(size).unwrap_or(usize::MAX),
            is_over_limit: self.is_over_limit,
            last_node_id: non_blank(self.last_node_id.as_ref()),
        })
    }
}

/// Put a node back from the bin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRecoverRequest {
    pub space_id: String,
    pub member_id: String,
    pub user_id: String,
    pub node_id: String,
    /// New parent; the space root when absent or blank
    pub parent_id: Option<String>,
}

impl NodeRecoverRequest {
    pub fn validate(&self) -> Result<RecoverTarget, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("space_id", &self.space_id);
        errors.require_non_blank("member_id", &self.member_id);
        errors.require_non_blank("user_id", &self.user_id);
        errors.require_non_blank("node_id", &self.node_id);
        errors.finish(RecoverTarget {
            node_id: self.node_id.trim().to_string(),
            parent_id: non_blank(self.parent_id.as_ref()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteRubbishRequest {
    pub space_id: String,
    pub member_id: String,
    pub user_id: String,
    pub node_id: String,
}

impl DeleteRubbishRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_blank("space_id", &self.space_id);
        errors.require_non_blank("member_id", &self.member_id);
        errors.require_non_blank("user_id", &self.user_id);
        errors.require_non_blank("node_id", &self.node_id);
        errors.finish(())
    }
}
