use thiserror::Error;

/// Errors raised by the storage collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The `(space_id, email)` unique constraint rejected a write.
    #[error("Membership for '{email}' already exists in space '{space_id}'")]
    Conflict { space_id: String, email: String },

    #[error("Record '{0}' not found")]
    NotFound(String),

    #[error("Duplicate id '{0}'")]
    DuplicateId(String),

    #[error("State file is inconsistent: {0}")]
    Corrupt(String),
}
