use crate::utils::is_blank;
use serde::Serialize;
use std::fmt;

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Field path, e.g. `emails[2]`
    pub field: String,
    pub message: String,
}

/// Every violation found in a request, not just the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn require_non_blank(&mut self, field: &str, value: &str) {
        if is_blank(value) {
            self.add(field, "must not be blank");
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether `field` was rejected.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(value)` when nothing was rejected.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid request")?;
        let mut sep = ": ";
        for v in &self.violations {
            write!(f, "{sep}{} {}", v.field, v.message)?;
            sep = "; ";
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
