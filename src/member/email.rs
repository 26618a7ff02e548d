//! Normalized email addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Loose shape check: one `@`, no whitespace, a dot in the domain part.
#[expect(
    clippy::expect_used,
    reason = "Regex literal is compile-time constant and cannot fail"
)]
static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("EMAIL_REGEX is a valid regex literal")
});

/// Longest address accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

/// An invitation address, trimmed and lowercased.
///
/// Two spellings of the same address (`Ann@X.com`, ` ann@x.com`) compare
/// equal, which is what collapses duplicates within one invitation batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid email address")]
pub struct InvalidEmail(pub String);

impl Email {
    /// Normalize and validate an address.
    pub fn parse(raw: &str) -> Result<Self, InvalidEmail> {
        let normalized = raw.trim().to_lowercase();
        if normalized.len() > MAX_EMAIL_LEN || !EMAIL_REGEX.is_match(&normalized) {
            return Err(InvalidEmail(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = InvalidEmail;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}
