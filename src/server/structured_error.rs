use std::fmt::Display;

use serde::Serialize;

use crate::dto::ValidationErrors;
use crate::logging::get_log_file_path;
use crate::server::error_mapping::ToStructuredError;

#[derive(Serialize)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    pub code: String,
}

#[derive(Serialize)]
pub struct StructuredError {
    /// Space, member or node the failed request targeted
    pub context: String,
    pub logs: String,
    pub messages: Vec<ErrorMessage>,
}

impl StructuredError {
    pub fn new(context: &str, code: &str, message: String) -> Self {
        Self {
            context: context.to_string(),
            logs: get_log_file_path().to_string(),
            messages: vec![ErrorMessage {
                message,
                tip: None,
                code: code.to_string(),
            }],
        }
    }

    #[must_use]
    pub fn with_tip(mut self, tip: &str) -> Self {
        if let Some(msg) = self.messages.first_mut() {
            msg.tip = Some(tip.to_string());
        }
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"context":"","logs":"","messages":[{"message":"serialization error","code":"INTERNAL_ERROR"}]}"#.to_string()
        })
    }
}

/// Convert a domain error into a structured JSON error string.
pub fn to_error_json<E: ToStructuredError + Display>(context: &str, err: &E) -> String {
    let (code, tip) = err.error_code_and_tip();
    let mut se = StructuredError::new(context, code, err.to_string());
    if let Some(tip) = tip {
        se = se.with_tip(tip);
    }
    se.to_json()
}

/// One message per rejected field.
pub fn validation_error_json(context: &str, errors: &ValidationErrors) -> String {
    let (code, _) = errors.error_code_and_tip();
    StructuredError {
        context: context.to_string(),
        logs: get_log_file_path().to_string(),
        messages: errors
            .violations
            .iter()
            .map(|v| ErrorMessage {
                message: format!("{}: {}", v.field, v.message),
                tip: None,
                code: code.to_string(),
            })
            .collect(),
    }
    .to_json()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "structured_error_tests.rs"]
mod tests;
