use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown for execution failures whose details must stay on the server.
pub const DEFAULT_SERVER_ERROR_MESSAGE: &str =
    "Something went wrong while executing the operation.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Required,
    InvalidType,
    InvalidFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl FieldIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Flattened validation failure: form-level messages plus one issue per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
pub struct ValidationErrors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_errors: Vec<String>,
    #[serde(default)]
    pub field_errors: BTreeMap<String, FieldIssue>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    /// Records an issue for `field`. The first issue reported for a field wins.
    pub fn add(&mut self, field: &str, issue: FieldIssue) {
        self.field_errors.entry(field.to_string()).or_insert(issue);
    }

    pub fn get(&self, field: &str) -> Option<&FieldIssue> {
        self.field_errors.get(field)
    }

    pub fn kind_of(&self, field: &str) -> Option<IssueKind> {
        self.get(field).map(|issue| issue.kind)
    }

}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("invalid input");
        }
        let mut parts: Vec<String> = self.form_errors.clone();
        parts.extend(
            self.field_errors
                .iter()
                .map(|(field, issue)| format!("{field}: {}", issue.message)),
        );
        f.write_str(&parts.join("; "))
    }
}

/// Failure raised by a server-side operation running behind the safe action
/// boundary.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Business rule rejection; the message is meant for the user.
    #[error("{0}")]
    Rejected(String),
    /// Unexpected fault; only logged, never shown.
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn internal(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Internal(err.into())
    }

    /// Message that may cross the action boundary.
    pub fn client_message(&self) -> String {
        match self {
            Self::Rejected(message) if !message.trim().is_empty() => message.clone(),
            _ => DEFAULT_SERVER_ERROR_MESSAGE.to_string(),
        }
    }
}
