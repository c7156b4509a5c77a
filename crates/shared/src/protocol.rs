use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{RegistrationId, SessionId, WebinarId},
    error::ValidationErrors,
};

/// Outcome of a safe action. No other shape is observable by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult<T> {
    Success { data: T },
    ValidationError { errors: ValidationErrors },
    ServerError { message: String },
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }

    /// Flattens the result to the single string contract used by toasts.
    /// Validation failures are summarized into one line.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::ValidationError { errors } => Some(errors.to_string()),
            Self::ServerError { message } => Some(message.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    pub registration_id: RegistrationId,
    pub webinar_id: WebinarId,
    pub session_id: SessionId,
    pub webinar_title: String,
    pub session_starts_at: DateTime<Utc>,
    pub attendee_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebinarRequest {
    pub title: String,
    #[serde(default)]
    pub session_starts: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebinarSummary {
    pub webinar_id: WebinarId,
    pub title: String,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSummary {
    pub registration_id: RegistrationId,
    pub session_id: SessionId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub registered_at: DateTime<Utc>,
}
