//! Input schemas for untrusted submissions.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    domain::{RegistrationRequest, SessionId, WebinarId},
    error::{FieldIssue, IssueKind, ValidationErrors},
};

/// Local part may not start with a dot; `..` is rejected separately since the
/// regex engine has no lookaround.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email pattern compiles")
});

/// A typed value that can be built from raw, untyped input.
///
/// Implementations must be pure and collect every problem instead of stopping
/// at the first one.
pub trait Schema: Sized {
    fn validate(raw: &Value) -> Result<Self, ValidationErrors>;
}

impl Schema for RegistrationRequest {
    fn validate(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let Some(fields) = raw.as_object() else {
            errors.add_form_error(format!("Expected object, received {}", type_name(raw)));
            return Err(errors);
        };

        let webinar_id = required_string(fields, "webinarId", "Webinar", &mut errors);
        let session_id = required_string(fields, "sessionId", "Session", &mut errors)
            .and_then(|raw_id| match parse_hyphenated_uuid(raw_id) {
                Some(id) => Some(SessionId(id)),
                None => {
                    errors.add(
                        "sessionId",
                        FieldIssue::new(IssueKind::InvalidFormat, "Invalid session id"),
                    );
                    None
                }
            });
        let first_name = required_string(fields, "firstName", "First name", &mut errors);
        let last_name = required_string(fields, "lastName", "Last name", &mut errors);
        let email = required_string(fields, "email", "Email", &mut errors).filter(|email| {
            let ok = is_valid_email(email);
            if !ok {
                errors.add(
                    "email",
                    FieldIssue::new(IssueKind::InvalidFormat, "Invalid email address"),
                );
            }
            ok
        });
        let phone = optional_string(fields, "phone", &mut errors);

        match (webinar_id, session_id, first_name, last_name, email, phone) {
            (
                Some(webinar_id),
                Some(session_id),
                Some(first_name),
                Some(last_name),
                Some(email),
                Ok(phone),
            ) if errors.is_empty() => Ok(RegistrationRequest {
                webinar_id: WebinarId(webinar_id.to_string()),
                session_id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                phone,
            }),
            _ => Err(errors),
        }
    }
}

/// Convenience entry point for callers that only deal with registrations.
pub fn validate_registration(raw: &Value) -> Result<RegistrationRequest, ValidationErrors> {
    RegistrationRequest::validate(raw)
}

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

/// Accepts only the canonical 8-4-4-4-12 form.
pub fn parse_hyphenated_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

fn required_string<'a>(
    fields: &'a Map<String, Value>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match fields.get(field) {
        None | Some(Value::Null) => {
            errors.add(field, FieldIssue::new(IssueKind::Required, "Required"));
            None
        }
        Some(Value::String(value)) if value.is_empty() => {
            errors.add(
                field,
                FieldIssue::new(IssueKind::Required, format!("{label} is required")),
            );
            None
        }
        Some(Value::String(value)) => Some(value.as_str()),
        Some(other) => {
            errors.add(field, invalid_type(other));
            None
        }
    }
}

/// `Err(())` means the field was present with the wrong type; the issue has
/// already been recorded.
fn optional_string(
    fields: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Result<Option<String>, ()> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => {
            errors.add(field, invalid_type(other));
            Err(())
        }
    }
}

fn invalid_type(value: &Value) -> FieldIssue {
    FieldIssue::new(
        IssueKind::InvalidType,
        format!("Expected string, received {}", type_name(value)),
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "tests/schema_tests.rs"]
mod tests;
