//! Registration submission: validate, run the action, resolve UI state.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use shared::{
    error::ValidationErrors,
    protocol::{ActionResult, RegistrationReceipt},
    schema::validate_registration,
};
use tracing::{debug, info, warn};

use crate::{
    action::RegistrationAction,
    modal::{ModalState, Props},
    notify::{NotificationBridge, ToastSink},
};

pub const REGISTRATION_FAILED_MESSAGE: &str = "We could not complete your registration.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ModalContent {
    RegistrationConfirmed(RegistrationReceipt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Registered(RegistrationReceipt),
    /// Field errors to render inline, either local or reported by the server.
    Invalid(ValidationErrors),
    /// A toast was shown.
    Failed,
}

pub struct RegistrationFlow<S> {
    action: Arc<dyn RegistrationAction>,
    notifications: NotificationBridge<S>,
    modal: ModalState<ModalContent>,
}

impl<S: ToastSink> RegistrationFlow<S> {
    pub fn new(action: Arc<dyn RegistrationAction>, sink: S) -> Self {
        Self {
            action,
            notifications: NotificationBridge::new(sink),
            modal: ModalState::new(),
        }
    }

    pub fn modal(&self) -> &ModalState<ModalContent> {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalState<ModalContent> {
        &mut self.modal
    }

    pub fn notifications(&self) -> &NotificationBridge<S> {
        &self.notifications
    }

    /// Invalid input is answered locally without touching the action.
    pub async fn submit(&mut self, raw: &Value) -> SubmitOutcome {
        let request = match validate_registration(raw) {
            Ok(request) => request,
            Err(errors) => {
                debug!(fields = errors.field_errors.len(), "registration form invalid");
                return SubmitOutcome::Invalid(errors);
            }
        };

        match self.action.register(&request).await {
            Ok(ActionResult::Success { data }) => {
                info!(registration_id = data.registration_id.0, "registration confirmed");
                self.show_confirmation(&data);
                SubmitOutcome::Registered(data)
            }
            Ok(ActionResult::ValidationError { errors }) => SubmitOutcome::Invalid(errors),
            Ok(ActionResult::ServerError { message }) => {
                self.notifications.notify_error_message(Some(&message), None);
                SubmitOutcome::Failed
            }
            Err(err) => {
                warn!(error = %err, "registration request failed");
                self.notifications
                    .notify_error(&err, Some(REGISTRATION_FAILED_MESSAGE));
                SubmitOutcome::Failed
            }
        }
    }

    fn show_confirmation(&mut self, receipt: &RegistrationReceipt) {
        self.modal
            .set_content(Some(ModalContent::RegistrationConfirmed(receipt.clone())));
        self.modal.set_props(Some(confirmation_props(receipt)));
        if !self.modal.active() {
            self.modal.toggle();
        }
    }
}

fn confirmation_props(receipt: &RegistrationReceipt) -> Props {
    let mut props = Props::new();
    props.insert("webinarId".into(), json!(receipt.webinar_id));
    props.insert("sessionId".into(), json!(receipt.session_id));
    props.insert("startsAt".into(), json!(receipt.session_starts_at));
    props
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
