//! Inline validation while the attendee is still typing.

use std::time::Duration;

use serde_json::Value;
use shared::{error::ValidationErrors, schema::validate_registration};
use tokio::sync::watch;

use crate::debounce::{debounce, Debounced};

/// Re-validates the registration draft once typing pauses and publishes the
/// latest errors (`None` when the draft is valid).
pub struct LiveValidator {
    debounced: Debounced<Value>,
    errors: watch::Receiver<Option<ValidationErrors>>,
}

impl LiveValidator {
    pub fn new(delay: Duration) -> Self {
        let (tx, errors) = watch::channel(None);
        let debounced = debounce(
            move |draft: Value| {
                tx.send_replace(validate_registration(&draft).err());
            },
            delay,
        );
        Self { debounced, errors }
    }

    pub fn on_draft_changed(&self, draft: Value) {
        self.debounced.call(draft);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ValidationErrors>> {
        self.errors.clone()
    }

    pub fn latest(&self) -> Option<ValidationErrors> {
        self.errors.borrow().clone()
    }
}

impl Default for LiveValidator {
    fn default() -> Self {
        Self::new(crate::debounce::DEFAULT_DEBOUNCE_DELAY)
    }
}
