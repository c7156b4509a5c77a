//! Safe action boundary: validate untrusted input, run the operation once, and
//! reduce every failure to a client-safe shape.

use std::{future::Future, panic::AssertUnwindSafe};

use futures::FutureExt;
use serde_json::Value;
use shared::{
    error::{ActionError, DEFAULT_SERVER_ERROR_MESSAGE},
    protocol::ActionResult,
    schema::Schema,
};
use tracing::{debug, error};

/// Runs `operation` behind the safe action boundary.
///
/// `raw` is validated against `I`'s schema first; on rejection the operation is
/// never invoked. The operation runs exactly once. Rejections keep their
/// message, internal faults and panics collapse to
/// [`DEFAULT_SERVER_ERROR_MESSAGE`].
pub async fn safe_action<I, T, F, Fut>(
    action: &'static str,
    raw: &Value,
    operation: F,
) -> ActionResult<T>
where
    I: Schema,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = Result<T, ActionError>>,
{
    let input = match I::validate(raw) {
        Ok(input) => input,
        Err(errors) => {
            debug!(
                action,
                form_errors = errors.form_errors.len(),
                field_errors = errors.field_errors.len(),
                "action input rejected"
            );
            return ActionResult::ValidationError { errors };
        }
    };

    let outcome = AssertUnwindSafe(async move { operation(input).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(data)) => ActionResult::Success { data },
        Ok(Err(err)) => {
            if let ActionError::Internal(source) = &err {
                error!(action, error = %source, "action failed internally");
            } else {
                debug!(action, reason = %err, "action rejected");
            }
            ActionResult::ServerError {
                message: err.client_message(),
            }
        }
        Err(panic) => {
            error!(action, panic = panic_message(panic.as_ref()), "action panicked");
            ActionResult::ServerError {
                message: DEFAULT_SERVER_ERROR_MESSAGE.to_string(),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
