use super::*;
use crate::{
    action::HttpRegistrationAction,
    error::ClientError,
    modal::Visibility,
    notify::{ToastQueue, FALLBACK_ERROR_MESSAGE},
};
use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use shared::{
    domain::{RegistrationId, RegistrationRequest, SessionId, WebinarId},
    error::IssueKind,
};
use std::sync::Mutex;
use tokio::net::TcpListener;

const SESSION: &str = "1b4e28ba-2fa1-11d2-883f-0016d3cca427";

enum Scripted {
    Result(ActionResult<RegistrationReceipt>),
    Unreachable,
}

struct ScriptedAction {
    response: Scripted,
    calls: Mutex<Vec<RegistrationRequest>>,
}

impl ScriptedAction {
    fn new(response: Scripted) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }
}

#[async_trait]
impl RegistrationAction for ScriptedAction {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<ActionResult<RegistrationReceipt>, ClientError> {
        self.calls.lock().expect("lock").push(request.clone());
        match &self.response {
            Scripted::Result(result) => Ok(result.clone()),
            Scripted::Unreachable => Err(ClientError::UnexpectedResponse { status: 502 }),
        }
    }
}

fn receipt() -> RegistrationReceipt {
    RegistrationReceipt {
        registration_id: RegistrationId(7),
        webinar_id: WebinarId("w1".into()),
        session_id: SessionId(SESSION.parse().expect("uuid")),
        webinar_title: "Launch week".into(),
        session_starts_at: "2026-11-02T17:00:00Z".parse().expect("timestamp"),
        attendee_name: "Ann Lee".into(),
    }
}

fn form() -> Value {
    json!({
        "webinarId": "w1",
        "sessionId": SESSION,
        "firstName": "Ann",
        "lastName": "Lee",
        "email": "ann@x.com"
    })
}

fn flow_with(action: Arc<ScriptedAction>) -> (RegistrationFlow<ToastQueue>, ToastQueue) {
    let toasts = ToastQueue::new();
    (RegistrationFlow::new(action, toasts.clone()), toasts)
}

#[tokio::test]
async fn invalid_form_never_calls_the_action() {
    let action = ScriptedAction::new(Scripted::Result(ActionResult::Success { data: receipt() }));
    let (mut flow, toasts) = flow_with(action.clone());
    let mut raw = form();
    raw.as_object_mut().expect("object").remove("lastName");

    let outcome = flow.submit(&raw).await;

    let errors = match outcome {
        SubmitOutcome::Invalid(errors) => errors,
        other => panic!("expected inline errors, got {other:?}"),
    };
    assert_eq!(errors.kind_of("lastName"), Some(IssueKind::Required));
    assert_eq!(action.call_count(), 0);
    assert!(toasts.is_empty());
    assert_eq!(flow.modal().visibility(), Visibility::Hidden);
}

#[tokio::test]
async fn success_preloads_confirmation_and_shows_modal() {
    let action = ScriptedAction::new(Scripted::Result(ActionResult::Success { data: receipt() }));
    let (mut flow, toasts) = flow_with(action.clone());

    let outcome = flow.submit(&form()).await;

    assert_eq!(outcome, SubmitOutcome::Registered(receipt()));
    assert_eq!(action.call_count(), 1);
    assert!(toasts.is_empty());
    assert_eq!(flow.modal().visibility(), Visibility::Visible);
    assert_eq!(
        flow.modal().content(),
        Some(&ModalContent::RegistrationConfirmed(receipt()))
    );
    assert_eq!(flow.modal().prop("webinarId"), Some(&json!("w1")));
}

#[tokio::test]
async fn success_keeps_an_already_open_modal_visible() {
    let action = ScriptedAction::new(Scripted::Result(ActionResult::Success { data: receipt() }));
    let (mut flow, _) = flow_with(action);
    flow.modal_mut().toggle();

    flow.submit(&form()).await;
    assert_eq!(flow.modal().visibility(), Visibility::Visible);
}

#[tokio::test]
async fn server_error_message_becomes_a_toast() {
    let action = ScriptedAction::new(Scripted::Result(ActionResult::ServerError {
        message: "duplicate email".into(),
    }));
    let (mut flow, toasts) = flow_with(action);

    assert_eq!(flow.submit(&form()).await, SubmitOutcome::Failed);
    assert_eq!(toasts.messages(), vec!["duplicate email".to_string()]);
    assert_eq!(flow.modal().visibility(), Visibility::Hidden);
}

#[tokio::test]
async fn empty_server_message_falls_back_to_generic_text() {
    let action = ScriptedAction::new(Scripted::Result(ActionResult::ServerError {
        message: String::new(),
    }));
    let (mut flow, toasts) = flow_with(action);

    flow.submit(&form()).await;
    assert_eq!(toasts.messages(), vec![FALLBACK_ERROR_MESSAGE.to_string()]);
}

#[tokio::test]
async fn transport_failure_is_shown_through_the_bridge() {
    let action = ScriptedAction::new(Scripted::Unreachable);
    let (mut flow, toasts) = flow_with(action);

    assert_eq!(flow.submit(&form()).await, SubmitOutcome::Failed);
    assert_eq!(
        toasts.messages(),
        vec!["registration service answered with unexpected status 502".to_string()]
    );
}

#[tokio::test]
async fn server_side_field_errors_render_inline() {
    let mut errors = ValidationErrors::default();
    errors.add(
        "email",
        shared::error::FieldIssue::new(IssueKind::InvalidFormat, "Invalid email address"),
    );
    let action = ScriptedAction::new(Scripted::Result(ActionResult::ValidationError {
        errors: errors.clone(),
    }));
    let (mut flow, toasts) = flow_with(action);

    assert_eq!(flow.submit(&form()).await, SubmitOutcome::Invalid(errors));
    assert!(toasts.is_empty());
}

async fn duplicate_email_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route(
        "/registrations",
        post(|Json(_): Json<Value>| async {
            (
                axum::http::StatusCode::BAD_REQUEST,
                Json(ActionResult::<RegistrationReceipt>::ServerError {
                    message: "duplicate email".into(),
                }),
            )
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn end_to_end_duplicate_email_over_http() {
    let server_url = duplicate_email_server().await;
    let action = Arc::new(HttpRegistrationAction::new(&server_url).expect("action"));
    let toasts = ToastQueue::new();
    let mut flow = RegistrationFlow::new(action, toasts.clone());

    let outcome = flow.submit(&form()).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(toasts.messages(), vec!["duplicate email".to_string()]);
}
