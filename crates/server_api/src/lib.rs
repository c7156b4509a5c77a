use shared::{
    domain::{RegistrationRequest, WebinarId},
    error::{ActionError, ApiError, ErrorCode},
    protocol::{
        CreateWebinarRequest, RegistrationReceipt, RegistrationSummary, SessionSummary,
        WebinarSummary,
    },
};
use storage::Storage;
use tracing::info;

pub mod action;

pub use action::safe_action;

const MAX_TITLE_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Server-side registration mutation. Expects input that already passed the
/// registration schema; run it through [`safe_action`].
pub async fn register_attendee(
    ctx: &ApiContext,
    request: RegistrationRequest,
) -> Result<RegistrationReceipt, ActionError> {
    let webinar = ctx
        .storage
        .load_webinar(&request.webinar_id)
        .await
        .map_err(ActionError::internal)?
        .ok_or_else(|| ActionError::rejected("webinar not found"))?;
    let session = ctx
        .storage
        .session_for_webinar(&request.webinar_id, request.session_id)
        .await
        .map_err(ActionError::internal)?
        .ok_or_else(|| ActionError::rejected("webinar session not found"))?;

    let registration_id = ctx
        .storage
        .insert_registration(&request)
        .await
        .map_err(ActionError::internal)?
        .ok_or_else(|| ActionError::rejected("email is already registered for this session"))?;

    info!(
        webinar_id = %request.webinar_id,
        session_id = %request.session_id,
        registration_id = registration_id.0,
        "attendee registered"
    );

    Ok(RegistrationReceipt {
        registration_id,
        attendee_name: request.full_name(),
        webinar_id: webinar.webinar_id,
        session_id: session.session_id,
        webinar_title: webinar.title,
        session_starts_at: session.starts_at,
    })
}

pub async fn create_webinar(
    ctx: &ApiContext,
    request: CreateWebinarRequest,
) -> Result<WebinarSummary, ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "webinar title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("webinar title must be at most {MAX_TITLE_CHARS} characters"),
        ));
    }

    let webinar_id = ctx.storage.create_webinar(title).await.map_err(internal)?;
    let mut sessions = Vec::with_capacity(request.session_starts.len());
    for starts_at in request.session_starts {
        let session_id = ctx
            .storage
            .create_session(&webinar_id, starts_at)
            .await
            .map_err(internal)?;
        sessions.push(SessionSummary {
            session_id,
            starts_at,
        });
    }
    sessions.sort_by_key(|s| s.starts_at);

    info!(%webinar_id, sessions = sessions.len(), "webinar created");
    Ok(WebinarSummary {
        webinar_id,
        title: title.to_string(),
        sessions,
    })
}

pub async fn list_registrations(
    ctx: &ApiContext,
    webinar_id: &WebinarId,
) -> Result<Vec<RegistrationSummary>, ApiError> {
    ctx.storage
        .load_webinar(webinar_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, "webinar not found"))?;

    let registrations = ctx
        .storage
        .list_registrations(webinar_id)
        .await
        .map_err(internal)?;
    Ok(registrations
        .into_iter()
        .map(|r| RegistrationSummary {
            registration_id: r.registration_id,
            session_id: r.session_id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            registered_at: r.created_at,
        })
        .collect())
}

fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!(error = %err, "storage failure");
    ApiError::new(ErrorCode::Internal, "internal storage error")
}
