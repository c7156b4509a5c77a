use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use server_api::{
    create_webinar, list_registrations, register_attendee, safe_action, ApiContext,
};
use shared::{
    domain::{RegistrationRequest, WebinarId},
    error::{ApiError, ValidationErrors},
    protocol::{
        ActionResult, CreateWebinarRequest, RegistrationReceipt, RegistrationSummary,
        WebinarSummary,
    },
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/webinars", post(http_create_webinar))
        .route(
            "/webinars/:webinar_id/registrations",
            get(http_list_registrations),
        )
        .route("/registrations", post(http_register))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            error!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn http_create_webinar(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWebinarRequest>,
) -> Result<Json<WebinarSummary>, (StatusCode, Json<ApiError>)> {
    create_webinar(&state.api, req)
        .await
        .map(Json)
        .map_err(|e| (status_for(&e), Json(e)))
}

async fn http_list_registrations(
    State(state): State<Arc<AppState>>,
    Path(webinar_id): Path<String>,
) -> Result<Json<Vec<RegistrationSummary>>, (StatusCode, Json<ApiError>)> {
    list_registrations(&state.api, &WebinarId(webinar_id))
        .await
        .map(Json)
        .map_err(|e| (status_for(&e), Json(e)))
}

/// Takes the raw body so that malformed JSON still yields an action result.
async fn http_register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<ActionResult<RegistrationReceipt>>) {
    let result = match serde_json::from_slice::<Value>(&body) {
        Ok(raw) => {
            safe_action("register_attendee", &raw, |req: RegistrationRequest| {
                register_attendee(&state.api, req)
            })
            .await
        }
        Err(error) => {
            let mut errors = ValidationErrors::default();
            errors.add_form_error(format!("Invalid JSON body: {error}"));
            ActionResult::ValidationError { errors }
        }
    };

    let status = match &result {
        ActionResult::Success { .. } => StatusCode::OK,
        ActionResult::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ActionResult::ServerError { .. } => StatusCode::BAD_REQUEST,
    };
    (status, Json(result))
}

fn status_for(error: &ApiError) -> StatusCode {
    use shared::error::ErrorCode;
    match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
