//! Wizard session endpoints
//!
//! Each handler forwards to a [`WizardHandle`] and returns the resulting
//! snapshot. Classification runs in the background; clients follow it through
//! `GET /wizard/:id` or the session's SSE stream.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::sse::wizard_event_stream;
use crate::error::{ApiError, ApiResult};
use crate::models::ImageUpload;
use crate::workflow::{WizardHandle, WizardSnapshot};
use crate::AppState;

/// Optional header carrying the original file name of an upload
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// POST /wizard
///
/// Opens a new wizard session at the first part.
pub async fn create_wizard(
    State(state): State<AppState>,
) -> (StatusCode, Json<WizardSnapshot>) {
    let wizard = WizardHandle::new(state.wizard_context.clone(), None);
    state
        .sessions
        .write()
        .await
        .insert(wizard.session_id(), wizard.clone());

    (StatusCode::CREATED, Json(wizard.snapshot().await))
}

/// GET /wizard/:session_id
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<WizardSnapshot>> {
    let wizard = state.wizard(session_id).await?;
    Ok(Json(wizard.snapshot().await))
}

/// DELETE /wizard/:session_id
///
/// Drops the session. A verification still in flight finishes unobserved.
pub async fn delete_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let wizard = state
        .sessions
        .write()
        .await
        .remove(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("Wizard session {}", session_id)))?;

    wizard.reset().await;
    tracing::info!(session_id = %session_id, "Wizard session removed");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /wizard/:session_id/selection
///
/// Body is the raw image; `Content-Type` must be an `image/*` type.
pub async fn select_file(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WizardSnapshot>> {
    let wizard = state.wizard(session_id).await?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .ok_or_else(|| ApiError::BadRequest("Content-Type header is required".to_string()))?;

    if !content_type.starts_with("image/") {
        return Err(ApiError::BadRequest(format!(
            "Expected an image content type, got {}",
            content_type
        )));
    }

    let mut image = ImageUpload::new(body.to_vec(), content_type);
    if let Some(file_name) = headers.get(FILE_NAME_HEADER).and_then(|v| v.to_str().ok()) {
        image = image.with_file_name(file_name);
    }

    Ok(Json(wizard.select_file(image).await?))
}

/// POST /wizard/:session_id/confirm
pub async fn confirm_part(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<WizardSnapshot>> {
    let wizard = state.wizard(session_id).await?;
    Ok(Json(wizard.confirm_current_part().await))
}

/// POST /wizard/:session_id/back
pub async fn previous_part(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<WizardSnapshot>> {
    let wizard = state.wizard(session_id).await?;
    Ok(Json(wizard.go_to_previous_part().await))
}

/// POST /wizard/:session_id/reset
pub async fn reset_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<WizardSnapshot>> {
    let wizard = state.wizard(session_id).await?;
    Ok(Json(wizard.reset().await))
}

/// POST /wizard/:session_id/open
pub async fn open_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<WizardSnapshot>> {
    let wizard = state.wizard(session_id).await?;
    wizard.open();
    Ok(Json(wizard.snapshot().await))
}

/// POST /wizard/:session_id/close
///
/// Returns at once; the session resets after the dismiss delay.
pub async fn close_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<WizardSnapshot>> {
    let wizard = state.wizard(session_id).await?;
    wizard.close();

    // Closed sessions leave the registry once the dismiss delay has passed
    let sessions = state.sessions.clone();
    let delay = state.wizard_context.dismiss_reset_delay;
    let closed = wizard.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if !closed.is_open() {
            sessions.write().await.remove(&session_id);
            tracing::info!(session_id = %session_id, "Closed wizard session evicted");
        }
    });

    Ok(Json(wizard.snapshot().await))
}

/// Build wizard routes
pub fn wizard_routes() -> Router<AppState> {
    Router::new()
        .route("/wizard", post(create_wizard))
        .route("/wizard/:session_id", get(get_wizard).delete(delete_wizard))
        .route("/wizard/:session_id/selection", put(select_file))
        .route("/wizard/:session_id/confirm", post(confirm_part))
        .route("/wizard/:session_id/back", post(previous_part))
        .route("/wizard/:session_id/reset", post(reset_wizard))
        .route("/wizard/:session_id/open", post(open_wizard))
        .route("/wizard/:session_id/close", post(close_wizard))
        .route("/wizard/:session_id/events", get(wizard_event_stream))
}
