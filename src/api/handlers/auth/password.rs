//! Password rotation endpoint.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use super::{
    identity::CallerIdentity,
    types::{PasswordChangeBody, SuccessResponse},
};
use crate::session::{SessionError, SessionOrchestrator};

/// Replace the caller's password after verifying the current one.
#[utoipa::path(
    put,
    path = "/v1/auth/password",
    request_body = PasswordChangeBody,
    responses(
        (status = 200, description = "Password updated", body = SuccessResponse),
        (status = 400, description = "Malformed body, wrong current password, or policy violation", body = String),
        (status = 401, description = "No authenticated identity", body = String),
        (status = 500, description = "Credential storage failure", body = String)
    ),
    tag = "auth"
)]
pub async fn password(
    CallerIdentity(identity): CallerIdentity,
    Extension(orchestrator): Extension<Arc<SessionOrchestrator>>,
    payload: Result<Json<PasswordChangeBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Unable to parse request body: {rejection}");
            return SessionError::MalformedRequest.into_response();
        }
    };

    match orchestrator
        .rotate_password(identity.as_ref(), body.into())
        .await
    {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse::success())).into_response(),
        Err(err) => err.into_response(),
    }
}
