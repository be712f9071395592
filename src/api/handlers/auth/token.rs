//! Session issuance endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use super::{
    cookies::session_cookies, identity::CallerIdentity, state::SessionConfig,
    types::SuccessResponse,
};
use crate::session::{SessionError, SessionOrchestrator};

/// Issue an access/refresh token pair as cookies for the authenticated caller.
#[utoipa::path(
    post,
    path = "/v1/auth/token",
    responses(
        (status = 200, description = "Access and refresh cookies set", body = SuccessResponse),
        (status = 401, description = "No authenticated identity", body = String),
        (status = 500, description = "Token issuance failed", body = String)
    ),
    tag = "auth"
)]
pub async fn token(
    CallerIdentity(identity): CallerIdentity,
    Extension(orchestrator): Extension<Arc<SessionOrchestrator>>,
    Extension(config): Extension<Arc<SessionConfig>>,
) -> Response {
    let grant = match orchestrator.issue_session(identity.as_ref()).await {
        Ok(grant) => grant,
        Err(err) => return err.into_response(),
    };

    // Build both cookies before touching the response so a failure sets neither.
    let cookies = match session_cookies(&config, &grant) {
        Ok(cookies) => cookies,
        Err(err) => {
            error!("Failed to build token cookie: {err}");
            return SessionError::Internal.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    (StatusCode::OK, headers, Json(SuccessResponse::success())).into_response()
}
