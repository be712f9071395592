//! Identity resolution for inbound requests.
//!
//! The fronting gateway authenticates the caller and forwards the user id in a
//! trusted header (it must strip any client-supplied copy). The middleware turns
//! that header into an [`Identity`] request extension once per request, and
//! handlers read it back through [`CallerIdentity`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderName, request::Parts},
    middleware::Next,
    response::Response,
};
use std::{convert::Infallible, sync::Arc};
use tracing::debug;
use uuid::Uuid;

use super::state::SessionConfig;
use crate::identity::Identity;

/// Parse the gateway header into an identity. Missing or malformed ⇒ `None`.
#[must_use]
pub fn identity_from_headers(headers: &HeaderMap, header: &HeaderName) -> Option<Identity> {
    let value = headers.get(header)?.to_str().ok()?.trim();
    Uuid::parse_str(value).ok().map(Identity::new)
}

pub async fn resolve_identity(
    State(config): State<Arc<SessionConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    match identity_from_headers(request.headers(), config.identity_header()) {
        Some(identity) => {
            request.extensions_mut().insert(identity);
        }
        None => debug!("No authenticated identity on request"),
    }
    next.run(request).await
}

/// The identity resolved for this request, if any.
///
/// Never rejects: the orchestrator decides what a missing identity means.
#[derive(Clone, Copy, Debug)]
pub struct CallerIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Identity>().copied()))
    }
}
