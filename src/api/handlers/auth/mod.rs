//! Auth handlers: the HTTP side of session issuance and password rotation.
//!
//! The orchestrator never sees HTTP. These adapters resolve the caller's
//! identity, parse bodies, call the orchestrator, and turn its result into a
//! response. Cookies are only written for successful issuance.

mod cookies;
mod identity;
pub(crate) mod password;
mod state;
pub(crate) mod token;
pub(crate) mod types;

pub use identity::{CallerIdentity, identity_from_headers, resolve_identity};
pub use state::SessionConfig;

use axum::response::{IntoResponse, Response};

use crate::session::SessionError;

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}
