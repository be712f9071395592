//! Failure classification for session operations.

use axum::http::StatusCode;
use thiserror::Error;

use crate::credentials::TokenKind;

/// Coarse status class reported to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Unauthenticated,
    BadRequest,
    Internal,
}

impl StatusClass {
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every way a session operation can fail.
///
/// Leaf error details are logged where they happen and never stored here, so
/// the `Display` output is always safe to return to the caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("Unable to parse request body")]
    MalformedRequest,
    /// Reported with the same text as any other bad request.
    #[error("Bad request")]
    PasswordMismatch,
    #[error("{reason}")]
    ComplexityRejected { reason: String },
    #[error("Failed to create {0} token")]
    IssuanceFailed(TokenKind),
    #[error("Internal system error")]
    Internal,
}

impl SessionError {
    #[must_use]
    pub const fn status_class(&self) -> StatusClass {
        match self {
            Self::Unauthenticated => StatusClass::Unauthenticated,
            Self::MalformedRequest | Self::PasswordMismatch | Self::ComplexityRejected { .. } => {
                StatusClass::BadRequest
            }
            Self::IssuanceFailed(_) | Self::Internal => StatusClass::Internal,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status_class().status_code()
    }

    /// Message safe to show the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        self.to_string()
    }
}
