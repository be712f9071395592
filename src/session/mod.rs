//! Session orchestration: issue a token pair, rotate a password.
//!
//! Flow Overview: the transport layer resolves the caller's identity once and
//! passes it in explicitly. Each operation consults the credential leaves in a
//! fixed order, stops at the first failure, and returns a full result. The
//! caller applies side effects (cookies) only for `Ok` results.
//!
//! Security boundaries: the complexity policy is only consulted after the
//! current password has been proven, and the stored credential is only
//! replaced after both checks pass.

mod error;
mod types;

pub use error::{SessionError, StatusClass};
pub use types::{PasswordChangeRequest, SessionGrant};

use std::sync::Arc;
use tracing::{error, instrument, warn};

use crate::{
    credentials::{CredentialIssuer, CredentialManager, TokenKind},
    identity::Identity,
};

/// Holds no per-request state; one instance serves every request.
#[derive(Clone)]
pub struct SessionOrchestrator {
    issuer: Arc<dyn CredentialIssuer>,
    manager: Arc<dyn CredentialManager>,
}

impl SessionOrchestrator {
    #[must_use]
    pub fn new(issuer: Arc<dyn CredentialIssuer>, manager: Arc<dyn CredentialManager>) -> Self {
        Self { issuer, manager }
    }

    /// Mint an access token, then a refresh token, for the caller.
    ///
    /// # Errors
    /// `Unauthenticated` without an identity, `IssuanceFailed` if either token
    /// cannot be created.
    #[instrument(skip_all, fields(user_id))]
    pub async fn issue_session(
        &self,
        identity: Option<&Identity>,
    ) -> Result<SessionGrant, SessionError> {
        let identity = require_identity(identity)?;
        tracing::Span::current().record("user_id", tracing::field::display(identity));

        let access = self
            .issuer
            .create_access_token(identity)
            .await
            .map_err(|err| {
                error!(user_id = %identity, "Failed to create access token: {err:#}");
                SessionError::IssuanceFailed(TokenKind::Access)
            })?;

        let refresh = match self.issuer.create_refresh_token(identity).await {
            Ok(token) => token,
            Err(err) => {
                error!(user_id = %identity, "Failed to create refresh token: {err:#}");
                // The access token was minted but is never delivered; it expires on its own.
                warn!(
                    user_id = %identity,
                    expiry = %access.expiry(),
                    "Discarding undelivered access token"
                );
                return Err(SessionError::IssuanceFailed(TokenKind::Refresh));
            }
        };

        Ok(SessionGrant { access, refresh })
    }

    /// Verify the current password, check the new one, then replace it.
    ///
    /// # Errors
    /// `Unauthenticated` without an identity, `PasswordMismatch` when the current
    /// password is wrong (including when a concurrent rotation replaced it first),
    /// `ComplexityRejected` when the new one fails the policy, `Internal` on any
    /// storage failure.
    #[instrument(skip_all, fields(user_id))]
    pub async fn rotate_password(
        &self,
        identity: Option<&Identity>,
        request: PasswordChangeRequest,
    ) -> Result<(), SessionError> {
        let identity = require_identity(identity)?;
        tracing::Span::current().record("user_id", tracing::field::display(identity));
        let user_id = identity.user_id();

        let verified = self
            .manager
            .verify_password(user_id, &request.current_password)
            .await
            .map_err(|err| {
                error!(%user_id, "Failed to match password by user id: {err:#}");
                SessionError::Internal
            })?;
        let Some(verified) = verified else {
            warn!(%user_id, "Password does not match");
            return Err(SessionError::PasswordMismatch);
        };

        self.manager
            .check_complexity(&request.new_password)
            .map_err(|rejection| {
                warn!(%user_id, "Password complexity check failed: {rejection}");
                SessionError::ComplexityRejected {
                    reason: rejection.into_reason(),
                }
            })?;

        let replaced = self
            .manager
            .replace_password(&verified, &request.new_password)
            .await
            .map_err(|err| {
                error!(%user_id, "Failed to update user password: {err:#}");
                SessionError::Internal
            })?;
        if !replaced {
            // Another rotation committed first; the current password no longer holds.
            warn!(%user_id, "Password changed since verification");
            return Err(SessionError::PasswordMismatch);
        }

        Ok(())
    }
}

fn require_identity(identity: Option<&Identity>) -> Result<&Identity, SessionError> {
    identity.ok_or_else(|| {
        error!("Failed getting authenticated identity");
        SessionError::Unauthenticated
    })
}

#[cfg(test)]
mod tests;
