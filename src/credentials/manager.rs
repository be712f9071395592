//! Password verification and replacement seam.
//!
//! Rotation is a compare-and-swap: `verify_password` hands back the version of
//! the credential it matched, and `replace_password` only writes while that
//! version is still the stored one. Two rotations racing on the same user
//! therefore behave as if one ran entirely before the other.

use anyhow::Result;
use async_trait::async_trait;
use secrecy::SecretString;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The candidate password does not satisfy the complexity policy.
///
/// The reason describes the candidate only, so it is safe to show the caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct ComplexityRejection {
    reason: String,
}

impl ComplexityRejection {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn into_reason(self) -> String {
        self.reason
    }
}

/// A stored credential that a supplied password matched.
///
/// `version` identifies the exact stored value (for the bundled stores, the
/// PHC hash string, which carries a fresh salt on every write).
#[derive(Clone, PartialEq, Eq)]
pub struct VerifiedCredential {
    user_id: Uuid,
    version: String,
}

impl VerifiedCredential {
    #[must_use]
    pub fn new(user_id: Uuid, version: impl Into<String>) -> Self {
        Self {
            user_id,
            version: version.into(),
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Debug for VerifiedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedCredential")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Verifies and mutates the stored password of a user.
#[async_trait]
pub trait CredentialManager: Send + Sync {
    /// `Ok(None)` for a wrong password and for an unknown user alike.
    async fn verify_password(
        &self,
        user_id: Uuid,
        candidate: &SecretString,
    ) -> Result<Option<VerifiedCredential>>;

    /// # Errors
    /// Returns the human-readable policy violation.
    fn check_complexity(&self, candidate: &SecretString) -> Result<(), ComplexityRejection>;

    /// Store `new_password` only if the credential is still `verified`.
    ///
    /// `Ok(false)` when it changed or disappeared since verification; nothing
    /// is written in that case.
    async fn replace_password(
        &self,
        verified: &VerifiedCredential,
        new_password: &SecretString,
    ) -> Result<bool>;
}
