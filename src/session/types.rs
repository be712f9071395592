//! Inputs and results of session operations.

use secrecy::SecretString;

use crate::credentials::Token;

/// Password rotation input. Lives for one call and is never persisted.
#[derive(Debug)]
pub struct PasswordChangeRequest {
    pub current_password: SecretString,
    pub new_password: SecretString,
}

impl PasswordChangeRequest {
    #[must_use]
    pub fn new(current_password: impl Into<String>, new_password: impl Into<String>) -> Self {
        Self {
            current_password: SecretString::from(current_password.into()),
            new_password: SecretString::from(new_password.into()),
        }
    }
}

/// Both tokens of a freshly issued session.
///
/// Only produced once both issuances succeeded; delivery happens afterwards.
#[derive(Debug)]
pub struct SessionGrant {
    pub access: Token,
    pub refresh: Token,
}
