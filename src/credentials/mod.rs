//! Credential capabilities consumed by the session orchestrator.
//!
//! Two seams live here:
//!
//! - [`CredentialIssuer`] mints signed, time-bounded tokens for an identity.
//! - [`CredentialManager`] verifies, validates, and replaces stored passwords.
//!
//! Each comes with concrete adapters ([`JwtIssuer`], [`PgCredentialStore`],
//! [`MemoryCredentialStore`]) so the server and the tests share one contract.

mod hashing;
pub mod issuer;
pub mod manager;
pub mod memory;
pub mod policy;
pub mod postgres;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

pub use issuer::{CredentialIssuer, JwtIssuer, TokenConfig};
pub use manager::{ComplexityRejection, CredentialManager, VerifiedCredential};
pub use memory::MemoryCredentialStore;
pub use policy::ComplexityPolicy;
pub use postgres::PgCredentialStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bearer token and the instant it stops being valid.
///
/// Tokens are never updated; a new issuance supersedes the old one.
#[derive(Debug)]
pub struct Token {
    kind: TokenKind,
    value: SecretString,
    expiry: DateTime<Utc>,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, value: SecretString, expiry: DateTime<Utc>) -> Self {
        Self {
            kind,
            value,
            expiry,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Raw token value, only exposed for cookie delivery.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.expose_secret()
    }

    #[must_use]
    pub const fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }
}
