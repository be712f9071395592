//! Token issuance: the `CredentialIssuer` seam and its JWT adapter.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use ulid::Ulid;

use super::{Token, TokenKind};
use crate::identity::Identity;

const DEFAULT_ISSUER: &str = "tessera";
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 24 * 60 * 60;
const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Produces the access and refresh tokens for a verified identity.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn create_access_token(&self, identity: &Identity) -> Result<Token>;
    async fn create_refresh_token(&self, identity: &Identity) -> Result<Token>;
}

#[derive(Clone, Debug)]
pub struct TokenConfig {
    issuer: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }
}

impl TokenConfig {
    #[must_use]
    pub fn new(issuer: String) -> Self {
        Self {
            issuer,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub const fn ttl_seconds(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_ttl_seconds,
            TokenKind::Refresh => self.refresh_ttl_seconds,
        }
    }

    /// Refresh tokens must outlive access tokens, and both must expire in the future.
    ///
    /// # Errors
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.issuer.trim().is_empty() {
            return Err(anyhow!("token issuer must not be empty"));
        }
        if self.access_ttl_seconds <= 0 {
            return Err(anyhow!("access token TTL must be positive"));
        }
        if self.refresh_ttl_seconds <= self.access_ttl_seconds {
            return Err(anyhow!(
                "refresh token TTL ({}s) must exceed access token TTL ({}s)",
                self.refresh_ttl_seconds,
                self.access_ttl_seconds
            ));
        }
        Ok(())
    }
}

/// Claims carried by every token tessera signs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub typ: String,
}

/// HS256 JWT issuer.
pub struct JwtIssuer {
    config: TokenConfig,
    header: Header,
    encoding_key: EncodingKey,
}

impl JwtIssuer {
    /// # Errors
    /// Returns an error if the config is invalid or the signing key is too short.
    pub fn new(config: TokenConfig, signing_key: &SecretString) -> Result<Self> {
        config.validate()?;

        let key = signing_key.expose_secret().as_bytes();
        if key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(anyhow!(
                "signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes"
            ));
        }

        Ok(Self {
            config,
            header: Header::new(Algorithm::HS256),
            encoding_key: EncodingKey::from_secret(key),
        })
    }

    fn issue(&self, identity: &Identity, kind: TokenKind) -> Result<Token> {
        // Whole seconds only: the cookie Expires attribute has no finer precision.
        let now = Utc::now().timestamp();
        let exp = now
            .checked_add(self.config.ttl_seconds(kind))
            .context("token expiry overflow")?;
        let expiry = DateTime::<Utc>::from_timestamp(exp, 0).context("token expiry out of range")?;

        let claims = TokenClaims {
            iss: self.config.issuer().to_string(),
            sub: identity.user_id().to_string(),
            iat: now,
            exp,
            jti: Ulid::new().to_string(),
            typ: kind.as_str().to_string(),
        };

        let value = encode(&self.header, &claims, &self.encoding_key)
            .with_context(|| format!("failed to sign {kind} token"))?;

        debug!(jti = %claims.jti, %kind, "token issued");

        Ok(Token::new(kind, SecretString::from(value), expiry))
    }
}

#[async_trait]
impl CredentialIssuer for JwtIssuer {
    #[instrument(skip(self, identity), fields(user_id = %identity))]
    async fn create_access_token(&self, identity: &Identity) -> Result<Token> {
        self.issue(identity, TokenKind::Access)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity))]
    async fn create_refresh_token(&self, identity: &Identity) -> Result<Token> {
        self.issue(identity, TokenKind::Refresh)
    }
}
