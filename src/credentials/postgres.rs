//! Postgres-backed credential store.
//!
//! Expects the `users` table from `sql/schema.sql`. Only the Argon2 hash is
//! stored; raw passwords never reach the database.

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgPool, Row};
use tracing::{Instrument, debug, info_span, instrument};
use uuid::Uuid;

use super::{
    hashing::{hash_password, verify_password},
    manager::{ComplexityRejection, CredentialManager, VerifiedCredential},
    policy::ComplexityPolicy,
};

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
    policy: ComplexityPolicy,
}

impl PgCredentialStore {
    #[must_use]
    pub const fn new(pool: PgPool, policy: ComplexityPolicy) -> Self {
        Self { pool, policy }
    }

    async fn stored_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        let query = "SELECT password_hash FROM users WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up stored credential")?;

        row.map(|row| row.try_get::<String, _>("password_hash"))
            .transpose()
            .context("failed to decode stored credential")
    }
}

#[async_trait]
impl CredentialManager for PgCredentialStore {
    #[instrument(skip(self, candidate))]
    async fn verify_password(
        &self,
        user_id: Uuid,
        candidate: &SecretString,
    ) -> Result<Option<VerifiedCredential>> {
        let Some(hash) = self.stored_hash(user_id).await? else {
            debug!("no stored credential");
            return Ok(None);
        };
        let matched = verify_password(candidate, hash.clone()).await?;
        Ok(matched.then(|| VerifiedCredential::new(user_id, hash)))
    }

    fn check_complexity(&self, candidate: &SecretString) -> Result<(), ComplexityRejection> {
        self.policy.check(candidate.expose_secret())
    }

    #[instrument(skip_all, fields(user_id = %verified.user_id()))]
    async fn replace_password(
        &self,
        verified: &VerifiedCredential,
        new_password: &SecretString,
    ) -> Result<bool> {
        let hash = hash_password(new_password).await?;

        // A concurrent UPDATE on the same row re-evaluates the hash predicate after
        // the first commits, so only one of two racing rotations matches.
        let query = r"
            UPDATE users
            SET password_hash = $1, password_updated_at = NOW()
            WHERE id = $2 AND password_hash = $3
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(hash)
            .bind(verified.user_id())
            .bind(verified.version())
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update stored credential")?;

        if result.rows_affected() == 0 {
            debug!("stored credential changed since verification");
            return Ok(false);
        }

        Ok(true)
    }
}
