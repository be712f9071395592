//! In-process credential store.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    hashing::{hash_password, verify_password},
    manager::{ComplexityRejection, CredentialManager, VerifiedCredential},
    policy::ComplexityPolicy,
};

/// Argon2 hashes keyed by user id, guarded by a single lock.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    policy: ComplexityPolicy,
    hashes: RwLock<HashMap<Uuid, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new(policy: ComplexityPolicy) -> Self {
        Self {
            policy,
            hashes: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user with an initial password. The policy is not applied here.
    ///
    /// # Errors
    /// Returns an error if the user already exists or hashing fails.
    pub async fn insert_user(&self, user_id: Uuid, password: &SecretString) -> Result<()> {
        let hash = hash_password(password).await?;
        let mut hashes = self.hashes.write().await;
        if hashes.contains_key(&user_id) {
            return Err(anyhow!("user {user_id} already exists"));
        }
        hashes.insert(user_id, hash);
        Ok(())
    }
}

#[async_trait]
impl CredentialManager for MemoryCredentialStore {
    #[instrument(skip(self, candidate))]
    async fn verify_password(
        &self,
        user_id: Uuid,
        candidate: &SecretString,
    ) -> Result<Option<VerifiedCredential>> {
        let stored = self.hashes.read().await.get(&user_id).cloned();
        let Some(hash) = stored else {
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

        // Compare and swap under one write lock.
        let mut hashes = self.hashes.write().await;
        match hashes.get_mut(&verified.user_id()) {
            Some(slot) if slot.as_str() == verified.version() => {
                *slot = hash;
                Ok(true)
            }
            _ => {
                debug!("stored credential changed since verification");
                Ok(false)
            }
        }
    }
}
