//! Argon2id password hashing, run off the async executor.

use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use secrecy::{ExposeSecret, SecretString};
use tokio::task::spawn_blocking;

/// Hash a password into a PHC string.
pub(super) async fn hash_password(password: &SecretString) -> Result<String> {
    let password = SecretString::from(password.expose_secret().to_owned());
    spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| anyhow!("password hashing failed: {err}"))
    })
    .await
    .context("password hashing task failed")?
}

/// Compare a candidate against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only malformed hashes and internal failures are errors.
pub(super) async fn verify_password(candidate: &SecretString, stored_hash: String) -> Result<bool> {
    let candidate = SecretString::from(candidate.expose_secret().to_owned());
    spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|err| anyhow!("invalid stored password hash: {err}"))?;
        match Argon2::default().verify_password(candidate.expose_secret().as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(anyhow!("password verification failed: {err}")),
        }
    })
    .await
    .context("password verification task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() -> Result<()> {
        let hash = hash_password(&SecretString::from("New$Pass1")).await?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&SecretString::from("New$Pass1"), hash.clone()).await?);
        assert!(!verify_password(&SecretString::from("old"), hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn hashes_are_salted() -> Result<()> {
        let first = hash_password(&SecretString::from("same")).await?;
        let second = hash_password(&SecretString::from("same")).await?;
        assert_ne!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let result = verify_password(&SecretString::from("x"), "not-a-phc".to_string()).await;
        assert!(result.is_err());
    }
}
