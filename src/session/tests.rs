//! Orchestrator tests against counting fake leaves.

use super::*;
use crate::credentials::{
    ComplexityPolicy, ComplexityRejection, MemoryCredentialStore, Token, VerifiedCredential,
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

#[derive(Default)]
struct FakeIssuer {
    fail_access: bool,
    fail_refresh: bool,
    access_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl FakeIssuer {
    fn token(kind: TokenKind, identity: &Identity, serial: usize, ttl: i64) -> Token {
        Token::new(
            kind,
            SecretString::from(format!("{kind}-{identity}-{serial}")),
            Utc::now() + Duration::seconds(ttl),
        )
    }
}

#[async_trait]
impl CredentialIssuer for FakeIssuer {
    async fn create_access_token(&self, identity: &Identity) -> Result<Token> {
        let serial = self.access_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_access {
            return Err(anyhow!("signer unavailable"));
        }
        Ok(Self::token(TokenKind::Access, identity, serial, 60))
    }

    async fn create_refresh_token(&self, identity: &Identity) -> Result<Token> {
        let serial = self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            return Err(anyhow!("signer unavailable"));
        }
        Ok(Self::token(TokenKind::Refresh, identity, serial, 3600))
    }
}

#[derive(Default)]
struct FakeManager {
    current: String,
    verify_error: bool,
    replace_error: bool,
    replace_stale: bool,
    policy: ComplexityPolicy,
    verify_calls: AtomicUsize,
    complexity_calls: AtomicUsize,
    replaced: Mutex<Vec<(Uuid, String)>>,
}

impl FakeManager {
    fn with_current(current: &str) -> Self {
        Self {
            current: current.to_string(),
            ..Self::default()
        }
    }

    fn replaced(&self) -> Vec<(Uuid, String)> {
        self.replaced
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CredentialManager for FakeManager {
    async fn verify_password(
        &self,
        user_id: Uuid,
        candidate: &SecretString,
    ) -> Result<Option<VerifiedCredential>> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.verify_error {
            return Err(anyhow!("connection reset"));
        }
        Ok((candidate.expose_secret() == self.current)
            .then(|| VerifiedCredential::new(user_id, self.current.clone())))
    }

    fn check_complexity(&self, candidate: &SecretString) -> Result<(), ComplexityRejection> {
        self.complexity_calls.fetch_add(1, Ordering::SeqCst);
        self.policy.check(candidate.expose_secret())
    }

    async fn replace_password(
        &self,
        verified: &VerifiedCredential,
        new_password: &SecretString,
    ) -> Result<bool> {
        if self.replace_error {
            return Err(anyhow!("disk full"));
        }
        if self.replace_stale {
            return Ok(false);
        }
        self.replaced
            .lock()
            .map_err(|_| anyhow!("poisoned"))?
            .push((verified.user_id(), new_password.expose_secret().to_string()));
        Ok(true)
    }
}

fn orchestrator(issuer: &Arc<FakeIssuer>, manager: &Arc<FakeManager>) -> SessionOrchestrator {
    SessionOrchestrator::new(issuer.clone(), manager.clone())
}

fn identity() -> Identity {
    Identity::new(Uuid::new_v4())
}

#[tokio::test]
async fn issue_session_without_identity_consults_no_leaf() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager::default());

    let result = orchestrator(&issuer, &manager).issue_session(None).await;

    assert_eq!(result.err(), Some(SessionError::Unauthenticated));
    assert_eq!(issuer.access_calls.load(Ordering::SeqCst), 0);
    assert_eq!(issuer.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rotate_password_without_identity_consults_no_leaf() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager::with_current("old"));

    let result = orchestrator(&issuer, &manager)
        .rotate_password(None, PasswordChangeRequest::new("old", "New$Pass1"))
        .await;

    assert_eq!(result, Err(SessionError::Unauthenticated));
    assert_eq!(manager.verify_calls.load(Ordering::SeqCst), 0);
    assert_eq!(manager.complexity_calls.load(Ordering::SeqCst), 0);
    assert!(manager.replaced().is_empty());
}

#[tokio::test]
async fn issue_session_returns_both_tokens() -> Result<()> {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager::default());
    let identity = identity();

    let grant = orchestrator(&issuer, &manager)
        .issue_session(Some(&identity))
        .await
        .map_err(|err| anyhow!("{err}"))?;

    assert_eq!(grant.access.kind(), TokenKind::Access);
    assert_eq!(grant.refresh.kind(), TokenKind::Refresh);
    assert!(grant.access.value().contains(&identity.to_string()));
    assert_eq!(issuer.access_calls.load(Ordering::SeqCst), 1);
    assert_eq!(issuer.refresh_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn access_failure_skips_refresh_issuance() {
    let issuer = Arc::new(FakeIssuer {
        fail_access: true,
        ..FakeIssuer::default()
    });
    let manager = Arc::new(FakeManager::default());

    let result = orchestrator(&issuer, &manager)
        .issue_session(Some(&identity()))
        .await;

    assert_eq!(
        result.err(),
        Some(SessionError::IssuanceFailed(TokenKind::Access))
    );
    assert_eq!(issuer.access_calls.load(Ordering::SeqCst), 1);
    assert_eq!(issuer.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refresh_failure_returns_no_grant() {
    let issuer = Arc::new(FakeIssuer {
        fail_refresh: true,
        ..FakeIssuer::default()
    });
    let manager = Arc::new(FakeManager::default());

    let result = orchestrator(&issuer, &manager)
        .issue_session(Some(&identity()))
        .await;

    let error = result.err();
    assert_eq!(error, Some(SessionError::IssuanceFailed(TokenKind::Refresh)));
    assert_eq!(
        error.map(|err| err.status_class()),
        Some(StatusClass::Internal)
    );
}

#[tokio::test]
async fn repeated_issuance_yields_independent_pairs() -> Result<()> {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager::default());
    let orchestrator = orchestrator(&issuer, &manager);
    let identity = identity();

    let first = orchestrator
        .issue_session(Some(&identity))
        .await
        .map_err(|err| anyhow!("{err}"))?;
    let second = orchestrator
        .issue_session(Some(&identity))
        .await
        .map_err(|err| anyhow!("{err}"))?;

    assert_ne!(first.access.value(), second.access.value());
    assert_ne!(first.refresh.value(), second.refresh.value());
    assert_eq!(issuer.access_calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn wrong_current_password_is_a_bad_request_without_side_effects() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager::with_current("old"));

    let result = orchestrator(&issuer, &manager)
        .rotate_password(
            Some(&identity()),
            PasswordChangeRequest::new("guess", "New$Pass1"),
        )
        .await;

    assert_eq!(result, Err(SessionError::PasswordMismatch));
    assert_eq!(manager.complexity_calls.load(Ordering::SeqCst), 0);
    assert!(manager.replaced().is_empty());
}

#[tokio::test]
async fn verify_error_is_internal() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager {
        verify_error: true,
        ..FakeManager::with_current("old")
    });

    let result = orchestrator(&issuer, &manager)
        .rotate_password(Some(&identity()), PasswordChangeRequest::new("old", "New$Pass1"))
        .await;

    assert_eq!(result, Err(SessionError::Internal));
    assert_eq!(manager.complexity_calls.load(Ordering::SeqCst), 0);
    assert!(manager.replaced().is_empty());
}

#[tokio::test]
async fn complexity_rejection_surfaces_reason() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager::with_current("old"));

    let result = orchestrator(&issuer, &manager)
        .rotate_password(Some(&identity()), PasswordChangeRequest::new("old", "weak"))
        .await;

    match result {
        Err(SessionError::ComplexityRejected { reason }) => {
            assert!(reason.contains("at least 8 characters"));
        }
        other => panic!("expected complexity rejection, got {other:?}"),
    }
    assert!(manager.replaced().is_empty());
}

#[tokio::test]
async fn replace_error_is_internal() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager {
        replace_error: true,
        ..FakeManager::with_current("old")
    });

    let result = orchestrator(&issuer, &manager)
        .rotate_password(Some(&identity()), PasswordChangeRequest::new("old", "New$Pass1"))
        .await;

    assert_eq!(result, Err(SessionError::Internal));
}

#[tokio::test]
async fn rotation_scenario() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager::with_current("old"));
    let orchestrator = orchestrator(&issuer, &manager);
    let user = identity();

    let mismatch = orchestrator
        .rotate_password(Some(&user), PasswordChangeRequest::new("not-old", "New$Pass1"))
        .await;
    assert_eq!(
        mismatch.err().map(|err| err.status_code()),
        Some(axum::http::StatusCode::BAD_REQUEST)
    );
    assert!(manager.replaced().is_empty());

    let weak = orchestrator
        .rotate_password(Some(&user), PasswordChangeRequest::new("old", "weak"))
        .await;
    assert!(matches!(
        weak,
        Err(SessionError::ComplexityRejected { .. })
    ));
    assert!(manager.replaced().is_empty());

    let ok = orchestrator
        .rotate_password(Some(&user), PasswordChangeRequest::new("old", "New$Pass1"))
        .await;
    assert_eq!(ok, Ok(()));
    assert_eq!(
        manager.replaced(),
        vec![(user.user_id(), "New$Pass1".to_string())]
    );
    assert_eq!(issuer.access_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn replacement_lost_to_a_concurrent_rotation_is_a_mismatch() {
    let issuer = Arc::new(FakeIssuer::default());
    let manager = Arc::new(FakeManager {
        replace_stale: true,
        ..FakeManager::with_current("old")
    });

    let result = orchestrator(&issuer, &manager)
        .rotate_password(Some(&identity()), PasswordChangeRequest::new("old", "New$Pass1"))
        .await;

    assert_eq!(result, Err(SessionError::PasswordMismatch));
    assert!(manager.replaced().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_rotations_do_not_both_succeed() -> Result<()> {
    let user = identity();
    let store = Arc::new(MemoryCredentialStore::default());
    store
        .insert_user(user.user_id(), &SecretString::from("Old$Pass1"))
        .await?;
    let orchestrator = SessionOrchestrator::new(Arc::new(FakeIssuer::default()), store.clone());

    let rotate = |new_password: &'static str| {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .rotate_password(Some(&user), PasswordChangeRequest::new("Old$Pass1", new_password))
                .await
        })
    };
    let alpha = rotate("Alpha$Pass1");
    let bravo = rotate("Bravo$Pass1");
    let (alpha, bravo) = (alpha.await?, bravo.await?);

    let (winner, loser) = match (&alpha, &bravo) {
        (Ok(()), Err(SessionError::PasswordMismatch)) => ("Alpha$Pass1", "Bravo$Pass1"),
        (Err(SessionError::PasswordMismatch), Ok(())) => ("Bravo$Pass1", "Alpha$Pass1"),
        outcome => panic!("expected exactly one rotation to win, got {outcome:?}"),
    };

    // The password reported as set is the one that is stored.
    assert!(
        store
            .verify_password(user.user_id(), &SecretString::from(winner))
            .await?
            .is_some()
    );
    assert!(
        store
            .verify_password(user.user_id(), &SecretString::from(loser))
            .await?
            .is_none()
    );
    Ok(())
}
