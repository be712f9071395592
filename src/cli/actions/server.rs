use crate::{
    api,
    cli::telemetry,
    credentials::{ComplexityPolicy, JwtIssuer, PgCredentialStore, TokenConfig},
    session::SessionOrchestrator,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub signing_key: SecretString,
    pub token_issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub identity_header: String,
    pub access_cookie: String,
    pub refresh_cookie: String,
    pub password_min_length: usize,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid, the database is unreachable,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let token_config = TokenConfig::new(args.token_issuer)
        .with_access_ttl_seconds(args.access_ttl_seconds)
        .with_refresh_ttl_seconds(args.refresh_ttl_seconds);
    let issuer =
        JwtIssuer::new(token_config, &args.signing_key).context("Invalid token configuration")?;

    let session_config = api::SessionConfig::default()
        .with_identity_header(&args.identity_header)?
        .with_access_cookie(&args.access_cookie)?
        .with_refresh_cookie(&args.refresh_cookie)?;

    debug!("Connecting to database: {}", redact_dsn(&args.dsn));

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let policy = ComplexityPolicy::default().with_min_length(args.password_min_length);
    let store = PgCredentialStore::new(pool, policy);

    let orchestrator = Arc::new(SessionOrchestrator::new(Arc::new(issuer), Arc::new(store)));
    let app = api::app(orchestrator, Arc::new(session_config));

    info!(
        access_ttl_seconds = args.access_ttl_seconds,
        refresh_ttl_seconds = args.refresh_ttl_seconds,
        "Session service configured"
    );

    let result = api::serve(args.port, app).await;

    telemetry::shutdown_tracer();

    result
}

/// Strip the password from a DSN before it reaches the logs.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("*****")).is_err() {
                return "<redacted>".to_string();
            }
            url.to_string()
        }
        Err(_) => "<redacted>".to_string(),
    }
}
