//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action that starts the session server.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{session, tokens};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let token_opts = tokens::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        signing_key: token_opts.signing_key,
        token_issuer: token_opts.issuer,
        access_ttl_seconds: token_opts.access_ttl_seconds,
        refresh_ttl_seconds: token_opts.refresh_ttl_seconds,
        identity_header: session_opts.identity_header,
        access_cookie: session_opts.access_cookie,
        refresh_cookie: session_opts.refresh_cookie,
        password_min_length: session_opts.password_min_length,
    }))
}
