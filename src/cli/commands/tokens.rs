//! Token signing and lifetime arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SIGNING_KEY: &str = "signing-key";
pub const ARG_TOKEN_ISSUER: &str = "token-issuer";
pub const ARG_ACCESS_TOKEN_TTL: &str = "access-token-ttl";
pub const ARG_REFRESH_TOKEN_TTL: &str = "refresh-token-ttl";

#[derive(Debug)]
pub struct Options {
    pub signing_key: SecretString,
    pub issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required token argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let signing_key = matches
            .get_one::<String>(ARG_SIGNING_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --signing-key")?;
        let issuer = matches
            .get_one::<String>(ARG_TOKEN_ISSUER)
            .cloned()
            .context("missing argument: --token-issuer")?;
        let access_ttl_seconds = matches
            .get_one::<i64>(ARG_ACCESS_TOKEN_TTL)
            .copied()
            .context("missing argument: --access-token-ttl")?;
        let refresh_ttl_seconds = matches
            .get_one::<i64>(ARG_REFRESH_TOKEN_TTL)
            .copied()
            .context("missing argument: --refresh-token-ttl")?;

        Ok(Self {
            signing_key,
            issuer,
            access_ttl_seconds,
            refresh_ttl_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SIGNING_KEY)
                .long(ARG_SIGNING_KEY)
                .help("HMAC secret used to sign tokens (at least 32 bytes)")
                .env("TESSERA_SIGNING_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_ISSUER)
                .long(ARG_TOKEN_ISSUER)
                .help("Issuer (iss) claim of signed tokens")
                .env("TESSERA_TOKEN_ISSUER")
                .default_value("tessera"),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL)
                .long(ARG_ACCESS_TOKEN_TTL)
                .help("Access token lifetime in seconds")
                .env("TESSERA_ACCESS_TOKEN_TTL")
                .default_value("900")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL)
                .long(ARG_REFRESH_TOKEN_TTL)
                .help("Refresh token lifetime in seconds")
                .env("TESSERA_REFRESH_TOKEN_TTL")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}
