//! Identity header, cookie, and password policy arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_IDENTITY_HEADER: &str = "identity-header";
pub const ARG_ACCESS_COOKIE: &str = "access-cookie";
pub const ARG_REFRESH_COOKIE: &str = "refresh-cookie";
pub const ARG_PASSWORD_MIN_LENGTH: &str = "password-min-length";

#[derive(Debug)]
pub struct Options {
    pub identity_header: String,
    pub access_cookie: String,
    pub refresh_cookie: String,
    pub password_min_length: usize,
}

impl Options {
    /// # Errors
    /// Returns an error if an argument is missing or out of range.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let string = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .with_context(|| format!("missing argument: --{id}"))
        };
        let password_min_length = matches
            .get_one::<u64>(ARG_PASSWORD_MIN_LENGTH)
            .copied()
            .context("missing argument: --password-min-length")?;

        Ok(Self {
            identity_header: string(ARG_IDENTITY_HEADER)?,
            access_cookie: string(ARG_ACCESS_COOKIE)?,
            refresh_cookie: string(ARG_REFRESH_COOKIE)?,
            password_min_length: usize::try_from(password_min_length)
                .context("password minimum length does not fit in usize")?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_HEADER)
                .long(ARG_IDENTITY_HEADER)
                .help("Header carrying the user id set by the authenticating gateway")
                .env("TESSERA_IDENTITY_HEADER")
                .default_value("x-authenticated-user"),
        )
        .arg(
            Arg::new(ARG_ACCESS_COOKIE)
                .long(ARG_ACCESS_COOKIE)
                .help("Name of the access token cookie")
                .env("TESSERA_ACCESS_COOKIE")
                .default_value("access_token"),
        )
        .arg(
            Arg::new(ARG_REFRESH_COOKIE)
                .long(ARG_REFRESH_COOKIE)
                .help("Name of the refresh token cookie")
                .env("TESSERA_REFRESH_COOKIE")
                .default_value("refresh_token"),
        )
        .arg(
            Arg::new(ARG_PASSWORD_MIN_LENGTH)
                .long(ARG_PASSWORD_MIN_LENGTH)
                .help("Minimum length of a new password")
                .env("TESSERA_PASSWORD_MIN_LENGTH")
                .default_value("8")
                .value_parser(clap::value_parser!(u64).range(1..=128)),
        )
}
