//! `-v` verbosity with a `TESSERA_LOG_LEVEL` fallback.
//!
//! Each `-v` raises the level by one step above ERROR. The env var takes a
//! level name or its step number, so `TESSERA_LOG_LEVEL=info` equals `-vv`.

use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn parse_step(value: &str) -> Result<u8, String> {
    let value = value.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .position(|level| *level == value)
        .or_else(|| value.parse::<usize>().ok().filter(|step| *step < LEVELS.len()))
        .and_then(|step| u8::try_from(step).ok())
        .ok_or_else(|| format!("expected one of {} or 0-4", LEVELS.join(", ")))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: -v WARN, -vv INFO, -vvv DEBUG, -vvvv TRACE (default: ERROR)")
            .env("TESSERA_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_step)),
    )
}

/// Tracing level selected on the command line; `None` leaves the default.
#[must_use]
pub fn level(matches: &ArgMatches) -> Option<Level> {
    match matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0) {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}
