//! Authentication provider arguments.

use anyhow::Result;
use clap::{Arg, Command};

pub const ARG_PROVIDER_URL: &str = "provider-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_MAGIC_LINK_TTL_SECONDS: &str = "magic-link-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_URL)
                .long(ARG_PROVIDER_URL)
                .help("Base URL of the authentication provider")
                .long_help(
                    "Base URL of the external authentication provider. When omitted, portiere runs its built-in in-memory provider, intended for demos and tests only.",
                )
                .env("PORTIERE_PROVIDER_URL"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session lifetime used by the in-memory provider")
                .default_value("604800")
                .env("PORTIERE_SESSION_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_MAGIC_LINK_TTL_SECONDS)
                .long(ARG_MAGIC_LINK_TTL_SECONDS)
                .help("Magic-link token lifetime used by the in-memory provider")
                .default_value("300")
                .env("PORTIERE_MAGIC_LINK_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: Option<String>,
    pub session_ttl_seconds: i64,
    pub magic_link_ttl_seconds: i64,
}

impl Options {
    /// Collect provider options from parsed matches.
    ///
    /// # Errors
    /// Currently infallible; kept fallible for parity with other option blocks.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            url: matches.get_one::<String>(ARG_PROVIDER_URL).cloned(),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(604_800),
            magic_link_ttl_seconds: matches
                .get_one::<i64>(ARG_MAGIC_LINK_TTL_SECONDS)
                .copied()
                .unwrap_or(300),
        })
    }
}
