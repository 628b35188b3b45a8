//! Command-line argument dispatch and server initialization.
//!
//! This module maps validated CLI arguments to the appropriate action, such
//! as starting the server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_ALLOWED_REDIRECT, ARG_BASE_URL, ARG_PORT, provider};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let base_url = matches
        .get_one::<String>(ARG_BASE_URL)
        .cloned()
        .context("missing required argument: --base-url")?;

    let allowed_redirects = matches
        .get_many::<String>(ARG_ALLOWED_REDIRECT)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let provider_opts = provider::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        base_url,
        provider_url: provider_opts.url,
        allowed_redirects,
        session_ttl_seconds: provider_opts.session_ttl_seconds,
        magic_link_ttl_seconds: provider_opts.magic_link_ttl_seconds,
    }))
}
