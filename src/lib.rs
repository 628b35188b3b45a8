//! # Portiere (Authentication Gateway Demo)
//!
//! `portiere` is a demo web server that renders session-aware pages and wires
//! email/password, magic-link, passkey, and social sign-in flows to a
//! pluggable authentication provider.
//!
//! ## Provider Boundary
//!
//! Credential verification, token issuance, passkey ceremonies, and session
//! persistence all belong to the provider behind [`provider::AuthProvider`].
//! The server owns route wiring, HTML rendering, and the security-critical
//! glue around it:
//!
//! - **Session resolution:** every request resolves its session exactly once;
//!   broken or expired cookies degrade to anonymous, never to a server error.
//! - **Redirect safety:** client-supplied destinations are only honored when
//!   they exactly match a configured allowlist; everything else falls back.
//! - **Cookie relay:** provider-issued `Set-Cookie` headers are forwarded
//!   verbatim, in order, exactly once per provider call.
//! - **Role gating:** admin actions re-check the resolved session's role and
//!   report failures with uniform wording to prevent enumeration.

pub mod app;
pub mod cli;
pub mod provider;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
