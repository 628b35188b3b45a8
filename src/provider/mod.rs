//! Authentication provider boundary.
//!
//! Credential verification, password hashing, magic-link token generation,
//! passkey ceremonies, and session persistence are owned by a provider behind
//! the [`AuthProvider`] trait. The server injects one implementation at
//! construction time; handlers never reach for a global client.
//!
//! Provider replies are normalized into a single shape, [`ProviderReply`],
//! at the adapter boundary: a status code plus an ordered header list. Flow
//! results that the original wire protocol signals through response bodies or
//! thrown errors are explicit enums here ([`CredentialOutcome`],
//! [`MagicLinkOutcome`]); `Err` is reserved for transport-level failures.

pub mod http;
pub mod memory;
mod types;

pub use types::{
    CredentialOutcome, ForwardedRequest, Identity, MagicLinkOutcome, MagicLinkRequest,
    ProviderReply, Role, SessionRef, SessionSnapshot, SignInRequest, SignUpRequest,
};

use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the session carried by the request headers, if any.
    ///
    /// Returns `Ok(None)` when no active session exists; `Err` is reserved
    /// for lookup failures (callers decide whether those degrade to
    /// anonymous).
    async fn session(&self, headers: &HeaderMap) -> Result<Option<SessionSnapshot>>;

    /// Register a user with email and password.
    async fn sign_up_email(&self, request: SignUpRequest) -> Result<CredentialOutcome>;

    /// Authenticate a user with email and password.
    async fn sign_in_email(&self, request: SignInRequest) -> Result<CredentialOutcome>;

    /// Terminate the session carried by `headers`.
    ///
    /// The reply carries the cookie entries that clear the session client-side.
    async fn sign_out(&self, headers: &HeaderMap) -> Result<ProviderReply>;

    /// Issue a magic link for `email` and deliver it out of band.
    async fn request_magic_link(&self, request: MagicLinkRequest) -> Result<()>;

    /// Verify a magic-link token and materialize a session.
    ///
    /// Tokens are single-use: the provider must reject a token that was
    /// already presented, and callers must not retry a failed verification.
    async fn verify_magic_link(&self, token: &str) -> Result<MagicLinkOutcome>;

    /// List users. The provider enforces its own authorization on `headers`.
    async fn list_users(&self, headers: &HeaderMap) -> Result<Vec<Identity>>;

    /// Change a user's role. The provider re-authenticates the acting
    /// session carried by `headers`; this is the only role mutation path.
    async fn set_role(&self, headers: &HeaderMap, user_id: &str, role: Role) -> Result<()>;

    /// Forward an opaque wire-protocol request to the provider unmodified.
    async fn forward(&self, request: ForwardedRequest) -> Result<ProviderReply>;
}
