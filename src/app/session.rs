//! Per-request session resolution.
//!
//! Flow Overview: the middleware asks the provider to resolve the session
//! cookie once per request and attaches the result to the request
//! extensions. Handlers read it through the [`SessionContext`] extractor.
//! Any lookup failure degrades to anonymous: a tampered or expired cookie
//! must never turn into a server error for the caller.

use crate::provider::{AuthProvider, Identity, SessionRef};
use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

/// Resolved authentication state for one request.
///
/// User and session are populated together or not at all; the pairing is
/// enforced by construction.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    inner: Option<(Identity, SessionRef)>,
}

impl SessionContext {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { inner: None }
    }

    #[must_use]
    pub const fn authenticated(user: Identity, session: SessionRef) -> Self {
        Self {
            inner: Some((user, session)),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&Identity> {
        self.inner.as_ref().map(|(user, _)| user)
    }

    #[must_use]
    pub fn session(&self) -> Option<&SessionRef> {
        self.inner.as_ref().map(|(_, session)| session)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.inner.is_some()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable when the resolver middleware is missing from the
        // stack, which is a wiring bug, not a client condition.
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Middleware: resolve the request's session exactly once and attach it.
pub async fn resolve(
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match provider.session(request.headers()).await {
        Ok(Some(snapshot)) => SessionContext::authenticated(snapshot.user, snapshot.session),
        Ok(None) => SessionContext::anonymous(),
        Err(err) => {
            // Broken or tampered cookies degrade to anonymous.
            error!("Failed to resolve session: {err}");
            SessionContext::anonymous()
        }
    };
    request.extensions_mut().insert(context);
    next.run(request).await
}
