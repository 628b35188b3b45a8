//! Normalized provider types shared by all adapters.

use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use std::fmt;

/// User role as reported by the provider.
///
/// Parsed case-sensitively from the provider's lowercase wire strings;
/// unknown values are rejected at the parse boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity attached to a resolved session.
#[derive(Clone, Debug)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub role: Role,
    pub created_at_unix: i64,
}

/// Opaque reference to a provider-owned session.
#[derive(Clone, Debug)]
pub struct SessionRef {
    pub id: String,
    pub expires_at_unix: i64,
}

/// An active session as reported by the provider's lookup.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub user: Identity,
    pub session: SessionRef,
}

#[derive(Clone, Debug)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub callback_url: String,
}

#[derive(Clone, Debug)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    pub callback_url: String,
    pub error_callback_url: String,
}

#[derive(Clone, Debug)]
pub struct MagicLinkRequest {
    pub email: String,
    pub callback_url: String,
    pub error_callback_url: String,
}

/// Result of a credential flow (sign-up, sign-in).
///
/// Rejections carry the human-readable message the provider reported;
/// transport failures stay on the `Err` path of the trait call.
#[derive(Debug)]
pub enum CredentialOutcome {
    Accepted(ProviderReply),
    Rejected { message: String },
}

/// Result of a magic-link verification.
///
/// Rejection is deliberately unstructured: expired, replayed, and
/// never-issued tokens are indistinguishable to callers.
#[derive(Debug)]
pub enum MagicLinkOutcome {
    Established(ProviderReply),
    Rejected,
}

/// Opaque request forwarded verbatim to the provider's own wire protocol.
#[derive(Debug)]
pub struct ForwardedRequest {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Normalized provider reply: status plus an ordered header list.
///
/// Multi-value headers (notably `Set-Cookie`) stay as separate entries in
/// their original order; adapters never join them into one line.
#[derive(Debug)]
pub struct ProviderReply {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Vec<u8>,
}

impl ProviderReply {
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.headers
    }

    /// Consume the reply, yielding its headers in original order.
    #[must_use]
    pub fn into_headers(self) -> Vec<(HeaderName, HeaderValue)> {
        self.headers
    }

    /// Cookie-setting entries, in the order the provider emitted them.
    pub fn set_cookies(&self) -> impl Iterator<Item = &HeaderValue> {
        self.headers
            .iter()
            .filter(|(name, _)| *name == SET_COOKIE)
            .map(|(_, value)| value)
    }

    /// Provider-resolved redirect target, when the reply carries one.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.headers
            .iter()
            .find(|(name, _)| *name == LOCATION)
            .and_then(|(_, value)| value.to_str().ok())
            .map(ToString::to_string)
    }
}

impl IntoResponse for ProviderReply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        for (name, value) in self.headers {
            response.headers_mut().append(name, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn role_parse_is_closed_and_case_sensitive() {
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn reply_set_cookies_preserves_order() {
        let reply = ProviderReply::new(StatusCode::OK)
            .with_header(SET_COOKIE, HeaderValue::from_static("a=1; Path=/"))
            .with_header(
                HeaderName::from_static("content-type"),
                HeaderValue::from_static("application/json"),
            )
            .with_header(SET_COOKIE, HeaderValue::from_static("b=2; Path=/"));

        let cookies: Vec<&str> = reply
            .set_cookies()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(cookies, vec!["a=1; Path=/", "b=2; Path=/"]);
    }

    #[test]
    fn reply_location_reads_first_entry() {
        let reply = ProviderReply::new(StatusCode::FOUND)
            .with_header(LOCATION, HeaderValue::from_static("/profile"));
        assert_eq!(reply.location().as_deref(), Some("/profile"));

        let reply = ProviderReply::new(StatusCode::OK);
        assert_eq!(reply.location(), None);
    }

    #[test]
    fn reply_into_response_keeps_duplicate_headers() {
        let reply = ProviderReply::new(StatusCode::OK)
            .with_header(SET_COOKIE, HeaderValue::from_static("a=1"))
            .with_header(SET_COOKIE, HeaderValue::from_static("b=2"));

        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
    }
}
