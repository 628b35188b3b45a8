//! Route handlers and the redirect helpers they share.

pub mod admin;
pub mod health;
pub mod home;
pub mod logout;
pub mod magic_link;
pub mod pages;
pub mod profile;
pub mod proxy;
pub mod signin;
pub mod signup;
pub mod whoami;

use crate::app::cookies;
use crate::provider::ProviderReply;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use url::form_urlencoded;

/// Query parameters accepted by every page route.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    pub redirect_url: Option<String>,
}

/// `302 Found` to `target`.
pub(crate) fn found(target: &str) -> Response {
    let location =
        HeaderValue::from_str(target).unwrap_or_else(|_| HeaderValue::from_static("/"));
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// `302 Found` to `target`, relaying the reply's cookies.
pub(crate) fn found_to_with_cookies(reply: ProviderReply, target: &str) -> Response {
    let mut headers = HeaderMap::new();
    cookies::relay(reply, &mut headers);
    let location =
        HeaderValue::from_str(target).unwrap_or_else(|_| HeaderValue::from_static("/"));
    headers.insert(LOCATION, location);
    (StatusCode::FOUND, headers).into_response()
}

/// `302 Found` to the provider-resolved URL (falling back to `fallback`),
/// relaying the reply's cookies.
pub(crate) fn found_with_cookies(reply: ProviderReply, fallback: &str) -> Response {
    let target = reply
        .location()
        .unwrap_or_else(|| fallback.to_string());
    found_to_with_cookies(reply, &target)
}

/// Append a URL-encoded `key=message` pair to a destination.
pub(crate) fn with_query_message(base: &str, key: &str, message: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    let encoded: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("{base}{separator}{key}={encoded}")
}

/// Carry a validated `redirect_url` on a link to another page.
pub(crate) fn link_with_redirect(path: &str, redirect_url: &str) -> String {
    if redirect_url.is_empty() {
        path.to_string()
    } else {
        with_query_message(path, "redirect_url", redirect_url)
    }
}
