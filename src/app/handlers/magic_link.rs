//! Magic-link request and verification flow.

use super::{found, found_with_cookies, with_query_message};
use crate::{
    app::redirect::RedirectPolicy,
    provider::{AuthProvider, MagicLinkOutcome, MagicLinkRequest},
};
use axum::{
    extract::{Extension, Form, Query},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
pub struct MagicLinkForm {
    pub email: String,
    pub redirect_url: Option<String>,
}

pub async fn request(
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Form(form): Form<MagicLinkForm>,
) -> Response {
    let intermediate_url = with_query_message(
        "/login/magic-link",
        "success",
        "Magic link sent! Check your email.",
    );
    let callback_url = policy.validate(form.redirect_url.as_deref(), "/profile");
    let error_callback_url = policy.validate(form.redirect_url.as_deref(), "/login/magic-link");

    let request = MagicLinkRequest {
        email: form.email,
        callback_url,
        error_callback_url,
    };

    // Anti-enumeration: the response is identical whether the email exists,
    // the provider rejected it, or the call failed outright.
    if let Err(err) = provider.request_magic_link(request).await {
        debug!("Magic link issuance error: {err}");
    }
    found(&intermediate_url)
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

pub async fn verify(
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let Some(token) = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
    else {
        return found(&with_query_message("/login", "error", "Invalid magic link"));
    };

    // One verification per token; expired, replayed, and unknown tokens all
    // get the same message, and a failed attempt is never retried.
    match provider.verify_magic_link(token).await {
        Ok(MagicLinkOutcome::Established(reply)) => found_with_cookies(reply, "/profile"),
        Ok(MagicLinkOutcome::Rejected) => found(&with_query_message(
            "/login",
            "error",
            "Invalid or expired magic link",
        )),
        Err(err) => {
            error!("Magic link verification failed: {err}");
            found(&with_query_message(
                "/login",
                "error",
                "Invalid or expired magic link",
            ))
        }
    }
}
