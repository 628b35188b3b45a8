//! Password sign-in flow.

use super::{found, found_with_cookies, with_query_message};
use crate::{
    app::redirect::RedirectPolicy,
    provider::{AuthProvider, CredentialOutcome, SignInRequest},
};
use axum::{
    extract::{Extension, Form},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub redirect_url: Option<String>,
}

pub async fn signin(
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Form(form): Form<SignInForm>,
) -> Response {
    // The fallbacks differ: a failed sign-in must not land on a page that
    // assumes an authenticated session.
    let callback_url = policy.validate(form.redirect_url.as_deref(), "/profile");
    let error_callback_url = policy.validate(form.redirect_url.as_deref(), "/login");

    let request = SignInRequest {
        email: form.email,
        password: form.password,
        callback_url: callback_url.clone(),
        error_callback_url: error_callback_url.clone(),
    };

    match provider.sign_in_email(request).await {
        Ok(CredentialOutcome::Accepted(reply)) => found_with_cookies(reply, &callback_url),
        // No cookie relay on rejection.
        Ok(CredentialOutcome::Rejected { message }) => {
            found(&with_query_message(&error_callback_url, "error", &message))
        }
        Err(err) => {
            error!("Sign in failed: {err}");
            found(&with_query_message(
                &error_callback_url,
                "error",
                "Sign in failed",
            ))
        }
    }
}
