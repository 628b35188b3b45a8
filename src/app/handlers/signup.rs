//! Password sign-up flow.

use super::{found, found_with_cookies, with_query_message};
use crate::{
    app::redirect::RedirectPolicy,
    provider::{AuthProvider, CredentialOutcome, SignUpRequest},
};
use axum::{
    extract::{Extension, Form},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub redirect_url: Option<String>,
}

pub async fn signup(
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Form(form): Form<SignUpForm>,
) -> Response {
    let callback_url = policy.validate(
        form.redirect_url.as_deref(),
        &with_query_message("/profile", "success", "Thanks for registering!"),
    );

    let request = SignUpRequest {
        name: form.name,
        email: form.email,
        password: form.password,
        callback_url: callback_url.clone(),
    };

    match provider.sign_up_email(request).await {
        Ok(CredentialOutcome::Accepted(reply)) => found_with_cookies(reply, &callback_url),
        Ok(CredentialOutcome::Rejected { message }) => {
            found(&with_query_message("/login", "error", &message))
        }
        Err(err) => {
            error!("Sign up failed: {err}");
            found(&with_query_message("/login", "error", "Sign up failed"))
        }
    }
}
