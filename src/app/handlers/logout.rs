//! Sign-out flow.
//!
//! Best-effort terminal: the user always lands on the callback page, even
//! when the provider-side sign-out fails.

use super::{PageQuery, found, found_to_with_cookies};
use crate::{app::redirect::RedirectPolicy, provider::AuthProvider};
use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

pub async fn logout(
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let callback_url = policy.validate(query.redirect_url.as_deref(), "/?message=Bye!");

    match provider.sign_out(&headers).await {
        // The relayed cookies clear the session client-side.
        Ok(reply) => found_to_with_cookies(reply, &callback_url),
        Err(err) => {
            error!("Logout error: {err}");
            found(&callback_url)
        }
    }
}
