//! HTTP adapter for an external authentication provider.
//!
//! Speaks the provider's REST surface with `reqwest` and normalizes every
//! response into [`ProviderReply`] at this boundary, so the rest of the
//! server only ever sees one shape. Redirects are never followed: the
//! adapter's callers decide what to do with `Location` and `Set-Cookie`.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use axum::http::{
    HeaderMap,
    header::{COOKIE, HOST},
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::error;
use url::Url;

use super::{
    AuthProvider, CredentialOutcome, ForwardedRequest, Identity, MagicLinkOutcome,
    MagicLinkRequest, ProviderReply, Role, SessionRef, SessionSnapshot, SignInRequest,
    SignUpRequest,
};

// The provider owns its own cancellation discipline; this bound is the
// adapter surfacing it instead of hanging the request pipeline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpAuthProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthProvider {
    /// Build an adapter for the provider at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).context("provider URL is not a valid URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("provider URL must be http(s): {base_url}");
        }
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to build provider HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn with_cookie(
        &self,
        builder: reqwest::RequestBuilder,
        headers: &HeaderMap,
    ) -> reqwest::RequestBuilder {
        match headers.get(COOKIE) {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn session(&self, headers: &HeaderMap) -> Result<Option<SessionSnapshot>> {
        let response = self
            .with_cookie(
                self.client.get(self.endpoint("/api/auth/get-session")),
                headers,
            )
            .send()
            .await
            .context("session lookup failed")?;

        if !response.status().is_success() {
            bail!("session lookup returned {}", response.status());
        }
        let body = response.bytes().await.context("session lookup body")?;
        let wire: Option<WireSession> =
            serde_json::from_slice(&body).context("session lookup payload")?;
        Ok(wire.map(WireSession::into_snapshot))
    }

    async fn sign_up_email(&self, request: SignUpRequest) -> Result<CredentialOutcome> {
        let response = self
            .client
            .post(self.endpoint("/api/auth/sign-up/email"))
            .json(&json!({
                "name": request.name,
                "email": request.email,
                "password": request.password,
                "callbackURL": request.callback_url,
                "rememberMe": true,
            }))
            .send()
            .await
            .context("sign-up call failed")?;

        credential_outcome(response, "Sign up failed").await
    }

    async fn sign_in_email(&self, request: SignInRequest) -> Result<CredentialOutcome> {
        let response = self
            .client
            .post(self.endpoint("/api/auth/sign-in/email"))
            .json(&json!({
                "email": request.email,
                "password": request.password,
                "callbackURL": request.callback_url,
                "errorCallbackURL": request.error_callback_url,
                "rememberMe": true,
            }))
            .send()
            .await
            .context("sign-in call failed")?;

        credential_outcome(response, "Sign in failed").await
    }

    async fn sign_out(&self, headers: &HeaderMap) -> Result<ProviderReply> {
        let response = self
            .with_cookie(self.client.post(self.endpoint("/api/auth/sign-out")), headers)
            .send()
            .await
            .context("sign-out call failed")?;
        Ok(normalize_reply(response).await?.0)
    }

    async fn request_magic_link(&self, request: MagicLinkRequest) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("/api/auth/sign-in/magic-link"))
            .json(&json!({
                "email": request.email,
                "callbackURL": request.callback_url,
                "errorCallbackURL": request.error_callback_url,
            }))
            .send()
            .await
            .context("magic-link issuance failed")?;

        if response.status().is_server_error() {
            bail!("magic-link issuance returned {}", response.status());
        }
        Ok(())
    }

    async fn verify_magic_link(&self, token: &str) -> Result<MagicLinkOutcome> {
        let response = self
            .client
            .get(self.endpoint("/api/auth/magic-link/verify"))
            .query(&[("token", token)])
            .send()
            .await
            .context("magic-link verification failed")?;

        if response.status().is_server_error() {
            bail!("magic-link verification returned {}", response.status());
        }

        let (reply, _body) = normalize_reply(response).await?;
        // A session is only established when the provider set cookies; the
        // status alone does not distinguish success from a redirect to the
        // error callback.
        if reply.status().is_client_error() || reply.set_cookies().next().is_none() {
            return Ok(MagicLinkOutcome::Rejected);
        }
        Ok(MagicLinkOutcome::Established(reply))
    }

    async fn list_users(&self, headers: &HeaderMap) -> Result<Vec<Identity>> {
        let response = self
            .with_cookie(
                self.client.get(self.endpoint("/api/auth/admin/list-users")),
                headers,
            )
            .send()
            .await
            .context("user listing failed")?;

        if !response.status().is_success() {
            bail!("user listing returned {}", response.status());
        }
        let listing: WireUserListing = response.json().await.context("user listing payload")?;
        Ok(listing
            .users
            .into_iter()
            .map(WireUser::into_identity)
            .collect())
    }

    async fn set_role(&self, headers: &HeaderMap, user_id: &str, role: Role) -> Result<()> {
        let response = self
            .with_cookie(
                self.client.post(self.endpoint("/api/auth/admin/set-role")),
                headers,
            )
            .json(&json!({
                "userId": user_id,
                "role": role.as_str(),
            }))
            .send()
            .await
            .context("role update failed")?;

        if !response.status().is_success() {
            bail!("role update returned {}", response.status());
        }
        Ok(())
    }

    async fn forward(&self, request: ForwardedRequest) -> Result<ProviderReply> {
        let url = self.endpoint(&request.path_and_query);
        let mut headers = request.headers;
        // The client sets Host for the upstream connection.
        headers.remove(HOST);

        let response = self
            .client
            .request(request.method, url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .context("provider passthrough failed")?;

        Ok(normalize_reply(response).await?.0)
    }
}

/// Map a provider response to a credential outcome.
///
/// 2xx is acceptance; 4xx is a rejection carrying the provider's message
/// (falling back to `fallback_message`); anything else is a transport error.
async fn credential_outcome(
    response: reqwest::Response,
    fallback_message: &str,
) -> Result<CredentialOutcome> {
    let status = response.status();
    let (reply, body) = normalize_reply(response).await?;

    if status.is_success() {
        return Ok(CredentialOutcome::Accepted(reply));
    }
    if status.is_client_error() {
        let message = serde_json::from_slice::<WireError>(&body)
            .ok()
            .and_then(|wire| wire.message)
            .unwrap_or_else(|| fallback_message.to_string());
        return Ok(CredentialOutcome::Rejected { message });
    }

    error!("Provider returned {status}");
    bail!("provider returned {status}");
}

/// Normalize a reqwest response into a [`ProviderReply`], preserving the
/// per-name order of multi-value headers. The raw body is also returned for
/// callers that need to inspect it.
async fn normalize_reply(response: reqwest::Response) -> Result<(ProviderReply, Vec<u8>)> {
    let mut reply = ProviderReply::new(response.status());
    let header_names: Vec<_> = response.headers().keys().cloned().collect();
    for name in header_names {
        for value in response.headers().get_all(&name) {
            reply = reply.with_header(name.clone(), value.clone());
        }
    }
    let body = response
        .bytes()
        .await
        .context("failed to read provider response body")?
        .to_vec();
    let reply = reply.with_body(body.clone());
    Ok((reply, body))
}

#[derive(Deserialize)]
struct WireSession {
    user: WireUser,
    session: WireSessionRef,
}

impl WireSession {
    fn into_snapshot(self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.into_identity(),
            session: SessionRef {
                id: self.session.id,
                expires_at_unix: self.session.expires_at.unwrap_or(0),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    email: String,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    created_at: Option<i64>,
}

impl WireUser {
    fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            name: self.name.unwrap_or_default(),
            email: self.email,
            email_verified: self.email_verified.unwrap_or(false),
            // Unknown or missing role strings degrade to the least
            // privileged role; the gate only grants on exact matches.
            role: self
                .role
                .as_deref()
                .and_then(Role::parse)
                .unwrap_or(Role::User),
            created_at_unix: self.created_at.unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSessionRef {
    id: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Deserialize)]
struct WireUserListing {
    users: Vec<WireUser>,
}

#[derive(Deserialize)]
struct WireError {
    #[serde(default)]
    message: Option<String>,
}
