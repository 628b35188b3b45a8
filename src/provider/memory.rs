//! In-process authentication provider for demos and tests.
//!
//! Flow Overview: users, sessions, and pending magic-link tokens live behind
//! one mutex; session and link tokens are random 32-byte values handed to the
//! client once, with only their SHA-256 digest retained for lookup. Magic
//! links are "delivered" by logging the URL, and every issuance is appended
//! to a log that tests can read back.
//!
//! This is a collaborator stand-in, not a credential store: it performs no
//! password KDF and keeps everything in memory. The real provider owns
//! password hashing and persistence.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use axum::http::{
    HeaderMap, HeaderValue, StatusCode,
    header::{COOKIE, LOCATION, SET_COOKIE},
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    AuthProvider, CredentialOutcome, ForwardedRequest, Identity, MagicLinkOutcome,
    MagicLinkRequest, ProviderReply, Role, SessionRef, SessionSnapshot, SignInRequest,
    SignUpRequest,
};

pub const SESSION_COOKIE_NAME: &str = "portiere.session_token";

const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_MAGIC_LINK_TTL_SECONDS: i64 = 5 * 60;
const MIN_PASSWORD_LENGTH: usize = 8;

/// One issued magic link, captured by the append-only issuance log.
#[derive(Clone, Debug)]
pub struct MagicLinkRecord {
    pub email: String,
    pub token: String,
    pub url: String,
}

#[derive(Clone, Debug)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    email_verified: bool,
    role: Role,
    created_at_unix: i64,
    password_digest: Option<Vec<u8>>,
}

impl UserRecord {
    fn identity(&self) -> Identity {
        Identity {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
            role: self.role,
            created_at_unix: self.created_at_unix,
        }
    }
}

#[derive(Clone, Debug)]
struct StoredSession {
    id: Uuid,
    user_id: Uuid,
    expires_at_unix: i64,
}

#[derive(Clone, Debug)]
struct PendingMagicLink {
    email: String,
    callback_url: String,
    expires_at_unix: i64,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, UserRecord>,
    emails: HashMap<String, Uuid>,
    sessions: HashMap<Vec<u8>, StoredSession>,
    pending_links: HashMap<Vec<u8>, PendingMagicLink>,
    issued_links: Vec<MagicLinkRecord>,
}

pub struct MemoryAuthProvider {
    base_url: String,
    session_ttl_seconds: i64,
    magic_link_ttl_seconds: i64,
    state: Mutex<MemoryState>,
}

impl MemoryAuthProvider {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            magic_link_ttl_seconds: DEFAULT_MAGIC_LINK_TTL_SECONDS,
            state: Mutex::new(MemoryState::default()),
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_magic_link_ttl_seconds(mut self, seconds: i64) -> Self {
        self.magic_link_ttl_seconds = seconds;
        self
    }

    /// Create a user directly, bypassing the sign-up flow.
    ///
    /// Models accounts that already exist on the provider side (operators,
    /// fixtures). Not reachable from any route.
    ///
    /// # Errors
    /// Returns an error if the email is already registered.
    pub async fn seed_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity> {
        let email = normalize_email(email);
        let mut state = self.state.lock().await;
        if state.emails.contains_key(&email) {
            bail!("email already registered: {email}");
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.clone(),
            email_verified: true,
            role,
            created_at_unix: unix_now(),
            password_digest: Some(hash_token(password)),
        };
        let identity = record.identity();
        state.emails.insert(email, record.id);
        state.users.insert(record.id, record);
        Ok(identity)
    }

    /// Seed an admin account with a random password, returning the password.
    ///
    /// # Errors
    /// Returns an error if the email is already registered.
    pub async fn seed_admin(&self, name: &str, email: &str) -> Result<String> {
        let password = generate_token()?;
        self.seed_user(name, email, &password, Role::Admin).await?;
        Ok(password)
    }

    /// Every magic link issued so far, oldest first.
    pub async fn issued_links(&self) -> Vec<MagicLinkRecord> {
        self.state.lock().await.issued_links.clone()
    }

    fn create_session(&self, state: &mut MemoryState, user_id: Uuid) -> Result<String> {
        let token = generate_token()?;
        let session = StoredSession {
            id: Uuid::new_v4(),
            user_id,
            expires_at_unix: unix_now() + self.session_ttl_seconds,
        };
        state.sessions.insert(hash_token(&token), session);
        Ok(token)
    }

    fn session_reply(&self, token: &str, location: &str) -> Result<ProviderReply> {
        let cookie = session_cookie(token, self.session_ttl_seconds)
            .context("failed to build session cookie")?;
        let location = HeaderValue::from_str(location).context("invalid callback URL")?;
        Ok(ProviderReply::new(StatusCode::OK)
            .with_header(SET_COOKIE, cookie)
            .with_header(LOCATION, location))
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn session(&self, headers: &HeaderMap) -> Result<Option<SessionSnapshot>> {
        let Some(token) = extract_session_token(headers) else {
            return Ok(None);
        };
        let token_hash = hash_token(&token);
        let mut state = self.state.lock().await;
        let Some(session) = state.sessions.get(&token_hash).cloned() else {
            return Ok(None);
        };
        if session.expires_at_unix <= unix_now() {
            state.sessions.remove(&token_hash);
            return Ok(None);
        }
        let Some(user) = state.users.get(&session.user_id) else {
            // Session outliving its user is treated as no session.
            state.sessions.remove(&token_hash);
            return Ok(None);
        };
        Ok(Some(SessionSnapshot {
            user: user.identity(),
            session: SessionRef {
                id: session.id.to_string(),
                expires_at_unix: session.expires_at_unix,
            },
        }))
    }

    async fn sign_up_email(&self, request: SignUpRequest) -> Result<CredentialOutcome> {
        if request.name.trim().is_empty() {
            return Ok(CredentialOutcome::Rejected {
                message: "Name is required".to_string(),
            });
        }
        let email = normalize_email(&request.email);
        if !valid_email(&email) {
            return Ok(CredentialOutcome::Rejected {
                message: "Invalid email address".to_string(),
            });
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Ok(CredentialOutcome::Rejected {
                message: "Password must be at least 8 characters".to_string(),
            });
        }

        let mut state = self.state.lock().await;
        if state.emails.contains_key(&email) {
            return Ok(CredentialOutcome::Rejected {
                message: "User already exists".to_string(),
            });
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: email.clone(),
            email_verified: false,
            role: Role::User,
            created_at_unix: unix_now(),
            password_digest: Some(hash_token(&request.password)),
        };
        let user_id = record.id;
        state.emails.insert(email, user_id);
        state.users.insert(user_id, record);

        let token = self.create_session(&mut state, user_id)?;
        let reply = self.session_reply(&token, &request.callback_url)?;
        Ok(CredentialOutcome::Accepted(reply))
    }

    async fn sign_in_email(&self, request: SignInRequest) -> Result<CredentialOutcome> {
        let email = normalize_email(&request.email);
        let mut state = self.state.lock().await;

        // One message for unknown email and wrong password.
        let rejected = || CredentialOutcome::Rejected {
            message: "Invalid email or password".to_string(),
        };

        let Some(&user_id) = state.emails.get(&email) else {
            return Ok(rejected());
        };
        let Some(user) = state.users.get(&user_id) else {
            return Ok(rejected());
        };
        let Some(digest) = user.password_digest.clone() else {
            return Ok(rejected());
        };
        if digest != hash_token(&request.password) {
            return Ok(rejected());
        }

        let token = self.create_session(&mut state, user_id)?;
        let reply = self.session_reply(&token, &request.callback_url)?;
        Ok(CredentialOutcome::Accepted(reply))
    }

    async fn sign_out(&self, headers: &HeaderMap) -> Result<ProviderReply> {
        if let Some(token) = extract_session_token(headers) {
            let mut state = self.state.lock().await;
            state.sessions.remove(&hash_token(&token));
        }
        // Always clear the cookie, even if no session record existed.
        let cookie = clear_session_cookie().context("failed to build clearing cookie")?;
        Ok(ProviderReply::new(StatusCode::OK).with_header(SET_COOKIE, cookie))
    }

    async fn request_magic_link(&self, request: MagicLinkRequest) -> Result<()> {
        let email = normalize_email(&request.email);
        let token = generate_token()?;
        let url = format!("{}/login/magic-link/verify?token={token}", self.base_url);

        let mut state = self.state.lock().await;
        // The error callback stays with the issuing request; links verified
        // through this provider report failures via the core verify route.
        state.pending_links.insert(
            hash_token(&token),
            PendingMagicLink {
                email: email.clone(),
                callback_url: request.callback_url,
                expires_at_unix: unix_now() + self.magic_link_ttl_seconds,
            },
        );
        state.issued_links.push(MagicLinkRecord {
            email: email.clone(),
            token,
            url: url.clone(),
        });

        // Out-of-band delivery is a log line in this deployment.
        info!(email = %email, url = %url, "magic link issued");
        Ok(())
    }

    async fn verify_magic_link(&self, token: &str) -> Result<MagicLinkOutcome> {
        let token_hash = hash_token(token);
        let mut state = self.state.lock().await;

        // Removal enforces single use: a replayed token finds nothing.
        let Some(pending) = state.pending_links.remove(&token_hash) else {
            return Ok(MagicLinkOutcome::Rejected);
        };
        if pending.expires_at_unix <= unix_now() {
            return Ok(MagicLinkOutcome::Rejected);
        }

        let user_id = if let Some(&existing) = state.emails.get(&pending.email) {
            if let Some(user) = state.users.get_mut(&existing) {
                user.email_verified = true;
            }
            existing
        } else {
            // First sign-in via magic link creates the account.
            let name = pending
                .email
                .split('@')
                .next()
                .unwrap_or(pending.email.as_str())
                .to_string();
            let record = UserRecord {
                id: Uuid::new_v4(),
                name,
                email: pending.email.clone(),
                email_verified: true,
                role: Role::User,
                created_at_unix: unix_now(),
                password_digest: None,
            };
            let id = record.id;
            state.emails.insert(pending.email.clone(), id);
            state.users.insert(id, record);
            id
        };

        let session_token = self.create_session(&mut state, user_id)?;
        let reply = self.session_reply(&session_token, &pending.callback_url)?;
        Ok(MagicLinkOutcome::Established(reply))
    }

    async fn list_users(&self, headers: &HeaderMap) -> Result<Vec<Identity>> {
        let acting = self
            .session(headers)
            .await?
            .context("no active session")?;
        if acting.user.role != Role::Admin {
            bail!("listing users requires the admin role");
        }

        let state = self.state.lock().await;
        let mut users: Vec<Identity> = state.users.values().map(UserRecord::identity).collect();
        users.sort_by(|a, b| {
            a.created_at_unix
                .cmp(&b.created_at_unix)
                .then_with(|| a.email.cmp(&b.email))
        });
        Ok(users)
    }

    async fn set_role(&self, headers: &HeaderMap, user_id: &str, role: Role) -> Result<()> {
        let acting = self
            .session(headers)
            .await?
            .context("no active session")?;
        if acting.user.role != Role::Admin {
            bail!("changing roles requires the admin role");
        }

        let target = Uuid::parse_str(user_id).context("unknown user")?;
        let mut state = self.state.lock().await;
        let user = state.users.get_mut(&target).context("unknown user")?;
        user.role = role;
        Ok(())
    }

    async fn forward(&self, request: ForwardedRequest) -> Result<ProviderReply> {
        // The in-memory provider has no wire protocol surface.
        debug!(
            method = %request.method,
            path = %request.path_and_query,
            "in-memory provider has no passthrough API"
        );
        Ok(ProviderReply::new(StatusCode::NOT_FOUND))
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(0))
}

/// Normalize an email for lookup/uniqueness checks.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Create a new random token for sessions and magic links.
/// The raw value is only handed to the client; lookups use a digest.
fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a token so raw values are never kept around.
fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Build the `HttpOnly` session cookie.
fn session_cookie(
    token: &str,
    ttl_seconds: i64,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    ))
}

fn clear_session_cookie() -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}
