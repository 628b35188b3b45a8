//! End-to-end tests for the authentication gateway.
//!
//! The full router runs in process against the in-memory provider; requests
//! go through `tower::ServiceExt::oneshot`, so the session resolver, cookie
//! relay, redirect policy, and role gate are all exercised exactly as they
//! are in production wiring.

use axum::{
    Router,
    body::Body,
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use http_body_util::BodyExt;
use portiere::{
    app::{self, redirect::RedirectPolicy},
    provider::{AuthProvider, Role, memory::MemoryAuthProvider},
};
use std::sync::Arc;
use tower::ServiceExt;
use url::form_urlencoded;

const ALLOWED_REDIRECT: &str = "http://localhost:3000/demo";

fn test_app() -> (Router, Arc<MemoryAuthProvider>) {
    let provider = Arc::new(MemoryAuthProvider::new("http://localhost:3000"));
    let policy = Arc::new(RedirectPolicy::new(vec![ALLOWED_REDIRECT.to_string()]));
    let dyn_provider: Arc<dyn AuthProvider> = provider.clone();
    (app::router(dyn_provider, policy), provider)
}

fn form_body(fields: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

async fn post_form(app: &Router, path: &str, fields: &[(&str, &str)]) -> Response {
    post_form_with_cookie(app, path, fields, None).await
}

async fn post_form_with_cookie(
    app: &Router,
    path: &str,
    fields: &[(&str, &str)],
    cookie: Option<&str>,
) -> Response {
    let mut request = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(form_body(fields))).expect("request"))
        .await
        .expect("response")
}

async fn get(app: &Router, path: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
}

fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("portiere.session_token="))
        .and_then(|value| value.split(';').next())
        .expect("session cookie")
        .to_string()
}

async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn sign_in_cookie(app: &Router, email: &str, password: &str) -> String {
    let response = post_form(app, "/login", &[("email", email), ("password", password)]).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    session_cookie(&response)
}

#[tokio::test]
async fn signup_without_redirect_lands_on_default_success_path() {
    let (app, _provider) = test_app();

    let response = post_form(
        &app,
        "/signup",
        &[
            ("name", "A"),
            ("email", "a@x.com"),
            ("password", "secret123"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/profile"));
    assert!(location(&response).contains("success="));
    assert!(
        response.headers().get(SET_COOKIE).is_some(),
        "sign-up should set at least one cookie"
    );

    // The fresh session resolves on the next request.
    let cookie = session_cookie(&response);
    let profile = get(&app, "/profile", Some(&cookie)).await;
    assert_eq!(profile.status(), StatusCode::OK);
    let page = body_string(profile).await;
    assert!(page.contains("a@x.com"));
}

#[tokio::test]
async fn profile_without_session_redirects_to_login() {
    let (app, _provider) = test_app();

    let response = get(&app, "/profile", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/login"));
}

#[tokio::test]
async fn garbage_session_cookie_degrades_to_anonymous() {
    let (app, _provider) = test_app();

    let cookie = "portiere.session_token=%%%not-a-token%%%";
    let home = get(&app, "/", Some(cookie)).await;
    assert_eq!(home.status(), StatusCode::OK);
    let page = body_string(home).await;
    assert!(page.contains("Not signed in"));

    let profile = get(&app, "/profile", Some(cookie)).await;
    assert_eq!(profile.status(), StatusCode::FOUND);
    assert!(location(&profile).starts_with("/login"));
}

#[tokio::test]
async fn magic_link_request_for_unknown_email_reports_success() {
    let (app, _provider) = test_app();

    let response = post_form(&app, "/login/magic-link", &[("email", "ghost@x.com")]).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).contains("success="));
    assert!(!location(&response).contains("error="));
}

#[tokio::test]
async fn magic_link_responses_are_identical_for_known_and_unknown_emails() {
    let (app, provider) = test_app();
    provider
        .seed_user("Known", "known@x.com", "secret123", Role::User)
        .await
        .expect("seed");

    let known = post_form(&app, "/login/magic-link", &[("email", "known@x.com")]).await;
    let unknown = post_form(&app, "/login/magic-link", &[("email", "missing@x.com")]).await;

    assert_eq!(known.status(), unknown.status());
    assert_eq!(location(&known), location(&unknown));
    assert_eq!(
        known.headers().get(SET_COOKIE).is_some(),
        unknown.headers().get(SET_COOKIE).is_some()
    );
}

#[tokio::test]
async fn login_with_unlisted_redirect_falls_back_to_profile() {
    let (app, provider) = test_app();
    provider
        .seed_user("A", "a@x.com", "secret123", Role::User)
        .await
        .expect("seed");

    let response = post_form(
        &app,
        "/login",
        &[
            ("email", "a@x.com"),
            ("password", "secret123"),
            ("redirect_url", "http://evil.example/steal"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile");
    assert!(response.headers().get(SET_COOKIE).is_some());
}

#[tokio::test]
async fn login_with_allowlisted_redirect_is_honored() {
    let (app, provider) = test_app();
    provider
        .seed_user("A", "a@x.com", "secret123", Role::User)
        .await
        .expect("seed");

    let response = post_form(
        &app,
        "/login",
        &[
            ("email", "a@x.com"),
            ("password", "secret123"),
            ("redirect_url", ALLOWED_REDIRECT),
        ],
    )
    .await;

    assert_eq!(location(&response), ALLOWED_REDIRECT);
}

#[tokio::test]
async fn failed_login_redirects_without_cookies() {
    let (app, provider) = test_app();
    provider
        .seed_user("A", "a@x.com", "secret123", Role::User)
        .await
        .expect("seed");

    let response = post_form(
        &app,
        "/login",
        &[("email", "a@x.com"), ("password", "wrong-password")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?error=Invalid+email+or+password");
    assert!(
        response.headers().get(SET_COOKIE).is_none(),
        "no cookie relay on rejected sign-in"
    );
}

#[tokio::test]
async fn logout_clears_session_and_ignores_unlisted_redirect() {
    let (app, provider) = test_app();
    provider
        .seed_user("A", "a@x.com", "secret123", Role::User)
        .await
        .expect("seed");
    let cookie = sign_in_cookie(&app, "a@x.com", "secret123").await;

    let response = post_form_with_cookie(
        &app,
        "/logout?redirect_url=http://evil.example/steal",
        &[],
        Some(&cookie),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/?message=Bye!");
    let clearing = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("clearing cookie");
    assert!(clearing.contains("Max-Age=0"));

    // The old cookie no longer resolves.
    let profile = get(&app, "/profile", Some(&cookie)).await;
    assert_eq!(profile.status(), StatusCode::FOUND);
    assert!(location(&profile).starts_with("/login"));
}

#[tokio::test]
async fn magic_link_flow_establishes_session_once() {
    let (app, provider) = test_app();

    let response = post_form(
        &app,
        "/login/magic-link",
        &[
            ("email", "magic@x.com"),
            ("redirect_url", "http://evil.example/steal"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let links = provider.issued_links().await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].email, "magic@x.com");
    let verify_path = format!("/login/magic-link/verify?token={}", links[0].token);

    // First visit materializes a session; the unlisted redirect fell back.
    let verified = get(&app, &verify_path, None).await;
    assert_eq!(verified.status(), StatusCode::FOUND);
    assert_eq!(location(&verified), "/profile");
    let cookie = session_cookie(&verified);

    let profile = get(&app, "/profile", Some(&cookie)).await;
    assert_eq!(profile.status(), StatusCode::OK);
    assert!(body_string(profile).await.contains("magic@x.com"));

    // Replay fails with the generic message and no cookie.
    let replay = get(&app, &verify_path, None).await;
    assert_eq!(replay.status(), StatusCode::FOUND);
    assert_eq!(location(&replay), "/login?error=Invalid+or+expired+magic+link");
    assert!(replay.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn magic_link_verify_without_token_skips_the_provider() {
    let (app, provider) = test_app();

    let response = get(&app, "/login/magic-link/verify", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?error=Invalid+magic+link");
    assert!(provider.issued_links().await.is_empty());
}

#[tokio::test]
async fn admin_page_is_role_gated() {
    let (app, provider) = test_app();
    provider
        .seed_user("Plain", "plain@x.com", "secret123", Role::User)
        .await
        .expect("seed");
    provider
        .seed_user("Op", "op@x.com", "op-password", Role::Admin)
        .await
        .expect("seed");

    // Anonymous: to login.
    let response = get(&app, "/admin", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/login"));

    // Authenticated but unprivileged: forbidden, not anonymous.
    let user_cookie = sign_in_cookie(&app, "plain@x.com", "secret123").await;
    let response = get(&app, "/admin", Some(&user_cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin: the listing renders.
    let admin_cookie = sign_in_cookie(&app, "op@x.com", "op-password").await;
    let response = get(&app, "/admin", Some(&admin_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("plain@x.com"));
    assert!(page.contains("op@x.com"));
}

#[tokio::test]
async fn role_mutation_goes_through_the_authenticated_path() {
    let (app, provider) = test_app();
    let target = provider
        .seed_user("Plain", "plain@x.com", "secret123", Role::User)
        .await
        .expect("seed");
    provider
        .seed_user("Op", "op@x.com", "op-password", Role::Admin)
        .await
        .expect("seed");

    // An unprivileged actor gets the same wording as any other failure.
    let user_cookie = sign_in_cookie(&app, "plain@x.com", "secret123").await;
    let response = post_form_with_cookie(
        &app,
        "/admin/user/role",
        &[("userId", target.id.as_str()), ("role", "admin")],
        Some(&user_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).ends_with("error=Failed+to+update+user+role"));

    // An unknown target fails with identical wording for the admin.
    let admin_cookie = sign_in_cookie(&app, "op@x.com", "op-password").await;
    let response = post_form_with_cookie(
        &app,
        "/admin/user/role",
        &[
            ("userId", "00000000-0000-0000-0000-000000000000"),
            ("role", "admin"),
        ],
        Some(&admin_cookie),
    )
    .await;
    assert!(location(&response).ends_with("error=Failed+to+update+user+role"));

    // The authenticated admin path succeeds.
    let response = post_form_with_cookie(
        &app,
        "/admin/user/role",
        &[("userId", target.id.as_str()), ("role", "admin")],
        Some(&admin_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "/admin?success=User+role+updated+to+admin"
    );

    // The change shows up on the target's next session check.
    let target_cookie = sign_in_cookie(&app, "plain@x.com", "secret123").await;
    let response = get(&app, "/whoami", Some(&target_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("whoami payload");
    assert_eq!(payload["role"], "admin");
}

#[tokio::test]
async fn whoami_reports_guest_and_user() {
    let (app, provider) = test_app();

    let response = get(&app, "/whoami", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("whoami payload");
    assert_eq!(payload["role"], "guest");

    provider
        .seed_user("A", "a@x.com", "secret123", Role::User)
        .await
        .expect("seed");
    let cookie = sign_in_cookie(&app, "a@x.com", "secret123").await;
    let response = get(&app, "/whoami", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("whoami payload");
    assert_eq!(payload["role"], "user");
    assert_eq!(payload["data"]["name"], "A");
}

#[tokio::test]
async fn login_page_embeds_only_allowlisted_redirects() {
    let (app, _provider) = test_app();

    let response = get(
        &app,
        "/login?redirect_url=http%3A%2F%2Fevil.example%2Fsteal",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(!page.contains("evil.example"));

    let response = get(
        &app,
        "/login?redirect_url=http%3A%2F%2Flocalhost%3A3000%2Fdemo",
        None,
    )
    .await;
    let page = body_string(response).await;
    assert!(page.contains("http://localhost:3000/demo"));
}

#[tokio::test]
async fn health_reports_ok_with_app_header() {
    let (app, _provider) = test_app();

    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("X-App").is_some());
    let payload: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("health payload");
    assert_eq!(payload["provider"], "ok");
    assert_eq!(payload["name"], "portiere");
}

#[tokio::test]
async fn provider_passthrough_is_wired() {
    let (app, _provider) = test_app();

    // The in-memory provider exposes no wire API, so the passthrough
    // surfaces its 404 unchanged.
    let response = get(&app, "/api/auth/get-session", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
