use crate::{app::redirect::RedirectPolicy, provider::AuthProvider};
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{any, get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

pub mod cookies;
pub mod handlers;
pub mod redirect;
pub(crate) mod render;
pub mod role;
pub mod session;

/// Build the application router.
///
/// The session resolver runs before every route; the provider and redirect
/// policy ride along as extensions.
#[must_use]
pub fn router(provider: Arc<dyn AuthProvider>, policy: Arc<RedirectPolicy>) -> Router {
    Router::new()
        .route("/", get(handlers::home::home))
        .route(
            "/login",
            get(handlers::pages::login).post(handlers::signin::signin),
        )
        .route(
            "/signup",
            get(handlers::pages::signup).post(handlers::signup::signup),
        )
        .route(
            "/login/magic-link",
            get(handlers::pages::magic_link).post(handlers::magic_link::request),
        )
        .route(
            "/login/magic-link/verify",
            get(handlers::magic_link::verify),
        )
        .route("/login/passkey", get(handlers::pages::passkey))
        .route(
            "/logout",
            get(handlers::logout::logout).post(handlers::logout::logout),
        )
        .route("/profile", get(handlers::profile::profile))
        .route("/whoami", get(handlers::whoami::whoami))
        .route("/admin", get(handlers::admin::admin))
        .route("/admin/user/role", post(handlers::admin::set_role))
        .route("/health", get(handlers::health::health))
        .route("/api/auth/*path", any(handlers::proxy::forward))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(provider))
                .layer(Extension(policy))
                .layer(middleware::from_fn(session::resolve)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    provider: Arc<dyn AuthProvider>,
    policy: Arc<RedirectPolicy>,
) -> Result<()> {
    let app = router(provider, policy);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
