//! Form pages for the sign-in flows.
//!
//! Every page re-validates the inbound `redirect_url` with an empty fallback
//! before embedding it in hidden fields and links: only allowlisted
//! destinations survive the multi-step browser exchange.

use super::{PageQuery, link_with_redirect};
use crate::app::{redirect::RedirectPolicy, render};
use axum::{
    extract::{Extension, Query},
    response::Html,
};
use std::sync::Arc;

pub async fn login(
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let redirect_url = policy.validate(query.redirect_url.as_deref(), "");
    let body = format!(
        r#"    <h1>Sign In</h1>
    <a href="/">&larr; Back to Home</a> | <a href="{signup_link}">Don't have an account? Sign Up</a>
{banner}    <div class="form-section">
      <h2>Using email and password</h2>
      <form method="post" action="/login">
        <input type="hidden" name="redirect_url" value="{redirect_url}" />
        <fieldset role="group">
          <input type="email" name="email" placeholder="Email" required />
          <input type="password" name="password" placeholder="Password" required />
          <input type="submit" value="Sign In" />
        </fieldset>
      </form>
      <h2>Using magic link</h2>
      <form method="get" action="/login/magic-link">
        <input type="hidden" name="redirect_url" value="{redirect_url}" />
        <button type="submit">Send Magic Link</button>
      </form>
      <h2>Using a passkey</h2>
      <a href="{passkey_link}">Sign in with a passkey</a>
      <h2>Using GitHub</h2>
      <form method="post" action="/api/auth/sign-in/social">
        <input type="hidden" name="provider" value="github" />
        <input type="hidden" name="callbackURL" value="{redirect_url}" />
        <button type="submit">Sign In with GitHub</button>
      </form>
    </div>
"#,
        signup_link = link_with_redirect("/signup", &redirect_url),
        passkey_link = link_with_redirect("/login/passkey", &redirect_url),
        banner = render::message_banner(query.error.as_deref(), query.success.as_deref()),
        redirect_url = render::escape(&redirect_url),
    );
    render::layout("Sign In", &body)
}

pub async fn signup(
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let redirect_url = policy.validate(query.redirect_url.as_deref(), "");
    let body = format!(
        r#"    <h1>Sign Up</h1>
    <a href="/">&larr; Back to Home</a> | <a href="{login_link}">Already have an account? Sign In</a>
{banner}    <div class="form-section">
      <h2>Using email and password</h2>
      <form method="post" action="/signup">
        <input type="hidden" name="redirect_url" value="{redirect_url}" />
        <fieldset>
          <input type="text" name="name" placeholder="Full Name" required />
        </fieldset>
        <fieldset role="group">
          <input type="email" name="email" placeholder="Email" required />
          <input type="password" name="password" placeholder="Password" required />
          <input type="submit" value="Create Account" />
        </fieldset>
      </form>
    </div>
"#,
        login_link = link_with_redirect("/login", &redirect_url),
        banner = render::message_banner(query.error.as_deref(), query.success.as_deref()),
        redirect_url = render::escape(&redirect_url),
    );
    render::layout("Sign Up", &body)
}

pub async fn magic_link(
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let redirect_url = policy.validate(query.redirect_url.as_deref(), "");
    let body = format!(
        r#"    <h1>Magic Link Login</h1>
    <a href="{login_link}">&larr; Back to Login</a>
{banner}    <div class="form-section">
      <form method="post" action="/login/magic-link">
        <input type="hidden" name="redirect_url" value="{redirect_url}" />
        <fieldset>
          <input type="email" name="email" placeholder="Email" required />
          <input type="submit" value="Send Magic Link" />
        </fieldset>
      </form>
    </div>
"#,
        login_link = link_with_redirect("/login", &redirect_url),
        banner = render::message_banner(query.error.as_deref(), query.success.as_deref()),
        redirect_url = render::escape(&redirect_url),
    );
    render::layout("Magic Link Login", &body)
}

/// Passkey page: the ceremony itself runs client-side against the
/// provider's `/api/auth` surface; the server only keeps the validated
/// `redirect_url` attached to the exchange.
pub async fn passkey(
    Extension(policy): Extension<Arc<RedirectPolicy>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let redirect_url = policy.validate(query.redirect_url.as_deref(), "");
    let body = format!(
        r#"    <h1>Passkey Login</h1>
    <a href="{login_link}">&larr; Back to Login</a>
{banner}    <div class="form-section">
      <form id="passkey-form" data-redirect-url="{redirect_url}">
        <fieldset>
          <input type="email" id="passkey-email" placeholder="Email" required />
          <button type="submit">Sign In with Passkey</button>
        </fieldset>
      </form>
    </div>
    <script type="module">
      const form = document.getElementById('passkey-form');
      form.addEventListener('submit', async (event) => {{
        event.preventDefault();
        const redirectUrl = form.dataset.redirectUrl || '/profile';
        try {{
          const {{ createAuthClient }} = await import('/api/auth/client.js');
          const authClient = createAuthClient();
          await authClient.signIn.passkey({{ email: document.getElementById('passkey-email').value }});
          window.location.href = redirectUrl;
        }} catch (error) {{
          window.location.href = '/login/passkey?error=' + encodeURIComponent('Passkey sign in failed');
        }}
      }});
    </script>
"#,
        login_link = link_with_redirect("/login", &redirect_url),
        banner = render::message_banner(query.error.as_deref(), query.success.as_deref()),
        redirect_url = render::escape(&redirect_url),
    );
    render::layout("Passkey Login", &body)
}
