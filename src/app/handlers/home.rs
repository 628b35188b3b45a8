//! Home page with login status.

use super::PageQuery;
use crate::app::{render, session::SessionContext};
use axum::{extract::Query, response::Html};

pub async fn home(context: SessionContext, Query(query): Query<PageQuery>) -> Html<String> {
    let status = context.user().map_or_else(
        || {
            r#"    <div class="status logged-out">Not signed in.</div>
    <a href="/login">Sign In</a> | <a href="/signup">Sign Up</a>"#
                .to_string()
        },
        |user| {
            format!(
                r#"    <div class="status logged-in">Signed in as <strong>{name}</strong> ({email})</div>
    <a href="/profile">View Profile</a>
    <form method="post" action="/logout" style="display: inline;">
      <button type="submit">Logout</button>
    </form>"#,
                name = render::escape(&user.name),
                email = render::escape(&user.email),
            )
        },
    );

    let body = format!(
        "    <h1>Authentication Demo</h1>\n{banner}{status}\n",
        banner = render::message_banner(query.error.as_deref(), query.success.as_deref()),
    );
    render::layout("Auth Demo", &body)
}
