//! Profile page, session required.

use super::{PageQuery, found, with_query_message};
use crate::app::{render, session::SessionContext};
use axum::{
    extract::Query,
    response::{IntoResponse, Response},
};

pub async fn profile(context: SessionContext, Query(query): Query<PageQuery>) -> Response {
    let Some(user) = context.user() else {
        return found(&with_query_message("/login", "error", "no session"));
    };

    let body = format!(
        r#"    <h1>Profile</h1>
{banner}    <dl>
      <dt>Name</dt><dd>{name}</dd>
      <dt>Email</dt><dd>{email}</dd>
      <dt>Email verified</dt><dd>{verified}</dd>
      <dt>Role</dt><dd>{role}</dd>
      <dt>User id</dt><dd>{id}</dd>
    </dl>
    <form method="post" action="/logout">
      <button type="submit">Logout</button>
    </form>
    <a href="/">Back to Home</a>
"#,
        banner = render::message_banner(query.error.as_deref(), query.success.as_deref()),
        name = render::escape(&user.name),
        email = render::escape(&user.email),
        verified = if user.email_verified { "yes" } else { "no" },
        role = user.role,
        id = render::escape(&user.id),
    );
    render::layout("Profile", &body).into_response()
}
