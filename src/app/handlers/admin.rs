//! Admin page and role mutation, gated on the admin role.

use super::{PageQuery, found, with_query_message};
use crate::{
    app::{
        render,
        role::{self, GateDecision},
        session::SessionContext,
    },
    provider::{AuthProvider, Identity, Role},
};
use axum::{
    extract::{Extension, Form, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

// One wording for every failure: the response never distinguishes an
// unauthorized actor from an unknown target user.
const ROLE_UPDATE_FAILED: &str = "Failed to update user role";

pub async fn admin(
    context: SessionContext,
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    match role::authorize(&context, Role::Admin) {
        GateDecision::Anonymous => {
            return found(&with_query_message("/login", "error", "no session"));
        }
        GateDecision::Forbidden => return forbidden(),
        GateDecision::Granted => {}
    }

    let (listing, listing_error) = match provider.list_users(&headers).await {
        Ok(users) => (users, None),
        Err(err) => {
            error!("Failed to list users: {err}");
            (Vec::new(), Some("Failed to load users"))
        }
    };

    let banner = render::message_banner(
        query.error.as_deref().or(listing_error),
        query.success.as_deref(),
    );
    let body = format!(
        "    <h1>Admin</h1>\n    <a href=\"/\">Back to Home</a>\n{banner}{table}",
        table = users_table(&listing),
    );
    render::layout("Admin", &body).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: String,
}

pub async fn set_role(
    context: SessionContext,
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    headers: HeaderMap,
    Form(form): Form<RoleForm>,
) -> Response {
    // Gate on the role resolved for this request, not on anything the
    // client sent along with the form.
    match role::authorize(&context, Role::Admin) {
        GateDecision::Anonymous => {
            return found(&with_query_message("/login", "error", "no session"));
        }
        GateDecision::Forbidden => {
            return found(&with_query_message("/", "error", ROLE_UPDATE_FAILED));
        }
        GateDecision::Granted => {}
    }

    let Some(new_role) = Role::parse(&form.role) else {
        return found(&with_query_message("/admin", "error", ROLE_UPDATE_FAILED));
    };

    match provider.set_role(&headers, &form.user_id, new_role).await {
        Ok(()) => found(&with_query_message(
            "/admin",
            "success",
            &format!("User role updated to {new_role}"),
        )),
        Err(err) => {
            error!("Update role error: {err}");
            found(&with_query_message("/admin", "error", ROLE_UPDATE_FAILED))
        }
    }
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        render::layout(
            "Forbidden",
            "    <h1>Forbidden</h1>\n    <p>This page requires the admin role.</p>\n    <a href=\"/\">Back to Home</a>\n",
        ),
    )
        .into_response()
}

fn users_table(users: &[Identity]) -> String {
    let mut rows = String::new();
    for user in users {
        let next_role = match user.role {
            Role::Admin => Role::User,
            Role::User => Role::Admin,
        };
        rows.push_str(&format!(
            r#"        <tr>
          <td>{name}</td>
          <td>{email}</td>
          <td>{role}</td>
          <td>
            <form method="post" action="/admin/user/role">
              <input type="hidden" name="userId" value="{id}" />
              <input type="hidden" name="role" value="{next_role}" />
              <button type="submit">Make {next_role}</button>
            </form>
          </td>
        </tr>
"#,
            name = render::escape(&user.name),
            email = render::escape(&user.email),
            role = user.role,
            id = render::escape(&user.id),
        ));
    }

    format!(
        r#"    <table>
      <thead>
        <tr><th>Name</th><th>Email</th><th>Role</th><th></th></tr>
      </thead>
      <tbody>
{rows}      </tbody>
    </table>
    <p>{count} user(s)</p>
"#,
        count = users.len(),
    )
}
