//! Role-based authorization over the resolved session context.

use crate::app::session::SessionContext;
use crate::provider::Role;

/// Outcome of a role check.
///
/// Anonymous and under-privileged callers are distinct: the former should be
/// sent to login, the latter gets a forbidden outcome. Neither may see
/// privileged content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Granted,
    Anonymous,
    Forbidden,
}

/// Check the current request's resolved context against a required role.
///
/// Always reads the context attached by the session resolver for this
/// request, never a cached or client-supplied role.
#[must_use]
pub fn authorize(context: &SessionContext, required: Role) -> GateDecision {
    match context.user() {
        None => GateDecision::Anonymous,
        Some(user) if user.role == required => GateDecision::Granted,
        Some(_) => GateDecision::Forbidden,
    }
}
