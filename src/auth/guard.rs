//! Route protection

use crate::auth::models::UserRole;
use crate::auth::session::SessionManager;

pub const LOGIN_PATH: &str = "/login";

/// Outcome of checking a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// No valid session; `from` is where to return after login
    RedirectToLogin { from: String },
    /// Signed in, but the role is not permitted here
    Forbidden,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }

    /// Login URL carrying the original path
    pub fn login_location(&self) -> Option<String> {
        match self {
            Access::RedirectToLogin { from } => Some(login_location(from)),
            _ => None,
        }
    }
}

/// `/login?from=<from>` with `from` percent-encoded so its own query survives
pub fn login_location(from: &str) -> String {
    format!("{}?from={}", LOGIN_PATH, urlencoding::encode(from))
}

/// Decide whether the current session may open `path`
pub async fn guard(session: &SessionManager, path: &str, required: &[UserRole]) -> Access {
    if !session.is_authenticated().await {
        return Access::RedirectToLogin {
            from: path.to_string(),
        };
    }

    if session.can_access(required).await {
        Access::Allow
    } else {
        tracing::debug!("Access to {} denied for current role", path);
        Access::Forbidden
    }
}
