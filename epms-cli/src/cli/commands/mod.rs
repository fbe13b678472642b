//! Command handlers

pub mod auth;
pub mod query;

use crate::api::auth::AuthSession;
use crate::navigation::{Navigation, Route, resolve, resolve_final};
use anyhow::{Result, bail};

/// Refuse to run a command whose screen the session may not see
pub fn ensure_access(session: &AuthSession, route: Route) -> Result<()> {
    match resolve_final(route, session) {
        Navigation::Render(_) => Ok(()),
        Navigation::Redirect(Route::Login) => {
            bail!("Not logged in. Run `epms-cli login <username>` first.")
        }
        Navigation::Redirect(Route::ChangePassword) => {
            bail!("A password change is required first. Run `epms-cli passwd`.")
        }
        Navigation::Redirect(landing) => bail!(
            "{} is not available to your roles; your home screen is {}",
            route,
            landing
        ),
    }
}

/// Require a usable session without any role restriction
pub fn ensure_signed_in(session: &AuthSession) -> Result<()> {
    match resolve(Route::Root, session) {
        Navigation::Redirect(Route::Login) | Navigation::Redirect(Route::ChangePassword) => {
            ensure_access(session, Route::Root)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::encode_unsigned_token;
    use serde_json::json;

    fn session(roles: &[&str], require_password_change: bool) -> AuthSession {
        let token = encode_unsigned_token(&json!({
            "sub": "tester",
            "roles": roles,
            "requirePasswordChange": require_password_change,
        }));
        AuthSession::from_token(&token).unwrap()
    }

    #[test]
    fn test_access_by_role() {
        let manager = session(&["ROLE_MANAGER"], false);
        assert!(ensure_access(&manager, Route::Approvals).is_ok());

        let err = ensure_access(&manager, Route::Vendors).unwrap_err();
        assert!(err.to_string().contains("/dashboard"));

        let employee = session(&["ROLE_EMPLOYEE"], false);
        assert!(ensure_access(&employee, Route::MyOrders).is_ok());
        let err = ensure_access(&employee, Route::Approvals).unwrap_err();
        assert!(err.to_string().contains("/my-orders"));
    }

    #[test]
    fn test_anonymous_and_pending_password_change() {
        let err = ensure_access(&AuthSession::anonymous(), Route::MyOrders).unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
        assert!(ensure_signed_in(&AuthSession::anonymous()).is_err());

        let pending = session(&["ROLE_ADMIN"], true);
        let err = ensure_access(&pending, Route::Vendors).unwrap_err();
        assert!(err.to_string().contains("password change"));
        assert!(ensure_signed_in(&pending).is_err());
    }

    #[test]
    fn test_signed_in_without_role_restriction() {
        assert!(ensure_signed_in(&session(&["ROLE_EMPLOYEE"], false)).is_ok());
        assert!(ensure_signed_in(&session(&["ROLE_ADMIN"], false)).is_ok());
    }

    #[test]
    fn test_pending_password_change_may_change_password() {
        let pending = session(&["ROLE_EMPLOYEE"], true);
        assert!(ensure_access(&pending, Route::ChangePassword).is_ok());
        let err = ensure_access(&pending, Route::MyOrders).unwrap_err();
        assert!(err.to_string().contains("epms-cli passwd"));

        assert!(ensure_access(&session(&["ROLE_MANAGER"], false), Route::ChangePassword).is_ok());
        assert!(ensure_access(&AuthSession::anonymous(), Route::ChangePassword).is_err());
    }
}
