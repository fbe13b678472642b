//! Route guards: authentication, forced password change and role checks

use super::routes::{Access, Role, Route};
use crate::api::auth::AuthSession;

/// Outcome of resolving a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    /// Route that ends up on screen
    pub fn target(&self) -> Route {
        match self {
            Self::Render(route) | Self::Redirect(route) => *route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Decide what happens when `session` navigates to `route`.
///
/// Guards apply in order: unauthenticated users go to the login screen, a
/// pending password change pins the user to the change-password screen, the
/// root route lands on the role's home screen, and a user without any
/// permitted role is sent to the root landing route.
pub fn resolve(route: Route, session: &AuthSession) -> Navigation {
    if route.access() == Access::Public {
        return Navigation::Render(route);
    }

    let Some(user) = session.user.as_ref().filter(|_| session.is_authenticated()) else {
        return Navigation::Redirect(Route::Login);
    };

    if user.require_password_change && route != Route::ChangePassword {
        return Navigation::Redirect(Route::ChangePassword);
    }

    if route == Route::Root {
        return Navigation::Redirect(landing_route(session));
    }

    match route.access() {
        Access::Roles(roles) if !roles.iter().any(|role| user.has_role(role.as_str())) => {
            Navigation::Redirect(Route::Root)
        }
        _ => Navigation::Render(route),
    }
}

/// Home screen for the session's roles
pub fn landing_route(session: &AuthSession) -> Route {
    let Some(ref user) = session.user else {
        return Route::Login;
    };
    if user.require_password_change {
        Route::ChangePassword
    } else if user.has_role(Role::Admin.as_str()) || user.has_role(Role::Manager.as_str()) {
        Route::Dashboard
    } else if user.has_role(Role::Employee.as_str()) {
        Route::MyOrders
    } else {
        Route::Login
    }
}

/// Like [`resolve`], but follows a redirect to the root route through to the
/// concrete landing screen
pub fn resolve_final(route: Route, session: &AuthSession) -> Navigation {
    match resolve(route, session) {
        Navigation::Redirect(Route::Root) => Navigation::Redirect(landing_route(session)),
        other => other,
    }
}
