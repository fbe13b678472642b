//! Routes and the roles allowed to view them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend role names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ROLE_ADMIN",
            Self::Manager => "ROLE_MANAGER",
            Self::Employee => "ROLE_EMPLOYEE",
        }
    }

    pub fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "ROLE_ADMIN" => Some(Self::Admin),
            "ROLE_MANAGER" => Some(Self::Manager),
            "ROLE_EMPLOYEE" => Some(Self::Employee),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Manager => "Manager",
            Self::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Login,
    ChangePassword,
    /// Landing route, resolved per role
    Root,
    Dashboard,
    Vendors,
    Materials,
    Users,
    MyOrders,
    Approvals,
    PurchaseOrderDetail,
}

/// Who may see a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not
    Public,
    /// Any signed-in user
    Authenticated,
    /// Signed-in users holding at least one of these roles
    Roles(&'static [Role]),
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::ChangePassword => "/change-password",
            Self::Root => "/",
            Self::Dashboard => "/dashboard",
            Self::Vendors => "/vendors",
            Self::Materials => "/materials",
            Self::Users => "/users",
            Self::MyOrders => "/my-orders",
            Self::Approvals => "/approvals",
            Self::PurchaseOrderDetail => "/purchase-orders/:id",
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Self::Login => Access::Public,
            Self::ChangePassword | Self::Root | Self::PurchaseOrderDetail => Access::Authenticated,
            Self::Dashboard => Access::Roles(&[Role::Admin, Role::Manager]),
            Self::Vendors | Self::Materials | Self::Users => Access::Roles(&[Role::Admin]),
            Self::MyOrders => Access::Roles(&[Role::Employee]),
            Self::Approvals => Access::Roles(&[Role::Manager]),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_claim_round_trip() {
        for role in [Role::Admin, Role::Manager, Role::Employee] {
            assert_eq!(Role::from_claim(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_claim("ROLE_GUEST"), None);
    }

    #[test]
    fn test_admin_only_routes() {
        for route in [Route::Vendors, Route::Materials, Route::Users] {
            assert_eq!(route.access(), Access::Roles(&[Role::Admin]));
        }
    }
}
