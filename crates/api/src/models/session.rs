//! Identity carried by a verified session token.

use serde::{Deserialize, Serialize};

use paradise_core::{Role, UserId};

/// The authenticated caller, decoded from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Role at the time the token was issued.
    pub role: Role,
}

impl CurrentUser {
    /// Whether the caller may act on resources owned by `user_id`.
    #[must_use]
    pub fn can_access(&self, user_id: UserId) -> bool {
        self.id == user_id || self.role.is_admin()
    }
}

/// Session keys for server-side session data.
pub mod keys {
    /// Key for the shopping cart.
    pub const CART: &str = "cart";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_can_access_own_resources_only() {
        let user = CurrentUser {
            id: UserId::new(1),
            role: Role::User,
        };
        assert!(user.can_access(UserId::new(1)));
        assert!(!user.can_access(UserId::new(2)));
    }

    #[test]
    fn test_admin_can_access_any_user() {
        let admin = CurrentUser {
            id: UserId::new(1),
            role: Role::Admin,
        };
        assert!(admin.can_access(UserId::new(2)));
    }
}
