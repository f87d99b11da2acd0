//! Role navigation table.

use artisan_bazaar_core::Role;

/// One dashboard navigation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
}

const fn entry(label: &'static str, path: &'static str) -> NavEntry {
    NavEntry { label, path }
}

const BUYER: &[NavEntry] = &[
    entry("Dashboard", "/dashboard/buyer"),
    entry("Orders", "/dashboard/buyer/orders"),
    entry("Modification Requests", "/dashboard/buyer/requests"),
    entry("Cart", "/cart"),
    entry("Notifications", "/notifications"),
];

const SELLER: &[NavEntry] = &[
    entry("Dashboard", "/dashboard/seller"),
    entry("Products", "/dashboard/seller/products"),
    entry("Orders", "/dashboard/seller/orders"),
    entry("Modification Requests", "/dashboard/seller/requests"),
    entry("Notifications", "/notifications"),
];

const ADMIN: &[NavEntry] = &[
    entry("Dashboard", "/dashboard/admin"),
    entry("Users", "/dashboard/admin/users"),
    entry("Listings", "/dashboard/admin/products"),
    entry("Notifications", "/notifications"),
];

/// Navigation entries for `role`, in display order.
#[must_use]
pub const fn navigation(role: Role) -> &'static [NavEntry] {
    match role {
        Role::Buyer => BUYER,
        Role::Seller => SELLER,
        Role::Admin => ADMIN,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use artisan_bazaar_core::{Email, User, UserId};

    use super::*;
    use crate::guard::{GuardDecision, guard};
    use crate::session::SessionState;

    fn session(role: Role) -> SessionState {
        SessionState::resolved(Some(User {
            id: UserId::new(2).unwrap(),
            name: "Noor Haddad".to_string(),
            email: Email::parse("noor@bazaar.example").unwrap(),
            role,
            profile_image: None,
        }))
    }

    #[test]
    fn test_every_entry_is_allowed_for_its_role() {
        for role in Role::ALL {
            let session = session(role);
            for entry in navigation(role) {
                assert_eq!(
                    guard(entry.path, &session),
                    GuardDecision::Allow,
                    "{role} cannot open {}",
                    entry.path
                );
            }
        }
    }

    #[test]
    fn test_first_entry_is_role_dashboard() {
        for role in Role::ALL {
            assert_eq!(navigation(role).first().unwrap().path, role.dashboard_path());
        }
    }

    #[test]
    fn test_no_duplicate_paths() {
        for role in Role::ALL {
            let paths: HashSet<_> = navigation(role).iter().map(|e| e.path).collect();
            assert_eq!(paths.len(), navigation(role).len());
        }
    }
}
