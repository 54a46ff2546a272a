//! Navigation cache derived from the auth backend.

use crate::api::{AuthEvent, Backend, StaffRole};
use crate::services::auth::get_current_user;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavState {
    /// Not resolved yet; the header renders no menu.
    #[default]
    Unknown,
    SignedOut,
    SignedIn { name: String, role: StaffRole },
}

impl NavState {
    pub fn user_name(&self) -> Option<&str> {
        match self {
            NavState::SignedIn { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
}

const fn item(href: &'static str, label: &'static str) -> NavItem {
    NavItem { href, label }
}

pub const ADMIN_NAV: [NavItem; 5] = [
    item("/admin/dashboard", "Dashboard"),
    item("/admin/staff", "Staff"),
    item("/admin/attendance", "Attendance"),
    item("/admin/reports", "Reports"),
    item("/admin/settings", "Settings"),
];

pub const STAFF_NAV: [NavItem; 4] = [
    item("/staff/dashboard", "Dashboard"),
    item("/staff/attendance", "Attendance"),
    item("/staff/reports", "Reports"),
    item("/staff/profile", "Profile"),
];

pub const PUBLIC_NAV: [NavItem; 2] = [item("/scan", "Scan QR"), item("/login", "Login")];

pub fn nav_items(state: &NavState) -> &'static [NavItem] {
    match state {
        NavState::Unknown => &[],
        NavState::SignedOut => &PUBLIC_NAV,
        NavState::SignedIn {
            role: StaffRole::Admin,
            ..
        } => &ADMIN_NAV,
        NavState::SignedIn { .. } => &STAFF_NAV,
    }
}

/// Landing page after sign-in.
pub fn home_for(role: StaffRole) -> &'static str {
    match role {
        StaffRole::Admin => "/admin/dashboard",
        StaffRole::Staff => "/staff/dashboard",
    }
}

pub async fn resolve_nav_state(backend: &Backend) -> NavState {
    match get_current_user(backend).await {
        Ok(Some(user)) => NavState::SignedIn {
            name: user.staff.name,
            role: user.staff.role,
        },
        Ok(None) => NavState::SignedOut,
        Err(err) => {
            log::warn!("could not resolve current user: {}", err);
            NavState::SignedOut
        }
    }
}

/// `Some` when the event settles the cache directly, `None` when it must
/// be re-derived.
pub fn nav_state_after(event: AuthEvent) -> Option<NavState> {
    match event {
        AuthEvent::SignedOut => Some(NavState::SignedOut),
        _ => None,
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::services::testing::{memory_at, with_admin};

    #[tokio::test]
    async fn resolves_from_the_backend() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        assert_eq!(resolve_nav_state(&memory.backend()).await, NavState::SignedOut);
        with_admin(&memory, "a1", "ADM001", "Grace");
        assert_eq!(
            resolve_nav_state(&memory.backend()).await,
            NavState::SignedIn {
                name: "Grace".into(),
                role: StaffRole::Admin
            }
        );
    }
}
