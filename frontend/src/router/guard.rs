use crate::api::Backend;
use crate::services::auth::{get_current_user, get_session};

use super::{before_hook, path::encode_component, BeforeHook, NavigateOptions, WeakRouter};

pub const PUBLIC_PATHS: [&str; 6] = ["/", "/scan", "/checkin", "/login", "/scan/success", "/about"];

pub const STAFF_HOME: &str = "/staff/dashboard";

pub fn requires_auth(path: &str) -> bool {
    !PUBLIC_PATHS.contains(&path) && !path.starts_with("/scan/")
}

pub fn requires_admin(path: &str) -> bool {
    path.starts_with("/admin")
}

pub fn login_redirect(path: &str) -> String {
    format!("/login?redirect={}", encode_component(path))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Session is read fresh from the auth backend on every check.
pub async fn check_access(backend: &Backend, path: &str) -> GuardDecision {
    if !requires_auth(path) {
        return GuardDecision::Allow;
    }
    if !matches!(get_session(backend).await, Ok(Some(_))) {
        return GuardDecision::Redirect(login_redirect(path));
    }
    if requires_admin(path) {
        match get_current_user(backend).await {
            Ok(Some(user)) if user.is_admin() => {}
            _ => return GuardDecision::Redirect(STAFF_HOME.to_string()),
        }
    }
    GuardDecision::Allow
}

/// Global before hook. A redirect is performed here, and the original
/// navigation reports `false`.
pub fn auth_guard(backend: Backend, router: WeakRouter) -> BeforeHook {
    before_hook(move |to, _from| {
        let backend = backend.clone();
        let router = router.clone();
        async move {
            match check_access(&backend, &to.path).await {
                GuardDecision::Allow => true,
                GuardDecision::Redirect(target) => {
                    log::info!("guard redirected {} to {}", to.path, target);
                    if let Some(router) = router.upgrade() {
                        router.navigate(&target, NavigateOptions::default()).await;
                    }
                    false
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_skip_auth() {
        for path in PUBLIC_PATHS {
            assert!(!requires_auth(path), "{} should be public", path);
        }
        assert!(!requires_auth("/scan/anything"));
        assert!(requires_auth("/staff/dashboard"));
        assert!(requires_auth("/admin/settings"));
        assert!(requires_auth("/scanner"));
    }

    #[test]
    fn admin_prefix_and_login_redirect() {
        assert!(requires_admin("/admin"));
        assert!(requires_admin("/admin/staff"));
        assert!(!requires_admin("/staff/reports"));
        assert_eq!(
            login_redirect("/admin/staff"),
            "/login?redirect=%2Fadmin%2Fstaff"
        );
    }
}
