use crate::api::StaffRole;
use crate::state::auth::home_for;

pub fn validate_credentials(email: &str, password: &str) -> Result<(), String> {
    if email.trim().is_empty() || password.is_empty() {
        return Err("Please enter your email and password".to_string());
    }
    if !email.contains('@') {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}

/// Only same-origin paths are honoured as redirect targets.
pub fn post_login_target(redirect: Option<&str>, role: StaffRole) -> String {
    match redirect {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && path != "/login" => {
            path.to_string()
        }
        _ => home_for(role).to_string(),
    }
}
