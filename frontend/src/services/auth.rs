use validator::Validate;

use crate::api::{
    AuthCallback, AuthSession, AuthSubscription, AuthUser, Backend, Query, Staff,
};
use crate::services::error::{ServiceError, ServiceResult};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Staff profile joined with the authenticated identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub staff: Staff,
    pub auth_user: AuthUser,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.staff.is_admin()
    }
}

#[derive(Debug, Clone, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

async fn staff_by_email(backend: &Backend, email: &str) -> ServiceResult<Staff> {
    let result = backend
        .store
        .select(&Query::table("staff").eq("email", email))
        .await;
    match result.and_then(|r| r.maybe_single::<Staff>()) {
        Ok(Some(staff)) => Ok(staff),
        Ok(None) => Err(ServiceError::ProfileNotFound),
        Err(err) if err.is_not_found() || err.error.contains("0 rows") => {
            Err(ServiceError::ProfileNotFound)
        }
        Err(err) => Err(ServiceError::backend("Failed to load staff profile", err)),
    }
}

/// Signs in and resolves the staff profile. A session whose profile is
/// missing or inactive is closed before the error is returned.
pub async fn sign_in(backend: &Backend, email: &str, password: &str) -> ServiceResult<CurrentUser> {
    let session = backend
        .auth
        .sign_in_with_password(email.trim(), password)
        .await
        .map_err(|err| {
            log::warn!("sign-in rejected: {}", err);
            ServiceError::InvalidCredentials
        })?;
    let account_email = session
        .user
        .email
        .clone()
        .unwrap_or_else(|| email.trim().to_lowercase());
    let profile = match staff_by_email(backend, &account_email).await {
        Ok(staff) if staff.is_active() => Ok(staff),
        Ok(_) => Err(ServiceError::AccountInactive),
        Err(err) => Err(err),
    };
    match profile {
        Ok(staff) => Ok(CurrentUser {
            staff,
            auth_user: session.user,
        }),
        Err(err) => {
            if let Err(close_err) = backend.auth.sign_out().await {
                log::warn!("could not close rejected session: {}", close_err);
            }
            Err(err)
        }
    }
}

pub async fn sign_out(backend: &Backend) -> ServiceResult<()> {
    backend
        .auth
        .sign_out()
        .await
        .map_err(|err| ServiceError::backend("Failed to sign out", err))
}

/// `Ok(None)` when nobody is signed in.
pub async fn get_current_user(backend: &Backend) -> ServiceResult<Option<CurrentUser>> {
    let auth_user = match backend.auth.get_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(None),
        Err(err) => {
            log::debug!("no authenticated user: {}", err);
            return Ok(None);
        }
    };
    let email = match auth_user.email.as_deref() {
        Some(email) => email.to_string(),
        None => return Err(ServiceError::ProfileNotFound),
    };
    let staff = staff_by_email(backend, &email).await?;
    Ok(Some(CurrentUser { staff, auth_user }))
}

pub async fn get_session(backend: &Backend) -> ServiceResult<Option<AuthSession>> {
    backend
        .auth
        .get_session()
        .await
        .map_err(|err| ServiceError::backend("Failed to read session", err))
}

pub async fn is_authenticated(backend: &Backend) -> bool {
    matches!(get_session(backend).await, Ok(Some(_)))
}

pub async fn is_admin(backend: &Backend) -> bool {
    matches!(get_current_user(backend).await, Ok(Some(user)) if user.is_admin())
}

/// Resolves the signed-in admin or fails with `Unauthorized`.
pub async fn require_admin(backend: &Backend) -> ServiceResult<Staff> {
    match get_current_user(backend).await {
        Ok(Some(user)) if user.is_admin() => Ok(user.staff),
        _ => Err(ServiceError::Unauthorized),
    }
}

pub fn on_auth_state_change(backend: &Backend, callback: AuthCallback) -> AuthSubscription {
    backend.auth.on_auth_state_change(callback)
}

pub async fn update_password(backend: &Backend, new_password: &str) -> ServiceResult<()> {
    if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    backend
        .auth
        .update_password(new_password)
        .await
        .map_err(|err| ServiceError::backend("Failed to update password", err))
}

/// Validates a profile-page password change and applies it.
pub async fn change_password(backend: &Backend, change: &PasswordChange) -> ServiceResult<()> {
    change.validate()?;
    update_password(backend, &change.new_password).await
}

pub fn reset_redirect_url(origin: &str) -> String {
    format!("{}/reset-password", origin.trim_end_matches('/'))
}

pub async fn reset_password(backend: &Backend, email: &str, origin: &str) -> ServiceResult<()> {
    backend
        .auth
        .reset_password_for_email(email.trim(), &reset_redirect_url(origin))
        .await
        .map_err(|err| ServiceError::backend("Failed to send reset email", err))
}
