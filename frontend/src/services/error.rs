use thiserror::Error;

use crate::api::ApiError;

/// Business-rule and transport failures surfaced by the service layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("Invalid staff ID provided")]
    InvalidStaffId,
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Validation(String),
    #[error("Admins do not need to check in/out")]
    AdminExempt,
    #[error("Failed to verify staff role")]
    RoleLookupFailed,
    #[error("Failed to retrieve office hours settings")]
    OfficeHoursUnavailable,
    #[error("Check-in is only allowed during office hours ({start} - {end}). Current time is outside office hours.")]
    OutsideOfficeHours { start: String, end: String },
    #[error("Already checked in today. Please check out first.")]
    AlreadyCheckedIn,
    #[error("You have already checked in and checked out today. Only one check-in and one check-out per day is allowed.")]
    AlreadyCompleted,
    #[error("No check-in found for today. Please check in first.")]
    NoCheckIn,
    #[error("Invalid attendance record: missing check-in time")]
    MissingCheckInTime,
    #[error("Already checked out today")]
    AlreadyCheckedOut,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Staff profile not found for this account")]
    ProfileNotFound,
    #[error("Account is inactive")]
    AccountInactive,
    #[error("Unauthorized: Admin access required")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{action} failed due to security policy. Please contact administrator. Error: {message}")]
    RowLevelSecurity { action: String, message: String },
    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: ApiError,
    },
}

impl ServiceError {
    pub fn backend(context: impl Into<String>, source: ApiError) -> Self {
        Self::Backend {
            context: context.into(),
            source,
        }
    }

    /// Maps a write failure, calling out row-level-security denials.
    pub fn write_failed(action: &str, context: impl Into<String>, source: ApiError) -> Self {
        if source.is_rls_violation() {
            log::error!("{} denied by row-level security: {}", action, source);
            Self::RowLevelSecurity {
                action: action.to_string(),
                message: source.error,
            }
        } else {
            Self::backend(context, source)
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ServiceError::InvalidStaffId
            | ServiceError::InvalidInput(_)
            | ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Unauthorized
            | ServiceError::InvalidCredentials
            | ServiceError::AccountInactive => "UNAUTHORIZED",
            ServiceError::NotFound(_) | ServiceError::ProfileNotFound => "NOT_FOUND",
            ServiceError::Duplicate(_) => "CONFLICT",
            ServiceError::RowLevelSecurity { .. } => "RLS_VIOLATION",
            ServiceError::Backend { source, .. } => source.code.as_str(),
            _ => "RULE_VIOLATION",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        messages.sort();
        ServiceError::Validation(messages.join("; "))
    }
}

impl From<ServiceError> for String {
    fn from(error: ServiceError) -> Self {
        error.to_string()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
