use chrono::{DateTime, NaiveDate, Utc};
use leptos::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StaffRole {
    #[default]
    Staff,
    Admin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Staff => "Staff",
            StaffRole::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub staff_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: StaffRole,
    #[serde(default)]
    pub status: StaffStatus,
    #[serde(default)]
    pub auth_user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Staff {
    pub fn is_admin(&self) -> bool {
        self.role == StaffRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }

    pub fn department_label(&self) -> String {
        self.department
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// Staff columns carried alongside attendance rows in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffSummary {
    pub id: String,
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
}

impl From<&Staff> for StaffSummary {
    fn from(staff: &Staff) -> Self {
        Self {
            id: staff.id.clone(),
            staff_id: staff.staff_id.clone(),
            name: staff.name.clone(),
            email: staff.email.clone(),
            department: staff.department.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_late: bool,
    #[serde(default = "default_attendance_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_attendance_status() -> String {
    ATTENDANCE_PRESENT.to_string()
}

pub const ATTENDANCE_PRESENT: &str = "Present";

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceWithStaff {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub staff: Option<StaffSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRow {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Monthly,
    Individual,
    Departmental,
}

impl ReportType {
    pub fn label(&self) -> &'static str {
        match self {
            ReportType::Monthly => "Monthly",
            ReportType::Individual => "Individual",
            ReportType::Departmental => "Departmental",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    pub id: String,
    #[serde(default)]
    pub staff_id: Option<String>,
    pub month: String,
    #[serde(default)]
    pub department: Option<String>,
    pub report_type: ReportType,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub generated_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        // Refresh a little early so a request never races the expiry.
        self.expires_at.map(|exp| exp - 30 <= now_unix).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn => "SIGNED_IN",
            AuthEvent::SignedOut => "SIGNED_OUT",
            AuthEvent::TokenRefreshed => "TOKEN_REFRESHED",
            AuthEvent::UserUpdated => "USER_UPDATED",
            AuthEvent::PasswordRecovery => "PASSWORD_RECOVERY",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

pub const NOT_FOUND_CODE: &str = "PGRST116";
pub const RLS_VIOLATION_CODE: &str = "42501";

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ApiError {}

impl From<ApiError> for String {
    fn from(error: ApiError) -> Self {
        error.error
    }
}

impl IntoView for ApiError {
    fn into_view(self) -> View {
        self.error.into_view()
    }
}

impl ApiError {
    pub fn new(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", msg)
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::new("UNKNOWN", msg)
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::new("REQUEST_FAILED", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(NOT_FOUND_CODE, msg)
    }

    /// Builds an error from a PostgREST or GoTrue error body.
    pub fn from_backend_body(status: u16, body: &Value) -> Self {
        let message = ["message", "error_description", "msg", "error"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        let code = body
            .get("code")
            .and_then(|c| match c {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .or_else(|| body.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        let details = ["details", "hint"]
            .iter()
            .filter_map(|key| body.get(*key).filter(|v| !v.is_null()))
            .next()
            .cloned();
        Self {
            error: message,
            code,
            details,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == NOT_FOUND_CODE
    }

    pub fn is_rls_violation(&self) -> bool {
        self.code == RLS_VIOLATION_CODE || self.error.contains("row-level security")
    }
}
