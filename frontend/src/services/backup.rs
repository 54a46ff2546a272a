//! JSON snapshots of every table, plus the structural check run before a
//! snapshot is restored.

use chrono::{NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{Backend, Query};
use crate::services::{
    error::{ServiceError, ServiceResult},
    settings::get_all_settings,
};

pub const BACKUP_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    pub version: String,
    pub exported_at: String,
    pub staff_count: usize,
    pub attendance_count: usize,
    pub reports_count: usize,
    pub settings_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupValidation {
    pub valid: bool,
    pub error: Option<String>,
    pub metadata: Option<BackupMetadata>,
}

impl BackupValidation {
    fn invalid(reason: &str) -> Self {
        Self {
            valid: false,
            error: Some(format!("Invalid backup file: {}", reason)),
            metadata: None,
        }
    }
}

async fn all_rows(backend: &Backend, query: Query, label: &str) -> ServiceResult<Vec<Value>> {
    backend
        .store
        .select(&query)
        .await
        .map(|r| r.rows)
        .map_err(|err| ServiceError::backend(format!("Failed to fetch {}", label), err))
}

/// Pretty-printed snapshot of staff, attendance, settings and reports.
pub async fn export_data(backend: &Backend) -> ServiceResult<String> {
    let staff = all_rows(backend, Query::table("staff").order("staff_id", true), "staff").await?;
    let attendance = all_rows(
        backend,
        Query::table("attendance").order("date", false),
        "attendance",
    )
    .await?;
    let settings = get_all_settings(backend).await?;
    let reports = all_rows(
        backend,
        Query::table("reports").order("created_at", false),
        "reports",
    )
    .await?;

    log::info!(
        "exporting {} staff, {} attendance, {} settings, {} reports",
        staff.len(),
        attendance.len(),
        settings.len(),
        reports.len()
    );
    let snapshot = json!({
        "version": BACKUP_VERSION,
        "exportedAt": backend.clock.now_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
        "data": {
            "staff": staff,
            "attendance": attendance,
            "settings": settings,
            "reports": reports,
        }
    });
    serde_json::to_string_pretty(&snapshot)
        .map_err(|err| ServiceError::InvalidInput(format!("Failed to serialize backup: {}", err)))
}

pub fn backup_filename(date: NaiveDate) -> String {
    format!("lg-qams-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Browser download of a snapshot under its dated filename.
pub fn download_backup(json: &str, date: NaiveDate) -> Result<(), String> {
    crate::utils::download::trigger_download(
        &backup_filename(date),
        json,
        crate::utils::download::JSON_MIME,
    )
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn validate_backup_file(backup: &Value) -> BackupValidation {
    let Some(root) = backup.as_object() else {
        return BackupValidation::invalid("Not a valid JSON object");
    };
    if is_blank(root.get("version")) {
        return BackupValidation::invalid("Missing version field");
    }
    if is_blank(root.get("exportedAt")) {
        return BackupValidation::invalid("Missing exportedAt field");
    }
    let Some(data) = root.get("data").filter(|d| d.is_object() || d.is_array()) else {
        return BackupValidation::invalid("Missing or invalid data field");
    };

    let mut counts = [0usize; 3];
    for (slot, table) in ["staff", "attendance", "reports"].iter().enumerate() {
        match data.get(*table).and_then(Value::as_array) {
            Some(rows) => counts[slot] = rows.len(),
            None => {
                return BackupValidation::invalid(&format!("{} data must be an array", table));
            }
        }
    }
    let settings_count = data
        .get("settings")
        .and_then(Value::as_object)
        .map(|m| m.len())
        .unwrap_or(0);

    BackupValidation {
        valid: true,
        error: None,
        metadata: Some(BackupMetadata {
            version: root.get("version").map(text).unwrap_or_default(),
            exported_at: root.get("exportedAt").map(text).unwrap_or_default(),
            staff_count: counts[0],
            attendance_count: counts[1],
            reports_count: counts[2],
            settings_count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_of(value: Value) -> String {
        validate_backup_file(&value).error.unwrap_or_default()
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(backup_filename(date), "lg-qams-backup-2025-03-07.json");
    }

    #[test]
    fn rejects_each_structural_problem() {
        assert_eq!(
            error_of(json!("text")),
            "Invalid backup file: Not a valid JSON object"
        );
        assert_eq!(
            error_of(json!({"exportedAt": "x", "data": {}})),
            "Invalid backup file: Missing version field"
        );
        assert_eq!(
            error_of(json!({"version": "1.0.0", "data": {}})),
            "Invalid backup file: Missing exportedAt field"
        );
        assert_eq!(
            error_of(json!({"version": "1.0.0", "exportedAt": "x", "data": 3})),
            "Invalid backup file: Missing or invalid data field"
        );
        assert_eq!(
            error_of(json!({"version": "1.0.0", "exportedAt": "x",
                            "data": {"staff": [], "attendance": {}, "reports": []}})),
            "Invalid backup file: attendance data must be an array"
        );
        assert_eq!(
            error_of(json!({"version": "1.0.0", "exportedAt": "x",
                            "data": {"staff": [], "attendance": []}})),
            "Invalid backup file: reports data must be an array"
        );
    }

    #[test]
    fn valid_file_reports_counts() {
        let report = validate_backup_file(&json!({
            "version": "1.0.0",
            "exportedAt": "2025-03-07T10:00:00.000Z",
            "data": {
                "staff": [{}, {}],
                "attendance": [{}],
                "reports": [],
                "settings": {"office_start_time": "08:00"}
            }
        }));
        assert!(report.valid);
        assert_eq!(report.error, None);
        let meta = report.metadata.unwrap();
        assert_eq!(meta.version, "1.0.0");
        assert_eq!(
            (meta.staff_count, meta.attendance_count, meta.reports_count, meta.settings_count),
            (2, 1, 0, 1)
        );
    }
}
