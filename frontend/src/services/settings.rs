use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde_json::{json, Value};

use crate::api::{decode_rows, Backend, Query, SettingRow};
use crate::services::{
    auth::require_admin,
    error::{ServiceError, ServiceResult},
};
use crate::utils::time::{minutes_of, parse_hhmm};

pub const OFFICE_START_KEY: &str = "office_start_time";
pub const OFFICE_END_KEY: &str = "office_end_time";
pub const LATE_THRESHOLD_KEY: &str = "late_threshold_minutes";
pub const IP_RESTRICTION_KEY: &str = "ip_restriction";
pub const AUTO_REPORTS_KEY: &str = "auto_generate_reports";

pub const DEFAULT_OFFICE_START: &str = "08:00";
pub const DEFAULT_OFFICE_END: &str = "17:00";
pub const DEFAULT_LATE_THRESHOLD: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub late_threshold_minutes: u32,
}

impl Default for OfficeHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            late_threshold_minutes: DEFAULT_LATE_THRESHOLD,
        }
    }
}

impl OfficeHours {
    pub fn start_label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format("%H:%M").to_string()
    }

    pub fn start_minutes(&self) -> u32 {
        minutes_of(self.start)
    }

    pub fn end_minutes(&self) -> u32 {
        minutes_of(self.end)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, minutes_since_midnight: u32) -> bool {
        minutes_since_midnight >= self.start_minutes() && minutes_since_midnight <= self.end_minutes()
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.start >= self.end {
            return Err(ServiceError::Validation(
                "Office start time must be before end time".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads a stored setting as text (`"08:00"`, `15`, `true` all work).
pub fn setting_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

pub fn setting_flag(settings: &BTreeMap<String, Value>, key: &str) -> bool {
    settings
        .get(key)
        .and_then(setting_text)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub async fn get_all_settings(backend: &Backend) -> ServiceResult<BTreeMap<String, Value>> {
    let rows = backend
        .store
        .select(&Query::table("settings"))
        .await
        .and_then(|r| r.decode::<SettingRow>())
        .map_err(|err| ServiceError::backend("Failed to load settings", err))?;
    Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
}

/// `Ok(None)` for an unknown key.
pub async fn get_setting(backend: &Backend, key: &str) -> ServiceResult<Option<Value>> {
    let result = backend
        .store
        .select(&Query::table("settings").select("value").eq("key", key))
        .await
        .and_then(|r| r.maybe_single::<Value>());
    match result {
        Ok(row) => Ok(row
            .and_then(|r| r.get("value").cloned())
            .filter(|v| !v.is_null())),
        Err(err) if err.is_not_found() || err.error.contains("0 rows") => Ok(None),
        Err(err) => Err(ServiceError::backend(
            format!("Failed to load setting {}", key),
            err,
        )),
    }
}

pub async fn update_setting(backend: &Backend, key: &str, value: Value) -> ServiceResult<SettingRow> {
    let admin = require_admin(backend).await?;
    let rows = backend
        .store
        .upsert(
            "settings",
            vec![json!({ "key": key, "value": value, "updated_by": admin.id })],
            "key",
        )
        .await
        .and_then(decode_rows::<SettingRow>)
        .map_err(|err| ServiceError::write_failed("Settings update", "Failed to update setting", err))?;
    rows.into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound(format!("Setting {} was not saved", key)))
}

pub async fn update_settings(
    backend: &Backend,
    settings: BTreeMap<String, Value>,
) -> ServiceResult<Vec<SettingRow>> {
    let admin = require_admin(backend).await?;
    let rows = settings
        .into_iter()
        .map(|(key, value)| json!({ "key": key, "value": value, "updated_by": admin.id }))
        .collect();
    backend
        .store
        .upsert("settings", rows, "key")
        .await
        .and_then(decode_rows::<SettingRow>)
        .map_err(|err| ServiceError::write_failed("Settings update", "Failed to update settings", err))
}

fn time_or_default(value: Option<Value>, fallback: &str) -> NaiveTime {
    value
        .as_ref()
        .and_then(setting_text)
        .and_then(|text| {
            let parsed = parse_hhmm(&text);
            if parsed.is_none() {
                log::warn!("ignoring malformed office time {:?}", text);
            }
            parsed
        })
        .or_else(|| parse_hhmm(fallback))
        .unwrap_or_default()
}

pub async fn get_office_hours(backend: &Backend) -> ServiceResult<OfficeHours> {
    let start = get_setting(backend, OFFICE_START_KEY).await;
    let end = get_setting(backend, OFFICE_END_KEY).await;
    let threshold = get_setting(backend, LATE_THRESHOLD_KEY).await;
    let (start, end, threshold) = match (start, end, threshold) {
        (Ok(s), Ok(e), Ok(t)) => (s, e, t),
        _ => return Err(ServiceError::OfficeHoursUnavailable),
    };
    let late_threshold_minutes = threshold
        .as_ref()
        .and_then(setting_text)
        .and_then(|t| t.parse::<u32>().ok())
        .unwrap_or(DEFAULT_LATE_THRESHOLD);
    Ok(OfficeHours {
        start: time_or_default(start, DEFAULT_OFFICE_START),
        end: time_or_default(end, DEFAULT_OFFICE_END),
        late_threshold_minutes,
    })
}

pub async fn save_office_hours(backend: &Backend, hours: &OfficeHours) -> ServiceResult<Vec<SettingRow>> {
    hours.validate()?;
    let mut settings = BTreeMap::new();
    settings.insert(OFFICE_START_KEY.to_string(), json!(hours.start_label()));
    settings.insert(OFFICE_END_KEY.to_string(), json!(hours.end_label()));
    settings.insert(
        LATE_THRESHOLD_KEY.to_string(),
        json!(hours.late_threshold_minutes.to_string()),
    );
    update_settings(backend, settings).await
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::{test_support::fixtures::setting_row, ApiError};
    use crate::services::testing::{memory_at, with_admin, with_staff};

    #[tokio::test]
    async fn office_hours_fall_back_to_defaults() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        let hours = get_office_hours(&memory.backend()).await.unwrap();
        assert_eq!(hours, OfficeHours::default());
        assert_eq!(hours.start_label(), "08:00");
        assert_eq!(hours.end_label(), "17:00");
    }

    #[tokio::test]
    async fn office_hours_read_stored_values() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        memory.seed(
            "settings",
            vec![
                setting_row(OFFICE_START_KEY, "09:30"),
                setting_row(OFFICE_END_KEY, "18:00:00"),
                serde_json::json!({"key": LATE_THRESHOLD_KEY, "value": 5}),
            ],
        );
        let hours = get_office_hours(&memory.backend()).await.unwrap();
        assert_eq!(hours.start_label(), "09:30");
        assert_eq!(hours.end_label(), "18:00");
        assert_eq!(hours.late_threshold_minutes, 5);
    }

    #[tokio::test]
    async fn office_hours_fail_when_settings_are_unreadable() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        memory.fail_reads("settings", ApiError::request_failed("offline"));
        assert_eq!(
            get_office_hours(&memory.backend()).await.unwrap_err(),
            ServiceError::OfficeHoursUnavailable
        );
    }

    #[tokio::test]
    async fn missing_setting_is_none() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        assert_eq!(get_setting(&memory.backend(), "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn updates_require_an_admin() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        with_staff(&memory, "s1", "STF001", "Ada");
        let err = update_setting(&memory.backend(), IP_RESTRICTION_KEY, json!("true"))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Unauthorized);
        assert!(memory.rows("settings").is_empty());
    }

    #[tokio::test]
    async fn admin_updates_upsert_on_key_and_stamp_updated_by() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        with_admin(&memory, "a1", "ADM001", "Grace");
        memory.seed("settings", vec![setting_row(IP_RESTRICTION_KEY, "false")]);
        let backend = memory.backend();

        update_setting(&backend, IP_RESTRICTION_KEY, json!("true")).await.unwrap();
        let all = get_all_settings(&backend).await.unwrap();
        assert!(setting_flag(&all, IP_RESTRICTION_KEY));
        assert!(!setting_flag(&all, AUTO_REPORTS_KEY));
        assert_eq!(memory.rows("settings").len(), 1);
        assert_eq!(memory.rows("settings")[0]["updated_by"], json!("a1"));
    }

    #[tokio::test]
    async fn saving_office_hours_validates_the_window() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        with_admin(&memory, "a1", "ADM001", "Grace");
        let backend = memory.backend();
        let inverted = OfficeHours {
            start: parse_hhmm("17:00").unwrap(),
            end: parse_hhmm("08:00").unwrap(),
            late_threshold_minutes: 10,
        };
        assert!(matches!(
            save_office_hours(&backend, &inverted).await,
            Err(ServiceError::Validation(_))
        ));

        let hours = OfficeHours {
            start: parse_hhmm("07:45").unwrap(),
            end: parse_hhmm("16:15").unwrap(),
            late_threshold_minutes: 10,
        };
        save_office_hours(&backend, &hours).await.unwrap();
        assert_eq!(get_office_hours(&backend).await.unwrap(), hours);
    }

    #[test]
    fn window_is_inclusive() {
        let hours = OfficeHours::default();
        assert!(hours.contains(8 * 60));
        assert!(hours.contains(17 * 60));
        assert!(!hours.contains(17 * 60 + 1));
        assert!(!hours.contains(7 * 60 + 59));
    }
}
