use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::api::{Backend, Query};
use crate::services::{
    auth::require_admin,
    backup::validate_backup_file,
    error::{ServiceError, ServiceResult},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    pub overwrite_existing: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub inserted: u32,
    pub updated: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreStats {
    pub staff: TableStats,
    pub attendance: TableStats,
    pub settings: TableStats,
    pub reports: TableStats,
}

enum Outcome {
    Inserted,
    Updated,
    Skipped,
}

impl TableStats {
    fn record(&mut self, outcome: ServiceResult<Outcome>, table: &str) {
        match outcome {
            Ok(Outcome::Inserted) => self.inserted += 1,
            Ok(Outcome::Updated) => self.updated += 1,
            Ok(Outcome::Skipped) => {}
            Err(err) => {
                log::error!("error restoring {} row: {}", table, err);
                self.errors += 1;
            }
        }
    }
}

fn field(row: &Value, key: &str) -> Value {
    row.get(key).cloned().unwrap_or(Value::Null)
}

fn pick(row: &Value, keys: &[&str]) -> Map<String, Value> {
    keys.iter().map(|k| (k.to_string(), field(row, k))).collect()
}

async fn existing_id(backend: &Backend, query: Query) -> ServiceResult<Option<String>> {
    let found = backend
        .store
        .select(&query.select("id"))
        .await
        .and_then(|r| r.maybe_single::<Value>())
        .map_err(|err| ServiceError::backend("Failed to look up existing row", err))?;
    Ok(found.and_then(|row| row.get("id").and_then(Value::as_str).map(str::to_string)))
}

fn returned_id(rows: Vec<Value>) -> Option<String> {
    rows.into_iter()
        .next()
        .and_then(|row| row.get("id").and_then(Value::as_str).map(str::to_string))
}

const STAFF_FIELDS: [&str; 5] = ["name", "email", "department", "role", "status"];
const ATTENDANCE_FIELDS: [&str; 4] = ["check_in_time", "check_out_time", "status", "is_late"];

/// Restores one staff row and records `backup uuid -> live uuid`.
async fn restore_staff(
    backend: &Backend,
    row: &Value,
    options: RestoreOptions,
    ids: &mut HashMap<String, String>,
) -> ServiceResult<Outcome> {
    let code = row
        .get("staff_id")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServiceError::InvalidInput("Staff row without staff_id".to_string()))?;
    let backup_id = row.get("id").and_then(Value::as_str).map(str::to_string);

    let live_id = existing_id(backend, Query::table("staff").eq("staff_id", code)).await?;
    let (outcome, live_id) = match live_id {
        Some(id) if options.overwrite_existing => {
            backend
                .store
                .update(
                    &Query::table("staff").eq("id", id.as_str()),
                    Value::Object(pick(row, &STAFF_FIELDS)),
                )
                .await
                .map_err(|err| ServiceError::backend("Failed to update staff", err))?;
            (Outcome::Updated, Some(id))
        }
        Some(id) => (Outcome::Skipped, Some(id)),
        None => {
            let mut insert = pick(row, &STAFF_FIELDS);
            insert.insert("staff_id".to_string(), json!(code));
            insert.insert("auth_user_id".to_string(), Value::Null);
            let rows = backend
                .store
                .insert("staff", vec![Value::Object(insert)])
                .await
                .map_err(|err| ServiceError::backend("Failed to insert staff", err))?;
            (Outcome::Inserted, returned_id(rows))
        }
    };
    if let (Some(from), Some(to)) = (backup_id, live_id) {
        ids.insert(from, to);
    }
    Ok(outcome)
}

fn remap(row: &Value, key: &str, ids: &HashMap<String, String>) -> Value {
    match row.get(key).and_then(Value::as_str) {
        Some(id) => json!(ids.get(id).map(String::as_str).unwrap_or(id)),
        None => field(row, key),
    }
}

async fn restore_attendance(
    backend: &Backend,
    row: &Value,
    options: RestoreOptions,
    ids: &HashMap<String, String>,
) -> ServiceResult<Outcome> {
    let staff_id = remap(row, "staff_id", ids);
    let (Some(staff), Some(date)) = (staff_id.as_str(), row.get("date").and_then(Value::as_str)) else {
        return Err(ServiceError::InvalidInput(
            "Attendance row without staff_id or date".to_string(),
        ));
    };
    let existing = existing_id(
        backend,
        Query::table("attendance").eq("staff_id", staff).eq("date", date),
    )
    .await?;
    match existing {
        None => {
            let mut insert = pick(row, &ATTENDANCE_FIELDS);
            insert.insert("staff_id".to_string(), json!(staff));
            insert.insert("date".to_string(), json!(date));
            backend
                .store
                .insert("attendance", vec![Value::Object(insert)])
                .await
                .map_err(|err| ServiceError::backend("Failed to insert attendance", err))?;
            Ok(Outcome::Inserted)
        }
        Some(id) if options.overwrite_existing => {
            backend
                .store
                .update(
                    &Query::table("attendance").eq("id", id.as_str()),
                    Value::Object(pick(row, &ATTENDANCE_FIELDS)),
                )
                .await
                .map_err(|err| ServiceError::backend("Failed to update attendance", err))?;
            Ok(Outcome::Updated)
        }
        Some(_) => Ok(Outcome::Skipped),
    }
}

async fn restore_setting(
    backend: &Backend,
    key: &str,
    value: &Value,
    admin_id: &str,
) -> ServiceResult<Outcome> {
    backend
        .store
        .upsert(
            "settings",
            vec![json!({ "key": key, "value": value, "updated_by": admin_id })],
            "key",
        )
        .await
        .map_err(|err| ServiceError::backend("Failed to upsert setting", err))?;
    Ok(Outcome::Updated)
}

async fn restore_report(
    backend: &Backend,
    row: &Value,
    ids: &HashMap<String, String>,
) -> ServiceResult<Outcome> {
    let Some(fields) = row.as_object() else {
        return Err(ServiceError::InvalidInput("Report row is not an object".to_string()));
    };
    let mut insert = fields.clone();
    insert.remove("id");
    insert.insert("staff_id".to_string(), remap(row, "staff_id", ids));
    backend
        .store
        .insert("reports", vec![Value::Object(insert)])
        .await
        .map_err(|err| ServiceError::backend("Failed to insert report", err))?;
    Ok(Outcome::Inserted)
}

fn rows<'a>(data: &'a Value, table: &str) -> &'a [Value] {
    data.get(table)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Writes a validated backup into the live tables. Row failures are
/// counted, never fatal.
pub async fn restore_data(
    backend: &Backend,
    backup: &Value,
    options: RestoreOptions,
) -> ServiceResult<RestoreStats> {
    let validation = validate_backup_file(backup);
    if !validation.valid {
        return Err(ServiceError::Validation(validation.error.unwrap_or_default()));
    }
    let admin = require_admin(backend).await?;
    let data = &backup["data"];
    let mut stats = RestoreStats::default();
    let mut ids = HashMap::new();

    for row in rows(data, "staff") {
        let outcome = restore_staff(backend, row, options, &mut ids).await;
        stats.staff.record(outcome, "staff");
    }
    for row in rows(data, "attendance") {
        let outcome = restore_attendance(backend, row, options, &ids).await;
        stats.attendance.record(outcome, "attendance");
    }
    if let Some(settings) = data.get("settings").and_then(Value::as_object) {
        for (key, value) in settings {
            let outcome = restore_setting(backend, key, value, &admin.id).await;
            stats.settings.record(outcome, "settings");
        }
    }
    for row in rows(data, "reports") {
        let outcome = restore_report(backend, row, &ids).await;
        stats.reports.record(outcome, "reports");
    }

    log::info!("restore finished: {:?}", stats);
    Ok(stats)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::{
        test_support::fixtures::{attendance_row, staff_row},
        ApiError,
    };
    use crate::services::testing::{memory_at, with_admin, with_staff};

    fn backup(data: Value) -> Value {
        json!({ "version": "1.0.0", "exportedAt": "2025-03-07T10:00:00.000Z", "data": data })
    }

    fn sample() -> Value {
        let mut renamed = staff_row("old-ada", "STF001", "Ada L", "Staff", "Research");
        renamed["auth_user_id"] = json!("auth-from-backup");
        backup(json!({
            "staff": [renamed, staff_row("old-bob", "STF002", "Bob", "Staff", "Ops")],
            "attendance": [
                attendance_row("r1", "old-ada", "2025-03-03", Some("2025-03-03T08:00:00Z"), None, false),
                attendance_row("r2", "old-bob", "2025-03-03", Some("2025-03-03T09:00:00Z"), None, true),
            ],
            "settings": { "office_start_time": "07:30" },
            "reports": [
                { "id": "rep1", "staff_id": "old-bob", "month": "2025-03",
                  "report_type": "monthly", "data": {} }
            ]
        }))
    }

    fn seeded() -> std::rc::Rc<crate::api::test_support::MemoryBackend> {
        let memory = memory_at(2025, 3, 7, 10, 0);
        with_admin(&memory, "a1", "ADM001", "Grace");
        memory.seed("staff", vec![staff_row("live-ada", "STF001", "Ada", "Staff", "Ops")]);
        memory.seed(
            "attendance",
            vec![attendance_row("live-r1", "live-ada", "2025-03-03", Some("2025-03-03T08:30:00Z"), None, true)],
        );
        memory
    }

    fn staff_named(memory: &crate::api::test_support::MemoryBackend, code: &str) -> Value {
        memory
            .rows("staff")
            .into_iter()
            .find(|r| r["staff_id"] == code)
            .unwrap()
    }

    #[tokio::test]
    async fn invalid_files_and_non_admins_are_rejected() {
        let memory = memory_at(2025, 3, 7, 10, 0);
        with_staff(&memory, "s1", "STF009", "Eve");
        let backend = memory.backend();

        let err = restore_data(&backend, &json!({"data": {}}), RestoreOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Validation("Invalid backup file: Missing version field".into())
        );
        assert_eq!(
            restore_data(&backend, &sample(), RestoreOptions::default())
                .await
                .unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[tokio::test]
    async fn without_overwrite_existing_rows_are_untouched() {
        let memory = seeded();
        let stats = restore_data(&memory.backend(), &sample(), RestoreOptions::default())
            .await
            .unwrap();

        assert_eq!(stats.staff, TableStats { inserted: 1, updated: 0, errors: 0 });
        assert_eq!(stats.attendance, TableStats { inserted: 1, updated: 0, errors: 0 });
        assert_eq!(stats.settings.updated, 1);
        assert_eq!(stats.reports.inserted, 1);

        assert_eq!(staff_named(&memory, "STF001")["name"], "Ada");
        let ada_day = memory
            .rows("attendance")
            .into_iter()
            .find(|r| r["id"] == "live-r1")
            .unwrap();
        assert_eq!(ada_day["is_late"], true);

        let bob = staff_named(&memory, "STF002");
        assert_eq!(bob["auth_user_id"], Value::Null);
        let bob_id = bob["id"].as_str().unwrap().to_string();
        assert!(memory
            .rows("attendance")
            .iter()
            .any(|r| r["staff_id"] == bob_id.as_str() && r["date"] == "2025-03-03"));
        let report = &memory.rows("reports")[0];
        assert_eq!(report["staff_id"], bob_id.as_str());
        assert_ne!(report["id"], "rep1");
    }

    #[tokio::test]
    async fn overwrite_updates_matches_but_never_auth_links() {
        let memory = seeded();
        let stats = restore_data(
            &memory.backend(),
            &sample(),
            RestoreOptions { overwrite_existing: true },
        )
        .await
        .unwrap();

        assert_eq!(stats.staff, TableStats { inserted: 1, updated: 1, errors: 0 });
        assert_eq!(stats.attendance, TableStats { inserted: 1, updated: 1, errors: 0 });
        let ada = staff_named(&memory, "STF001");
        assert_eq!(ada["name"], "Ada L");
        assert_eq!(ada["department"], "Research");
        assert_eq!(ada["auth_user_id"], Value::Null);
        let ada_day = memory
            .rows("attendance")
            .into_iter()
            .find(|r| r["id"] == "live-r1")
            .unwrap();
        assert_eq!(ada_day["is_late"], false);
        assert_eq!(memory.rows("attendance").len(), 2);
    }

    #[tokio::test]
    async fn row_failures_are_counted_and_restore_continues() {
        let memory = seeded();
        memory.fail_writes("reports", ApiError::request_failed("denied"));
        let data = backup(json!({
            "staff": [{ "name": "No Code" }],
            "attendance": [],
            "reports": [{ "month": "2025-03", "report_type": "monthly" }]
        }));
        let stats = restore_data(&memory.backend(), &data, RestoreOptions::default())
            .await
            .unwrap();
        assert_eq!(stats.staff.errors, 1);
        assert_eq!(stats.reports.errors, 1);
        assert_eq!(stats.settings, TableStats::default());
    }
}
