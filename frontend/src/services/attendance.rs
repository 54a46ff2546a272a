use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{
    decode_rows, AttendanceRecord, AttendanceWithStaff, Backend, Query, Staff, StaffSummary,
    ATTENDANCE_PRESENT,
};
use crate::services::{
    error::{ServiceError, ServiceResult},
    settings::{get_office_hours, OfficeHours},
    PageRequest, Paged,
};
use crate::utils::time::{days_in_month, format_hhmm, is_weekend, local_time_label, parse_month};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub department: Option<String>,
    /// Staff code (`STF001`) or staff uuid.
    pub staff_id: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayStaffEntry {
    pub staff_code: String,
    pub name: String,
    pub department: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayOverview {
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    /// Every active staff member, admins included.
    pub total: u64,
    pub staff: Vec<TodayStaffEntry>,
    pub total_staff_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffStatistics {
    pub total_working_days: u32,
    pub present_days: u32,
    pub absences: u32,
    pub lateness: u32,
    pub average_check_in: String,
    pub average_check_out: String,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn created_on(staff: &Staff, backend: &Backend) -> Option<NaiveDate> {
    staff
        .created_at
        .map(|at| at.with_timezone(&backend.clock.time_zone()).date_naive())
}

async fn staff_for_attendance(backend: &Backend, staff_id: &str) -> ServiceResult<Staff> {
    if staff_id.trim().is_empty() {
        return Err(ServiceError::InvalidStaffId);
    }
    let staff = backend
        .store
        .select(&Query::table("staff").eq("id", staff_id))
        .await
        .and_then(|r| r.maybe_single::<Staff>())
        .map_err(|err| {
            log::error!("role lookup for {} failed: {}", staff_id, err);
            ServiceError::RoleLookupFailed
        })?
        .ok_or_else(|| ServiceError::NotFound("Staff member not found".to_string()))?;
    if staff.is_admin() {
        return Err(ServiceError::AdminExempt);
    }
    Ok(staff)
}

/// Today's record for a staff member, if any.
pub async fn today_record(
    backend: &Backend,
    staff_id: &str,
) -> ServiceResult<Option<AttendanceRecord>> {
    let today = backend.clock.today();
    let result = backend
        .store
        .select(
            &Query::table("attendance")
                .eq("staff_id", staff_id)
                .eq("date", today.to_string()),
        )
        .await
        .and_then(|r| r.maybe_single::<AttendanceRecord>());
    match result {
        Ok(record) => Ok(record),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(ServiceError::backend(
            "Failed to fetch attendance record",
            err,
        )),
    }
}

/// Late once strictly past `start + threshold`, to sub-second precision.
fn is_late(backend: &Backend, hours: &OfficeHours) -> bool {
    let now = backend.clock.now().naive_local();
    let cutoff = now.date().and_time(NaiveTime::MIN)
        + Duration::minutes(i64::from(hours.start_minutes()) + i64::from(hours.late_threshold_minutes));
    now > cutoff
}

fn first_record(rows: Vec<serde_json::Value>) -> ServiceResult<AttendanceRecord> {
    decode_rows::<AttendanceRecord>(rows)
        .map_err(|err| ServiceError::backend("Failed to read attendance record", err))?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound("Attendance record not found".to_string()))
}

pub async fn record_check_in(backend: &Backend, staff_id: &str) -> ServiceResult<AttendanceRecord> {
    log::debug!("check-in requested for {}", staff_id);
    staff_for_attendance(backend, staff_id).await?;

    let hours = get_office_hours(backend)
        .await
        .map_err(|_| ServiceError::OfficeHoursUnavailable)?;
    if !hours.contains(backend.clock.minutes_since_midnight()) {
        return Err(ServiceError::OutsideOfficeHours {
            start: hours.start_label(),
            end: hours.end_label(),
        });
    }

    let late = is_late(backend, &hours);
    let now = timestamp(backend.clock.now_utc());
    let today = backend.clock.today().to_string();

    if let Some(existing) = today_record(backend, staff_id).await? {
        if existing.is_open() {
            return Err(ServiceError::AlreadyCheckedIn);
        }
        if existing.is_complete() {
            return Err(ServiceError::AlreadyCompleted);
        }
        let rows = backend
            .store
            .update(
                &Query::table("attendance").eq("id", existing.id.as_str()),
                json!({
                    "check_in_time": now,
                    "is_late": late,
                    "status": ATTENDANCE_PRESENT,
                    "updated_at": now,
                }),
            )
            .await
            .map_err(|err| ServiceError::write_failed("Check-in", "Failed to record check-in", err))?;
        return first_record(rows);
    }

    let rows = backend
        .store
        .insert(
            "attendance",
            vec![json!({
                "staff_id": staff_id,
                "date": today,
                "check_in_time": now,
                "is_late": late,
                "status": ATTENDANCE_PRESENT,
            })],
        )
        .await
        .map_err(|err| ServiceError::write_failed("Check-in", "Failed to record check-in", err))?;
    first_record(rows)
}

pub async fn record_check_out(backend: &Backend, staff_id: &str) -> ServiceResult<AttendanceRecord> {
    log::debug!("check-out requested for {}", staff_id);
    staff_for_attendance(backend, staff_id).await?;

    // Check-out is not limited to office hours.
    let record = today_record(backend, staff_id)
        .await?
        .ok_or(ServiceError::NoCheckIn)?;
    if record.check_in_time.is_none() {
        log::warn!("attendance {} has no check-in time", record.id);
        return Err(ServiceError::MissingCheckInTime);
    }
    if record.check_out_time.is_some() {
        return Err(ServiceError::AlreadyCheckedOut);
    }

    let now = timestamp(backend.clock.now_utc());
    let rows = backend
        .store
        .update(
            &Query::table("attendance").eq("id", record.id.as_str()),
            json!({ "check_out_time": now, "updated_at": now }),
        )
        .await
        .map_err(|err| ServiceError::write_failed("Check-out", "Failed to record check-out", err))?;
    let updated = first_record(rows)?;
    log::info!("check-out recorded for attendance {}", updated.id);
    Ok(updated)
}

fn with_range(mut query: Query, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Query {
    if let Some(start) = start {
        query = query.gte("date", start.to_string());
    }
    if let Some(end) = end {
        query = query.lte("date", end.to_string());
    }
    query
}

/// Newest first.
pub async fn get_attendance_by_staff(
    backend: &Backend,
    staff_id: &str,
    range: &DateRange,
) -> ServiceResult<Vec<AttendanceRecord>> {
    let query = with_range(
        Query::table("attendance")
            .eq("staff_id", staff_id)
            .order("date", false),
        range.start_date,
        range.end_date,
    );
    backend
        .store
        .select(&query)
        .await
        .and_then(|r| r.decode())
        .map_err(|err| ServiceError::backend("Failed to load attendance", err))
}

async fn staff_by_ids(backend: &Backend, ids: Vec<String>) -> ServiceResult<HashMap<String, Staff>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let staff = backend
        .store
        .select(&Query::table("staff").in_list("id", ids))
        .await
        .and_then(|r| r.decode::<Staff>())
        .map_err(|err| ServiceError::backend("Failed to load staff", err))?;
    Ok(staff.into_iter().map(|s| (s.id.clone(), s)).collect())
}

fn unique_staff_ids(records: &[AttendanceRecord]) -> Vec<String> {
    let mut ids: Vec<String> = records.iter().map(|r| r.staff_id.clone()).collect();
    ids.sort();
    ids.dedup();
    ids
}

pub async fn get_all_attendance(
    backend: &Backend,
    filter: &AttendanceFilter,
) -> ServiceResult<Paged<AttendanceWithStaff>> {
    let mut query = with_range(
        Query::table("attendance").order("date", false),
        filter.start_date,
        filter.end_date,
    );

    if let Some(department) = filter.department.as_deref().filter(|d| !d.is_empty()) {
        let members = backend
            .store
            .select(
                &Query::table("staff")
                    .select("id")
                    .eq("department", department)
                    .eq("status", "active"),
            )
            .await
            .map_err(|err| ServiceError::backend("Failed to load department staff", err))?;
        let ids: Vec<String> = members
            .rows
            .iter()
            .filter_map(|row| row.get("id").and_then(|v| v.as_str()).map(str::to_string))
            .collect();
        if ids.is_empty() {
            return Ok(Paged::empty());
        }
        query = query.in_list("staff_id", ids);
    }

    if let Some(staff_ref) = filter.staff_id.as_deref().filter(|s| !s.is_empty()) {
        let by_code = backend
            .store
            .select(&Query::table("staff").select("id").eq("staff_id", staff_ref))
            .await
            .and_then(|r| r.maybe_single::<serde_json::Value>())
            .ok()
            .flatten()
            .and_then(|row| row.get("id").and_then(|v| v.as_str()).map(str::to_string));
        query = query.eq("staff_id", by_code.unwrap_or_else(|| staff_ref.to_string()));
    }

    let result = backend
        .store
        .select(&query.page(filter.page.page, filter.page.limit).count_exact())
        .await
        .map_err(|err| ServiceError::backend("Failed to load attendance", err))?;
    let total = result.total.unwrap_or(0);
    let records: Vec<AttendanceRecord> = result
        .decode()
        .map_err(|err| ServiceError::backend("Failed to load attendance", err))?;
    let staff = staff_by_ids(backend, unique_staff_ids(&records)).await?;
    let items = records
        .into_iter()
        .map(|record| {
            let summary = staff.get(&record.staff_id).map(StaffSummary::from);
            AttendanceWithStaff {
                record,
                staff: summary,
            }
        })
        .collect();
    Ok(Paged { items, total })
}

pub async fn get_today_attendance(backend: &Backend, page: PageRequest) -> ServiceResult<TodayOverview> {
    let today = backend.clock.today();
    let tz = backend.clock.time_zone();

    let attendance: Vec<AttendanceRecord> = backend
        .store
        .select(
            &Query::table("attendance")
                .eq("date", today.to_string())
                .order("check_in_time", false),
        )
        .await
        .and_then(|r| r.decode())
        .map_err(|err| ServiceError::backend("Failed to load today's attendance", err))?;

    let active: Vec<Staff> = backend
        .store
        .select(&Query::table("staff").eq("status", "active"))
        .await
        .and_then(|r| r.decode())
        .unwrap_or_else(|err| {
            log::warn!("could not load active staff: {}", err);
            Vec::new()
        });

    // Admins and staff created today are never counted absent.
    let eligible: Vec<&Staff> = active
        .iter()
        .filter(|s| !s.is_admin() && created_on(s, backend) != Some(today))
        .collect();
    let eligible_records: Vec<&AttendanceRecord> = attendance
        .iter()
        .filter(|a| eligible.iter().any(|s| s.id == a.staff_id))
        .collect();
    let present = eligible_records.iter().filter(|a| a.check_in_time.is_some()).count() as u64;
    let late = eligible_records.iter().filter(|a| a.is_late).count() as u64;

    let hours = get_office_hours(backend).await.unwrap_or_default();
    let absent = if backend.clock.minutes_since_midnight() >= hours.start_minutes() {
        (eligible.len() as u64).saturating_sub(present)
    } else {
        0
    };

    let staff = staff_by_ids(backend, unique_staff_ids(&attendance)).await?;
    let entries: Vec<TodayStaffEntry> = attendance
        .iter()
        .map(|a| {
            let member = staff.get(&a.staff_id);
            TodayStaffEntry {
                staff_code: member.map(|s| s.staff_id.clone()).unwrap_or_default(),
                name: member.map(|s| s.name.clone()).unwrap_or_default(),
                department: member
                    .map(Staff::department_label)
                    .unwrap_or_else(|| "N/A".to_string()),
                check_in: a.check_in_time.as_ref().map(|t| local_time_label(t, &tz)),
                check_out: a.check_out_time.as_ref().map(|t| local_time_label(t, &tz)),
                status: if a.check_in_time.is_some() {
                    "Present"
                } else {
                    "Absent"
                },
            }
        })
        .collect();

    let (from, to) = crate::api::page_window(page.page, page.limit);
    let total_staff_count = entries.len() as u64;
    let staff_page = entries
        .into_iter()
        .skip(from as usize)
        .take((to - from + 1) as usize)
        .collect();

    Ok(TodayOverview {
        present,
        absent,
        late,
        total: active.len() as u64,
        staff: staff_page,
        total_staff_count,
    })
}

pub async fn has_checked_in_today(backend: &Backend, staff_id: &str) -> ServiceResult<bool> {
    Ok(today_record(backend, staff_id).await?.is_some())
}

/// Weekdays a staff member was expected at work in the month starting `month_first`.
///
/// Counting starts on the creation day when the staff member joined that
/// month and stops at today for the current month (yesterday if office hours
/// have not started yet). Months after `today` have none.
pub fn working_days(
    month_first: NaiveDate,
    created: Option<NaiveDate>,
    today: NaiveDate,
    office_started_today: bool,
) -> u32 {
    let same_month = |d: NaiveDate| d.year() == month_first.year() && d.month() == month_first.month();
    if month_first > today {
        return 0;
    }
    let mut end_day = if same_month(today) {
        today.day()
    } else {
        days_in_month(month_first)
    };
    if same_month(today) && !office_started_today {
        end_day = end_day.saturating_sub(1);
    }
    let start_day = match created {
        Some(c) if same_month(c) => c.day(),
        Some(c) if c > month_first => return 0,
        _ => 1,
    };
    (start_day..=end_day)
        .filter_map(|day| month_first.with_day(day))
        .filter(|date| !is_weekend(*date))
        .count() as u32
}

/// Whether today's office hours have begun, for a month containing today.
/// Other months are always complete.
pub(crate) async fn office_started_in(backend: &Backend, month_first: NaiveDate) -> bool {
    let today = backend.clock.today();
    if today.year() != month_first.year() || today.month() != month_first.month() {
        return true;
    }
    let hours = get_office_hours(backend).await.unwrap_or_default();
    backend.clock.minutes_since_midnight() >= hours.start_minutes()
}

fn average_label(minutes: &[u32]) -> String {
    if minutes.is_empty() {
        return "N/A".to_string();
    }
    let sum: u64 = minutes.iter().map(|m| *m as u64).sum();
    let avg = (sum as f64 / minutes.len() as f64).round() as u32;
    format_hhmm(avg)
}

pub async fn get_staff_statistics(
    backend: &Backend,
    staff_id: &str,
    month: &str,
) -> ServiceResult<StaffStatistics> {
    let month_first = parse_month(month)
        .ok_or_else(|| ServiceError::InvalidInput(format!("Invalid month: {}", month)))?;
    let next_month = crate::utils::time::next_month_start(month_first);
    let tz = backend.clock.time_zone();

    let staff = match backend
        .store
        .select(&Query::table("staff").eq("id", staff_id))
        .await
        .and_then(|r| r.maybe_single::<Staff>())
    {
        Ok(staff) => staff,
        Err(err) => {
            log::warn!("failed to fetch staff role: {}", err);
            None
        }
    };
    let is_admin = staff.as_ref().map(Staff::is_admin).unwrap_or(false);

    let attendance: Vec<AttendanceRecord> = backend
        .store
        .select(
            &Query::table("attendance")
                .eq("staff_id", staff_id)
                .gte("date", month_first.to_string())
                .lt("date", next_month.to_string()),
        )
        .await
        .and_then(|r| r.decode())
        .map_err(|err| ServiceError::backend("Failed to load attendance", err))?;

    let present_days = attendance
        .iter()
        .filter(|a| a.status == ATTENDANCE_PRESENT)
        .count() as u32;
    let lateness = attendance.iter().filter(|a| a.is_late).count() as u32;

    let today = backend.clock.today();
    let office_started = office_started_in(backend, month_first).await;
    let created = staff.as_ref().and_then(|s| created_on(s, backend));
    let total_working_days = working_days(month_first, created, today, office_started);

    let local_minutes = |t: &DateTime<Utc>| {
        let local = t.with_timezone(&tz);
        local.hour() * 60 + local.minute()
    };
    let check_ins: Vec<u32> = attendance
        .iter()
        .filter_map(|a| a.check_in_time.as_ref().map(local_minutes))
        .collect();
    let check_outs: Vec<u32> = attendance
        .iter()
        .filter_map(|a| a.check_out_time.as_ref().map(local_minutes))
        .collect();

    Ok(StaffStatistics {
        total_working_days,
        present_days,
        absences: if is_admin {
            0
        } else {
            total_working_days.saturating_sub(present_days)
        },
        lateness,
        average_check_in: average_label(&check_ins),
        average_check_out: average_label(&check_outs),
    })
}
