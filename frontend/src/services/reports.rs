use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{
    AttendanceRecord, Backend, Query, ReportType, SavedReport, Staff, StaffRole,
    ATTENDANCE_PRESENT,
};
use crate::services::{
    attendance::{created_on, get_staff_statistics, office_started_in, working_days, StaffStatistics},
    error::{ServiceError, ServiceResult},
    PageRequest, Paged,
};
use crate::utils::time::{next_month_start, parse_month};

pub const ALL_DEPARTMENTS: &str = "All Departments";

pub const DEPARTMENTAL_CSV_HEADER: [&str; 9] = [
    "Staff ID",
    "Name",
    "Email",
    "Role",
    "Department",
    "Working Days",
    "Present Days",
    "Absences",
    "Lateness",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStaff {
    pub name: String,
    pub department: Option<String>,
    pub role: StaffRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: String,
    pub staff: ReportStaff,
    #[serde(flatten)]
    pub statistics: StaffStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentalRow {
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub role: StaffRole,
    pub department: String,
    pub total_working_days: u32,
    pub present_days: u32,
    pub absences: u32,
    pub lateness: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentalReport {
    pub month: String,
    pub department: String,
    pub reports: Vec<DepartmentalRow>,
    pub total_staff: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReport {
    pub staff_id: Option<String>,
    pub month: String,
    pub department: Option<String>,
    pub report_type: ReportType,
    pub data: Value,
    pub generated_by: Option<String>,
}

fn month_bounds(month: &str) -> ServiceResult<(chrono::NaiveDate, chrono::NaiveDate)> {
    let first = parse_month(month)
        .ok_or_else(|| ServiceError::InvalidInput(format!("Invalid month: {}", month)))?;
    Ok((first, next_month_start(first)))
}

pub async fn generate_monthly_report(
    backend: &Backend,
    staff_id: &str,
    month: &str,
) -> ServiceResult<MonthlyReport> {
    let statistics = get_staff_statistics(backend, staff_id, month).await?;
    let staff = backend
        .store
        .select(&Query::table("staff").eq("id", staff_id))
        .await
        .and_then(|r| r.maybe_single::<Staff>())
        .map_err(|err| ServiceError::backend("Failed to load staff", err))?
        .ok_or_else(|| ServiceError::NotFound("Staff not found".to_string()))?;
    Ok(MonthlyReport {
        month: month.to_string(),
        staff: ReportStaff {
            name: staff.name,
            department: staff.department,
            role: staff.role,
        },
        statistics,
    })
}

pub async fn generate_departmental_report(
    backend: &Backend,
    department: Option<&str>,
    month: &str,
) -> ServiceResult<DepartmentalReport> {
    let (month_first, next_month) = month_bounds(month)?;
    let department = department.map(str::trim).filter(|d| !d.is_empty());

    let mut query = Query::table("staff").eq("status", "active").order("staff_id", true);
    if let Some(department) = department {
        query = query.eq("department", department);
    }
    let staff: Vec<Staff> = backend
        .store
        .select(&query)
        .await
        .and_then(|r| r.decode())
        .map_err(|err| ServiceError::backend("Failed to load staff", err))?;

    let label = department.unwrap_or(ALL_DEPARTMENTS).to_string();
    if staff.is_empty() {
        return Ok(DepartmentalReport {
            month: month.to_string(),
            department: label,
            reports: Vec::new(),
            total_staff: 0,
        });
    }

    let ids: Vec<String> = staff.iter().map(|s| s.id.clone()).collect();
    let attendance: Vec<AttendanceRecord> = backend
        .store
        .select(
            &Query::table("attendance")
                .in_list("staff_id", ids)
                .gte("date", month_first.to_string())
                .lt("date", next_month.to_string()),
        )
        .await
        .and_then(|r| r.decode())
        .map_err(|err| ServiceError::backend("Failed to load attendance", err))?;

    let mut by_staff: HashMap<&str, (u32, u32)> = HashMap::new();
    for record in &attendance {
        let entry = by_staff.entry(record.staff_id.as_str()).or_default();
        if record.status == ATTENDANCE_PRESENT {
            entry.0 += 1;
        }
        if record.is_late {
            entry.1 += 1;
        }
    }

    let today = backend.clock.today();
    let office_started = office_started_in(backend, month_first).await;
    let reports = staff
        .iter()
        .map(|member| {
            let (present_days, lateness) =
                by_staff.get(member.id.as_str()).copied().unwrap_or_default();
            let total_working_days =
                working_days(month_first, created_on(member, backend), today, office_started);
            DepartmentalRow {
                staff_id: member.staff_id.clone(),
                name: member.name.clone(),
                email: member.email.clone(),
                role: member.role,
                department: member.department_label().to_string(),
                total_working_days,
                present_days,
                absences: if member.is_admin() {
                    0
                } else {
                    total_working_days.saturating_sub(present_days)
                },
                lateness,
            }
        })
        .collect::<Vec<_>>();

    Ok(DepartmentalReport {
        month: month.to_string(),
        department: label,
        total_staff: reports.len() as u64,
        reports,
    })
}

pub async fn save_report(backend: &Backend, report: NewReport) -> ServiceResult<SavedReport> {
    let row = serde_json::to_value(&report)
        .map_err(|err| ServiceError::InvalidInput(format!("Unserializable report: {}", err)))?;
    let rows = backend
        .store
        .insert("reports", vec![row])
        .await
        .and_then(crate::api::decode_rows::<SavedReport>)
        .map_err(|err| ServiceError::write_failed("Report save", "Failed to save report", err))?;
    rows.into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound("Saved report was not returned".to_string()))
}

/// Newest first. `staff_id = None` lists every saved report.
pub async fn get_saved_reports(
    backend: &Backend,
    staff_id: Option<&str>,
    page: PageRequest,
) -> ServiceResult<Paged<SavedReport>> {
    let mut query = Query::table("reports")
        .order("created_at", false)
        .page(page.page, page.limit)
        .count_exact();
    if let Some(staff_id) = staff_id {
        query = query.eq("staff_id", staff_id);
    }
    let result = backend
        .store
        .select(&query)
        .await
        .map_err(|err| ServiceError::backend("Failed to load saved reports", err))?;
    let total = result.total.unwrap_or(result.rows.len() as u64);
    let items = result
        .decode::<SavedReport>()
        .map_err(|err| ServiceError::backend("Failed to read saved reports", err))?;
    Ok(Paged { items, total })
}

pub fn departmental_csv(report: &DepartmentalReport) -> ServiceResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |err: csv::Error| ServiceError::InvalidInput(format!("CSV export failed: {}", err));
    writer.write_record(DEPARTMENTAL_CSV_HEADER).map_err(csv_error)?;
    for row in &report.reports {
        writer
            .write_record([
                row.staff_id.clone(),
                row.name.clone(),
                row.email.clone(),
                row.role.as_str().to_string(),
                row.department.clone(),
                row.total_working_days.to_string(),
                row.present_days.to_string(),
                row.absences.to_string(),
                row.lateness.to_string(),
            ])
            .map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ServiceError::InvalidInput(format!("CSV export failed: {}", err)))?;
    String::from_utf8(bytes)
        .map_err(|err| ServiceError::InvalidInput(format!("CSV export failed: {}", err)))
}

pub fn report_filename(report: &DepartmentalReport) -> String {
    let scope = report
        .department
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("lg-qams-report-{}-{}.csv", scope, report.month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, department: &str) -> DepartmentalRow {
        DepartmentalRow {
            staff_id: code.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: StaffRole::Staff,
            department: department.to_string(),
            total_working_days: 5,
            present_days: 4,
            absences: 1,
            lateness: 2,
        }
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let report = DepartmentalReport {
            month: "2025-03".into(),
            department: ALL_DEPARTMENTS.into(),
            reports: vec![row("STF001", "Ada", "Ops, North")],
            total_staff: 1,
        };
        let csv = departmental_csv(&report).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Staff ID,Name,Email,Role,Department,Working Days,Present Days,Absences,Lateness")
        );
        assert_eq!(
            lines.next(),
            Some("STF001,Ada,ada@example.com,Staff,\"Ops, North\",5,4,1,2")
        );
    }

    #[test]
    fn filename_names_scope_and_month() {
        let report = DepartmentalReport {
            month: "2025-03".into(),
            department: ALL_DEPARTMENTS.into(),
            reports: vec![],
            total_staff: 0,
        };
        assert_eq!(report_filename(&report), "lg-qams-report-all-departments-2025-03.csv");
    }

    #[test]
    fn monthly_report_serializes_flat_camel_case() {
        let report = MonthlyReport {
            month: "2025-03".into(),
            staff: ReportStaff {
                name: "Ada".into(),
                department: None,
                role: StaffRole::Staff,
            },
            statistics: StaffStatistics {
                total_working_days: 5,
                present_days: 5,
                absences: 0,
                lateness: 1,
                average_check_in: "08:05".into(),
                average_check_out: "N/A".into(),
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["totalWorkingDays"], 5);
        assert_eq!(value["averageCheckOut"], "N/A");
        assert_eq!(value["staff"]["name"], "Ada");
    }
}
