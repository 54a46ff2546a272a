use chrono::NaiveDate;
use serde_json::Value;

use crate::api::{ReportType, StaffRole};
use crate::services::{
    attendance::AttendanceFilter,
    restore::RestoreStats,
    settings::OfficeHours,
    staff::NewStaff,
    PageRequest,
};
use crate::utils::time::{parse_hhmm, parse_month};

pub const PAGE_SIZE: u64 = 10;
/// Enough to list every staff member in a picker.
pub const ALL_STAFF_LIMIT: u64 = 1000;

pub fn long_date_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `2025-03` → `March 2025`; unparseable months pass through.
pub fn month_long_label(month: &str) -> String {
    parse_month(month)
        .map(|first| first.format("%B %Y").to_string())
        .unwrap_or_else(|| month.to_string())
}

pub fn report_type_title(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Monthly => "Monthly Report",
        ReportType::Individual => "Individual Staff Report",
        ReportType::Departmental => "Departmental Report",
    }
}

pub fn report_type_value(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Monthly => "monthly",
        ReportType::Individual => "individual",
        ReportType::Departmental => "departmental",
    }
}

pub fn parse_report_type(value: &str) -> Option<ReportType> {
    match value {
        "monthly" => Some(ReportType::Monthly),
        "individual" => Some(ReportType::Individual),
        "departmental" => Some(ReportType::Departmental),
        _ => None,
    }
}

pub fn report_type_options() -> Vec<(String, String)> {
    [ReportType::Monthly, ReportType::Individual, ReportType::Departmental]
        .into_iter()
        .map(|t| (report_type_value(t).to_string(), report_type_title(t).to_string()))
        .collect()
}

/// Select options led by an "All Departments" entry with an empty value.
pub fn department_options(departments: &[String]) -> Vec<(String, String)> {
    std::iter::once((String::new(), "All Departments".to_string()))
        .chain(departments.iter().map(|d| (d.clone(), d.clone())))
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Values of the attendance filter form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilterForm {
    pub start_date: String,
    pub end_date: String,
    pub department: String,
    pub staff_id: String,
}

impl AttendanceFilterForm {
    pub fn to_filter(&self, page: u64) -> Result<AttendanceFilter, String> {
        let date = |value: &str, label: &str| match non_empty(value) {
            None => Ok(None),
            Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| format!("Invalid {} date", label)),
        };
        let start_date = date(&self.start_date, "start")?;
        let end_date = date(&self.end_date, "end")?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err("Start date must be on or before end date".to_string());
            }
        }
        Ok(AttendanceFilter {
            start_date,
            end_date,
            department: non_empty(&self.department),
            staff_id: non_empty(&self.staff_id),
            page: PageRequest::new(page, PAGE_SIZE),
        })
    }
}

/// Values of the add-staff form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffForm {
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: String,
}

impl StaffForm {
    pub fn to_new_staff(&self) -> NewStaff {
        NewStaff {
            staff_id: non_empty(&self.staff_id),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            department: non_empty(&self.department),
            role: if self.role == StaffRole::Admin.as_str() {
                StaffRole::Admin
            } else {
                StaffRole::Staff
            },
        }
    }
}

pub fn role_options() -> Vec<(String, String)> {
    [StaffRole::Staff, StaffRole::Admin]
        .into_iter()
        .map(|r| (r.as_str().to_string(), r.as_str().to_string()))
        .collect()
}

pub fn parse_office_hours(start: &str, end: &str, threshold: &str) -> Result<OfficeHours, String> {
    let start = parse_hhmm(start).ok_or("Office start time must be HH:MM")?;
    let end = parse_hhmm(end).ok_or("Office end time must be HH:MM")?;
    let late_threshold_minutes = threshold
        .trim()
        .parse::<u32>()
        .map_err(|_| "Late threshold must be a whole number of minutes".to_string())?;
    Ok(OfficeHours {
        start,
        end,
        late_threshold_minutes,
    })
}

pub fn parse_backup_text(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|_| "Invalid JSON file".to_string())
}

pub fn restore_summary(stats: &RestoreStats) -> String {
    let tables = [
        ("Staff", stats.staff),
        ("Attendance", stats.attendance),
        ("Settings", stats.settings),
        ("Reports", stats.reports),
    ];
    let parts: Vec<String> = tables
        .iter()
        .map(|(label, t)| {
            let mut part = format!("{}: {} inserted, {} updated", label, t.inserted, t.updated);
            if t.errors > 0 {
                part.push_str(&format!(", {} errors", t.errors));
            }
            part
        })
        .collect();
    format!("Restore complete. {}", parts.join("; "))
}
