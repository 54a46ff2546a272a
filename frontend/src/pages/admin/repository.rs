use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::utils::{parse_backup_text, ALL_STAFF_LIMIT, PAGE_SIZE};
use crate::api::{AttendanceWithStaff, Backend, ReportType, SavedReport, Staff};
use crate::services::{
    attendance::{get_all_attendance, get_today_attendance, AttendanceFilter, TodayOverview},
    auth::require_admin,
    backup::export_data,
    reports::{
        generate_departmental_report, generate_monthly_report, get_saved_reports, save_report,
        DepartmentalReport, MonthlyReport, NewReport,
    },
    restore::{restore_data, RestoreOptions, RestoreStats},
    settings::{
        get_all_settings, get_office_hours, save_office_hours, setting_flag, update_settings,
        OfficeHours, AUTO_REPORTS_KEY, IP_RESTRICTION_KEY,
    },
    staff::{
        create_staff, deactivate_staff, get_all_staff, get_unique_departments, reactivate_staff,
        NewStaff, StaffQuery,
    },
    PageRequest, Paged, ServiceError, ServiceResult,
};

pub async fn load_today(backend: &Backend, page: u64) -> ServiceResult<TodayOverview> {
    get_today_attendance(backend, PageRequest::new(page, PAGE_SIZE)).await
}

pub async fn load_staff(backend: &Backend, page: u64, search: String) -> ServiceResult<Paged<Staff>> {
    let search = Some(search).filter(|s| !s.trim().is_empty());
    get_all_staff(
        backend,
        &StaffQuery {
            page: PageRequest::new(page, PAGE_SIZE),
            search,
        },
    )
    .await
}

pub async fn add_staff(backend: &Backend, new_staff: NewStaff) -> ServiceResult<Staff> {
    create_staff(backend, new_staff).await
}

pub async fn set_active(backend: &Backend, id: &str, active: bool) -> ServiceResult<Staff> {
    if active {
        reactivate_staff(backend, id).await
    } else {
        deactivate_staff(backend, id).await
    }
}

pub async fn load_departments(backend: &Backend) -> ServiceResult<Vec<String>> {
    get_unique_departments(backend).await
}

pub async fn load_attendance(
    backend: &Backend,
    filter: AttendanceFilter,
) -> ServiceResult<Paged<AttendanceWithStaff>> {
    get_all_attendance(backend, &filter).await
}

/// `(uuid, "Name (CODE) - Department")`, sorted by name.
pub async fn staff_choices(backend: &Backend) -> ServiceResult<Vec<(String, String)>> {
    let mut staff = get_all_staff(
        backend,
        &StaffQuery {
            page: PageRequest::new(1, ALL_STAFF_LIMIT),
            search: None,
        },
    )
    .await?
    .items;
    staff.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(staff
        .into_iter()
        .map(|s| {
            let label = format!("{} ({}) - {}", s.name, s.staff_id, s.department_label());
            (s.id, label)
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub month: String,
    pub department: Option<String>,
    /// Staff uuid, only for individual reports.
    pub staff_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedReport {
    Departmental(ReportType, DepartmentalReport),
    Individual {
        staff_id: String,
        report: MonthlyReport,
    },
}

impl GeneratedReport {
    pub fn report_type(&self) -> ReportType {
        match self {
            GeneratedReport::Departmental(report_type, _) => *report_type,
            GeneratedReport::Individual { .. } => ReportType::Individual,
        }
    }

    pub fn month(&self) -> &str {
        match self {
            GeneratedReport::Departmental(_, report) => &report.month,
            GeneratedReport::Individual { report, .. } => &report.month,
        }
    }
}

pub async fn generate(backend: &Backend, request: ReportRequest) -> ServiceResult<GeneratedReport> {
    require_admin(backend).await?;
    match request.report_type {
        ReportType::Individual => {
            let staff_id = request
                .staff_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ServiceError::Validation("Select a staff member".to_string()))?;
            let report = generate_monthly_report(backend, &staff_id, &request.month).await?;
            Ok(GeneratedReport::Individual { staff_id, report })
        }
        report_type => {
            let report =
                generate_departmental_report(backend, request.department.as_deref(), &request.month)
                    .await?;
            Ok(GeneratedReport::Departmental(report_type, report))
        }
    }
}

pub async fn save_generated(backend: &Backend, generated: GeneratedReport) -> ServiceResult<SavedReport> {
    let admin = require_admin(backend).await?;
    let unserializable =
        |err: serde_json::Error| ServiceError::InvalidInput(format!("Unserializable report: {}", err));
    let report = match &generated {
        GeneratedReport::Departmental(report_type, report) => NewReport {
            staff_id: None,
            month: report.month.clone(),
            department: Some(report.department.clone()),
            report_type: *report_type,
            data: serde_json::to_value(report).map_err(unserializable)?,
            generated_by: Some(admin.id),
        },
        GeneratedReport::Individual { staff_id, report } => NewReport {
            staff_id: Some(staff_id.clone()),
            month: report.month.clone(),
            department: report.staff.department.clone(),
            report_type: ReportType::Individual,
            data: serde_json::to_value(report).map_err(unserializable)?,
            generated_by: Some(admin.id),
        },
    };
    save_report(backend, report).await
}

pub async fn load_saved_reports(backend: &Backend, page: u64) -> ServiceResult<Paged<SavedReport>> {
    get_saved_reports(backend, None, PageRequest::new(page, PAGE_SIZE)).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub hours: OfficeHours,
    pub ip_restriction: bool,
    pub auto_reports: bool,
}

/// Falls back to defaults (auto reports on) when settings cannot be read.
pub async fn load_settings(backend: &Backend) -> SettingsSnapshot {
    let hours = get_office_hours(backend).await.unwrap_or_else(|err| {
        log::warn!("using default office hours: {}", err);
        OfficeHours::default()
    });
    match get_all_settings(backend).await {
        Ok(all) => SettingsSnapshot {
            hours,
            ip_restriction: setting_flag(&all, IP_RESTRICTION_KEY),
            auto_reports: setting_flag(&all, AUTO_REPORTS_KEY),
        },
        Err(err) => {
            log::warn!("using default setting flags: {}", err);
            SettingsSnapshot {
                hours,
                ip_restriction: false,
                auto_reports: true,
            }
        }
    }
}

pub async fn save_settings(backend: &Backend, snapshot: SettingsSnapshot) -> ServiceResult<()> {
    save_office_hours(backend, &snapshot.hours).await?;
    let mut flags = BTreeMap::new();
    flags.insert(IP_RESTRICTION_KEY.to_string(), json!(snapshot.ip_restriction.to_string()));
    flags.insert(AUTO_REPORTS_KEY.to_string(), json!(snapshot.auto_reports.to_string()));
    update_settings(backend, flags).await?;
    Ok(())
}

pub async fn export_backup(backend: &Backend) -> ServiceResult<String> {
    require_admin(backend).await?;
    export_data(backend).await
}

pub async fn restore_backup(
    backend: &Backend,
    backup: Value,
    overwrite_existing: bool,
) -> ServiceResult<RestoreStats> {
    restore_data(backend, &backup, RestoreOptions { overwrite_existing }).await
}

pub fn read_backup(text: &str) -> ServiceResult<Value> {
    parse_backup_text(text).map_err(ServiceError::Validation)
}
