use crate::api::{AttendanceRecord, Backend, Staff};
use crate::services::{
    attendance::{get_attendance_by_staff, get_staff_statistics, today_record, DateRange, StaffStatistics},
    auth::{change_password, get_current_user, PasswordChange},
    reports::{generate_monthly_report, get_saved_reports},
    PageRequest, ServiceError, ServiceResult,
};

use super::utils::{current_month, PeriodFilter, ReportSummary};

const RECENT_ATTENDANCE: usize = 5;
const SAVED_REPORTS_SHOWN: u64 = 12;

pub async fn current_staff(backend: &Backend) -> ServiceResult<Staff> {
    get_current_user(backend)
        .await?
        .map(|user| user.staff)
        .ok_or(ServiceError::Unauthorized)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub staff: Staff,
    pub statistics: StaffStatistics,
    pub today: Option<AttendanceRecord>,
    pub recent: Vec<AttendanceRecord>,
}

pub async fn load_dashboard(backend: &Backend) -> ServiceResult<DashboardData> {
    let staff = current_staff(backend).await?;
    let month = current_month(backend.clock.today());
    let statistics = get_staff_statistics(backend, &staff.id, &month).await?;
    let today = today_record(backend, &staff.id).await?;
    let mut recent = get_attendance_by_staff(backend, &staff.id, &DateRange::default()).await?;
    recent.truncate(RECENT_ATTENDANCE);
    Ok(DashboardData {
        staff,
        statistics,
        today,
        recent,
    })
}

pub async fn load_attendance(
    backend: &Backend,
    filter: PeriodFilter,
) -> ServiceResult<Vec<AttendanceRecord>> {
    let staff = current_staff(backend).await?;
    let range = filter.range(backend.clock.today());
    get_attendance_by_staff(backend, &staff.id, &range).await
}

/// The live current-month report first, then saved ones newest first.
pub async fn load_reports(backend: &Backend) -> ServiceResult<Vec<ReportSummary>> {
    let staff = current_staff(backend).await?;
    let month = current_month(backend.clock.today());
    let current = generate_monthly_report(backend, &staff.id, &month).await?;
    let data = serde_json::to_value(&current)
        .map_err(|err| ServiceError::InvalidInput(format!("Unserializable report: {}", err)))?;
    let mut summaries = vec![ReportSummary::from_data(&month, &data)];
    let saved = get_saved_reports(backend, Some(&staff.id), PageRequest::new(1, SAVED_REPORTS_SHOWN)).await?;
    summaries.extend(saved.items.iter().map(ReportSummary::from_saved));
    Ok(summaries)
}

pub async fn update_own_password(backend: &Backend, change: PasswordChange) -> ServiceResult<()> {
    change_password(backend, &change).await
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::test_support::fixtures::attendance_row;
    use crate::services::testing::{memory_at, with_staff};
    use serde_json::json;

    #[tokio::test]
    async fn dashboard_collects_stats_today_and_recent() {
        let memory = memory_at(2025, 3, 12, 10, 0);
        with_staff(&memory, "s1", "STF001", "Ada");
        memory.seed(
            "attendance",
            (3..=12)
                .map(|d| {
                    let date = format!("2025-03-{:02}", d);
                    let check_in = format!("{}T08:00:00Z", date);
                    attendance_row(&format!("a{}", d), "s1", &date, Some(&check_in), None, false)
                })
                .collect(),
        );
        let data = load_dashboard(&memory.backend()).await.unwrap();
        assert_eq!(data.staff.staff_id, "STF001");
        assert_eq!(data.recent.len(), 5);
        assert_eq!(data.recent[0].date.to_string(), "2025-03-12");
        assert!(data.today.is_some());
    }

    #[tokio::test]
    async fn signed_out_visitors_are_unauthorized() {
        let memory = memory_at(2025, 3, 12, 10, 0);
        assert_eq!(
            load_attendance(&memory.backend(), PeriodFilter::All).await,
            Err(ServiceError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn weekly_filter_limits_dates() {
        let memory = memory_at(2025, 3, 12, 10, 0);
        with_staff(&memory, "s1", "STF001", "Ada");
        memory.seed(
            "attendance",
            vec![
                attendance_row("a1", "s1", "2025-03-07", Some("2025-03-07T08:00:00Z"), None, false),
                attendance_row("a2", "s1", "2025-03-10", Some("2025-03-10T08:00:00Z"), None, true),
            ],
        );
        let records = load_attendance(&memory.backend(), PeriodFilter::Weekly).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_late);
    }

    #[tokio::test]
    async fn reports_start_with_current_month() {
        let memory = memory_at(2025, 3, 12, 10, 0);
        with_staff(&memory, "s1", "STF001", "Ada");
        memory.seed(
            "reports",
            vec![json!({
                "id": "r1",
                "staff_id": "s1",
                "month": "2025-02",
                "report_type": "monthly",
                "data": {"totalWorkingDays": 20, "presentDays": 19, "absences": 1, "averageCheckIn": "08:01"},
                "created_at": "2025-03-01T00:00:00Z"
            })],
        );
        let reports = load_reports(&memory.backend()).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].month, "2025-03");
        assert_eq!(reports[1].present_days, 19);
    }
}
