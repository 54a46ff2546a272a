use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use serde_json::Value;

use crate::api::{AttendanceRecord, SavedReport};
use crate::services::attendance::DateRange;
use crate::utils::time::{local_time_label, month_label};

pub const ITEMS_PER_PAGE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodFilter {
    #[default]
    All,
    Daily,
    Weekly,
    Monthly,
}

impl PeriodFilter {
    pub const ALL: [PeriodFilter; 4] = [
        PeriodFilter::All,
        PeriodFilter::Daily,
        PeriodFilter::Weekly,
        PeriodFilter::Monthly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PeriodFilter::All => "All",
            PeriodFilter::Daily => "Today",
            PeriodFilter::Weekly => "This Week",
            PeriodFilter::Monthly => "This Month",
        }
    }

    /// Weeks start on Sunday.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let start = match self {
            PeriodFilter::All => return DateRange::default(),
            PeriodFilter::Daily => today,
            PeriodFilter::Weekly => {
                today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
            }
            PeriodFilter::Monthly => today.with_day(1).unwrap_or(today),
        };
        DateRange {
            start_date: Some(start),
            end_date: Some(today),
        }
    }
}

pub fn current_month(today: NaiveDate) -> String {
    month_label(today)
}

/// One page of `items`, 1-based.
pub fn paginate<T: Clone>(items: &[T], page: u64, per_page: u64) -> Vec<T> {
    let per_page = per_page.max(1) as usize;
    let start = (page.max(1) as usize - 1) * per_page;
    items.iter().skip(start).take(per_page).cloned().collect()
}

pub fn total_pages(count: usize, per_page: u64) -> u64 {
    (count as u64).div_ceil(per_page.max(1)).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    pub date: String,
    pub check_in: String,
    pub check_out: String,
    pub late: bool,
}

pub fn attendance_row(record: &AttendanceRecord, tz: &Tz) -> AttendanceRow {
    let label = |t: &Option<chrono::DateTime<chrono::Utc>>| {
        t.as_ref()
            .map(|t| local_time_label(t, tz))
            .unwrap_or_else(|| "-".to_string())
    };
    AttendanceRow {
        date: record.date.to_string(),
        check_in: label(&record.check_in_time),
        check_out: label(&record.check_out_time),
        late: record.is_late,
    }
}

/// Headline figures of a report, live or saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub month: String,
    pub working_days: u64,
    pub present_days: u64,
    pub absences: u64,
    pub average_check_in: String,
}

impl ReportSummary {
    pub fn from_data(month: &str, data: &Value) -> Self {
        let number = |key: &str| data.get(key).and_then(Value::as_u64).unwrap_or(0);
        Self {
            month: month.to_string(),
            working_days: number("totalWorkingDays"),
            present_days: number("presentDays"),
            absences: number("absences"),
            average_check_in: data
                .get("averageCheckIn")
                .and_then(Value::as_str)
                .unwrap_or("N/A")
                .to_string(),
        }
    }

    pub fn from_saved(report: &SavedReport) -> Self {
        Self::from_data(&report.month, &report.data)
    }
}
