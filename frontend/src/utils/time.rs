use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Source of "now" for every business rule that depends on the wall clock.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
    fn time_zone(&self) -> Tz;

    fn now(&self) -> DateTime<Tz> {
        self.now_utc().with_timezone(&self.time_zone())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn minutes_since_midnight(&self) -> u32 {
        let now = self.now();
        now.hour() * 60 + now.minute()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn time_zone(&self) -> Tz {
        self.tz
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    tz: Tz,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>, tz: Tz) -> Self {
        Self { instant, tz }
    }

    /// Builds a clock from a local wall-clock reading in `tz`.
    pub fn at_local(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> Self {
        let naive = date
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| date.and_hms_opt(0, 0, 0).unwrap_or_default());
        let instant = tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive));
        Self { instant, tz }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.instant
    }

    fn time_zone(&self) -> Tz {
        self.tz
    }
}

pub fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Parses `HH:MM` (seconds are tolerated and ignored).
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

/// Formats a stored timestamp as local `HH:MM`.
pub fn local_time_label(value: &DateTime<Utc>, tz: &Tz) -> String {
    let local = value.with_timezone(tz);
    format!("{:02}:{:02}", local.hour(), local.minute())
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d").ok()
}

pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// First day of the month after `first`.
pub fn next_month_start(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first)
}

pub fn days_in_month(first: NaiveDate) -> u32 {
    let next = next_month_start(first);
    (next - first).num_days() as u32
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}
