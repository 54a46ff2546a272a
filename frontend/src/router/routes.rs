use super::path::{parse_query, query_of};

/// Every screen the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    About,
    Scan,
    CheckIn,
    ScanSuccess,
    Login,
    StaffDashboard,
    StaffAttendance,
    StaffReports,
    StaffProfile,
    AdminDashboard,
    AdminStaff,
    AdminAttendance,
    AdminReports,
    AdminSettings,
    NotFound,
}

pub const DEFAULT_TITLE: &str = "LG QAMS";
pub const NOT_FOUND_TITLE: &str = "404 - Not Found";

/// `(path, page, title)` for every registered route.
pub const APP_ROUTES: &[(&str, Page, &str)] = &[
    ("/", Page::Home, "Home - LG QAMS"),
    ("/home", Page::Home, "Home - LG QAMS"),
    ("/about", Page::About, "About - LG QAMS"),
    ("/scan", Page::Scan, "Scan QR - LG QAMS"),
    ("/checkin", Page::CheckIn, "Check In - LG QAMS"),
    ("/scan/success", Page::ScanSuccess, "Success - LG QAMS"),
    ("/login", Page::Login, "Login - LG QAMS"),
    ("/staff/dashboard", Page::StaffDashboard, "Dashboard - LG QAMS"),
    ("/staff/attendance", Page::StaffAttendance, "My Attendance - LG QAMS"),
    ("/staff/reports", Page::StaffReports, "My Reports - LG QAMS"),
    ("/staff/profile", Page::StaffProfile, "Profile - LG QAMS"),
    ("/admin/dashboard", Page::AdminDashboard, "Admin Dashboard - LG QAMS"),
    ("/admin/staff", Page::AdminStaff, "Staff Management - LG QAMS"),
    ("/admin/attendance", Page::AdminAttendance, "Attendance - LG QAMS"),
    ("/admin/reports", Page::AdminReports, "Reports - LG QAMS"),
    ("/admin/settings", Page::AdminSettings, "Settings - LG QAMS"),
];

/// A resolved navigation handed to the outlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub page: Page,
    /// Normalized path.
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RouteMatch {
    pub fn new(page: Page, path: &str, target: &str) -> Self {
        Self {
            page,
            path: path.to_string(),
            query: query_of(target).map(parse_query).unwrap_or_default(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}
