//! Pages for signed-in staff: dashboard, own attendance, reports and profile.

pub mod components;
pub mod repository;
pub mod utils;
pub mod view_model;

mod attendance;
mod dashboard;
mod profile;
mod reports;

pub use attendance::StaffAttendancePage;
pub use dashboard::StaffDashboardPage;
pub use profile::StaffProfilePage;
pub use reports::StaffReportsPage;
