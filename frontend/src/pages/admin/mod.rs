//! Administrator pages. Data calls go through `repository`; the services
//! re-check the admin role behind the route guard.

pub mod repository;
pub mod utils;
pub mod view_model;

mod attendance;
mod dashboard;
mod reports;
mod settings;
mod staff;

pub use attendance::AdminAttendancePage;
pub use dashboard::AdminDashboardPage;
pub use reports::AdminReportsPage;
pub use settings::AdminSettingsPage;
pub use staff::AdminStaffPage;
