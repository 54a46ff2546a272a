use leptos::*;

use crate::router::{Page, RouteMatch};

pub mod about;
pub mod admin;
pub mod checkin;
pub mod home;
pub mod login;
pub mod not_found;
pub mod scan;
pub mod scan_success;
pub mod staff;

use about::AboutPage;
use admin::{AdminAttendancePage, AdminDashboardPage, AdminReportsPage, AdminSettingsPage, AdminStaffPage};
use checkin::CheckInPage;
use home::HomePage;
use login::LoginPage;
use not_found::NotFoundPage;
use scan::ScanPage;
use scan_success::ScanSuccessPage;
use staff::{StaffAttendancePage, StaffDashboardPage, StaffProfilePage, StaffReportsPage};

/// View for a resolved route.
pub fn render_page(matched: RouteMatch) -> View {
    match matched.page {
        Page::Home => view! { <HomePage/> }.into_view(),
        Page::About => view! { <AboutPage/> }.into_view(),
        Page::Scan => view! { <ScanPage/> }.into_view(),
        Page::CheckIn => view! { <CheckInPage matched=matched/> }.into_view(),
        Page::ScanSuccess => view! { <ScanSuccessPage matched=matched/> }.into_view(),
        Page::Login => view! { <LoginPage matched=matched/> }.into_view(),
        Page::StaffDashboard => view! { <StaffDashboardPage/> }.into_view(),
        Page::StaffAttendance => view! { <StaffAttendancePage/> }.into_view(),
        Page::StaffReports => view! { <StaffReportsPage/> }.into_view(),
        Page::StaffProfile => view! { <StaffProfilePage/> }.into_view(),
        Page::AdminDashboard => view! { <AdminDashboardPage/> }.into_view(),
        Page::AdminStaff => view! { <AdminStaffPage/> }.into_view(),
        Page::AdminAttendance => view! { <AdminAttendancePage/> }.into_view(),
        Page::AdminReports => view! { <AdminReportsPage/> }.into_view(),
        Page::AdminSettings => view! { <AdminSettingsPage/> }.into_view(),
        Page::NotFound => view! { <NotFoundPage/> }.into_view(),
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_with, ssr::render_to_string};

    fn render(page: Page, target: &str) -> String {
        let path = target.split('?').next().unwrap_or(target).to_string();
        let target = target.to_string();
        render_to_string(move || {
            provide_session_with(NavState::SignedOut);
            render_page(RouteMatch::new(page, &path, &target))
        })
    }

    #[test]
    fn public_pages_render() {
        assert!(render(Page::Home, "/").contains("/scan"));
        assert!(render(Page::Scan, "/scan").contains("Scan QR Code"));
        assert!(render(Page::NotFound, "/nope").contains("Page Not Found"));
    }

    #[test]
    fn query_driven_pages_read_their_parameters() {
        let html = render(Page::ScanSuccess, "/scan/success?name=Ada&time=09%3A00&action=Check-In");
        assert!(html.contains("Ada"));
        assert!(html.contains("09:00"));
        let html = render(Page::CheckIn, "/checkin?email=ada%40example.com");
        assert!(html.contains("Staff Check-In"));
    }
}
