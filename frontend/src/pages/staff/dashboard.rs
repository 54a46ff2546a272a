use leptos::*;

use super::components::AttendanceTable;
use super::repository::DashboardData;
use super::utils::attendance_row;
use super::view_model::use_dashboard_resource;
use crate::components::{
    cards::{CardColor, StatCard},
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading},
};
use crate::state::use_session;
use crate::utils::time::local_time_label;

#[component]
pub fn StaffDashboardPage() -> impl IntoView {
    let resource = use_dashboard_resource();
    view! {
        <Layout>
            {move || match resource.get() {
                None => view! { <LoadingSpinner/> }.into_view(),
                Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                Some(Ok(data)) => view! { <DashboardContent data=data/> }.into_view(),
            }}
        </Layout>
    }
}

fn today_status(data: &DashboardData, tz: &chrono_tz::Tz) -> String {
    match &data.today {
        Some(record) => match (record.check_in_time, record.check_out_time) {
            (Some(_), Some(out)) => format!("Checked out at {}", local_time_label(&out, tz)),
            (Some(check_in), None) => format!("Checked in at {}", local_time_label(&check_in, tz)),
            _ => "Not checked in yet".to_string(),
        },
        None => "Not checked in yet".to_string(),
    }
}

#[component]
fn DashboardContent(data: DashboardData) -> impl IntoView {
    let tz = use_session().backend.clock.time_zone();
    let stats = data.statistics.clone();
    let status = today_status(&data, &tz);
    let rows = data.recent.iter().map(|r| attendance_row(r, &tz)).collect::<Vec<_>>();
    view! {
        <PageHeading
            title=format!("Welcome, {}", data.staff.name)
            subtitle=format!("{} · {}", data.staff.staff_id, data.staff.department_label())
        />
        <div class="mb-6 rounded-lg border border-border bg-surface-elevated p-4 text-sm text-fg">
            <span class="font-medium">"Today: "</span>
            {status}
        </div>
        <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-8">
            <StatCard title="Present Days" value=stats.present_days.to_string() color=CardColor::Success/>
            <StatCard title="Absences" value=stats.absences.to_string() color=CardColor::Danger/>
            <StatCard title="Lateness" value=stats.lateness.to_string() color=CardColor::Warning/>
            <StatCard title="Total Working Days" value=stats.total_working_days.to_string() color=CardColor::Info/>
        </div>
        <div class="flex items-center justify-between mb-3">
            <h3 class="text-lg font-semibold text-fg">"Recent Attendance"</h3>
            <a href="/staff/attendance" data-router="true" class="text-sm text-action-primary-bg hover:underline">
                "View all"
            </a>
        </div>
        <AttendanceTable rows=rows/>
    }
}
