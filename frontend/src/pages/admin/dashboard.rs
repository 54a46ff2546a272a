use leptos::*;

use super::utils::{long_date_label, PAGE_SIZE};
use super::view_model::{use_dashboard_view_model, DashboardViewModel};
use crate::components::{
    cards::{CardColor, StatCard},
    empty_state::EmptyState,
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading},
    pagination::Pagination,
};
use crate::services::attendance::{TodayOverview, TodayStaffEntry};
use crate::state::use_session;

const HEAD_CELL: &str = "px-4 py-3 text-left text-xs font-medium text-fg-muted uppercase tracking-wider";
const CELL: &str = "px-4 py-3 whitespace-nowrap text-sm text-fg";

#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let vm = use_dashboard_view_model();
    let today = long_date_label(use_session().backend.clock.today());
    view! {
        <Layout>
            <PageHeading title="Admin Dashboard" subtitle=today/>
            {move || match vm.overview.get() {
                None => view! { <LoadingSpinner/> }.into_view(),
                Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                Some(Ok(overview)) => view! { <TodayContent vm=vm overview=overview/> }.into_view(),
            }}
        </Layout>
    }
}

#[component]
fn TodayContent(vm: DashboardViewModel, overview: TodayOverview) -> impl IntoView {
    let total_records = overview.total_staff_count;
    let total_pages = total_records.div_ceil(PAGE_SIZE).max(1);
    view! {
        <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-8">
            <StatCard title="Present Today" value=overview.present.to_string() color=CardColor::Success/>
            <StatCard title="Absent Today" value=overview.absent.to_string() color=CardColor::Danger/>
            <StatCard title="Late Today" value=overview.late.to_string() color=CardColor::Warning/>
            <StatCard title="Total Staff" value=overview.total.to_string() color=CardColor::Info/>
        </div>
        <h3 class="text-lg font-semibold text-fg mb-3">"Today's Attendance"</h3>
        <TodayTable entries=overview.staff/>
        <Pagination
            page=vm.page
            total_pages=Signal::derive(move || total_pages)
            total_records=Signal::derive(move || total_records)
            on_change=Callback::new(move |page| vm.page.set(page))
        />
    }
}

#[component]
fn TodayTable(entries: Vec<TodayStaffEntry>) -> impl IntoView {
    if entries.is_empty() {
        return view! { <EmptyState title="No attendance records for today"/> }.into_view();
    }
    view! {
        <div class="overflow-x-auto rounded-lg border border-border">
            <table class="min-w-full divide-y divide-border">
                <thead class="bg-surface-muted">
                    <tr>
                        <th class=HEAD_CELL>"Name"</th>
                        <th class=HEAD_CELL>"Department"</th>
                        <th class=HEAD_CELL>"Check In"</th>
                        <th class=HEAD_CELL>"Check Out"</th>
                        <th class=HEAD_CELL>"Status"</th>
                    </tr>
                </thead>
                <tbody class="bg-surface-elevated divide-y divide-border">
                    {entries
                        .into_iter()
                        .map(|entry| {
                            let badge = if entry.status == "Present" {
                                "bg-status-success-bg text-status-success-text"
                            } else {
                                "bg-surface-muted text-fg-muted"
                            };
                            view! {
                                <tr>
                                    <td class=CELL>{entry.name}</td>
                                    <td class=CELL>{entry.department}</td>
                                    <td class=CELL>{entry.check_in.unwrap_or_else(|| "-".into())}</td>
                                    <td class=CELL>{entry.check_out.unwrap_or_else(|| "-".into())}</td>
                                    <td class=CELL>
                                        <span class=format!("inline-flex px-2 py-0.5 rounded-full text-xs font-semibold {}", badge)>
                                            {entry.status}
                                        </span>
                                    </td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
    .into_view()
}
