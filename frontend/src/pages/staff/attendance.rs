use leptos::*;

use super::components::AttendanceTable;
use super::utils::{attendance_row, paginate, total_pages, PeriodFilter, ITEMS_PER_PAGE};
use super::view_model::{use_attendance_view_model, AttendanceViewModel};
use crate::api::AttendanceRecord;
use crate::components::{
    common::{Button, ButtonVariant},
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading},
    pagination::Pagination,
};
use crate::state::use_session;

#[component]
pub fn StaffAttendancePage() -> impl IntoView {
    let vm = use_attendance_view_model();
    view! {
        <Layout>
            <PageHeading title="My Attendance" subtitle="Your check-in and check-out history"/>
            <FilterBar vm=vm/>
            {move || match vm.records.get() {
                None => view! { <LoadingSpinner/> }.into_view(),
                Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                Some(Ok(records)) => view! { <AttendanceList vm=vm records=records/> }.into_view(),
            }}
        </Layout>
    }
}

#[component]
fn FilterBar(vm: AttendanceViewModel) -> impl IntoView {
    view! {
        <div class="flex flex-wrap gap-2 mb-4">
            {PeriodFilter::ALL
                .into_iter()
                .map(|filter| {
                    let variant = move || {
                        if vm.filter.get() == filter {
                            ButtonVariant::Primary
                        } else {
                            ButtonVariant::Outline
                        }
                    };
                    move || view! {
                        <Button variant=variant() attr:type="button" on:click=move |_| vm.select(filter)>
                            {filter.label()}
                        </Button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn AttendanceList(vm: AttendanceViewModel, records: Vec<AttendanceRecord>) -> impl IntoView {
    let tz = use_session().backend.clock.time_zone();
    let count = records.len();
    let rows = store_value(records.iter().map(|r| attendance_row(r, &tz)).collect::<Vec<_>>());
    let pages = total_pages(count, ITEMS_PER_PAGE);
    view! {
        {move || {
            let visible = rows.with_value(|rows| paginate(rows, vm.page.get(), ITEMS_PER_PAGE));
            view! { <AttendanceTable rows=visible/> }
        }}
        <Pagination
            page=vm.page
            total_pages=Signal::derive(move || pages)
            total_records=Signal::derive(move || count as u64)
            on_change=Callback::new(move |page| vm.page.set(page))
        />
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::test_support::fixtures::attendance_row as record_row;
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_with, ssr::render_to_string};

    fn records(n: u32) -> Vec<AttendanceRecord> {
        (1..=n)
            .map(|d| {
                let date = format!("2025-03-{:02}", d);
                let check_in = format!("{}T08:00:00Z", date);
                serde_json::from_value(record_row(&format!("a{}", d), "s1", &date, Some(&check_in), None, d % 2 == 0))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn renders_filter_buttons() {
        let html = render_to_string(move || {
            provide_session_with(NavState::SignedOut);
            view! { <StaffAttendancePage/> }
        });
        for label in ["All", "Today", "This Week", "This Month"] {
            assert!(html.contains(label), "missing {}", label);
        }
    }

    #[test]
    fn list_shows_first_page_only() {
        let html = render_to_string(move || {
            provide_session_with(NavState::SignedOut);
            let vm = use_attendance_view_model();
            view! { <AttendanceList vm=vm records=records(12)/> }
        });
        assert!(html.contains("2025-03-10"));
        assert!(!html.contains("2025-03-11"));
        assert!(html.contains("Page 1 of 2"));
    }
}
