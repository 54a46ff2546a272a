use leptos::*;

use super::utils::{department_options, PAGE_SIZE};
use super::view_model::{use_attendance_view_model, AttendanceViewModel};
use crate::api::AttendanceWithStaff;
use crate::components::{
    common::{Button, ButtonVariant},
    empty_state::EmptyState,
    forms::{SelectField, TextField},
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading},
    pagination::Pagination,
};
use crate::pages::staff::components::StatusBadge;
use crate::services::Paged;
use crate::state::use_session;
use crate::utils::time::local_time_label;

const HEAD_CELL: &str = "px-4 py-3 text-left text-xs font-medium text-fg-muted uppercase tracking-wider";
const CELL: &str = "px-4 py-3 whitespace-nowrap text-sm text-fg";

#[component]
pub fn AdminAttendancePage() -> impl IntoView {
    let vm = use_attendance_view_model();
    view! {
        <Layout>
            <PageHeading title="Attendance Records" subtitle="Filter by date, department or staff"/>
            <FilterForm vm=vm/>
            {move || match vm.records.get() {
                None => view! { <LoadingSpinner/> }.into_view(),
                Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                Some(Ok(paged)) => view! { <RecordsTable vm=vm paged=paged/> }.into_view(),
            }}
        </Layout>
    }
}

#[component]
fn FilterForm(vm: AttendanceViewModel) -> impl IntoView {
    let options = Signal::derive(move || {
        department_options(&vm.departments.get().unwrap_or_default())
    });
    view! {
        <form
            class="bg-surface-elevated shadow rounded-lg p-4 mb-6 grid grid-cols-1 md:grid-cols-5 gap-4"
            on:submit=move |ev| {
                ev.prevent_default();
                vm.apply();
            }
        >
            <TextField id="filter-start" label="Start Date" value=vm.start_date input_type="date"/>
            <TextField id="filter-end" label="End Date" value=vm.end_date input_type="date"/>
            <SelectField id="filter-department" label="Department" value=vm.department options=options/>
            <TextField id="filter-staff" label="Staff ID" value=vm.staff_id placeholder="STF001"/>
            <div class="flex items-end gap-2">
                <Button attr:type="submit">"Apply"</Button>
                <Button variant=ButtonVariant::Outline attr:type="button" on:click=move |_| vm.clear()>
                    "Clear"
                </Button>
            </div>
        </form>
        {move || vm.filter_error.get().map(|msg| view! { <ErrorMessage message=msg/> })}
    }
}

#[component]
fn RecordsTable(vm: AttendanceViewModel, paged: Paged<AttendanceWithStaff>) -> impl IntoView {
    let tz = use_session().backend.clock.time_zone();
    let total_records = paged.total;
    let total_pages = paged.total_pages(PAGE_SIZE);
    if paged.items.is_empty() {
        return view! { <EmptyState title="No attendance records found" description="Try widening the filters"/> }
            .into_view();
    }
    let time = move |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| local_time_label(&t, &tz)).unwrap_or_else(|| "-".to_string())
    };
    view! {
        <div class="overflow-x-auto rounded-lg border border-border">
            <table class="min-w-full divide-y divide-border">
                <thead class="bg-surface-muted">
                    <tr>
                        <th class=HEAD_CELL>"Date"</th>
                        <th class=HEAD_CELL>"Staff ID"</th>
                        <th class=HEAD_CELL>"Name"</th>
                        <th class=HEAD_CELL>"Department"</th>
                        <th class=HEAD_CELL>"Check In"</th>
                        <th class=HEAD_CELL>"Check Out"</th>
                        <th class=HEAD_CELL>"Status"</th>
                    </tr>
                </thead>
                <tbody class="bg-surface-elevated divide-y divide-border">
                    {paged
                        .items
                        .into_iter()
                        .map(|row| {
                            let (code, name, department) = match &row.staff {
                                Some(s) => (
                                    s.staff_id.clone(),
                                    s.name.clone(),
                                    s.department.clone().filter(|d| !d.is_empty()).unwrap_or_else(|| "N/A".into()),
                                ),
                                None => ("-".into(), "Unknown".into(), "N/A".into()),
                            };
                            view! {
                                <tr>
                                    <td class=CELL>{row.record.date.to_string()}</td>
                                    <td class=CELL>{code}</td>
                                    <td class=CELL>{name}</td>
                                    <td class=CELL>{department}</td>
                                    <td class=CELL>{time(row.record.check_in_time)}</td>
                                    <td class=CELL>{time(row.record.check_out_time)}</td>
                                    <td class=CELL><StatusBadge late=row.record.is_late/></td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
        <Pagination
            page=vm.page
            total_pages=Signal::derive(move || total_pages)
            total_records=Signal::derive(move || total_records)
            on_change=Callback::new(move |page| vm.page.set(page))
        />
    }
    .into_view()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::{test_support::fixtures::attendance_row, StaffRole, StaffSummary};
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_with, ssr::render_to_string};

    fn admin() -> NavState {
        NavState::SignedIn {
            name: "Grace".into(),
            role: StaffRole::Admin,
        }
    }

    fn joined(id: &str, staff: Option<StaffSummary>) -> AttendanceWithStaff {
        AttendanceWithStaff {
            record: serde_json::from_value(attendance_row(
                id,
                "s1",
                "2025-03-07",
                Some("2025-03-07T08:20:00Z"),
                Some("2025-03-07T17:00:00Z"),
                true,
            ))
            .unwrap(),
            staff,
        }
    }

    #[test]
    fn rows_join_staff_columns() {
        let html = render_to_string(move || {
            provide_session_with(admin());
            let vm = use_attendance_view_model();
            let paged = Paged {
                items: vec![
                    joined(
                        "r1",
                        Some(StaffSummary {
                            id: "s1".into(),
                            staff_id: "STF001".into(),
                            name: "Ada".into(),
                            email: "ada@example.com".into(),
                            department: None,
                        }),
                    ),
                    joined("r2", None),
                ],
                total: 2,
            };
            view! { <RecordsTable vm=vm paged=paged/> }
        });
        assert!(html.contains("STF001"));
        assert!(html.contains("08:20"));
        assert!(html.contains("17:00"));
        assert!(html.contains("Unknown"));
        assert!(html.contains("Late"));
    }

    #[test]
    fn filter_form_lists_all_departments_option() {
        let html = render_to_string(move || {
            provide_session_with(admin());
            view! { <AdminAttendancePage/> }
        });
        assert!(html.contains("All Departments"));
        assert!(html.contains("type=\"date\""));
    }
}
