use leptos::*;

use super::repository::GeneratedReport;
use super::utils::{department_options, month_long_label, report_type_options, report_type_title, PAGE_SIZE};
use super::view_model::{use_reports_view_model, ReportsViewModel};
use crate::api::{ReportType, SavedReport};
use crate::components::{
    cards::{CardColor, StatCard},
    common::{Button, ButtonVariant},
    empty_state::EmptyState,
    error::InlineErrorMessage,
    forms::{SelectField, TextField},
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading, SuccessMessage},
    pagination::Pagination,
};
use crate::services::{
    reports::{departmental_csv, report_filename, DepartmentalReport, MonthlyReport},
    Paged,
};
use crate::utils::download::{trigger_download, CSV_MIME};

const HEAD_CELL: &str = "px-4 py-3 text-left text-xs font-medium text-fg-muted uppercase tracking-wider";
const CELL: &str = "px-4 py-3 whitespace-nowrap text-sm text-fg";

fn download_csv(report: &DepartmentalReport) -> Result<(), String> {
    let csv = departmental_csv(report).map_err(|err| err.to_string())?;
    trigger_download(&report_filename(report), &csv, CSV_MIME)
}

#[component]
pub fn AdminReportsPage() -> impl IntoView {
    let vm = use_reports_view_model();
    view! {
        <Layout>
            <PageHeading title="Reports" subtitle="Generate, save and export attendance reports"/>
            <GenerateForm vm=vm/>
            {move || vm.notice.get().map(|msg| view! { <SuccessMessage message=msg/> })}
            <InlineErrorMessage error=vm.error/>
            {move || vm.generated.get().map(|report| view! { <GeneratedView vm=vm report=report/> })}
            <section class="mt-8">
                <h3 class="text-lg font-semibold text-fg mb-3">"Generated Reports"</h3>
                {move || match vm.saved.get() {
                    None => view! { <LoadingSpinner/> }.into_view(),
                    Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                    Some(Ok(paged)) => view! { <SavedList vm=vm paged=paged/> }.into_view(),
                }}
            </section>
        </Layout>
    }
}

#[component]
fn GenerateForm(vm: ReportsViewModel) -> impl IntoView {
    let pending = vm.generate_action.pending();
    let types = Signal::derive(report_type_options);
    let departments =
        Signal::derive(move || department_options(&vm.departments.get().unwrap_or_default()));
    let staff = Signal::derive(move || {
        std::iter::once((String::new(), "Select Staff Member".to_string()))
            .chain(vm.staff_choices.get().unwrap_or_default())
            .collect::<Vec<_>>()
    });
    let individual = move || vm.selected_type() == ReportType::Individual;
    view! {
        <form
            class="bg-surface-elevated shadow rounded-lg p-4 grid grid-cols-1 md:grid-cols-4 gap-4 mb-6"
            on:submit=move |ev| {
                ev.prevent_default();
                vm.generate();
            }
        >
            <SelectField id="report-type" label="Report Type" value=vm.report_type options=types/>
            <TextField id="report-month" label="Month" value=vm.month input_type="month" required=true/>
            <Show
                when=individual
                fallback=move || view! {
                    <SelectField id="report-department" label="Department" value=vm.department options=departments/>
                }
            >
                <SelectField id="report-staff" label="Staff Member" value=vm.staff_id options=staff/>
            </Show>
            <div class="flex items-end">
                <Button loading=pending attr:type="submit">"Generate Report"</Button>
            </div>
        </form>
    }
}

#[component]
fn GeneratedView(vm: ReportsViewModel, report: GeneratedReport) -> impl IntoView {
    let saving = vm.save_action.pending();
    let title = format!(
        "{} · {}",
        report_type_title(report.report_type()),
        month_long_label(report.month())
    );
    let body = match &report {
        GeneratedReport::Departmental(_, departmental) => {
            view! { <DepartmentalTable report=departmental.clone()/> }.into_view()
        }
        GeneratedReport::Individual { report, .. } => {
            view! { <IndividualSummary report=report.clone()/> }.into_view()
        }
    };
    let csv_source = match &report {
        GeneratedReport::Departmental(_, departmental) => Some(departmental.clone()),
        GeneratedReport::Individual { .. } => None,
    };
    view! {
        <section class="bg-surface-elevated shadow rounded-lg p-6 space-y-4">
            <div class="flex flex-wrap items-center justify-between gap-2">
                <h3 class="text-lg font-semibold text-fg">{title}</h3>
                <div class="flex gap-2">
                    <Button variant=ButtonVariant::Success loading=saving attr:type="button" on:click=move |_| vm.save()>
                        "Save Report"
                    </Button>
                    {csv_source.map(|departmental| view! {
                        <Button
                            variant=ButtonVariant::Outline
                            attr:type="button"
                            on:click=move |_| {
                                if let Err(err) = download_csv(&departmental) {
                                    log::error!("CSV download failed: {}", err);
                                }
                            }
                        >
                            "Download CSV"
                        </Button>
                    })}
                </div>
            </div>
            {body}
        </section>
    }
}

#[component]
fn DepartmentalTable(report: DepartmentalReport) -> impl IntoView {
    if report.reports.is_empty() {
        return view! { <EmptyState title="No active staff for this selection"/> }.into_view();
    }
    view! {
        <p class="text-sm text-fg-muted">{format!("{} · {} staff", report.department, report.total_staff)}</p>
        <div class="overflow-x-auto rounded-lg border border-border">
            <table class="min-w-full divide-y divide-border">
                <thead class="bg-surface-muted">
                    <tr>
                        <th class=HEAD_CELL>"Staff ID"</th>
                        <th class=HEAD_CELL>"Name"</th>
                        <th class=HEAD_CELL>"Department"</th>
                        <th class=HEAD_CELL>"Working Days"</th>
                        <th class=HEAD_CELL>"Present Days"</th>
                        <th class=HEAD_CELL>"Absences"</th>
                        <th class=HEAD_CELL>"Lateness"</th>
                    </tr>
                </thead>
                <tbody class="bg-surface-elevated divide-y divide-border">
                    {report
                        .reports
                        .into_iter()
                        .map(|row| view! {
                            <tr>
                                <td class=CELL>{row.staff_id}</td>
                                <td class=CELL>{row.name}</td>
                                <td class=CELL>{row.department}</td>
                                <td class=CELL>{row.total_working_days}</td>
                                <td class=CELL>{row.present_days}</td>
                                <td class=CELL>{row.absences}</td>
                                <td class=CELL>{row.lateness}</td>
                            </tr>
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
    .into_view()
}

#[component]
fn IndividualSummary(report: MonthlyReport) -> impl IntoView {
    let stats = report.statistics;
    let department = report.staff.department.unwrap_or_else(|| "N/A".to_string());
    view! {
        <p class="text-sm text-fg-muted">{format!("{} · {} · {}", report.staff.name, department, report.staff.role.as_str())}</p>
        <div class="grid grid-cols-1 sm:grid-cols-3 lg:grid-cols-6 gap-4">
            <StatCard title="Working Days" value=stats.total_working_days.to_string() color=CardColor::Info/>
            <StatCard title="Present Days" value=stats.present_days.to_string() color=CardColor::Success/>
            <StatCard title="Absences" value=stats.absences.to_string() color=CardColor::Danger/>
            <StatCard title="Lateness" value=stats.lateness.to_string() color=CardColor::Warning/>
            <StatCard title="Average Check-In" value=stats.average_check_in/>
            <StatCard title="Average Check-Out" value=stats.average_check_out/>
        </div>
    }
}

#[component]
fn SavedList(vm: ReportsViewModel, paged: Paged<SavedReport>) -> impl IntoView {
    let total_records = paged.total;
    let total_pages = paged.total_pages(PAGE_SIZE);
    if paged.items.is_empty() {
        return view! {
            <p class="text-sm text-fg-muted">"No reports generated yet. Generate a report to see it here."</p>
        }
        .into_view();
    }
    view! {
        <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
            {paged.items.into_iter().map(|report| view! { <SavedCard report=report/> }).collect_view()}
        </div>
        <Pagination
            page=vm.saved_page
            total_pages=Signal::derive(move || total_pages)
            total_records=Signal::derive(move || total_records)
            on_change=Callback::new(move |page| vm.saved_page.set(page))
        />
    }
    .into_view()
}

#[component]
fn SavedCard(report: SavedReport) -> impl IntoView {
    let created = report
        .created_at
        .map(|at| at.date_naive().format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "Unknown date".to_string());
    view! {
        <div class="rounded-lg border border-border bg-surface-elevated shadow-sm p-3">
            <h4 class="text-base font-semibold text-fg mb-1">{report_type_title(report.report_type)}</h4>
            <p class="text-xs text-fg-muted">
                <span class="font-medium">"Month: "</span>
                {month_long_label(&report.month)}
            </p>
            {report.department.map(|dept| view! {
                <p class="text-xs text-fg-muted"><span class="font-medium">"Dept: "</span>{dept}</p>
            })}
            <p class="text-xs text-fg-muted">
                <span class="font-medium">"Date: "</span>
                {created}
            </p>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::StaffRole;
    use crate::services::reports::DepartmentalRow;
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_with, ssr::render_to_string};
    use serde_json::json;

    fn admin() -> NavState {
        NavState::SignedIn {
            name: "Grace".into(),
            role: StaffRole::Admin,
        }
    }

    fn departmental() -> DepartmentalReport {
        DepartmentalReport {
            month: "2025-03".into(),
            department: "Finance".into(),
            reports: vec![DepartmentalRow {
                staff_id: "STF001".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: StaffRole::Staff,
                department: "Finance".into(),
                total_working_days: 6,
                present_days: 5,
                absences: 1,
                lateness: 2,
            }],
            total_staff: 1,
        }
    }

    #[test]
    fn departmental_result_offers_csv() {
        let html = render_to_string(move || {
            provide_session_with(admin());
            let vm = use_reports_view_model();
            let report = GeneratedReport::Departmental(ReportType::Departmental, departmental());
            view! { <GeneratedView vm=vm report=report/> }
        });
        assert!(html.contains("Departmental Report"));
        assert!(html.contains("March 2025"));
        assert!(html.contains("Download CSV"));
        assert!(html.contains("STF001"));
    }

    #[test]
    fn saved_cards_show_type_month_and_department() {
        let html = render_to_string(move || {
            let report: SavedReport = serde_json::from_value(json!({
                "id": "r1",
                "month": "2025-02",
                "department": "Finance",
                "report_type": "departmental",
                "data": {},
                "created_at": "2025-03-01T09:00:00Z"
            }))
            .unwrap();
            view! { <SavedCard report=report/> }
        });
        assert!(html.contains("February 2025"));
        assert!(html.contains("Finance"));
        assert!(html.contains("March 1, 2025"));
    }

    #[test]
    fn empty_saved_list_message() {
        let html = render_to_string(move || {
            provide_session_with(admin());
            let vm = use_reports_view_model();
            view! { <SavedList vm=vm paged=Paged::empty()/> }
        });
        assert!(html.contains("No reports generated yet"));
    }

    #[test]
    fn form_defaults_to_department_picker() {
        let html = render_to_string(move || {
            provide_session_with(admin());
            view! { <AdminReportsPage/> }
        });
        assert!(html.contains("report-department"));
        assert!(!html.contains("report-staff"));
        assert!(html.contains("Generate Report"));
    }
}
