use leptos::*;

use super::utils::ReportSummary;
use super::view_model::use_reports_resource;
use crate::components::{
    cards::{CardColor, StatCard},
    empty_state::EmptyState,
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading},
};

#[component]
pub fn StaffReportsPage() -> impl IntoView {
    let resource = use_reports_resource();
    view! {
        <Layout>
            <PageHeading title="My Reports" subtitle="Monthly attendance summaries"/>
            {move || match resource.get() {
                None => view! { <LoadingSpinner/> }.into_view(),
                Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                Some(Ok(reports)) => view! { <ReportList reports=reports/> }.into_view(),
            }}
        </Layout>
    }
}

#[component]
fn ReportList(reports: Vec<ReportSummary>) -> impl IntoView {
    let mut reports = reports.into_iter();
    let Some(current) = reports.next() else {
        return view! { <EmptyState title="No reports available"/> }.into_view();
    };
    let saved: Vec<_> = reports.collect();
    view! {
        <section class="mb-8">
            <h3 class="text-lg font-semibold text-fg mb-3">{format!("Current Month ({})", current.month)}</h3>
            <ReportCards report=current/>
        </section>
        <section>
            <h3 class="text-lg font-semibold text-fg mb-3">"Saved Reports"</h3>
            {if saved.is_empty() {
                view! { <EmptyState title="No saved reports yet"/> }.into_view()
            } else {
                saved
                    .into_iter()
                    .map(|report| {
                        view! {
                            <div class="mb-6">
                                <h4 class="text-sm font-semibold text-fg-muted mb-2">{report.month.clone()}</h4>
                                <ReportCards report=report/>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </section>
    }
    .into_view()
}

#[component]
fn ReportCards(report: ReportSummary) -> impl IntoView {
    view! {
        <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4">
            <StatCard title="Working Days" value=report.working_days.to_string() color=CardColor::Info/>
            <StatCard title="Present Days" value=report.present_days.to_string() color=CardColor::Success/>
            <StatCard title="Absences" value=report.absences.to_string() color=CardColor::Danger/>
            <StatCard title="Average Check-In" value=report.average_check_in color=CardColor::Primary/>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::test_support::ssr::render_to_string;

    fn summary(month: &str, present: u64) -> ReportSummary {
        ReportSummary {
            month: month.into(),
            working_days: 20,
            present_days: present,
            absences: 20 - present,
            average_check_in: "08:15".into(),
        }
    }

    #[test]
    fn current_month_comes_first() {
        let html = render_to_string(move || {
            view! { <ReportList reports=vec![summary("2025-03", 7), summary("2025-02", 19)]/> }
        });
        let current = html.find("Current Month (2025-03)").unwrap();
        let saved = html.find("Saved Reports").unwrap();
        assert!(current < saved);
        assert!(html.contains("2025-02"));
        assert!(html.contains("08:15"));
    }

    #[test]
    fn no_saved_reports_placeholder() {
        let html = render_to_string(move || view! { <ReportList reports=vec![summary("2025-03", 7)]/> });
        assert!(html.contains("No saved reports yet"));
    }
}
