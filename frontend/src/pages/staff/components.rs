use leptos::*;

use super::utils::AttendanceRow;
use crate::components::empty_state::EmptyState;

const HEAD_CELL: &str = "px-4 py-3 text-left text-xs font-medium text-fg-muted uppercase tracking-wider";
const CELL: &str = "px-4 py-3 whitespace-nowrap text-sm text-fg";

#[component]
pub fn StatusBadge(late: bool) -> impl IntoView {
    let (class, label) = if late {
        ("bg-status-warning-bg text-status-warning-text", "Late")
    } else {
        ("bg-status-success-bg text-status-success-text", "Present")
    };
    view! {
        <span class=format!("inline-flex px-2 py-0.5 rounded-full text-xs font-semibold {}", class)>
            {label}
        </span>
    }
}

#[component]
pub fn AttendanceTable(rows: Vec<AttendanceRow>) -> impl IntoView {
    if rows.is_empty() {
        return view! { <EmptyState title="No attendance records found"/> }.into_view();
    }
    view! {
        <div class="overflow-x-auto rounded-lg border border-border">
            <table class="min-w-full divide-y divide-border">
                <thead class="bg-surface-muted">
                    <tr>
                        <th class=HEAD_CELL>"Date"</th>
                        <th class=HEAD_CELL>"Check In"</th>
                        <th class=HEAD_CELL>"Check Out"</th>
                        <th class=HEAD_CELL>"Status"</th>
                    </tr>
                </thead>
                <tbody class="bg-surface-elevated divide-y divide-border">
                    {rows
                        .into_iter()
                        .map(|row| {
                            view! {
                                <tr>
                                    <td class=CELL>{row.date}</td>
                                    <td class=CELL>{row.check_in}</td>
                                    <td class=CELL>{row.check_out}</td>
                                    <td class=CELL><StatusBadge late=row.late/></td>
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
