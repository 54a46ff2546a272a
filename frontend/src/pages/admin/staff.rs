use leptos::*;

use super::utils::{role_options, PAGE_SIZE};
use super::view_model::{use_staff_view_model, StaffViewModel};
use crate::api::Staff;
use crate::components::{
    common::{Button, ButtonVariant},
    confirm_dialog::ConfirmDialog,
    empty_state::EmptyState,
    error::InlineErrorMessage,
    forms::{SelectField, TextField},
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading, SuccessMessage},
    pagination::Pagination,
    qr_code::QrCodeImage,
};
use crate::pages::scan::staff_checkin_url;
use crate::services::Paged;
use crate::state::use_session;

const HEAD_CELL: &str = "px-4 py-3 text-left text-xs font-medium text-fg-muted uppercase tracking-wider";
const CELL: &str = "px-4 py-3 whitespace-nowrap text-sm text-fg";

pub fn badge_filename(staff: &Staff) -> String {
    format!("lg-qams-{}-qr.svg", staff.staff_id.to_lowercase())
}

#[component]
pub fn AdminStaffPage() -> impl IntoView {
    let vm = use_staff_view_model();
    let toggle_title = Signal::derive(move || {
        vm.pending_toggle
            .get()
            .map(|s| if s.is_active() { "Deactivate staff member" } else { "Activate staff member" })
            .unwrap_or_default()
            .to_string()
    });
    let toggle_message = Signal::derive(move || {
        vm.pending_toggle
            .get()
            .map(|s| {
                if s.is_active() {
                    format!("{} will no longer be able to check in.", s.name)
                } else {
                    format!("{} will be able to check in again.", s.name)
                }
            })
            .unwrap_or_default()
    });

    view! {
        <Layout>
            <div class="flex items-start justify-between">
                <PageHeading title="Staff Management" subtitle="Add, search and activate staff members"/>
                <Button attr:type="button" on:click=move |_| vm.show_form.update(|open| *open = !*open)>
                    {move || if vm.show_form.get() { "Close" } else { "Add Staff" }}
                </Button>
            </div>
            {move || vm.notice.get().map(|msg| view! { <SuccessMessage message=msg/> })}
            <InlineErrorMessage error=vm.error/>
            <Show when=move || vm.show_form.get()>
                <StaffFormCard vm=vm/>
            </Show>
            <form
                class="flex gap-2 mb-4"
                on:submit=move |ev| {
                    ev.prevent_default();
                    vm.apply_search();
                }
            >
                <div class="flex-1">
                    <TextField id="staff-search" label="Search" value=vm.search_input placeholder="Code, name, email or department"/>
                </div>
                <Button class="self-end" variant=ButtonVariant::Secondary attr:type="submit">"Search"</Button>
            </form>
            {move || match vm.staff.get() {
                None => view! { <LoadingSpinner/> }.into_view(),
                Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                Some(Ok(paged)) => view! { <StaffTable vm=vm paged=paged/> }.into_view(),
            }}
            <ConfirmDialog
                is_open=Signal::derive(move || vm.pending_toggle.get().is_some())
                title=toggle_title
                message=toggle_message
                on_confirm=Callback::new(move |_| vm.confirm_toggle())
                on_cancel=Callback::new(move |_| vm.pending_toggle.set(None))
                destructive=true
            />
            <BadgeDialog vm=vm/>
        </Layout>
    }
}

#[component]
fn StaffFormCard(vm: StaffViewModel) -> impl IntoView {
    let pending = vm.create_action.pending();
    let roles = Signal::derive(role_options);
    view! {
        <form
            class="bg-surface-elevated shadow rounded-lg p-6 mb-6 grid grid-cols-1 md:grid-cols-2 gap-4"
            on:submit=move |ev| {
                ev.prevent_default();
                vm.submit_form();
            }
        >
            <TextField id="staff-code" label="Staff ID" value=vm.form.staff_id placeholder="Leave blank to generate"/>
            <TextField id="staff-name" label="Name" value=vm.form.name required=true/>
            <TextField id="staff-email" label="Email" value=vm.form.email input_type="email" required=true/>
            <TextField id="staff-department" label="Department" value=vm.form.department/>
            <SelectField id="staff-role" label="Role" value=vm.form.role options=roles/>
            <div class="flex items-end">
                <Button loading=pending attr:type="submit">"Save Staff"</Button>
            </div>
        </form>
    }
}

#[component]
fn StaffTable(vm: StaffViewModel, paged: Paged<Staff>) -> impl IntoView {
    let total_records = paged.total;
    let total_pages = paged.total_pages(PAGE_SIZE);
    if paged.items.is_empty() {
        return view! { <EmptyState title="No staff found"/> }.into_view();
    }
    view! {
        <div class="overflow-x-auto rounded-lg border border-border">
            <table class="min-w-full divide-y divide-border">
                <thead class="bg-surface-muted">
                    <tr>
                        <th class=HEAD_CELL>"Staff ID"</th>
                        <th class=HEAD_CELL>"Name"</th>
                        <th class=HEAD_CELL>"Email"</th>
                        <th class=HEAD_CELL>"Department"</th>
                        <th class=HEAD_CELL>"Role"</th>
                        <th class=HEAD_CELL>"Status"</th>
                        <th class=HEAD_CELL>"Actions"</th>
                    </tr>
                </thead>
                <tbody class="bg-surface-elevated divide-y divide-border">
                    {paged.items.into_iter().map(|staff| view! { <StaffRow vm=vm staff=staff/> }).collect_view()}
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

#[component]
fn StaffRow(vm: StaffViewModel, staff: Staff) -> impl IntoView {
    let active = staff.is_active();
    let (status_class, status_label) = if active {
        ("bg-status-success-bg text-status-success-text", "Active")
    } else {
        ("bg-surface-muted text-fg-muted", "Inactive")
    };
    let (toggle_variant, toggle_label) = if active {
        (ButtonVariant::Danger, "Deactivate")
    } else {
        (ButtonVariant::Success, "Activate")
    };
    let for_toggle = staff.clone();
    let for_badge = staff.clone();
    view! {
        <tr>
            <td class=CELL>{staff.staff_id.clone()}</td>
            <td class=CELL>{staff.name.clone()}</td>
            <td class=CELL>{staff.email.clone()}</td>
            <td class=CELL>{staff.department_label()}</td>
            <td class=CELL>{staff.role.as_str()}</td>
            <td class=CELL>
                <span class=format!("inline-flex px-2 py-0.5 rounded-full text-xs font-semibold {}", status_class)>
                    {status_label}
                </span>
            </td>
            <td class=CELL>
                <div class="flex gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        attr:type="button"
                        on:click=move |_| vm.qr_for.set(Some(for_badge.clone()))
                    >
                        "QR"
                    </Button>
                    <Button
                        variant=toggle_variant
                        attr:type="button"
                        on:click=move |_| vm.pending_toggle.set(Some(for_toggle.clone()))
                    >
                        {toggle_label}
                    </Button>
                </div>
            </td>
        </tr>
    }
}

#[component]
fn BadgeDialog(vm: StaffViewModel) -> impl IntoView {
    let origin = use_session().origin;
    move || {
        vm.qr_for.get().map(|staff| {
            let url = staff_checkin_url(&origin, &staff.email);
            view! {
                <div class="fixed inset-0 z-[70] flex items-center justify-center p-4">
                    <button
                        type="button"
                        aria-label="Close"
                        class="absolute inset-0 bg-overlay-backdrop"
                        on:click=move |_| vm.qr_for.set(None)
                    ></button>
                    <div class="relative z-[71] rounded-lg bg-surface-elevated shadow-xl border border-border p-6 space-y-4" role="dialog">
                        <h2 class="text-lg font-semibold text-fg">{format!("{} ({})", staff.name, staff.staff_id)}</h2>
                        <QrCodeImage data=url filename=badge_filename(&staff) caption="Scan to open check-in with this email"/>
                        <div class="flex justify-end">
                            <Button variant=ButtonVariant::Secondary attr:type="button" on:click=move |_| vm.qr_for.set(None)>
                                "Close"
                            </Button>
                        </div>
                    </div>
                </div>
            }
        })
    }
}
