use leptos::*;

use super::view_model::{use_current_staff_resource, use_profile_view_model};
use crate::api::Staff;
use crate::components::{
    common::Button,
    error::InlineErrorMessage,
    forms::PasswordField,
    layout::{ErrorMessage, Layout, LoadingSpinner, PageHeading, SuccessMessage},
};

#[component]
pub fn StaffProfilePage() -> impl IntoView {
    let resource = use_current_staff_resource();
    view! {
        <Layout>
            <PageHeading title="My Profile"/>
            <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                {move || match resource.get() {
                    None => view! { <LoadingSpinner/> }.into_view(),
                    Some(Err(err)) => view! { <ErrorMessage message=err.to_string()/> }.into_view(),
                    Some(Ok(staff)) => view! { <ProfileDetails staff=staff/> }.into_view(),
                }}
                <PasswordForm/>
            </div>
        </Layout>
    }
}

#[component]
fn ProfileDetails(staff: Staff) -> impl IntoView {
    let fields = [
        ("Staff ID", staff.staff_id.clone()),
        ("Name", staff.name.clone()),
        ("Email", staff.email.clone()),
        ("Department", staff.department_label()),
        ("Role", staff.role.as_str().to_string()),
    ];
    view! {
        <div class="bg-surface-elevated shadow rounded-lg p-6">
            <h3 class="text-lg font-semibold text-fg mb-4">"Profile Information"</h3>
            <dl class="space-y-3">
                {fields
                    .into_iter()
                    .map(|(label, value)| {
                        view! {
                            <div class="flex justify-between text-sm">
                                <dt class="text-fg-muted">{label}</dt>
                                <dd class="font-medium text-fg">{value}</dd>
                            </div>
                        }
                    })
                    .collect_view()}
            </dl>
        </div>
    }
}

#[component]
fn PasswordForm() -> impl IntoView {
    let vm = use_profile_view_model();
    let pending = vm.change_action.pending();
    view! {
        <form
            class="bg-surface-elevated shadow rounded-lg p-6 space-y-4"
            on:submit=move |ev| {
                ev.prevent_default();
                vm.submit();
            }
        >
            <h3 class="text-lg font-semibold text-fg">"Change Password"</h3>
            {move || vm.notice.get().map(|msg| view! { <SuccessMessage message=msg/> })}
            <PasswordField id="new-password" label="New Password" value=vm.new_password required=true/>
            <PasswordField id="confirm-password" label="Confirm Password" value=vm.confirm_password required=true/>
            <InlineErrorMessage error=vm.error/>
            <Button loading=pending attr:type="submit">"Update Password"</Button>
        </form>
    }
}
