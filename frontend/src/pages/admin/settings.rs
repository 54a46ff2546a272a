use leptos::*;
use web_sys::HtmlInputElement;

use super::view_model::{use_settings_view_model, SettingsViewModel};
use crate::components::{
    common::{Button, ButtonVariant},
    confirm_dialog::ConfirmDialog,
    error::InlineErrorMessage,
    forms::TextField,
    layout::{Layout, PageHeading, SuccessMessage},
};
use crate::services::{backup::validate_backup_file, ServiceError};
use crate::utils::download::read_selected_file;

use super::utils::parse_backup_text;

#[component]
fn Toggle(#[prop(into)] id: String, #[prop(into)] label: String, value: RwSignal<bool>) -> impl IntoView {
    view! {
        <label for=id.clone() class="flex items-center gap-2 text-sm text-fg">
            <input
                id=id
                type="checkbox"
                class="h-4 w-4 rounded border-border"
                prop:checked=move || value.get()
                on:change=move |ev| value.set(event_target::<HtmlInputElement>(&ev).checked())
            />
            {label}
        </label>
    }
}

#[component]
pub fn AdminSettingsPage() -> impl IntoView {
    let vm = use_settings_view_model();
    create_effect(move |_| {
        if let Some(snapshot) = vm.loaded.get() {
            vm.fill(&snapshot);
        }
    });
    view! {
        <Layout>
            <PageHeading title="Settings" subtitle="Office hours, system options and backups"/>
            {move || vm.notice.get().map(|msg| view! { <SuccessMessage message=msg/> })}
            <InlineErrorMessage error=vm.error/>
            <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                <OfficeHoursForm vm=vm/>
                <BackupPanel vm=vm/>
            </div>
            <ConfirmDialog
                is_open=Signal::derive(move || vm.restore_prompt.get())
                title="Restore backup"
                message=Signal::derive(move || {
                    if vm.overwrite_existing.get() {
                        "Existing records with matching IDs will be overwritten.".to_string()
                    } else {
                        "Only records that do not exist yet will be added.".to_string()
                    }
                })
                confirm_label="Restore"
                on_confirm=Callback::new(move |_| vm.confirm_restore())
                on_cancel=Callback::new(move |_| vm.restore_prompt.set(false))
                destructive=true
            />
        </Layout>
    }
}

#[component]
fn OfficeHoursForm(vm: SettingsViewModel) -> impl IntoView {
    let pending = vm.save_action.pending();
    view! {
        <form
            class="bg-surface-elevated shadow rounded-lg p-6 space-y-4"
            on:submit=move |ev| {
                ev.prevent_default();
                vm.save();
            }
        >
            <h3 class="text-lg font-semibold text-fg">"Office Hours"</h3>
            <TextField id="office-start" label="Office Start Time" value=vm.office_start input_type="time" required=true/>
            <TextField id="office-end" label="Office End Time" value=vm.office_end input_type="time" required=true/>
            <TextField id="late-threshold" label="Late Threshold (minutes)" value=vm.late_threshold input_type="number" required=true/>
            <h3 class="text-lg font-semibold text-fg pt-2">"System"</h3>
            <Toggle id="ip-restriction" label="Restrict check-in to office network" value=vm.ip_restriction/>
            <Toggle id="auto-reports" label="Generate monthly reports automatically" value=vm.auto_reports/>
            <Button loading=pending attr:type="submit">"Save Settings"</Button>
        </form>
    }
}

#[component]
fn BackupPanel(vm: SettingsViewModel) -> impl IntoView {
    let exporting = vm.export_action.pending();
    let restoring = vm.restore_action.pending();
    let on_file = move |ev: ev::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        spawn_local(async move {
            match read_selected_file(&input).await {
                Ok(Some((name, text))) => {
                    let check = parse_backup_text(&text).map(|value| validate_backup_file(&value));
                    match check {
                        Ok(validation) if validation.valid => {
                            vm.error.set(None);
                            vm.backup_name.set(Some(name));
                            vm.backup_text.set(Some(text));
                        }
                        Ok(validation) => {
                            vm.backup_text.set(None);
                            vm.error.set(Some(ServiceError::Validation(
                                validation.error.unwrap_or_default(),
                            )));
                        }
                        Err(message) => {
                            vm.backup_text.set(None);
                            vm.error.set(Some(ServiceError::Validation(message)));
                        }
                    }
                }
                Ok(None) => vm.backup_text.set(None),
                Err(message) => log::error!("{}", message),
            }
        });
    };
    view! {
        <div class="bg-surface-elevated shadow rounded-lg p-6 space-y-4">
            <h3 class="text-lg font-semibold text-fg">"Backup & Restore"</h3>
            <p class="text-sm text-fg-muted">"Download every staff, attendance, settings and report record as JSON."</p>
            <Button
                variant=ButtonVariant::Secondary
                loading=exporting
                attr:type="button"
                on:click=move |_| {
                    if !exporting.get_untracked() {
                        vm.export_action.dispatch(());
                    }
                }
            >
                "Download Backup"
            </Button>
            <div class="border-t border-border pt-4 space-y-3">
                <label for="backup-file" class="block text-sm font-medium text-fg">"Restore from file"</label>
                <input id="backup-file" type="file" accept="application/json,.json" class="block text-sm" on:change=on_file/>
                {move || vm.backup_name.get().map(|name| view! {
                    <p class="text-xs text-fg-muted">{format!("Selected: {}", name)}</p>
                })}
                <Toggle id="overwrite-existing" label="Overwrite existing records" value=vm.overwrite_existing/>
                <Button
                    variant=ButtonVariant::Danger
                    loading=restoring
                    attr:type="button"
                    on:click=move |_| vm.request_restore()
                >
                    "Restore Backup"
                </Button>
            </div>
        </div>
    }
}
