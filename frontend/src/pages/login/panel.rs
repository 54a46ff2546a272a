use leptos::*;

use super::view_model::use_login_view_model;
use crate::components::{
    common::Button,
    error::InlineErrorMessage,
    forms::{PasswordField, TextField},
    layout::{Layout, SuccessMessage},
};

#[component]
pub fn LoginPanel(redirect: Option<String>) -> impl IntoView {
    let vm = use_login_view_model(redirect);
    let pending = vm.login_action.pending();
    let reset_pending = vm.reset_action.pending();

    view! {
        <Layout>
            <div class="max-w-md mx-auto">
                <div class="text-center mb-6">
                    <h2 class="text-3xl font-extrabold text-fg">"Sign in to LG QAMS"</h2>
                    <p class="mt-2 text-sm text-fg-muted">"Staff and administrator access"</p>
                </div>
                <form class="bg-surface-elevated shadow rounded-lg p-6 space-y-4" on:submit=move |ev| {
                    ev.prevent_default();
                    vm.submit();
                }>
                    <TextField id="login-email" label="Email" value=vm.email input_type="email" required=true/>
                    <PasswordField id="login-password" label="Password" value=vm.password required=true/>
                    <InlineErrorMessage error=vm.error/>
                    {move || vm.notice.get().map(|msg| view! { <SuccessMessage message=msg/> })}
                    <Button class="w-full" loading=pending attr:type="submit">
                        {move || if pending.get() { "Signing in..." } else { "Sign In" }}
                    </Button>
                    <button
                        type="button"
                        class="w-full text-sm text-action-primary-bg hover:underline disabled:opacity-50"
                        disabled=move || reset_pending.get()
                        on:click=move |_| vm.request_reset()
                    >
                        "Forgot password?"
                    </button>
                </form>
            </div>
        </Layout>
    }
}
