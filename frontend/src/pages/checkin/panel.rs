use leptos::*;

use super::{repository::CheckAction, view_model::use_checkin_view_model};
use crate::components::{
    common::{Button, ButtonVariant},
    error::InlineErrorMessage,
    forms::{PasswordField, TextField},
    layout::{Layout, PageHeading},
};

#[component]
pub fn CheckInPanel(#[prop(optional_no_strip)] email: Option<String>) -> impl IntoView {
    let vm = use_checkin_view_model(email);
    let pending = vm.record_action.pending();
    let submit = move |action: CheckAction| {
        if !pending.get_untracked() {
            vm.record_action.dispatch(action);
        }
    };

    view! {
        <Layout>
            <div class="max-w-md mx-auto">
                <PageHeading title="Staff Check-In" subtitle="Sign in to record your attendance"/>
                <form class="bg-surface-elevated shadow rounded-lg p-6 space-y-4" on:submit=move |ev| {
                    ev.prevent_default();
                    submit(CheckAction::CheckIn);
                }>
                    <TextField id="checkin-email" label="Email" value=vm.email input_type="email" required=true/>
                    <PasswordField id="checkin-password" label="Password" value=vm.password required=true/>
                    <InlineErrorMessage error=vm.error/>
                    <div class="flex gap-3">
                        <Button class="flex-1" loading=pending attr:type="submit">"Check In"</Button>
                        <Button
                            class="flex-1"
                            variant=ButtonVariant::Outline
                            disabled=pending
                            attr:type="button"
                            on:click=move |_| submit(CheckAction::CheckOut)
                        >
                            "Check Out"
                        </Button>
                    </div>
                </form>
            </div>
        </Layout>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::NavState;
    use crate::test_support::{
        helpers::provide_session_with,
        ssr::{render_to_string, with_runtime},
    };

    #[test]
    fn renders_form_with_both_actions() {
        let html = render_to_string(move || {
            provide_session_with(NavState::SignedOut);
            view! { <CheckInPanel/> }
        });
        assert!(html.contains("Staff Check-In"));
        assert!(html.contains("Check In"));
        assert!(html.contains("Check Out"));
        assert!(html.contains("type=\"password\""));
        assert!(html.contains("Show password"));
    }

    #[test]
    fn badge_links_prefill_the_email() {
        with_runtime(|| {
            provide_session_with(NavState::SignedOut);
            let vm = use_checkin_view_model(Some("ada@example.com".to_string()));
            assert_eq!(vm.email.get_untracked(), "ada@example.com");
            assert!(vm.password.get_untracked().is_empty());
        });
    }
}
