use leptos::*;

use crate::components::layout::{Layout, PageHeading};

#[component]
pub fn AboutPage() -> impl IntoView {
    view! {
        <Layout>
            <PageHeading title="About LG QAMS"/>
            <div class="bg-surface-elevated shadow rounded-lg p-6 space-y-4 text-fg">
                <p>
                    "LG QAMS records staff attendance for local government offices. Staff scan the office QR code, sign in, and check in or out; late arrivals are flagged against the configured office hours."
                </p>
                <p>
                    "Administrators manage staff, review daily attendance, generate monthly and departmental reports, and back up or restore the system data."
                </p>
            </div>
        </Layout>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_with, ssr::render_to_string};

    #[test]
    fn describes_the_system() {
        let html = render_to_string(move || {
            provide_session_with(NavState::SignedOut);
            view! { <AboutPage/> }
        });
        assert!(html.contains("About LG QAMS"));
        assert!(html.contains("office hours"));
    }
}
