use leptos::*;

use crate::components::{
    layout::{Layout, PageHeading},
    qr_code::QrCodeImage,
};
use crate::router::path::build_query;
use crate::state::use_session;

pub const QR_FILENAME: &str = "lg-qams-checkin-qr.svg";

/// Target encoded in the office QR code.
pub fn checkin_url(origin: &str) -> String {
    format!("{}/checkin", origin.trim_end_matches('/'))
}

/// Personal badge target that pre-fills the check-in email.
pub fn staff_checkin_url(origin: &str, email: &str) -> String {
    format!("{}?{}", checkin_url(origin), build_query(&[("email", email)]))
}

#[component]
pub fn ScanPage() -> impl IntoView {
    let session = use_session();
    let url = checkin_url(&session.origin);
    view! {
        <Layout>
            <PageHeading title="Scan QR Code" subtitle="Scan with your phone to check in or out"/>
            <div class="bg-surface-elevated shadow rounded-lg p-6 flex flex-col items-center gap-4">
                <QrCodeImage data=url.clone() filename=QR_FILENAME caption=url.clone()/>
                <a href="/checkin" data-router="true" class="text-action-primary-bg hover:underline text-sm">
                    "Or open the check-in form on this device"
                </a>
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
    fn renders_checkin_qr() {
        let html = render_to_string(move || {
            provide_session_with(NavState::SignedOut);
            view! { <ScanPage/> }
        });
        assert!(html.contains("https://qams.example/checkin"));
        assert!(html.contains("data:image/svg+xml;base64,"));
    }
}
