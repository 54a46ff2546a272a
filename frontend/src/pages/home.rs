use leptos::*;

use crate::components::layout::Layout;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <Layout>
            <div class="py-12 text-center">
                <h1 class="text-4xl font-extrabold text-fg sm:text-5xl lg:text-6xl">"LG QAMS"</h1>
                <p class="mt-3 max-w-md mx-auto text-base text-fg-muted sm:text-lg lg:mt-5 lg:text-xl lg:max-w-3xl">
                    "Local Government QR Code Attendance Management System"
                </p>
                <div class="mt-8 flex flex-col sm:flex-row gap-3 justify-center">
                    <a
                        href="/scan"
                        data-router="true"
                        class="flex items-center justify-center px-8 py-3 text-base font-medium rounded-md text-action-primary-text bg-action-primary-bg hover:bg-action-primary-bg-hover"
                    >
                        "Scan QR to Check In"
                    </a>
                    <a
                        href="/login"
                        data-router="true"
                        class="flex items-center justify-center px-8 py-3 text-base font-medium rounded-md border border-border text-fg hover:bg-action-ghost-bg-hover"
                    >
                        "Staff Login"
                    </a>
                </div>
            </div>
        </Layout>
    }
}
