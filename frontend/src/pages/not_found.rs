use leptos::*;

use crate::components::layout::Layout;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <Layout>
            <div class="py-16 text-center">
                <p class="text-6xl font-extrabold text-fg">"404"</p>
                <h1 class="mt-4 text-2xl font-bold text-fg">"Page Not Found"</h1>
                <p class="mt-2 text-fg-muted">"The page you are looking for does not exist."</p>
                <a href="/" data-router="true" class="mt-6 inline-block text-action-primary-bg hover:underline">
                    "Go back home"
                </a>
            </div>
        </Layout>
    }
}
