use leptos::*;

use crate::state::{nav_items, use_session, NavItem};

const LINK_CLASS: &str =
    "text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium hover:bg-action-ghost-bg-hover";
const ACTIVE_LINK_CLASS: &str =
    "text-fg bg-action-ghost-bg-hover px-3 py-2 rounded-md text-sm font-semibold";

#[component]
fn NavLink(item: NavItem, #[prop(optional)] block: bool, on_pick: Callback<()>) -> impl IntoView {
    let session = use_session();
    let outlet = session.outlet;
    let is_active = move || {
        outlet
            .current
            .get()
            .map(|m| m.path == item.href)
            .unwrap_or(false)
    };
    view! {
        <a
            href=item.href
            data-router="true"
            class=move || {
                let base = if is_active() { ACTIVE_LINK_CLASS } else { LINK_CLASS };
                if block { format!("block {}", base) } else { base.to_string() }
            }
            on:click=move |_| on_pick.call(())
        >
            {item.label}
        </a>
    }
}

#[component]
pub fn Header() -> impl IntoView {
    let session = use_session();
    let nav = session.nav;
    let (menu_open, set_menu_open) = create_signal(false);
    let close_menu = Callback::new(move |_| set_menu_open.set(false));

    let logout_action = {
        let session = session.clone();
        create_action(move |_: &()| {
            let session = session.clone();
            async move { session.logout().await }
        })
    };
    let logout_pending = logout_action.pending();
    create_effect(move |_| {
        if let Some(Err(err)) = logout_action.value().get() {
            log::error!("logout failed: {}", err);
        }
    });
    let on_logout = move |_| {
        if logout_pending.get_untracked() {
            return;
        }
        set_menu_open.set(false);
        logout_action.dispatch(());
    };
    let toggle_menu = move |_| set_menu_open.update(|open| *open = !*open);

    let links = move |block: bool| {
        nav_items(&nav.get())
            .iter()
            .map(|item| view! { <NavLink item=*item block=block on_pick=close_menu/> })
            .collect_view()
    };
    let user_name = move || nav.get().user_name().map(str::to_string);

    view! {
        <header class="bg-surface-elevated shadow-sm border-b border-border">
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex justify-between items-center h-16">
                    <a href="/" data-router="true" class="flex items-center">
                        <h1 class="text-xl font-semibold text-fg">"LG QAMS"</h1>
                    </a>
                    <div class="flex items-center">
                        <nav class="hidden lg:flex items-center space-x-4">
                            {move || links(false)}
                            {move || user_name().map(|name| view! {
                                <span class="text-sm text-fg-muted px-3">{name}</span>
                                <button
                                    on:click=on_logout
                                    class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium disabled:opacity-50 hover:bg-action-ghost-bg-hover"
                                    disabled=move || logout_pending.get()
                                >
                                    "Logout"
                                </button>
                            })}
                        </nav>
                        <button
                            type="button"
                            class="lg:hidden inline-flex items-center justify-center p-2 rounded-md text-fg-muted hover:text-fg hover:bg-action-ghost-bg-hover"
                            on:click=toggle_menu
                            aria-expanded=move || menu_open.get()
                            aria-controls="mobile-nav"
                        >
                            <span class="sr-only">
                                {move || if menu_open.get() { "Close menu" } else { "Open menu" }}
                            </span>
                            <svg class="h-6 w-6" xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" stroke="currentColor">
                                <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M4 6h16M4 12h16M4 18h16"/>
                            </svg>
                        </button>
                    </div>
                </div>
                <Show when=move || menu_open.get()>
                    <div id="mobile-nav" class="lg:hidden border-t border-border">
                        <nav class="px-4 py-3 space-y-2">
                            {move || links(true)}
                            {move || user_name().map(|_| view! {
                                <button
                                    on:click=on_logout
                                    class="w-full text-left text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium disabled:opacity-50 hover:bg-action-ghost-bg-hover"
                                    disabled=move || logout_pending.get()
                                >
                                    "Logout"
                                </button>
                            })}
                        </nav>
                    </div>
                </Show>
            </div>
        </header>
    }
}

/// Page frame below the shared header.
#[component]
pub fn Layout(children: Children) -> impl IntoView {
    let session = use_session();
    let fallback_zone = session.config.time_zone_is_fallback;
    view! {
        <main class="max-w-7xl mx-auto py-6 px-4 sm:px-6 lg:px-8">
            <Show when=move || fallback_zone>
                <div class="mb-4 bg-status-warning-bg border border-status-warning-border text-status-warning-text px-4 py-3 rounded text-sm">
                    "Time zone is not configured; dates are shown in UTC."
                </div>
            </Show>
            {children()}
        </main>
    }
}

#[component]
pub fn PageHeading(
    #[prop(into)] title: String,
    #[prop(optional, into)] subtitle: Option<String>,
) -> impl IntoView {
    view! {
        <div class="mb-6">
            <h2 class="text-2xl font-bold text-fg">{title}</h2>
            {subtitle.map(|s| view! { <p class="mt-1 text-sm text-fg-muted">{s}</p> })}
        </div>
    }
}

#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="flex justify-center items-center p-8">
            <div class="animate-spin rounded-full h-8 w-8 border-b-2 border-action-primary-bg"></div>
        </div>
    }
}

#[component]
pub fn ErrorMessage(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="bg-status-error-bg border border-status-error-border text-status-error-text px-4 py-3 rounded mb-4" role="alert">
            <p class="text-sm">{message}</p>
        </div>
    }
}

#[component]
pub fn SuccessMessage(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="bg-status-success-bg border border-status-success-border text-status-success-text px-4 py-3 rounded mb-4">
            <p class="text-sm">{message}</p>
        </div>
    }
}
