//! LG QAMS browser application: Supabase client, attendance services,
//! router and Leptos pages.

use leptos::*;

pub mod api;
pub mod components;
pub mod config;
pub mod pages;
pub mod router;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use components::layout::Header;
use state::{provide_session, AppSession};

/// Root view: header plus whatever page the router last resolved.
#[component]
pub fn App(session: AppSession) -> impl IntoView {
    let outlet = session.outlet;
    provide_session(session);
    view! {
        <Header/>
        {move || outlet.current.get().map(pages::render_page)}
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use std::rc::Rc;

    use api::{Backend, SupabaseClient};
    use router::BrowserHistory;
    use utils::time::SystemClock;

    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("starting LG QAMS frontend");

    spawn_local(async move {
        let config = config::load().await;
        let client = Rc::new(SupabaseClient::new(
            config.supabase_url.clone(),
            config.supabase_anon_key.clone(),
        ));
        let clock = Rc::new(SystemClock::new(config.time_zone));
        let backend = Backend::new(client.clone(), client, clock);
        let origin = utils::storage::origin().unwrap_or_else(|err| {
            log::warn!("{}", err);
            String::new()
        });
        let session = AppSession::new(backend, Rc::new(BrowserHistory), config).with_origin(origin);

        let app_session = session.clone();
        mount_to_body(move || view! { <App session=app_session/> });

        session.router.init();
        std::mem::forget(session.listen_for_auth_changes());
        session.refresh_nav().await;
    });
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::router::{Page, RouteMatch};
    use crate::services::testing::memory_at;
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_over, ssr::render_to_string};

    #[test]
    fn app_renders_header_and_current_page() {
        let html = render_to_string(move || {
            let memory = memory_at(2025, 3, 10, 9, 0);
            let session = provide_session_over(&memory, NavState::SignedOut);
            session.outlet.current.set(Some(RouteMatch::new(Page::About, "/about", "/about")));
            view! { <App session=session/> }
        });
        assert!(html.contains("LG QAMS"));
        assert!(html.contains("Login"));
        assert!(html.contains("About"));
    }
}
