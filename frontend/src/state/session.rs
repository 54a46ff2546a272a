use std::rc::Rc;

use leptos::*;

use crate::api::{AuthSubscription, Backend};
use crate::config::AppConfig;
use crate::router::{
    install_app_routes, History, NavigateOptions, NavigationOutcome, Router, SignalOutlet,
};
use crate::services::{auth, ServiceResult};

use super::auth::{nav_state_after, resolve_nav_state, NavState};

/// Everything a page needs, provided once as Leptos context.
#[derive(Clone)]
pub struct AppSession {
    pub backend: Backend,
    pub router: Router,
    pub outlet: SignalOutlet,
    pub nav: RwSignal<NavState>,
    pub config: AppConfig,
    /// `scheme://host[:port]` the app is served from.
    pub origin: String,
}

impl AppSession {
    pub fn new(backend: Backend, history: Rc<dyn History>, config: AppConfig) -> Self {
        let outlet = SignalOutlet::new();
        let router = Router::new(history, Rc::new(outlet));
        install_app_routes(&router, backend.clone());
        Self {
            backend,
            router,
            outlet,
            nav: create_rw_signal(NavState::Unknown),
            config,
            origin: String::new(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn refresh_nav(&self) {
        let state = resolve_nav_state(&self.backend).await;
        self.nav.set(state);
    }

    /// Keeps the header in step with sign-in and sign-out.
    pub fn listen_for_auth_changes(&self) -> AuthSubscription {
        let session = self.clone();
        auth::on_auth_state_change(
            &self.backend,
            Rc::new(move |event, _| {
                log::debug!("auth event {}", event.as_str());
                match nav_state_after(event) {
                    Some(state) => session.nav.set(state),
                    None => {
                        let session = session.clone();
                        spawn_local(async move { session.refresh_nav().await });
                    }
                }
            }),
        )
    }

    pub async fn go(&self, path: &str) -> NavigationOutcome {
        self.router.navigate(path, NavigateOptions::default()).await
    }

    /// Fire-and-forget navigation for event handlers.
    pub fn navigate(&self, path: &str) {
        let router = self.router.clone();
        let path = path.to_string();
        spawn_local(async move {
            router.navigate(&path, NavigateOptions::default()).await;
        });
    }

    pub async fn logout(&self) -> ServiceResult<()> {
        auth::sign_out(&self.backend).await?;
        self.nav.set(NavState::SignedOut);
        self.go("/").await;
        Ok(())
    }
}

pub fn provide_session(session: AppSession) {
    provide_context(session);
}

pub fn use_session() -> AppSession {
    expect_context::<AppSession>()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::StaffRole;
    use crate::router::Page;
    use crate::services::testing::{memory_at, with_staff};
    use crate::test_support::helpers::{permissive_history, test_config};
    use crate::test_support::ssr::with_runtime;

    fn quiet_history() -> Rc<dyn History> {
        Rc::new(permissive_history())
    }

    #[tokio::test]
    async fn logout_clears_nav_and_returns_home() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        with_staff(&memory, "s1", "STF001", "Ada");
        let runtime = create_runtime();
        let session = AppSession::new(
            memory.backend(),
            quiet_history(),
            test_config(),
        );

        session.refresh_nav().await;
        assert_eq!(
            session.nav.get_untracked(),
            NavState::SignedIn {
                name: "Ada".into(),
                role: StaffRole::Staff
            }
        );

        session.logout().await.unwrap();
        assert_eq!(session.nav.get_untracked(), NavState::SignedOut);
        assert_eq!(
            session.outlet.current.get_untracked().map(|m| m.page),
            Some(Page::Home)
        );
        runtime.dispose();
    }

    #[test]
    fn sign_out_event_updates_nav_immediately() {
        with_runtime(|| {
            let memory = memory_at(2025, 3, 10, 9, 0);
            let session = AppSession::new(
                memory.backend(),
                quiet_history(),
                test_config(),
            );
            let subscription = session.listen_for_auth_changes();
            futures::executor::block_on(auth::sign_out(&session.backend)).unwrap();
            assert_eq!(session.nav.get_untracked(), NavState::SignedOut);
            subscription.unsubscribe();
        });
    }
}
