#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod ssr;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod helpers {
    use std::rc::Rc;

    use leptos::*;

    use crate::api::test_support::MemoryBackend;
    use crate::config::{AppConfig, RuntimeConfig};
    use crate::router::history::MockHistory;
    use crate::services::testing::memory_at;
    use crate::state::{provide_session, AppSession, NavState};

    pub fn permissive_history() -> MockHistory {
        let mut history = MockHistory::new();
        history.expect_push().return_const(());
        history.expect_replace().return_const(());
        history.expect_back().return_const(());
        history.expect_forward().return_const(());
        history.expect_current_path().returning(|| "/".to_string());
        history
    }

    pub const TEST_ORIGIN: &str = "https://qams.example";

    pub fn test_config() -> AppConfig {
        AppConfig::from_runtime(RuntimeConfig {
            supabase_url: Some("https://qams.supabase.co".into()),
            supabase_anon_key: Some("anon".into()),
            time_zone: Some("UTC".into()),
        })
    }

    /// Session over `memory`; must run inside a reactive runtime.
    pub fn provide_session_over(memory: &Rc<MemoryBackend>, nav: NavState) -> AppSession {
        let session = AppSession::new(memory.backend(), Rc::new(permissive_history()), test_config())
            .with_origin(TEST_ORIGIN);
        session.nav.set(nav);
        provide_session(session.clone());
        session
    }

    pub fn provide_session_with(nav: NavState) -> AppSession {
        let memory = memory_at(2025, 3, 10, 9, 0);
        provide_session_over(&memory, nav)
    }
}
