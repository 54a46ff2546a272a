use leptos::*;

use super::repository::{self, CheckAction, CheckOutcome};
use crate::services::{ServiceError, ServiceResult};
use crate::state::use_session;

#[derive(Clone, Copy)]
pub struct CheckInViewModel {
    pub email: RwSignal<String>,
    pub password: RwSignal<String>,
    pub error: RwSignal<Option<ServiceError>>,
    pub record_action: Action<CheckAction, ServiceResult<CheckOutcome>>,
}

pub fn use_checkin_view_model(initial_email: Option<String>) -> CheckInViewModel {
    let session = use_session();
    let email = create_rw_signal(initial_email.unwrap_or_default());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<ServiceError>);

    let backend = session.backend.clone();
    let record_action = create_action(move |action: &CheckAction| {
        let backend = backend.clone();
        let action = *action;
        let (email, pw) = (email.get_untracked(), password.get_untracked());
        async move { repository::sign_in_and_record(&backend, &email, &pw, action).await }
    });

    create_effect(move |_| match record_action.value().get() {
        Some(Ok(outcome)) => {
            error.set(None);
            password.set(String::new());
            session.navigate(&outcome.success_url());
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    CheckInViewModel {
        email,
        password,
        error,
        record_action,
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_with, ssr::with_runtime};

    #[test]
    fn starts_empty() {
        with_runtime(|| {
            provide_session_with(NavState::SignedOut);
            let vm = use_checkin_view_model(None);
            assert!(vm.email.get_untracked().is_empty());
            assert!(vm.error.get_untracked().is_none());
            assert!(!vm.record_action.pending().get_untracked());
        });
    }
}
