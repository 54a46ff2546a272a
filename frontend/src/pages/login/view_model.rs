use leptos::*;

use super::utils::{post_login_target, validate_credentials};
use crate::services::{
    auth::{self, CurrentUser},
    ServiceError, ServiceResult,
};
use crate::state::{use_session, NavState};

#[derive(Clone, Copy)]
pub struct LoginViewModel {
    pub email: RwSignal<String>,
    pub password: RwSignal<String>,
    pub error: RwSignal<Option<ServiceError>>,
    pub notice: RwSignal<Option<String>>,
    pub login_action: Action<(), ServiceResult<CurrentUser>>,
    pub reset_action: Action<(), ServiceResult<()>>,
}

impl LoginViewModel {
    /// Checks the form locally before dispatching.
    pub fn submit(&self) {
        if self.login_action.pending().get_untracked() {
            return;
        }
        match validate_credentials(&self.email.get_untracked(), &self.password.get_untracked()) {
            Ok(()) => {
                self.error.set(None);
                self.login_action.dispatch(());
            }
            Err(msg) => self.error.set(Some(ServiceError::Validation(msg))),
        }
    }

    pub fn request_reset(&self) {
        if self.email.get_untracked().trim().is_empty() {
            self.error.set(Some(ServiceError::Validation(
                "Enter your email to reset your password".to_string(),
            )));
            return;
        }
        self.reset_action.dispatch(());
    }
}

pub fn use_login_view_model(redirect: Option<String>) -> LoginViewModel {
    let session = use_session();
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<ServiceError>);
    let notice = create_rw_signal(None::<String>);

    let backend = session.backend.clone();
    let login_action = create_action(move |_: &()| {
        let backend = backend.clone();
        let (email, pw) = (email.get_untracked(), password.get_untracked());
        async move { auth::sign_in(&backend, &email, &pw).await }
    });

    let backend = session.backend.clone();
    let origin = session.origin.clone();
    let reset_action = create_action(move |_: &()| {
        let backend = backend.clone();
        let origin = origin.clone();
        let email = email.get_untracked();
        async move { auth::reset_password(&backend, &email, &origin).await }
    });

    let nav_session = session.clone();
    create_effect(move |_| match login_action.value().get() {
        Some(Ok(user)) => {
            password.set(String::new());
            let target = post_login_target(redirect.as_deref(), user.staff.role);
            nav_session.nav.set(NavState::SignedIn {
                name: user.staff.name,
                role: user.staff.role,
            });
            nav_session.navigate(&target);
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    create_effect(move |_| match reset_action.value().get() {
        Some(Ok(())) => {
            error.set(None);
            notice.set(Some("Password reset email sent. Check your inbox.".to_string()));
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    LoginViewModel {
        email,
        password,
        error,
        notice,
        login_action,
        reset_action,
    }
}
