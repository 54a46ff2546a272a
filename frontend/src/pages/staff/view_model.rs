use leptos::*;

use super::repository::{self, DashboardData};
use super::utils::{PeriodFilter, ReportSummary};
use crate::api::{AttendanceRecord, Staff};
use crate::services::{auth::PasswordChange, ServiceError, ServiceResult};
use crate::state::use_session;

pub fn use_dashboard_resource() -> Resource<(), ServiceResult<DashboardData>> {
    let backend = use_session().backend;
    create_local_resource(
        || (),
        move |_| {
            let backend = backend.clone();
            async move { repository::load_dashboard(&backend).await }
        },
    )
}

pub fn use_current_staff_resource() -> Resource<(), ServiceResult<Staff>> {
    let backend = use_session().backend;
    create_local_resource(
        || (),
        move |_| {
            let backend = backend.clone();
            async move { repository::current_staff(&backend).await }
        },
    )
}

pub fn use_reports_resource() -> Resource<(), ServiceResult<Vec<ReportSummary>>> {
    let backend = use_session().backend;
    create_local_resource(
        || (),
        move |_| {
            let backend = backend.clone();
            async move { repository::load_reports(&backend).await }
        },
    )
}

#[derive(Clone, Copy)]
pub struct AttendanceViewModel {
    pub filter: RwSignal<PeriodFilter>,
    pub page: RwSignal<u64>,
    pub records: Resource<PeriodFilter, ServiceResult<Vec<AttendanceRecord>>>,
}

impl AttendanceViewModel {
    pub fn select(&self, filter: PeriodFilter) {
        self.page.set(1);
        self.filter.set(filter);
    }
}

pub fn use_attendance_view_model() -> AttendanceViewModel {
    let backend = use_session().backend;
    let filter = create_rw_signal(PeriodFilter::All);
    let page = create_rw_signal(1u64);
    let records = create_local_resource(
        move || filter.get(),
        move |filter| {
            let backend = backend.clone();
            async move { repository::load_attendance(&backend, filter).await }
        },
    );
    AttendanceViewModel {
        filter,
        page,
        records,
    }
}

#[derive(Clone, Copy)]
pub struct ProfileViewModel {
    pub new_password: RwSignal<String>,
    pub confirm_password: RwSignal<String>,
    pub error: RwSignal<Option<ServiceError>>,
    pub notice: RwSignal<Option<String>>,
    pub change_action: Action<PasswordChange, ServiceResult<()>>,
}

impl ProfileViewModel {
    pub fn submit(&self) {
        if self.change_action.pending().get_untracked() {
            return;
        }
        self.notice.set(None);
        self.change_action.dispatch(PasswordChange {
            new_password: self.new_password.get_untracked(),
            confirm_password: self.confirm_password.get_untracked(),
        });
    }
}

pub fn use_profile_view_model() -> ProfileViewModel {
    let backend = use_session().backend;
    let new_password = create_rw_signal(String::new());
    let confirm_password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<ServiceError>);
    let notice = create_rw_signal(None::<String>);

    let change_action = create_action(move |change: &PasswordChange| {
        let backend = backend.clone();
        let change = change.clone();
        async move { repository::update_own_password(&backend, change).await }
    });

    create_effect(move |_| match change_action.value().get() {
        Some(Ok(())) => {
            error.set(None);
            new_password.set(String::new());
            confirm_password.set(String::new());
            notice.set(Some("Password updated successfully.".to_string()));
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    ProfileViewModel {
        new_password,
        confirm_password,
        error,
        notice,
        change_action,
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::NavState;
    use crate::test_support::{helpers::provide_session_with, ssr::with_runtime};

    #[test]
    fn selecting_a_filter_resets_the_page() {
        with_runtime(|| {
            provide_session_with(NavState::SignedOut);
            let vm = use_attendance_view_model();
            vm.page.set(3);
            vm.select(PeriodFilter::Weekly);
            assert_eq!(vm.page.get_untracked(), 1);
            assert_eq!(vm.filter.get_untracked(), PeriodFilter::Weekly);
        });
    }

    #[test]
    fn profile_form_starts_blank() {
        with_runtime(|| {
            provide_session_with(NavState::SignedOut);
            let vm = use_profile_view_model();
            assert!(vm.new_password.get_untracked().is_empty());
            assert!(vm.notice.get_untracked().is_none());
        });
    }
}
