use leptos::*;

use super::repository::{self, GeneratedReport, ReportRequest, SettingsSnapshot};
use super::utils::{
    parse_office_hours, parse_report_type, report_type_value, AttendanceFilterForm, StaffForm,
};
use crate::api::{AttendanceWithStaff, ReportType, SavedReport, Staff, StaffRole};
use crate::services::{
    attendance::TodayOverview, restore::RestoreStats, staff::NewStaff, Paged, ServiceError,
    ServiceResult,
};
use crate::state::use_session;
use crate::utils::time::month_label;

#[derive(Clone, Copy)]
pub struct DashboardViewModel {
    pub page: RwSignal<u64>,
    pub overview: Resource<u64, ServiceResult<TodayOverview>>,
}

pub fn use_dashboard_view_model() -> DashboardViewModel {
    let backend = use_session().backend;
    let page = create_rw_signal(1u64);
    let overview = create_local_resource(
        move || page.get(),
        move |page| {
            let backend = backend.clone();
            async move { repository::load_today(&backend, page).await }
        },
    );
    DashboardViewModel { page, overview }
}

#[derive(Clone, Copy)]
pub struct StaffFormState {
    pub staff_id: RwSignal<String>,
    pub name: RwSignal<String>,
    pub email: RwSignal<String>,
    pub department: RwSignal<String>,
    pub role: RwSignal<String>,
}

impl StaffFormState {
    fn new() -> Self {
        Self {
            staff_id: create_rw_signal(String::new()),
            name: create_rw_signal(String::new()),
            email: create_rw_signal(String::new()),
            department: create_rw_signal(String::new()),
            role: create_rw_signal(StaffRole::Staff.as_str().to_string()),
        }
    }

    pub fn snapshot(&self) -> StaffForm {
        StaffForm {
            staff_id: self.staff_id.get_untracked(),
            name: self.name.get_untracked(),
            email: self.email.get_untracked(),
            department: self.department.get_untracked(),
            role: self.role.get_untracked(),
        }
    }

    pub fn clear(&self) {
        for field in [self.staff_id, self.name, self.email, self.department] {
            field.set(String::new());
        }
        self.role.set(StaffRole::Staff.as_str().to_string());
    }
}

#[derive(Clone, Copy)]
pub struct StaffViewModel {
    pub page: RwSignal<u64>,
    pub search_input: RwSignal<String>,
    pub search: RwSignal<String>,
    pub reload: RwSignal<u32>,
    pub staff: Resource<(u64, String, u32), ServiceResult<Paged<Staff>>>,
    pub form: StaffFormState,
    pub show_form: RwSignal<bool>,
    pub error: RwSignal<Option<ServiceError>>,
    pub notice: RwSignal<Option<String>>,
    pub create_action: Action<NewStaff, ServiceResult<Staff>>,
    /// Staff member awaiting activate/deactivate confirmation.
    pub pending_toggle: RwSignal<Option<Staff>>,
    pub toggle_action: Action<(String, bool), ServiceResult<Staff>>,
    pub qr_for: RwSignal<Option<Staff>>,
}

impl StaffViewModel {
    pub fn apply_search(&self) {
        self.page.set(1);
        self.search.set(self.search_input.get_untracked().trim().to_string());
    }

    pub fn submit_form(&self) {
        if !self.create_action.pending().get_untracked() {
            self.create_action.dispatch(self.form.snapshot().to_new_staff());
        }
    }

    pub fn confirm_toggle(&self) {
        if let Some(staff) = self.pending_toggle.get_untracked() {
            self.toggle_action.dispatch((staff.id.clone(), !staff.is_active()));
        }
        self.pending_toggle.set(None);
    }
}

pub fn use_staff_view_model() -> StaffViewModel {
    let backend = use_session().backend;
    let page = create_rw_signal(1u64);
    let search_input = create_rw_signal(String::new());
    let search = create_rw_signal(String::new());
    let reload = create_rw_signal(0u32);
    let error = create_rw_signal(None::<ServiceError>);
    let notice = create_rw_signal(None::<String>);
    let show_form = create_rw_signal(false);
    let form = StaffFormState::new();

    let list_backend = backend.clone();
    let staff = create_local_resource(
        move || (page.get(), search.get(), reload.get()),
        move |(page, search, _)| {
            let backend = list_backend.clone();
            async move { repository::load_staff(&backend, page, search).await }
        },
    );

    let create_backend = backend.clone();
    let create_staff_action = create_action(move |new_staff: &NewStaff| {
        let backend = create_backend.clone();
        let new_staff = new_staff.clone();
        async move { repository::add_staff(&backend, new_staff).await }
    });
    create_effect(move |_| match create_staff_action.value().get() {
        Some(Ok(created)) => {
            error.set(None);
            form.clear();
            show_form.set(false);
            notice.set(Some(format!("Added {} ({})", created.name, created.staff_id)));
            reload.update(|n| *n += 1);
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    let toggle_action = create_action(move |(id, active): &(String, bool)| {
        let backend = backend.clone();
        let (id, active) = (id.clone(), *active);
        async move { repository::set_active(&backend, &id, active).await }
    });
    create_effect(move |_| match toggle_action.value().get() {
        Some(Ok(updated)) => {
            error.set(None);
            let state = if updated.is_active() { "activated" } else { "deactivated" };
            notice.set(Some(format!("{} {}", updated.name, state)));
            reload.update(|n| *n += 1);
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    StaffViewModel {
        page,
        search_input,
        search,
        reload,
        staff,
        form,
        show_form,
        error,
        notice,
        create_action: create_staff_action,
        pending_toggle: create_rw_signal(None),
        toggle_action,
        qr_for: create_rw_signal(None),
    }
}

#[derive(Clone, Copy)]
pub struct AttendanceViewModel {
    pub start_date: RwSignal<String>,
    pub end_date: RwSignal<String>,
    pub department: RwSignal<String>,
    pub staff_id: RwSignal<String>,
    pub applied: RwSignal<AttendanceFilterForm>,
    pub page: RwSignal<u64>,
    pub filter_error: RwSignal<Option<String>>,
    pub departments: Resource<(), Vec<String>>,
    pub records: Resource<(AttendanceFilterForm, u64), ServiceResult<Paged<AttendanceWithStaff>>>,
}

impl AttendanceViewModel {
    fn form(&self) -> AttendanceFilterForm {
        AttendanceFilterForm {
            start_date: self.start_date.get_untracked(),
            end_date: self.end_date.get_untracked(),
            department: self.department.get_untracked(),
            staff_id: self.staff_id.get_untracked(),
        }
    }

    pub fn apply(&self) {
        let form = self.form();
        match form.to_filter(1) {
            Ok(_) => {
                self.filter_error.set(None);
                self.page.set(1);
                self.applied.set(form);
            }
            Err(message) => self.filter_error.set(Some(message)),
        }
    }

    pub fn clear(&self) {
        for field in [self.start_date, self.end_date, self.department, self.staff_id] {
            field.set(String::new());
        }
        self.filter_error.set(None);
        self.page.set(1);
        self.applied.set(AttendanceFilterForm::default());
    }
}

pub fn use_attendance_view_model() -> AttendanceViewModel {
    let backend = use_session().backend;
    let applied = create_rw_signal(AttendanceFilterForm::default());
    let page = create_rw_signal(1u64);

    let dept_backend = backend.clone();
    let departments = create_local_resource(
        || (),
        move |_| {
            let backend = dept_backend.clone();
            async move {
                repository::load_departments(&backend).await.unwrap_or_else(|err| {
                    log::error!("failed to load departments: {}", err);
                    Vec::new()
                })
            }
        },
    );

    let records = create_local_resource(
        move || (applied.get(), page.get()),
        move |(form, page)| {
            let backend = backend.clone();
            async move {
                let filter = form.to_filter(page).map_err(ServiceError::Validation)?;
                repository::load_attendance(&backend, filter).await
            }
        },
    );

    AttendanceViewModel {
        start_date: create_rw_signal(String::new()),
        end_date: create_rw_signal(String::new()),
        department: create_rw_signal(String::new()),
        staff_id: create_rw_signal(String::new()),
        applied,
        page,
        filter_error: create_rw_signal(None),
        departments,
        records,
    }
}

#[derive(Clone, Copy)]
pub struct ReportsViewModel {
    pub report_type: RwSignal<String>,
    pub month: RwSignal<String>,
    pub department: RwSignal<String>,
    pub staff_id: RwSignal<String>,
    pub departments: Resource<(), Vec<String>>,
    pub staff_choices: Resource<(), Vec<(String, String)>>,
    pub generated: RwSignal<Option<GeneratedReport>>,
    pub error: RwSignal<Option<ServiceError>>,
    pub notice: RwSignal<Option<String>>,
    pub generate_action: Action<ReportRequest, ServiceResult<GeneratedReport>>,
    pub save_action: Action<GeneratedReport, ServiceResult<SavedReport>>,
    pub saved_page: RwSignal<u64>,
    pub saved_reload: RwSignal<u32>,
    pub saved: Resource<(u64, u32), ServiceResult<Paged<SavedReport>>>,
}

impl ReportsViewModel {
    pub fn selected_type(&self) -> ReportType {
        parse_report_type(&self.report_type.get()).unwrap_or(ReportType::Monthly)
    }

    pub fn generate(&self) {
        if self.generate_action.pending().get_untracked() {
            return;
        }
        let department = Some(self.department.get_untracked()).filter(|d| !d.is_empty());
        let staff_id = Some(self.staff_id.get_untracked()).filter(|s| !s.is_empty());
        self.notice.set(None);
        self.generate_action.dispatch(ReportRequest {
            report_type: self.selected_type(),
            month: self.month.get_untracked(),
            department,
            staff_id,
        });
    }

    pub fn save(&self) {
        if self.save_action.pending().get_untracked() {
            return;
        }
        if let Some(report) = self.generated.get_untracked() {
            self.save_action.dispatch(report);
        }
    }
}

pub fn use_reports_view_model() -> ReportsViewModel {
    let session = use_session();
    let backend = session.backend.clone();
    let month = month_label(backend.clock.today());
    let error = create_rw_signal(None::<ServiceError>);
    let notice = create_rw_signal(None::<String>);
    let generated = create_rw_signal(None::<GeneratedReport>);
    let saved_page = create_rw_signal(1u64);
    let saved_reload = create_rw_signal(0u32);

    let dept_backend = backend.clone();
    let departments = create_local_resource(
        || (),
        move |_| {
            let backend = dept_backend.clone();
            async move { repository::load_departments(&backend).await.unwrap_or_default() }
        },
    );
    let choice_backend = backend.clone();
    let staff_choices = create_local_resource(
        || (),
        move |_| {
            let backend = choice_backend.clone();
            async move { repository::staff_choices(&backend).await.unwrap_or_default() }
        },
    );

    let generate_backend = backend.clone();
    let generate_action = create_action(move |request: &ReportRequest| {
        let backend = generate_backend.clone();
        let request = request.clone();
        async move { repository::generate(&backend, request).await }
    });
    create_effect(move |_| match generate_action.value().get() {
        Some(Ok(report)) => {
            error.set(None);
            generated.set(Some(report));
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    let save_backend = backend.clone();
    let save_action = create_action(move |report: &GeneratedReport| {
        let backend = save_backend.clone();
        let report = report.clone();
        async move { repository::save_generated(&backend, report).await }
    });
    create_effect(move |_| match save_action.value().get() {
        Some(Ok(_)) => {
            error.set(None);
            notice.set(Some("Report saved successfully.".to_string()));
            saved_page.set(1);
            saved_reload.update(|n| *n += 1);
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    let saved = create_local_resource(
        move || (saved_page.get(), saved_reload.get()),
        move |(page, _)| {
            let backend = backend.clone();
            async move { repository::load_saved_reports(&backend, page).await }
        },
    );

    ReportsViewModel {
        report_type: create_rw_signal(report_type_value(ReportType::Monthly).to_string()),
        month: create_rw_signal(month),
        department: create_rw_signal(String::new()),
        staff_id: create_rw_signal(String::new()),
        departments,
        staff_choices,
        generated,
        error,
        notice,
        generate_action,
        save_action,
        saved_page,
        saved_reload,
        saved,
    }
}

#[derive(Clone, Copy)]
pub struct SettingsViewModel {
    pub office_start: RwSignal<String>,
    pub office_end: RwSignal<String>,
    pub late_threshold: RwSignal<String>,
    pub ip_restriction: RwSignal<bool>,
    pub auto_reports: RwSignal<bool>,
    pub loaded: Resource<(), SettingsSnapshot>,
    pub error: RwSignal<Option<ServiceError>>,
    pub notice: RwSignal<Option<String>>,
    pub save_action: Action<SettingsSnapshot, ServiceResult<()>>,
    pub export_action: Action<(), ServiceResult<String>>,
    pub backup_text: RwSignal<Option<String>>,
    pub backup_name: RwSignal<Option<String>>,
    pub overwrite_existing: RwSignal<bool>,
    pub restore_prompt: RwSignal<bool>,
    pub restore_action: Action<(String, bool), ServiceResult<RestoreStats>>,
    pub restore_stats: RwSignal<Option<RestoreStats>>,
}

impl SettingsViewModel {
    pub fn fill(&self, snapshot: &SettingsSnapshot) {
        self.office_start.set(snapshot.hours.start_label());
        self.office_end.set(snapshot.hours.end_label());
        self.late_threshold.set(snapshot.hours.late_threshold_minutes.to_string());
        self.ip_restriction.set(snapshot.ip_restriction);
        self.auto_reports.set(snapshot.auto_reports);
    }

    pub fn save(&self) {
        if self.save_action.pending().get_untracked() {
            return;
        }
        match parse_office_hours(
            &self.office_start.get_untracked(),
            &self.office_end.get_untracked(),
            &self.late_threshold.get_untracked(),
        ) {
            Ok(hours) => {
                self.notice.set(None);
                self.save_action.dispatch(SettingsSnapshot {
                    hours,
                    ip_restriction: self.ip_restriction.get_untracked(),
                    auto_reports: self.auto_reports.get_untracked(),
                });
            }
            Err(message) => self.error.set(Some(ServiceError::Validation(message))),
        }
    }

    pub fn request_restore(&self) {
        if self.backup_text.get_untracked().is_some() {
            self.restore_prompt.set(true);
        } else {
            self.error.set(Some(ServiceError::Validation(
                "Choose a backup file first".to_string(),
            )));
        }
    }

    pub fn confirm_restore(&self) {
        self.restore_prompt.set(false);
        if let Some(text) = self.backup_text.get_untracked() {
            self.restore_action
                .dispatch((text, self.overwrite_existing.get_untracked()));
        }
    }
}

pub fn use_settings_view_model() -> SettingsViewModel {
    let backend = use_session().backend;
    let error = create_rw_signal(None::<ServiceError>);
    let notice = create_rw_signal(None::<String>);
    let restore_stats = create_rw_signal(None::<RestoreStats>);

    let load_backend = backend.clone();
    let loaded = create_local_resource(
        || (),
        move |_| {
            let backend = load_backend.clone();
            async move { repository::load_settings(&backend).await }
        },
    );

    let save_backend = backend.clone();
    let save_action = create_action(move |snapshot: &SettingsSnapshot| {
        let backend = save_backend.clone();
        let snapshot = *snapshot;
        async move { repository::save_settings(&backend, snapshot).await }
    });
    create_effect(move |_| match save_action.value().get() {
        Some(Ok(())) => {
            error.set(None);
            notice.set(Some("Settings saved successfully.".to_string()));
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    let export_backend = backend.clone();
    let export_action = create_action(move |_: &()| {
        let backend = export_backend.clone();
        async move { repository::export_backup(&backend).await }
    });
    let today_backend = backend.clone();
    create_effect(move |_| match export_action.value().get() {
        Some(Ok(json)) => {
            let today = today_backend.clock.today();
            match crate::services::backup::download_backup(&json, today) {
                Ok(()) => notice.set(Some("Backup downloaded.".to_string())),
                Err(message) => error.set(Some(ServiceError::InvalidInput(message))),
            }
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    let restore_action = create_action(move |(text, overwrite): &(String, bool)| {
        let backend = backend.clone();
        let (text, overwrite) = (text.clone(), *overwrite);
        async move {
            let backup = repository::read_backup(&text)?;
            repository::restore_backup(&backend, backup, overwrite).await
        }
    });
    create_effect(move |_| match restore_action.value().get() {
        Some(Ok(stats)) => {
            error.set(None);
            notice.set(Some(super::utils::restore_summary(&stats)));
            restore_stats.set(Some(stats));
        }
        Some(Err(err)) => error.set(Some(err)),
        None => {}
    });

    SettingsViewModel {
        office_start: create_rw_signal(String::new()),
        office_end: create_rw_signal(String::new()),
        late_threshold: create_rw_signal(String::new()),
        ip_restriction: create_rw_signal(false),
        auto_reports: create_rw_signal(true),
        loaded,
        error,
        notice,
        save_action,
        export_action,
        backup_text: create_rw_signal(None),
        backup_name: create_rw_signal(None),
        overwrite_existing: create_rw_signal(false),
        restore_prompt: create_rw_signal(false),
        restore_action,
        restore_stats,
    }
}
