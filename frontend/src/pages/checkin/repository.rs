use crate::api::Backend;
use crate::router::path::build_query;
use crate::services::{
    attendance::{record_check_in, record_check_out},
    auth::{get_session, sign_in, sign_out},
    ServiceError, ServiceResult,
};
use crate::utils::time::local_time_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckAction {
    CheckIn,
    CheckOut,
}

impl CheckAction {
    pub fn label(&self) -> &'static str {
        match self {
            CheckAction::CheckIn => "Check-In",
            CheckAction::CheckOut => "Check-Out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: String,
    pub time: String,
    pub action: CheckAction,
    pub department: String,
    pub staff_code: String,
}

impl CheckOutcome {
    pub fn success_url(&self) -> String {
        format!(
            "/scan/success?{}",
            build_query(&[
                ("name", &self.name),
                ("time", &self.time),
                ("action", self.action.label()),
                ("department", &self.department),
                ("staffId", &self.staff_code),
            ])
        )
    }
}

/// Signs in with the form credentials and records the action. The device
/// is left signed out afterwards unless this same account was already
/// signed in; another account's session is replaced by the sign-in and
/// closed with it.
pub async fn sign_in_and_record(
    backend: &Backend,
    email: &str,
    password: &str,
    action: CheckAction,
) -> ServiceResult<CheckOutcome> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ServiceError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    let prior_user = match get_session(backend).await {
        Ok(session) => session.map(|s| s.user.id),
        Err(err) => {
            log::debug!("no prior session: {}", err);
            None
        }
    };
    let user = sign_in(backend, email, password).await?;
    let keep_session = prior_user.as_deref() == Some(user.auth_user.id.as_str());
    let recorded = match action {
        CheckAction::CheckIn => record_check_in(backend, &user.staff.id).await,
        CheckAction::CheckOut => record_check_out(backend, &user.staff.id).await,
    };
    if !keep_session {
        if let Err(err) = sign_out(backend).await {
            log::warn!("could not close check-in session: {}", err);
        }
    }
    let record = recorded?;

    let stamp = match action {
        CheckAction::CheckIn => record.check_in_time,
        CheckAction::CheckOut => record.check_out_time,
    }
    .unwrap_or_else(|| backend.clock.now_utc());
    log::info!("{} recorded for {}", action.label(), user.staff.staff_id);
    Ok(CheckOutcome {
        time: local_time_label(&stamp, &backend.clock.time_zone()),
        department: user.staff.department_label(),
        name: user.staff.name,
        action,
        staff_code: user.staff.staff_id,
    })
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::test_support::fixtures::staff_row;
    use crate::services::auth::is_authenticated;
    use crate::services::testing::memory_at;
    use serde_json::json;

    #[tokio::test]
    async fn check_in_builds_success_url_and_signs_out() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        memory.seed("staff", vec![staff_row("s1", "STF001", "Ada", "Staff", "Finance")]);
        memory.add_account("ada@example.com", "secret1");
        let backend = memory.backend();

        let outcome = sign_in_and_record(&backend, "ada@example.com", "secret1", CheckAction::CheckIn)
            .await
            .unwrap();
        assert_eq!(outcome.time, "09:00");
        assert_eq!(
            outcome.success_url(),
            "/scan/success?name=Ada&time=09%3A00&action=Check-In&department=Finance&staffId=STF001"
        );
        assert!(!is_authenticated(&backend).await);
        assert_eq!(memory.rows("attendance").len(), 1);
    }

    #[tokio::test]
    async fn inactive_account_leaves_no_session() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        let mut inactive = staff_row("s1", "STF001", "Ada", "Staff", "Finance");
        inactive["status"] = json!("inactive");
        memory.seed("staff", vec![inactive]);
        memory.add_account("ada@example.com", "secret1");
        let backend = memory.backend();

        let err = sign_in_and_record(&backend, "ada@example.com", "secret1", CheckAction::CheckIn)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::AccountInactive);
        assert!(!is_authenticated(&backend).await);
        assert!(memory.rows("attendance").is_empty());
    }

    #[tokio::test]
    async fn another_accounts_session_is_closed_after_check_in() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        memory.seed(
            "staff",
            vec![
                staff_row("s1", "STF001", "Ada", "Staff", "Finance"),
                staff_row("s2", "STF002", "Bob", "Staff", "Finance"),
            ],
        );
        memory.add_account("ada@example.com", "secret1");
        memory.add_account("bob@example.com", "secret2");
        memory.sign_in_as("ada@example.com");
        let backend = memory.backend();

        sign_in_and_record(&backend, "bob@example.com", "secret2", CheckAction::CheckIn)
            .await
            .unwrap();
        assert!(!is_authenticated(&backend).await);
    }

    #[tokio::test]
    async fn own_session_stays_open_after_check_in() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        memory.seed("staff", vec![staff_row("s1", "STF001", "Ada", "Staff", "Finance")]);
        memory.add_account("ada@example.com", "secret1");
        memory.sign_in_as("ada@example.com");
        let backend = memory.backend();

        sign_in_and_record(&backend, "ada@example.com", "secret1", CheckAction::CheckIn)
            .await
            .unwrap();
        assert!(is_authenticated(&backend).await);
    }

    #[tokio::test]
    async fn check_out_without_check_in_is_rejected() {
        let memory = memory_at(2025, 3, 10, 17, 5);
        memory.seed("staff", vec![staff_row("s1", "STF001", "Ada", "Staff", "Finance")]);
        memory.add_account("ada@example.com", "secret1");
        let err = sign_in_and_record(&memory.backend(), "ada@example.com", "secret1", CheckAction::CheckOut)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NoCheckIn);
    }

    #[tokio::test]
    async fn blank_credentials_and_wrong_password() {
        let memory = memory_at(2025, 3, 10, 9, 0);
        let backend = memory.backend();
        assert!(matches!(
            sign_in_and_record(&backend, " ", "", CheckAction::CheckIn).await,
            Err(ServiceError::Validation(_))
        ));
        memory.seed("staff", vec![staff_row("s1", "STF001", "Ada", "Staff", "Finance")]);
        memory.add_account("ada@example.com", "secret1");
        assert_eq!(
            sign_in_and_record(&backend, "ada@example.com", "nope", CheckAction::CheckIn).await,
            Err(ServiceError::InvalidCredentials)
        );
    }
}
