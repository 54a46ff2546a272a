use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::{
    api::{
        query::{Filter, FilterOp, Query},
        store::{
            AuthCallback, AuthGateway, AuthListeners, AuthSubscription, Backend, QueryResult,
            TableStore,
        },
        types::*,
    },
    utils::time::{Clock, FixedClock},
};

/// In-memory stand-in for the Supabase project.
pub struct MemoryBackend {
    clock: FixedClock,
    tables: RefCell<BTreeMap<String, Vec<Value>>>,
    read_failures: RefCell<HashMap<String, ApiError>>,
    write_failures: RefCell<HashMap<String, ApiError>>,
    accounts: RefCell<Vec<(AuthUser, String)>>,
    session: RefCell<Option<AuthSession>>,
    listeners: AuthListeners,
    pub password_resets: RefCell<Vec<(String, String)>>,
}

impl MemoryBackend {
    pub fn new(clock: FixedClock) -> Rc<Self> {
        Rc::new(Self {
            clock,
            tables: RefCell::new(BTreeMap::new()),
            read_failures: RefCell::new(HashMap::new()),
            write_failures: RefCell::new(HashMap::new()),
            accounts: RefCell::new(Vec::new()),
            session: RefCell::new(None),
            listeners: AuthListeners::default(),
            password_resets: RefCell::new(Vec::new()),
        })
    }

    pub fn backend(self: &Rc<Self>) -> Backend {
        Backend::new(self.clone(), self.clone(), Rc::new(self.clock))
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.borrow().get(table).cloned().unwrap_or_default()
    }

    pub fn fail_reads(&self, table: &str, error: ApiError) {
        self.read_failures
            .borrow_mut()
            .insert(table.to_string(), error);
    }

    pub fn fail_writes(&self, table: &str, error: ApiError) {
        self.write_failures
            .borrow_mut()
            .insert(table.to_string(), error);
    }

    pub fn add_account(&self, email: &str, password: &str) -> String {
        let id = format!("auth-{}", email);
        self.accounts.borrow_mut().push((
            AuthUser {
                id: id.clone(),
                email: Some(email.to_string()),
            },
            password.to_string(),
        ));
        id
    }

    /// Puts a session in place without going through sign-in.
    pub fn sign_in_as(&self, email: &str) {
        let id = format!("auth-{}", email);
        *self.session.borrow_mut() = Some(session_for(AuthUser {
            id,
            email: Some(email.to_string()),
        }));
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.accounts
            .borrow()
            .iter()
            .find(|(user, _)| user.email.as_deref() == Some(email))
            .map(|(_, pw)| pw.clone())
    }

    fn now_text(&self) -> String {
        self.clock
            .now_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn check_read(&self, table: &str) -> Result<(), ApiError> {
        match self.read_failures.borrow().get(table) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn check_write(&self, table: &str) -> Result<(), ApiError> {
        match self.write_failures.borrow().get(table) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn prepare_insert(&self, row: Value) -> Value {
        let mut object = match row {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        object
            .entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        object
            .entry("created_at")
            .or_insert_with(|| Value::String(self.now_text()));
        Value::Object(object)
    }
}

fn session_for(user: AuthUser) -> AuthSession {
    AuthSession {
        access_token: format!("token-{}", user.id),
        refresh_token: format!("refresh-{}", user.id),
        expires_at: None,
        user,
    }
}

fn as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}

fn ilike(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return text == pattern;
    }
    let mut rest = text.as_str();
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if index == 0 {
            if !rest.starts_with(part) {
                return false;
            }
            rest = &rest[part.len()..];
        } else if index == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Compare { column, op, value } => {
            let cell = as_text(row.get(column));
            match op {
                FilterOp::Eq => cell == *value,
                FilterOp::Neq => cell != *value,
                FilterOp::Gt => compare_text(&cell, value) == Ordering::Greater,
                FilterOp::Gte => compare_text(&cell, value) != Ordering::Less,
                FilterOp::Lt => compare_text(&cell, value) == Ordering::Less,
                FilterOp::Lte => compare_text(&cell, value) != Ordering::Greater,
                FilterOp::ILike => ilike(&cell, value),
            }
        }
        Filter::In { column, values } => {
            let cell = as_text(row.get(column));
            values.iter().any(|v| *v == cell)
        }
        Filter::AnyILike { columns, pattern } => columns
            .iter()
            .any(|c| row.get(c).map(|v| ilike(&as_text(Some(v)), pattern)).unwrap_or(false)),
    }
}

fn compare_cells(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let is_null = |v: Option<&Value>| matches!(v, None | Some(Value::Null));
    match (is_null(left), is_null(right)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare_text(&as_text(left), &as_text(right)),
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait(?Send)]
impl TableStore for MemoryBackend {
    async fn select(&self, query: &Query) -> Result<QueryResult, ApiError> {
        self.check_read(&query.table)?;
        let mut rows: Vec<Value> = self
            .rows(&query.table)
            .into_iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .collect();
        rows.sort_by(|a, b| {
            for order in &query.order {
                let mut ord = compare_cells(a.get(&order.column), b.get(&order.column));
                if !order.ascending {
                    ord = ord.reverse();
                }
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        let total = rows.len() as u64;
        if let Some((from, to)) = query.range {
            rows = rows
                .into_iter()
                .skip(from as usize)
                .take((to.saturating_sub(from) + 1) as usize)
                .collect();
        }
        Ok(QueryResult {
            rows,
            total: query.count_exact.then_some(total),
        })
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, ApiError> {
        self.check_write(table)?;
        let prepared: Vec<Value> = rows.into_iter().map(|r| self.prepare_insert(r)).collect();
        self.seed(table, prepared.clone());
        Ok(prepared)
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, ApiError> {
        self.check_write(&query.table)?;
        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(query.table.clone()).or_default();
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if query.filters.iter().all(|f| matches(row, f)) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, ApiError> {
        self.check_write(table)?;
        let keys: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
        let mut written = Vec::new();
        for row in rows {
            let existing_index = {
                let tables = self.tables.borrow();
                tables.get(table).and_then(|existing| {
                    existing
                        .iter()
                        .position(|e| keys.iter().all(|k| e.get(*k) == row.get(*k)))
                })
            };
            match existing_index {
                Some(index) => {
                    let mut tables = self.tables.borrow_mut();
                    if let Some(target) = tables.get_mut(table).and_then(|t| t.get_mut(index)) {
                        merge(target, &row);
                        written.push(target.clone());
                    }
                }
                None => {
                    let prepared = self.prepare_insert(row);
                    self.seed(table, vec![prepared.clone()]);
                    written.push(prepared);
                }
            }
        }
        Ok(written)
    }
}

#[async_trait(?Send)]
impl AuthGateway for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let user = self
            .accounts
            .borrow()
            .iter()
            .find(|(user, pw)| {
                user.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
                    && pw == password
            })
            .map(|(user, _)| user.clone())
            .ok_or_else(|| ApiError::new("invalid_grant", "Invalid login credentials"))?;
        let session = session_for(user);
        *self.session.borrow_mut() = Some(session.clone());
        self.listeners.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        *self.session.borrow_mut() = None;
        self.listeners.emit(AuthEvent::SignedOut, None);
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>, ApiError> {
        Ok(self.session.borrow().clone())
    }

    async fn get_user(&self) -> Result<Option<AuthUser>, ApiError> {
        Ok(self.session.borrow().as_ref().map(|s| s.user.clone()))
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ApiError> {
        let email = self
            .session
            .borrow()
            .as_ref()
            .and_then(|s| s.user.email.clone())
            .ok_or_else(|| ApiError::new("UNAUTHORIZED", "Not signed in"))?;
        for (user, pw) in self.accounts.borrow_mut().iter_mut() {
            if user.email.as_deref() == Some(email.as_str()) {
                *pw = new_password.to_string();
            }
        }
        self.listeners
            .emit(AuthEvent::UserUpdated, self.session.borrow().clone());
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ApiError> {
        self.password_resets
            .borrow_mut()
            .push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }

    fn on_auth_state_change(&self, callback: AuthCallback) -> AuthSubscription {
        self.listeners.subscribe(callback)
    }
}

/// Row builders shared by service tests.
pub mod fixtures {
    use serde_json::{json, Value};

    pub fn staff_row(id: &str, code: &str, name: &str, role: &str, department: &str) -> Value {
        json!({
            "id": id,
            "staff_id": code,
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "department": department,
            "role": role,
            "status": "active",
            "auth_user_id": null,
            "created_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn attendance_row(
        id: &str,
        staff_id: &str,
        date: &str,
        check_in: Option<&str>,
        check_out: Option<&str>,
        is_late: bool,
    ) -> Value {
        json!({
            "id": id,
            "staff_id": staff_id,
            "date": date,
            "check_in_time": check_in,
            "check_out_time": check_out,
            "is_late": is_late,
            "status": "Present",
            "created_at": format!("{}T00:00:00Z", date)
        })
    }

    pub fn setting_row(key: &str, value: &str) -> Value {
        json!({ "key": key, "value": value, "updated_by": null })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn backend() -> Rc<MemoryBackend> {
        MemoryBackend::new(FixedClock::at_local(
            chrono_tz::UTC,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            9,
            0,
        ))
    }

    #[test]
    fn ilike_supports_leading_trailing_and_inner_wildcards() {
        assert!(ilike("Ada Lovelace", "%love%"));
        assert!(ilike("Ada Lovelace", "ada%"));
        assert!(ilike("Ada Lovelace", "%lace"));
        assert!(ilike("Ada Lovelace", "a%l%e"));
        assert!(!ilike("Ada Lovelace", "%grace%"));
        assert!(ilike("STF001", "stf001"));
    }

    #[tokio::test]
    async fn select_filters_orders_and_counts_before_range() {
        let memory = backend();
        memory.seed(
            "attendance",
            vec![
                json!({"id": "1", "date": "2025-03-01"}),
                json!({"id": "2", "date": "2025-03-03"}),
                json!({"id": "3", "date": "2025-03-02"}),
                json!({"id": "4", "date": "2025-02-27"}),
            ],
        );
        let result = memory
            .select(
                &Query::table("attendance")
                    .gte("date", "2025-03-01")
                    .order("date", false)
                    .range(0, 1)
                    .count_exact(),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = result.rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(result.total, Some(3));
    }

    #[tokio::test]
    async fn upsert_merges_on_conflict_key() {
        let memory = backend();
        memory.seed("settings", vec![json!({"key": "office_start_time", "value": "08:00"})]);
        memory
            .upsert(
                "settings",
                vec![
                    json!({"key": "office_start_time", "value": "09:00"}),
                    json!({"key": "office_end_time", "value": "18:00"}),
                ],
                "key",
            )
            .await
            .unwrap();
        let rows = memory.rows("settings");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["value"], json!("09:00"));
        assert!(rows[1]["id"].is_string());
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let memory = backend();
        memory.fail_writes("attendance", ApiError::new("42501", "denied"));
        let err = memory
            .insert("attendance", vec![json!({})])
            .await
            .unwrap_err();
        assert!(err.is_rls_violation());
        assert!(memory.rows("attendance").is_empty());
    }

    #[tokio::test]
    async fn auth_round_trip() {
        let memory = backend();
        memory.add_account("ada@example.com", "secret1");
        assert!(memory
            .sign_in_with_password("ada@example.com", "wrong")
            .await
            .is_err());
        let session = memory
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
        assert!(memory.get_user().await.unwrap().is_some());
        memory.sign_out().await.unwrap();
        assert!(memory.get_session().await.unwrap().is_none());
    }
}
