use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    api::{query::Query, types::*},
    utils::time::Clock,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Value>,
    /// Present when the query asked for an exact count.
    pub total: Option<u64>,
}

impl QueryResult {
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        decode_rows(self.rows)
    }

    /// Zero or one row; more than one is an error like PostgREST's `maybeSingle`.
    pub fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, ApiError> {
        match self.rows.len() {
            0 => Ok(None),
            1 => decode_rows(self.rows).map(|mut rows| rows.pop()),
            n => Err(ApiError::not_found(format!(
                "JSON object requested, multiple ({}) rows returned",
                n
            ))),
        }
    }

    pub fn single<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        self.maybe_single()?
            .ok_or_else(|| ApiError::not_found("JSON object requested, no rows returned"))
    }
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ApiError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| ApiError::unknown(format!("Failed to parse response: {}", e)))
        })
        .collect()
}

/// Table access in PostgREST terms.
#[async_trait(?Send)]
pub trait TableStore {
    async fn select(&self, query: &Query) -> Result<QueryResult, ApiError>;
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, ApiError>;
    /// Applies `patch` to every row matched by the query's filters.
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, ApiError>;
    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, ApiError>;
}

pub type AuthCallback = Rc<dyn Fn(AuthEvent, Option<AuthSession>)>;

#[async_trait(?Send)]
pub trait AuthGateway {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError>;
    async fn sign_out(&self) -> Result<(), ApiError>;
    async fn get_session(&self) -> Result<Option<AuthSession>, ApiError>;
    async fn get_user(&self) -> Result<Option<AuthUser>, ApiError>;
    async fn update_password(&self, new_password: &str) -> Result<(), ApiError>;
    async fn reset_password_for_email(&self, email: &str, redirect_to: &str)
        -> Result<(), ApiError>;
    fn on_auth_state_change(&self, callback: AuthCallback) -> AuthSubscription;
}

type ListenerList = RefCell<Vec<(u64, AuthCallback)>>;

/// Fan-out of auth events to registered callbacks.
#[derive(Default)]
pub struct AuthListeners {
    next_id: Cell<u64>,
    listeners: Rc<ListenerList>,
}

impl AuthListeners {
    pub fn subscribe(&self, callback: AuthCallback) -> AuthSubscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, callback));
        AuthSubscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn emit(&self, event: AuthEvent, session: Option<AuthSession>) {
        // Callbacks may subscribe or unsubscribe, so iterate over a snapshot.
        let snapshot: Vec<AuthCallback> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in snapshot {
            callback(event, session.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct AuthSubscription {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Everything a service call needs to talk to the backend.
#[derive(Clone)]
pub struct Backend {
    pub store: Rc<dyn TableStore>,
    pub auth: Rc<dyn AuthGateway>,
    pub clock: Rc<dyn Clock>,
}

impl Backend {
    pub fn new(store: Rc<dyn TableStore>, auth: Rc<dyn AuthGateway>, clock: Rc<dyn Clock>) -> Self {
        Self { store, auth, clock }
    }
}
