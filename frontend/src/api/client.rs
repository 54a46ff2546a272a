use std::cell::RefCell;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{
    query::{parse_content_range_total, Query},
    store::{AuthCallback, AuthGateway, AuthListeners, AuthSubscription, QueryResult, TableStore},
    types::*,
};

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
const SESSION_KEY: &str = "qams.auth.session";

/// Persisted auth session: `localStorage` in the browser, memory elsewhere.
pub struct SessionStore {
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    memory: RefCell<Option<AuthSession>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            memory: RefCell::new(None),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load(&self) -> Option<AuthSession> {
        let raw = crate::utils::storage::read_item(SESSION_KEY).ok()??;
        serde_json::from_str(&raw).ok()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self, session: &AuthSession) {
        match serde_json::to_string(session) {
            Ok(raw) => {
                if let Err(err) = crate::utils::storage::write_item(SESSION_KEY, &raw) {
                    log::warn!("could not persist session: {}", err);
                }
            }
            Err(err) => log::warn!("could not serialize session: {}", err),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn clear(&self) {
        let _ = crate::utils::storage::remove_item(SESSION_KEY);
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(&self) -> Option<AuthSession> {
        self.memory.borrow().clone()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, session: &AuthSession) {
        *self.memory.borrow_mut() = Some(session.clone());
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn clear(&self) {
        *self.memory.borrow_mut() = None;
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now_unix: i64) -> AuthSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now_unix + secs));
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Supabase REST (`/rest/v1`) and auth (`/auth/v1`) client.
pub struct SupabaseClient {
    client: Client,
    url: String,
    anon_key: String,
    sessions: SessionStore,
    listeners: AuthListeners,
}

impl SupabaseClient {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            sessions: SessionStore::new(),
            listeners: AuthListeners::default(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    fn with_keys(&self, builder: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", bearer.unwrap_or(&self.anon_key)),
            )
    }

    /// Current access token, refreshed first when expired.
    async fn access_token(&self) -> Option<String> {
        self.current_session()
            .await
            .ok()
            .flatten()
            .map(|s| s.access_token)
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, ApiError> {
        let session = match self.sessions.load() {
            Some(session) => session,
            None => return Ok(None),
        };
        if !session.is_expired_at(now_unix()) {
            return Ok(Some(session));
        }
        match self.refresh(&session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(err) => {
                log::warn!("session refresh failed: {}", err);
                self.sessions.clear();
                self.listeners.emit(AuthEvent::SignedOut, None);
                Ok(None)
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, ApiError> {
        let response = self
            .with_keys(
                self.client
                    .post(self.auth_url("token"))
                    .query(&[("grant_type", "refresh_token")]),
                None,
            )
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))?;
        let token: TokenResponse = parse_json(response).await?;
        let session = token.into_session(now_unix());
        self.sessions.save(&session);
        self.listeners
            .emit(AuthEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }

    async fn send_rest(
        &self,
        builder: RequestBuilder,
        prefer: &[&str],
    ) -> Result<Response, ApiError> {
        let token = self.access_token().await;
        let mut builder = self.with_keys(builder, token.as_deref());
        if !prefer.is_empty() {
            builder = builder.header("Prefer", prefer.join(","));
        }
        builder
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    ApiError::from_backend_body(status, &body)
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::unknown(format!("Failed to parse response: {}", e)))
}

async fn parse_rows(response: Response) -> Result<Vec<Value>, ApiError> {
    match parse_json::<Value>(response).await? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

#[async_trait(?Send)]
impl TableStore for SupabaseClient {
    async fn select(&self, query: &Query) -> Result<QueryResult, ApiError> {
        let mut builder = self
            .client
            .get(self.rest_url(&query.table))
            .query(&query.to_params());
        for (name, value) in query.headers() {
            if name != "Prefer" {
                builder = builder.header(name, value);
            }
        }
        let prefer: &[&str] = if query.count_exact {
            &["count=exact"]
        } else {
            &[]
        };
        let response = self.send_rest(builder, prefer).await?;
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);
        let rows = parse_rows(response).await?;
        Ok(QueryResult {
            rows,
            total: if query.count_exact { total } else { None },
        })
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, ApiError> {
        let builder = self.client.post(self.rest_url(table)).json(&rows);
        let response = self.send_rest(builder, &["return=representation"]).await?;
        parse_rows(response).await
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, ApiError> {
        if query.filters.is_empty() {
            return Err(ApiError::validation("Refusing to update without a filter"));
        }
        let builder = self
            .client
            .patch(self.rest_url(&query.table))
            .query(&query.filter_params())
            .json(&patch);
        let response = self.send_rest(builder, &["return=representation"]).await?;
        parse_rows(response).await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, ApiError> {
        let builder = self
            .client
            .post(self.rest_url(table))
            .query(&[("on_conflict", on_conflict)])
            .json(&rows);
        let response = self
            .send_rest(
                builder,
                &["resolution=merge-duplicates", "return=representation"],
            )
            .await?;
        parse_rows(response).await
    }
}

#[async_trait(?Send)]
impl AuthGateway for SupabaseClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let response = self
            .with_keys(
                self.client
                    .post(self.auth_url("token"))
                    .query(&[("grant_type", "password")]),
                None,
            )
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))?;
        let token: TokenResponse = parse_json(response).await?;
        let session = token.into_session(now_unix());
        self.sessions.save(&session);
        self.listeners.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        let token = self.sessions.load().map(|s| s.access_token);
        let result = match token {
            Some(token) => self
                .with_keys(self.client.post(self.auth_url("logout")), Some(&token))
                .send()
                .await
                .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))
                .map(|_| ()),
            None => Ok(()),
        };
        // The local session is dropped even if the server call failed.
        self.sessions.clear();
        self.listeners.emit(AuthEvent::SignedOut, None);
        result
    }

    async fn get_session(&self) -> Result<Option<AuthSession>, ApiError> {
        self.current_session().await
    }

    async fn get_user(&self) -> Result<Option<AuthUser>, ApiError> {
        let token = match self.access_token().await {
            Some(token) => token,
            None => return Ok(None),
        };
        let response = self
            .with_keys(self.client.get(self.auth_url("user")), Some(&token))
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))?;
        if response.status().as_u16() == 401 {
            return Ok(None);
        }
        parse_json::<AuthUser>(response).await.map(Some)
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ApiError> {
        let token = self
            .access_token()
            .await
            .ok_or_else(|| ApiError::new("UNAUTHORIZED", "Not signed in"))?;
        let response = self
            .with_keys(self.client.put(self.auth_url("user")), Some(&token))
            .json(&json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))?;
        parse_json::<Value>(response).await?;
        self.listeners
            .emit(AuthEvent::UserUpdated, self.sessions.load());
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .with_keys(
                self.client
                    .post(self.auth_url("recover"))
                    .query(&[("redirect_to", redirect_to)]),
                None,
            )
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    fn on_auth_state_change(&self, callback: AuthCallback) -> AuthSubscription {
        self.listeners.subscribe(callback)
    }
}
