//! In-memory backend used by the unit tests.
//!
//! Behaves like the hosted backend as far as the client can observe: tokens are
//! issued by sign-in, table rows are scoped to the signed-in user, unknown tables
//! are rejected and mutations return the affected rows. It also counts calls and
//! supports one-shot failure injection.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{
    AuthApi, AuthSession, AuthUser, Credentials, Filter, Query, Row, SignUpOutcome, TableApi,
};
use crate::error::BackendError;

pub const TOKEN_TTL_SECS: i64 = 3600;

struct StoredUser {
    user: AuthUser,
    password: String,
}

pub struct InMemoryBackend {
    users: RefCell<Vec<StoredUser>>,
    tables: RefCell<HashMap<String, Vec<Row>>>,
    owner_columns: HashMap<&'static str, &'static str>,
    current: RefCell<Option<AuthSession>>,
    clock: Cell<i64>,
    table_calls: Cell<usize>,
    auth_calls: Cell<usize>,
    next_failure: RefCell<Option<BackendError>>,
    select_delays_ms: RefCell<VecDeque<u64>>,
    next_id: Cell<u64>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let owner_columns = HashMap::from([
            ("babies", "user_id"),
            ("sleep_logs", "user_id"),
            ("baby_activities", "user_id"),
            ("growth_records", "user_id"),
            ("user_subscriptions", "user_id"),
            ("sleep_sessions", "user_id"),
            ("sleep_schedules", "user_id"),
            ("baby_reminders", "user_id"),
            ("developmental_insights", "user_id"),
            ("referrals", "referrer_id"),
        ]);
        let tables = owner_columns
            .keys()
            .map(|table| (table.to_string(), Vec::new()))
            .collect();

        Self {
            users: RefCell::new(Vec::new()),
            tables: RefCell::new(tables),
            owner_columns,
            current: RefCell::new(None),
            clock: Cell::new(1_750_000_000),
            table_calls: Cell::new(0),
            auth_calls: Cell::new(0),
            next_failure: RefCell::new(None),
            select_delays_ms: RefCell::new(VecDeque::new()),
            next_id: Cell::new(1),
        }
    }

    /// Create an account without signing in.
    pub fn register(&self, email: &str, password: &str) -> String {
        let id = format!("user-{}", self.bump_id());
        self.users.borrow_mut().push(StoredUser {
            user: AuthUser {
                id: id.clone(),
                email: Some(email.to_string()),
                user_metadata: None,
            },
            password: password.to_string(),
        });
        id
    }

    /// Pretend a session was persisted by an earlier visit.
    pub fn restore_as(&self, user_id: &str) {
        let user = self
            .users
            .borrow()
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.user.clone())
            .expect("unknown user");
        let session = self.issue_session(user);
        *self.current.borrow_mut() = Some(session);
    }

    pub fn fail_next(&self, error: BackendError) {
        *self.next_failure.borrow_mut() = Some(error);
    }

    pub fn delay_next_select(&self, millis: u64) {
        self.select_delays_ms.borrow_mut().push_back(millis);
    }

    pub fn table_calls(&self) -> usize {
        self.table_calls.get()
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.get()
    }

    pub fn current_session(&self) -> Option<AuthSession> {
        self.current.borrow().clone()
    }

    /// Insert a row directly, bypassing scoping.
    pub fn seed(&self, table: &str, row: Value) {
        let row = row.as_object().cloned().expect("seed rows must be objects");
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    fn bump_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn issue_session(&self, user: AuthUser) -> AuthSession {
        let serial = self.bump_id();
        AuthSession {
            access_token: format!("access-{serial}"),
            refresh_token: format!("refresh-{serial}"),
            token_type: "bearer".to_string(),
            expires_in: TOKEN_TTL_SECS,
            expires_at: self.clock.get() + TOKEN_TTL_SECS,
            user,
        }
    }

    fn take_failure(&self) -> Result<(), BackendError> {
        match self.next_failure.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn begin_table_call(&self, table: &str) -> Result<&'static str, BackendError> {
        self.table_calls.set(self.table_calls.get() + 1);
        self.take_failure()?;
        self.owner_columns.get(table).copied().ok_or_else(|| {
            BackendError::rejected(404, format!("relation \"public.{table}\" does not exist"))
        })
    }

    fn current_user_id(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.user.id.clone())
    }

    fn visible(row: &Row, owner_column: &str, user_id: Option<&str>) -> bool {
        match user_id {
            Some(id) => row.get(owner_column).and_then(Value::as_str) == Some(id),
            None => false,
        }
    }
}

#[async_trait(?Send)]
impl AuthApi for InMemoryBackend {
    async fn get_session(&self) -> Result<Option<AuthSession>, BackendError> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        self.take_failure()?;
        let now = self.clock.get();
        Ok(self
            .current
            .borrow()
            .clone()
            .filter(|session| !session.is_expired(now)))
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        self.take_failure()?;
        let user = self
            .users
            .borrow()
            .iter()
            .find(|u| {
                u.user.email.as_deref() == Some(credentials.email.as_str())
                    && u.password == credentials.password
            })
            .map(|u| u.user.clone())
            .ok_or_else(|| BackendError::rejected(400, "Invalid login credentials"))?;
        let session = self.issue_session(user);
        *self.current.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: Option<Value>,
    ) -> Result<SignUpOutcome, BackendError> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        self.take_failure()?;
        if credentials.password.len() < 6 {
            return Err(BackendError::rejected(
                422,
                "Password should be at least 6 characters",
            ));
        }
        let exists = self
            .users
            .borrow()
            .iter()
            .any(|u| u.user.email.as_deref() == Some(credentials.email.as_str()));
        if exists {
            return Err(BackendError::rejected(422, "User already registered"));
        }
        let id = self.register(&credentials.email, &credentials.password);
        let user = {
            let mut users = self.users.borrow_mut();
            let stored = users
                .iter_mut()
                .find(|u| u.user.id == id)
                .expect("just registered");
            stored.user.user_metadata = metadata;
            stored.user.clone()
        };
        let session = self.issue_session(user.clone());
        *self.current.borrow_mut() = Some(session.clone());
        Ok(SignUpOutcome {
            user,
            session: Some(session),
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        self.take_failure()?;
        let user = self
            .current
            .borrow()
            .as_ref()
            .filter(|s| s.refresh_token == refresh_token)
            .map(|s| s.user.clone())
            .ok_or_else(|| BackendError::rejected(400, "Invalid Refresh Token"))?;
        let session = self.issue_session(user);
        *self.current.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        let failure = self.take_failure();
        *self.current.borrow_mut() = None;
        failure
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), BackendError> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        self.take_failure()
    }

    async fn update_password(&self, password: &str) -> Result<AuthUser, BackendError> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        self.take_failure()?;
        let user_id = self
            .current_user_id()
            .ok_or_else(|| BackendError::rejected(401, "Auth session missing!"))?;
        let mut users = self.users.borrow_mut();
        let stored = users
            .iter_mut()
            .find(|u| u.user.id == user_id)
            .ok_or_else(|| BackendError::rejected(404, "User not found"))?;
        stored.password = password.to_string();
        Ok(stored.user.clone())
    }
}

#[async_trait(?Send)]
impl TableApi for InMemoryBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, BackendError> {
        let owner_column = self.begin_table_call(&query.table)?;
        let user_id = self.current_user_id();
        let snapshot = {
            let tables = self.tables.borrow();
            let visible = tables[&query.table]
                .iter()
                .filter(|row| Self::visible(row, owner_column, user_id.as_deref()));
            query.evaluate(visible)
        };

        let delay = self.select_delays_ms.borrow_mut().pop_front();
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        Ok(snapshot)
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row, BackendError> {
        let owner_column = self.begin_table_call(table)?;
        let user_id = self.current_user_id();
        if !Self::visible(&row, owner_column, user_id.as_deref()) {
            return Err(BackendError::rejected(
                403,
                format!("new row violates row-level security policy for table \"{table}\""),
            ));
        }
        let id = format!("{table}-{}", self.bump_id());
        row.entry("id").or_insert(Value::String(id));
        row.entry("created_at")
            .or_insert(Value::String("2025-06-27T12:00:00Z".to_string()));
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, BackendError> {
        let owner_column = self.begin_table_call(table)?;
        let user_id = self.current_user_id();
        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(table.to_string()).or_default();
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if Self::visible(row, owner_column, user_id.as_deref())
                && filters.iter().all(|f| f.matches(row))
            {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, BackendError> {
        let owner_column = self.begin_table_call(table)?;
        let user_id = self.current_user_id();
        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(table.to_string()).or_default();
        let (removed, kept): (Vec<Row>, Vec<Row>) = rows.drain(..).partition(|row| {
            Self::visible(row, owner_column, user_id.as_deref())
                && filters.iter().all(|f| f.matches(row))
        });
        *rows = kept;
        Ok(removed)
    }
}
