//! # In-memory store
//!
//! Accounts, issued tokens and table rows, each behind a `tokio::sync::RwLock`.
//! Every table has an owner column; reads and writes only ever see rows whose
//! owner column equals the caller's id, which is how the hosted backend's
//! row-level security policies behave for this application.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::backend::{AuthSession, AuthUser, Filter, Query, Row};
use shared::referrals::referral_code;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Tables the application uses, with the column that identifies the owner.
pub const OWNER_COLUMNS: [(&str, &str); 10] = [
    ("babies", "user_id"),
    ("sleep_logs", "user_id"),
    ("baby_activities", "user_id"),
    ("growth_records", "user_id"),
    ("sleep_sessions", "user_id"),
    ("sleep_schedules", "user_id"),
    ("baby_reminders", "user_id"),
    ("developmental_insights", "user_id"),
    ("user_subscriptions", "user_id"),
    ("referrals", "referrer_id"),
];

pub fn owner_column(table: &str) -> ApiResult<&'static str> {
    OWNER_COLUMNS
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, column)| *column)
        .ok_or_else(|| ApiError::UnknownTable(table.to_string()))
}

struct StoredUser {
    user: AuthUser,
    password_hash: String,
}

struct IssuedToken {
    user_id: String,
    expires_at: i64,
}

#[derive(Default)]
struct Accounts {
    users: Vec<StoredUser>,
    access_tokens: HashMap<String, IssuedToken>,
    refresh_tokens: HashMap<String, String>,
}

impl Accounts {
    fn user(&self, user_id: &str) -> Option<&AuthUser> {
        self.users
            .iter()
            .map(|stored| &stored.user)
            .find(|user| user.id == user_id)
    }
}

pub struct Store {
    accounts: RwLock<Accounts>,
    tables: RwLock<HashMap<&'static str, Vec<Row>>>,
    token_ttl_secs: i64,
}

fn is_owned_by(row: &Row, owner_column: &str, user_id: &str) -> bool {
    row.get(owner_column).and_then(Value::as_str) == Some(user_id)
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl Store {
    pub fn new(token_ttl_secs: i64) -> Self {
        let tables = OWNER_COLUMNS
            .iter()
            .map(|(table, _)| (*table, Vec::new()))
            .collect();
        Self {
            accounts: RwLock::new(Accounts::default()),
            tables: RwLock::new(tables),
            token_ttl_secs,
        }
    }

    pub async fn create_user(
        &self,
        email: &str,
        password_hash: String,
        metadata: Option<Value>,
    ) -> ApiResult<AuthUser> {
        let mut accounts = self.accounts.write().await;
        let taken = accounts
            .users
            .iter()
            .any(|stored| stored.user.email.as_deref().is_some_and(|e| same_email(e, email)));
        if taken {
            return Err(ApiError::UserExists);
        }

        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.trim().to_lowercase()),
            user_metadata: metadata,
        };
        accounts.users.push(StoredUser {
            user: user.clone(),
            password_hash,
        });
        Ok(user)
    }

    /// The account registered under `email` with its stored password hash.
    pub async fn credentials_for(&self, email: &str) -> Option<(AuthUser, String)> {
        let accounts = self.accounts.read().await;
        accounts
            .users
            .iter()
            .find(|stored| stored.user.email.as_deref().is_some_and(|e| same_email(e, email)))
            .map(|stored| (stored.user.clone(), stored.password_hash.clone()))
    }

    pub async fn user_by_referral_code(&self, code: &str) -> Option<AuthUser> {
        let accounts = self.accounts.read().await;
        accounts
            .users
            .iter()
            .find(|stored| referral_code(&stored.user.id) == code.trim().to_uppercase())
            .map(|stored| stored.user.clone())
    }

    pub async fn set_password_hash(&self, user_id: &str, password_hash: String) -> ApiResult<AuthUser> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .users
            .iter_mut()
            .find(|stored| stored.user.id == user_id)
            .ok_or(ApiError::InvalidToken)?;
        stored.password_hash = password_hash;
        Ok(stored.user.clone())
    }

    pub async fn issue_session(&self, user: AuthUser, now: DateTime<Utc>) -> AuthSession {
        let access_token = Uuid::new_v4().simple().to_string();
        let refresh_token = Uuid::new_v4().simple().to_string();
        let expires_at = now.timestamp() + self.token_ttl_secs;

        let mut accounts = self.accounts.write().await;
        accounts.access_tokens.insert(
            access_token.clone(),
            IssuedToken {
                user_id: user.id.clone(),
                expires_at,
            },
        );
        accounts
            .refresh_tokens
            .insert(refresh_token.clone(), user.id.clone());

        AuthSession {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: self.token_ttl_secs,
            expires_at,
            user,
        }
    }

    pub async fn user_for_access_token(&self, token: &str, now: DateTime<Utc>) -> ApiResult<AuthUser> {
        let accounts = self.accounts.read().await;
        let issued = accounts
            .access_tokens
            .get(token)
            .filter(|issued| issued.expires_at > now.timestamp())
            .ok_or(ApiError::InvalidToken)?;
        accounts
            .user(&issued.user_id)
            .cloned()
            .ok_or(ApiError::InvalidToken)
    }

    /// Refresh tokens are single use.
    pub async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<AuthSession> {
        let user = {
            let mut accounts = self.accounts.write().await;
            let user_id = accounts
                .refresh_tokens
                .remove(refresh_token)
                .ok_or(ApiError::InvalidRefreshToken)?;
            accounts
                .user(&user_id)
                .cloned()
                .ok_or(ApiError::InvalidRefreshToken)?
        };
        Ok(self.issue_session(user, now).await)
    }

    /// Drop every token issued to the user.
    pub async fn revoke_all(&self, user_id: &str) {
        let mut accounts = self.accounts.write().await;
        accounts
            .access_tokens
            .retain(|_, issued| issued.user_id != user_id);
        accounts.refresh_tokens.retain(|_, owner| owner != user_id);
    }

    pub async fn select(&self, user_id: &str, query: &Query) -> ApiResult<Vec<Row>> {
        let owner_column = owner_column(&query.table)?;
        let tables = self.tables.read().await;
        let visible = tables
            .get(query.table.as_str())
            .into_iter()
            .flatten()
            .filter(|row| is_owned_by(row, owner_column, user_id));
        Ok(query.evaluate(visible))
    }

    /// Owner column is stamped when absent; a row claiming another owner is refused.
    pub async fn insert(
        &self,
        table: &str,
        user_id: &str,
        rows: Vec<Row>,
        now: DateTime<Utc>,
    ) -> ApiResult<Vec<Row>> {
        let owner_column = owner_column(table)?;
        let mut prepared = Vec::with_capacity(rows.len());
        for mut row in rows {
            let owner = row
                .entry(owner_column)
                .or_insert_with(|| Value::String(user_id.to_string()));
            if owner.as_str() != Some(user_id) {
                return Err(ApiError::RowLevelSecurity(table.to_string()));
            }
            row.entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            row.entry("created_at")
                .or_insert_with(|| Value::String(now.to_rfc3339()));
            prepared.push(row);
        }

        let mut tables = self.tables.write().await;
        tables
            .entry(table_key(table)?)
            .or_default()
            .extend(prepared.iter().cloned());
        Ok(prepared)
    }

    pub async fn update(
        &self,
        table: &str,
        user_id: &str,
        filters: &[Filter],
        mut patch: Row,
    ) -> ApiResult<Vec<Row>> {
        let owner_column = owner_column(table)?;
        patch.remove("id");
        patch.remove(owner_column);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table_key(table)?).or_default();
        let mut updated = Vec::new();
        for row in rows
            .iter_mut()
            .filter(|row| is_owned_by(row, owner_column, user_id))
            .filter(|row| filters.iter().all(|f| f.matches(row)))
        {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    pub async fn delete(&self, table: &str, user_id: &str, filters: &[Filter]) -> ApiResult<Vec<Row>> {
        let owner_column = owner_column(table)?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table_key(table)?).or_default();
        let (removed, kept): (Vec<Row>, Vec<Row>) = rows.drain(..).partition(|row| {
            is_owned_by(row, owner_column, user_id) && filters.iter().all(|f| f.matches(row))
        });
        *rows = kept;
        Ok(removed)
    }

    /// Mark the referrer's invitation for `referred_email` completed, creating
    /// it when the invitee signed up without one.
    pub async fn complete_referral(
        &self,
        referrer_id: &str,
        referred_email: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<Row> {
        let pending = vec![
            Filter::eq("referred_email", referred_email),
            Filter::eq("status", "pending"),
        ];
        let mut patch = Row::new();
        patch.insert("status".to_string(), Value::String("completed".to_string()));
        let updated = self
            .update("referrals", referrer_id, &pending, patch)
            .await?;
        if let Some(row) = updated.into_iter().next() {
            return Ok(row);
        }

        let mut row = Row::new();
        row.insert("referrer_id".to_string(), Value::String(referrer_id.to_string()));
        row.insert(
            "referred_email".to_string(),
            Value::String(referred_email.to_string()),
        );
        row.insert("status".to_string(), Value::String("completed".to_string()));
        row.insert("reward_amount".to_string(), Value::from(0.0));
        let mut inserted = self.insert("referrals", referrer_id, vec![row], now).await?;
        inserted
            .pop()
            .ok_or_else(|| ApiError::Internal("referral insert returned no row".to_string()))
    }
}

fn table_key(table: &str) -> ApiResult<&'static str> {
    OWNER_COLUMNS
        .iter()
        .map(|(name, _)| *name)
        .find(|name| *name == table)
        .ok_or_else(|| ApiError::UnknownTable(table.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::backend::Order;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_rows_are_owner_scoped() {
        let store = Store::new(60);
        let now = Utc::now();
        store
            .insert("babies", "alice", vec![row(json!({"name": "Ada"}))], now)
            .await
            .unwrap();
        store
            .insert("babies", "bob", vec![row(json!({"name": "Ben"}))], now)
            .await
            .unwrap();

        let alice = store.select("alice", &Query::new("babies")).await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0]["name"], "Ada");
        assert_eq!(alice[0]["user_id"], "alice");
        assert!(alice[0].contains_key("id"));
    }

    #[tokio::test]
    async fn test_insert_for_someone_else_is_refused() {
        let store = Store::new(60);
        let result = store
            .insert(
                "babies",
                "alice",
                vec![row(json!({"name": "Ada", "user_id": "bob"}))],
                Utc::now(),
            )
            .await;
        assert_eq!(result, Err(ApiError::RowLevelSecurity("babies".to_string())));
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let store = Store::new(60);
        let result = store.select("alice", &Query::new("diapers")).await;
        assert_eq!(result, Err(ApiError::UnknownTable("diapers".to_string())));
    }

    #[tokio::test]
    async fn test_update_cannot_change_owner_and_delete_returns_rows() {
        let store = Store::new(60);
        let inserted = store
            .insert("babies", "alice", vec![row(json!({"name": "Ada"}))], Utc::now())
            .await
            .unwrap();
        let id = inserted[0]["id"].as_str().unwrap().to_string();

        let updated = store
            .update(
                "babies",
                "alice",
                &[Filter::eq("id", id.clone())],
                row(json!({"name": "Ada Mae", "user_id": "bob"})),
            )
            .await
            .unwrap();
        assert_eq!(updated[0]["name"], "Ada Mae");
        assert_eq!(updated[0]["user_id"], "alice");

        let by_bob = store
            .delete("babies", "bob", &[Filter::eq("id", id.clone())])
            .await
            .unwrap();
        assert!(by_bob.is_empty());
        let removed = store
            .delete("babies", "alice", &[Filter::eq("id", id.clone())])
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        let again = store
            .delete("babies", "alice", &[Filter::eq("id", id)])
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_select_applies_filters_and_order() {
        let store = Store::new(60);
        let now = Utc::now();
        let rows = vec![
            row(json!({"baby_id": "b1", "sleep_time": "2025-06-01T20:00:00Z"})),
            row(json!({"baby_id": "b2", "sleep_time": "2025-06-02T20:00:00Z"})),
            row(json!({"baby_id": "b1", "sleep_time": "2025-06-03T20:00:00Z"})),
        ];
        store.insert("sleep_logs", "alice", rows, now).await.unwrap();

        let query = Query::new("sleep_logs")
            .filter(Filter::eq("baby_id", "b1"))
            .order(Order::desc("sleep_time"));
        let selected = store.select("alice", &query).await.unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0]["sleep_time"], "2025-06-03T20:00:00Z");
    }

    #[tokio::test]
    async fn test_reminders_order_by_time_of_day() {
        let store = Store::new(60);
        let now = Utc::now();
        let rows = vec![
            row(json!({"baby_id": "b1", "title": "Bedtime", "time": "19:30:00"})),
            row(json!({"baby_id": "b1", "title": "Nap", "time": "09:00:00"})),
            row(json!({"baby_id": "b1", "title": "Feed", "time": "13:15:00"})),
        ];
        store.insert("baby_reminders", "alice", rows, now).await.unwrap();

        let query = Query::new("baby_reminders").order(Order::asc("time"));
        let titles: Vec<_> = store
            .select("alice", &query)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("Nap"), json!("Feed"), json!("Bedtime")]);
        assert!(store.select("bob", &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tokens() {
        let store = Store::new(60);
        let now = Utc::now();
        let user = store
            .create_user("Parent@Example.com", "hash".to_string(), None)
            .await
            .unwrap();
        assert_eq!(user.email.as_deref(), Some("parent@example.com"));
        assert_eq!(
            store.create_user("parent@example.com", "x".to_string(), None).await,
            Err(ApiError::UserExists)
        );

        let session = store.issue_session(user.clone(), now).await;
        assert_eq!(session.expires_at, now.timestamp() + 60);
        assert_eq!(
            store.user_for_access_token(&session.access_token, now).await,
            Ok(user.clone())
        );
        assert_eq!(
            store
                .user_for_access_token(&session.access_token, now + chrono::Duration::seconds(61))
                .await,
            Err(ApiError::InvalidToken)
        );

        let refreshed = store
            .exchange_refresh_token(&session.refresh_token, now)
            .await
            .unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert_eq!(
            store
                .exchange_refresh_token(&session.refresh_token, now)
                .await
                .map(|s| s.user),
            Err(ApiError::InvalidRefreshToken)
        );

        store.revoke_all(&user.id).await;
        assert_eq!(
            store.user_for_access_token(&refreshed.access_token, now).await,
            Err(ApiError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_complete_referral_upgrades_pending_invite() {
        let store = Store::new(60);
        let now = Utc::now();
        store
            .insert(
                "referrals",
                "alice",
                vec![row(json!({
                    "referred_email": "friend@example.com",
                    "status": "pending",
                    "reward_amount": 0.0
                }))],
                now,
            )
            .await
            .unwrap();

        store
            .complete_referral("alice", "friend@example.com", now)
            .await
            .unwrap();
        store
            .complete_referral("alice", "other@example.com", now)
            .await
            .unwrap();

        let referrals = store.select("alice", &Query::new("referrals")).await.unwrap();
        assert_eq!(referrals.len(), 2);
        assert!(referrals.iter().all(|r| r["status"] == "completed"));
    }
}
