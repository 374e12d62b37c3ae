//! # Backend client boundary
//!
//! The hosted backend exposes two surfaces: an identity service and a set of
//! relational tables addressed through `column=op.value` query filters. Both
//! are modelled as traits so the session store and the entity access layer
//! never depend on a concrete transport:
//!
//! ```text
//! SessionStore ──▶ AuthApi  ─┐
//!                            ├─▶ gloo-net REST client in the frontend, in-memory double in tests
//! EntityAccess ──▶ TableApi ─┘
//! ```
//!
//! Client implementations keep the current access token themselves, the same
//! way the hosted backend's browser SDK does, so table calls are made on behalf
//! of whoever is signed in.
//!
//! The query types in this module also know how to evaluate themselves against
//! plain JSON rows, which the dev backend and the test double both use.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BackendError;

/// One untyped table row as it travels over the wire.
pub type Row = Map<String, Value>;

/// Comparison operators understood by the table query surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
        }
    }

    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "eq" => Some(FilterOp::Eq),
            "neq" => Some(FilterOp::Neq),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            _ => None,
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Neq => ordering != Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A single `column=op.value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Gte, value)
    }

    /// Right-hand side of the query pair, e.g. `eq.42`.
    pub fn to_query_value(&self) -> String {
        format!("{}.{}", self.op.as_str(), self.value)
    }

    /// Parse the right-hand side of a query pair (`gte.2025-01-01`).
    pub fn parse(column: &str, raw: &str) -> Option<Self> {
        let (op, value) = raw.split_once('.')?;
        Some(Self::new(column, FilterOp::parse(op)?, value))
    }

    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            Some(value) => self.op.accepts(compare_to_literal(value, &self.value)),
            None => self.op == FilterOp::Neq,
        }
    }
}

/// Sort order for a select.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    pub fn to_query_value(&self) -> String {
        format!(
            "{}.{}",
            self.column,
            if self.ascending { "asc" } else { "desc" }
        )
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.rsplit_once('.') {
            Some((column, "asc")) => Some(Self::asc(column)),
            Some((column, "desc")) => Some(Self::desc(column)),
            Some(_) => None,
            None => Some(Self::asc(raw)),
        }
    }
}

/// A table select: filters are AND-ed together.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query string pairs in the order the table endpoint expects them.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(
            self.filters
                .iter()
                .map(|f| (f.column.clone(), f.to_query_value())),
        );
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.to_query_value()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Run this query over an in-memory set of rows.
    pub fn evaluate<'a>(&self, rows: impl IntoIterator<Item = &'a Row>) -> Vec<Row> {
        let mut selected: Vec<Row> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|f| f.matches(row)))
            .cloned()
            .collect();

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

/// Compare a stored JSON value with a literal taken from a query string.
fn compare_to_literal(value: &Value, literal: &str) -> Ordering {
    match value {
        Value::Number(n) => match (n.as_f64(), literal.parse::<f64>()) {
            (Some(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => n.to_string().as_str().cmp(literal),
        },
        Value::Bool(b) => b.to_string().as_str().cmp(literal),
        Value::Null => "null".cmp(literal),
        Value::String(s) => match (parse_timestamp(s), parse_timestamp(literal)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => s.as_str().cmp(literal),
        },
        other => other.to_string().as_str().cmp(literal),
    }
}

/// Ordering used for `order=`; missing and null values sort first.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// The signed-in user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<Value>,
}

/// Token pair issued by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    /// Unix seconds.
    pub expires_at: i64,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl AuthSession {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Email / password pair, already presence-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Result of a sign-up: no session when the backend wants the email confirmed first.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// Identity service operations.
#[async_trait(?Send)]
pub trait AuthApi {
    /// Restore a previously issued session, if one is still valid.
    async fn get_session(&self) -> Result<Option<AuthSession>, BackendError>;

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError>;

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: Option<Value>,
    ) -> Result<SignUpOutcome, BackendError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    /// Invalidate the current token and forget it locally.
    async fn sign_out(&self) -> Result<(), BackendError>;

    async fn request_password_reset(&self, email: &str) -> Result<(), BackendError>;

    async fn update_password(&self, password: &str) -> Result<AuthUser, BackendError>;
}

/// Relational table operations. Mutations return the affected rows.
#[async_trait(?Send)]
pub trait TableApi {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, BackendError>;

    async fn insert(&self, table: &str, row: Row) -> Result<Row, BackendError>;

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, BackendError>;

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_query_pairs_follow_table_syntax() {
        let query = Query::new("babies")
            .filter(Filter::eq("user_id", "u-1"))
            .order(Order::desc("created_at"))
            .limit(10);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u-1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_filter_parse() {
        let filter = Filter::parse("start_time", "gte.2025-06-01T00:00:00Z").unwrap();
        assert_eq!(filter.op, FilterOp::Gte);
        assert_eq!(filter.value, "2025-06-01T00:00:00Z");

        assert!(Filter::parse("id", "like.abc").is_none());
        assert!(Filter::parse("id", "abc").is_none());
    }

    #[test]
    fn test_order_parse() {
        assert_eq!(Order::parse("date.asc"), Some(Order::asc("date")));
        assert_eq!(Order::parse("created_at.desc"), Some(Order::desc("created_at")));
        assert_eq!(Order::parse("name"), Some(Order::asc("name")));
        assert_eq!(Order::parse("name.sideways"), None);
    }

    #[test]
    fn test_evaluate_filters_and_orders() {
        let rows = vec![
            row(json!({"id": "a", "user_id": "u-1", "created_at": "2025-06-01T10:00:00Z"})),
            row(json!({"id": "b", "user_id": "u-2", "created_at": "2025-06-02T10:00:00Z"})),
            row(json!({"id": "c", "user_id": "u-1", "created_at": "2025-06-03T10:00:00+00:00"})),
        ];

        let query = Query::new("babies")
            .filter(Filter::eq("user_id", "u-1"))
            .order(Order::desc("created_at"));
        let ids: Vec<_> = query
            .evaluate(&rows)
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_timestamps_compare_chronologically() {
        // Lexical comparison would put ".5Z" before "Z".
        let early = row(json!({"t": "2025-06-27T20:00:00Z"}));
        let late = row(json!({"t": "2025-06-27T20:00:00.500Z"}));

        let filter = Filter::gte("t", "2025-06-27T20:00:00.250Z");
        assert!(!filter.matches(&early));
        assert!(filter.matches(&late));
    }

    #[test]
    fn test_numeric_filters() {
        let rows = vec![
            row(json!({"id": 1, "score": 40})),
            row(json!({"id": 2, "score": 85.5})),
        ];
        let query = Query::new("sleep_sessions").filter(Filter::new("score", FilterOp::Gt, "50"));
        let matched = query.evaluate(&rows);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0]["id"], json!(2));
    }

    #[test]
    fn test_session_expiry() {
        let session = AuthSession {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: 1_000,
            user: AuthUser {
                id: "u".into(),
                email: None,
                user_metadata: None,
            },
        };
        assert!(!session.is_expired(999));
        assert!(session.is_expired(1_000));
    }
}
