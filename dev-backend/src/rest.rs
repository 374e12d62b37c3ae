//! # Table endpoints
//!
//! `/rest/v1/{table}` with `column=op.value` filters, `order=column.dir` and
//! `limit=n`. Every handler runs as the bearer token's user.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::Value;
use shared::backend::{Filter, Order, Query as TableQuery, Row};
use tracing::info;

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

type QueryPairs = Query<Vec<(String, String)>>;

/// Build a select from query string pairs.
pub fn parse_select(table: &str, pairs: &[(String, String)]) -> ApiResult<TableQuery> {
    let mut query = TableQuery::new(table);
    for (key, value) in pairs {
        match key.as_str() {
            "select" => {}
            "order" => {
                let order = Order::parse(value).ok_or_else(|| {
                    ApiError::BadRequest(format!("'{value}' is not a valid order clause"))
                })?;
                query = query.order(order);
            }
            "limit" => {
                let limit = value.parse::<usize>().map_err(|_| {
                    ApiError::BadRequest(format!("'{value}' is not a valid limit"))
                })?;
                query = query.limit(limit);
            }
            column => query = query.filter(parse_filter(column, value)?),
        }
    }
    Ok(query)
}

fn parse_filter(column: &str, value: &str) -> ApiResult<Filter> {
    Filter::parse(column, value).ok_or_else(|| {
        ApiError::BadRequest(format!("failed to parse filter ({column}={value})"))
    })
}

/// Filters for a mutation; at least one is required.
fn parse_mutation_filters(pairs: &[(String, String)], verb: &str) -> ApiResult<Vec<Filter>> {
    let filters = pairs
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "select" | "order" | "limit"))
        .map(|(column, value)| parse_filter(column, value))
        .collect::<ApiResult<Vec<_>>>()?;
    if filters.is_empty() {
        return Err(ApiError::BadRequest(format!("{verb} requires a WHERE clause")));
    }
    Ok(filters)
}

fn rows_from_body(body: Value) -> ApiResult<Vec<Row>> {
    let invalid = || ApiError::BadRequest("Request body must be a JSON object or an array of objects".to_string());
    match body {
        Value::Object(row) => Ok(vec![row]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// GET /rest/v1/{table}
pub async fn select_rows(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(table): Path<String>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<Vec<Row>>> {
    info!(table = %table, user = %user.id, "GET /rest/v1/{}", table);
    let query = parse_select(&table, &pairs)?;
    let rows = state.store.select(&user.id, &query).await?;
    Ok(Json(rows))
}

/// POST /rest/v1/{table}
pub async fn insert_rows(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Vec<Row>>)> {
    info!(table = %table, user = %user.id, "POST /rest/v1/{}", table);
    let rows = rows_from_body(body)?;
    let inserted = state
        .store
        .insert(&table, &user.id, rows, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(inserted)))
}

/// PATCH /rest/v1/{table}
pub async fn update_rows(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(table): Path<String>,
    Query(pairs): QueryPairs,
    Json(patch): Json<Row>,
) -> ApiResult<Json<Vec<Row>>> {
    info!(table = %table, user = %user.id, "PATCH /rest/v1/{}", table);
    let filters = parse_mutation_filters(&pairs, "UPDATE")?;
    let updated = state
        .store
        .update(&table, &user.id, &filters, patch)
        .await?;
    Ok(Json(updated))
}

/// DELETE /rest/v1/{table}
pub async fn delete_rows(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(table): Path<String>,
    Query(pairs): QueryPairs,
) -> ApiResult<Json<Vec<Row>>> {
    info!(table = %table, user = %user.id, "DELETE /rest/v1/{}", table);
    let filters = parse_mutation_filters(&pairs, "DELETE")?;
    let removed = state.store.delete(&table, &user.id, &filters).await?;
    Ok(Json(removed))
}
