use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    arithmetic,
    domain::{EntryId, Operator},
    error::ApiError,
    protocol::{HistoryEntry, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT},
};
use storage::Storage;
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub history_retention: u32,
}

/// Body of `POST /api/calc` as received. The operator stays textual so an
/// unknown symbol is answered with the service's own validation error rather
/// than a deserialization rejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalcInput {
    pub a: f64,
    pub b: f64,
    pub op: String,
}

pub async fn calculate(ctx: &ApiContext, input: CalcInput) -> Result<HistoryEntry, ApiError> {
    let op: Operator = input.op.parse()?;
    let result = arithmetic::evaluate(input.a, input.b, op)?;

    let entry = HistoryEntry {
        id: EntryId::new(),
        a: input.a,
        b: input.b,
        op,
        result,
        created_at: Utc::now(),
    };
    ctx.storage
        .insert_history_entry(&entry, ctx.history_retention)
        .await
        .map_err(internal)?;
    debug!(id = %entry.id, a = entry.a, b = entry.b, op = %op, result, "calculation stored");
    Ok(entry)
}

pub async fn list_history(
    ctx: &ApiContext,
    limit: Option<i64>,
) -> Result<Vec<HistoryEntry>, ApiError> {
    let limit = validate_limit(limit)?;
    ctx.storage.list_history(limit).await.map_err(internal)
}

pub async fn clear_history(ctx: &ApiContext) -> Result<u64, ApiError> {
    let deleted = ctx.storage.clear_history().await.map_err(internal)?;
    debug!(deleted, "history cleared");
    Ok(deleted)
}

fn validate_limit(limit: Option<i64>) -> Result<u32, ApiError> {
    let limit = limit.unwrap_or(i64::from(DEFAULT_HISTORY_LIMIT));
    u32::try_from(limit)
        .ok()
        .filter(|limit| (1..=MAX_HISTORY_LIMIT).contains(limit))
        .ok_or_else(invalid_limit)
}

pub fn invalid_limit() -> ApiError {
    ApiError::validation(format!("limit must be 1..{MAX_HISTORY_LIMIT}"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
