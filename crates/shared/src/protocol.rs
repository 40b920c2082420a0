use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EntryId, Operator};

pub const CALC_ROUTE: &str = "/api/calc";
pub const HISTORY_ROUTE: &str = "/api/history";
pub const HEALTH_ROUTE: &str = "/health";

pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
pub const MAX_HISTORY_LIMIT: u32 = 200;

/// Body of `POST /api/calc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcRequest {
    pub a: f64,
    pub b: f64,
    pub op: Operator,
}

/// A stored computation. `POST /api/calc` answers with the entry it recorded,
/// `GET /api/history` with a list of them, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub a: f64,
    pub b: f64,
    pub op: Operator,
    pub result: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn cleared() -> Self {
        Self {
            status: "cleared".to_string(),
        }
    }
}
