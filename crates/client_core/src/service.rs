use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{CalcRequest, HistoryEntry, HistoryQuery, StatusResponse, CALC_ROUTE, HISTORY_ROUTE},
};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Root address of the calculator service, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    /// Validates `raw` as an http(s) URL and strips trailing slashes. An empty
    /// value selects [`DEFAULT_API_BASE`].
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self(DEFAULT_API_BASE.to_string()));
        }

        let invalid = |reason: String| ClientError::InvalidBase {
            base: raw.to_string(),
            reason,
        };
        let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{route}", self.0)
    }
}

impl Default for ApiBase {
    fn default() -> Self {
        Self(DEFAULT_API_BASE.to_string())
    }
}

/// Remote evaluation service and history store.
#[async_trait]
pub trait CalcService: Send + Sync {
    /// Evaluates and records one computation, returning the stored entry.
    async fn evaluate(&self, request: &CalcRequest) -> Result<HistoryEntry, ClientError>;
    /// Fetches at most `limit` entries in the order the store returns them.
    async fn fetch_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, ClientError>;
    async fn clear_history(&self) -> Result<(), ClientError>;
}

pub struct HttpCalcService {
    http: Client,
    base: RwLock<ApiBase>,
}

impl HttpCalcService {
    pub fn new(base: ApiBase) -> Self {
        Self {
            http: Client::new(),
            base: RwLock::new(base),
        }
    }

    pub async fn base(&self) -> ApiBase {
        self.base.read().await.clone()
    }

    /// Points subsequent requests at `base`.
    pub async fn set_base(&self, base: ApiBase) {
        debug!(base = base.as_str(), "api base changed");
        *self.base.write().await = base;
    }

    async fn endpoint(&self, route: &str) -> String {
        self.base.read().await.endpoint(route)
    }
}

#[async_trait]
impl CalcService for HttpCalcService {
    async fn evaluate(&self, request: &CalcRequest) -> Result<HistoryEntry, ClientError> {
        let response = self
            .http
            .post(self.endpoint(CALC_ROUTE).await)
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn fetch_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(HISTORY_ROUTE).await)
            .query(&HistoryQuery { limit: Some(limit) })
            .send()
            .await?;
        decode(response).await
    }

    async fn clear_history(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(HISTORY_ROUTE).await)
            .send()
            .await?;
        let _: StatusResponse = decode(response).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let detail = response
        .json::<ApiError>()
        .await
        .map(|err| err.detail)
        .unwrap_or_else(|_| "Request failed".to_string());
    Err(ClientError::Api {
        status: status.as_u16(),
        detail,
    })
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
