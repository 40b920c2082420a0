use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{HistoryEntry, StatusResponse, CALC_ROUTE, HEALTH_ROUTE, HISTORY_ROUTE},
};
use storage::Storage;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::{ApiContext, CalcInput};
use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_REQUEST_BYTES: usize = 16 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext {
        storage,
        history_retention: settings.history_retention,
    };

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, retention = settings.history_retention, "calculator service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("calculator service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(health))
        .route(CALC_ROUTE, post(calculate))
        .route(HISTORY_ROUTE, get(history).delete(clear_history))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(detail = %err.detail, "request failed");
    }
    (status, Json(err))
}

async fn health(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::internal(e.to_string())),
        )
    })?;
    Ok(Json(StatusResponse::ok()))
}

async fn calculate(
    State(state): State<Arc<AppState>>,
    input: Result<Json<CalcInput>, JsonRejection>,
) -> ApiResult<HistoryEntry> {
    let Json(input) =
        input.map_err(|rejection| reject(ApiError::validation(rejection.body_text())))?;
    let entry = api::calculate(&state.api, input).await.map_err(reject)?;
    Ok(Json(entry))
}

async fn history(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult<Vec<HistoryEntry>> {
    let Query(params) = params.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "unparseable history query");
        reject(api::invalid_limit())
    })?;
    let entries = api::list_history(&state.api, params.limit)
        .await
        .map_err(reject)?;
    Ok(Json(entries))
}

async fn clear_history(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    api::clear_history(&state.api).await.map_err(reject)?;
    Ok(Json(StatusResponse::cleared()))
}

async fn not_found() -> (StatusCode, Json<ApiError>) {
    reject(ApiError::new(ErrorCode::NotFound, "Not Found"))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
