use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request},
    response::Response,
};
use tower::ServiceExt;

async fn test_app(history_retention: u32) -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let api = ApiContext {
        storage,
        history_retention,
    };
    build_router(Arc::new(AppState { api }))
}

fn calc_request(body: serde_json::Value) -> Request<Body> {
    Request::post(CALC_ROUTE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn health_reports_ok_when_storage_is_ready() {
    let app = test_app(200).await;
    let response = app
        .oneshot(Request::get(HEALTH_ROUTE).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let status: StatusResponse = json_body(response).await;
    assert_eq!(status.status, "ok");
}

#[tokio::test]
async fn calc_then_history_returns_newest_first() {
    let app = test_app(200).await;

    let response = app
        .clone()
        .oneshot(calc_request(serde_json::json!({ "a": 2, "b": 3, "op": "+" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let first: HistoryEntry = json_body(response).await;
    assert_eq!(first.result, 5.0);

    let response = app
        .clone()
        .oneshot(calc_request(serde_json::json!({ "a": 6, "b": 6, "op": "*" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get(format!("{HISTORY_ROUTE}?limit=10"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let history: Vec<HistoryEntry> = json_body(response).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].result, 36.0);
    assert_eq!(history[1].id, first.id);
}

#[tokio::test]
async fn division_by_zero_returns_bad_request_with_detail() {
    let app = test_app(200).await;
    let response = app
        .oneshot(calc_request(serde_json::json!({ "a": 1, "b": 0, "op": "/" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.detail.contains("Division by zero"));
}

#[tokio::test]
async fn unsupported_operator_returns_bad_request() {
    let app = test_app(200).await;
    let response = app
        .oneshot(calc_request(serde_json::json!({ "a": 1, "b": 2, "op": "^" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.detail, "Unsupported operation");
}

#[tokio::test]
async fn malformed_calc_body_returns_json_error() {
    let app = test_app(200).await;
    let response = app
        .oneshot(calc_request(serde_json::json!({ "a": "x", "b": 1, "op": "+" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.detail.contains("invalid type"), "detail: {}", err.detail);
}

#[tokio::test]
async fn calc_without_json_content_type_returns_json_error() {
    let app = test_app(200).await;
    let response = app
        .oneshot(
            Request::post(CALC_ROUTE)
                .body(Body::from(r#"{"a":1,"b":2,"op":"+"}"#))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn non_numeric_limit_gets_range_detail() {
    let app = test_app(200).await;
    let response = app
        .oneshot(
            Request::get(format!("{HISTORY_ROUTE}?limit=abc"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.detail, "limit must be 1..200");
}

#[tokio::test]
async fn out_of_range_limit_is_rejected() {
    let app = test_app(200).await;
    let response = app
        .oneshot(
            Request::get(format!("{HISTORY_ROUTE}?limit=500"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.detail, "limit must be 1..200");
}

#[tokio::test]
async fn delete_clears_history() {
    let app = test_app(200).await;
    let response = app
        .clone()
        .oneshot(calc_request(serde_json::json!({ "a": 9, "b": 3, "op": "/" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::delete(HISTORY_ROUTE)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let status: StatusResponse = json_body(response).await;
    assert_eq!(status, StatusResponse::cleared());

    let response = app
        .oneshot(Request::get(HISTORY_ROUTE).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let history: Vec<HistoryEntry> = json_body(response).await;
    assert!(history.is_empty());
}

#[tokio::test]
async fn unknown_route_returns_json_not_found() {
    let app = test_app(200).await;
    let response = app
        .oneshot(Request::get("/api/nope").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn cors_preflight_is_allowed_from_any_origin() {
    let app = test_app(200).await;
    let response = app
        .oneshot(
            Request::options(CALC_ROUTE)
                .header(header::ORIGIN, "http://localhost:5500")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
