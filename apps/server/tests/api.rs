use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use fairvalue_server::{api::app_router, build_state, config::Config};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

fn request_payload() -> Value {
    json!({
        "company_name": "Basis AI",
        "methodology": "last_round_market_adjusted",
        "as_of_date": "2026-02-18",
        "inputs": {
            "last_post_money_valuation": 100000000.0,
            "last_round_date": "2024-06-30",
            "public_index": "NASDAQ_COMPOSITE"
        }
    })
}

fn test_app(db_dir: &tempfile::TempDir) -> axum::Router {
    // Built directly: parallel tests must not share process-wide env vars.
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: db_dir.path().join("test.db").display().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: std::time::Duration::from_millis(30000),
    };
    let state = build_state(&config).unwrap();
    app_router(state, &config)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_works() {
    let tmp = tempdir().unwrap();
    let app = test_app(&tmp);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn value_returns_the_envelope_without_persisting() {
    let tmp = tempdir().unwrap();
    let app = test_app(&tmp);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/value")
                .header("content-type", "application/json")
                .body(Body::from(request_payload().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let envelope = body_json(response).await;
    assert_eq!(
        envelope["valuation_result"]["estimated_fair_value"]["amount"],
        json!(120831065.39)
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/runs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn api_value_persists_and_the_run_is_retrievable() {
    let tmp = tempdir().unwrap();
    let app = test_app(&tmp);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/value")
                .header("content-type", "application/json")
                .body(Body::from(request_payload().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let envelope = body_json(response).await;
    let request_id = envelope["audit_metadata"]["request_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/runs/{request_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stored = body_json(response).await;
    assert_eq!(stored["valuation_result"], envelope["valuation_result"]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/runs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let runs = body_json(response).await;
    assert_eq!(runs.as_array().unwrap().len(), 1);
    assert_eq!(runs[0]["company_name"], json!("Basis AI"));
}

#[tokio::test]
async fn unknown_run_id_is_a_404() {
    let tmp = tempdir().unwrap();
    let app = test_app(&tmp);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/runs/no-such-run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Run not found" }));
}

#[tokio::test]
async fn malformed_json_and_bad_requests_map_to_400() {
    let tmp = tempdir().unwrap();
    let app = test_app(&tmp);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/value")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));

    let mut payload = request_payload();
    payload["methodology"] = json!("dcf");
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/value")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Unknown methodology 'dcf'"));
}
