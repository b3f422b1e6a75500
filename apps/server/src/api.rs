use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use fairvalue_core::constants::DEFAULT_RUN_LIST_LIMIT;
use fairvalue_core::valuation::ValuationEnvelope;
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    store::RunSummary,
};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run a valuation and return the auditable envelope.
async fn post_value(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ValuationEnvelope>> {
    let payload = parse_body(&body)?;
    Ok(Json(run_valuation(&state, &payload, false)?))
}

/// Run a valuation, persist it to the run store, return the envelope.
async fn api_value(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ValuationEnvelope>> {
    let payload = parse_body(&body)?;
    Ok(Json(run_valuation(&state, &payload, true)?))
}

/// List recent valuation runs (summary only).
async fn list_runs(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<RunSummary>>> {
    let store = lock_store(&state)?;
    Ok(Json(store.list_runs(DEFAULT_RUN_LIST_LIMIT)?))
}

/// Full stored envelope for a single run.
async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let store = lock_store(&state)?;
    match store.get_run(&request_id)? {
        Some(envelope) => Ok(Json(envelope)),
        None => Err(ApiError::NotFound),
    }
}

fn parse_body(body: &str) -> ApiResult<Value> {
    serde_json::from_str(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {e}")))
}

fn run_valuation(
    state: &AppState,
    payload: &Value,
    persist: bool,
) -> ApiResult<ValuationEnvelope> {
    let start = Instant::now();
    let envelope = state.engine.value_payload(payload).inspect_err(|e| {
        tracing::warn!("valuation_failed error={e}");
    })?;
    if persist {
        lock_store(state)?.save(&envelope)?;
    }
    tracing::info!(
        company = %envelope.valuation_result.company_name,
        methodology = %envelope.valuation_result.methodology,
        request_id = %envelope.audit_metadata.request_id,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "valuation_ok"
    );
    Ok(envelope)
}

fn lock_store(state: &AppState) -> ApiResult<std::sync::MutexGuard<'_, crate::store::RunStore>> {
    state
        .store
        .lock()
        .map_err(|_| ApiError::Internal("run store lock poisoned".to_string()))
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allow
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(health))
        .route("/value", post(post_value))
        .route("/api/value", post(api_value))
        .route("/api/runs", get(list_runs))
        .route("/api/runs/{id}", get(get_run))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors)
        .with_state(state)
}
