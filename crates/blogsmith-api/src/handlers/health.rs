//! Health check handlers
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use utoipa::ToSchema;

/// Plain-text banner served at `/` when no static index page exists
pub const BANNER: &str = "Blogsmith assistant is live.";

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build_info: BuildInfo,
}

#[derive(Serialize, ToSchema)]
pub struct BuildInfo {
    pub name: String,
    pub rust_version: String,
}

/// Liveness probe - basic health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_info: BuildInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            rust_version: "1.75+".to_string(),
        },
    })
}

/// Readiness response
#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessChecks {
    pub index_loaded: bool,
    pub index_records: usize,
    pub mail_configured: bool,
}

/// Readiness probe - 503 until the index is loaded
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service not ready", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let is_ready = state.is_ready();

    let response = ReadinessResponse {
        ready: is_ready,
        checks: ReadinessChecks {
            index_loaded: is_ready,
            index_records: state.index_records(),
            mail_configured: state.mailer.is_some(),
        },
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// JSON metrics response
#[derive(Serialize, ToSchema)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub requests_per_second: f64,
    pub avg_latency_ms: f64,
    pub responses_2xx: u64,
    pub responses_4xx: u64,
    pub responses_5xx: u64,
    pub drafts_generated: u64,
    pub drafts_failed: u64,
    pub emails_sent: u64,
    pub emails_failed: u64,
    pub index_records: usize,
}

/// Runtime counters
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "health",
    responses(
        (status = 200, description = "Server metrics", body = MetricsResponse)
    )
)]
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let counters = &state.metrics;
    let uptime = state.uptime_secs();
    let total_requests = state.get_request_count();
    let rps = if uptime > 0 {
        total_requests as f64 / uptime as f64
    } else {
        0.0
    };
    let avg_latency_ms = if total_requests > 0 {
        counters.total_latency_us.load(Ordering::Relaxed) as f64 / total_requests as f64 / 1000.0
    } else {
        0.0
    };

    Json(MetricsResponse {
        uptime_seconds: uptime,
        total_requests,
        requests_per_second: rps,
        avg_latency_ms,
        responses_2xx: counters.success.load(Ordering::Relaxed),
        responses_4xx: counters.client_errors.load(Ordering::Relaxed),
        responses_5xx: counters.server_errors.load(Ordering::Relaxed),
        drafts_generated: counters.drafts_generated.load(Ordering::Relaxed),
        drafts_failed: counters.drafts_failed.load(Ordering::Relaxed),
        emails_sent: counters.emails_sent.load(Ordering::Relaxed),
        emails_failed: counters.emails_failed.load(Ordering::Relaxed),
        index_records: state.index_records(),
    })
}

/// Banner for `/` when the static directory has no index page
pub async fn banner() -> &'static str {
    BANNER
}
