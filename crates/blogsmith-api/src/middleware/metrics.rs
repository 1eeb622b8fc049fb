//! Metrics tracking middleware
//!
//! Counts requests by status class and accumulates latency.
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Metrics tracking middleware
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;

    let latency_us = start.elapsed().as_micros() as u64;
    state.record_request(response.status().as_u16(), latency_us);

    response
}
