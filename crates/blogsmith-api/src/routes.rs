//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::draft;
use crate::state::AppState;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Routes mounted under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/blog-draft", post(draft::blog_draft_handler))
}
