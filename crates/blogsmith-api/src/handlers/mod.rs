//! HTTP request handlers
//!
//! Author: hephaex@gmail.com

pub mod draft;
pub mod health;

pub use draft::blog_draft_handler;
pub use health::{banner, health_check, metrics, readiness_check};
