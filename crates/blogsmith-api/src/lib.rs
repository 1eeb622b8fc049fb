//! Blogsmith API - HTTP server for topic-to-blog drafting
//!
//! Serves the drafting endpoint, health probes, OpenAPI docs and the
//! static front-end.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod testing;

use axum::{
    http::{HeaderValue, Method, Request},
    routing::get,
    Router,
};
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(title = "Blogsmith API", description = "Draft blog posts grounded in an embedding index"),
    paths(
        handlers::draft::blog_draft_handler,
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::health::metrics,
    ),
    components(schemas(
        handlers::draft::BlogDraftRequest,
        handlers::draft::BlogDraftResponse,
        handlers::draft::SourceResponse,
        handlers::health::HealthResponse,
        handlers::health::BuildInfo,
        handlers::health::ReadinessResponse,
        handlers::health::ReadinessChecks,
        handlers::health::MetricsResponse,
        error::ApiError,
    )),
    tags(
        (name = "draft", description = "Blog drafting"),
        (name = "health", description = "Probes and metrics")
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let static_dir = server.static_dir.clone();

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .nest("/api", routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if !static_dir.join("index.html").is_file() {
        router = router.route("/", get(handlers::banner));
    }

    let router = router
        .fallback_service(ServeDir::new(&static_dir))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    request_id = %uuid::Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(RequestBodyLimitLayer::new(server.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )));

    let router = if server.cors_enabled {
        router.layer(cors_layer(&server.cors_origins))
    } else {
        router
    };

    router.with_state(state)
}

/// CORS for the configured origins; any origin when none are listed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    cors.allow_origin(
        origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>(),
    )
}

/// Router over an in-process drafter and mailer, ready to serve
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(testing::TestHarness::new().state()))
}
