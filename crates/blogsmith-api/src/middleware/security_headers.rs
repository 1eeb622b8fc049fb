//! Response hardening headers
//!
//! Applied to every response, including static assets and error bodies.
//! The page served from `static_dir` posts to `/api/blog-draft` from an
//! inline script, so the policy keeps inline scripts and styles.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Header name and value pairs added to each response
const HARDENING_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:",
    ),
    (PERMISSIONS_POLICY, "geolocation=(), camera=(), microphone=()"),
];

pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in HARDENING_HEADERS {
        // Handlers may set a stricter value themselves
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/page", get(|| async { "page" }))
            .route(
                "/strict",
                get(|| async { ([(header::X_FRAME_OPTIONS, "SAMEORIGIN")], "framed") }),
            )
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "broken") }),
            )
            .layer(middleware::from_fn(security_headers_middleware))
    }

    async fn fetch(uri: &str) -> Response {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_every_header_is_set() {
        let response = fetch("/page").await;

        for (name, value) in HARDENING_HEADERS {
            assert_eq!(response.headers().get(&name).unwrap(), value, "{name}");
        }
        let csp = response.headers().get(header::CONTENT_SECURITY_POLICY).unwrap();
        assert!(csp.to_str().unwrap().contains("'unsafe-inline'"));
    }

    #[tokio::test]
    async fn test_handler_value_is_kept() {
        let response = fetch("/strict").await;
        assert_eq!(
            response.headers().get(header::X_FRAME_OPTIONS).unwrap(),
            "SAMEORIGIN"
        );
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_error_and_unrouted_responses() {
        let response = fetch("/broken").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(header::X_FRAME_OPTIONS));

        let response = fetch("/nowhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(PERMISSIONS_POLICY));
    }
}
