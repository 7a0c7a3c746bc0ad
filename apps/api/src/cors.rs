//! CORS headers computed from the configured origin allow-list.
//!
//! Applied to every response (preflight, success, and error) by `apply_cors`.

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Picks the `Access-Control-Allow-Origin` value.
///
/// `*` in the list wins; otherwise an allowed request origin is echoed back;
/// otherwise the first configured origin is returned.
pub fn allow_origin<'a>(origin: Option<&'a str>, allowed: &'a [String]) -> &'a str {
    if allowed.iter().any(|a| a == "*") {
        return "*";
    }
    match origin {
        Some(o) if allowed.iter().any(|a| a == o) => o,
        _ => allowed.first().map(String::as_str).unwrap_or("*"),
    }
}

pub fn cors_headers(origin: Option<&str>, allowed: &[String]) -> HeaderMap {
    let allow = allow_origin(origin, allowed);
    let mut headers = HeaderMap::new();

    // Never widen to `*`: an unusable origin leaves the header out entirely.
    if let Ok(allow_value) = HeaderValue::from_str(allow) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_value);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    if allow != "*" {
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
    headers
}

/// Middleware: stamps CORS headers onto whatever the inner service returns.
pub async fn apply_cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .extend(cors_headers(origin.as_deref(), &state.config.allowed_origins));
    response
}
