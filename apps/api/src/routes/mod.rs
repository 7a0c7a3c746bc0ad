pub mod health;

use std::any::Any;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::cors::apply_cors;
use crate::errors::AppError;
use crate::state::AppState;
use crate::summary::handlers;

pub const SUMMARY_PATH: &str = "/api/ai-summary";

/// Converts a handler panic into the standard `{"error": ...}` body.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    AppError::Internal(anyhow::anyhow!("Handler panicked: {detail}")).into_response()
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            SUMMARY_PATH,
            get(handlers::handle_summary_status)
                .post(handlers::handle_summary)
                .options(handlers::handle_summary_preflight)
                .fallback(handlers::handle_summary_method_not_allowed),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(state.clone(), apply_cors))
        .with_state(state)
}
