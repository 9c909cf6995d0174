pub mod extract;
pub mod form;
pub mod health;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::{error_body, INTERNAL_ERROR_MESSAGE};
use crate::export::handle_download;
use crate::extraction::handlers::handle_extract_text;
use crate::state::AppState;
use crate::workflow::handlers;

/// Upload ceiling for every request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/",
            get(handlers::handle_form_metadata).post(handlers::handle_submit),
        )
        .route("/process", post(handlers::handle_process))
        .route("/download", post(handle_download))
        .route("/extract-text", post(handle_extract_text))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {detail}");

    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_ERROR_MESSAGE,
    )
}
