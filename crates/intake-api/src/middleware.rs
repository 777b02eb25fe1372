//! # Middleware Stack
//!
//! Tower middleware for the API surface, outermost first:
//!
//! ```text
//! TraceLayer → CatchPanicLayer → Router
//! ```
//!
//! The panic layer is the outermost error boundary: any panic escaping
//! a handler renders as the standard 500 problem envelope with the
//! panic message and a captured trace, never a bare connection drop.

use std::any::Any;

use axum::body::Bytes;
use axum::http::{header, Response, StatusCode};
use axum::Router;
use http_body_util::Full;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::problem::{Problem, PROBLEM_CONTENT_TYPE};

/// Wrap a router with the standard middleware stack.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Render a caught panic as a 500 problem payload.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Full<Bytes>> {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "Unhandled error".to_string()
    };
    tracing::error!(detail = %detail, "panic caught at api boundary");

    let trace = std::backtrace::Backtrace::force_capture().to_string();
    let problem = Problem::from_unhandled(detail, trace);
    let body = serde_json::to_vec(&problem).unwrap_or_default();

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| {
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
