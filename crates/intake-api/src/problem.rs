//! # Problem Envelope
//!
//! The uniform error payload: `{detail, status, type, ...additional}`,
//! served as `application/problem+json`. Validation failures, decode
//! failures, access failures and unhandled panics all render through
//! this one shape, so clients parse a single error format.

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::decode::DecodeError;
use intake_core::{AccessError, ConfigurationError};

/// Content type for problem responses.
pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Default problem type URI, pointing at the HTTP status code registry.
pub const DEFAULT_TYPE_URI: &str = "http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html";

/// An API problem payload.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    /// Human-readable failure summary.
    pub detail: String,
    /// HTTP status the problem is served with.
    pub status: u16,
    /// URI describing the problem type.
    #[serde(rename = "type")]
    pub type_uri: String,
    /// Extra fields merged into the payload (e.g. per-field message
    /// maps for validation failures).
    #[serde(flatten)]
    pub additional: BTreeMap<String, serde_json::Value>,
}

impl Problem {
    /// A problem with the default type URI and no additional fields.
    pub fn new(detail: impl Into<String>, status: u16) -> Self {
        Self {
            detail: detail.into(),
            status,
            type_uri: DEFAULT_TYPE_URI.to_string(),
            additional: BTreeMap::new(),
        }
    }

    /// Attach an additional payload field.
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.additional.insert(key.into(), value);
        self
    }

    /// A 500 problem for an unhandled failure, carrying the message
    /// and a captured trace.
    pub fn from_unhandled(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::new(message, 500).with("exception", serde_json::Value::String(trace.into()))
    }

    /// Title for a status code, from the problem title table. Unknown
    /// codes yield an empty string.
    pub fn title_for_status(status: u16) -> &'static str {
        match status {
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            407 => "Proxy Authentication Required",
            408 => "Request Time-out",
            409 => "Conflict",
            410 => "Gone",
            411 => "Length Required",
            412 => "Precondition Failed",
            413 => "Request Entity Too Large",
            414 => "Request-URI Too Large",
            415 => "Unsupported Media Type",
            416 => "Requested range not satisfiable",
            417 => "Expectation Failed",
            418 => "I'm a teapot",
            422 => "Unprocessable Entity",
            423 => "Locked",
            424 => "Failed Dependency",
            425 => "Unordered Collection",
            426 => "Upgrade Required",
            428 => "Precondition Required",
            429 => "Too Many Requests",
            431 => "Request Header Fields Too Large",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Time-out",
            505 => "HTTP Version not supported",
            506 => "Variant Also Negotiates",
            507 => "Insufficient Storage",
            508 => "Loop Detected",
            511 => "Network Authentication Required",
            _ => "",
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(status = self.status, detail = %self.detail, "api problem");
        } else {
            tracing::debug!(status = self.status, detail = %self.detail, "api problem");
        }
        (status, [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)], Json(self)).into_response()
    }
}

impl From<DecodeError> for Problem {
    fn from(_: DecodeError) -> Self {
        Problem::new("Data Parsing Error.", 400)
    }
}

impl From<AccessError> for Problem {
    fn from(err: AccessError) -> Self {
        Problem::new(err.to_string(), 406)
    }
}

impl From<ConfigurationError> for Problem {
    fn from(err: ConfigurationError) -> Self {
        // A broken resource definition, not a client fault.
        tracing::error!(error = %err, "specification configuration error");
        Problem::new(err.to_string(), 500)
    }
}
