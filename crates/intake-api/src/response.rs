//! # Response Envelope
//!
//! The uniform success payload: `{result: true, status, data}`, plus an
//! optional `meta` block (pagination and friends). A domain result that
//! already has the right shape can opt out of wrapping with the exact
//! mode. Status codes are confined to the 100–599 range; the reason
//! phrase comes from a fixed table, with unknown codes getting an empty
//! phrase.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::problem::Problem;

/// Lowest status code an envelope accepts.
pub const MIN_STATUS_CODE: u16 = 100;
/// Highest status code an envelope accepts.
pub const MAX_STATUS_CODE: u16 = 599;

/// An envelope was constructed with an unusable status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Status outside the 100–599 range.
    #[error("invalid status code \"{0}\"; must be an integer between {MIN_STATUS_CODE} and {MAX_STATUS_CODE}, inclusive")]
    InvalidStatus(u16),
}

/// Pagination block under `meta.pagination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: i64,
    /// Total number of items across all pages.
    #[serde(rename = "totalSize")]
    pub total_size: i64,
    /// Items per page.
    #[serde(rename = "pageSize")]
    pub page_size: i64,
}

/// The success envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    data: serde_json::Value,
    status: u16,
    exact: bool,
    meta: BTreeMap<String, serde_json::Value>,
}

impl ApiResponse {
    /// 200 envelope around `data`.
    pub fn ok(data: serde_json::Value) -> Self {
        Self { data, status: 200, exact: false, meta: BTreeMap::new() }
    }

    /// 201 envelope around `data`.
    pub fn created(data: serde_json::Value) -> Self {
        Self { data, status: 201, exact: false, meta: BTreeMap::new() }
    }

    /// Envelope with an explicit status code.
    ///
    /// # Errors
    ///
    /// [`EnvelopeError::InvalidStatus`] outside the 100–599 range.
    pub fn with_status(data: serde_json::Value, status: u16) -> Result<Self, EnvelopeError> {
        if !(MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&status) {
            return Err(EnvelopeError::InvalidStatus(status));
        }
        Ok(Self { data, status, exact: false, meta: BTreeMap::new() })
    }

    /// Serialize a domain result into a 200 envelope.
    ///
    /// The fallback mirrors the response builder contract: a result
    /// that cannot be expressed as JSON becomes a 502 problem.
    pub fn from_serialize<T: Serialize>(result: &T) -> Result<Self, Problem> {
        match serde_json::to_value(result) {
            Ok(data) => Ok(Self::ok(data)),
            Err(err) => {
                tracing::error!(error = %err, "domain result is not JSON-serializable");
                Err(Problem::new("Bad Gateway", 502))
            }
        }
    }

    /// Emit `data` unwrapped instead of the `{result, status, data}`
    /// shape — for results that already carry an equivalent envelope.
    pub fn exact(data: serde_json::Value, status: u16) -> Result<Self, EnvelopeError> {
        let mut response = Self::with_status(data, status)?;
        response.exact = true;
        Ok(response)
    }

    /// Attach `meta.pagination`.
    pub fn with_pagination(mut self, total_size: i64, page: i64, page_size: i64) -> Self {
        let pagination = PaginationMeta { page, total_size, page_size };
        self.meta.insert(
            "pagination".to_string(),
            serde_json::to_value(pagination).unwrap_or(serde_json::Value::Null),
        );
        self
    }

    /// Merge additional meta entries; `force` discards what was there.
    pub fn with_meta(mut self, meta: BTreeMap<String, serde_json::Value>, force: bool) -> Self {
        if force {
            self.meta.clear();
        }
        self.meta.extend(meta);
        self
    }

    /// The response status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase for this response's status.
    pub fn reason_phrase(&self) -> &'static str {
        reason_phrase(self.status)
    }

    /// Build the JSON body this envelope serializes to.
    pub fn body(&self) -> serde_json::Value {
        let mut body = if self.exact {
            self.data.clone()
        } else {
            serde_json::json!({
                "result": true,
                "status": self.status,
                "data": self.data,
            })
        };
        if !self.meta.is_empty() {
            if let serde_json::Value::Object(map) = &mut body {
                map.insert(
                    "meta".to_string(),
                    serde_json::Value::Object(self.meta.clone().into_iter().collect()),
                );
            }
        }
        body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self.body())).into_response()
    }
}

/// Reason phrase for a status code, from the fixed 100–599 table.
/// Unknown codes yield an empty phrase.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        // Informational
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        // Success
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        // Redirection
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        306 => "Switch Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        // Client error
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        444 => "Connection Closed Without Response",
        451 => "Unavailable For Legal Reasons",
        // Server error
        499 => "Client Closed Request",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        599 => "Network Connect Timeout Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_shape() {
        let response = ApiResponse::ok(serde_json::json!({"id": 7}));
        let body = response.body();
        assert_eq!(body["result"], true);
        assert_eq!(body["status"], 200);
        assert_eq!(body["data"]["id"], 7);
        assert!(body.get("meta").is_none());
    }

    #[test]
    fn exact_mode_skips_the_wrapper() {
        let response =
            ApiResponse::exact(serde_json::json!({"result": false, "custom": 1}), 200).unwrap();
        let body = response.body();
        assert_eq!(body["custom"], 1);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn pagination_meta_shape() {
        let response =
            ApiResponse::ok(serde_json::json!([1, 2, 3])).with_pagination(40, 2, 3);
        let body = response.body();
        assert_eq!(body["meta"]["pagination"]["page"], 2);
        assert_eq!(body["meta"]["pagination"]["totalSize"], 40);
        assert_eq!(body["meta"]["pagination"]["pageSize"], 3);
    }

    #[test]
    fn with_meta_merges_and_force_replaces() {
        let mut extra = BTreeMap::new();
        extra.insert("warnings".to_string(), serde_json::json!(["w1"]));
        let response = ApiResponse::ok(serde_json::json!({}))
            .with_pagination(1, 1, 10)
            .with_meta(extra.clone(), false);
        let body = response.body();
        assert!(body["meta"].get("pagination").is_some());
        assert!(body["meta"].get("warnings").is_some());

        let forced = ApiResponse::ok(serde_json::json!({}))
            .with_pagination(1, 1, 10)
            .with_meta(extra, true);
        let body = forced.body();
        assert!(body["meta"].get("pagination").is_none());
        assert!(body["meta"].get("warnings").is_some());
    }

    #[test]
    fn status_out_of_range_is_rejected() {
        assert_eq!(
            ApiResponse::with_status(serde_json::json!({}), 600).unwrap_err(),
            EnvelopeError::InvalidStatus(600)
        );
        assert_eq!(
            ApiResponse::with_status(serde_json::json!({}), 99).unwrap_err(),
            EnvelopeError::InvalidStatus(99)
        );
    }

    #[test]
    fn reason_phrases_from_the_fixed_table() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(418), "I'm a teapot");
        assert_eq!(reason_phrase(599), "Network Connect Timeout Error");
        // Unknown codes get an empty phrase.
        assert_eq!(reason_phrase(298), "");
        assert_eq!(reason_phrase(460), "");
    }

    #[test]
    fn from_serialize_wraps_domain_results() {
        #[derive(Serialize)]
        struct Contact {
            name: &'static str,
        }
        let response = ApiResponse::from_serialize(&Contact { name: "Ada" }).unwrap();
        assert_eq!(response.body()["data"]["name"], "Ada");
    }
}
