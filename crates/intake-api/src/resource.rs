//! # REST Resource Trait
//!
//! One trait per REST resource: the three optional input-filter
//! specifications plus the six intent handlers. Every handler defaults
//! to a 405 "Method not implemented!" problem, so a resource only
//! implements the operations it actually supports.
//!
//! Handlers receive already-validated input (the dispatcher replaced
//! the raw query/body with cleaned values) and the immutable
//! [`CallerIdentity`] for the request.

use async_trait::async_trait;
use intake_core::{CallerIdentity, Value};
use intake_schema::SchemaNode;

use crate::problem::Problem;
use crate::response::ApiResponse;

/// What an intent handler produces: a success envelope or a problem.
pub type Outcome = Result<ApiResponse, Problem>;

/// The 405 problem every unimplemented handler returns.
pub fn method_not_implemented() -> Problem {
    Problem::new("Method not implemented!", 405)
}

/// A REST resource: input-filter specifications and intent handlers.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Specification validating `queryParams` for fetchAll.
    fn query_spec(&self) -> Option<SchemaNode> {
        None
    }

    /// Specification validating the decoded body for create.
    fn create_spec(&self) -> Option<SchemaNode> {
        None
    }

    /// Specification validating the decoded body for update.
    fn update_spec(&self) -> Option<SchemaNode> {
        None
    }

    /// GET with an id.
    async fn fetch(&self, _id: &str, _caller: &CallerIdentity) -> Outcome {
        Err(method_not_implemented())
    }

    /// GET without an id; `query` holds the validated query map.
    async fn fetch_all(&self, _query: &Value, _caller: &CallerIdentity) -> Outcome {
        Err(method_not_implemented())
    }

    /// POST; `data` holds the validated body.
    async fn create(&self, _data: &Value, _caller: &CallerIdentity) -> Outcome {
        Err(method_not_implemented())
    }

    /// PUT with an id; `data` holds the validated body.
    async fn update(&self, _id: &str, _data: &Value, _caller: &CallerIdentity) -> Outcome {
        Err(method_not_implemented())
    }

    /// PATCH with an id; the body passes through unvalidated here.
    async fn patch(&self, _id: &str, _data: &Value, _caller: &CallerIdentity) -> Outcome {
        Err(method_not_implemented())
    }

    /// DELETE with an id.
    async fn delete(&self, _id: &str, _caller: &CallerIdentity) -> Outcome {
        Err(method_not_implemented())
    }
}
