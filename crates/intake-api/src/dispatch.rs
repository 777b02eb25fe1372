//! # Verb Dispatch
//!
//! Resolves `(HTTP verb, id present?)` to a REST intent and runs the
//! intent's input filter, replacing the downstream input with cleaned
//! values on success or short-circuiting with a 400 problem carrying
//! the per-field message map.
//!
//! | Verb   | With id  | Without id |
//! |--------|----------|------------|
//! | GET    | fetch    | fetchAll   |
//! | POST   | create   | create     |
//! | PUT    | update   | —          |
//! | PATCH  | patch    | —          |
//! | DELETE | delete   | —          |
//!
//! `fetch`/`patch`/`delete` bypass schema validation here entirely —
//! whatever checks they need belong to the downstream resource.

use axum::http::Method;
use intake_core::Value;
use intake_schema::{Engine, Schema, SchemaNode, SpecRegistry};

use crate::problem::Problem;

/// Problem payload key for list-query validation messages.
pub const QUERY_MESSAGES_KEY: &str = "queryParamsMessages";
/// Problem payload key for create validation messages.
pub const CREATE_MESSAGES_KEY: &str = "createParamsMessages";
/// Problem payload key for update validation messages.
pub const UPDATE_MESSAGES_KEY: &str = "updateParamsMessages";

/// The semantic operation implied by verb and path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Fetch,
    FetchAll,
    Create,
    Update,
    Patch,
    Delete,
}

impl Intent {
    /// Resolve a verb and id-presence to an intent. PUT/PATCH/DELETE
    /// without an id have no intent; downstream treats that as
    /// not-implemented.
    pub fn resolve(method: &Method, has_id: bool) -> Option<Intent> {
        if *method == Method::GET {
            Some(if has_id { Intent::Fetch } else { Intent::FetchAll })
        } else if *method == Method::POST {
            Some(Intent::Create)
        } else if *method == Method::PUT && has_id {
            Some(Intent::Update)
        } else if *method == Method::PATCH && has_id {
            Some(Intent::Patch)
        } else if *method == Method::DELETE && has_id {
            Some(Intent::Delete)
        } else {
            None
        }
    }

    /// The intent's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Fetch => "fetch",
            Intent::FetchAll => "fetchAll",
            Intent::Create => "create",
            Intent::Update => "update",
            Intent::Patch => "patch",
            Intent::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three optional specifications a resource may declare.
#[derive(Debug, Clone, Default)]
pub struct SpecSet {
    /// Validates `queryParams` for fetchAll.
    pub query: Option<SchemaNode>,
    /// Validates the decoded body for create.
    pub create: Option<SchemaNode>,
    /// Validates the decoded body for update.
    pub update: Option<SchemaNode>,
}

/// Run the input filter for one intent.
///
/// On success the cleaned values replace `query` (fetchAll) or `body`
/// (create/update) in place. On failure the returned problem carries
/// `{<intent>ParamsMessages: {fieldPath: [message, ...]}}` with status
/// 400. Intents without a declared specification pass untouched.
pub fn run_input_filter(
    intent: Intent,
    specs: &SpecSet,
    engine: &Engine,
    registry: &SpecRegistry,
    query: &mut Value,
    body: &mut Value,
) -> Result<(), Problem> {
    let (spec, target, messages_key) = match intent {
        Intent::FetchAll => (&specs.query, query, QUERY_MESSAGES_KEY),
        Intent::Create => (&specs.create, body, CREATE_MESSAGES_KEY),
        Intent::Update => (&specs.update, body, UPDATE_MESSAGES_KEY),
        Intent::Fetch | Intent::Patch | Intent::Delete => return Ok(()),
    };
    let Some(spec) = spec.clone() else {
        return Ok(());
    };

    let schema = Schema::compile(spec, registry).map_err(Problem::from)?;
    let result = engine.validate(&schema, target);
    if result.is_valid() {
        *target = Value::Object(result.values().clone());
        Ok(())
    } else {
        Err(Problem::new("Input filter Error!", 400).with(messages_key, result.errors_json()))
    }
}
