//! # intake-api — REST Surface for the Intake Pipeline
//!
//! The HTTP-facing layer: decodes request bodies by content type,
//! resolves verbs to REST intents, runs the per-intent input filter
//! from `intake-schema`, and shapes results into the uniform
//! response/problem envelopes.
//!
//! ## Request flow
//!
//! ```text
//! decode (content type → value map)
//!   → Intent::resolve (verb + id presence)
//!     → run_input_filter (fetchAll: query, create/update: body)
//!       → Resource handler (validated input + caller identity)
//!         → ApiResponse / Problem envelope
//! ```
//!
//! ## Error boundaries
//!
//! Decode failures and validation failures become 400 problems where
//! they happen; a missing required identity attribute is 406; panics
//! escaping handlers are caught by the outermost middleware and
//! rendered as 500 problems. Recoverable failures never propagate as
//! errors past their boundary.
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG.
//! - No validation logic in handlers — that lives in `intake-schema`.
//! - All error responses use the problem envelope.

pub mod decode;
pub mod dispatch;
pub mod middleware;
pub mod openapi;
pub mod problem;
pub mod resource;
pub mod response;
pub mod router;
pub mod state;

pub use decode::{decode, Decoded, DecodeError};
pub use dispatch::{Intent, SpecSet};
pub use middleware::with_middleware;
pub use problem::Problem;
pub use resource::{Outcome, Resource};
pub use response::{ApiResponse, PaginationMeta};
pub use router::{rest_resource, rest_resource_with};
pub use state::AppConfig;
