//! # intake-core — Foundational Types for the Intake Pipeline
//!
//! Shared vocabulary for the schema layer (`intake-schema`) and the API
//! layer (`intake-api`):
//!
//! - [`Value`] — the dynamic value model every filter and validator
//!   operates on. Request bodies, query strings and cleaned output all
//!   travel through this one representation.
//! - [`CallerIdentity`] — immutable per-request identity, built once at
//!   the request boundary and passed by reference into handlers.
//! - [`Translator`] — injected message-translation function, defaulting
//!   to identity. Validation messages are translated at run time, not
//!   baked into specifications.
//! - [`ConfigurationError`] / [`AccessError`] — the non-recoverable half
//!   of the error taxonomy. Validation and decode failures are *data*,
//!   not errors, and live with the components that produce them.
//!
//! ## Crate Policy
//!
//! - Sits at the bottom of the dependency DAG — no HTTP, no I/O.
//! - Everything here is immutable after construction and safely
//!   shareable across concurrent request tasks.

pub mod error;
pub mod identity;
pub mod translate;
pub mod value;

pub use error::{AccessError, ConfigurationError};
pub use identity::CallerIdentity;
pub use translate::Translator;
pub use value::Value;
