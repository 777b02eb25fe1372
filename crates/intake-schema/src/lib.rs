//! # intake-schema — Declarative Field Validation
//!
//! The schema layer of the intake pipeline. A resource declares *what*
//! each request field should look like; this crate turns that
//! declaration into cleaned, typed values or a structured map of
//! per-field error messages.
//!
//! ## Pieces
//!
//! | Module        | Responsibility                                      |
//! |---------------|-----------------------------------------------------|
//! | [`spec`]      | Specification tree: [`FieldSpec`], [`GroupSpec`], [`SchemaNode`] |
//! | [`filter`]    | Ordered value transformations ([`FilterStep`])      |
//! | [`validator`] | Predicates with structured messages ([`ValidatorStep`]) |
//! | [`catalog`]   | Reusable field shapes (`string`, `integer`, `email`, …) |
//! | [`registry`]  | Symbolic key → specification factory                |
//! | [`compile`]   | Specification tree → executable [`Schema`]          |
//! | [`engine`]    | [`Engine::validate`] → [`ValidationResult`]         |
//!
//! ## Execution model
//!
//! Per field: filters run strictly in declared order, each consuming
//! the previous output; then — unless the field allows empty and the
//! cleaned value is empty — *every* validator runs, in declared order,
//! with no short-circuit, and all failure messages are collected.
//! Specifications are immutable and safely shared across concurrent
//! validations.

pub mod catalog;
pub mod compile;
pub mod engine;
pub mod filter;
pub mod registry;
pub mod spec;
pub mod validator;

mod credit_card;
mod email;

pub use compile::Schema;
pub use engine::{Engine, ValidationResult};
pub use filter::FilterStep;
pub use registry::SpecRegistry;
pub use spec::{FieldSpec, GroupSpec, LengthBounds, SchemaNode};
pub use validator::ValidatorStep;
