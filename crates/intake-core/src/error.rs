//! # Error Types — Non-Recoverable Failures
//!
//! The pipeline's error taxonomy splits along one line: validation and
//! decode failures are expected, converted to data at the boundary that
//! produced them, and never thrown. The types here are the other half —
//! failures that indicate a broken resource definition or a request
//! that cannot legally proceed.

use thiserror::Error;

/// A malformed specification, detected while compiling a schema.
///
/// Configuration errors are programming errors in the resource
/// definition. They surface at schema-compile time and are never
/// produced by request data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A specification entry referenced a factory key that is not
    /// registered.
    #[error("no specification factory registered for key '{key}'")]
    UnknownFactory {
        /// The unresolved registry key.
        key: String,
    },

    /// Two entries in one group compiled to the same key.
    #[error("duplicate field key '{key}' in specification group")]
    DuplicateKey {
        /// The colliding key.
        key: String,
    },

    /// A regex-pattern validator was declared with an invalid pattern.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Compilation failure detail.
        reason: String,
    },
}

/// A request that is missing a required identity attribute.
///
/// Raised by [`crate::CallerIdentity`] accessors and rendered as
/// 406 Not Acceptable at the API boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The caller identity carries no authenticated user id.
    #[error("Unacceptable resource usage")]
    MissingUserId,
}
