//! # Caller Identity
//!
//! Immutable per-request identity. The host's authentication layer is
//! an external collaborator: whatever it extracts (OAuth attributes,
//! JWT claims) is folded into one [`CallerIdentity`] at the request
//! boundary and passed by reference into resource handlers. Handlers
//! never mutate it and the core never stores it.

use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// Identity of the authenticated caller for one request.
///
/// All attributes are optional at construction — a public endpoint has
/// none of them. Accessors that a resource *requires* return
/// [`AccessError`] when the attribute is absent, which the API layer
/// renders as 406 Not Acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Authenticated user id, when the host auth layer provided one.
    pub user_id: Option<i64>,
    /// Branch the user acts for, when scoped.
    pub branch_id: Option<i64>,
    /// Legation the user acts for, when scoped.
    pub legation_id: Option<i64>,
    /// OAuth client identifier.
    pub client_id: Option<String>,
    /// Granted scopes, in the order the auth layer supplied them.
    pub scopes: Vec<String>,
}

impl CallerIdentity {
    /// An identity with no attributes (unauthenticated request).
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The authenticated user id.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::MissingUserId`] when the request carried
    /// no user attribution.
    pub fn require_user_id(&self) -> Result<i64, AccessError> {
        self.user_id.ok_or(AccessError::MissingUserId)
    }

    /// Whether the caller was granted the given scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}
