//! # Specification Factory Registry
//!
//! An explicit mapping from symbolic keys to pure specification
//! factories. A group entry written as `factory("user.query")` resolves
//! through the registry at compile time; an unknown key is a
//! [`ConfigurationError`] — a bug in the resource definition, caught
//! before any request data is involved.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use intake_core::ConfigurationError;

use crate::spec::SchemaNode;

type Factory = Arc<dyn Fn() -> SchemaNode + Send + Sync>;

/// Registry of named specification factories.
#[derive(Clone, Default)]
pub struct SpecRegistry {
    factories: BTreeMap<String, Factory>,
}

impl SpecRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `key`, replacing any previous entry.
    pub fn register<F, N>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> N + Send + Sync + 'static,
        N: Into<SchemaNode>,
    {
        self.factories.insert(key.into(), Arc::new(move || factory().into()));
    }

    /// Resolve a key to a fresh specification node.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownFactory`] when nothing is
    /// registered under `key`.
    pub fn resolve(&self, key: &str) -> Result<SchemaNode, ConfigurationError> {
        match self.factories.get(key) {
            Some(factory) => Ok(factory()),
            None => Err(ConfigurationError::UnknownFactory { key: key.to_string() }),
        }
    }

    /// Whether a factory is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for SpecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecRegistry").field("keys", &self.keys()).finish()
    }
}
