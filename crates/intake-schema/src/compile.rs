//! # Schema Compilation
//!
//! Turns a declared specification tree into an executable [`Schema`]:
//! factory references are resolved through the registry, a top-level
//! leaf is wrapped for uniform handling, group keys are checked for
//! uniqueness and declaration order is preserved exactly.
//!
//! Compilation is deterministic and idempotent — compiling the same
//! specification twice yields schemas that validate identically. All
//! failures here are [`ConfigurationError`]s: bugs in the resource
//! definition, never request-data errors.

use std::collections::BTreeSet;

use intake_core::ConfigurationError;

use crate::registry::SpecRegistry;
use crate::spec::{FieldSpec, GroupSpec, SchemaNode, SpecEntry};

/// A compiled node: a leaf field or an ordered group of compiled nodes.
#[derive(Debug, Clone)]
pub(crate) enum CompiledNode {
    Field(FieldSpec),
    Group(Vec<(String, CompiledNode)>),
}

/// An executable schema, ready for [`crate::Engine::validate`].
#[derive(Debug, Clone)]
pub struct Schema {
    root: Vec<(String, CompiledNode)>,
}

impl Schema {
    /// Compile a specification against a factory registry.
    ///
    /// A top-level leaf is wrapped into a single-entry group keyed by
    /// the field's own name.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownFactory`] for an unresolvable
    /// factory reference, [`ConfigurationError::DuplicateKey`] when two
    /// entries of one group compile to the same key.
    pub fn compile(
        spec: impl Into<SchemaNode>,
        registry: &SpecRegistry,
    ) -> Result<Self, ConfigurationError> {
        let root = match spec.into() {
            SchemaNode::Leaf(field) => vec![(field.name.clone(), CompiledNode::Field(field))],
            SchemaNode::Group(group) => compile_group(group, registry)?,
        };
        Ok(Self { root })
    }

    /// Compile a specification that contains no factory references.
    pub fn from_spec(spec: impl Into<SchemaNode>) -> Result<Self, ConfigurationError> {
        Self::compile(spec, &SpecRegistry::new())
    }

    /// The compiled top-level entries, in declaration order.
    pub(crate) fn root(&self) -> &[(String, CompiledNode)] {
        &self.root
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn compile_group(
    group: GroupSpec,
    registry: &SpecRegistry,
) -> Result<Vec<(String, CompiledNode)>, ConfigurationError> {
    let mut seen = BTreeSet::new();
    let mut compiled = Vec::with_capacity(group.entries.len());

    for entry in group.entries {
        let (key, node) = match entry {
            SpecEntry::Field(field) => (field.name.clone(), CompiledNode::Field(field)),
            SpecEntry::Group { key, spec } => {
                (key, CompiledNode::Group(compile_group(spec, registry)?))
            }
            SpecEntry::Factory { key } => match registry.resolve(&key)? {
                // A field from a factory keeps its own name.
                SchemaNode::Leaf(field) => (field.name.clone(), CompiledNode::Field(field)),
                SchemaNode::Group(spec) => {
                    (key, CompiledNode::Group(compile_group(spec, registry)?))
                }
            },
        };
        if !seen.insert(key.clone()) {
            return Err(ConfigurationError::DuplicateKey { key });
        }
        compiled.push((key, node));
    }

    Ok(compiled)
}
