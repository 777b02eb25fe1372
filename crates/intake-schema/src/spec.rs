//! # Specification Tree
//!
//! The declarative description a resource supplies for one request
//! intent. A specification is a tree: leaves are [`FieldSpec`]s (one
//! field, its filters, its validators), interior nodes are
//! [`GroupSpec`]s validating nested substructures.
//!
//! The variant is explicit — a group entry is written as a field, a
//! nested group, or a registry factory reference — so there is no
//! structural sniffing to decide what an entry means.

use crate::filter::FilterStep;
use crate::validator::ValidatorStep;

/// Character-count bounds for the string-length validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthBounds {
    /// Minimum length, inclusive.
    pub min: Option<usize>,
    /// Maximum length, inclusive.
    pub max: Option<usize>,
}

impl LengthBounds {
    /// Lower bound only.
    pub fn at_least(min: usize) -> Self {
        Self { min: Some(min), max: None }
    }

    /// Upper bound only.
    pub fn at_most(max: usize) -> Self {
        Self { min: None, max: Some(max) }
    }

    /// Both bounds, inclusive.
    pub fn between(min: usize, max: usize) -> Self {
        Self { min: Some(min), max: Some(max) }
    }
}

/// The leaf validation unit: one named field with its ordered filter
/// and validator chains.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name; also the key the engine reads from the input map.
    pub name: String,
    /// Whether the field must carry a non-empty value.
    pub required: bool,
    /// Skip validators entirely when the cleaned value is empty.
    /// Defaults to `!required`; derived catalog entries may override.
    pub allow_empty: bool,
    /// Transformations, applied strictly in declared order.
    pub filters: Vec<FilterStep>,
    /// Predicates, run in declared order with no short-circuit.
    pub validators: Vec<ValidatorStep>,
}

impl FieldSpec {
    /// A bare field with no filters or validators.
    /// `allow_empty` starts as `!required`.
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            allow_empty: !required,
            filters: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Append a filter step, preserving order.
    pub fn filter(mut self, step: FilterStep) -> Self {
        self.filters.push(step);
        self
    }

    /// Append a validator step, preserving order.
    pub fn validator(mut self, step: ValidatorStep) -> Self {
        self.validators.push(step);
        self
    }

    /// Override the allow-empty flag.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }
}

/// One node of a specification tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// A single field.
    Leaf(FieldSpec),
    /// A nested group of fields.
    Group(GroupSpec),
}

impl From<FieldSpec> for SchemaNode {
    fn from(field: FieldSpec) -> Self {
        SchemaNode::Leaf(field)
    }
}

impl From<GroupSpec> for SchemaNode {
    fn from(group: GroupSpec) -> Self {
        SchemaNode::Group(group)
    }
}

/// How one group entry is written in a specification.
#[derive(Debug, Clone)]
pub(crate) enum SpecEntry {
    /// An inline field, keyed by its own name.
    Field(FieldSpec),
    /// A nested group, keyed by the entry key.
    Group { key: String, spec: GroupSpec },
    /// A registry reference: resolved at compile time, keyed by its
    /// own name when it resolves to a field, by the entry key when it
    /// resolves to a group.
    Factory { key: String },
}

/// An ordered mapping of keys to sub-specifications.
///
/// Entry order is preserved end-to-end: the engine iterates fields in
/// declaration order and never reorders error lists. Key uniqueness is
/// enforced at compile time, not here — the builder stays infallible.
#[derive(Debug, Clone, Default)]
pub struct GroupSpec {
    pub(crate) entries: Vec<SpecEntry>,
}

impl GroupSpec {
    /// An empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field entry, keyed by the field's own name.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.entries.push(SpecEntry::Field(spec));
        self
    }

    /// Add a nested group under `key`.
    pub fn group(mut self, key: impl Into<String>, spec: GroupSpec) -> Self {
        self.entries.push(SpecEntry::Group { key: key.into(), spec });
        self
    }

    /// Add a registry factory reference under `key`.
    pub fn factory(mut self, key: impl Into<String>) -> Self {
        self.entries.push(SpecEntry::Factory { key: key.into() });
        self
    }

    /// Whether the group declares no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_empty_defaults_to_not_required() {
        assert!(!FieldSpec::new("a", true).allow_empty);
        assert!(FieldSpec::new("a", false).allow_empty);
    }

    #[test]
    fn allow_empty_can_be_overridden() {
        let spec = FieldSpec::new("a", true).allow_empty(true);
        assert!(spec.required);
        assert!(spec.allow_empty);
    }

    #[test]
    fn group_preserves_declaration_order() {
        let group = GroupSpec::new()
            .field(FieldSpec::new("b", true))
            .field(FieldSpec::new("a", true))
            .factory("shared.audit");
        assert_eq!(group.len(), 3);
        match &group.entries[0] {
            SpecEntry::Field(f) => assert_eq!(f.name, "b"),
            other => panic!("expected field, got {other:?}"),
        }
        match &group.entries[2] {
            SpecEntry::Factory { key } => assert_eq!(key, "shared.audit"),
            other => panic!("expected factory, got {other:?}"),
        }
    }
}
