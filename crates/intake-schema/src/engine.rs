//! # Validation Engine
//!
//! Executes a compiled [`Schema`] against an input value map. Per
//! field: run the filter chain left-to-right over the raw value (a
//! missing key is treated as absent), then — unless the field allows
//! empty and the cleaned value is empty, the one and only short-circuit
//! — run every validator in declared order and collect every failure
//! message. Groups recurse, their fields keyed by dotted paths.
//!
//! The outcome is all-or-nothing: if any field produced an error, the
//! result carries only the error map; otherwise only the cleaned
//! values, nested groups mirrored as nested objects.

use std::collections::BTreeMap;

use intake_core::{Translator, Value};

use crate::compile::{CompiledNode, Schema};

/// Outcome of one validation run. Exactly one of `values`/`errors` is
/// populated, selected by whether any field failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    values: BTreeMap<String, Value>,
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    /// Whether every field validated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Cleaned values; empty when any field failed.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Failure messages keyed by dotted field path; empty on success.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Cleaned values as a JSON object, for writing back into the
    /// request.
    pub fn values_json(&self) -> serde_json::Value {
        Value::Object(self.values.clone()).to_json()
    }

    /// Error map as a JSON object (`path` → array of messages).
    pub fn errors_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.errors
                .iter()
                .map(|(path, messages)| {
                    (
                        path.clone(),
                        serde_json::Value::Array(
                            messages
                                .iter()
                                .map(|m| serde_json::Value::String(m.clone()))
                                .collect(),
                        ),
                    )
                })
                .collect(),
        )
    }
}

/// The validation engine. Holds the injected translator; otherwise
/// stateless, and shareable across concurrent validations.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    translator: Translator,
}

impl Engine {
    /// Engine with the identity translator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with an injected message translator.
    pub fn with_translator(translator: Translator) -> Self {
        Self { translator }
    }

    /// Validate an input value map against a compiled schema.
    pub fn validate(&self, schema: &Schema, input: &Value) -> ValidationResult {
        let mut values = BTreeMap::new();
        let mut errors = BTreeMap::new();
        self.walk(schema.root(), input, "", &mut values, &mut errors);

        if errors.is_empty() {
            ValidationResult { values, errors }
        } else {
            tracing::debug!(fields = errors.len(), "input validation failed");
            ValidationResult { values: BTreeMap::new(), errors }
        }
    }

    fn walk(
        &self,
        nodes: &[(String, CompiledNode)],
        input: &Value,
        prefix: &str,
        values: &mut BTreeMap<String, Value>,
        errors: &mut BTreeMap<String, Vec<String>>,
    ) {
        for (key, node) in nodes {
            let path =
                if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
            match node {
                CompiledNode::Field(field) => {
                    let raw = input.get(&field.name).cloned().unwrap_or(Value::Null);
                    let cleaned =
                        field.filters.iter().fold(raw, |value, step| step.apply(value));

                    // The allow-empty short-circuit: the only rule that
                    // skips validators.
                    if field.allow_empty && cleaned.is_empty() {
                        values.insert(key.clone(), cleaned);
                        continue;
                    }

                    let mut messages = Vec::new();
                    for validator in &field.validators {
                        messages.extend(validator.run(&cleaned, &self.translator));
                    }
                    if messages.is_empty() {
                        values.insert(key.clone(), cleaned);
                    } else {
                        errors.insert(path, messages);
                    }
                }
                CompiledNode::Group(entries) => {
                    // Non-object input at a group position means every
                    // nested field is absent.
                    let sub_input = input.get(key).cloned().unwrap_or(Value::Null);
                    let mut sub_values = BTreeMap::new();
                    self.walk(entries, &sub_input, &path, &mut sub_values, errors);
                    values.insert(key.clone(), Value::Object(sub_values));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::spec::{GroupSpec, LengthBounds};

    fn object(pairs: &[(&str, Value)]) -> Value {
        Value::Object(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn required_field_with_empty_input_errors() {
        let schema = Schema::from_spec(catalog::string("name", true, None)).unwrap();
        let result = Engine::new().validate(&schema, &object(&[("name", Value::String("".into()))]));
        assert!(!result.is_valid());
        assert_eq!(
            result.errors().get("name"),
            Some(&vec!["Value is required and can't be empty".to_string()])
        );
        assert!(result.values().is_empty());
    }

    #[test]
    fn required_field_missing_from_input_errors() {
        let schema = Schema::from_spec(catalog::string("name", true, None)).unwrap();
        let result = Engine::new().validate(&schema, &object(&[]));
        assert!(!result.is_valid());
        assert!(result.errors().contains_key("name"));
    }

    #[test]
    fn optional_empty_field_short_circuits_to_null() {
        let spec = GroupSpec::new().field(catalog::string("nick", false, None));
        let schema = Schema::from_spec(spec).unwrap();
        let result = Engine::new().validate(&schema, &object(&[]));
        assert!(result.is_valid());
        assert_eq!(result.values().get("nick"), Some(&Value::Null));
    }

    #[test]
    fn filters_clean_before_validation() {
        let schema = Schema::from_spec(catalog::string("x", true, None)).unwrap();
        let result =
            Engine::new().validate(&schema, &object(&[("x", Value::String("  <b>hi</b>\n".into()))]));
        assert!(result.is_valid());
        assert_eq!(result.values().get("x"), Some(&Value::String("hi".into())));
    }

    #[test]
    fn all_validators_run_and_messages_accumulate_in_order() {
        let spec = catalog::integer("n", true, Some(5));
        let schema = Schema::from_spec(spec).unwrap();
        let result = Engine::new().validate(&schema, &object(&[("n", Value::String("".into()))]));
        assert_eq!(
            result.errors().get("n"),
            Some(&vec![
                "Value is required and can't be empty".to_string(),
                "The input is not greater than or equal to '5'".to_string(),
            ])
        );
    }

    #[test]
    fn nested_group_success_mirrors_shape() {
        let spec = GroupSpec::new().group(
            "address",
            GroupSpec::new()
                .field(catalog::string("city", true, None))
                .field(catalog::digits("zip", true, None)),
        );
        let schema = Schema::from_spec(spec).unwrap();
        let input = object(&[(
            "address",
            object(&[("city", Value::String("A".into())), ("zip", Value::String("1".into()))]),
        )]);
        let result = Engine::new().validate(&schema, &input);
        assert!(result.is_valid());
        assert_eq!(
            result.values().get("address"),
            Some(&object(&[
                ("city", Value::String("A".into())),
                ("zip", Value::String("1".into()))
            ]))
        );
    }

    #[test]
    fn nested_group_failure_uses_dotted_path_and_clears_values() {
        let spec = GroupSpec::new().group(
            "address",
            GroupSpec::new()
                .field(catalog::string("city", true, None))
                .field(catalog::digits("zip", true, None)),
        );
        let schema = Schema::from_spec(spec).unwrap();
        let input = object(&[(
            "address",
            object(&[("city", Value::String("".into())), ("zip", Value::String("1".into()))]),
        )]);
        let result = Engine::new().validate(&schema, &input);
        assert!(!result.is_valid());
        assert_eq!(
            result.errors().get("address.city"),
            Some(&vec!["Value is required and can't be empty".to_string()])
        );
        assert!(result.values().is_empty());
    }

    #[test]
    fn group_with_non_object_input_treats_fields_as_absent() {
        let spec = GroupSpec::new()
            .group("address", GroupSpec::new().field(catalog::string("city", true, None)));
        let schema = Schema::from_spec(spec).unwrap();
        let result =
            Engine::new().validate(&schema, &object(&[("address", Value::String("x".into()))]));
        assert!(result.errors().contains_key("address.city"));
    }

    #[test]
    fn compilation_is_deterministic() {
        let build = || {
            GroupSpec::new()
                .field(catalog::string("name", true, Some(LengthBounds::between(1, 10))))
                .field(catalog::integer("age", false, Some(0)))
        };
        let schema_a = Schema::from_spec(build()).unwrap();
        let schema_b = Schema::from_spec(build()).unwrap();
        let input = object(&[("name", Value::String("Ada".into())), ("age", Value::Int(36))]);
        let engine = Engine::new();
        assert_eq!(engine.validate(&schema_a, &input), engine.validate(&schema_b, &input));

        let bad = object(&[("name", Value::String("".into()))]);
        assert_eq!(engine.validate(&schema_a, &bad), engine.validate(&schema_b, &bad));
    }

    #[test]
    fn translator_is_applied_to_messages() {
        let schema = Schema::from_spec(catalog::string("name", true, None)).unwrap();
        let engine =
            Engine::with_translator(Translator::new(|s| format!("tr({s})")));
        let result = engine.validate(&schema, &object(&[]));
        assert_eq!(
            result.errors().get("name"),
            Some(&vec!["tr(Value is required and can't be empty)".to_string()])
        );
    }

    #[test]
    fn errors_json_shape() {
        let schema = Schema::from_spec(catalog::string("name", true, None)).unwrap();
        let result = Engine::new().validate(&schema, &object(&[]));
        let json = result.errors_json();
        assert_eq!(
            json["name"][0],
            serde_json::Value::String("Value is required and can't be empty".into())
        );
    }
}
