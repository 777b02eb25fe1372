//! # Field-Type Catalog
//!
//! Reusable field shapes as pure functions: same arguments, structurally
//! identical [`FieldSpec`] — no hidden state, no I/O (the upload filter
//! is the one declared exception, and it only acts at validation time).
//!
//! Each function wires the filter and validator chains in the order the
//! shape requires; composition helpers append to an existing spec
//! without disturbing what is already there.

use std::path::PathBuf;

use intake_core::ConfigurationError;

use crate::filter::{FilterFn, FilterStep};
use crate::spec::{FieldSpec, LengthBounds};
use crate::validator::ValidatorStep;

/// Default datetime format, used by [`datetime`].
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Default date format, used by [`date`] and [`date_select`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn push_not_empty(validators: &mut Vec<ValidatorStep>, required: bool) {
    if required {
        validators.push(ValidatorStep::not_empty());
    }
}

fn push_string_length(validators: &mut Vec<ValidatorStep>, bounds: Option<LengthBounds>) {
    if let Some(bounds) = bounds {
        validators.push(ValidatorStep::string_length(bounds));
    }
}

/// Sanitized single-line string: trim, strip tags, strip newlines,
/// empty to null.
pub fn string(name: &str, required: bool, bounds: Option<LengthBounds>) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);
    push_string_length(&mut validators, bounds);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::Trim)
        .filter(FilterStep::StripTags)
        .filter(FilterStep::StripNewlines)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// Free text: trimmed only, newlines and markup preserved.
pub fn text(name: &str, required: bool, bounds: Option<LengthBounds>) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);
    push_string_length(&mut validators, bounds);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::Trim)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// Multi-line string rendered with `<br />` markup: tags stripped,
/// newlines converted, then trimmed.
pub fn string_with_nl2br(name: &str, required: bool, bounds: Option<LengthBounds>) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);
    push_string_length(&mut validators, bounds);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::StripTags)
        .filter(FilterStep::Nl2br)
        .filter(FilterStep::Trim)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// Integer with an optional inclusive lower bound.
pub fn integer(name: &str, required: bool, greater_than: Option<i64>) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);
    if let Some(min) = greater_than {
        validators.push(ValidatorStep::greater_than(min, true));
    }

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::ToInt)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// A set of unique integers: sequence elements that fail integer
/// coercion are dropped, duplicates removed in first-seen order;
/// non-sequence input becomes null.
pub fn integer_array(name: &str, required: bool) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);

    let coerce: FilterFn = std::sync::Arc::new(|value| {
        use intake_core::Value;
        match value {
            Value::Array(items) => {
                let mut seen = std::collections::BTreeSet::new();
                let mut out = Vec::new();
                for item in items {
                    if let Value::Int(i) = FilterStep::ToInt.apply(item) {
                        if i != 0 && seen.insert(i) {
                            out.push(Value::Int(i));
                        }
                    }
                }
                Value::Array(out)
            }
            _ => Value::Null,
        }
    });

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::Callback(coerce))
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// Monetary amount: currency noise stripped, comma treated as decimal
/// separator, always numeric.
pub fn money(name: &str, required: bool) -> FieldSpec {
    float(name, required)
}

/// Floating point number with loose normalization.
pub fn float(name: &str, required: bool) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::FloatNormalize)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// Boolean: recognized shapes coerce, everything else casts to `true`.
pub fn boolean(name: &str, required: bool) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);

    let mut spec = FieldSpec::new(name, required).filter(FilterStep::ToBoolean { casting: true });
    spec.validators = validators;
    spec
}

/// Boolean that distinguishes "not supplied": recognized shapes
/// coerce, anything not boolean-typed afterwards becomes null.
pub fn boolean_with_null(name: &str, required: bool) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::ToBoolean { casting: false })
        .filter(FilterStep::NonBooleanToNull);
    spec.validators = validators;
    spec
}

/// Date parsed from loose string input, validated against `format`.
pub fn date(name: &str, required: bool, format: &str) -> FieldSpec {
    let mut validators = vec![ValidatorStep::date_format(format)];
    push_not_empty(&mut validators, required);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::ToDate)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// [`date`] with the default datetime format.
pub fn datetime(name: &str, required: bool) -> FieldSpec {
    date(name, required, DATETIME_FORMAT)
}

/// Date assembled from `{day, month, year}` select components or one
/// of the two fixed string patterns.
pub fn date_select(name: &str, required: bool, format: &str) -> FieldSpec {
    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::ToDateSelect)
        .filter(FilterStep::ToNull);
    spec.validators = vec![ValidatorStep::date_format(format)];
    spec
}

/// Email address: markup and newline noise removed before the
/// structural address check.
pub fn email(name: &str, required: bool) -> FieldSpec {
    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::StripTags)
        .filter(FilterStep::StripNewlines)
        .filter(FilterStep::Trim)
        .filter(FilterStep::ToNull);
    spec.validators = vec![ValidatorStep::email_address()];
    spec
}

/// Card number: reduced to digits, then content/length/prefix/checksum
/// checks.
pub fn credit_card(name: &str, required: bool) -> FieldSpec {
    let mut validators = vec![ValidatorStep::credit_card()];
    push_not_empty(&mut validators, required);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::DigitsOnly)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// Digit string (phone numbers, codes): non-digits stripped.
pub fn digits(name: &str, required: bool, bounds: Option<LengthBounds>) -> FieldSpec {
    let mut validators = Vec::new();
    push_not_empty(&mut validators, required);
    push_string_length(&mut validators, bounds);

    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::DigitsOnly)
        .filter(FilterStep::ToNull);
    spec.validators = validators;
    spec
}

/// Uploaded file: moved into `target_dir` under its original name
/// (always overwriting), extension checked against the allow-list.
pub fn file(name: &str, required: bool, target_dir: PathBuf, extensions: Vec<String>) -> FieldSpec {
    let mut spec = FieldSpec::new(name, required)
        .filter(FilterStep::RenameUpload { target_dir })
        .filter(FilterStep::ToNull);
    spec.validators = vec![ValidatorStep::file_extension(extensions)];
    spec
}

/// Append a callback validator to an existing spec.
pub fn with_callback_validator<F>(mut spec: FieldSpec, callback: F) -> FieldSpec
where
    F: Fn(&intake_core::Value) -> bool + Send + Sync + 'static,
{
    spec.validators.push(ValidatorStep::callback(callback));
    spec
}

/// Append a callback filter to an existing spec.
pub fn with_callback_filter(mut spec: FieldSpec, callback: FilterFn) -> FieldSpec {
    spec.filters.push(FilterStep::Callback(callback));
    spec
}

/// Append a default-value filter that fires only on null — a field
/// that filtered to zero keeps its zero.
pub fn with_integer_default(mut spec: FieldSpec, default: i64) -> FieldSpec {
    spec.filters.push(FilterStep::IntegerDefault { default });
    spec
}

/// Append a regex-pattern validator to an existing spec.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidPattern`] when the pattern
/// does not compile.
pub fn with_regex(mut spec: FieldSpec, pattern: &str) -> Result<FieldSpec, ConfigurationError> {
    spec.validators.push(ValidatorStep::regex(pattern)?);
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{Translator, Value};

    /// Run a spec's whole filter chain over one raw value.
    fn run_filters(spec: &FieldSpec, raw: Value) -> Value {
        spec.filters.iter().fold(raw, |value, step| step.apply(value))
    }

    fn run_validators(spec: &FieldSpec, value: &Value) -> Vec<String> {
        let translator = Translator::identity();
        spec.validators.iter().flat_map(|v| v.run(value, &translator)).collect()
    }

    #[test]
    fn string_filter_order_is_trim_strip_tags_strip_newlines() {
        let spec = string("x", true, None);
        let cleaned = run_filters(&spec, Value::String("  <b>hi</b>\n".into()));
        assert_eq!(cleaned, Value::String("hi".into()));
    }

    #[test]
    fn string_required_flags_and_defaults() {
        let spec = string("x", true, None);
        assert!(spec.required);
        assert!(!spec.allow_empty);
        assert_eq!(spec.validators.len(), 1);

        let optional = string("x", false, None);
        assert!(optional.allow_empty);
        assert!(optional.validators.is_empty());
    }

    #[test]
    fn text_keeps_markup_and_newlines() {
        let spec = text("x", true, None);
        let cleaned = run_filters(&spec, Value::String("  <b>hi</b>\na ".into()));
        assert_eq!(cleaned, Value::String("<b>hi</b>\na".into()));
    }

    #[test]
    fn string_with_nl2br_converts_between_strip_and_trim() {
        let spec = string_with_nl2br("x", true, None);
        let cleaned = run_filters(&spec, Value::String("<i>a</i>\nb".into()));
        assert_eq!(cleaned, Value::String("a<br />\nb".into()));
    }

    #[test]
    fn integer_coerces_and_nulls_empties() {
        let spec = integer("n", true, None);
        assert_eq!(run_filters(&spec, Value::String("42".into())), Value::Int(42));
        assert_eq!(run_filters(&spec, Value::String("".into())), Value::Null);
        assert_eq!(run_filters(&spec, Value::String("abc".into())), Value::Null);
    }

    #[test]
    fn integer_greater_than_is_inclusive() {
        let spec = integer("n", true, Some(5));
        let cleaned = run_filters(&spec, Value::String("5".into()));
        assert_eq!(cleaned, Value::Int(5));
        assert!(run_validators(&spec, &cleaned).is_empty());

        let low = run_filters(&spec, Value::String("4".into()));
        assert_eq!(run_validators(&spec, &low), vec![
            "The input is not greater than or equal to '5'"
        ]);
    }

    #[test]
    fn integer_array_drops_failures_and_dedupes() {
        let spec = integer_array("ids", true);
        let raw = Value::Array(vec![
            Value::String("3".into()),
            Value::String("x".into()),
            Value::Int(3),
            Value::Int(7),
        ]);
        assert_eq!(
            run_filters(&spec, raw),
            Value::Array(vec![Value::Int(3), Value::Int(7)])
        );
        assert_eq!(run_filters(&spec, Value::String("3".into())), Value::Null);
    }

    #[test]
    fn money_always_yields_a_number_or_null() {
        let spec = money("price", false);
        assert_eq!(run_filters(&spec, Value::String("1.234,56 TL".into())), Value::Float(1.234));
        // Zero normalizes to null through the trailing to-null filter.
        assert_eq!(run_filters(&spec, Value::String("".into())), Value::Null);
    }

    #[test]
    fn boolean_variants_diverge_on_unrecognized_input() {
        let casting = boolean("flag", false);
        assert_eq!(run_filters(&casting, Value::String("banana".into())), Value::Bool(true));

        let nullable = boolean_with_null("flag", false);
        assert_eq!(run_filters(&nullable, Value::String("banana".into())), Value::Null);
        assert_eq!(run_filters(&nullable, Value::Bool(false)), Value::Bool(false));
        assert_eq!(run_filters(&nullable, Value::String("1".into())), Value::Bool(true));
    }

    #[test]
    fn date_parses_and_validates_format() {
        let spec = date("d", true, DATE_FORMAT);
        let cleaned = run_filters(&spec, Value::String("2020-05-01".into()));
        assert!(matches!(cleaned, Value::DateTime(_)));
        assert!(run_validators(&spec, &cleaned).is_empty());
    }

    #[test]
    fn datetime_is_date_with_default_format() {
        let a = datetime("d", true);
        let b = date("d", true, DATETIME_FORMAT);
        assert_eq!(a.validators.len(), b.validators.len());
        assert_eq!(a.filters.len(), b.filters.len());
    }

    #[test]
    fn email_spec_shape() {
        let spec = email("mail", true);
        assert_eq!(spec.filters.len(), 4);
        assert_eq!(spec.validators.len(), 1);
        let cleaned = run_filters(&spec, Value::String(" user@example.com \n".into()));
        assert_eq!(cleaned, Value::String("user@example.com".into()));
        assert!(run_validators(&spec, &cleaned).is_empty());
    }

    #[test]
    fn credit_card_digits_then_check() {
        let spec = credit_card("card", true);
        let cleaned = run_filters(&spec, Value::String("4111 1111 1111 1111".into()));
        assert_eq!(cleaned, Value::String("4111111111111111".into()));
        assert!(run_validators(&spec, &cleaned).is_empty());
    }

    #[test]
    fn composition_helpers_append_in_order() {
        let base = integer("n", false, None);
        let filters_before = base.filters.len();
        let validators_before = base.validators.len();

        let spec = with_integer_default(
            with_callback_validator(base, |v| !matches!(v, Value::Int(13))),
            1,
        );
        assert_eq!(spec.filters.len(), filters_before + 1);
        assert_eq!(spec.validators.len(), validators_before + 1);
        // The default lands after to-null, so an absent value becomes 1.
        assert_eq!(run_filters(&spec, Value::Null), Value::Int(1));
    }

    #[test]
    fn with_regex_rejects_bad_patterns_at_build_time() {
        assert!(with_regex(string("x", true, None), "^[a-z]+$").is_ok());
        assert!(with_regex(string("x", true, None), "(broken").is_err());
    }

    #[test]
    fn catalog_functions_are_pure() {
        let a = string("x", true, Some(LengthBounds::between(1, 3)));
        let b = string("x", true, Some(LengthBounds::between(1, 3)));
        assert_eq!(a.name, b.name);
        assert_eq!(a.required, b.required);
        assert_eq!(a.filters.len(), b.filters.len());
        assert_eq!(a.validators.len(), b.validators.len());
    }
}
