//! # Validator Steps
//!
//! Predicates over filtered values. Each step carries a message table
//! keyed by failure subkind; templates support `%param%` interpolation
//! (`%min%`, `%max%`, `%format%`, `%hostname%`, `%localPart%`,
//! `%pattern%`, `%value%`) and run through the engine's injected
//! translator before interpolation.
//!
//! Every validator declared for a field runs, in declared order, even
//! after an earlier one failed. All failure messages for the field are
//! collected; nothing is reordered.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use intake_core::{ConfigurationError, Translator, Value};

use crate::credit_card;
use crate::email;
use crate::filter::parse_date_string;
use crate::spec::LengthBounds;

/// A user-supplied validator callback.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Message keys, one per failure subkind.
pub mod keys {
    pub const IS_EMPTY: &str = "isEmpty";

    pub const STRING_LENGTH_INVALID: &str = "stringLengthInvalid";
    pub const STRING_LENGTH_TOO_SHORT: &str = "stringLengthTooShort";
    pub const STRING_LENGTH_TOO_LONG: &str = "stringLengthTooLong";

    pub const NOT_GREATER: &str = "notGreaterThan";
    pub const NOT_GREATER_INCLUSIVE: &str = "notGreaterThanInclusive";

    pub const DATE_INVALID: &str = "dateInvalid";
    pub const DATE_INVALID_DATE: &str = "dateInvalidDate";
    pub const DATE_FALSE_FORMAT: &str = "dateFalseFormat";

    pub const EMAIL_INVALID: &str = "emailAddressInvalid";
    pub const EMAIL_INVALID_FORMAT: &str = "emailAddressInvalidFormat";
    pub const EMAIL_INVALID_HOSTNAME: &str = "emailAddressInvalidHostname";
    pub const EMAIL_INVALID_MX_RECORD: &str = "emailAddressInvalidMxRecord";
    pub const EMAIL_INVALID_SEGMENT: &str = "emailAddressInvalidSegment";
    pub const EMAIL_DOT_ATOM: &str = "emailAddressDotAtom";
    pub const EMAIL_QUOTED_STRING: &str = "emailAddressQuotedString";
    pub const EMAIL_INVALID_LOCAL_PART: &str = "emailAddressInvalidLocalPart";
    pub const EMAIL_LENGTH_EXCEEDED: &str = "emailAddressLengthExceeded";

    pub const CREDIT_CARD_CHECKSUM: &str = "creditcardChecksum";
    pub const CREDIT_CARD_CONTENT: &str = "creditcardContent";
    pub const CREDIT_CARD_INVALID: &str = "creditcardInvalid";
    pub const CREDIT_CARD_LENGTH: &str = "creditcardLength";
    pub const CREDIT_CARD_PREFIX: &str = "creditcardPrefix";
    pub const CREDIT_CARD_SERVICE: &str = "creditcardService";
    pub const CREDIT_CARD_SERVICE_FAILURE: &str = "creditcardServiceFailure";

    pub const REGEX_NOT_MATCH: &str = "regexNotMatch";
    pub const REGEX_INVALID: &str = "regexInvalid";

    pub const EXTENSION_FALSE: &str = "fileExtensionFalse";

    pub const CALLBACK_VALUE: &str = "callbackValue";
}

/// Default English template for each failure subkind.
pub fn default_template(key: &str) -> &'static str {
    match key {
        keys::IS_EMPTY => "Value is required and can't be empty",

        keys::STRING_LENGTH_INVALID => "Invalid type given. String expected",
        keys::STRING_LENGTH_TOO_SHORT => "The input is less than %min% characters long",
        keys::STRING_LENGTH_TOO_LONG => "The input is more than %max% characters long",

        keys::NOT_GREATER => "The input is not greater than '%min%'",
        keys::NOT_GREATER_INCLUSIVE => "The input is not greater than or equal to '%min%'",

        keys::DATE_INVALID => "Invalid type given. String, integer, array or DateTime expected",
        keys::DATE_INVALID_DATE => "The input does not appear to be a valid date",
        keys::DATE_FALSE_FORMAT => "The input does not fit the date format '%format%'",

        keys::EMAIL_INVALID => "Invalid type given. String expected",
        keys::EMAIL_INVALID_FORMAT => {
            "The input is not a valid email address. Use the basic format local-part@hostname"
        }
        keys::EMAIL_INVALID_HOSTNAME => "'%hostname%' is not a valid hostname for the email address",
        keys::EMAIL_INVALID_MX_RECORD => {
            "'%hostname%' does not appear to have any valid MX or A records for the email address"
        }
        keys::EMAIL_INVALID_SEGMENT => {
            "'%hostname%' is not in a routable network segment. The email address should not be resolved from public network"
        }
        keys::EMAIL_DOT_ATOM => "'%localPart%' can not be matched against dot-atom format",
        keys::EMAIL_QUOTED_STRING => "'%localPart%' can not be matched against quoted-string format",
        keys::EMAIL_INVALID_LOCAL_PART => {
            "'%localPart%' is not a valid local part for the email address"
        }
        keys::EMAIL_LENGTH_EXCEEDED => "The input exceeds the allowed length",

        keys::CREDIT_CARD_CHECKSUM => "The input seems to contain an invalid checksum",
        keys::CREDIT_CARD_CONTENT => "The input must contain only digits",
        keys::CREDIT_CARD_INVALID => "Invalid type given. String expected",
        keys::CREDIT_CARD_LENGTH => "The input contains an invalid amount of digits",
        keys::CREDIT_CARD_PREFIX => "The input is not from an allowed institute",
        keys::CREDIT_CARD_SERVICE => "The input seems to be an invalid credit card number",
        keys::CREDIT_CARD_SERVICE_FAILURE => {
            "An exception has been raised while validating the input"
        }

        keys::REGEX_NOT_MATCH => "The input does not match against pattern '%pattern%'",
        keys::REGEX_INVALID => "Invalid type given. String, integer or float expected",

        keys::EXTENSION_FALSE => "File has an incorrect extension",

        _ => "The input is not valid",
    }
}

/// One failure produced by a validator evaluation: a subkind key plus
/// the parameters its template interpolates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub key: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl Failure {
    pub fn new(key: &'static str) -> Self {
        Self { key, params: Vec::new() }
    }

    pub fn with(key: &'static str, params: Vec<(&'static str, String)>) -> Self {
        Self { key, params }
    }
}

/// The closed set of validator kinds.
#[derive(Clone)]
enum ValidatorKind {
    NotEmpty,
    StringLength(LengthBounds),
    GreaterThan { min: i64, inclusive: bool },
    DateFormat { format: String },
    EmailAddress,
    CreditCard,
    Regex(regex::Regex),
    FileExtension { allowed: Vec<String> },
    Callback(ValidatorFn),
}

/// One predicate in a field's validator chain, with its message table.
#[derive(Clone)]
pub struct ValidatorStep {
    kind: ValidatorKind,
    messages: BTreeMap<String, String>,
}

impl fmt::Debug for ValidatorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match &self.kind {
            ValidatorKind::NotEmpty => "NotEmpty",
            ValidatorKind::StringLength(_) => "StringLength",
            ValidatorKind::GreaterThan { .. } => "GreaterThan",
            ValidatorKind::DateFormat { .. } => "DateFormat",
            ValidatorKind::EmailAddress => "EmailAddress",
            ValidatorKind::CreditCard => "CreditCard",
            ValidatorKind::Regex(_) => "Regex",
            ValidatorKind::FileExtension { .. } => "FileExtension",
            ValidatorKind::Callback(_) => "Callback",
        };
        write!(f, "ValidatorStep({name})")
    }
}

impl ValidatorStep {
    fn of(kind: ValidatorKind) -> Self {
        Self { kind, messages: BTreeMap::new() }
    }

    /// Fail on blank values (null, `""`, `[]`, `false`, `0.0`).
    pub fn not_empty() -> Self {
        Self::of(ValidatorKind::NotEmpty)
    }

    /// Check character count against inclusive bounds.
    pub fn string_length(bounds: LengthBounds) -> Self {
        Self::of(ValidatorKind::StringLength(bounds))
    }

    /// Numeric comparison against `min`, exclusive by default.
    pub fn greater_than(min: i64, inclusive: bool) -> Self {
        Self::of(ValidatorKind::GreaterThan { min, inclusive })
    }

    /// Check conformance to a chrono format string.
    pub fn date_format(format: impl Into<String>) -> Self {
        Self::of(ValidatorKind::DateFormat { format: format.into() })
    }

    /// Structural email address check (no DNS lookups).
    pub fn email_address() -> Self {
        Self::of(ValidatorKind::EmailAddress)
    }

    /// Card number check: content, length, institute prefix, checksum.
    pub fn credit_card() -> Self {
        Self::of(ValidatorKind::CreditCard)
    }

    /// Match against a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] when the pattern
    /// does not compile — a specification bug, caught before any
    /// request runs.
    pub fn regex(pattern: &str) -> Result<Self, ConfigurationError> {
        let compiled = regex::Regex::new(pattern).map_err(|e| {
            ConfigurationError::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() }
        })?;
        Ok(Self::of(ValidatorKind::Regex(compiled)))
    }

    /// Check a file's extension against an allow-list
    /// (case-insensitive).
    pub fn file_extension(allowed: Vec<String>) -> Self {
        Self::of(ValidatorKind::FileExtension { allowed })
    }

    /// Arbitrary predicate; failure reports the callback subkind.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::of(ValidatorKind::Callback(Arc::new(f)))
    }

    /// Override the template for one failure subkind.
    pub fn message(mut self, key: &str, template: impl Into<String>) -> Self {
        self.messages.insert(key.to_string(), template.into());
        self
    }

    /// Run this validator against a filtered value, producing zero or
    /// more translated, interpolated failure messages.
    pub fn run(&self, value: &Value, translator: &Translator) -> Vec<String> {
        self.evaluate(value)
            .into_iter()
            .map(|failure| self.render(&failure, value, translator))
            .collect()
    }

    fn render(&self, failure: &Failure, value: &Value, translator: &Translator) -> String {
        let template = self
            .messages
            .get(failure.key)
            .cloned()
            .unwrap_or_else(|| default_template(failure.key).to_string());
        let mut message = translator.translate(&template);
        for (name, replacement) in &failure.params {
            message = message.replace(&format!("%{name}%"), replacement);
        }
        message.replace("%value%", &value.display_string())
    }

    fn evaluate(&self, value: &Value) -> Vec<Failure> {
        match &self.kind {
            ValidatorKind::NotEmpty => {
                if value.is_blank() {
                    vec![Failure::new(keys::IS_EMPTY)]
                } else {
                    Vec::new()
                }
            }
            ValidatorKind::StringLength(bounds) => evaluate_string_length(value, *bounds),
            ValidatorKind::GreaterThan { min, inclusive } => {
                evaluate_greater_than(value, *min, *inclusive)
            }
            ValidatorKind::DateFormat { format } => evaluate_date_format(value, format),
            ValidatorKind::EmailAddress => match value {
                Value::String(s) => email::validate(s),
                _ => vec![Failure::new(keys::EMAIL_INVALID)],
            },
            ValidatorKind::CreditCard => match value {
                Value::String(s) => credit_card::validate(s),
                _ => vec![Failure::new(keys::CREDIT_CARD_INVALID)],
            },
            ValidatorKind::Regex(pattern) => evaluate_regex(value, pattern),
            ValidatorKind::FileExtension { allowed } => evaluate_extension(value, allowed),
            ValidatorKind::Callback(callback) => {
                if callback(value) {
                    Vec::new()
                } else {
                    vec![Failure::new(keys::CALLBACK_VALUE)]
                }
            }
        }
    }
}

fn evaluate_string_length(value: &Value, bounds: LengthBounds) -> Vec<Failure> {
    let text = match value {
        Value::String(s) => s,
        _ => return vec![Failure::new(keys::STRING_LENGTH_INVALID)],
    };
    let length = text.chars().count();
    let mut failures = Vec::new();
    if let Some(min) = bounds.min {
        if length < min {
            failures.push(Failure::with(
                keys::STRING_LENGTH_TOO_SHORT,
                vec![("min", min.to_string())],
            ));
        }
    }
    if let Some(max) = bounds.max {
        if length > max {
            failures.push(Failure::with(
                keys::STRING_LENGTH_TOO_LONG,
                vec![("max", max.to_string())],
            ));
        }
    }
    failures
}

fn evaluate_greater_than(value: &Value, min: i64, inclusive: bool) -> Vec<Failure> {
    let numeric = match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let passes = match numeric {
        Some(n) if inclusive => n >= min as f64,
        Some(n) => n > min as f64,
        None => false,
    };
    if passes {
        Vec::new()
    } else {
        let key = if inclusive { keys::NOT_GREATER_INCLUSIVE } else { keys::NOT_GREATER };
        vec![Failure::with(key, vec![("min", min.to_string())])]
    }
}

/// Whether a chrono format string carries time-of-day specifiers.
fn format_has_time(format: &str) -> bool {
    ["%H", "%M", "%S", "%T", "%R", "%I", "%P", "%p"].iter().any(|spec| format.contains(spec))
}

fn evaluate_date_format(value: &Value, format: &str) -> Vec<Failure> {
    match value {
        // Already parsed by a date filter, or an epoch timestamp.
        Value::DateTime(_) | Value::Int(_) => Vec::new(),
        Value::String(s) => {
            let strict = if format_has_time(format) {
                NaiveDateTime::parse_from_str(s, format).is_ok()
            } else {
                NaiveDate::parse_from_str(s, format).is_ok()
            };
            if strict {
                Vec::new()
            } else if parse_date_string(s).is_some() {
                // A real date, just not in the declared format.
                vec![Failure::with(keys::DATE_FALSE_FORMAT, vec![("format", format.to_string())])]
            } else {
                vec![Failure::new(keys::DATE_INVALID_DATE)]
            }
        }
        Value::Object(map) => {
            let day = map.get("day").cloned().unwrap_or(Value::Null);
            let month = map.get("month").cloned().unwrap_or(Value::Null);
            let year = map.get("year").cloned().unwrap_or(Value::Null);
            let select = Value::Object(
                [("day".to_string(), day), ("month".to_string(), month), ("year".to_string(), year)]
                    .into_iter()
                    .collect(),
            );
            match crate::filter::FilterStep::ToDateSelect.apply(select) {
                Value::DateTime(_) => Vec::new(),
                _ => vec![Failure::new(keys::DATE_INVALID_DATE)],
            }
        }
        _ => vec![Failure::new(keys::DATE_INVALID)],
    }
}

fn evaluate_regex(value: &Value, pattern: &regex::Regex) -> Vec<Failure> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        _ => return vec![Failure::new(keys::REGEX_INVALID)],
    };
    if pattern.is_match(&text) {
        Vec::new()
    } else {
        vec![Failure::with(keys::REGEX_NOT_MATCH, vec![("pattern", pattern.as_str().to_string())])]
    }
}

fn evaluate_extension(value: &Value, allowed: &[String]) -> Vec<Failure> {
    let name = match value {
        Value::String(path) => path.clone(),
        Value::Object(map) => match map.get("file_name") {
            Some(Value::String(name)) => name.clone(),
            _ => return vec![Failure::new(keys::EXTENSION_FALSE)],
        },
        _ => return vec![Failure::new(keys::EXTENSION_FALSE)],
    };
    let extension = std::path::Path::new(&name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let permitted = match extension {
        Some(ext) => allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)),
        None => false,
    };
    if permitted {
        Vec::new()
    } else {
        vec![Failure::new(keys::EXTENSION_FALSE)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(step: &ValidatorStep, value: Value) -> Vec<String> {
        step.run(&value, &Translator::identity())
    }

    #[test]
    fn not_empty_failure_and_pass() {
        let step = ValidatorStep::not_empty();
        assert_eq!(run(&step, Value::Null), vec!["Value is required and can't be empty"]);
        assert!(run(&step, Value::String("x".into())).is_empty());
        // Integer zero is not blank; it survived the filters as a value.
        assert!(run(&step, Value::Int(0)).is_empty());
    }

    #[test]
    fn string_length_bounds_interpolate() {
        let step = ValidatorStep::string_length(LengthBounds::between(2, 4));
        assert_eq!(run(&step, Value::String("a".into())), vec![
            "The input is less than 2 characters long"
        ]);
        assert_eq!(run(&step, Value::String("abcde".into())), vec![
            "The input is more than 4 characters long"
        ]);
        assert!(run(&step, Value::String("abc".into())).is_empty());
        assert_eq!(run(&step, Value::Int(3)), vec!["Invalid type given. String expected"]);
    }

    #[test]
    fn string_length_counts_characters_not_bytes() {
        let step = ValidatorStep::string_length(LengthBounds::at_most(3));
        assert!(run(&step, Value::String("héllö".into())).len() == 1);
        assert!(run(&step, Value::String("hél".into())).is_empty());
    }

    #[test]
    fn greater_than_exclusive_rejects_the_bound() {
        let step = ValidatorStep::greater_than(5, false);
        assert_eq!(run(&step, Value::Int(5)), vec!["The input is not greater than '5'"]);
        assert!(run(&step, Value::Int(6)).is_empty());
    }

    #[test]
    fn greater_than_inclusive_accepts_the_bound() {
        let step = ValidatorStep::greater_than(5, true);
        assert!(run(&step, Value::Int(5)).is_empty());
        assert_eq!(run(&step, Value::Int(4)), vec![
            "The input is not greater than or equal to '5'"
        ]);
    }

    #[test]
    fn date_format_three_subkinds() {
        let step = ValidatorStep::date_format("%Y-%m-%d");
        assert!(run(&step, Value::String("2020-05-01".into())).is_empty());
        // Real date, wrong format.
        assert_eq!(run(&step, Value::String("01-05-2020".into())), vec![
            "The input does not fit the date format '%Y-%m-%d'"
        ]);
        // Not a date at all.
        assert_eq!(run(&step, Value::String("soon".into())), vec![
            "The input does not appear to be a valid date"
        ]);
        // Wrong type entirely.
        assert_eq!(run(&step, Value::Bool(true)), vec![
            "Invalid type given. String, integer, array or DateTime expected"
        ]);
    }

    #[test]
    fn date_format_accepts_filtered_datetimes() {
        let dt = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let step = ValidatorStep::date_format("%Y-%m-%d");
        assert!(run(&step, Value::DateTime(dt)).is_empty());
    }

    #[test]
    fn regex_matches_and_reports_pattern() {
        let step = ValidatorStep::regex("^[a-z]+$").unwrap();
        assert!(run(&step, Value::String("abc".into())).is_empty());
        assert_eq!(run(&step, Value::String("Abc".into())), vec![
            "The input does not match against pattern '^[a-z]+$'"
        ]);
        assert_eq!(run(&step, Value::Null), vec![
            "Invalid type given. String, integer or float expected"
        ]);
    }

    #[test]
    fn regex_invalid_pattern_is_a_configuration_error() {
        let err = ValidatorStep::regex("(unclosed").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn file_extension_allow_list_is_case_insensitive() {
        let step = ValidatorStep::file_extension(vec!["pdf".into(), "png".into()]);
        assert!(run(&step, Value::String("/tmp/files/report.PDF".into())).is_empty());
        assert_eq!(run(&step, Value::String("script.sh".into())), vec![
            "File has an incorrect extension"
        ]);
        assert_eq!(run(&step, Value::String("no-extension".into())), vec![
            "File has an incorrect extension"
        ]);
    }

    #[test]
    fn callback_reports_single_subkind() {
        let step = ValidatorStep::callback(|v| matches!(v, Value::Int(i) if i % 2 == 0));
        assert!(run(&step, Value::Int(4)).is_empty());
        assert_eq!(run(&step, Value::Int(3)), vec!["The input is not valid"]);
    }

    #[test]
    fn message_override_and_translation_compose() {
        let step = ValidatorStep::not_empty().message(keys::IS_EMPTY, "missing: %value%");
        let translator = Translator::new(|s| s.replace("missing", "MISSING"));
        let messages = step.run(&Value::Null, &translator);
        assert_eq!(messages, vec!["MISSING: null"]);
    }
}
