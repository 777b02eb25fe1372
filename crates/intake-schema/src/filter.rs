//! # Filter Steps
//!
//! Pure transformations applied to a field's raw value before
//! validation. Filters run strictly in declared order; each receives
//! the previous filter's output. A filter never fails — shapes it does
//! not recognize pass through unchanged, so the validators behind it
//! see exactly what arrived.
//!
//! Numeric coercions deliberately reproduce loose-cast semantics:
//! [`FilterStep::ToInt`] takes the longest leading integer prefix of a
//! string, [`FilterStep::FloatNormalize`] strips currency noise and
//! parses the longest leading decimal. `"1.234,56 TL"` normalizes to
//! `1.234` — the comma becomes a second dot and the parse stops there.
//! That truncation is pinned behavior, not an accident.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use intake_core::Value;

/// A user-supplied filter callback.
pub type FilterFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// One transformation in a field's filter chain.
#[derive(Clone)]
pub enum FilterStep {
    /// Trim leading/trailing whitespace from strings.
    Trim,
    /// Remove `<...>` tag runs from strings.
    StripTags,
    /// Remove carriage returns and line feeds from strings.
    StripNewlines,
    /// Insert `<br />` markup before every newline in strings.
    Nl2br,
    /// Keep only decimal digits of a scalar, as a string.
    DigitsOnly,
    /// Loose integer cast of scalars; other shapes pass through.
    ToInt,
    /// Money/float normalization: strip everything but digits, `.` and
    /// `,`; map `,` to `.`; parse the longest leading decimal. Always
    /// yields a float, `0.0` when nothing numeric remains.
    FloatNormalize,
    /// Coerce the recognized boolean shapes (`bool`, `0`/`1`, `"0"`/`"1"`,
    /// `"true"`/`"false"`) to `bool`. With `casting` set, every other
    /// non-null value collapses to `true`; without it, unrecognized
    /// values pass through unchanged.
    ToBoolean {
        /// Cast unrecognized values to `true` instead of passing them.
        casting: bool,
    },
    /// Map empty values (`null`, `false`, `0`, `0.0`, `""`, `"0"`, `[]`)
    /// to null.
    ToNull,
    /// Map every value that is not a real boolean to null; used by the
    /// boolean shape that distinguishes "not supplied" from `false`.
    NonBooleanToNull,
    /// Parse a date/datetime string (or unix timestamp) into a
    /// [`Value::DateTime`]; unparsable input becomes null.
    ToDate,
    /// Build a date from `{day, month, year}` components or one of the
    /// two fixed `YYYY-MM-DD` / `DD-MM-YYYY` string patterns.
    ToDateSelect,
    /// Move an uploaded file (`{tmp_path, file_name}` object) into the
    /// target directory, keeping the original name and extension and
    /// always overwriting. Yields the destination path as a string.
    RenameUpload {
        /// Directory the upload is moved into.
        target_dir: PathBuf,
    },
    /// Substitute a default only when the upstream value is exactly
    /// null.
    IntegerDefault {
        /// Value substituted for null.
        default: i64,
    },
    /// Arbitrary user callback.
    Callback(FilterFn),
}

impl fmt::Debug for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trim => f.write_str("Trim"),
            Self::StripTags => f.write_str("StripTags"),
            Self::StripNewlines => f.write_str("StripNewlines"),
            Self::Nl2br => f.write_str("Nl2br"),
            Self::DigitsOnly => f.write_str("DigitsOnly"),
            Self::ToInt => f.write_str("ToInt"),
            Self::FloatNormalize => f.write_str("FloatNormalize"),
            Self::ToBoolean { casting } => write!(f, "ToBoolean {{ casting: {casting} }}"),
            Self::ToNull => f.write_str("ToNull"),
            Self::NonBooleanToNull => f.write_str("NonBooleanToNull"),
            Self::ToDate => f.write_str("ToDate"),
            Self::ToDateSelect => f.write_str("ToDateSelect"),
            Self::RenameUpload { target_dir } => {
                write!(f, "RenameUpload {{ target_dir: {target_dir:?} }}")
            }
            Self::IntegerDefault { default } => {
                write!(f, "IntegerDefault {{ default: {default} }}")
            }
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl FilterStep {
    /// Apply this step to one value.
    pub fn apply(&self, value: Value) -> Value {
        match self {
            Self::Trim => map_string(value, |s| s.trim().to_string()),
            Self::StripTags => map_string(value, strip_tags),
            Self::StripNewlines => {
                map_string(value, |s| s.chars().filter(|c| *c != '\n' && *c != '\r').collect())
            }
            Self::Nl2br => map_string(value, nl2br),
            Self::DigitsOnly => digits_only(value),
            Self::ToInt => to_int(value),
            Self::FloatNormalize => Value::Float(float_normalize(&value)),
            Self::ToBoolean { casting } => to_boolean(value, *casting),
            Self::ToNull => to_null(value),
            Self::NonBooleanToNull => match value {
                Value::Bool(b) => Value::Bool(b),
                _ => Value::Null,
            },
            Self::ToDate => to_date(value),
            Self::ToDateSelect => to_date_select(value),
            Self::RenameUpload { target_dir } => rename_upload(value, target_dir),
            Self::IntegerDefault { default } => match value {
                Value::Null => Value::Int(*default),
                other => other,
            },
            Self::Callback(callback) => callback(value),
        }
    }
}

/// Apply a string transformation; non-strings pass through.
fn map_string(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

/// Remove `<...>` runs. An unterminated tag swallows the rest of the
/// string.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match (in_tag, c) {
            (false, '<') => in_tag = true,
            (false, _) => out.push(c),
            (true, '>') => in_tag = false,
            (true, _) => {}
        }
    }
    out
}

/// Insert `<br />` before every newline sequence, keeping the newline.
fn nl2br(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                out.push_str("<br />");
                out.push('\r');
                if chars.peek() == Some(&'\n') {
                    out.push('\n');
                    chars.next();
                }
            }
            '\n' => {
                out.push_str("<br />");
                out.push('\n');
            }
            _ => out.push(c),
        }
    }
    out
}

fn digits_only(value: Value) -> Value {
    let text = match &value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        _ => return value,
    };
    Value::String(text.chars().filter(char::is_ascii_digit).collect())
}

fn to_int(value: Value) -> Value {
    match value {
        Value::Int(i) => Value::Int(i),
        Value::Float(f) => Value::Int(f.trunc() as i64),
        Value::Bool(b) => Value::Int(i64::from(b)),
        Value::String(s) => Value::Int(int_prefix(&s)),
        other => other,
    }
}

/// Loose integer cast: optional sign, then the longest run of digits.
/// Anything else yields 0.
fn int_prefix(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let mut digits = String::new();
    let mut chars = trimmed.chars().peekable();
    if matches!(chars.peek(), Some('+') | Some('-')) {
        digits.push(chars.next().unwrap_or('+'));
    }
    for c in chars {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            break;
        }
    }
    digits.parse().unwrap_or(0)
}

/// Longest leading decimal of a digits/dot string: stops at the second
/// dot. `"1.234.56"` parses as `1.234`.
fn float_prefix(input: &str) -> f64 {
    let mut collected = String::new();
    let mut seen_dot = false;
    for c in input.chars() {
        match c {
            '0'..='9' => collected.push(c),
            '.' if !seen_dot => {
                seen_dot = true;
                collected.push(c);
            }
            _ => break,
        }
    }
    collected.parse().unwrap_or(0.0)
}

fn float_normalize(value: &Value) -> f64 {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::DateTime(dt) => Value::DateTime(*dt).display_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    };
    let kept: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',').collect();
    float_prefix(&kept.replace(',', "."))
}

/// Boolean shapes this filter recognizes.
fn recognize_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        Value::String(s) => match s.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ if s.eq_ignore_ascii_case("false") => Some(false),
            _ if s.eq_ignore_ascii_case("true") => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn to_boolean(value: Value, casting: bool) -> Value {
    if let Some(b) = recognize_boolean(&value) {
        return Value::Bool(b);
    }
    // Absent input stays absent; downstream to-null and the engine's
    // allow-empty rule depend on it.
    if matches!(value, Value::Null) {
        return Value::Null;
    }
    if casting {
        Value::Bool(true)
    } else {
        value
    }
}

fn to_null(value: Value) -> Value {
    let empty = match &value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        Value::Float(f) => *f == 0.0,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::DateTime(_) | Value::Object(_) => false,
    };
    if empty {
        Value::Null
    } else {
        value
    }
}

/// Formats accepted by the loose date parse, tried in order.
const DATETIME_PARSE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_PARSE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"];

/// Parse a date-ish string with the fallback format list.
pub(crate) fn parse_date_string(input: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_PARSE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    for format in DATE_PARSE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn to_date(value: Value) -> Value {
    match value {
        Value::DateTime(dt) => Value::DateTime(dt),
        Value::Int(ts) => chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| Value::DateTime(dt.naive_utc()))
            .unwrap_or(Value::Null),
        Value::String(s) if !s.is_empty() => {
            parse_date_string(&s).map(Value::DateTime).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// Read a day/month/year component that may arrive as an integer or a
/// numeric string.
fn component(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Int(i) if *i >= 0 => u32::try_from(*i).ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_date_select(value: Value) -> Value {
    match &value {
        Value::Object(map) => {
            let (day, month, year) =
                (component(map.get("day")), component(map.get("month")), component(map.get("year")));
            match (day, month, year) {
                (Some(d), Some(m), Some(y)) => NaiveDate::from_ymd_opt(y as i32, m, d)
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(Value::DateTime)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }
        }
        Value::String(s) => {
            // JSON-escaped slashes arrive as `\/`; normalize to dashes
            // before matching the two fixed patterns.
            let normalized = s.replace("\\/", "-");
            if normalized.len() != 10 {
                return Value::Null;
            }
            for format in ["%Y-%m-%d", "%d-%m-%Y"] {
                if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
                    return date.and_hms_opt(0, 0, 0).map(Value::DateTime).unwrap_or(Value::Null);
                }
            }
            Value::Null
        }
        _ => Value::Null,
    }
}

fn rename_upload(value: Value, target_dir: &std::path::Path) -> Value {
    let upload = match (value.get("tmp_path"), value.get("file_name")) {
        (Some(Value::String(tmp)), Some(Value::String(name))) => Some((tmp.clone(), name.clone())),
        _ => None,
    };
    let (tmp_path, file_name) = match upload {
        Some(pair) => pair,
        None => return value,
    };
    // The client-supplied name is reduced to its final component.
    let base_name = match std::path::Path::new(&file_name).file_name() {
        Some(name) => name.to_owned(),
        None => return value,
    };
    let destination = target_dir.join(base_name);

    let moved = std::fs::rename(&tmp_path, &destination).or_else(|_| {
        std::fs::copy(&tmp_path, &destination)
            .and_then(|_| std::fs::remove_file(&tmp_path))
            .map(|_| ())
    });
    match moved {
        Ok(()) => Value::String(destination.display().to_string()),
        Err(err) => {
            tracing::warn!(error = %err, %tmp_path, "upload move failed; value left unfiltered");
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn s(input: &str) -> Value {
        Value::String(input.to_string())
    }

    #[test]
    fn trim_only_touches_strings() {
        assert_eq!(FilterStep::Trim.apply(s("  hi \n")), s("hi"));
        assert_eq!(FilterStep::Trim.apply(Value::Int(3)), Value::Int(3));
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(FilterStep::StripTags.apply(s("<b>hi</b> there")), s("hi there"));
        assert_eq!(FilterStep::StripTags.apply(s("a <unclosed")), s("a "));
    }

    #[test]
    fn strip_newlines_removes_cr_and_lf() {
        assert_eq!(FilterStep::StripNewlines.apply(s("a\r\nb\nc")), s("abc"));
    }

    #[test]
    fn nl2br_inserts_markup_and_keeps_newlines() {
        assert_eq!(FilterStep::Nl2br.apply(s("a\nb")), s("a<br />\nb"));
        assert_eq!(FilterStep::Nl2br.apply(s("a\r\nb")), s("a<br />\r\nb"));
    }

    #[test]
    fn digits_only_strips_non_digits() {
        assert_eq!(FilterStep::DigitsOnly.apply(s("4111-1111 2222")), s("411111112222"));
        assert_eq!(FilterStep::DigitsOnly.apply(Value::Int(-42)), s("42"));
        assert_eq!(FilterStep::DigitsOnly.apply(Value::Null), Value::Null);
    }

    #[test]
    fn to_int_takes_longest_integer_prefix() {
        assert_eq!(FilterStep::ToInt.apply(s("12abc")), Value::Int(12));
        assert_eq!(FilterStep::ToInt.apply(s("-5x")), Value::Int(-5));
        assert_eq!(FilterStep::ToInt.apply(s("abc")), Value::Int(0));
        assert_eq!(FilterStep::ToInt.apply(s("3.9")), Value::Int(3));
        assert_eq!(FilterStep::ToInt.apply(Value::Float(3.9)), Value::Int(3));
        assert_eq!(FilterStep::ToInt.apply(Value::Bool(true)), Value::Int(1));
        assert_eq!(FilterStep::ToInt.apply(Value::Null), Value::Null);
    }

    #[test]
    fn float_normalize_money_literal() {
        // Pinned behavior: the comma becomes a second dot and the
        // parse stops there.
        assert_eq!(FilterStep::FloatNormalize.apply(s("1.234,56 TL")), Value::Float(1.234));
    }

    #[test]
    fn float_normalize_plain_amounts() {
        assert_eq!(FilterStep::FloatNormalize.apply(s("19,90")), Value::Float(19.9));
        assert_eq!(FilterStep::FloatNormalize.apply(s("$ 42")), Value::Float(42.0));
        assert_eq!(FilterStep::FloatNormalize.apply(s("")), Value::Float(0.0));
        assert_eq!(FilterStep::FloatNormalize.apply(Value::Null), Value::Float(0.0));
        assert_eq!(FilterStep::FloatNormalize.apply(Value::Int(7)), Value::Float(7.0));
    }

    #[test]
    fn to_boolean_casting_recognizes_and_collapses() {
        let f = FilterStep::ToBoolean { casting: true };
        assert_eq!(f.apply(Value::Bool(false)), Value::Bool(false));
        assert_eq!(f.apply(Value::Int(0)), Value::Bool(false));
        assert_eq!(f.apply(s("0")), Value::Bool(false));
        assert_eq!(f.apply(s("false")), Value::Bool(false));
        assert_eq!(f.apply(s("TRUE")), Value::Bool(true));
        // Unrecognized non-null values collapse to true.
        assert_eq!(f.apply(s("banana")), Value::Bool(true));
        assert_eq!(f.apply(Value::Int(7)), Value::Bool(true));
        // Absent input stays absent.
        assert_eq!(f.apply(Value::Null), Value::Null);
    }

    #[test]
    fn to_boolean_without_casting_passes_unrecognized() {
        let f = FilterStep::ToBoolean { casting: false };
        assert_eq!(f.apply(s("1")), Value::Bool(true));
        assert_eq!(f.apply(s("banana")), s("banana"));
        assert_eq!(f.apply(Value::Int(7)), Value::Int(7));
    }

    #[test]
    fn to_null_maps_empty_shapes() {
        let f = FilterStep::ToNull;
        assert_eq!(f.apply(s("")), Value::Null);
        assert_eq!(f.apply(s("0")), Value::Null);
        assert_eq!(f.apply(Value::Int(0)), Value::Null);
        assert_eq!(f.apply(Value::Float(0.0)), Value::Null);
        assert_eq!(f.apply(Value::Bool(false)), Value::Null);
        assert_eq!(f.apply(Value::Array(vec![])), Value::Null);
        assert_eq!(f.apply(s("x")), s("x"));
        assert_eq!(f.apply(Value::Int(5)), Value::Int(5));
    }

    #[test]
    fn non_boolean_to_null_keeps_only_booleans() {
        let f = FilterStep::NonBooleanToNull;
        assert_eq!(f.apply(Value::Bool(false)), Value::Bool(false));
        assert_eq!(f.apply(Value::Bool(true)), Value::Bool(true));
        assert_eq!(f.apply(s("banana")), Value::Null);
        assert_eq!(f.apply(Value::Int(7)), Value::Null);
        assert_eq!(f.apply(Value::Null), Value::Null);
    }

    #[test]
    fn to_date_parses_fallback_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(FilterStep::ToDate.apply(s("2020-05-01 09:30:00")), Value::DateTime(expected));
        assert_eq!(FilterStep::ToDate.apply(s("2020-05-01T09:30:00")), Value::DateTime(expected));

        let midnight = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(FilterStep::ToDate.apply(s("01/05/2020")), Value::DateTime(midnight));
        assert_eq!(FilterStep::ToDate.apply(s("not a date")), Value::Null);
        assert_eq!(FilterStep::ToDate.apply(s("")), Value::Null);
    }

    #[test]
    fn to_date_accepts_unix_timestamp() {
        let dt = chrono::DateTime::from_timestamp(1_588_325_400, 0).unwrap().naive_utc();
        assert_eq!(FilterStep::ToDate.apply(Value::Int(1_588_325_400)), Value::DateTime(dt));
    }

    #[test]
    fn to_date_select_builds_from_components() {
        let mut map = BTreeMap::new();
        map.insert("day".to_string(), s("01"));
        map.insert("month".to_string(), Value::Int(5));
        map.insert("year".to_string(), s("2020"));
        let midnight = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(FilterStep::ToDateSelect.apply(Value::Object(map)), Value::DateTime(midnight));
    }

    #[test]
    fn to_date_select_rejects_impossible_dates() {
        let mut map = BTreeMap::new();
        map.insert("day".to_string(), Value::Int(31));
        map.insert("month".to_string(), Value::Int(2));
        map.insert("year".to_string(), Value::Int(2020));
        assert_eq!(FilterStep::ToDateSelect.apply(Value::Object(map)), Value::Null);
    }

    #[test]
    fn to_date_select_matches_the_two_string_patterns() {
        let midnight = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(FilterStep::ToDateSelect.apply(s("2020-05-01")), Value::DateTime(midnight));
        assert_eq!(FilterStep::ToDateSelect.apply(s("01-05-2020")), Value::DateTime(midnight));
        assert_eq!(FilterStep::ToDateSelect.apply(s("2020\\/05\\/01")), Value::DateTime(midnight));
        assert_eq!(FilterStep::ToDateSelect.apply(s("05/01/2020")), Value::Null);
    }

    #[test]
    fn integer_default_substitutes_only_for_null() {
        let f = FilterStep::IntegerDefault { default: 10 };
        assert_eq!(f.apply(Value::Null), Value::Int(10));
        assert_eq!(f.apply(Value::Int(0)), Value::Int(0));
        assert_eq!(f.apply(s("x")), s("x"));
    }

    #[test]
    fn callback_applies_closure() {
        let f = FilterStep::Callback(Arc::new(|v| match v {
            Value::Int(i) => Value::Int(i * 2),
            other => other,
        }));
        assert_eq!(f.apply(Value::Int(21)), Value::Int(42));
    }

    #[test]
    fn rename_upload_moves_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("upload-1.tmp");
        std::fs::write(&tmp, b"first").unwrap();
        let target = dir.path().join("files");
        std::fs::create_dir(&target).unwrap();

        let mut upload = BTreeMap::new();
        upload.insert("tmp_path".to_string(), s(&tmp.display().to_string()));
        upload.insert("file_name".to_string(), s("report.pdf"));
        let step = FilterStep::RenameUpload { target_dir: target.clone() };

        let moved = step.apply(Value::Object(upload.clone()));
        let dest = target.join("report.pdf");
        assert_eq!(moved, s(&dest.display().to_string()));
        assert_eq!(std::fs::read(&dest).unwrap(), b"first");
        assert!(!tmp.exists());

        // Second upload with the same client name overwrites.
        std::fs::write(&tmp, b"second").unwrap();
        step.apply(Value::Object(upload));
        assert_eq!(std::fs::read(&dest).unwrap(), b"second");
    }

    #[test]
    fn rename_upload_passes_through_non_uploads() {
        let step = FilterStep::RenameUpload { target_dir: PathBuf::from("/nowhere") };
        assert_eq!(step.apply(s("plain")), s("plain"));
        assert_eq!(step.apply(Value::Null), Value::Null);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // The money filter is total: any string input yields a
            // number without panicking.
            #[test]
            fn float_normalize_is_total(input in ".*") {
                let out = FilterStep::FloatNormalize.apply(s(&input));
                match out {
                    Value::Float(f) => prop_assert!(!f.is_nan()),
                    other => prop_assert!(false, "expected float, got {other:?}"),
                }
            }

            #[test]
            fn int_prefix_never_panics(input in ".*") {
                let _ = FilterStep::ToInt.apply(s(&input));
            }
        }
    }
}
