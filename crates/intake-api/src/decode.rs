//! # Request Body Decoding
//!
//! Maps the negotiated content type to a parsing strategy and
//! normalizes the raw body into the pipeline's value model, once per
//! request, before dispatch.
//!
//! | Media type                          | Strategy                     |
//! |-------------------------------------|------------------------------|
//! | `application/json` (and no header)  | JSON parse; empty body → null|
//! | `application/x-www-form-urlencoded` | Form parse into a value map  |
//! | `multipart/form-data`               | Raw passthrough              |
//! | anything else (incl. `text/plain`)  | Raw passthrough              |
//!
//! Media types compare case-insensitively: only the first `;`/`,`
//! delimited token of the header counts, lowercased. Malformed JSON is
//! a [`DecodeError`], surfaced as a 400 problem — never as a field
//! error.

use intake_core::Value;
use thiserror::Error;

/// A decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Parsed into the value model by the JSON or form strategy.
    Parsed(Value),
    /// Passed through untouched; parsing is the transport's business.
    Raw(Vec<u8>),
}

impl Decoded {
    /// Collapse into a value: passthrough bodies surface as the raw
    /// text (or null when empty), so downstream handlers still see
    /// what arrived.
    pub fn into_value(self) -> Value {
        match self {
            Decoded::Parsed(value) => value,
            Decoded::Raw(bytes) if bytes.is_empty() => Value::Null,
            Decoded::Raw(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

/// A body that could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The JSON strategy failed to parse the body.
    #[error("Data Parsing Error.")]
    MalformedJson(#[source] serde_json::Error),
}

/// Extract the bare media type: first `;`/`,` delimited token,
/// trimmed and lowercased. An absent or empty header defaults to JSON.
fn media_type(content_type: Option<&str>) -> String {
    let header = content_type.unwrap_or("").trim();
    if header.is_empty() {
        return "application/json".to_string();
    }
    header
        .split([';', ','])
        .next()
        .unwrap_or(header)
        .trim()
        .to_ascii_lowercase()
}

/// Decode a raw request body according to its content type.
pub fn decode(raw: &[u8], content_type: Option<&str>) -> Result<Decoded, DecodeError> {
    match media_type(content_type).as_str() {
        "application/json" => {
            if raw.iter().all(u8::is_ascii_whitespace) {
                return Ok(Decoded::Parsed(Value::Null));
            }
            let json: serde_json::Value = serde_json::from_slice(raw).map_err(|err| {
                tracing::debug!(error = %err, "request body is not valid JSON");
                DecodeError::MalformedJson(err)
            })?;
            Ok(Decoded::Parsed(Value::from_json(json)))
        }
        "application/x-www-form-urlencoded" => Ok(Decoded::Parsed(parse_form(raw))),
        // Multipart parsing belongs to the transport; hand it back.
        "multipart/form-data" => Ok(Decoded::Raw(raw.to_vec())),
        _ => Ok(Decoded::Raw(raw.to_vec())),
    }
}

/// Parse form/query encoding into a value map.
///
/// `key[]` accumulates into an array; a repeated plain key keeps its
/// last value.
pub fn parse_form(raw: &[u8]) -> Value {
    let mut map = std::collections::BTreeMap::new();
    for (key, value) in form_urlencoded::parse(raw) {
        let key = key.into_owned();
        let value = Value::String(value.into_owned());
        if let Some(base) = key.strip_suffix("[]") {
            match map.get_mut(base) {
                Some(Value::Array(items)) => items.push(value),
                _ => {
                    map.insert(base.to_string(), Value::Array(vec![value]));
                }
            }
        } else {
            map.insert(key, value);
        }
    }
    Value::Object(map)
}
