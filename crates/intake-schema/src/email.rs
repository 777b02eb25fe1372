//! # Email Address Validation
//!
//! Structural validation of `local-part@hostname` addresses. The local
//! part is checked against the dot-atom form first, then the
//! quoted-string form; the hostname against DNS label rules or an IP
//! literal. No network lookups happen here — the MX-record and
//! network-segment subkinds exist in the message table for callers
//! that override them, but this validator never emits them.

use crate::validator::{keys, Failure};

/// Maximum length of the local part, per RFC 5321.
const MAX_LOCAL_PART: usize = 64;
/// Maximum length of the domain, per RFC 5321.
const MAX_HOSTNAME: usize = 255;

/// Validate one address, returning every failure detected.
pub(crate) fn validate(input: &str) -> Vec<Failure> {
    // Split on the *last* `@`: quoted local parts may contain one.
    let Some(at) = input.rfind('@') else {
        return vec![Failure::new(keys::EMAIL_INVALID_FORMAT)];
    };
    let (local, hostname) = (&input[..at], &input[at + 1..]);
    if local.is_empty() || hostname.is_empty() {
        return vec![Failure::new(keys::EMAIL_INVALID_FORMAT)];
    }

    let mut failures = Vec::new();

    if local.chars().count() > MAX_LOCAL_PART || hostname.chars().count() > MAX_HOSTNAME {
        failures.push(Failure::new(keys::EMAIL_LENGTH_EXCEEDED));
    }

    if !valid_hostname(hostname) {
        failures.push(Failure::with(
            keys::EMAIL_INVALID_HOSTNAME,
            vec![("hostname", hostname.to_string())],
        ));
    }

    if !valid_dot_atom(local) {
        let local_param = vec![("localPart", local.to_string())];
        if local.starts_with('"') {
            if !valid_quoted_string(local) {
                failures.push(Failure::with(keys::EMAIL_QUOTED_STRING, local_param.clone()));
                failures.push(Failure::with(keys::EMAIL_INVALID_LOCAL_PART, local_param));
            }
        } else {
            failures.push(Failure::with(keys::EMAIL_DOT_ATOM, local_param.clone()));
            failures.push(Failure::with(keys::EMAIL_INVALID_LOCAL_PART, local_param));
        }
    }

    failures
}

/// RFC 5322 atext: the characters permitted in a dot-atom segment.
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

/// Dot-atom form: atext runs separated by single dots, no leading,
/// trailing or doubled dot.
fn valid_dot_atom(local: &str) -> bool {
    !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local.split('.').all(|segment| !segment.is_empty() && segment.chars().all(is_atext))
}

/// Quoted-string form: printable ASCII between double quotes, with
/// backslash escapes.
fn valid_quoted_string(local: &str) -> bool {
    let Some(inner) = local.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return false;
    };
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return false,
            c if !(' '..='~').contains(&c) => return false,
            _ => {}
        }
    }
    !escaped
}

/// Hostname rules: dot-separated labels of alphanumerics and interior
/// hyphens, each at most 63 octets, or a bracketed IPv4 literal.
fn valid_hostname(hostname: &str) -> bool {
    if let Some(literal) = hostname.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return literal.parse::<std::net::IpAddr>().is_ok();
    }
    !hostname.ends_with('.')
        && hostname.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
