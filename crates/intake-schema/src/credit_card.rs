//! # Credit Card Validation
//!
//! Card-number checks in order: content (digits only), length against
//! the institute tables, issuer prefix, then Luhn checksum. The first
//! failing check reports and the rest are skipped — a wrong-length
//! number says so, rather than also failing its checksum.
//!
//! The service and service-failure subkinds exist in the message table
//! for deployments that bolt an external card service onto the
//! callback validator; nothing here calls out.

use crate::validator::{keys, Failure};

/// An issuer prefix rule: an exact digit prefix or an inclusive
/// numeric range over the first `digits` characters.
enum Prefix {
    Exact(&'static str),
    Range(u32, u32, usize),
}

/// One card institute: accepted lengths and issuer prefixes.
struct Institute {
    lengths: &'static [usize],
    prefixes: &'static [Prefix],
}

const INSTITUTES: &[Institute] = &[
    // American Express
    Institute { lengths: &[15], prefixes: &[Prefix::Exact("34"), Prefix::Exact("37")] },
    // Diners Club
    Institute { lengths: &[14], prefixes: &[Prefix::Range(300, 305, 3), Prefix::Exact("36")] },
    // Diners Club US
    Institute { lengths: &[16], prefixes: &[Prefix::Exact("54"), Prefix::Exact("55")] },
    // Discover
    Institute {
        lengths: &[16],
        prefixes: &[
            Prefix::Exact("6011"),
            Prefix::Range(622_126, 622_925, 6),
            Prefix::Range(644, 649, 3),
            Prefix::Exact("65"),
        ],
    },
    // JCB
    Institute {
        lengths: &[15, 16],
        prefixes: &[Prefix::Exact("1800"), Prefix::Exact("2131"), Prefix::Range(3528, 3589, 4)],
    },
    // Maestro
    Institute {
        lengths: &[12, 13, 14, 15, 16, 17, 18, 19],
        prefixes: &[
            Prefix::Exact("5018"),
            Prefix::Exact("5020"),
            Prefix::Exact("5038"),
            Prefix::Exact("6304"),
            Prefix::Exact("6759"),
            Prefix::Range(6761, 6766, 4),
        ],
    },
    // Mastercard
    Institute {
        lengths: &[16],
        prefixes: &[Prefix::Range(2221, 2720, 4), Prefix::Range(51, 55, 2)],
    },
    // UnionPay
    Institute { lengths: &[16, 17, 18, 19], prefixes: &[Prefix::Range(622_126, 622_925, 6)] },
    // Visa
    Institute { lengths: &[13, 16], prefixes: &[Prefix::Exact("4")] },
];

fn prefix_matches(number: &str, prefix: &Prefix) -> bool {
    match prefix {
        Prefix::Exact(p) => number.starts_with(p),
        Prefix::Range(start, end, digits) => {
            if number.len() < *digits {
                return false;
            }
            match number[..*digits].parse::<u32>() {
                Ok(head) => head >= *start && head <= *end,
                Err(_) => false,
            }
        }
    }
}

/// Luhn checksum over an all-digit string.
fn luhn_valid(number: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in number.chars().rev().enumerate() {
        let digit = c.to_digit(10).unwrap_or(0);
        sum += if i % 2 == 1 {
            let doubled = digit * 2;
            if doubled > 9 {
                doubled - 9
            } else {
                doubled
            }
        } else {
            digit
        };
    }
    sum % 10 == 0
}

/// Validate a card number, reporting the first failing check.
pub(crate) fn validate(number: &str) -> Vec<Failure> {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return vec![Failure::new(keys::CREDIT_CARD_CONTENT)];
    }
    let length = number.len();
    if !INSTITUTES.iter().any(|i| i.lengths.contains(&length)) {
        return vec![Failure::new(keys::CREDIT_CARD_LENGTH)];
    }
    let prefix_ok = INSTITUTES
        .iter()
        .filter(|i| i.lengths.contains(&length))
        .any(|i| i.prefixes.iter().any(|p| prefix_matches(number, p)));
    if !prefix_ok {
        return vec![Failure::new(keys::CREDIT_CARD_PREFIX)];
    }
    if !luhn_valid(number) {
        return vec![Failure::new(keys::CREDIT_CARD_CHECKSUM)];
    }
    Vec::new()
}
