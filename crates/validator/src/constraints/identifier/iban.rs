//! International Bank Account Numbers.
//!
//! Structure is checked against the per-country BBAN layout from the SWIFT
//! IBAN registry, written in SWIFT notation: `4!n` is exactly four digits,
//! `3!a` three uppercase letters, `12!c` twelve uppercase alphanumerics.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// BBAN layouts keyed by ISO 3166 country code.
const BBAN_FORMATS: &[(&str, &str)] = &[
    ("AD", "4!n4!n12!c"),
    ("AE", "3!n16!n"),
    ("AL", "8!n16!c"),
    ("AO", "21!n"),
    ("AT", "5!n11!n"),
    ("AX", "3!n11!n"),
    ("AZ", "4!a20!c"),
    ("BA", "3!n3!n8!n2!n"),
    ("BE", "3!n7!n2!n"),
    ("BF", "2!c22!n"),
    ("BG", "4!a4!n2!n8!c"),
    ("BH", "4!a14!c"),
    ("BI", "5!n5!n11!n2!n"),
    ("BJ", "2!c22!n"),
    ("BL", "5!n5!n11!c2!n"),
    ("BR", "8!n5!n10!n1!a1!c"),
    ("BY", "4!c4!n16!c"),
    ("CF", "23!n"),
    ("CG", "23!n"),
    ("CH", "5!n12!c"),
    ("CI", "2!c22!n"),
    ("CM", "23!n"),
    ("CR", "4!n14!n"),
    ("CV", "21!n"),
    ("CY", "3!n5!n16!c"),
    ("CZ", "4!n6!n10!n"),
    ("DE", "8!n10!n"),
    ("DJ", "23!n"),
    ("DK", "4!n9!n1!n"),
    ("DO", "4!c20!n"),
    ("DZ", "22!n"),
    ("EE", "2!n2!n11!n1!n"),
    ("EG", "4!n4!n17!n"),
    ("ES", "4!n4!n1!n1!n10!n"),
    ("FI", "3!n11!n"),
    ("FO", "4!n9!n1!n"),
    ("FR", "5!n5!n11!c2!n"),
    ("GA", "23!n"),
    ("GB", "4!a6!n8!n"),
    ("GE", "2!a16!n"),
    ("GF", "5!n5!n11!c2!n"),
    ("GG", "4!a6!n8!n"),
    ("GI", "4!a15!c"),
    ("GL", "4!n9!n1!n"),
    ("GP", "5!n5!n11!c2!n"),
    ("GQ", "23!n"),
    ("GR", "3!n4!n16!c"),
    ("GT", "4!c20!c"),
    ("GW", "2!c19!n"),
    ("HN", "4!a20!n"),
    ("HR", "7!n10!n"),
    ("HU", "3!n4!n1!n15!n1!n"),
    ("IE", "4!a6!n8!n"),
    ("IL", "3!n3!n13!n"),
    ("IM", "4!a6!n8!n"),
    ("IQ", "4!a3!n12!n"),
    ("IR", "22!n"),
    ("IS", "4!n2!n6!n10!n"),
    ("IT", "1!a5!n5!n12!c"),
    ("JE", "4!a6!n8!n"),
    ("JO", "4!a4!n18!c"),
    ("KM", "23!n"),
    ("KW", "4!a22!c"),
    ("KZ", "3!n13!c"),
    ("LB", "4!n20!c"),
    ("LC", "4!a24!c"),
    ("LI", "5!n12!c"),
    ("LT", "5!n11!n"),
    ("LU", "3!n13!c"),
    ("LV", "4!a13!c"),
    ("LY", "3!n3!n15!n"),
    ("MA", "24!n"),
    ("MC", "5!n5!n11!c2!n"),
    ("MD", "2!c18!c"),
    ("ME", "3!n13!n2!n"),
    ("MF", "5!n5!n11!c2!n"),
    ("MG", "23!n"),
    ("MK", "3!n10!c2!n"),
    ("ML", "2!c22!n"),
    ("MN", "4!n12!n"),
    ("MQ", "5!n5!n11!c2!n"),
    ("MR", "5!n5!n11!n2!n"),
    ("MT", "4!a5!n18!c"),
    ("MU", "4!a2!n2!n12!n3!n3!a"),
    ("MZ", "21!n"),
    ("NC", "5!n5!n11!c2!n"),
    ("NE", "2!a22!n"),
    ("NI", "4!a20!n"),
    ("NL", "4!a10!n"),
    ("NO", "4!n6!n1!n"),
    ("PF", "5!n5!n11!c2!n"),
    ("PK", "4!a16!c"),
    ("PL", "8!n16!n"),
    ("PM", "5!n5!n11!c2!n"),
    ("PS", "4!a21!c"),
    ("PT", "4!n4!n11!n2!n"),
    ("QA", "4!a21!c"),
    ("RE", "5!n5!n11!c2!n"),
    ("RO", "4!a16!c"),
    ("RS", "3!n13!n2!n"),
    ("RU", "9!n5!n15!c"),
    ("SA", "2!n18!c"),
    ("SC", "4!a2!n2!n16!n3!a"),
    ("SD", "2!n12!n"),
    ("SE", "3!n16!n1!n"),
    ("SI", "5!n8!n2!n"),
    ("SK", "4!n6!n10!n"),
    ("SM", "1!a5!n5!n12!c"),
    ("SN", "2!c22!n"),
    ("SO", "4!n3!n12!n"),
    ("ST", "4!n4!n11!n2!n"),
    ("SV", "4!a20!n"),
    ("TD", "23!n"),
    ("TF", "5!n5!n11!c2!n"),
    ("TG", "2!c22!n"),
    ("TL", "3!n14!n2!n"),
    ("TN", "2!n3!n13!n2!n"),
    ("TR", "5!n1!n16!c"),
    ("UA", "6!n19!c"),
    ("VA", "3!n15!n"),
    ("VG", "4!a16!n"),
    ("WF", "5!n5!n11!c2!n"),
    ("XK", "4!n10!n2!n"),
    ("YT", "5!n5!n11!c2!n"),
];

static FORMATS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| BBAN_FORMATS.iter().copied().collect());

/// Matches `text` against a SWIFT notation layout such as `4!a6!n8!n`.
fn matches_layout(layout: &str, text: &str) -> bool {
    let mut chars = text.bytes();
    let mut rest = layout;
    while !rest.is_empty() {
        let Some(bang) = rest.find('!') else {
            return false;
        };
        let Ok(count) = rest[..bang].parse::<usize>() else {
            return false;
        };
        let Some(class) = rest[bang + 1..].bytes().next() else {
            return false;
        };
        rest = &rest[bang + 2..];
        for _ in 0..count {
            let ok = match (class, chars.next()) {
                (b'n', Some(c)) => c.is_ascii_digit(),
                (b'a', Some(c)) => c.is_ascii_uppercase(),
                (b'c', Some(c)) => c.is_ascii_digit() || c.is_ascii_uppercase(),
                _ => false,
            };
            if !ok {
                return false;
            }
        }
    }
    chars.next().is_none()
}

/// ISO 7064 mod 97-10 over the rearranged IBAN, computed digit by digit.
fn mod97(iban: &str) -> u32 {
    let rearranged = iban[4..].bytes().chain(iban[..4].bytes());
    rearranged.fold(0u32, |acc, c| {
        if c.is_ascii_uppercase() {
            let n = u32::from(c - b'A') + 10;
            (acc * 100 + n) % 97
        } else {
            (acc * 10 + u32::from(c - b'0')) % 97
        }
    })
}

/// The value must be a valid IBAN. Spaces are ignored; the country code is
/// case sensitive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Iban {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Iban {
    crate::error_codes! {
        INVALID_COUNTRY_CODE_ERROR = "de78ee2c-bd50-44e2-aec8-3d8228aeadb9";
        INVALID_CHARACTERS_ERROR = "8d3d85e4-784f-4719-a5bc-d9e40d45a3a5";
        CHECKSUM_FAILED_ERROR = "b9401321-f9bf-4dcb-83d1-f31094440795";
        INVALID_FORMAT_ERROR = "c8d318f1-2ecc-41ba-b983-df70d225cf5a";
        NOT_SUPPORTED_COUNTRY_CODE_ERROR = "e2c259f3-4b46-48e6-b72e-891658158ec8";
    }

    const MESSAGE: &'static str = "This is not a valid International Bank Account Number (IBAN).";

    /// Error code for `input`, or `None` when it is a valid IBAN.
    pub fn check(input: &str) -> Option<&'static str> {
        let canonical: String = input.chars().filter(|c| *c != ' ').collect();
        if !canonical.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Some(Self::INVALID_CHARACTERS_ERROR);
        }
        let country = canonical.get(..2).unwrap_or(&canonical);
        if country.len() < 2 || !country.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Some(Self::INVALID_COUNTRY_CODE_ERROR);
        }
        let Some(layout) = FORMATS.get(country) else {
            return Some(Self::NOT_SUPPORTED_COUNTRY_CODE_ERROR);
        };
        let check_digits = canonical.get(2..4).unwrap_or("");
        if check_digits.len() != 2
            || !check_digits.bytes().all(|b| b.is_ascii_digit())
            || !matches_layout(layout, &canonical[4..])
        {
            return Some(Self::INVALID_FORMAT_ERROR);
        }
        if mod97(&canonical) != 1 {
            return Some(Self::CHECKSUM_FAILED_ERROR);
        }
        None
    }
}

impl Validate for Iban {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        if let Some(code) = Self::check(&text) {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, validate};
    use rstest::rstest;

    #[rstest]
    #[case("CH9300762011623852957")]
    #[case("CH93  0076 2011 6238 5295 7")]
    #[case("DE89370400440532013000")]
    #[case("GB82WEST12345698765432")]
    #[case("MK072 5012 0000 0589 84")]
    #[case("BY 13 NBRB 3600 900000002Z00AB00")]
    #[case("NL91ABNA0417164300")]
    #[case("FR1420041010050500013M02606")]
    fn valid_ibans(#[case] iban: &str) {
        assert_no_violation(&Iban::default(), &Value::from(iban));
    }

    #[rstest]
    #[case("BYRO NBRB 3600 900000002Z00AB0", Iban::INVALID_FORMAT_ERROR)]
    #[case("BI432010110674441", Iban::INVALID_FORMAT_ERROR)]
    #[case("CH930076201162385295", Iban::INVALID_FORMAT_ERROR)]
    #[case("DE89 3704 0044 0532 0130 01", Iban::CHECKSUM_FAILED_ERROR)]
    #[case("AG260211000000230064016", Iban::NOT_SUPPORTED_COUNTRY_CODE_ERROR)]
    #[case("ch9300762011623852957", Iban::NOT_SUPPORTED_COUNTRY_CODE_ERROR)]
    #[case("CH930076201162385295]", Iban::INVALID_CHARACTERS_ERROR)]
    #[case("0750447346", Iban::INVALID_COUNTRY_CODE_ERROR)]
    #[case("2X0750447346", Iban::INVALID_COUNTRY_CODE_ERROR)]
    #[case("A20750447346", Iban::INVALID_COUNTRY_CODE_ERROR)]
    fn invalid_ibans(#[case] iban: &str, #[case] code: &str) {
        let violations = validate(&Iban::default(), &Value::from(iban));
        assert_eq!(single_code(&violations), code);
        assert_eq!(
            violations.get(0).unwrap().parameter("{{ value }}"),
            Some(format!("\"{iban}\"").as_str())
        );
    }

    #[test]
    fn layout_matcher() {
        assert!(matches_layout("4!a6!n8!n", "WEST12345698765432"));
        assert!(!matches_layout("4!a6!n8!n", "WEST1234569876543"));
        assert!(!matches_layout("4!a6!n8!n", "west12345698765432"));
        assert!(matches_layout("2!c", "A1"));
    }

    #[test]
    fn layouts_fit_iban_length_limits() {
        for (country, layout) in BBAN_FORMATS {
            let bban_len: usize = layout
                .split(['a', 'c', 'n'])
                .filter_map(|part| part.trim_end_matches('!').parse::<usize>().ok())
                .sum();
            assert!((11..=30).contains(&bban_len), "{country}: {bban_len}");
        }
    }
}
