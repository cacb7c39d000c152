//! International Securities Identification Numbers.

use serde::Deserialize;

use super::luhn::luhn_checksum_valid;
use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// The value must be a twelve-character ISIN: two-letter country prefix,
/// nine alphanumerics, one check digit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Isin {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Isin {
    crate::error_codes! {
        INVALID_LENGTH_ERROR = "88738dfc-9ed5-ba1e-aebe-402a2a9bf58e";
        INVALID_PATTERN_ERROR = "3d08ce0-ded9-a93d-9216-17ac21265b65e";
        INVALID_CHECKSUM_ERROR = "32089b-0ee1-93ba-399e-aa232e62f2d29d";
    }

    const MESSAGE: &'static str =
        "This value is not a valid International Securities Identification Number (ISIN).";
}

fn has_isin_shape(isin: &[u8]) -> bool {
    isin[..2].iter().all(u8::is_ascii_uppercase)
        && isin[2..11]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        && isin[11].is_ascii_digit()
}

/// Expands letters to their base-36 value (`A` = 10) and runs Luhn over the
/// resulting digit string.
fn isin_checksum_valid(isin: &str) -> bool {
    let digits: String = isin
        .chars()
        .filter_map(|c| c.to_digit(36))
        .map(|d| d.to_string())
        .collect();
    luhn_checksum_valid(&digits)
}

impl Validate for Isin {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let isin = text.to_uppercase();

        let code = if isin.len() != 12 {
            Self::INVALID_LENGTH_ERROR
        } else if !has_isin_shape(isin.as_bytes()) {
            Self::INVALID_PATTERN_ERROR
        } else if !isin_checksum_valid(&isin) {
            Self::INVALID_CHECKSUM_ERROR
        } else {
            return Ok(());
        };
        report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, validate};
    use rstest::rstest;

    #[rstest]
    #[case("XS2125535901")]
    #[case("DE000HZ8VA77")]
    #[case("CH0528261156")]
    #[case("US0378331005")]
    #[case("AU0000XVGZA3")]
    #[case("GB0002634946")]
    #[case("us0378331005")]
    fn valid_isins(#[case] isin: &str) {
        assert_no_violation(&Isin::default(), &Value::from(isin));
    }

    #[rstest]
    #[case("X", Isin::INVALID_LENGTH_ERROR)]
    #[case("XS21255359012", Isin::INVALID_LENGTH_ERROR)]
    #[case("X12125535901", Isin::INVALID_PATTERN_ERROR)]
    #[case("XS212553590A", Isin::INVALID_PATTERN_ERROR)]
    #[case("XS2125-35901", Isin::INVALID_PATTERN_ERROR)]
    #[case("US0378331006", Isin::INVALID_CHECKSUM_ERROR)]
    #[case("XS2112212144", Isin::INVALID_CHECKSUM_ERROR)]
    fn invalid_isins(#[case] isin: &str, #[case] code: &str) {
        let violations = validate(&Isin::default(), &Value::from(isin));
        assert_eq!(single_code(&violations), code);
        assert_eq!(
            violations.get(0).unwrap().parameter("{{ value }}"),
            Some(format!("\"{isin}\"").as_str())
        );
    }

    #[test]
    fn length_counts_bytes() {
        let violations = validate(&Isin::default(), &Value::from("ÄS2125535901"));
        assert_eq!(single_code(&violations), Isin::INVALID_LENGTH_ERROR);
    }
}
