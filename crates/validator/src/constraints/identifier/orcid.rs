//! ORCID researcher identifiers (ISO 7064 MOD 11-2 check character).

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

const PREFIX: &str = "https://orcid.org/";

/// The value must be an ORCID iD such as `0000-0002-1825-0097`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Orcid {
    /// Accept the `https://orcid.org/` URL form.
    pub allow_prefix: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Default for Orcid {
    fn default() -> Self {
        Self {
            allow_prefix: true,
            message: None,
            groups: Groups::default(),
        }
    }
}

impl Orcid {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "1c168dd9-416f-44e5-a016-0391b9c9b50a";
        CHECKSUM_FAILED_ERROR = "b24245f6-1275-4e17-bd36-2ee3325f4446";
    }

    const MESSAGE: &'static str = "This is not a valid ORCID identifier.";

    /// Only the bare `XXXX-XXXX-XXXX-XXXX` form.
    pub fn bare() -> Self {
        Self {
            allow_prefix: false,
            ..Self::default()
        }
    }
}

/// Collects the sixteen identifier characters, or `None` when the layout
/// is not four hyphen-separated blocks of four.
fn identifier_chars(id: &str) -> Option<Vec<u8>> {
    let blocks: Vec<&[u8]> = id.as_bytes().split(|b| *b == b'-').collect();
    if blocks.len() != 4 || blocks.iter().any(|block| block.len() != 4) {
        return None;
    }
    let chars: Vec<u8> = blocks.concat();
    let (body, check) = chars.split_at(15);
    let well_formed = body.iter().all(u8::is_ascii_digit)
        && (check[0].is_ascii_digit() || check[0] == b'X');
    well_formed.then_some(chars)
}

/// ISO 7064 MOD 11-2 over the first fifteen digits.
fn check_character(body: &[u8]) -> u8 {
    let total = body
        .iter()
        .fold(0u32, |total, digit| (total + u32::from(digit - b'0')) * 2);
    match (12 - total % 11) % 11 {
        10 => b'X',
        r => b'0' + r as u8,
    }
}

impl Validate for Orcid {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let id = match text.strip_prefix(PREFIX) {
            Some(rest) if self.allow_prefix => rest,
            _ => &text,
        };

        let code = match identifier_chars(id) {
            None => Self::INVALID_FORMAT_ERROR,
            Some(chars) if check_character(&chars[..15]) != chars[15] => {
                Self::CHECKSUM_FAILED_ERROR
            }
            Some(_) => return Ok(()),
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
    #[case("0000-0002-1825-0097")]
    #[case("0000-0001-5109-3700")]
    #[case("0000-0002-1694-233X")]
    #[case("https://orcid.org/0000-0002-1825-0097")]
    fn valid_identifiers(#[case] id: &str) {
        assert_no_violation(&Orcid::default(), &Value::from(id));
    }

    #[rstest]
    #[case("0000-0002-1825-0098", Orcid::CHECKSUM_FAILED_ERROR)]
    #[case("0000-0002-1694-2330", Orcid::CHECKSUM_FAILED_ERROR)]
    #[case("0000000218250097", Orcid::INVALID_FORMAT_ERROR)]
    #[case("0000-0002-1825-009", Orcid::INVALID_FORMAT_ERROR)]
    #[case("0000-0002-1825-00X7", Orcid::INVALID_FORMAT_ERROR)]
    #[case("0000-0002-1694-233x", Orcid::INVALID_FORMAT_ERROR)]
    #[case("http://orcid.org/0000-0002-1825-0097", Orcid::INVALID_FORMAT_ERROR)]
    fn invalid_identifiers(#[case] id: &str, #[case] code: &str) {
        let violations = validate(&Orcid::default(), &Value::from(id));
        assert_eq!(single_code(&violations), code);
        assert_eq!(
            violations.get(0).unwrap().message(),
            "This is not a valid ORCID identifier."
        );
    }

    #[test]
    fn prefix_can_be_disallowed() {
        let violations = validate(&Orcid::bare(), &Value::from("https://orcid.org/0000-0002-1825-0097"));
        assert_eq!(single_code(&violations), Orcid::INVALID_FORMAT_ERROR);
        assert_no_violation(&Orcid::bare(), &Value::from("0000-0002-1825-0097"));
    }
}
