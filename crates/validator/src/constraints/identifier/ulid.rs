//! Universally Unique Lexicographically Sortable Identifiers.

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

const BASE32_CHARSET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZabcdefghjkmnpqrstvwxyz";
const BASE58_CHARSET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const RFC4122_CHARSET: &str = "0123456789ABCDEFabcdef-";

/// Textual encodings a ULID may be written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UlidFormat {
    /// 26 Crockford base32 characters.
    #[default]
    Base32,
    /// 22 base58 characters.
    Base58,
    /// UUID layout, 36 characters.
    Rfc4122,
}

impl UlidFormat {
    fn charset(self) -> &'static str {
        match self {
            Self::Base32 => BASE32_CHARSET,
            Self::Base58 => BASE58_CHARSET,
            Self::Rfc4122 => RFC4122_CHARSET,
        }
    }

    fn length(self) -> usize {
        match self {
            Self::Base32 => 26,
            Self::Base58 => 22,
            Self::Rfc4122 => 36,
        }
    }
}

/// The value must be a ULID in the configured encoding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ulid {
    /// Expected encoding.
    pub format: UlidFormat,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Ulid {
    crate::error_codes! {
        TOO_SHORT_ERROR = "7b44804e-37d5-4df4-9bdd-b738d4a45bb4";
        TOO_LONG_ERROR = "9608249f-6da1-4d53-889e-9864b58c4d37";
        INVALID_CHARACTERS_ERROR = "e4155739-5135-4258-9c81-ae7b44b5311e";
        TOO_LARGE_ERROR = "df8cfb9a-ce6d-4a69-ae5a-eea7ab6f278b";
        INVALID_FORMAT_ERROR = "b35b6213-76d1-4ded-9548-4d2c0f0aa0dc";
    }

    const MESSAGE: &'static str = "This is not a valid ULID.";

    /// Expects the given encoding.
    pub fn new(format: UlidFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    fn check(&self, ulid: &str) -> Result<(), &'static str> {
        let expected = self.format.length();
        if ulid.len() < expected {
            return Err(Self::TOO_SHORT_ERROR);
        }
        if ulid.len() > expected {
            return Err(Self::TOO_LONG_ERROR);
        }
        let charset = self.format.charset();
        if !ulid.chars().all(|c| charset.contains(c)) {
            return Err(Self::INVALID_CHARACTERS_ERROR);
        }
        match self.format {
            // Largest representable value is 7ZZZZZZZZZZZZZZZZZZZZZZZZZ.
            UlidFormat::Base32 if ulid.as_bytes()[0] > b'7' => Err(Self::TOO_LARGE_ERROR),
            UlidFormat::Rfc4122 if !has_uuid_layout(ulid) => Err(Self::INVALID_FORMAT_ERROR),
            _ => Ok(()),
        }
    }
}

fn has_uuid_layout(text: &str) -> bool {
    let groups: Vec<usize> = text.split('-').map(str::len).collect();
    groups == [8, 4, 4, 4, 12]
}

impl Validate for Ulid {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        if let Err(code) = self.check(&text) {
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
    #[case(UlidFormat::Base32, "01ARZ3NDEKTSV4RRFFQ69G5FAV")]
    #[case(UlidFormat::Base32, "01arz3ndektsv4rrffq69g5fav")]
    #[case(UlidFormat::Base32, "7ZZZZZZZZZZZZZZZZZZZZZZZZZ")]
    #[case(UlidFormat::Base58, "1BKocMc5BnrVcuq2ti4Eqm")]
    #[case(UlidFormat::Rfc4122, "0179ba16-a8a5-6c7c-1a3a-f33a4a9d1a3b")]
    fn valid_ulids(#[case] format: UlidFormat, #[case] ulid: &str) {
        assert_no_violation(&Ulid::new(format), &Value::from(ulid));
    }

    #[rstest]
    #[case(UlidFormat::Base32, "01ARZ3NDEKTSV4RRFFQ69G5FA", Ulid::TOO_SHORT_ERROR)]
    #[case(UlidFormat::Base32, "01ARZ3NDEKTSV4RRFFQ69G5FAVA", Ulid::TOO_LONG_ERROR)]
    #[case(UlidFormat::Base32, "01ARZ3NDEKTSV4RRFFQ69G5FAO", Ulid::INVALID_CHARACTERS_ERROR)]
    #[case(UlidFormat::Base32, "Z1ARZ3NDEKTSV4RRFFQ69G5FAV", Ulid::TOO_LARGE_ERROR)]
    #[case(UlidFormat::Base32, "81ARZ3NDEKTSV4RRFFQ69G5FAV", Ulid::TOO_LARGE_ERROR)]
    #[case(UlidFormat::Base58, "1BKocMc5BnrVcuq2ti4Eq0", Ulid::INVALID_CHARACTERS_ERROR)]
    #[case(UlidFormat::Rfc4122, "0179ba16a8a5-6c7c-1a3a-f33a4a9d1a3b-", Ulid::INVALID_FORMAT_ERROR)]
    #[case(UlidFormat::Rfc4122, "0179ba16-a8a5-6c7c-1a3a-f33a4a9d1a3g", Ulid::INVALID_CHARACTERS_ERROR)]
    fn invalid_ulids(#[case] format: UlidFormat, #[case] ulid: &str, #[case] code: &str) {
        let violations = validate(&Ulid::new(format), &Value::from(ulid));
        assert_eq!(single_code(&violations), code);
        assert_eq!(violations.get(0).unwrap().message(), "This is not a valid ULID.");
    }
}
