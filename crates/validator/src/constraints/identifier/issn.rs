//! International Standard Serial Numbers.

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// The value must be an ISSN such as `2434-561X`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Issn {
    /// Reject a lowercase `x` check character.
    pub case_sensitive: bool,
    /// Reject values without the hyphen after the fourth digit.
    pub require_hyphen: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Issn {
    crate::error_codes! {
        TOO_SHORT_ERROR = "6a20dd3d-f463-4460-8e7b-18a1b98abbfb";
        TOO_LONG_ERROR = "37cef893-5871-464e-8b12-7fb79324833c";
        MISSING_HYPHEN_ERROR = "2983286f-8134-4693-957a-1ec4ef887b15";
        INVALID_CHARACTERS_ERROR = "a663d266-37c2-4ece-a914-ae891940c588";
        INVALID_CASE_ERROR = "7b6dd393-7523-4a6c-b84d-72b91bba5e1a";
        CHECKSUM_FAILED_ERROR = "b0f92dbc-667c-48de-b526-ad9586d43e85";
    }

    const MESSAGE: &'static str = "This value is not a valid ISSN.";

    /// Requires the hyphen and an uppercase `X`.
    pub fn strict() -> Self {
        Self {
            case_sensitive: true,
            require_hyphen: true,
            ..Self::default()
        }
    }

    fn check(&self, text: &str) -> Result<(), &'static str> {
        let canonical: Vec<u8> = if text.as_bytes().get(4) == Some(&b'-') {
            text.bytes()
                .enumerate()
                .filter_map(|(i, b)| (i != 4).then_some(b))
                .collect()
        } else if self.require_hyphen {
            return Err(Self::MISSING_HYPHEN_ERROR);
        } else {
            text.bytes().collect()
        };

        match canonical.len() {
            n if n < 8 => return Err(Self::TOO_SHORT_ERROR),
            n if n > 8 => return Err(Self::TOO_LONG_ERROR),
            _ => {}
        }
        if !canonical[..7].iter().all(u8::is_ascii_digit) {
            return Err(Self::INVALID_CHARACTERS_ERROR);
        }
        let check = match canonical[7] {
            c @ b'0'..=b'9' => u32::from(c - b'0'),
            b'x' if self.case_sensitive => return Err(Self::INVALID_CASE_ERROR),
            b'X' | b'x' => 10,
            _ => return Err(Self::INVALID_CHARACTERS_ERROR),
        };

        let weighted: u32 = canonical[..7]
            .iter()
            .zip((2..=8).rev())
            .map(|(digit, weight)| u32::from(digit - b'0') * weight)
            .sum();
        if (weighted + check) % 11 == 0 {
            Ok(())
        } else {
            Err(Self::CHECKSUM_FAILED_ERROR)
        }
    }
}

impl Validate for Issn {
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
