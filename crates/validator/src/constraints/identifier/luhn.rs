//! Luhn mod-10 check digits (credit card numbers, IMEIs).

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// Returns `true` when `digits` is non-empty, all ASCII digits, and passes
/// the Luhn check. An all-zero checksum is rejected.
///
/// ```
/// use rampart_validator::constraints::luhn_checksum_valid;
///
/// assert!(luhn_checksum_valid("79927398713"));
/// assert!(!luhn_checksum_valid("79927398710"));
/// assert!(!luhn_checksum_valid("0000"));
/// ```
pub fn luhn_checksum_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                let doubled = digit * 2;
                doubled / 10 + doubled % 10
            }
        })
        .sum();
    sum != 0 && sum % 10 == 0
}

/// The value must be a digit string passing the Luhn check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Luhn {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Luhn {
    crate::error_codes! {
        INVALID_CHARACTERS_ERROR = "dfad6d23-1b74-4374-929b-5cbb56fc0d9e";
        CHECKSUM_FAILED_ERROR = "4d760774-3f50-4cd5-a6d5-b10a3299d8d3";
    }

    const MESSAGE: &'static str = "Invalid card number.";
}

impl Validate for Luhn {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let code = if !text.bytes().all(|b| b.is_ascii_digit()) {
            Self::INVALID_CHARACTERS_ERROR
        } else if !luhn_checksum_valid(&text) {
            Self::CHECKSUM_FAILED_ERROR
        } else {
            return Ok(());
        };
        report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
        Ok(())
    }
}
