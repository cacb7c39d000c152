//! ISBN-10 and ISBN-13.

use serde::Deserialize;

use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// Which ISBN flavours are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsbnType {
    /// Ten characters, mod 11.
    Isbn10,
    /// Thirteen digits, mod 10.
    Isbn13,
    /// Either one.
    #[default]
    Both,
}

/// The value must be an ISBN; hyphens are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Isbn {
    /// Accepted flavour.
    pub kind: IsbnType,
    /// Overrides every message below.
    pub message: Option<String>,
    /// Message when only ISBN-10 is accepted.
    pub isbn10_message: Option<String>,
    /// Message when only ISBN-13 is accepted.
    pub isbn13_message: Option<String>,
    /// Message when either is accepted.
    pub both_isbn_message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Isbn {
    crate::error_codes! {
        TOO_SHORT_ERROR = "949acbb0-8ef5-43ed-a0e9-032dfd08ae45";
        TOO_LONG_ERROR = "3171387d-f80a-47b3-bd6e-60598545316a";
        INVALID_CHARACTERS_ERROR = "23d21cea-da99-453d-98b1-a7d916fbb339";
        CHECKSUM_FAILED_ERROR = "2881c032-660f-46b6-8153-d352d9706640";
        TYPE_NOT_RECOGNIZED_ERROR = "fa54a457-f042-441f-89c4-066ee5bdfa43";
    }

    /// Only ISBN-10.
    pub fn isbn10() -> Self {
        Self {
            kind: IsbnType::Isbn10,
            ..Self::default()
        }
    }

    /// Only ISBN-13.
    pub fn isbn13() -> Self {
        Self {
            kind: IsbnType::Isbn13,
            ..Self::default()
        }
    }

    fn message(&self) -> &str {
        if let Some(message) = &self.message {
            return message;
        }
        match self.kind {
            IsbnType::Isbn10 => self
                .isbn10_message
                .as_deref()
                .unwrap_or("This value is not a valid ISBN-10."),
            IsbnType::Isbn13 => self
                .isbn13_message
                .as_deref()
                .unwrap_or("This value is not a valid ISBN-13."),
            IsbnType::Both => self
                .both_isbn_message
                .as_deref()
                .unwrap_or("This value is neither a valid ISBN-10 nor a valid ISBN-13."),
        }
    }
}

/// Checks an ISBN-10 without hyphens. Invalid characters are reported
/// before a wrong length; `X` counts as 10 in the check position only.
fn check_isbn10(isbn: &[u8]) -> Result<(), &'static str> {
    let mut sum = 0u32;
    for i in 0..10 {
        let Some(&c) = isbn.get(i) else {
            return Err(Isbn::TOO_SHORT_ERROR);
        };
        let digit = match c {
            b'0'..=b'9' => u32::from(c - b'0'),
            b'X' if i == 9 => 10,
            _ => return Err(Isbn::INVALID_CHARACTERS_ERROR),
        };
        sum += digit * (10 - i as u32);
    }
    if isbn.len() > 10 {
        return Err(Isbn::TOO_LONG_ERROR);
    }
    if sum % 11 == 0 {
        Ok(())
    } else {
        Err(Isbn::CHECKSUM_FAILED_ERROR)
    }
}

/// Checks an ISBN-13 without hyphens.
fn check_isbn13(isbn: &[u8]) -> Result<(), &'static str> {
    if !isbn.iter().all(u8::is_ascii_digit) {
        return Err(Isbn::INVALID_CHARACTERS_ERROR);
    }
    match isbn.len() {
        n if n < 13 => return Err(Isbn::TOO_SHORT_ERROR),
        n if n > 13 => return Err(Isbn::TOO_LONG_ERROR),
        _ => {}
    }
    let sum: u32 = isbn
        .iter()
        .enumerate()
        .map(|(i, c)| u32::from(c - b'0') * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    if sum % 10 == 0 {
        Ok(())
    } else {
        Err(Isbn::CHECKSUM_FAILED_ERROR)
    }
}

impl Validate for Isbn {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let canonical: Vec<u8> = text.bytes().filter(|b| *b != b'-').collect();

        let outcome = match self.kind {
            IsbnType::Isbn10 => check_isbn10(&canonical),
            IsbnType::Isbn13 => check_isbn13(&canonical),
            IsbnType::Both => match check_isbn10(&canonical) {
                Err(Self::TOO_LONG_ERROR) => match check_isbn13(&canonical) {
                    Err(Self::TOO_SHORT_ERROR) => Err(Self::TYPE_NOT_RECOGNIZED_ERROR),
                    other => other,
                },
                other => other,
            },
        };

        if let Err(code) = outcome {
            ctx.build_violation(self.message().to_owned())
                .set_parameter("{{ value }}", value.formatted())
                .set_code(code)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}
