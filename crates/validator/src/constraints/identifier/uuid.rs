//! RFC 4122 / RFC 9562 UUIDs.

use serde::Deserialize;

use crate::constraints::basic::Normalizer;
use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

const STRICT_LENGTH: usize = 36;
const STRICT_HYPHENS: [usize; 4] = [8, 13, 18, 23];
const VERSION_POSITION: usize = 14;
const VARIANT_POSITION: usize = 19;
const LOOSE_MAX_LENGTH: usize = 39;
const LOOSE_FIRST_HYPHEN: usize = 4;

/// The value must be a UUID.
///
/// Strict mode accepts only the canonical `8-4-4-4-12` form with an allowed
/// version digit and the RFC 4122 variant. Loose mode accepts surrounding
/// braces or brackets, a `urn:uuid:` prefix, and hyphens after any group of
/// four hex digits (or none at all).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Uuid {
    /// Allowed version digits.
    pub versions: Vec<u8>,
    /// Canonical form only.
    pub strict: bool,
    /// Applied before checking.
    pub normalizer: Option<Normalizer>,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Default for Uuid {
    fn default() -> Self {
        Self {
            versions: (1..=8).collect(),
            strict: true,
            normalizer: None,
            message: None,
            groups: Groups::default(),
        }
    }
}

impl Uuid {
    crate::error_codes! {
        TOO_SHORT_ERROR = "aa314679-dac9-4f54-bf97-b2049df8f2a3";
        TOO_LONG_ERROR = "494897dd-36f8-4d31-8923-71a8d5f3000d";
        INVALID_CHARACTERS_ERROR = "51120b12-a2bc-41bf-aa53-cd73daf330d0";
        INVALID_HYPHEN_PLACEMENT_ERROR = "98469c83-0309-4f5d-bf95-a496dcaa869c";
        INVALID_VERSION_ERROR = "21ba13b4-b185-4882-ac6f-d147355987eb";
        INVALID_VARIANT_ERROR = "164ef693-2b9d-46de-ad7f-836201f0c2db";
    }

    const MESSAGE: &'static str = "This is not a valid UUID.";

    /// Accepts only the listed versions.
    pub fn versions(versions: impl IntoIterator<Item = u8>) -> Self {
        Self {
            versions: versions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Non-canonical spellings are accepted.
    #[must_use = "builder methods must be chained or built"]
    pub fn loose(mut self) -> Self {
        self.strict = false;
        self
    }

    /// Characters are reported before hyphens, hyphens before length, then
    /// version and variant.
    fn check_strict(&self, uuid: &[u8]) -> Result<(), &'static str> {
        for i in 0..STRICT_LENGTH {
            let Some(&c) = uuid.get(i) else {
                return Err(Self::TOO_SHORT_ERROR);
            };
            if STRICT_HYPHENS.contains(&i) {
                if c != b'-' {
                    return Err(if c.is_ascii_hexdigit() {
                        Self::INVALID_HYPHEN_PLACEMENT_ERROR
                    } else {
                        Self::INVALID_CHARACTERS_ERROR
                    });
                }
            } else if !c.is_ascii_hexdigit() {
                return Err(if c == b'-' {
                    Self::INVALID_HYPHEN_PLACEMENT_ERROR
                } else {
                    Self::INVALID_CHARACTERS_ERROR
                });
            }
        }
        if uuid.len() > STRICT_LENGTH {
            return Err(Self::TOO_LONG_ERROR);
        }

        let version = char::from(uuid[VERSION_POSITION]).to_digit(10);
        if !version.is_some_and(|v| self.versions.iter().any(|allowed| u32::from(*allowed) == v)) {
            return Err(Self::INVALID_VERSION_ERROR);
        }
        let variant = char::from(uuid[VARIANT_POSITION]).to_digit(16).unwrap_or(0);
        if variant >> 2 != 2 {
            return Err(Self::INVALID_VARIANT_ERROR);
        }
        Ok(())
    }

    fn check_loose(uuid: &str) -> Result<(), &'static str> {
        let trimmed = uuid.trim_matches(['[', ']', '{', '}']);
        let trimmed = trimmed.strip_prefix("urn:uuid:").unwrap_or(trimmed);
        let bytes = trimmed.as_bytes();

        let mut next_hyphen = LOOSE_FIRST_HYPHEN;
        let mut max_length = LOOSE_MAX_LENGTH;
        let mut i = 0;
        while i < max_length {
            let Some(&c) = bytes.get(i) else {
                return Err(Self::TOO_SHORT_ERROR);
            };
            if c == b'-' {
                if i != next_hyphen {
                    return Err(Self::INVALID_HYPHEN_PLACEMENT_ERROR);
                }
                next_hyphen += 5;
                i += 1;
                continue;
            }
            // A skipped hyphen shortens the expected length by one.
            if i == next_hyphen {
                next_hyphen += 4;
                max_length -= 1;
            }
            if !c.is_ascii_hexdigit() {
                return Err(Self::INVALID_CHARACTERS_ERROR);
            }
            i += 1;
        }
        if bytes.len() > i {
            return Err(Self::TOO_LONG_ERROR);
        }
        Ok(())
    }
}

impl Validate for Uuid {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let uuid = match self.normalizer {
            Some(normalizer) => normalizer.apply(&text),
            None => &text,
        };
        let outcome = if self.strict {
            self.check_strict(uuid.as_bytes())
        } else {
            Self::check_loose(uuid)
        };
        if let Err(code) = outcome {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
        }
        Ok(())
    }
}
