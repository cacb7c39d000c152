//! Business Identifier Codes (SWIFT / ISO 9362).

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value, text_input,
};

/// BIC country codes whose IBANs carry a different country prefix.
const IBAN_COUNTRY_FOR_BIC: &[(&str, &str)] = &[
    ("GF", "FR"),
    ("PF", "FR"),
    ("TF", "FR"),
    ("GP", "FR"),
    ("MQ", "FR"),
    ("YT", "FR"),
    ("NC", "FR"),
    ("RE", "FR"),
    ("BL", "FR"),
    ("MF", "FR"),
    ("PM", "FR"),
    ("WF", "FR"),
    ("JE", "GB"),
    ("IM", "GB"),
    ("GG", "GB"),
    ("VG", "GB"),
    ("AX", "FI"),
    ("IC", "ES"),
    ("EA", "ES"),
];

fn iban_country_for(bic_country: &str) -> Option<&'static str> {
    IBAN_COUNTRY_FOR_BIC
        .iter()
        .find(|(bic, _)| *bic == bic_country)
        .map(|(_, iban)| *iban)
}

/// How letter case is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BicMode {
    /// Lowercase letters are a violation.
    #[default]
    Strict,
    /// The value is uppercased before checking.
    CaseInsensitive,
}

/// Where the IBAN to cross-check comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IbanSource {
    Literal(String),
    PropertyPath(String),
}

/// The value must be a BIC, optionally belonging to the same country as an
/// IBAN.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "BicOptions")]
pub struct Bic {
    mode: BicMode,
    iban: Option<IbanSource>,
    message: Option<String>,
    iban_message: Option<String>,
    pub(crate) groups: Groups,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BicOptions {
    mode: BicMode,
    iban: Option<String>,
    iban_property_path: Option<String>,
    message: Option<String>,
    iban_message: Option<String>,
    groups: Groups,
}

impl TryFrom<BicOptions> for Bic {
    type Error = DefinitionError;

    fn try_from(options: BicOptions) -> Result<Self, Self::Error> {
        let iban = match (options.iban, options.iban_property_path) {
            (Some(_), Some(_)) => {
                return Err(DefinitionError::ConflictingOptions {
                    constraint: "Bic",
                    first: "iban",
                    second: "iban_property_path",
                });
            }
            (Some(iban), None) => Some(IbanSource::Literal(iban)),
            (None, Some(path)) => Some(IbanSource::PropertyPath(path)),
            (None, None) => None,
        };
        Ok(Self {
            mode: options.mode,
            iban,
            message: options.message,
            iban_message: options.iban_message,
            groups: options.groups,
        })
    }
}

impl Bic {
    crate::error_codes! {
        INVALID_LENGTH_ERROR = "66dad313-af0b-4214-8566-6c799be9789c";
        INVALID_CHARACTERS_ERROR = "f424c529-7add-4417-8f2d-4b656e4833e2";
        INVALID_BANK_CODE_ERROR = "00559357-6170-4f29-aebd-d19330aa19cf";
        INVALID_COUNTRY_CODE_ERROR = "1ce76f8d-3c1f-451c-9e62-fe9c3ed486ae";
        INVALID_CASE_ERROR = "11884038-3312-4ae5-9d04-699f782130c7";
        INVALID_IBAN_COUNTRY_CODE_ERROR = "29a2c3bb-587b-4996-b6f5-53081364cea5";
    }

    const MESSAGE: &'static str = "This is not a valid Business Identifier Code (BIC).";
    const IBAN_MESSAGE: &'static str =
        "This Business Identifier Code (BIC) is not associated with IBAN {{ iban }}.";

    /// The BIC's country must match this IBAN's.
    pub fn with_iban(iban: impl Into<String>) -> Self {
        Self {
            iban: Some(IbanSource::Literal(iban.into())),
            ..Self::default()
        }
    }

    /// The BIC's country must match the IBAN stored in a sibling property.
    pub fn with_iban_property(path: impl Into<String>) -> Self {
        Self {
            iban: Some(IbanSource::PropertyPath(path.into())),
            ..Self::default()
        }
    }

    /// Accept lowercase input.
    #[must_use = "builder methods must be chained or built"]
    pub fn case_insensitive(mut self) -> Self {
        self.mode = BicMode::CaseInsensitive;
        self
    }

    fn check_structure(&self, canonical: &str, ctx: &ExecutionContext<'_>) -> Result<(), &'static str> {
        if canonical.len() != 8 && canonical.len() != 11 {
            return Err(Self::INVALID_LENGTH_ERROR);
        }
        if !canonical.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Self::INVALID_CHARACTERS_ERROR);
        }
        if !canonical[..4].bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(Self::INVALID_BANK_CODE_ERROR);
        }
        let country = &canonical[4..6];
        let known = match ctx.services().intl() {
            Some(intl) => intl.country_exists(country),
            None => country.bytes().all(|b| b.is_ascii_uppercase()),
        };
        if !known && iban_country_for(country).is_none() {
            return Err(Self::INVALID_COUNTRY_CODE_ERROR);
        }
        if canonical.bytes().any(|b| b.is_ascii_lowercase()) {
            return Err(Self::INVALID_CASE_ERROR);
        }
        Ok(())
    }

    fn resolve_iban(&self, ctx: &ExecutionContext<'_>) -> Result<Option<String>, ValidatorError> {
        let iban = match &self.iban {
            None => return Ok(None),
            Some(IbanSource::Literal(iban)) => iban.clone(),
            Some(IbanSource::PropertyPath(path)) => {
                if ctx.object().is_none() {
                    return Ok(None);
                }
                let value = ctx.resolve_property("Bic", path)?;
                match value.to_text() {
                    Some(text) => text.into_owned(),
                    None => return Err(ValidatorError::unexpected_type("string", value)),
                }
            }
        };
        Ok((!iban.is_empty()).then_some(iban))
    }
}

impl Validate for Bic {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let mut canonical = text.replace(' ', "");
        if self.mode == BicMode::CaseInsensitive {
            canonical.make_ascii_uppercase();
        }

        if let Err(code) = self.check_structure(&canonical, ctx) {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
            return Ok(());
        }

        let Some(iban) = self.resolve_iban(ctx)? else {
            return Ok(());
        };
        let Some(iban_country) = iban.get(..2) else {
            return Ok(());
        };
        let bic_country = &canonical[4..6];
        let matches = iban_country == bic_country || iban_country_for(bic_country) == Some(iban_country);
        if iban_country.bytes().all(|b| b.is_ascii_alphabetic()) && !matches {
            ctx.build_violation(
                self.iban_message
                    .clone()
                    .unwrap_or_else(|| Self::IBAN_MESSAGE.to_owned()),
            )
            .set_parameter("{{ value }}", value.formatted())
            .set_parameter("{{ iban }}", iban.clone())
            .set_code(Self::INVALID_IBAN_COUNTRY_CODE_ERROR)
            .set_invalid_value(value.clone())
            .add_violation();
        }
        Ok(())
    }
}
