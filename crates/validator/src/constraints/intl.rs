//! Country, currency, language and locale codes.
//!
//! Lookups go through the configured [`IntlData`]; the default services
//! carry the built-in ISO tables.

use serde::Deserialize;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};
use crate::services::{IntlData, canonicalize_locale};

fn intl<'a>(
    ctx: &ExecutionContext<'a>,
    constraint: &'static str,
) -> Result<&'a dyn IntlData, ValidatorError> {
    ctx.services()
        .intl()
        .ok_or(ValidatorError::MissingService {
            constraint,
            service: "intl data source",
        })
}

// ============================================================================
// COUNTRY
// ============================================================================

/// The value must be an ISO 3166-1 country code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Country {
    /// Expect three-letter codes instead of two-letter ones.
    pub alpha3: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Country {
    crate::error_codes! {
        NO_SUCH_COUNTRY_ERROR = "8f900c12-61bd-455d-9398-996cd040f7f0";
    }

    const MESSAGE: &'static str = "This value is not a valid country.";

    /// Three-letter codes.
    pub fn alpha3() -> Self {
        Self {
            alpha3: true,
            ..Self::default()
        }
    }
}

impl Validate for Country {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(code) = text_input(value)? else {
            return Ok(());
        };
        let intl = intl(ctx, "Country")?;
        let exists = if self.alpha3 {
            intl.alpha3_country_exists(&code)
        } else {
            intl.country_exists(&code)
        };
        if !exists {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::NO_SUCH_COUNTRY_ERROR);
        }
        Ok(())
    }
}

// ============================================================================
// CURRENCY
// ============================================================================

/// The value must be an ISO 4217 currency code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Currency {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Currency {
    crate::error_codes! {
        NO_SUCH_CURRENCY_ERROR = "69945ac1-2db4-405f-bec7-d2772f73df52";
    }

    const MESSAGE: &'static str = "This value is not a valid currency.";
}

impl Validate for Currency {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(code) = text_input(value)? else {
            return Ok(());
        };
        if !intl(ctx, "Currency")?.currency_exists(&code) {
            report(
                ctx,
                self.message.as_deref(),
                Self::MESSAGE,
                value,
                Self::NO_SUCH_CURRENCY_ERROR,
            );
        }
        Ok(())
    }
}

// ============================================================================
// LANGUAGE
// ============================================================================

/// The value must be an ISO 639 language code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Language {
    /// Expect ISO 639-2 three-letter codes.
    pub alpha3: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Language {
    crate::error_codes! {
        NO_SUCH_LANGUAGE_ERROR = "ee65fec4-9a20-4202-9f39-ca558cd7bdf7";
    }

    const MESSAGE: &'static str = "This value is not a valid language.";

    /// Three-letter codes.
    pub fn alpha3() -> Self {
        Self {
            alpha3: true,
            ..Self::default()
        }
    }
}

impl Validate for Language {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(code) = text_input(value)? else {
            return Ok(());
        };
        let intl = intl(ctx, "Language")?;
        let exists = if self.alpha3 {
            intl.alpha3_language_exists(&code)
        } else {
            intl.language_exists(&code)
        };
        if !exists {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::NO_SUCH_LANGUAGE_ERROR);
        }
        Ok(())
    }
}

// ============================================================================
// LOCALE
// ============================================================================

/// The value must be a known locale identifier.
///
/// With `canonicalize` (the default) spellings such as `en-gb` or
/// `de_DE.UTF-8` are normalised before the lookup; the violation still
/// reports the value as given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Locale {
    /// Normalise before looking up.
    pub canonicalize: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            canonicalize: true,
            message: None,
            groups: Groups::default(),
        }
    }
}

impl Locale {
    crate::error_codes! {
        NO_SUCH_LOCALE_ERROR = "a0af4293-1f1a-4a1c-a328-979cba6182a2";
    }

    const MESSAGE: &'static str = "This value is not a valid locale.";

    /// Looks the value up exactly as given.
    #[must_use = "builder methods must be chained or built"]
    pub fn exact(mut self) -> Self {
        self.canonicalize = false;
        self
    }
}

impl Validate for Locale {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let locale = if self.canonicalize {
            canonicalize_locale(&text)
        } else {
            text.into_owned()
        };
        if !intl(ctx, "Locale")?.locale_exists(&locale) {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::NO_SUCH_LOCALE_ERROR);
        }
        Ok(())
    }
}
