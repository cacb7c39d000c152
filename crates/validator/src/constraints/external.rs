//! Constraints that delegate to an injected collaborator.
//!
//! | Constraint | Service |
//! |---|---|
//! | [`NotCompromisedPassword`] | [`PasswordBreachChecker`](crate::services::PasswordBreachChecker) |
//! | [`PhoneNumber`] | [`PhoneNumberParser`](crate::services::PhoneNumberParser) |
//! | [`BankCode`], [`BankAccount`] | [`BankDirectory`](crate::services::BankDirectory) |

use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::constraints::report;
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value, text_input,
};
use crate::services::{BankDirectory, PhoneNumberKind};

// ============================================================================
// NOT COMPROMISED PASSWORD
// ============================================================================

/// The value must not appear in a breached-password corpus.
///
/// Only the first five hex characters of the password's SHA-1 hash are sent
/// to the checker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotCompromisedPassword {
    /// Minimum breach count that makes a password compromised.
    pub threshold: u64,
    /// Treat checker failures as "not compromised" instead of failing.
    pub skip_on_error: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Default for NotCompromisedPassword {
    fn default() -> Self {
        Self {
            threshold: 1,
            skip_on_error: false,
            message: None,
            groups: Groups::default(),
        }
    }
}

impl NotCompromisedPassword {
    crate::error_codes! {
        COMPROMISED_PASSWORD_ERROR = "d9bcdbfe-a9d6-4bfa-a8ff-da5fd93e0f6d";
    }

    const MESSAGE: &'static str =
        "This password has been leaked in a data breach, it must not be used. Please use another password.";

    /// Passwords seen at least `threshold` times are rejected. Unlisted
    /// passwords always pass, even with a threshold of 0.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Checker failures let the password through.
    #[must_use = "builder methods must be chained or built"]
    pub fn skipping_on_error(mut self) -> Self {
        self.skip_on_error = true;
        self
    }
}

impl Validate for NotCompromisedPassword {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(password) = text_input(value)? else {
            return Ok(());
        };
        let checker = ctx
            .services()
            .breach_checker()
            .ok_or(ValidatorError::MissingService {
                constraint: "NotCompromisedPassword",
                service: "password breach checker",
            })?;

        let hash = hex::encode_upper(Sha1::digest(password.as_bytes()));
        let (prefix, suffix) = hash.split_at(5);
        let body = match checker.fetch_range(prefix) {
            Ok(body) => body,
            Err(error) if self.skip_on_error => {
                warn!(%error, "password breach check failed, skipping");
                return Ok(());
            }
            Err(source) => {
                return Err(ValidatorError::Service {
                    service: "password breach checker",
                    source,
                });
            }
        };

        let count = crate::services::breach_count(&body, suffix);
        // Only listed suffixes count, whatever the threshold.
        if count > 0 && count >= self.threshold {
            let template = self.message.clone().unwrap_or_else(|| Self::MESSAGE.to_owned());
            ctx.build_violation(template)
                .set_code(Self::COMPROMISED_PASSWORD_ERROR)
                .add_violation();
        }
        Ok(())
    }
}

// ============================================================================
// PHONE NUMBER
// ============================================================================

/// The value must be a valid phone number, optionally of given line types.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhoneNumber {
    /// ISO 3166-1 alpha-2 region for numbers without an international
    /// prefix. Without it such numbers are invalid.
    pub default_region: Option<String>,
    /// Accepted line types; empty accepts any.
    pub kinds: Vec<PhoneNumberKind>,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl PhoneNumber {
    crate::error_codes! {
        INVALID_PHONE_NUMBER_ERROR = "ca23f4ca-38f4-4325-9bcc-eb570a4abe7f";
    }

    const MESSAGE: &'static str = "This value is not a valid phone number.";

    /// National numbers are read in `region`.
    pub fn in_region(region: impl Into<String>) -> Self {
        Self {
            default_region: Some(region.into()),
            ..Self::default()
        }
    }

    /// Only numbers of these kinds pass.
    #[must_use = "builder methods must be chained or built"]
    pub fn of_kinds(mut self, kinds: impl IntoIterator<Item = PhoneNumberKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }
}

impl Validate for PhoneNumber {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let parser = ctx
            .services()
            .phone_parser()
            .ok_or(ValidatorError::MissingService {
                constraint: "PhoneNumber",
                service: "phone number parser",
            })?;

        let valid = parser
            .parse(&text, self.default_region.as_deref())
            .is_some_and(|number| {
                self.kinds.is_empty() || self.kinds.iter().any(|&k| number.kind.satisfies(k))
            });
        if !valid {
            report(
                ctx,
                self.message.as_deref(),
                Self::MESSAGE,
                value,
                Self::INVALID_PHONE_NUMBER_ERROR,
            );
        }
        Ok(())
    }
}

// ============================================================================
// GERMAN BANK CODES
// ============================================================================

fn bank_directory<'a>(
    ctx: &ExecutionContext<'a>,
    constraint: &'static str,
) -> Result<&'a dyn BankDirectory, ValidatorError> {
    ctx.services()
        .bank_directory()
        .ok_or(ValidatorError::MissingService {
            constraint,
            service: "bank directory",
        })
}

fn directory_failed(source: crate::foundation::ServiceError) -> ValidatorError {
    ValidatorError::Service {
        service: "bank directory",
        source,
    }
}

/// Digits of `text` with spaces removed, if it has `min..=max` of them and
/// nothing else.
fn digits_only(text: &str, min: usize, max: usize) -> Option<String> {
    let digits: String = text.chars().filter(|c| *c != ' ').collect();
    let ok = (min..=max).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
    ok.then_some(digits)
}

/// The value must be a German bank code (Bankleitzahl) known to the
/// directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BankCode {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl BankCode {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "661dd19d-dca8-4560-8380-c5167d3bcc2a";
        UNKNOWN_BANK_ERROR = "094afd86-4696-461f-871c-d44eb14a6fdc";
    }

    const MESSAGE: &'static str = "This value is not a valid bank code.";
    const LENGTH: usize = 8;
}

impl Validate for BankCode {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let Some(code) = digits_only(&text, Self::LENGTH, Self::LENGTH) else {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::INVALID_FORMAT_ERROR);
            return Ok(());
        };
        let exists = bank_directory(ctx, "BankCode")?
            .bank_exists(&code)
            .map_err(directory_failed)?;
        if !exists {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::UNKNOWN_BANK_ERROR);
        }
        Ok(())
    }
}

/// The value must be a German account number (Kontonummer) that passes the
/// check of the bank named in a sibling property.
///
/// When the sibling bank code is null, empty or malformed only the account
/// format is checked; a [`BankCode`] on that property reports the code
/// itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "BankAccountOptions")]
pub struct BankAccount {
    bank_code_property_path: String,
    message: Option<String>,
    pub(crate) groups: Groups,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BankAccountOptions {
    bank_code_property_path: Option<String>,
    message: Option<String>,
    groups: Groups,
}

impl TryFrom<BankAccountOptions> for BankAccount {
    type Error = DefinitionError;

    fn try_from(options: BankAccountOptions) -> Result<Self, Self::Error> {
        let path = options
            .bank_code_property_path
            .ok_or(DefinitionError::MissingOption {
                constraint: "BankAccount",
                options: "\"bank_code_property_path\"",
            })?;
        let mut account = Self::new(path)?;
        account.message = options.message;
        account.groups = options.groups;
        Ok(account)
    }
}

impl BankAccount {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "1fe75741-c4b3-4b44-87db-ddca26ec8ca2";
        INVALID_ACCOUNT_ERROR = "505cea33-a333-4382-b493-ac1db935b7a9";
    }

    const MESSAGE: &'static str = "This value is not a valid account number.";
    const MAX_DIGITS: usize = 10;

    /// Reads the bank code from the sibling property at `path`.
    pub fn new(bank_code_property_path: impl Into<String>) -> Result<Self, DefinitionError> {
        let path = bank_code_property_path.into();
        if path.is_empty() {
            return Err(DefinitionError::invalid_option(
                "BankAccount",
                "bank_code_property_path",
                "must not be empty",
            ));
        }
        Ok(Self {
            bank_code_property_path: path,
            message: None,
            groups: Groups::default(),
        })
    }

    /// Replaces the default message.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Path of the sibling bank code property.
    pub fn bank_code_property_path(&self) -> &str {
        &self.bank_code_property_path
    }
}

impl Validate for BankAccount {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let Some(account) = digits_only(&text, 1, Self::MAX_DIGITS) else {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::INVALID_FORMAT_ERROR);
            return Ok(());
        };

        let bank_code = ctx.resolve_property("BankAccount", &self.bank_code_property_path)?;
        let Some(bank_code) = text_input(bank_code)? else {
            return Ok(());
        };
        let Some(bank_code) = digits_only(&bank_code, BankCode::LENGTH, BankCode::LENGTH) else {
            return Ok(());
        };

        let valid = bank_directory(ctx, "BankAccount")?
            .account_valid(&bank_code, &account)
            .map_err(directory_failed)?;
        if !valid {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::INVALID_ACCOUNT_ERROR);
        }
        Ok(())
    }
}
