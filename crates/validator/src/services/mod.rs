//! Injected collaborators.
//!
//! Validators that need outside knowledge (breached passwords, phone
//! numbering plans, bank directories, DNS, locale data, expression
//! evaluation) reach it through the traits in this module. A [`Services`]
//! bundle is attached to the [`Validator`](crate::Validator) and read by
//! validators through [`ExecutionContext::services`](crate::foundation::ExecutionContext::services).
//!
//! Only structural defaults ship: [`E164PhoneParser`] and
//! [`BuiltinIntlData`]. Everything else is absent until configured, and a
//! constraint that needs a missing service fails with
//! [`ValidatorError::MissingService`](crate::foundation::ValidatorError::MissingService).

pub mod bank;
pub mod breach;
pub mod dns;
pub mod email;
pub mod expression;
pub mod intl;
pub mod phone;

use std::fmt;
use std::sync::Arc;

pub use bank::{BankDirectory, StaticBankDirectory};
pub use breach::{PasswordBreachChecker, breach_count};
#[cfg(feature = "http")]
pub use breach::{DEFAULT_ENDPOINT, HttpBreachChecker};
pub use dns::{DnsResolver, RecordKind, SystemResolver};
pub use email::StrictEmailParser;
pub use expression::ExpressionEvaluator;
pub use intl::{BuiltinIntlData, IntlData, canonicalize_locale};
pub use phone::{E164PhoneParser, ParsedPhoneNumber, PhoneNumberKind, PhoneNumberParser};

/// The set of collaborators available to validators.
#[derive(Clone)]
pub struct Services {
    breach: Option<Arc<dyn PasswordBreachChecker>>,
    phone: Option<Arc<dyn PhoneNumberParser>>,
    bank: Option<Arc<dyn BankDirectory>>,
    expression: Option<Arc<dyn ExpressionEvaluator>>,
    dns: Option<Arc<dyn DnsResolver>>,
    strict_email: Option<Arc<dyn StrictEmailParser>>,
    intl: Option<Arc<dyn IntlData>>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            phone: Some(Arc::new(E164PhoneParser)),
            intl: Some(Arc::new(BuiltinIntlData)),
            ..Self::empty()
        }
    }
}

impl Services {
    /// No collaborators at all, not even the built-in defaults.
    pub fn empty() -> Self {
        Self {
            breach: None,
            phone: None,
            bank: None,
            expression: None,
            dns: None,
            strict_email: None,
            intl: None,
        }
    }

    /// Sets the password breach checker.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_breach_checker(mut self, checker: impl PasswordBreachChecker + 'static) -> Self {
        self.breach = Some(Arc::new(checker));
        self
    }

    /// Replaces the phone number parser.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_phone_parser(mut self, parser: impl PhoneNumberParser + 'static) -> Self {
        self.phone = Some(Arc::new(parser));
        self
    }

    /// Sets the bank directory.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_bank_directory(mut self, directory: impl BankDirectory + 'static) -> Self {
        self.bank = Some(Arc::new(directory));
        self
    }

    /// Sets the expression evaluator.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_expression_evaluator(
        mut self,
        evaluator: impl ExpressionEvaluator + 'static,
    ) -> Self {
        self.expression = Some(Arc::new(evaluator));
        self
    }

    /// Sets the DNS resolver.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_dns_resolver(mut self, resolver: impl DnsResolver + 'static) -> Self {
        self.dns = Some(Arc::new(resolver));
        self
    }

    /// Sets the strict e-mail parser.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_strict_email_parser(mut self, parser: impl StrictEmailParser + 'static) -> Self {
        self.strict_email = Some(Arc::new(parser));
        self
    }

    /// Replaces the intl data.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_intl_data(mut self, intl: impl IntlData + 'static) -> Self {
        self.intl = Some(Arc::new(intl));
        self
    }

    /// Password breach checker, if configured.
    pub fn breach_checker(&self) -> Option<&dyn PasswordBreachChecker> {
        self.breach.as_deref()
    }

    /// Phone number parser, if configured.
    pub fn phone_parser(&self) -> Option<&dyn PhoneNumberParser> {
        self.phone.as_deref()
    }

    /// Bank directory, if configured.
    pub fn bank_directory(&self) -> Option<&dyn BankDirectory> {
        self.bank.as_deref()
    }

    /// Expression evaluator, if configured.
    pub fn expression_evaluator(&self) -> Option<&dyn ExpressionEvaluator> {
        self.expression.as_deref()
    }

    /// DNS resolver, if configured.
    pub fn dns_resolver(&self) -> Option<&dyn DnsResolver> {
        self.dns.as_deref()
    }

    /// Strict e-mail parser, if configured.
    pub fn strict_email_parser(&self) -> Option<&dyn StrictEmailParser> {
        self.strict_email.as_deref()
    }

    /// Intl data, if configured.
    pub fn intl(&self) -> Option<&dyn IntlData> {
        self.intl.as_deref()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("breach", &self.breach.is_some())
            .field("phone", &self.phone.is_some())
            .field("bank", &self.bank.is_some())
            .field("expression", &self.expression.is_some())
            .field("dns", &self.dns.is_some())
            .field("strict_email", &self.strict_email.is_some())
            .field("intl", &self.intl.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_structural_only() {
        let services = Services::default();
        assert!(services.phone_parser().is_some());
        assert!(services.intl().is_some());
        assert!(services.breach_checker().is_none());
        assert!(services.expression_evaluator().is_none());
        assert!(services.dns_resolver().is_none());
    }

    #[test]
    fn empty_has_nothing() {
        let services = Services::empty();
        assert!(services.phone_parser().is_none());
        assert!(services.intl().is_none());
    }

    #[test]
    fn debug_shows_presence() {
        let services = Services::empty().with_strict_email_parser(|email: &str| email.contains('@'));
        let debug = format!("{services:?}");
        assert!(debug.contains("strict_email: true"));
        assert!(debug.contains("intl: false"));
    }
}
