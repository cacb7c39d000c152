//! Built-in constraints
//!
//! Every constraint is a typed option record that also implements
//! [`Validate`](crate::foundation::Validate). The [`Constraint`] enum
//! wraps them all so heterogeneous rule lists can be stored, deserialized
//! from rule files and dispatched with a single `match`.
//!
//! # Families
//!
//! - **Basic**: blank/null/boolean checks, type, choice
//! - **Comparison**: EqualTo ... DivisibleBy, Positive/Negative, Range
//! - **Size**: Length, Count
//! - **Identifiers**: IBAN, BIC, ISBN, ISIN, ISSN, Luhn, ORCID, UUID, ULID
//! - **Formats**: regex, e-mail, URL, hostname, IP, JSON, CSS colour
//! - **Temporal**: Date, Time, DateTime
//! - **Intl**: country, currency, language, locale
//! - **External**: breached passwords, phone numbers, German bank data
//! - **Composite**: AllOf/AnyOf/ExactlyN/Sequential, When, Each

// Basic validators
pub mod basic;
pub mod contains;

// Ordered and size validators
pub mod comparison;
pub mod length;
pub mod range;

// Text formats and identifiers
pub mod format;
pub mod identifier;
pub mod temporal;

// Collaborator-backed validators
pub mod external;
pub mod intl;

// Containers
pub mod composite;

use crate::foundation::{DefinitionError, ExecutionContext, Groups, Value};

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use basic::{
    Blank, Choice, IsFalse, IsNull, IsTrue, Normalizer, NotBlank, NotNull, Type, TypeName,
};
pub use comparison::{CompareTarget, Comparison, ComparisonOperator};
pub use composite::{Composite, CompositePolicy, Each, When};
pub use contains::{MatchMode, NeedleSource, Require, StringContains};
pub use external::{BankAccount, BankCode, NotCompromisedPassword, PhoneNumber};
pub use format::{
    CssColor, CssColorFormat, Email, EmailMode, Hostname, Ip, IpVersion, Json, Regex, Url,
};
pub use identifier::{
    Bic, BicMode, Iban, Isbn, IsbnType, Isin, Issn, Luhn, Orcid, Ulid, UlidFormat, Uuid,
    luhn_checksum_valid,
};
pub use intl::{Country, Currency, Language, Locale};
pub use length::{Count, CountUnit, Length, SizeBounds};
pub use range::Range;
pub use temporal::{Date, DateTime, Time};

// ============================================================================
// CONSTRAINT SUM TYPE
// ============================================================================

crate::macros::constraint_kinds! {
    NotBlank(NotBlank) => "NotBlank",
    Blank(Blank) => "Blank",
    NotNull(NotNull) => "NotNull",
    IsNull(IsNull) => "IsNull",
    IsTrue(IsTrue) => "IsTrue",
    IsFalse(IsFalse) => "IsFalse",
    Type(Type) => "Type",
    Choice(Choice) => "Choice",
    Comparison(Comparison) => "Comparison",
    Range(Range) => "Range",
    Length(Length) => "Length",
    Count(Count) => "Count",
    StringContains(StringContains) => "StringContains",
    Iban(Iban) => "Iban",
    Bic(Bic) => "Bic",
    Isbn(Isbn) => "Isbn",
    Isin(Isin) => "Isin",
    Issn(Issn) => "Issn",
    Luhn(Luhn) => "Luhn",
    Orcid(Orcid) => "Orcid",
    Uuid(Uuid) => "Uuid",
    Ulid(Ulid) => "Ulid",
    Regex(Regex) => "Regex",
    Email(Email) => "Email",
    Url(Url) => "Url",
    Hostname(Hostname) => "Hostname",
    Ip(Ip) => "Ip",
    Json(Json) => "Json",
    CssColor(CssColor) => "CssColor",
    Date(Date) => "Date",
    Time(Time) => "Time",
    DateTime(DateTime) => "DateTime",
    Country(Country) => "Country",
    Currency(Currency) => "Currency",
    Language(Language) => "Language",
    Locale(Locale) => "Locale",
    NotCompromisedPassword(NotCompromisedPassword) => "NotCompromisedPassword",
    PhoneNumber(PhoneNumber) => "PhoneNumber",
    BankCode(BankCode) => "BankCode",
    BankAccount(BankAccount) => "BankAccount",
    Composite(Composite) => "Composite",
    When(When) => "When",
    Each(Each) => "Each",
}

impl Constraint {
    /// Sets explicit validation groups.
    ///
    /// Containers hand the groups down to their children and fail when a
    /// child declares groups outside of them.
    pub fn with_groups(mut self, groups: Groups) -> Result<Self, DefinitionError> {
        let name = self.name();
        let (own, nested) = self.parts_mut();
        *own = groups;
        composite::reconcile_groups(name, own, nested)?;
        Ok(self)
    }

    /// Overwrites the groups of this constraint and everything nested in it.
    pub(crate) fn inherit_groups(&mut self, groups: &Groups) {
        let (own, nested) = self.parts_mut();
        own.clone_from(groups);
        for child in nested {
            child.inherit_groups(groups);
        }
    }

    fn parts_mut(&mut self) -> (&mut Groups, Vec<&mut Self>) {
        match self {
            Self::Composite(c) => c.parts_mut(),
            Self::When(c) => c.parts_mut(),
            Self::Each(c) => c.parts_mut(),
            leaf => (leaf.groups_mut(), Vec::new()),
        }
    }
}

/// Records the usual single-code violation: the message (or `default`) with
/// `{{ value }}` set, the code, and the value as invalid value.
pub(crate) fn report(
    ctx: &mut ExecutionContext<'_>,
    message: Option<&str>,
    default: &'static str,
    value: &Value,
    code: &'static str,
) {
    let template = message.map_or(std::borrow::Cow::Borrowed(default), |m| {
        std::borrow::Cow::Owned(m.to_owned())
    });
    ctx.build_violation(template)
        .set_parameter("{{ value }}", value.formatted())
        .set_code(code)
        .set_invalid_value(value.clone())
        .add_violation();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rule_lists_deserialize_by_type_tag() {
        let rules: Vec<Constraint> = serde_json::from_str(
            r#"[
                { "type": "not_blank" },
                { "type": "length", "max": 5 },
                { "type": "css_color", "formats": ["hex_long"] },
                { "type": "not_compromised_password", "threshold": 3 },
                { "type": "each", "constraints": [{ "type": "luhn" }] }
            ]"#,
        )
        .unwrap();
        let names: Vec<_> = rules.iter().map(Constraint::name).collect();
        assert_eq!(
            names,
            vec!["NotBlank", "Length", "CssColor", "NotCompromisedPassword", "Each"]
        );
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = serde_json::from_str::<Constraint>(r#"{ "type": "luhn", "strict": true }"#)
            .unwrap_err();
        assert!(err.to_string().contains("strict"));
    }

    #[test]
    fn invariant_failures_surface_while_loading() {
        let err = serde_json::from_str::<Constraint>(r#"{ "type": "regex", "pattern": "(" }"#)
            .unwrap_err();
        assert!(err.to_string().contains("pattern"));
    }

    #[test]
    fn with_groups_sets_leaf_groups() {
        let rule = Constraint::from(NotBlank::default())
            .with_groups(Groups::new(["signup"]))
            .unwrap();
        assert!(rule.groups().contains("signup"));
        assert!(!rule.groups().contains(crate::foundation::DEFAULT_GROUP));
    }
}
