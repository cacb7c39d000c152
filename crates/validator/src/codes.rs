//! Error code lookup.
//!
//! Every constraint publishes its codes as constants plus an `ERROR_NAMES`
//! table. This module gathers them into one immutable map, built on first
//! use, so a code found in a stored violation can be traced back to the
//! constraint and constant that produced it.

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::constraints::*;

/// One row of the code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    /// The stable code, usually a UUID.
    pub code: &'static str,
    /// Constraint that raises it.
    pub constraint: &'static str,
    /// Name of the constant holding the code.
    pub name: &'static str,
}

type NameTable = &'static [(&'static str, &'static str)];

const SOURCES: &[(&str, NameTable)] = &[
    ("NotBlank", NotBlank::ERROR_NAMES),
    ("Blank", Blank::ERROR_NAMES),
    ("NotNull", NotNull::ERROR_NAMES),
    ("IsNull", IsNull::ERROR_NAMES),
    ("IsTrue", IsTrue::ERROR_NAMES),
    ("IsFalse", IsFalse::ERROR_NAMES),
    ("Type", Type::ERROR_NAMES),
    ("Choice", Choice::ERROR_NAMES),
    ("Comparison", Comparison::ERROR_NAMES),
    ("Range", Range::ERROR_NAMES),
    ("Length", Length::ERROR_NAMES),
    ("Count", Count::ERROR_NAMES),
    ("StringContains", StringContains::ERROR_NAMES),
    ("Iban", Iban::ERROR_NAMES),
    ("Bic", Bic::ERROR_NAMES),
    ("Isbn", Isbn::ERROR_NAMES),
    ("Isin", Isin::ERROR_NAMES),
    ("Issn", Issn::ERROR_NAMES),
    ("Luhn", Luhn::ERROR_NAMES),
    ("Orcid", Orcid::ERROR_NAMES),
    ("Uuid", Uuid::ERROR_NAMES),
    ("Ulid", Ulid::ERROR_NAMES),
    ("Regex", Regex::ERROR_NAMES),
    ("Email", Email::ERROR_NAMES),
    ("Url", Url::ERROR_NAMES),
    ("Hostname", Hostname::ERROR_NAMES),
    ("Ip", Ip::ERROR_NAMES),
    ("Json", Json::ERROR_NAMES),
    ("CssColor", CssColor::ERROR_NAMES),
    ("Date", Date::ERROR_NAMES),
    ("Time", Time::ERROR_NAMES),
    ("DateTime", DateTime::ERROR_NAMES),
    ("Country", Country::ERROR_NAMES),
    ("Currency", Currency::ERROR_NAMES),
    ("Language", Language::ERROR_NAMES),
    ("Locale", Locale::ERROR_NAMES),
    ("NotCompromisedPassword", NotCompromisedPassword::ERROR_NAMES),
    ("PhoneNumber", PhoneNumber::ERROR_NAMES),
    ("BankCode", BankCode::ERROR_NAMES),
    ("BankAccount", BankAccount::ERROR_NAMES),
    ("Composite", Composite::ERROR_NAMES),
];

static TABLE: LazyLock<IndexMap<&'static str, CodeEntry>> = LazyLock::new(|| {
    SOURCES
        .iter()
        .flat_map(|&(constraint, names)| {
            names.iter().map(move |&(code, name)| {
                let entry = CodeEntry {
                    code,
                    constraint,
                    name,
                };
                (code, entry)
            })
        })
        .collect()
});

/// Constant name of `code`, e.g. `"TOO_SHORT_ERROR"`.
pub fn error_name(code: &str) -> Option<&'static str> {
    TABLE.get(code).map(|entry| entry.name)
}

/// Full table row for `code`.
pub fn lookup(code: &str) -> Option<&'static CodeEntry> {
    TABLE.get(code)
}

/// Every known code, grouped by constraint.
pub fn entries() -> impl Iterator<Item = &'static CodeEntry> {
    TABLE.values()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_code_is_listed_once() {
        let declared: usize = SOURCES.iter().map(|(_, names)| names.len()).sum();
        assert_eq!(TABLE.len(), declared, "a code is shared between constants");
    }

    #[test]
    fn names_match_constants() {
        assert_eq!(error_name(Length::TOO_SHORT_ERROR), Some("TOO_SHORT_ERROR"));
        assert_eq!(error_name(Iban::CHECKSUM_FAILED_ERROR), Some("CHECKSUM_FAILED_ERROR"));
        assert_eq!(error_name(Comparison::TOO_LOW_ERROR), Some("TOO_LOW_ERROR"));
        assert_eq!(error_name("not-a-code"), None);
    }

    #[test]
    fn lookup_names_the_constraint() {
        let entry = lookup(Composite::AT_LEAST_ONE_OF_ERROR).unwrap();
        assert_eq!(entry.constraint, "Composite");
        assert_eq!(entry.name, "AT_LEAST_ONE_OF_ERROR");
    }
}
