//! Violations and violation lists.
//!
//! A [`Violation`] is the record a validator leaves behind when a value
//! fails a rule. It carries the message template, the interpolation
//! parameters, a stable machine-readable code, and the property path of
//! the offending value. Violations are built through
//! [`ViolationBuilder`](crate::foundation::ViolationBuilder) and never
//! change after that.

use std::borrow::Cow;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::foundation::Value;

/// Ordered `{{ placeholder }}` -> text pairs (typically 1-3 entries).
pub type Parameters = SmallVec<[(Cow<'static, str>, String); 4]>;

// ============================================================================
// VIOLATION
// ============================================================================

/// One failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    message: String,
    message_template: Cow<'static, str>,
    #[serde(serialize_with = "serialize_parameters")]
    parameters: Parameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    plural: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invalid_value: Option<Value>,
    property_path: String,
}

impl Violation {
    pub(crate) fn new(
        message_template: Cow<'static, str>,
        parameters: Parameters,
        plural: Option<u64>,
        code: Option<Cow<'static, str>>,
        invalid_value: Option<Value>,
        property_path: String,
    ) -> Self {
        let message = render(&message_template, &parameters, plural);
        Self {
            message,
            message_template,
            parameters,
            plural,
            code,
            invalid_value,
            property_path,
        }
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw template, e.g. `This value should be {{ limit }} or more.`
    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    /// All parameters in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Looks up a parameter by its placeholder, e.g. `{{ value }}`.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }

    /// Count used to pick a plural form.
    pub fn plural(&self) -> Option<u64> {
        self.plural
    }

    /// Stable error code, usually a UUID.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The value that failed, when the validator recorded it.
    pub fn invalid_value(&self) -> Option<&Value> {
        self.invalid_value.as_ref()
    }

    /// Path of the offending value relative to the validation root.
    pub fn property_path(&self) -> &str {
        &self.property_path
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property_path.is_empty() {
            f.write_str(&self.message)?;
        } else {
            write!(f, "{}: {}", self.property_path, self.message)?;
        }
        if let Some(code) = &self.code {
            write!(f, " (code {code})")?;
        }
        Ok(())
    }
}

/// Picks the plural form (`singular|plural`) and substitutes parameters.
fn render(template: &str, parameters: &Parameters, plural: Option<u64>) -> String {
    let form = if template.contains('|') {
        let forms: Vec<&str> = template.split('|').collect();
        let index = match plural {
            Some(1) | None => 0,
            Some(_) => 1,
        };
        forms[index.min(forms.len() - 1)]
    } else {
        template
    };

    parameters
        .iter()
        .fold(form.to_owned(), |text, (key, value)| text.replace(key.as_ref(), value))
}

fn serialize_parameters<S: Serializer>(
    parameters: &Parameters,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(parameters.len()))?;
    for (key, value) in parameters {
        map.serialize_entry(key.as_ref(), value)?;
    }
    map.end()
}

// ============================================================================
// VIOLATION LIST
// ============================================================================

/// Violations collected during one validation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViolationList {
    violations: Vec<Violation>,
}

impl ViolationList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Appends every violation of `other`.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
    }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Violation at `index`.
    pub fn get(&self, index: usize) -> Option<&Violation> {
        self.violations.get(index)
    }

    /// Iterates over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Codes of all violations, in order.
    pub fn codes(&self) -> Vec<&str> {
        self.violations.iter().filter_map(Violation::code).collect()
    }

    /// Returns `true` if any violation carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.violations.iter().any(|v| v.code() == Some(code))
    }

    /// `Ok(())` when empty, the list itself otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ViolationList {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl FromIterator<Violation> for ViolationList {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn violation(template: &'static str, params: Parameters, plural: Option<u64>) -> Violation {
        Violation::new(
            Cow::Borrowed(template),
            params,
            plural,
            Some(Cow::Borrowed("code-1")),
            None,
            String::new(),
        )
    }

    #[test]
    fn renders_parameters() {
        let v = violation(
            "This value should be {{ limit }} or more.",
            smallvec![(Cow::Borrowed("{{ limit }}"), "5".to_owned())],
            None,
        );
        assert_eq!(v.message(), "This value should be 5 or more.");
        assert_eq!(v.parameter("{{ limit }}"), Some("5"));
        assert_eq!(v.parameter("{{ value }}"), None);
    }

    #[test]
    fn picks_plural_form() {
        let template = "It should have {{ limit }} character.|It should have {{ limit }} characters.";
        let params: Parameters = smallvec![(Cow::Borrowed("{{ limit }}"), "1".to_owned())];
        assert_eq!(
            violation(template, params, Some(1)).message(),
            "It should have 1 character."
        );
        let params: Parameters = smallvec![(Cow::Borrowed("{{ limit }}"), "3".to_owned())];
        assert_eq!(
            violation(template, params, Some(3)).message(),
            "It should have 3 characters."
        );
    }

    #[test]
    fn display_includes_path_and_code() {
        let v = Violation::new(
            Cow::Borrowed("Bad."),
            Parameters::new(),
            None,
            Some(Cow::Borrowed("c1")),
            None,
            "user.email".to_owned(),
        );
        assert_eq!(v.to_string(), "user.email: Bad. (code c1)");
    }

    #[test]
    fn list_helpers() {
        let list: ViolationList = vec![
            violation("A", Parameters::new(), None),
            violation("B", Parameters::new(), None),
        ]
        .into_iter()
        .collect();
        assert_eq!(list.len(), 2);
        assert!(list.has_code("code-1"));
        assert_eq!(list.codes(), vec!["code-1", "code-1"]);
        assert_eq!(list.to_string(), "A (code code-1)\nB (code code-1)");
        assert!(list.into_result().is_err());
        assert!(ViolationList::new().into_result().is_ok());
    }

    #[test]
    fn serializes_parameters_as_map() {
        let v = violation(
            "{{ a }}",
            smallvec![(Cow::Borrowed("{{ a }}"), "x".to_owned())],
            None,
        );
        insta::assert_json_snapshot!(v, @r###"
        {
          "message": "x",
          "message_template": "{{ a }}",
          "parameters": {
            "{{ a }}": "x"
          },
          "code": "code-1",
          "property_path": ""
        }
        "###);
    }
}
