//! Regular expression matching.

use serde::Deserialize;

use crate::constraints::basic::Normalizer;
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value, text_input,
};

/// The value must (or, with `match = false`, must not) match a pattern.
///
/// Patterns use the `regex` crate syntax. A delimited pattern such as
/// `/^abc$/i` is also accepted; its trailing `i`, `m`, `s`, `x` and `u`
/// flags become inline flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RegexOptions")]
pub struct Regex {
    pattern: String,
    compiled: regex::Regex,
    should_match: bool,
    normalizer: Option<Normalizer>,
    message: Option<String>,
    pub(crate) groups: Groups,
}

impl Regex {
    crate::error_codes! {
        REGEX_FAILED_ERROR = "de1e3db3-5ed4-4941-aae4-59f3667cc3a3";
    }

    const MESSAGE: &'static str = "This value is not valid.";

    /// Values must match `pattern`.
    pub fn new(pattern: impl Into<String>) -> Result<Self, DefinitionError> {
        Self::try_from(RegexOptions {
            pattern: Some(pattern.into()),
            ..RegexOptions::default()
        })
    }

    /// Values must not match.
    #[must_use = "builder methods must be chained or built"]
    pub fn negated(mut self) -> Self {
        self.should_match = false;
        self
    }

    /// Trims before matching.
    #[must_use = "builder methods must be chained or built"]
    pub fn trimmed(mut self) -> Self {
        self.normalizer = Some(Normalizer::Trim);
        self
    }

    /// Message override.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The pattern as configured.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Splits `/body/flags` into an inline-flagged pattern.
fn undelimit(pattern: &str) -> Result<String, String> {
    let Some(rest) = pattern.strip_prefix('/') else {
        return Ok(pattern.to_owned());
    };
    let Some(end) = rest.rfind('/') else {
        return Ok(pattern.to_owned());
    };
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' | 'x' => inline.push(flag),
            'u' => {}
            other => return Err(format!("unsupported pattern flag \"{other}\"")),
        }
    }
    Ok(if inline.is_empty() {
        body.to_owned()
    } else {
        format!("(?{inline}){body}")
    })
}

impl Validate for Regex {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let text = match self.normalizer {
            Some(normalizer) => normalizer.apply(&text),
            None => text.as_ref(),
        };
        if self.compiled.is_match(text) != self.should_match {
            ctx.build_violation(
                self.message
                    .clone()
                    .unwrap_or_else(|| Self::MESSAGE.into()),
            )
            .set_parameter("{{ value }}", value.formatted())
            .set_parameter("{{ pattern }}", self.pattern.clone())
            .set_code(Self::REGEX_FAILED_ERROR)
            .set_invalid_value(value.clone())
            .add_violation();
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RegexOptions {
    pattern: Option<String>,
    #[serde(rename = "match")]
    should_match: Option<bool>,
    normalizer: Option<Normalizer>,
    message: Option<String>,
    groups: Groups,
}

impl TryFrom<RegexOptions> for Regex {
    type Error = DefinitionError;

    fn try_from(options: RegexOptions) -> Result<Self, Self::Error> {
        let pattern = options.pattern.ok_or(DefinitionError::MissingOption {
            constraint: "Regex",
            options: "\"pattern\"",
        })?;
        let source = undelimit(&pattern)
            .map_err(|reason| DefinitionError::invalid_option("Regex", "pattern", reason))?;
        let compiled = regex::Regex::new(&source)
            .map_err(|e| DefinitionError::invalid_option("Regex", "pattern", e.to_string()))?;
        Ok(Self {
            pattern,
            compiled,
            should_match: options.should_match.unwrap_or(true),
            normalizer: options.normalizer,
            message: options.message,
            groups: options.groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, validate};
    use rstest::rstest;

    #[rstest]
    #[case("^[0-9]+$", "0")]
    #[case("^[0-9]+$", "090909")]
    #[case("^[0-9]+$", "90")]
    #[case("/^[a-z]+$/i", "AbC")]
    fn matching_values(#[case] pattern: &str, #[case] input: &str) {
        assert_no_violation(&Regex::new(pattern).unwrap(), &Value::from(input));
    }

    #[test]
    fn numbers_are_matched_as_text() {
        assert_no_violation(&Regex::new("^[0-9]+$").unwrap(), &Value::from(90));
    }

    #[test]
    fn mismatch_reports_pattern() {
        let violations = validate(&Regex::new("^[0-9]+$").unwrap(), &Value::from("abcd"));
        assert_eq!(single_code(&violations), Regex::REGEX_FAILED_ERROR);
        let violation = violations.get(0).unwrap();
        assert_eq!(violation.message(), "This value is not valid.");
        assert_eq!(violation.parameter("{{ pattern }}"), Some("^[0-9]+$"));
        assert_eq!(violation.parameter("{{ value }}"), Some("\"abcd\""));
    }

    #[test]
    fn negated_pattern() {
        let rule = Regex::new("[0-9]").unwrap().negated();
        assert_no_violation(&rule, &Value::from("abc"));
        assert_eq!(validate(&rule, &Value::from("a1")).len(), 1);
    }

    #[test]
    fn normalizer_applies_before_matching() {
        let rule = Regex::new("^[0-9]+$").unwrap().trimmed();
        assert_no_violation(&rule, &Value::from("  42 "));
    }

    #[test]
    fn empty_and_null_are_valid() {
        let rule = Regex::new("^x$").unwrap();
        assert_no_violation(&rule, &Value::Null);
        assert_no_violation(&rule, &Value::from(""));
    }

    #[test]
    fn bad_patterns_fail_at_construction() {
        assert!(matches!(
            Regex::new("(unclosed"),
            Err(DefinitionError::InvalidOption { option: "pattern", .. })
        ));
        assert!(matches!(
            Regex::new("/abc/e"),
            Err(DefinitionError::InvalidOption { option: "pattern", .. })
        ));
    }

    #[test]
    fn deserializes_match_flag() {
        let rule: Regex = serde_json::from_str(r#"{"pattern": "^a", "match": false}"#).unwrap();
        assert_eq!(validate(&rule, &Value::from("abc")).len(), 1);
        assert!(serde_json::from_str::<Regex>(r#"{"match": false}"#).is_err());
    }
}
