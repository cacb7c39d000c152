//! JSON documents.

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// The value must be a syntactically valid JSON text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Json {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Json {
    crate::error_codes! {
        INVALID_JSON_ERROR = "0789c8ad-2d2b-49a4-8356-e2ce63998504";
    }

    const MESSAGE: &'static str = "This value should be valid JSON.";
}

impl Validate for Json {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        if serde_json::from_str::<IgnoredAny>(&text).is_err() {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::INVALID_JSON_ERROR);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, validate};
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"planet":"earth", "country": "Morocco","city": "Rabat" ,"postcode" : 10160, "is_great": true}"#)]
    #[case(r#"{"a": null}"#)]
    #[case("[]")]
    #[case("42")]
    #[case("true")]
    #[case(r#""string""#)]
    #[case(" [1, 2.5e3] ")]
    fn valid_json(#[case] json: &str) {
        assert_no_violation(&Json::default(), &Value::from(json));
    }

    #[rstest]
    #[case("{\"planet\":\"earth\", \"country\": \"Morocco\",\"city\": \"Rabat\" ,\"postcode\" : 10160, \"is_great\": true")]
    #[case("{'a': 1}")]
    #[case("[1, 2,]")]
    #[case("null}")]
    #[case("NaN")]
    #[case("{\"a\" 1}")]
    fn invalid_json(#[case] json: &str) {
        let violations = validate(&Json::default(), &Value::from(json));
        assert_eq!(single_code(&violations), Json::INVALID_JSON_ERROR);
        assert_eq!(violations.get(0).unwrap().message(), "This value should be valid JSON.");
    }

    #[test]
    fn numbers_are_coerced_to_text() {
        assert_no_violation(&Json::default(), &Value::from(7));
    }
}
