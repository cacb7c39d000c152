//! Range constraint.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::constraints::comparison::CompareTarget;
use crate::foundation::value::{Number, parse_datetime, parse_numeric};
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value,
};

/// The value must lie within `[min, max]`; either bound may be a literal or
/// a sibling property.
///
/// Non-numeric input raises [`Range::INVALID_CHARACTERS_ERROR`]. Date-times
/// compare against bounds given as date strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RangeOptions")]
pub struct Range {
    min: Option<CompareTarget>,
    max: Option<CompareTarget>,
    not_in_range_message: Option<String>,
    min_message: Option<String>,
    max_message: Option<String>,
    invalid_message: Option<String>,
    pub(crate) groups: Groups,
}

impl Range {
    crate::error_codes! {
        INVALID_CHARACTERS_ERROR = "ad9a9798-7a99-4df7-8ce9-46e416a1e60b";
        NOT_IN_RANGE_ERROR = "04b91c99-a946-4221-afc5-e65ebac401eb";
        TOO_HIGH_ERROR = "2d28afcb-e32e-45fb-a815-01c431a86a69";
        TOO_LOW_ERROR = "76454e69-502c-46c5-9643-f447d837c4d5";
    }

    const NOT_IN_RANGE_MESSAGE: &'static str = "This value should be between {{ min }} and {{ max }}.";
    const MIN_MESSAGE: &'static str = "This value should be {{ limit }} or more.";
    const MAX_MESSAGE: &'static str = "This value should be {{ limit }} or less.";
    const INVALID_MESSAGE: &'static str = "This value should be a valid number.";

    /// Range with explicit bound targets; at least one is required.
    pub fn new(
        min: Option<CompareTarget>,
        max: Option<CompareTarget>,
    ) -> Result<Self, DefinitionError> {
        if min.is_none() && max.is_none() {
            return Err(DefinitionError::MissingOption {
                constraint: "Range",
                options: "\"min\" or \"max\"",
            });
        }
        Ok(Self {
            min,
            max,
            not_in_range_message: None,
            min_message: None,
            max_message: None,
            invalid_message: None,
            groups: Groups::default(),
        })
    }

    /// Literal lower and upper bound.
    pub fn between(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self::bounded(
            Some(CompareTarget::Value(min.into())),
            Some(CompareTarget::Value(max.into())),
        )
    }

    /// Literal lower bound.
    pub fn at_least(min: impl Into<Value>) -> Self {
        Self::bounded(Some(CompareTarget::Value(min.into())), None)
    }

    /// Literal upper bound.
    pub fn at_most(max: impl Into<Value>) -> Self {
        Self::bounded(None, Some(CompareTarget::Value(max.into())))
    }

    fn bounded(min: Option<CompareTarget>, max: Option<CompareTarget>) -> Self {
        Self {
            min,
            max,
            not_in_range_message: None,
            min_message: None,
            max_message: None,
            invalid_message: None,
            groups: Groups::default(),
        }
    }

    /// Replaces the message used when both bounds are set.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_not_in_range_message(mut self, message: impl Into<String>) -> Self {
        self.not_in_range_message = Some(message.into());
        self
    }

    /// Replaces the message for non-numeric input.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_invalid_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_message = Some(message.into());
        self
    }

    /// Lower bound.
    pub fn min(&self) -> Option<&CompareTarget> {
        self.min.as_ref()
    }

    /// Upper bound.
    pub fn max(&self) -> Option<&CompareTarget> {
        self.max.as_ref()
    }

    fn resolve(
        bound: Option<&CompareTarget>,
        option: &'static str,
        value: &Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Option<Value>, ValidatorError> {
        let limit = match bound {
            None => return Ok(None),
            Some(CompareTarget::Value(limit)) => limit.clone(),
            Some(CompareTarget::PropertyPath(path)) => match ctx.object() {
                None => return Ok(None),
                Some(_) => ctx.resolve_property("Range", path)?.clone(),
            },
        };
        Ok(match (value, limit) {
            (_, Value::Null) => None,
            (Value::DateTime(_), Value::Text(text)) => {
                let parsed = parse_datetime(&text).ok_or_else(|| {
                    DefinitionError::invalid_option(
                        "Range",
                        option,
                        format!("the value \"{text}\" could not be converted to a date"),
                    )
                })?;
                Some(Value::DateTime(parsed))
            }
            (_, Value::Text(text)) => match parse_numeric(&text) {
                Some(Number::Int(i)) => Some(Value::Integer(i)),
                Some(Number::Float(f)) => Some(Value::Float(f)),
                None => Some(Value::Text(text)),
            },
            (_, limit) => Some(limit),
        })
    }

    fn path_of(bound: Option<&CompareTarget>) -> Option<&str> {
        match bound {
            Some(CompareTarget::PropertyPath(path)) => Some(path),
            _ => None,
        }
    }
}

impl Validate for Range {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if value.is_null() {
            return Ok(());
        }
        if !value.is_numeric() && !matches!(value, Value::DateTime(_)) {
            ctx.build_violation(
                self.invalid_message
                    .clone()
                    .unwrap_or_else(|| Self::INVALID_MESSAGE.into()),
            )
            .set_parameter("{{ value }}", value.formatted())
            .set_code(Self::INVALID_CHARACTERS_ERROR)
            .set_invalid_value(value.clone())
            .add_violation();
            return Ok(());
        }

        let min = Self::resolve(self.min.as_ref(), "min", value, ctx)?;
        let max = Self::resolve(self.max.as_ref(), "max", value, ctx)?;
        let too_low = min
            .as_ref()
            .is_some_and(|m| value.loose_cmp(m) == Some(Ordering::Less));
        let too_high = max
            .as_ref()
            .is_some_and(|m| value.loose_cmp(m) == Some(Ordering::Greater));

        let min_path = Self::path_of(self.min.as_ref());
        let max_path = Self::path_of(self.max.as_ref());

        if let (Some(min), Some(max)) = (&min, &max) {
            if too_low || too_high {
                let mut builder = ctx
                    .build_violation(
                        self.not_in_range_message
                            .clone()
                            .unwrap_or_else(|| Self::NOT_IN_RANGE_MESSAGE.into()),
                    )
                    .set_parameter("{{ value }}", value.formatted())
                    .set_parameter("{{ min }}", min.formatted())
                    .set_parameter("{{ max }}", max.formatted())
                    .set_code(Self::NOT_IN_RANGE_ERROR)
                    .set_invalid_value(value.clone());
                if let Some(path) = min_path {
                    builder = builder.set_parameter("{{ min_limit_path }}", path.to_owned());
                }
                if let Some(path) = max_path {
                    builder = builder.set_parameter("{{ max_limit_path }}", path.to_owned());
                }
                builder.add_violation();
            }
            return Ok(());
        }

        if let Some(max) = max.as_ref().filter(|_| too_high) {
            let mut builder = ctx
                .build_violation(self.max_message.clone().unwrap_or_else(|| Self::MAX_MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_parameter("{{ limit }}", max.formatted())
                .set_code(Self::TOO_HIGH_ERROR)
                .set_invalid_value(value.clone());
            if let Some(path) = max_path {
                builder = builder.set_parameter("{{ max_limit_path }}", path.to_owned());
            }
            builder.add_violation();
            return Ok(());
        }

        if let Some(min) = min.as_ref().filter(|_| too_low) {
            let mut builder = ctx
                .build_violation(self.min_message.clone().unwrap_or_else(|| Self::MIN_MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_parameter("{{ limit }}", min.formatted())
                .set_code(Self::TOO_LOW_ERROR)
                .set_invalid_value(value.clone());
            if let Some(path) = min_path {
                builder = builder.set_parameter("{{ min_limit_path }}", path.to_owned());
            }
            builder.add_violation();
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RangeOptions {
    min: Option<Value>,
    max: Option<Value>,
    min_property_path: Option<String>,
    max_property_path: Option<String>,
    not_in_range_message: Option<String>,
    min_message: Option<String>,
    max_message: Option<String>,
    invalid_message: Option<String>,
    groups: Groups,
}

fn bound(
    literal: Option<Value>,
    path: Option<String>,
    first: &'static str,
    second: &'static str,
) -> Result<Option<CompareTarget>, DefinitionError> {
    match (literal, path) {
        (Some(_), Some(_)) => Err(DefinitionError::ConflictingOptions {
            constraint: "Range",
            first,
            second,
        }),
        (Some(value), None) => Ok(Some(CompareTarget::Value(value))),
        (None, Some(path)) => Ok(Some(CompareTarget::PropertyPath(path))),
        (None, None) => Ok(None),
    }
}

impl TryFrom<RangeOptions> for Range {
    type Error = DefinitionError;

    fn try_from(options: RangeOptions) -> Result<Self, Self::Error> {
        let min = bound(options.min, options.min_property_path, "min", "min_property_path")?;
        let max = bound(options.max, options.max_property_path, "max", "max_property_path")?;
        if min.is_some() && max.is_some() {
            let custom = options
                .min_message
                .as_ref()
                .map(|_| "min_message")
                .or(options.max_message.as_ref().map(|_| "max_message"));
            if let Some(option) = custom {
                return Err(DefinitionError::invalid_option(
                    "Range",
                    option,
                    "cannot be used when both bounds are set, use \"not_in_range_message\"",
                ));
            }
        }
        let mut range = Self::new(min, max)?;
        range.not_in_range_message = options.not_in_range_message;
        range.min_message = options.min_message;
        range.max_message = options.max_message;
        range.invalid_message = options.invalid_message;
        range.groups = options.groups;
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, try_validate, validate, validate_in};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Value::from(10))]
    #[case(Value::from(15.5))]
    #[case(Value::from(20))]
    #[case(Value::from("10.0"))]
    fn within_range(#[case] value: Value) {
        assert_no_violation(&Range::between(10, 20), &value);
    }

    #[rstest]
    #[case(Value::from(9.999999), "9.999999")]
    #[case(Value::from(20.000001), "20.000001")]
    #[case(Value::from("9.999999"), "\"9.999999\"")]
    fn outside_range(#[case] value: Value, #[case] formatted: &str) {
        let violations = validate(&Range::between(10, 20), &value);
        assert_eq!(single_code(&violations), Range::NOT_IN_RANGE_ERROR);
        let violation = violations.get(0).unwrap();
        assert_eq!(violation.parameter("{{ value }}"), Some(formatted));
        assert_eq!(violation.message(), "This value should be between 10 and 20.");
    }

    #[test]
    fn single_bounds() {
        let violations = validate(&Range::at_least(10), &Value::from(5));
        assert_eq!(single_code(&violations), Range::TOO_LOW_ERROR);
        assert_eq!(violations.get(0).unwrap().message(), "This value should be 10 or more.");

        let violations = validate(&Range::at_most(20), &Value::from(25));
        assert_eq!(single_code(&violations), Range::TOO_HIGH_ERROR);
    }

    #[test]
    fn non_numeric_input() {
        let violations = validate(&Range::between(10, 20), &Value::from("abcd"));
        assert_eq!(single_code(&violations), Range::INVALID_CHARACTERS_ERROR);
        assert_eq!(violations.get(0).unwrap().parameter("{{ value }}"), Some("\"abcd\""));
    }

    #[test]
    fn dates_against_text_bounds() {
        let range = Range::between("2024-01-01", "2024-12-31");
        let inside = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let outside = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_no_violation(&range, &Value::from(inside));
        let violations = validate(&range, &Value::from(outside));
        assert_eq!(
            violations.get(0).unwrap().parameter("{{ max }}"),
            Some("2024-12-31 00:00:00")
        );

        let broken = Range::at_least("foo");
        assert!(try_validate(&broken, &Value::from(inside)).is_err());
    }

    #[test]
    fn property_path_bounds() {
        let object: Value = [
            ("low".to_owned(), Value::from(10)),
            ("high".to_owned(), Value::from(20)),
        ]
        .into_iter()
        .collect();
        let range = Range::new(
            Some(CompareTarget::PropertyPath("low".into())),
            Some(CompareTarget::PropertyPath("high".into())),
        )
        .unwrap();
        assert_no_violation(&range, &Value::from(15));
        let violations = validate_in(&range, &Value::from(25), &object);
        let violation = violations.get(0).unwrap();
        assert_eq!(violation.parameter("{{ min_limit_path }}"), Some("low"));
        assert_eq!(violation.parameter("{{ max_limit_path }}"), Some("high"));
    }

    #[test]
    fn options_are_checked() {
        assert!(Range::new(None, None).is_err());
        let err = serde_json::from_str::<Range>(r#"{"min": 1, "min_property_path": "a"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("cannot be used together"));
        let err = serde_json::from_str::<Range>(r#"{"min": 1, "max": 2, "min_message": "x"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("not_in_range_message"));
    }
}
