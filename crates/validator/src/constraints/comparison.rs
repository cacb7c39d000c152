//! Comparison family: a value against a literal or a sibling property.
//!
//! One [`Comparison`] constraint covers every operator; the operator picks
//! the relation, the default message and the error code.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::foundation::value::{Number, parse_datetime};
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value,
};

// ============================================================================
// OPERATORS
// ============================================================================

/// Relation checked by a [`Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Loose equality.
    EqualTo,
    /// Loose inequality.
    NotEqualTo,
    /// Same type and content.
    IdenticalTo,
    /// Different type or content.
    NotIdenticalTo,
    /// Strictly greater.
    GreaterThan,
    /// Greater or equal.
    GreaterThanOrEqual,
    /// Strictly less.
    LessThan,
    /// Less or equal.
    LessThanOrEqual,
    /// Numeric multiple.
    DivisibleBy,
}

impl ComparisonOperator {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::EqualTo => "EqualTo",
            Self::NotEqualTo => "NotEqualTo",
            Self::IdenticalTo => "IdenticalTo",
            Self::NotIdenticalTo => "NotIdenticalTo",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::DivisibleBy => "DivisibleBy",
        }
    }

    /// Error code raised when the relation does not hold.
    pub fn code(self) -> &'static str {
        match self {
            Self::EqualTo => Comparison::NOT_EQUAL_ERROR,
            Self::NotEqualTo => Comparison::IS_EQUAL_ERROR,
            Self::IdenticalTo => Comparison::NOT_IDENTICAL_ERROR,
            Self::NotIdenticalTo => Comparison::IS_IDENTICAL_ERROR,
            Self::GreaterThan => Comparison::TOO_LOW_ERROR,
            Self::GreaterThanOrEqual => Comparison::TOO_LOW_OR_EQUAL_ERROR,
            Self::LessThan => Comparison::TOO_HIGH_ERROR,
            Self::LessThanOrEqual => Comparison::TOO_HIGH_OR_EQUAL_ERROR,
            Self::DivisibleBy => Comparison::NOT_DIVISIBLE_BY_ERROR,
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::EqualTo => "This value should be equal to {{ compared_value }}.",
            Self::NotEqualTo => "This value should not be equal to {{ compared_value }}.",
            Self::IdenticalTo => {
                "This value should be identical to {{ compared_value_type }} {{ compared_value }}."
            }
            Self::NotIdenticalTo => {
                "This value should not be identical to {{ compared_value_type }} {{ compared_value }}."
            }
            Self::GreaterThan => "This value should be greater than {{ compared_value }}.",
            Self::GreaterThanOrEqual => {
                "This value should be greater than or equal to {{ compared_value }}."
            }
            Self::LessThan => "This value should be less than {{ compared_value }}.",
            Self::LessThanOrEqual => {
                "This value should be less than or equal to {{ compared_value }}."
            }
            Self::DivisibleBy => "This value should be a multiple of {{ compared_value }}.",
        }
    }

    /// Evaluates `value <op> compared`.
    pub fn holds(self, value: &Value, compared: &Value) -> Result<bool, ValidatorError> {
        let ordering = || value.loose_cmp(compared);
        Ok(match self {
            Self::EqualTo => value.loose_eq(compared),
            Self::NotEqualTo => !value.loose_eq(compared),
            Self::IdenticalTo => value.is_identical(compared),
            Self::NotIdenticalTo => !value.is_identical(compared),
            Self::GreaterThan => ordering() == Some(Ordering::Greater),
            Self::GreaterThanOrEqual => {
                matches!(ordering(), Some(Ordering::Greater | Ordering::Equal))
            }
            Self::LessThan => ordering() == Some(Ordering::Less),
            Self::LessThanOrEqual => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
            Self::DivisibleBy => {
                let dividend = value
                    .to_number()
                    .ok_or_else(|| ValidatorError::unexpected_type("numeric", value))?;
                let divisor = compared.to_number().ok_or_else(|| {
                    DefinitionError::invalid_option(
                        "DivisibleBy",
                        "value",
                        format!("{} is not numeric", compared.formatted()),
                    )
                })?;
                is_divisible(dividend, divisor)
            }
        })
    }
}

fn abs(number: Number) -> Number {
    match number {
        Number::Int(i) => i
            .checked_abs()
            .map_or(Number::Float((i as f64).abs()), Number::Int),
        Number::Float(f) => Number::Float(f.abs()),
    }
}

/// Multiple check that tolerates binary floating point: `4.1` is a multiple
/// of `0.1`, `4.15` is not.
fn is_divisible(dividend: Number, divisor: Number) -> bool {
    let (dividend, divisor) = (abs(dividend), abs(divisor));
    if divisor.as_f64() == 0.0 {
        return false;
    }
    if let (Number::Int(a), Number::Int(b)) = (dividend, divisor) {
        return a % b == 0;
    }

    let (a, b) = (dividend.as_f64(), divisor.as_f64());
    let remainder = a % b;
    if remainder == 0.0 {
        return true;
    }
    if matches!(divisor, Number::Float(_)) && b.is_finite() {
        let quotient = a / b;
        return format!("{quotient:.12e}") == format!("{:.12e}", quotient.round());
    }
    format!("{b:.12e}") == format!("{remainder:.12e}")
}

// ============================================================================
// COMPARISON CONSTRAINT
// ============================================================================

/// What the value is compared against.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareTarget {
    /// A fixed value.
    Value(Value),
    /// A property of the object being validated.
    PropertyPath(String),
}

/// Compares the value with a literal or with another property of the
/// validated object.
///
/// Null input is valid, as is a compared value that resolves to null.
///
/// # Examples
///
/// ```
/// use rampart_validator::constraints::{Comparison, ComparisonOperator};
/// use rampart_validator::foundation::Value;
/// use rampart_validator::Validator;
///
/// let adult = Comparison::new(ComparisonOperator::GreaterThanOrEqual, 18);
/// let violations = Validator::new().validate(&Value::from(17), &[adult.into()]).unwrap();
/// assert_eq!(
///     violations.get(0).unwrap().message(),
///     "This value should be greater than or equal to 18."
/// );
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ComparisonOptions")]
pub struct Comparison {
    operator: ComparisonOperator,
    target: CompareTarget,
    message: Option<String>,
    pub(crate) groups: Groups,
}

impl Comparison {
    crate::error_codes! {
        NOT_EQUAL_ERROR = "478618a7-95ba-473d-9101-cabd45e49115";
        IS_EQUAL_ERROR = "aa2e33da-25c8-4d76-8c6c-812f02ea89dd";
        NOT_IDENTICAL_ERROR = "2a8cc50f-58a2-4536-875e-060a2ce69ed5";
        IS_IDENTICAL_ERROR = "4aaac518-0dda-4129-a6d9-e216b9b454a0";
        TOO_LOW_ERROR = "778b7ae0-84d3-481a-9dec-35fdb64b1d78";
        TOO_LOW_OR_EQUAL_ERROR = "ea4e51d1-3342-48bd-87f1-9e672cd90cad";
        TOO_HIGH_ERROR = "079d7420-2d13-460c-8756-de810eeb37d2";
        TOO_HIGH_OR_EQUAL_ERROR = "30fbb013-d015-4232-8b3b-8f3be97a7e14";
        NOT_DIVISIBLE_BY_ERROR = "6d99d6c3-1464-4ccf-bdc7-14d083cf455c";
    }

    /// Compares against a literal.
    pub fn new(operator: ComparisonOperator, value: impl Into<Value>) -> Self {
        Self {
            operator,
            target: CompareTarget::Value(value.into()),
            message: None,
            groups: Groups::default(),
        }
    }

    /// Compares against another property of the validated object.
    pub fn with_property_path(operator: ComparisonOperator, path: impl Into<String>) -> Self {
        Self {
            operator,
            target: CompareTarget::PropertyPath(path.into()),
            message: None,
            groups: Groups::default(),
        }
    }

    /// `> 0`.
    pub fn positive() -> Self {
        Self::new(ComparisonOperator::GreaterThan, 0).with_message("This value should be positive.")
    }

    /// `>= 0`.
    pub fn positive_or_zero() -> Self {
        Self::new(ComparisonOperator::GreaterThanOrEqual, 0)
            .with_message("This value should be either positive or zero.")
    }

    /// `< 0`.
    pub fn negative() -> Self {
        Self::new(ComparisonOperator::LessThan, 0).with_message("This value should be negative.")
    }

    /// `<= 0`.
    pub fn negative_or_zero() -> Self {
        Self::new(ComparisonOperator::LessThanOrEqual, 0)
            .with_message("This value should be either negative or zero.")
    }

    /// Replaces the default message.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The relation.
    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    /// What the value is compared against.
    pub fn target(&self) -> &CompareTarget {
        &self.target
    }
}

impl Validate for Comparison {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if value.is_null() {
            return Ok(());
        }
        let compared = match &self.target {
            CompareTarget::Value(v) => v.clone(),
            CompareTarget::PropertyPath(path) => match ctx.object() {
                None => return Ok(()),
                Some(_) => ctx.resolve_property(self.operator.name(), path)?.clone(),
            },
        };
        if compared.is_null() {
            return Ok(());
        }

        let compared = match (value, &compared) {
            (Value::DateTime(_), Value::Text(text)) => parse_datetime(text)
                .map(Value::DateTime)
                .ok_or_else(|| {
                    DefinitionError::invalid_option(
                        self.operator.name(),
                        "value",
                        format!("the compared value \"{text}\" could not be converted to a date"),
                    )
                })?,
            _ => compared,
        };

        if self.operator.holds(value, &compared)? {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| self.operator.default_message().into());
        let mut builder = ctx
            .build_violation(message)
            .set_parameter("{{ value }}", value.formatted())
            .set_parameter("{{ compared_value }}", compared.formatted())
            .set_parameter("{{ compared_value_type }}", compared.type_name())
            .set_code(self.operator.code())
            .set_invalid_value(value.clone());
        if let CompareTarget::PropertyPath(path) = &self.target {
            builder = builder.set_parameter("{{ compared_value_path }}", path.clone());
        }
        builder.add_violation();
        Ok(())
    }
}

// ============================================================================
// RULE FILE FORM
// ============================================================================

/// Operator names accepted in rule files, including the sign shortcuts.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OperatorName {
    EqualTo,
    NotEqualTo,
    IdenticalTo,
    NotIdenticalTo,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    DivisibleBy,
    Positive,
    PositiveOrZero,
    Negative,
    NegativeOrZero,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComparisonOptions {
    operator: OperatorName,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    property_path: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    groups: Groups,
}

impl TryFrom<ComparisonOptions> for Comparison {
    type Error = DefinitionError;

    fn try_from(options: ComparisonOptions) -> Result<Self, Self::Error> {
        use ComparisonOperator as Op;

        let sign = match options.operator {
            OperatorName::Positive => Some(Self::positive()),
            OperatorName::PositiveOrZero => Some(Self::positive_or_zero()),
            OperatorName::Negative => Some(Self::negative()),
            OperatorName::NegativeOrZero => Some(Self::negative_or_zero()),
            _ => None,
        };

        let mut comparison = if let Some(sign) = sign {
            if options.value.is_some() || options.property_path.is_some() {
                return Err(DefinitionError::invalid_option(
                    sign.operator.name(),
                    "value",
                    "sign constraints compare against zero and take no value",
                ));
            }
            sign
        } else {
            let operator = match options.operator {
                OperatorName::EqualTo => Op::EqualTo,
                OperatorName::NotEqualTo => Op::NotEqualTo,
                OperatorName::IdenticalTo => Op::IdenticalTo,
                OperatorName::NotIdenticalTo => Op::NotIdenticalTo,
                OperatorName::GreaterThan => Op::GreaterThan,
                OperatorName::GreaterThanOrEqual => Op::GreaterThanOrEqual,
                OperatorName::LessThan => Op::LessThan,
                OperatorName::LessThanOrEqual => Op::LessThanOrEqual,
                _ => Op::DivisibleBy,
            };
            match (options.value, options.property_path) {
                (Some(_), Some(_)) => {
                    return Err(DefinitionError::ConflictingOptions {
                        constraint: operator.name(),
                        first: "value",
                        second: "property_path",
                    });
                }
                (Some(value), None) => Self::new(operator, value),
                (None, Some(path)) => Self::with_property_path(operator, path),
                (None, None) => {
                    return Err(DefinitionError::MissingOption {
                        constraint: operator.name(),
                        options: "\"value\" or \"property_path\"",
                    });
                }
            }
        };

        if options.message.is_some() {
            comparison.message = options.message;
        }
        comparison.groups = options.groups;
        Ok(comparison)
    }
}
