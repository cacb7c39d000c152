//! Size constraints: string length and collection count.

use serde::Deserialize;

use crate::constraints::basic::Normalizer;
use crate::constraints::comparison::ComparisonOperator;
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value,
};

// ============================================================================
// BOUNDS
// ============================================================================

/// Inclusive size bounds shared by [`Length`] and [`Count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    min: Option<usize>,
    max: Option<usize>,
}

impl SizeBounds {
    fn new(
        constraint: &'static str,
        min: Option<usize>,
        max: Option<usize>,
        exactly: Option<usize>,
    ) -> Result<Self, DefinitionError> {
        if let Some(exact) = exactly {
            if min.is_some() || max.is_some() {
                return Err(DefinitionError::ConflictingOptions {
                    constraint,
                    first: "exactly",
                    second: if min.is_some() { "min" } else { "max" },
                });
            }
            return Ok(Self {
                min: Some(exact),
                max: Some(exact),
            });
        }
        match (min, max) {
            (None, None) => Err(DefinitionError::MissingOption {
                constraint,
                options: "\"min\", \"max\" or \"exactly\"",
            }),
            (Some(min), Some(max)) if min > max => Err(DefinitionError::invalid_option(
                constraint,
                "min",
                format!("{min} is greater than max {max}"),
            )),
            _ => Ok(Self { min, max }),
        }
    }

    /// Lower bound.
    pub fn min(&self) -> Option<usize> {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    fn is_exact(&self) -> bool {
        self.min.is_some() && self.min == self.max
    }
}

// ============================================================================
// LENGTH
// ============================================================================

/// How [`Length`] measures a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountUnit {
    /// Unicode scalar values.
    #[default]
    Codepoints,
    /// UTF-8 bytes.
    Bytes,
}

/// String length within bounds. Null is valid; the empty string is measured
/// like any other.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "LengthOptions")]
pub struct Length {
    bounds: SizeBounds,
    unit: CountUnit,
    normalizer: Option<Normalizer>,
    min_message: Option<String>,
    max_message: Option<String>,
    exact_message: Option<String>,
    pub(crate) groups: Groups,
}

impl Length {
    crate::error_codes! {
        TOO_SHORT_ERROR = "9ff3fdc4-b214-49db-8718-39c315e33d45";
        TOO_LONG_ERROR = "d94b19cc-114f-4f44-9cc4-4138e80a87b9";
        NOT_EQUAL_LENGTH_ERROR = "4b6f5c76-22b4-409d-af16-fbe823ba9332";
    }

    const MIN_MESSAGE: &'static str = "This value is too short. It should have {{ limit }} character or more.|This value is too short. It should have {{ limit }} characters or more.";
    const MAX_MESSAGE: &'static str = "This value is too long. It should have {{ limit }} character or less.|This value is too long. It should have {{ limit }} characters or less.";
    const EXACT_MESSAGE: &'static str = "This value should have exactly {{ limit }} character.|This value should have exactly {{ limit }} characters.";

    fn with_bounds(bounds: SizeBounds) -> Self {
        Self {
            bounds,
            unit: CountUnit::default(),
            normalizer: None,
            min_message: None,
            max_message: None,
            exact_message: None,
            groups: Groups::default(),
        }
    }

    /// At least `min` and at most `max` characters.
    pub fn between(min: usize, max: usize) -> Result<Self, DefinitionError> {
        SizeBounds::new("Length", Some(min), Some(max), None).map(Self::with_bounds)
    }

    /// At least `min` characters.
    pub fn min(min: usize) -> Self {
        Self::with_bounds(SizeBounds {
            min: Some(min),
            max: None,
        })
    }

    /// At most `max` characters.
    pub fn max(max: usize) -> Self {
        Self::with_bounds(SizeBounds {
            min: None,
            max: Some(max),
        })
    }

    /// Exactly `length` characters.
    pub fn exactly(length: usize) -> Self {
        Self::with_bounds(SizeBounds {
            min: Some(length),
            max: Some(length),
        })
    }

    /// Measures bytes instead of characters.
    #[must_use = "builder methods must be chained or built"]
    pub fn in_bytes(mut self) -> Self {
        self.unit = CountUnit::Bytes;
        self
    }

    /// Trims before measuring.
    #[must_use = "builder methods must be chained or built"]
    pub fn trimmed(mut self) -> Self {
        self.normalizer = Some(Normalizer::Trim);
        self
    }

    /// The configured bounds.
    pub fn bounds(&self) -> SizeBounds {
        self.bounds
    }
}

impl Validate for Length {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if value.is_null() {
            return Ok(());
        }
        let text = value
            .to_text()
            .ok_or_else(|| ValidatorError::unexpected_type("string", value))?;
        let text = match self.normalizer {
            Some(normalizer) => normalizer.apply(&text),
            None => text.as_ref(),
        };
        let length = match self.unit {
            CountUnit::Codepoints => text.chars().count(),
            CountUnit::Bytes => text.len(),
        };

        let exact = self.bounds.is_exact();
        let failed = match (self.bounds.max, self.bounds.min) {
            (Some(max), _) if length > max => Some((
                max,
                self.max_message.as_deref(),
                Self::MAX_MESSAGE,
                Self::TOO_LONG_ERROR,
            )),
            (_, Some(min)) if length < min => Some((
                min,
                self.min_message.as_deref(),
                Self::MIN_MESSAGE,
                Self::TOO_SHORT_ERROR,
            )),
            _ => None,
        };
        if let Some((limit, custom, default, code)) = failed {
            let (message, code) = if exact {
                (
                    self.exact_message
                        .clone()
                        .unwrap_or_else(|| Self::EXACT_MESSAGE.into()),
                    Self::NOT_EQUAL_LENGTH_ERROR,
                )
            } else {
                (custom.map_or_else(|| default.to_owned(), str::to_owned), code)
            };
            ctx.build_violation(message)
                .set_parameter("{{ value }}", value.formatted())
                .set_parameter("{{ limit }}", limit.to_string())
                .set_parameter("{{ value_length }}", length.to_string())
                .set_plural(limit as u64)
                .set_code(code)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LengthOptions {
    min: Option<usize>,
    max: Option<usize>,
    #[serde(alias = "exact")]
    exactly: Option<usize>,
    unit: CountUnit,
    normalizer: Option<Normalizer>,
    min_message: Option<String>,
    max_message: Option<String>,
    exact_message: Option<String>,
    groups: Groups,
}

impl TryFrom<LengthOptions> for Length {
    type Error = DefinitionError;

    fn try_from(options: LengthOptions) -> Result<Self, Self::Error> {
        let bounds = SizeBounds::new("Length", options.min, options.max, options.exactly)?;
        Ok(Self {
            bounds,
            unit: options.unit,
            normalizer: options.normalizer,
            min_message: options.min_message,
            max_message: options.max_message,
            exact_message: options.exact_message,
            groups: options.groups,
        })
    }
}

// ============================================================================
// COUNT
// ============================================================================

/// Number of elements of an array or object within bounds, optionally a
/// multiple of `divisible_by`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "CountOptions")]
pub struct Count {
    bounds: Option<SizeBounds>,
    divisible_by: Option<usize>,
    min_message: Option<String>,
    max_message: Option<String>,
    exact_message: Option<String>,
    divisible_by_message: Option<String>,
    pub(crate) groups: Groups,
}

impl Count {
    crate::error_codes! {
        TOO_FEW_ERROR = "bef8e338-6ae5-4caf-b8e2-50e7b0579e69";
        TOO_MANY_ERROR = "756b1212-697c-468d-a9ad-50dd783bb169";
        NOT_EQUAL_COUNT_ERROR = "9fe5d43f-3784-4ece-a0e1-473fc02dadbc";
    }

    /// Same code as [`Comparison::NOT_DIVISIBLE_BY_ERROR`](crate::constraints::Comparison::NOT_DIVISIBLE_BY_ERROR).
    pub const NOT_DIVISIBLE_BY_ERROR: &'static str = "6d99d6c3-1464-4ccf-bdc7-14d083cf455c";

    const MIN_MESSAGE: &'static str = "This collection should contain {{ limit }} element or more.|This collection should contain {{ limit }} elements or more.";
    const MAX_MESSAGE: &'static str = "This collection should contain {{ limit }} element or less.|This collection should contain {{ limit }} elements or less.";
    const EXACT_MESSAGE: &'static str = "This collection should contain exactly {{ limit }} element.|This collection should contain exactly {{ limit }} elements.";
    const DIVISIBLE_BY_MESSAGE: &'static str =
        "The number of elements in this collection should be a multiple of {{ compared_value }}.";

    fn with_bounds(bounds: SizeBounds) -> Self {
        Self {
            bounds: Some(bounds),
            divisible_by: None,
            min_message: None,
            max_message: None,
            exact_message: None,
            divisible_by_message: None,
            groups: Groups::default(),
        }
    }

    /// Between `min` and `max` elements.
    pub fn between(min: usize, max: usize) -> Result<Self, DefinitionError> {
        SizeBounds::new("Count", Some(min), Some(max), None).map(Self::with_bounds)
    }

    /// At least `min` elements.
    pub fn min(min: usize) -> Self {
        Self::with_bounds(SizeBounds {
            min: Some(min),
            max: None,
        })
    }

    /// At most `max` elements.
    pub fn max(max: usize) -> Self {
        Self::with_bounds(SizeBounds {
            min: None,
            max: Some(max),
        })
    }

    /// Exactly `count` elements.
    pub fn exactly(count: usize) -> Self {
        Self::with_bounds(SizeBounds {
            min: Some(count),
            max: Some(count),
        })
    }

    /// Element count must be a multiple of `divisor`.
    pub fn divisible_by(divisor: usize) -> Self {
        Self {
            bounds: None,
            divisible_by: Some(divisor),
            min_message: None,
            max_message: None,
            exact_message: None,
            divisible_by_message: None,
            groups: Groups::default(),
        }
    }
}

impl Validate for Count {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if value.is_null() {
            return Ok(());
        }
        let count = value
            .len()
            .ok_or_else(|| ValidatorError::unexpected_type("countable", value))?;

        if let Some(bounds) = self.bounds {
            let exact = bounds.is_exact();
            let failed = match (bounds.max, bounds.min) {
                (Some(max), _) if count > max => Some((
                    max,
                    self.max_message.as_deref(),
                    Self::MAX_MESSAGE,
                    Self::TOO_MANY_ERROR,
                )),
                (_, Some(min)) if count < min => Some((
                    min,
                    self.min_message.as_deref(),
                    Self::MIN_MESSAGE,
                    Self::TOO_FEW_ERROR,
                )),
                _ => None,
            };
            if let Some((limit, custom, default, code)) = failed {
                let (message, code) = if exact {
                    (
                        self.exact_message
                            .clone()
                            .unwrap_or_else(|| Self::EXACT_MESSAGE.into()),
                        Self::NOT_EQUAL_COUNT_ERROR,
                    )
                } else {
                    (custom.map_or_else(|| default.to_owned(), str::to_owned), code)
                };
                ctx.build_violation(message)
                    .set_parameter("{{ count }}", count.to_string())
                    .set_parameter("{{ limit }}", limit.to_string())
                    .set_plural(limit as u64)
                    .set_code(code)
                    .set_invalid_value(value.clone())
                    .add_violation();
                return Ok(());
            }
        }

        if let Some(divisor) = self.divisible_by {
            let divisible = ComparisonOperator::DivisibleBy
                .holds(&Value::from(count as i64), &Value::from(divisor as i64))?;
            if !divisible {
                ctx.build_violation(
                    self.divisible_by_message
                        .clone()
                        .unwrap_or_else(|| Self::DIVISIBLE_BY_MESSAGE.into()),
                )
                .set_parameter("{{ value }}", count.to_string())
                .set_parameter("{{ compared_value }}", divisor.to_string())
                .set_parameter("{{ compared_value_type }}", "int")
                .set_code(Self::NOT_DIVISIBLE_BY_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CountOptions {
    min: Option<usize>,
    max: Option<usize>,
    #[serde(alias = "exact")]
    exactly: Option<usize>,
    divisible_by: Option<usize>,
    min_message: Option<String>,
    max_message: Option<String>,
    exact_message: Option<String>,
    divisible_by_message: Option<String>,
    groups: Groups,
}

impl TryFrom<CountOptions> for Count {
    type Error = DefinitionError;

    fn try_from(options: CountOptions) -> Result<Self, Self::Error> {
        let bounds = if options.min.is_none()
            && options.max.is_none()
            && options.exactly.is_none()
            && options.divisible_by.is_some()
        {
            None
        } else {
            Some(SizeBounds::new(
                "Count",
                options.min,
                options.max,
                options.exactly,
            )?)
        };
        Ok(Self {
            bounds,
            divisible_by: options.divisible_by,
            min_message: options.min_message,
            max_message: options.max_message,
            exact_message: options.exact_message,
            divisible_by_message: options.divisible_by_message,
            groups: options.groups,
        })
    }
}
