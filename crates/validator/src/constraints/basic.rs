//! Presence, boolean, type and choice constraints.

use serde::Deserialize;

use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value};

// ============================================================================
// NOT BLANK / BLANK
// ============================================================================

/// Normalisation applied to strings before a blank check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalizer {
    /// Strip leading and trailing whitespace.
    Trim,
}

impl Normalizer {
    pub(crate) fn apply(self, text: &str) -> &str {
        match self {
            Self::Trim => text.trim(),
        }
    }
}

/// The value must not be `false`, null, the empty string, or an empty
/// collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotBlank {
    /// Accept null.
    pub allow_null: bool,
    /// Applied to strings before the check.
    pub normalizer: Option<Normalizer>,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl NotBlank {
    crate::error_codes! {
        IS_BLANK_ERROR = "c1051bb4-d103-4f74-8988-acbcafc7fdc3";
    }

    const MESSAGE: &'static str = "This value should not be blank.";

    /// Also accepts null.
    #[must_use = "builder methods must be chained or built"]
    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Trims strings before checking.
    #[must_use = "builder methods must be chained or built"]
    pub fn trimmed(mut self) -> Self {
        self.normalizer = Some(Normalizer::Trim);
        self
    }
}

impl Validate for NotBlank {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if self.allow_null && value.is_null() {
            return Ok(());
        }
        let blank = match value {
            Value::Null | Value::Bool(false) => true,
            Value::Text(text) => match self.normalizer {
                Some(normalizer) => normalizer.apply(text).is_empty(),
                None => text.is_empty(),
            },
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if blank {
            ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_code(Self::IS_BLANK_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}

/// The value must be null or the empty string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Blank {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Blank {
    crate::error_codes! {
        NOT_BLANK_ERROR = "183ad2de-533d-4796-a439-6d3c3852b549";
    }

    const MESSAGE: &'static str = "This value should be blank.";
}

impl Validate for Blank {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if !value.is_null() && !value.is_empty_text() {
            ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_code(Self::NOT_BLANK_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}

// ============================================================================
// NULL CHECKS
// ============================================================================

/// The value must not be null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotNull {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl NotNull {
    crate::error_codes! {
        IS_NULL_ERROR = "ad32d13f-c3d4-423b-909a-857b961eb720";
    }

    const MESSAGE: &'static str = "This value should not be null.";
}

impl Validate for NotNull {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if value.is_null() {
            ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_code(Self::IS_NULL_ERROR)
                .add_violation();
        }
        Ok(())
    }
}

/// The value must be null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IsNull {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl IsNull {
    crate::error_codes! {
        NOT_NULL_ERROR = "60d2f30b-8cfa-4372-b155-9656634de120";
    }

    const MESSAGE: &'static str = "This value should be null.";
}

impl Validate for IsNull {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if !value.is_null() {
            ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_code(Self::NOT_NULL_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}

// ============================================================================
// BOOLEANS
// ============================================================================

/// The value must be `true`, `1` or `"1"`. Null is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IsTrue {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl IsTrue {
    crate::error_codes! {
        NOT_TRUE_ERROR = "2beabf1c-54c0-4882-a928-05249b26e23b";
    }

    const MESSAGE: &'static str = "This value should be true.";
}

impl Validate for IsTrue {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let accepted = match value {
            Value::Null | Value::Bool(true) | Value::Integer(1) => true,
            Value::Text(text) => text == "1",
            _ => false,
        };
        if !accepted {
            ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_code(Self::NOT_TRUE_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}

/// The value must be `false`, `0` or `"0"`. Null is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IsFalse {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl IsFalse {
    crate::error_codes! {
        NOT_FALSE_ERROR = "d53a91b0-def3-426a-83d7-269da7ab4200";
    }

    const MESSAGE: &'static str = "This value should be false.";
}

impl Validate for IsFalse {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let accepted = match value {
            Value::Null | Value::Bool(false) | Value::Integer(0) => true,
            Value::Text(text) => text == "0",
            _ => false,
        };
        if !accepted {
            ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
                .set_parameter("{{ value }}", value.formatted())
                .set_code(Self::NOT_FALSE_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}

// ============================================================================
// TYPE
// ============================================================================

/// Type names understood by [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    /// Null.
    Null,
    /// Boolean.
    #[serde(alias = "boolean")]
    Bool,
    /// Integer.
    #[serde(alias = "integer", alias = "long")]
    Int,
    /// Float.
    #[serde(alias = "double", alias = "real")]
    Float,
    /// Number or numeric string.
    Numeric,
    /// String.
    String,
    /// Any scalar.
    Scalar,
    /// List.
    Array,
    /// Keyed record.
    Object,
    /// List or keyed record.
    Iterable,
    /// Date-time.
    #[serde(alias = "date")]
    DateTime,
    /// String of ASCII digits.
    Digit,
    /// String of ASCII letters.
    Alpha,
    /// String of ASCII letters and digits.
    Alnum,
    /// String of lowercase ASCII letters.
    Lower,
    /// String of uppercase ASCII letters.
    Upper,
    /// String of whitespace.
    Space,
    /// String of hexadecimal digits.
    Xdigit,
    /// String of printable, non-alphanumeric ASCII characters.
    Punct,
}

impl TypeName {
    /// Name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Scalar => "scalar",
            Self::Array => "array",
            Self::Object => "object",
            Self::Iterable => "iterable",
            Self::DateTime => "datetime",
            Self::Digit => "digit",
            Self::Alpha => "alpha",
            Self::Alnum => "alnum",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Space => "space",
            Self::Xdigit => "xdigit",
            Self::Punct => "punct",
        }
    }

    fn matches(self, value: &Value) -> bool {
        let chars = |pred: fn(&u8) -> bool| {
            matches!(value, Value::Text(s) if !s.is_empty() && s.as_bytes().iter().all(pred))
        };
        match self {
            Self::Null => value.is_null(),
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Int => matches!(value, Value::Integer(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Numeric => value.is_numeric(),
            Self::String => matches!(value, Value::Text(_)),
            Self::Scalar => matches!(
                value,
                Value::Bool(_) | Value::Integer(_) | Value::Float(_) | Value::Text(_)
            ),
            Self::Array => matches!(value, Value::Array(_)),
            Self::Object => matches!(value, Value::Object(_)),
            Self::Iterable => matches!(value, Value::Array(_) | Value::Object(_)),
            Self::DateTime => matches!(value, Value::DateTime(_)),
            Self::Digit => chars(u8::is_ascii_digit),
            Self::Alpha => chars(u8::is_ascii_alphabetic),
            Self::Alnum => chars(u8::is_ascii_alphanumeric),
            Self::Lower => chars(u8::is_ascii_lowercase),
            Self::Upper => chars(u8::is_ascii_uppercase),
            Self::Space => chars(u8::is_ascii_whitespace),
            Self::Xdigit => chars(u8::is_ascii_hexdigit),
            Self::Punct => chars(u8::is_ascii_punctuation),
        }
    }
}

/// The value must match at least one of the listed types. Null is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Type {
    /// Accepted types.
    #[serde(deserialize_with = "one_or_many")]
    pub types: Vec<TypeName>,
    /// Message override.
    #[serde(default)]
    pub message: Option<String>,
    /// Validation groups.
    #[serde(default)]
    pub groups: Groups,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<TypeName>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(TypeName),
        Many(Vec<TypeName>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(one) => vec![one],
        OneOrMany::Many(many) => many,
    })
}

impl Type {
    crate::error_codes! {
        INVALID_TYPE_ERROR = "ba785a8c-82cb-4283-967c-3cf342181b40";
    }

    const MESSAGE: &'static str = "This value should be of type {{ type }}.";

    /// Accepts any of `types`.
    pub fn new(types: impl IntoIterator<Item = TypeName>) -> Self {
        Self {
            types: types.into_iter().collect(),
            message: None,
            groups: Groups::default(),
        }
    }
}

impl Validate for Type {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if value.is_null() || self.types.iter().any(|t| t.matches(value)) {
            return Ok(());
        }
        let names: Vec<&str> = self.types.iter().map(|t| t.as_str()).collect();
        ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
            .set_parameter("{{ value }}", value.formatted())
            .set_parameter("{{ type }}", names.join("|"))
            .set_code(Self::INVALID_TYPE_ERROR)
            .set_invalid_value(value.clone())
            .add_violation();
        Ok(())
    }
}

// ============================================================================
// CHOICE
// ============================================================================

/// The value (or each element when `multiple`) must be one of `choices`,
/// compared strictly. With `match_choices = false` the logic is inverted.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Choice {
    /// Allowed values.
    pub choices: Vec<Value>,
    /// Validate a list of selections.
    #[serde(default)]
    pub multiple: bool,
    /// Minimum selections when `multiple`.
    #[serde(default)]
    pub min: Option<usize>,
    /// Maximum selections when `multiple`.
    #[serde(default)]
    pub max: Option<usize>,
    /// `false` turns the list into a deny list.
    #[serde(default = "default_true", rename = "match")]
    pub match_choices: bool,
    /// Message override for a single value.
    #[serde(default)]
    pub message: Option<String>,
    /// Message override for a list element.
    #[serde(default)]
    pub multiple_message: Option<String>,
    /// Message override for too few selections.
    #[serde(default)]
    pub min_message: Option<String>,
    /// Message override for too many selections.
    #[serde(default)]
    pub max_message: Option<String>,
    /// Validation groups.
    #[serde(default)]
    pub groups: Groups,
}

const fn default_true() -> bool {
    true
}

impl Choice {
    crate::error_codes! {
        NO_SUCH_CHOICE_ERROR = "8e179f1b-97aa-4560-a02f-2a8b42e49df7";
        TOO_FEW_ERROR = "11edd7eb-5872-4b6e-9f12-89923999fd0e";
        TOO_MANY_ERROR = "9bd98e49-211c-433f-8630-fd1c2b0ae2c9";
    }

    const MESSAGE: &'static str = "The value you selected is not a valid choice.";
    const MULTIPLE_MESSAGE: &'static str = "One or more of the given values is invalid.";
    const MIN_MESSAGE: &'static str =
        "You must select at least {{ limit }} choice.|You must select at least {{ limit }} choices.";
    const MAX_MESSAGE: &'static str =
        "You must select at most {{ limit }} choice.|You must select at most {{ limit }} choices.";

    /// Single-value choice among `choices`.
    pub fn new<I, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            multiple: false,
            min: None,
            max: None,
            match_choices: true,
            message: None,
            multiple_message: None,
            min_message: None,
            max_message: None,
            groups: Groups::default(),
        }
    }

    /// Validates a list of selections.
    #[must_use = "builder methods must be chained or built"]
    pub fn multiple(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.multiple = true;
        self.min = min;
        self.max = max;
        self
    }

    /// Turns the list into a deny list.
    #[must_use = "builder methods must be chained or built"]
    pub fn excluding(mut self) -> Self {
        self.match_choices = false;
        self
    }

    fn accepts(&self, value: &Value) -> bool {
        self.choices.iter().any(|c| c.is_identical(value)) == self.match_choices
    }

    fn choices_param(&self) -> String {
        self.choices
            .iter()
            .map(Value::formatted)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Validate for Choice {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        if value.is_null() {
            return Ok(());
        }

        if !self.multiple {
            if !self.accepts(value) {
                ctx.build_violation(self.message.clone().unwrap_or_else(|| Self::MESSAGE.into()))
                    .set_parameter("{{ value }}", value.formatted())
                    .set_parameter("{{ choices }}", self.choices_param())
                    .set_code(Self::NO_SUCH_CHOICE_ERROR)
                    .set_invalid_value(value.clone())
                    .add_violation();
            }
            return Ok(());
        }

        let Value::Array(selected) = value else {
            return Err(ValidatorError::unexpected_type("array", value));
        };

        if let Some(bad) = selected.iter().find(|item| !self.accepts(item)) {
            ctx.build_violation(
                self.multiple_message
                    .clone()
                    .unwrap_or_else(|| Self::MULTIPLE_MESSAGE.into()),
            )
            .set_parameter("{{ value }}", bad.formatted())
            .set_parameter("{{ choices }}", self.choices_param())
            .set_code(Self::NO_SUCH_CHOICE_ERROR)
            .set_invalid_value(bad.clone())
            .add_violation();
            return Ok(());
        }

        let count = selected.len();
        if let Some(min) = self.min.filter(|&min| count < min) {
            ctx.build_violation(self.min_message.clone().unwrap_or_else(|| Self::MIN_MESSAGE.into()))
                .set_parameter("{{ limit }}", min.to_string())
                .set_plural(min as u64)
                .set_code(Self::TOO_FEW_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
            return Ok(());
        }
        if let Some(max) = self.max.filter(|&max| count > max) {
            ctx.build_violation(self.max_message.clone().unwrap_or_else(|| Self::MAX_MESSAGE.into()))
                .set_parameter("{{ limit }}", max.to_string())
                .set_plural(max as u64)
                .set_code(Self::TOO_MANY_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, validate};
    use rstest::rstest;

    #[rstest]
    #[case(Value::Null)]
    #[case(Value::from(false))]
    #[case(Value::from(""))]
    #[case(Value::Array(vec![]))]
    fn not_blank_rejects(#[case] value: Value) {
        let violations = validate(&NotBlank::default(), &value);
        assert_eq!(single_code(&violations), NotBlank::IS_BLANK_ERROR);
    }

    #[rstest]
    #[case(Value::from("0"))]
    #[case(Value::from(0))]
    #[case(Value::from(0.0))]
    #[case(Value::from(true))]
    #[case(Value::from(" "))]
    fn not_blank_accepts(#[case] value: Value) {
        assert_no_violation(&NotBlank::default(), &value);
    }

    #[test]
    fn not_blank_options() {
        assert_no_violation(&NotBlank::default().allow_null(), &Value::Null);
        let violations = validate(&NotBlank::default().trimmed(), &Value::from("  \t"));
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations.get(0).unwrap().message(),
            "This value should not be blank."
        );
    }

    #[test]
    fn blank_and_null_checks() {
        assert_no_violation(&Blank::default(), &Value::from(""));
        assert_no_violation(&Blank::default(), &Value::Null);
        let violations = validate(&Blank::default(), &Value::from("x"));
        assert_eq!(single_code(&violations), Blank::NOT_BLANK_ERROR);

        assert_no_violation(&NotNull::default(), &Value::from(""));
        assert_eq!(
            single_code(&validate(&NotNull::default(), &Value::Null)),
            NotNull::IS_NULL_ERROR
        );
        assert_no_violation(&IsNull::default(), &Value::Null);
        assert_eq!(
            single_code(&validate(&IsNull::default(), &Value::from(0))),
            IsNull::NOT_NULL_ERROR
        );
    }

    #[rstest]
    #[case(Value::from(true), true)]
    #[case(Value::from(1), true)]
    #[case(Value::from("1"), true)]
    #[case(Value::Null, true)]
    #[case(Value::from(false), false)]
    #[case(Value::from(2), false)]
    #[case(Value::from("true"), false)]
    fn is_true(#[case] value: Value, #[case] valid: bool) {
        assert_eq!(validate(&IsTrue::default(), &value).is_empty(), valid);
    }

    #[rstest]
    #[case(Value::from(false), true)]
    #[case(Value::from(0), true)]
    #[case(Value::from("0"), true)]
    #[case(Value::from(true), false)]
    #[case(Value::from(""), false)]
    fn is_false(#[case] value: Value, #[case] valid: bool) {
        assert_eq!(validate(&IsFalse::default(), &value).is_empty(), valid);
    }

    #[test]
    fn type_lists_expected_names() {
        let constraint = Type::new([TypeName::Int, TypeName::Numeric]);
        assert_no_violation(&constraint, &Value::from("12.5"));
        let violations = validate(&constraint, &Value::from("abc"));
        let violation = violations.get(0).unwrap();
        assert_eq!(violation.message(), "This value should be of type int|numeric.");
        assert_eq!(violation.code(), Some(Type::INVALID_TYPE_ERROR));
    }

    #[test]
    fn type_character_classes() {
        assert_no_violation(&Type::new([TypeName::Digit]), &Value::from("0123"));
        assert!(!validate(&Type::new([TypeName::Digit]), &Value::from("12a")).is_empty());
        assert!(!validate(&Type::new([TypeName::Lower]), &Value::from("abC")).is_empty());
        assert_no_violation(&Type::new([TypeName::Xdigit]), &Value::from("c0ffee"));
    }

    #[test]
    fn type_deserializes_single_name() {
        let constraint: Type = serde_json::from_str(r#"{"types": "integer"}"#).unwrap();
        assert_eq!(constraint.types, vec![TypeName::Int]);
    }

    #[test]
    fn choice_is_strict() {
        let choice = Choice::new(["a", "b"]);
        assert_no_violation(&choice, &Value::from("a"));
        let violations = validate(&Choice::new([1, 2]), &Value::from("1"));
        assert_eq!(single_code(&violations), Choice::NO_SUCH_CHOICE_ERROR);
        assert_eq!(
            violations.get(0).unwrap().parameter("{{ choices }}"),
            Some("1, 2")
        );
    }

    #[test]
    fn choice_inverted() {
        let deny = Choice::new(["root"]).excluding();
        assert_no_violation(&deny, &Value::from("alice"));
        assert!(!validate(&deny, &Value::from("root")).is_empty());
    }

    #[test]
    fn choice_multiple_limits() {
        let choice = Choice::new(["a", "b", "c"]).multiple(Some(2), Some(2));
        assert_no_violation(&choice, &Value::from(vec!["a", "b"]));

        let too_few = validate(&choice, &Value::from(vec!["a"]));
        assert_eq!(single_code(&too_few), Choice::TOO_FEW_ERROR);
        assert_eq!(
            too_few.get(0).unwrap().message(),
            "You must select at least 2 choices."
        );

        let too_many = validate(&choice, &Value::from(vec!["a", "b", "c"]));
        assert_eq!(single_code(&too_many), Choice::TOO_MANY_ERROR);

        let bad = validate(&choice, &Value::from(vec!["a", "z"]));
        assert_eq!(bad.get(0).unwrap().parameter("{{ value }}"), Some("\"z\""));
    }

    #[test]
    fn choice_multiple_requires_array() {
        let choice = Choice::new(["a"]).multiple(None, None);
        let err = crate::testing::try_validate(&choice, &Value::from("a")).unwrap_err();
        assert!(matches!(err, ValidatorError::UnexpectedType { expected: "array", .. }));
    }
}
