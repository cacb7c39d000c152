//! Date and time strings.

mod layout;

use serde::Deserialize;

use self::layout::{Layout, Mismatch};
use crate::constraints::report;
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value, text_input,
};

/// Text of a temporal value, or `None` when there is nothing to check.
/// Date-time values are already valid.
fn temporal_text(value: &Value) -> Result<Option<std::borrow::Cow<'_, str>>, ValidatorError> {
    if matches!(value, Value::DateTime(_)) {
        return Ok(None);
    }
    text_input(value)
}

/// Parses exactly `N` two-digit groups separated by `separator`.
fn two_digit_groups<const N: usize>(text: &str, separator: char) -> Option<[u32; N]> {
    let mut groups = [0; N];
    let mut parts = text.split(separator);
    for slot in &mut groups {
        let part = parts.next()?;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    parts.next().is_none().then_some(groups)
}

// ============================================================================
// DATE
// ============================================================================

/// The value must be a `YYYY-MM-DD` calendar date.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Date {
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Date {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "69819696-02ac-4a99-9ff0-14e127c4d1bc";
        INVALID_DATE_ERROR = "3c184ce5-b31d-4de7-8b76-326da7b2be93";
    }

    const MESSAGE: &'static str = "This value is not a valid date.";

    fn check(text: &str) -> Result<(), &'static str> {
        let (year, rest) = text.split_at_checked(4).ok_or(Self::INVALID_FORMAT_ERROR)?;
        let [month, day] = rest
            .strip_prefix('-')
            .and_then(|rest| two_digit_groups::<2>(rest, '-'))
            .ok_or(Self::INVALID_FORMAT_ERROR)?;
        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Self::INVALID_FORMAT_ERROR);
        }
        let year: i32 = year.parse().map_err(|_| Self::INVALID_FORMAT_ERROR)?;
        chrono::NaiveDate::from_ymd_opt(year, month, day)
            .map(|_| ())
            .ok_or(Self::INVALID_DATE_ERROR)
    }
}

impl Validate for Date {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = temporal_text(value)? else {
            return Ok(());
        };
        if let Err(code) = Self::check(&text) {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
        }
        Ok(())
    }
}

// ============================================================================
// TIME
// ============================================================================

/// The value must be an `HH:MM:SS` (or, without seconds, `HH:MM`) time of
/// day.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Time {
    /// Require the seconds group.
    pub with_seconds: bool,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            with_seconds: true,
            message: None,
            groups: Groups::default(),
        }
    }
}

impl Time {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "9d27b2bb-f755-4fbf-b725-39b1edbdebdf";
        INVALID_TIME_ERROR = "8532f9e1-84b2-4d67-8989-0818bc38533b";
    }

    const MESSAGE: &'static str = "This value is not a valid time.";

    /// `HH:MM` only.
    #[must_use = "builder methods must be chained or built"]
    pub fn without_seconds(mut self) -> Self {
        self.with_seconds = false;
        self
    }

    fn check(&self, text: &str) -> Result<(), &'static str> {
        let groups = if self.with_seconds {
            two_digit_groups::<3>(text, ':')
        } else {
            two_digit_groups::<2>(text, ':').map(|[h, m]| [h, m, 0])
        };
        let [hour, minute, second] = groups.ok_or(Self::INVALID_FORMAT_ERROR)?;
        if hour > 23 || minute > 59 || second > 59 {
            return Err(Self::INVALID_TIME_ERROR);
        }
        Ok(())
    }
}

impl Validate for Time {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = temporal_text(value)? else {
            return Ok(());
        };
        if let Err(code) = self.check(&text) {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, code);
        }
        Ok(())
    }
}

// ============================================================================
// DATE TIME
// ============================================================================

/// The value must match a date-time layout, `Y-m-d H:i:s` by default.
///
/// Layout letters: `Y` `y` year, `m` `n` month, `M` `F` month name, `d` `j`
/// day, `D` `l` weekday name, `S` ordinal suffix, `z` day of year, `H` `G`
/// 24-hour, `h` `g` 12-hour, `a` `A` meridiem, `i` minutes, `s` seconds,
/// `v` milliseconds, `u` microseconds, `P` `p` `O` offset, `e` `T` zone,
/// `U` Unix timestamp. A space matches any run of whitespace, `#` one
/// separator, `?` any character, `*` anything up to the next separator or
/// digit, `+` ignores trailing text, and `\` escapes a letter.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "DateTimeOptions")]
pub struct DateTime {
    format: String,
    layout: Layout,
    message: Option<String>,
    pub(crate) groups: Groups,
}

impl Default for DateTime {
    fn default() -> Self {
        Self {
            format: Self::DEFAULT_FORMAT.to_owned(),
            layout: Layout::new(Self::DEFAULT_FORMAT),
            message: None,
            groups: Groups::default(),
        }
    }
}

impl DateTime {
    crate::error_codes! {
        INVALID_FORMAT_ERROR = "1a9da513-2640-4f84-9b6a-4d99dcddc628";
        INVALID_DATE_ERROR = "d52afa47-620d-4d99-9f08-f4d85b36e33c";
        INVALID_TIME_ERROR = "5e797c9d-74f7-4098-baa3-94390c447b27";
    }

    const MESSAGE: &'static str = "This value is not a valid datetime.";

    /// Layout used when none is configured.
    pub const DEFAULT_FORMAT: &'static str = "Y-m-d H:i:s";

    /// Values must match `format`.
    pub fn new(format: impl Into<String>) -> Result<Self, DefinitionError> {
        Self::try_from(DateTimeOptions {
            format: Some(format.into()),
            ..DateTimeOptions::default()
        })
    }

    /// Message override.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The layout as configured.
    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Validate for DateTime {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = temporal_text(value)? else {
            return Ok(());
        };
        let code = match self.layout.check(&text) {
            Ok(()) => return Ok(()),
            Err(Mismatch::Format) => Self::INVALID_FORMAT_ERROR,
            Err(Mismatch::Date) => Self::INVALID_DATE_ERROR,
            Err(Mismatch::Time) => Self::INVALID_TIME_ERROR,
        };
        ctx.build_violation(
            self.message
                .clone()
                .unwrap_or_else(|| Self::MESSAGE.into()),
        )
        .set_parameter("{{ value }}", value.formatted())
        .set_parameter("{{ format }}", Value::from(self.format.as_str()).formatted())
        .set_code(code)
        .set_invalid_value(value.clone())
        .add_violation();
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DateTimeOptions {
    format: Option<String>,
    message: Option<String>,
    groups: Groups,
}

impl TryFrom<DateTimeOptions> for DateTime {
    type Error = DefinitionError;

    fn try_from(options: DateTimeOptions) -> Result<Self, Self::Error> {
        let format = options
            .format
            .unwrap_or_else(|| Self::DEFAULT_FORMAT.to_owned());
        if format.is_empty() {
            return Err(DefinitionError::invalid_option(
                "DateTime",
                "format",
                "the layout must not be empty",
            ));
        }
        Ok(Self {
            layout: Layout::new(&format),
            format,
            message: options.message,
            groups: options.groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, try_validate, validate};
    use chrono::NaiveDate;
    use rstest::rstest;

    // ========================================================================
    // DATE
    // ========================================================================

    #[rstest]
    #[case("2010-01-01")]
    #[case("1955-12-12")]
    #[case("2030-05-31")]
    #[case("2012-02-29")]
    fn valid_dates(#[case] date: &str) {
        assert_no_violation(&Date::default(), &Value::from(date));
    }

    #[rstest]
    #[case("foobar", Date::INVALID_FORMAT_ERROR)]
    #[case("foobar 2010-13-01", Date::INVALID_FORMAT_ERROR)]
    #[case("2010-13-01 foobar", Date::INVALID_FORMAT_ERROR)]
    #[case("2010-1-01", Date::INVALID_FORMAT_ERROR)]
    #[case("10-01-01", Date::INVALID_FORMAT_ERROR)]
    #[case("2010-13-01", Date::INVALID_DATE_ERROR)]
    #[case("2010-04-32", Date::INVALID_DATE_ERROR)]
    #[case("2010-02-29", Date::INVALID_DATE_ERROR)]
    fn invalid_dates(#[case] date: &str, #[case] code: &str) {
        let violations = validate(&Date::default(), &Value::from(date));
        assert_eq!(single_code(&violations), code);
        assert_eq!(violations.get(0).unwrap().message(), "This value is not a valid date.");
    }

    #[test]
    fn date_values_are_valid() {
        let date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        assert_no_violation(&Date::default(), &Value::from(date));
    }

    #[test]
    fn dates_must_be_scalars() {
        let err = try_validate(&Date::default(), &Value::from(vec![1])).unwrap_err();
        assert!(matches!(err, ValidatorError::UnexpectedType { .. }));
    }

    // ========================================================================
    // TIME
    // ========================================================================

    #[rstest]
    #[case("01:02:03")]
    #[case("00:00:00")]
    #[case("23:59:59")]
    fn valid_times(#[case] time: &str) {
        assert_no_violation(&Time::default(), &Value::from(time));
    }

    #[rstest]
    #[case("foobar", Time::INVALID_FORMAT_ERROR)]
    #[case("00:00", Time::INVALID_FORMAT_ERROR)]
    #[case("00:00:00 foobar", Time::INVALID_FORMAT_ERROR)]
    #[case("1:02:03", Time::INVALID_FORMAT_ERROR)]
    #[case("24:00:00", Time::INVALID_TIME_ERROR)]
    #[case("00:60:00", Time::INVALID_TIME_ERROR)]
    #[case("00:00:60", Time::INVALID_TIME_ERROR)]
    fn invalid_times(#[case] time: &str, #[case] code: &str) {
        let violations = validate(&Time::default(), &Value::from(time));
        assert_eq!(single_code(&violations), code);
    }

    #[test]
    fn times_without_seconds() {
        let rule = Time::default().without_seconds();
        assert_no_violation(&rule, &Value::from("13:45"));
        let violations = validate(&rule, &Value::from("13:45:00"));
        assert_eq!(single_code(&violations), Time::INVALID_FORMAT_ERROR);
        let violations = validate(&rule, &Value::from("25:00"));
        assert_eq!(single_code(&violations), Time::INVALID_TIME_ERROR);
    }

    // ========================================================================
    // DATE TIME
    // ========================================================================

    #[test]
    fn default_layout() {
        assert_no_violation(&DateTime::default(), &Value::from("2010-01-01 01:02:03"));
        let violations = validate(&DateTime::default(), &Value::from("2010-01-01"));
        assert_eq!(single_code(&violations), DateTime::INVALID_FORMAT_ERROR);
        let violation = violations.get(0).unwrap();
        assert_eq!(violation.message(), "This value is not a valid datetime.");
        assert_eq!(violation.parameter("{{ format }}"), Some("\"Y-m-d H:i:s\""));
    }

    #[rstest]
    #[case("Y-m-d", "2010-13-01", DateTime::INVALID_DATE_ERROR)]
    #[case("Y-m-d", "2010-02-29", DateTime::INVALID_DATE_ERROR)]
    #[case("H:i:s", "24:00:00", DateTime::INVALID_TIME_ERROR)]
    #[case("Y-m-d H:i:s", "2010-01-01 00:00:60", DateTime::INVALID_TIME_ERROR)]
    #[case("Y-m-d H:i:s", "2010-01-01 00:00", DateTime::INVALID_FORMAT_ERROR)]
    fn custom_layouts(#[case] format: &str, #[case] input: &str, #[case] code: &str) {
        let rule = DateTime::new(format).unwrap();
        assert_eq!(single_code(&validate(&rule, &Value::from(input))), code);
    }

    #[test]
    fn empty_layout_is_a_definition_error() {
        assert!(matches!(
            DateTime::new(""),
            Err(DefinitionError::InvalidOption { option: "format", .. })
        ));
        let rule: DateTime = serde_json::from_str(r#"{"format": "d/m/Y"}"#).unwrap();
        assert_eq!(rule.format(), "d/m/Y");
        assert_no_violation(&rule, &Value::from("31/12/2024"));
    }
}
