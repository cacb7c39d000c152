//! Dynamic values under validation.
//!
//! Constraints are declared once and applied to whatever the caller hands
//! over, so validators work on a small dynamic [`Value`] instead of concrete
//! Rust types. The comparison helpers here define the loose equality,
//! strict identity, and ordering used by the comparison family.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Format used when a date-time is rendered into a message.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// VALUE
// ============================================================================

/// A value under validation.
///
/// # Examples
///
/// ```
/// use rampart_validator::foundation::Value;
///
/// let v = Value::from("42");
/// assert!(v.loose_eq(&Value::from(42)));
/// assert!(!v.is_identical(&Value::from(42)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
    /// Calendar date and wall-clock time.
    DateTime(NaiveDateTime),
    /// Ordered list.
    Array(Vec<Value>),
    /// Keyed record, insertion ordered.
    Object(IndexMap<String, Value>),
}

/// A numeric view of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Exact integer.
    Int(i64),
    /// Floating point.
    Float(f64),
}

impl Number {
    /// Returns the number as `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Compares two numbers, exactly when both are integers.
    pub fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

/// Parses a numeric string: optional surrounding whitespace, sign, digits,
/// decimal point, and exponent. Words such as `inf` or `NaN` are rejected.
pub fn parse_numeric(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || !trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        || !trimmed.bytes().any(|b| b.is_ascii_digit())
    {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::Int(i));
    }
    trimmed.parse::<f64>().ok().map(Number::Float)
}

/// Parses `Y-m-d H:i:s`, `Y-m-dTH:i:s`, `Y-m-d H:i` or a bare `Y-m-d` (midnight).
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl Value {
    /// Short type name used in messages and type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::DateTime(_) => "DateTime",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for the empty string.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// Returns the text when the value is [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view: integers, floats, and numeric strings.
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Self::Integer(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            Self::Text(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// Returns `true` when [`Value::to_number`] succeeds.
    pub fn is_numeric(&self) -> bool {
        self.to_number().is_some()
    }

    /// Scalar-to-text coercion used by the string validators.
    ///
    /// Booleans become `"1"` / `""`; arrays, objects and date-times have no
    /// text form.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => Some(Cow::Borrowed("")),
            Self::Bool(true) => Some(Cow::Borrowed("1")),
            Self::Bool(false) => Some(Cow::Borrowed("")),
            Self::Integer(i) => Some(Cow::Owned(i.to_string())),
            Self::Float(f) => Some(Cow::Owned(f.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::DateTime(_) | Self::Array(_) | Self::Object(_) => None,
        }
    }

    /// Truthiness: null, `false`, `0`, `0.0`, `""`, `"0"` and empty
    /// collections are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => !(s.is_empty() || s == "0"),
            Self::DateTime(_) => true,
            Self::Array(items) => !items.is_empty(),
            Self::Object(map) => !map.is_empty(),
        }
    }

    /// Loose equality: numeric strings equal numbers, booleans compare by
    /// truthiness, null equals every falsy value.
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), b) | (b, Self::Bool(a)) => *a == b.is_truthy(),
            (Self::Null, Self::Text(s)) | (Self::Text(s), Self::Null) => s.is_empty(),
            (Self::Null, v) | (v, Self::Null) => !v.is_truthy(),
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.loose_eq(other)))
            }
            (a, b) => Self::scalar_cmp(a, b) == Some(Ordering::Equal),
        }
    }

    /// Strict identity: same variant and same content.
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other
    }

    /// Loose ordering; `None` when the pair has no meaningful order.
    pub fn loose_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Text(s)) => Some("".cmp(s.as_str())),
            (Self::Text(s), Self::Null) => Some(s.as_str().cmp("")),
            (Self::Null | Self::Bool(_), _) | (_, Self::Null | Self::Bool(_)) => {
                Some(self.is_truthy().cmp(&other.is_truthy()))
            }
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Array(a), Self::Array(b)) => {
                if a.len() != b.len() {
                    return Some(a.len().cmp(&b.len()));
                }
                for (x, y) in a.iter().zip(b) {
                    match x.loose_cmp(y)? {
                        Ordering::Equal => {}
                        unequal => return Some(unequal),
                    }
                }
                Some(Ordering::Equal)
            }
            (a, b) => Self::scalar_cmp(a, b),
        }
    }

    fn scalar_cmp(a: &Self, b: &Self) -> Option<Ordering> {
        match (a, b) {
            (Self::Text(x), Self::Text(y)) => match (parse_numeric(x), parse_numeric(y)) {
                (Some(n), Some(m)) => n.compare(m),
                _ => Some(x.cmp(y)),
            },
            (Self::Integer(_) | Self::Float(_), Self::Text(text)) => match b.to_number() {
                Some(m) => a.to_number()?.compare(m),
                None => a.to_text().map(|t| t.as_ref().cmp(text.as_str())),
            },
            (Self::Text(text), Self::Integer(_) | Self::Float(_)) => match a.to_number() {
                Some(n) => n.compare(b.to_number()?),
                None => b.to_text().map(|t| text.as_str().cmp(t.as_ref())),
            },
            (Self::Integer(_) | Self::Float(_), Self::Integer(_) | Self::Float(_)) => {
                a.to_number()?.compare(b.to_number()?)
            }
            _ => None,
        }
    }

    /// Renders the value for a `{{ value }}` message parameter.
    ///
    /// Text is quoted; collections collapse to their type name.
    pub fn formatted(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("\"{s}\""),
            Self::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Self::Array(_) => "array".to_owned(),
            Self::Object(_) => "object".to_owned(),
        }
    }

    /// Follows a property path such as `address.city`, `items[0]` or
    /// `[meta][owner]`.
    pub fn lookup(&self, path: &str) -> Option<&Self> {
        path.split(['.', '[', ']'])
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |current, segment| match current {
                Self::Object(map) => map.get(segment),
                Self::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Number of elements for arrays and objects.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(items) => Some(items.len()),
            Self::Object(map) => Some(map.len()),
            _ => None,
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::DateTime(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => serializer.collect_str(&dt.format(DATETIME_FORMAT)),
            Self::Array(items) => serializer.collect_seq(items),
            Self::Object(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Value::from(1), Value::from("1"), true)]
    #[case(Value::from(1), Value::from(1.0), true)]
    #[case(Value::from("abc"), Value::from("abc"), true)]
    #[case(Value::from("1e3"), Value::from("1000"), true)]
    #[case(Value::from("abc"), Value::from(0), false)]
    #[case(Value::Null, Value::from(false), true)]
    #[case(Value::Null, Value::from(""), true)]
    #[case(Value::Null, Value::from(0), true)]
    #[case(Value::from(true), Value::from("yes"), true)]
    #[case(Value::from(vec![1, 2]), Value::from(vec!["1", "2"]), true)]
    fn loose_equality(#[case] a: Value, #[case] b: Value, #[case] expected: bool) {
        assert_eq!(a.loose_eq(&b), expected);
        assert_eq!(b.loose_eq(&a), expected);
    }

    #[test]
    fn identity_requires_same_variant() {
        assert!(Value::from(3).is_identical(&Value::from(3)));
        assert!(!Value::from(3).is_identical(&Value::from(3.0)));
        assert!(!Value::from(3).is_identical(&Value::from("3")));
    }

    #[rstest]
    #[case(Value::from(2), Value::from(1), Ordering::Greater)]
    #[case(Value::from("10"), Value::from(9), Ordering::Greater)]
    #[case(Value::from("10"), Value::from("9"), Ordering::Greater)]
    #[case(Value::from("b"), Value::from("a"), Ordering::Greater)]
    #[case(Value::from(1.5), Value::from(2), Ordering::Less)]
    #[case(Value::from(vec![1]), Value::from(vec![1, 2]), Ordering::Less)]
    fn loose_ordering(#[case] a: Value, #[case] b: Value, #[case] expected: Ordering) {
        assert_eq!(a.loose_cmp(&b), Some(expected));
        assert_eq!(b.loose_cmp(&a), Some(expected.reverse()));
    }

    #[test]
    fn objects_have_no_order() {
        let obj: Value = [("a".to_owned(), Value::from(1))].into_iter().collect();
        assert_eq!(obj.loose_cmp(&Value::from(1)), None);
    }

    #[test]
    fn numeric_parsing_rejects_words() {
        assert_eq!(parse_numeric(" 42 "), Some(Number::Int(42)));
        assert_eq!(parse_numeric("-1.5e2"), Some(Number::Float(-150.0)));
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("0x1A"), None);
        assert_eq!(parse_numeric("."), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn formatted_quotes_text() {
        assert_eq!(Value::from("abc").formatted(), "\"abc\"");
        assert_eq!(Value::Null.formatted(), "null");
        assert_eq!(Value::from(2.5).formatted(), "2.5");
        assert_eq!(Value::from(vec![1]).formatted(), "array");
        let dt = parse_datetime("2020-02-03").unwrap();
        assert_eq!(Value::from(dt).formatted(), "2020-02-03 00:00:00");
    }

    #[test]
    fn lookup_follows_paths() {
        let doc = Value::from(serde_json::json!({
            "user": { "emails": ["a@example.com", "b@example.com"] },
            "meta": { "owner": "ops" }
        }));
        assert_eq!(
            doc.lookup("user.emails[1]"),
            Some(&Value::from("b@example.com"))
        );
        assert_eq!(doc.lookup("[meta][owner]"), Some(&Value::from("ops")));
        assert_eq!(doc.lookup("user.missing"), None);
        assert_eq!(doc.lookup("user.emails[9]"), None);
    }

    #[test]
    fn scalar_text_coercion() {
        assert_eq!(Value::from(true).to_text().as_deref(), Some("1"));
        assert_eq!(Value::from(false).to_text().as_deref(), Some(""));
        assert_eq!(Value::from(12).to_text().as_deref(), Some("12"));
        assert_eq!(Value::from(vec![1]).to_text(), None);
    }

    #[test]
    fn json_round_trip_keeps_integers() {
        let value: Value = serde_json::from_str(r#"{"n": 3, "f": 1.5, "s": "x"}"#).unwrap();
        assert_eq!(value.lookup("n"), Some(&Value::Integer(3)));
        assert_eq!(value.lookup("f"), Some(&Value::Float(1.5)));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"n":3,"f":1.5,"s":"x"}"#
        );
    }
}
