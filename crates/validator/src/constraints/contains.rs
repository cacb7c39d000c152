//! Substring and whole-word containment.

use std::borrow::Cow;

use serde::Deserialize;

use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value, text_input,
};

/// Where the needles come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeedleSource {
    /// Fixed list.
    List(Vec<String>),
    /// A string or list of strings held by a sibling property.
    PropertyPath(String),
}

/// How a needle is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Anywhere in the text.
    #[default]
    Substring,
    /// As a whole word, delimited by non-alphanumeric characters.
    Word,
}

/// How many needles must be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Require {
    /// At least one.
    #[default]
    Any,
    /// Every one.
    All,
}

/// The string must contain needles (or, negated, must not contain any).
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "StringContainsOptions")]
pub struct StringContains {
    needles: NeedleSource,
    mode: MatchMode,
    require: Require,
    case_sensitive: bool,
    negate: bool,
    message: Option<String>,
    pub(crate) groups: Groups,
}

impl StringContains {
    crate::error_codes! {
        NOT_CONTAINED_ERROR = "b97bd123-18bf-4ddf-8094-24a68558b368";
        MISSING_NEEDLE_ERROR = "300528fa-9734-4d33-a160-50a93ff76ffc";
        FORBIDDEN_NEEDLE_ERROR = "b6683693-d219-4807-8243-62f3a887522b";
    }

    const ANY_MESSAGE: &'static str = "This value should contain one of {{ needles }}.";
    const ALL_MESSAGE: &'static str = "This value should contain {{ needle }}.";
    const NEGATED_MESSAGE: &'static str = "This value should not contain {{ needle }}.";

    /// Contains at least one of `needles`.
    pub fn any<I, S>(needles: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_source(NeedleSource::List(needles.into_iter().map(Into::into).collect()))
    }

    /// Contains every one of `needles`.
    pub fn all<I, S>(needles: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut contains = Self::any(needles)?;
        contains.require = Require::All;
        Ok(contains)
    }

    /// Needles read from a sibling property.
    pub fn from_property(path: impl Into<String>) -> Self {
        Self {
            needles: NeedleSource::PropertyPath(path.into()),
            mode: MatchMode::default(),
            require: Require::default(),
            case_sensitive: true,
            negate: false,
            message: None,
            groups: Groups::default(),
        }
    }

    fn from_source(needles: NeedleSource) -> Result<Self, DefinitionError> {
        if let NeedleSource::List(list) = &needles {
            if list.is_empty() || list.iter().any(String::is_empty) {
                return Err(DefinitionError::invalid_option(
                    "StringContains",
                    "needles",
                    "at least one non-empty needle is required",
                ));
            }
        }
        Ok(Self {
            needles,
            mode: MatchMode::default(),
            require: Require::default(),
            case_sensitive: true,
            negate: false,
            message: None,
            groups: Groups::default(),
        })
    }

    /// Matches whole words only.
    #[must_use = "builder methods must be chained or built"]
    pub fn words(mut self) -> Self {
        self.mode = MatchMode::Word;
        self
    }

    /// Ignores case.
    #[must_use = "builder methods must be chained or built"]
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Forbids every needle instead.
    #[must_use = "builder methods must be chained or built"]
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    fn resolve_needles(
        &self,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Option<Vec<String>>, ValidatorError> {
        let path = match &self.needles {
            NeedleSource::List(list) => return Ok(Some(list.clone())),
            NeedleSource::PropertyPath(path) => path,
        };
        if ctx.object().is_none() {
            return Ok(None);
        }
        let needles = match ctx.resolve_property("StringContains", path)? {
            Value::Null => return Ok(None),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.to_text().map(Cow::into_owned))
                .filter(|needle| !needle.is_empty())
                .collect(),
            other => match other.to_text() {
                Some(text) if !text.is_empty() => vec![text.into_owned()],
                _ => {
                    return Err(DefinitionError::InvalidPropertyPath {
                        path: path.clone(),
                        constraint: "StringContains",
                        reason: format!("expected a string or a list, got {}", other.type_name()),
                    }
                    .into());
                }
            },
        };
        Ok(Some(needles))
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        let (haystack, needle) = if self.case_sensitive {
            (Cow::Borrowed(haystack), Cow::Borrowed(needle))
        } else {
            (
                Cow::Owned(haystack.to_lowercase()),
                Cow::Owned(needle.to_lowercase()),
            )
        };
        match self.mode {
            MatchMode::Substring => haystack.contains(needle.as_ref()),
            MatchMode::Word => contains_word(&haystack, &needle),
        }
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

impl Validate for StringContains {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let Some(needles) = self.resolve_needles(ctx)? else {
            return Ok(());
        };
        if needles.is_empty() {
            return Ok(());
        }

        if self.negate {
            for needle in needles.iter().filter(|n| self.contains(&text, n)) {
                ctx.build_violation(
                    self.message
                        .clone()
                        .unwrap_or_else(|| Self::NEGATED_MESSAGE.into()),
                )
                .set_parameter("{{ value }}", value.formatted())
                .set_parameter("{{ needle }}", format!("\"{needle}\""))
                .set_code(Self::FORBIDDEN_NEEDLE_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
            }
            return Ok(());
        }

        match self.require {
            Require::Any => {
                if !needles.iter().any(|n| self.contains(&text, n)) {
                    let list = needles
                        .iter()
                        .map(|n| format!("\"{n}\""))
                        .collect::<Vec<_>>()
                        .join(", ");
                    ctx.build_violation(
                        self.message.clone().unwrap_or_else(|| Self::ANY_MESSAGE.into()),
                    )
                    .set_parameter("{{ value }}", value.formatted())
                    .set_parameter("{{ needles }}", list)
                    .set_code(Self::NOT_CONTAINED_ERROR)
                    .set_invalid_value(value.clone())
                    .add_violation();
                }
            }
            Require::All => {
                for needle in needles.iter().filter(|n| !self.contains(&text, n)) {
                    ctx.build_violation(
                        self.message.clone().unwrap_or_else(|| Self::ALL_MESSAGE.into()),
                    )
                    .set_parameter("{{ value }}", value.formatted())
                    .set_parameter("{{ needle }}", format!("\"{needle}\""))
                    .set_code(Self::MISSING_NEEDLE_ERROR)
                    .set_invalid_value(value.clone())
                    .add_violation();
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Needles {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StringContainsOptions {
    #[serde(default)]
    needles: Option<Needles>,
    #[serde(default)]
    property_path: Option<String>,
    #[serde(default)]
    mode: MatchMode,
    #[serde(default)]
    require: Require,
    #[serde(default = "default_case_sensitive")]
    case_sensitive: bool,
    #[serde(default)]
    negate: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    groups: Groups,
}

const fn default_case_sensitive() -> bool {
    true
}

impl TryFrom<StringContainsOptions> for StringContains {
    type Error = DefinitionError;

    fn try_from(options: StringContainsOptions) -> Result<Self, Self::Error> {
        let source = match (options.needles, options.property_path) {
            (Some(_), Some(_)) => {
                return Err(DefinitionError::ConflictingOptions {
                    constraint: "StringContains",
                    first: "needles",
                    second: "property_path",
                });
            }
            (Some(Needles::One(one)), None) => NeedleSource::List(vec![one]),
            (Some(Needles::Many(many)), None) => NeedleSource::List(many),
            (None, Some(path)) => NeedleSource::PropertyPath(path),
            (None, None) => {
                return Err(DefinitionError::MissingOption {
                    constraint: "StringContains",
                    options: "\"needles\" or \"property_path\"",
                });
            }
        };
        let mut contains = Self::from_source(source)?;
        contains.mode = options.mode;
        contains.require = options.require;
        contains.case_sensitive = options.case_sensitive;
        contains.negate = options.negate;
        contains.message = options.message;
        contains.groups = options.groups;
        Ok(contains)
    }
}
