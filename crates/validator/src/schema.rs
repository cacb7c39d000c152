//! Rule sets loaded from JSON or TOML.
//!
//! A rule file maps property paths to constraint lists; each constraint is
//! tagged by its snake_case kind:
//!
//! ```toml
//! [[fields.email]]
//! type = "not_blank"
//!
//! [[fields.email]]
//! type = "email"
//! mode = "html5"
//! ```
//!
//! Constraints with invariants are checked while the file loads, so a bad
//! rule file never produces a [`ConstraintSet`].

use indexmap::IndexMap;
use serde::Deserialize;

use crate::constraints::Constraint;

/// A rule file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Malformed JSON or a JSON rule that failed to build.
    #[error("invalid JSON rule set: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML or a TOML rule that failed to build.
    #[error("invalid TOML rule set: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Property path to constraints map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSet {
    #[serde(default)]
    fields: IndexMap<String, Vec<Constraint>>,
}

impl ConstraintSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON rule file.
    pub fn from_json_str(source: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parses a TOML rule file.
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(source)?)
    }

    /// Appends constraints to a field, keeping the field order of first use.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, path: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        self.fields.entry(path.into()).or_default().extend(constraints);
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &[Constraint])> {
        self.fields.iter().map(|(path, rules)| (path, rules.as_slice()))
    }

    /// Constraints declared for one field.
    pub fn get(&self, path: &str) -> Option<&[Constraint]> {
        self.fields.get(path).map(Vec::as_slice)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no field has rules.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
