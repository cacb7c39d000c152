//! Validation groups.

use serde::Deserialize;

/// Group every constraint belongs to unless told otherwise.
pub const DEFAULT_GROUP: &str = "Default";

/// The validation groups of one constraint.
///
/// An empty list means the groups were never set explicitly; such a
/// constraint belongs to [`DEFAULT_GROUP`] and inherits the groups of a
/// composite it is nested in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Groups(Vec<String>);

impl Groups {
    /// Explicit groups.
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Vec::new();
        for group in groups {
            let group = group.into();
            if !list.contains(&group) {
                list.push(group);
            }
        }
        Self(list)
    }

    /// Returns `true` when groups were set explicitly.
    pub fn is_explicit(&self) -> bool {
        !self.0.is_empty()
    }

    /// Groups in effect: the explicit ones, or `["Default"]`.
    pub fn effective(&self) -> Vec<&str> {
        if self.0.is_empty() {
            vec![DEFAULT_GROUP]
        } else {
            self.0.iter().map(String::as_str).collect()
        }
    }

    /// Returns `true` if the constraint takes part in `group`.
    pub fn contains(&self, group: &str) -> bool {
        if self.0.is_empty() {
            group == DEFAULT_GROUP
        } else {
            self.0.iter().any(|g| g == group)
        }
    }

    /// Groups of `self` that are missing from `parent`.
    pub fn missing_from<'a>(&'a self, parent: &Self) -> Vec<&'a str> {
        self.effective()
            .into_iter()
            .filter(|g| !parent.contains(g))
            .collect()
    }

    /// Adds every group of `other` not yet present.
    pub fn merge(&mut self, other: &Self) {
        for group in other.effective() {
            if !self.0.iter().any(|g| g == group) {
                self.0.push(group.to_owned());
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Groups {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
