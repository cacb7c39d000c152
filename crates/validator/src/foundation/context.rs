//! Execution context handed to every validator.
//!
//! The context is the caller-owned accumulator: validators read the current
//! group, the object that owns the validated property (for property-path
//! options), and the injected services from it, and report failures through
//! [`ExecutionContext::build_violation`].

use std::borrow::Cow;

use crate::constraints::Constraint;
use crate::foundation::violation::Parameters;
use crate::foundation::{
    DefinitionError, Validate, ValidatorError, Value, Violation, ViolationList,
};
use crate::services::Services;
use crate::validator::Validator;

// ============================================================================
// EXECUTION CONTEXT
// ============================================================================

/// State of one validation call.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    validator: &'a Validator,
    root: &'a Value,
    object: Option<&'a Value>,
    group: &'a str,
    path: String,
    violations: ViolationList,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(validator: &'a Validator, root: &'a Value, group: &'a str) -> Self {
        Self {
            validator,
            root,
            object: None,
            group,
            path: String::new(),
            violations: ViolationList::new(),
        }
    }

    /// Sets the object whose properties are being validated.
    pub(crate) fn with_object(mut self, object: &'a Value) -> Self {
        self.object = Some(object);
        self
    }

    /// Sets the starting property path.
    pub(crate) fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// The value validation started from.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// The object owning the property under validation, if any.
    pub fn object(&self) -> Option<&'a Value> {
        self.object
    }

    /// Group of the current pass.
    pub fn group(&self) -> &'a str {
        self.group
    }

    /// Current property path.
    pub fn property_path(&self) -> &str {
        &self.path
    }

    /// Injected collaborators.
    pub fn services(&self) -> &'a Services {
        self.validator.services()
    }

    /// Violations recorded so far.
    pub fn violations(&self) -> &ViolationList {
        &self.violations
    }

    /// Consumes the context, returning its violations.
    pub fn into_violations(self) -> ViolationList {
        self.violations
    }

    /// Starts a violation with the given message template.
    pub fn build_violation(
        &mut self,
        message_template: impl Into<Cow<'static, str>>,
    ) -> ViolationBuilder<'_, 'a> {
        ViolationBuilder {
            context: self,
            template: message_template.into(),
            parameters: Parameters::new(),
            plural: None,
            code: None,
            invalid_value: None,
            subpath: None,
        }
    }

    /// Adds violations produced elsewhere, e.g. by an isolated child context.
    pub fn add_violations(&mut self, violations: ViolationList) {
        self.violations.extend(violations);
    }

    /// A fresh context sharing everything but the violation list.
    pub fn isolated(&self) -> Self {
        Self {
            validator: self.validator,
            root: self.root,
            object: self.object,
            group: self.group,
            path: self.path.clone(),
            violations: ViolationList::new(),
        }
    }

    /// Runs `f` with `segment` appended to the property path.
    pub fn in_subpath<R>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.path.len();
        self.path = join_path(&self.path, segment);
        let result = f(self);
        self.path.truncate(saved);
        result
    }

    /// Validates `value` against the constraints that belong to the current
    /// group.
    pub fn validate_nested(
        &mut self,
        value: &Value,
        constraints: &[Constraint],
    ) -> Result<(), ValidatorError> {
        for constraint in constraints {
            if constraint.groups().contains(self.group) {
                constraint.validate(value, self)?;
            }
        }
        Ok(())
    }

    /// Resolves a sibling property named by a `*_property_path` option.
    pub fn resolve_property(
        &self,
        constraint: &'static str,
        path: &str,
    ) -> Result<&'a Value, DefinitionError> {
        let object = self.object.ok_or_else(|| DefinitionError::InvalidPropertyPath {
            path: path.to_owned(),
            constraint,
            reason: "no object is being validated".to_owned(),
        })?;
        object
            .lookup(path)
            .ok_or_else(|| DefinitionError::InvalidPropertyPath {
                path: path.to_owned(),
                constraint,
                reason: format!("the {} has no such property", object.type_name()),
            })
    }
}

/// Appends `segment` to `base` using `.` for names and no separator for
/// `[index]` segments.
pub fn join_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_owned()
    } else if segment.starts_with('[') {
        format!("{base}{segment}")
    } else {
        format!("{base}.{segment}")
    }
}

// ============================================================================
// VIOLATION BUILDER
// ============================================================================

/// Fluent construction of a [`Violation`]; nothing is recorded until
/// [`ViolationBuilder::add_violation`] is called.
#[must_use = "a violation is only recorded by add_violation()"]
pub struct ViolationBuilder<'c, 'a> {
    context: &'c mut ExecutionContext<'a>,
    template: Cow<'static, str>,
    parameters: Parameters,
    plural: Option<u64>,
    code: Option<Cow<'static, str>>,
    invalid_value: Option<Value>,
    subpath: Option<String>,
}

impl ViolationBuilder<'_, '_> {
    /// Sets a message parameter; `key` is the full placeholder, e.g.
    /// `{{ value }}`.
    #[must_use = "builder methods must be chained or built"]
    pub fn set_parameter(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.parameters.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.parameters.push((key, value));
        }
        self
    }

    /// Count selecting the plural form of a `singular|plural` template.
    #[must_use = "builder methods must be chained or built"]
    pub fn set_plural(mut self, count: u64) -> Self {
        self.plural = Some(count);
        self
    }

    /// Stable error code.
    #[must_use = "builder methods must be chained or built"]
    pub fn set_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The offending value.
    #[must_use = "builder methods must be chained or built"]
    pub fn set_invalid_value(mut self, value: Value) -> Self {
        self.invalid_value = Some(value);
        self
    }

    /// Attaches the violation to a sub-path of the current property.
    #[must_use = "builder methods must be chained or built"]
    pub fn at_path(mut self, segment: impl Into<String>) -> Self {
        self.subpath = Some(segment.into());
        self
    }

    /// Records the violation.
    pub fn add_violation(self) {
        let path = match &self.subpath {
            Some(segment) => join_path(&self.context.path, segment),
            None => self.context.path.clone(),
        };
        let violation = Violation::new(
            self.template,
            self.parameters,
            self.plural,
            self.code,
            self.invalid_value,
            path,
        );
        self.context.violations.add(violation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_records_violation() {
        let validator = Validator::new();
        let root = Value::from("x");
        let mut ctx = ExecutionContext::new(&validator, &root, "Default").with_path("user");
        ctx.build_violation("Value {{ value }} is bad.")
            .set_parameter("{{ value }}", "\"x\"")
            .set_code("c-1")
            .set_invalid_value(Value::from("x"))
            .at_path("name")
            .add_violation();

        let violations = ctx.into_violations();
        assert_eq!(violations.len(), 1);
        let v = &violations.iter().next().unwrap();
        assert_eq!(v.message(), "Value \"x\" is bad.");
        assert_eq!(v.property_path(), "user.name");
        assert_eq!(v.code(), Some("c-1"));
        assert_eq!(v.invalid_value(), Some(&Value::from("x")));
    }

    #[test]
    fn set_parameter_overwrites() {
        let validator = Validator::new();
        let root = Value::Null;
        let mut ctx = ExecutionContext::new(&validator, &root, "Default");
        ctx.build_violation("{{ a }}")
            .set_parameter("{{ a }}", "1")
            .set_parameter("{{ a }}", "2")
            .add_violation();
        assert_eq!(ctx.violations().iter().next().unwrap().message(), "2");
    }

    #[test]
    fn subpath_is_restored() {
        let validator = Validator::new();
        let root = Value::Null;
        let mut ctx = ExecutionContext::new(&validator, &root, "Default").with_path("items");
        let inner = ctx.in_subpath("[3]", |c| c.property_path().to_owned());
        assert_eq!(inner, "items[3]");
        assert_eq!(ctx.property_path(), "items");
    }

    #[test]
    fn property_resolution_requires_object() {
        let validator = Validator::new();
        let root = Value::Null;
        let ctx = ExecutionContext::new(&validator, &root, "Default");
        let err = ctx.resolve_property("EqualTo", "password").unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidPropertyPath { .. }));
    }

    #[test]
    fn join_path_rules() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "b"), "a.b");
        assert_eq!(join_path("a", "[0]"), "a[0]");
    }
}
