//! The validation engine.
//!
//! A [`Validator`] owns the injected [`Services`] and runs constraint lists
//! group by group. It holds no mutable state, so one instance can be shared
//! across threads.

use std::collections::HashSet;

use tracing::debug;

use crate::constraints::Constraint;
use crate::foundation::{
    DEFAULT_GROUP, ExecutionContext, Validate, ValidatorError, Value, ViolationList,
};
use crate::schema::ConstraintSet;
use crate::services::Services;

/// Runs constraints against values.
///
/// # Examples
///
/// ```
/// use rampart_validator::Validator;
/// use rampart_validator::constraints::{Constraint, Length, NotBlank};
/// use rampart_validator::foundation::Value;
///
/// let validator = Validator::new();
/// let rules: Vec<Constraint> = vec![NotBlank::default().into(), Length::max(3).into()];
///
/// let violations = validator.validate(&Value::from("toolong"), &rules).unwrap();
/// assert_eq!(violations.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    services: Services,
}

impl Validator {
    /// Validator with the default services.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts configuring a validator.
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// Injected collaborators.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Validates `value` against the constraints of the `Default` group.
    pub fn validate(
        &self,
        value: &Value,
        constraints: &[Constraint],
    ) -> Result<ViolationList, ValidatorError> {
        self.validate_in_groups(value, constraints, &[])
    }

    /// Validates `value` once per group, in order.
    ///
    /// An empty group list means `Default`. A constraint that belongs to
    /// several of the requested groups runs only in the first of them.
    pub fn validate_in_groups(
        &self,
        value: &Value,
        constraints: &[Constraint],
        groups: &[&str],
    ) -> Result<ViolationList, ValidatorError> {
        let mut done = HashSet::new();
        let mut violations = ViolationList::new();
        for group in passes(groups) {
            debug!(group, constraints = constraints.len(), "validation pass started");
            let mut ctx = ExecutionContext::new(self, value, group);
            run_pass(&mut ctx, value, constraints, group, |i| done.insert(i))?;
            violations.extend(ctx.into_violations());
        }
        debug!(violations = violations.len(), "validation finished");
        Ok(violations)
    }

    /// Validates the properties of `object` against a rule set.
    ///
    /// Each field path of the set is looked up in the object; a missing
    /// property is validated as null. Violations carry the field path, and
    /// property-path options resolve against `object`.
    pub fn validate_object(
        &self,
        object: &Value,
        rules: &ConstraintSet,
        groups: &[&str],
    ) -> Result<ViolationList, ValidatorError> {
        if !matches!(object, Value::Object(_)) {
            return Err(ValidatorError::unexpected_type("object", object));
        }
        let mut done = HashSet::new();
        let mut violations = ViolationList::new();
        for group in passes(groups) {
            debug!(group, fields = rules.len(), "object validation pass started");
            for (field, constraints) in rules.fields() {
                let value = object.lookup(field).unwrap_or(&Value::Null);
                let mut ctx = ExecutionContext::new(self, object, group)
                    .with_object(object)
                    .with_path(field.as_str());
                run_pass(&mut ctx, value, constraints, group, |i| {
                    done.insert((field.as_str(), i))
                })?;
                violations.extend(ctx.into_violations());
            }
        }
        debug!(violations = violations.len(), "object validation finished");
        Ok(violations)
    }
}

fn passes<'g>(groups: &[&'g str]) -> Vec<&'g str> {
    if groups.is_empty() {
        vec![DEFAULT_GROUP]
    } else {
        groups.to_vec()
    }
}

/// Runs the constraints of `group`; `first_time` is asked before each one
/// and returns `false` if it already ran in an earlier pass.
fn run_pass(
    ctx: &mut ExecutionContext<'_>,
    value: &Value,
    constraints: &[Constraint],
    group: &str,
    mut first_time: impl FnMut(usize) -> bool,
) -> Result<(), ValidatorError> {
    for (index, constraint) in constraints.iter().enumerate() {
        if constraint.groups().contains(group) && first_time(index) {
            constraint.validate(value, ctx)?;
        }
    }
    Ok(())
}

// ============================================================================
// BUILDER
// ============================================================================

/// Configures a [`Validator`].
#[derive(Debug, Default)]
#[must_use = "builder methods must be chained or built"]
pub struct ValidatorBuilder {
    services: Option<Services>,
}

impl ValidatorBuilder {
    /// Replaces the default services.
    pub fn services(mut self, services: Services) -> Self {
        self.services = Some(services);
        self
    }

    /// Finishes configuration.
    pub fn build(self) -> Validator {
        Validator {
            services: self.services.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Comparison, ComparisonOperator, Length, NotBlank, NotNull};
    use crate::foundation::Groups;
    use pretty_assertions::assert_eq;

    fn in_groups(constraint: impl Into<Constraint>, groups: &[&str]) -> Constraint {
        constraint
            .into()
            .with_groups(Groups::new(groups.iter().copied()))
            .unwrap()
    }

    #[test]
    fn default_pass_skips_other_groups() {
        let rules = vec![
            NotBlank::default().into(),
            in_groups(Length::min(10), &["strict"]),
        ];
        let violations = Validator::new().validate(&Value::from("short"), &rules).unwrap();
        assert!(violations.is_empty());

        let violations = Validator::new()
            .validate_in_groups(&Value::from("short"), &rules, &["strict"])
            .unwrap();
        assert_eq!(violations.codes(), vec![Length::TOO_SHORT_ERROR]);
    }

    #[test]
    fn shared_constraint_runs_once_across_groups() {
        let rules = vec![in_groups(NotBlank::default(), &["a", "b"])];
        let violations = Validator::new()
            .validate_in_groups(&Value::from(""), &rules, &["a", "b"])
            .unwrap();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn object_fields_get_paths_and_siblings() {
        let rules = ConstraintSet::new()
            .with_field("name", vec![NotBlank::default().into()])
            .with_field(
                "confirm",
                vec![Comparison::with_property_path(ComparisonOperator::EqualTo, "password").into()],
            )
            .with_field("age", vec![NotNull::default().into()]);
        let object: Value = serde_json::json!({
            "name": "",
            "password": "secret",
            "confirm": "secrt",
        })
        .into();

        let violations = Validator::new().validate_object(&object, &rules, &[]).unwrap();
        let paths: Vec<_> = violations.iter().map(|v| v.property_path()).collect();
        assert_eq!(paths, vec!["name", "confirm", "age"]);
    }

    #[test]
    fn object_validation_needs_an_object() {
        let err = Validator::new()
            .validate_object(&Value::from(1), &ConstraintSet::new(), &[])
            .unwrap_err();
        assert!(matches!(err, ValidatorError::UnexpectedType { expected: "object", .. }));
    }

    #[test]
    fn builder_installs_services() {
        let validator = Validator::builder().services(Services::empty()).build();
        assert!(validator.services().intl().is_none());
        assert!(Validator::new().services().intl().is_some());
    }

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }
}
