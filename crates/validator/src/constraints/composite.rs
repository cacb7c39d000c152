//! Constraints made of other constraints.
//!
//! - [`Composite`]: runs nested constraints under a [`CompositePolicy`]
//! - [`When`]: picks one of two constraint lists by evaluating an expression
//! - [`Each`]: applies nested constraints to every element of a collection
//!
//! All three reconcile validation groups with their children when they are
//! built. A container with explicit groups hands them down to every child
//! that has none, and refuses children whose explicit groups it lacks. A
//! container without explicit groups adopts the union of its children's.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::constraints::Constraint;
use crate::foundation::{
    DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value,
};

/// Applies the group rules above to `children` of the container `parent`.
pub(crate) fn reconcile_groups<'c>(
    parent: &'static str,
    groups: &mut Groups,
    children: impl IntoIterator<Item = &'c mut Constraint>,
) -> Result<(), DefinitionError> {
    if !groups.is_explicit() {
        let mut union = Groups::default();
        let mut any_explicit = false;
        for child in children {
            any_explicit |= child.groups().is_explicit();
            union.merge(child.groups());
        }
        if any_explicit {
            *groups = union;
        }
        return Ok(());
    }

    for child in children {
        if child.groups().is_explicit() {
            let missing = child.groups().missing_from(groups);
            if !missing.is_empty() {
                return Err(DefinitionError::GroupNotInParent {
                    groups: missing.join(", "),
                    constraint: child.name(),
                    parent,
                });
            }
        } else {
            child.inherit_groups(groups);
        }
    }
    Ok(())
}

// ============================================================================
// COMPOSITE
// ============================================================================

/// How a [`Composite`] combines the outcomes of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositePolicy {
    /// Every child runs; all violations are kept.
    AllOf,
    /// Passes as soon as one child produces no violation.
    AnyOf,
    /// Exactly this many children must pass.
    ExactlyN(usize),
    /// Children run in order until one produces a violation.
    Sequential,
}

/// A list of constraints run under one policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "CompositeOptions")]
pub struct Composite {
    policy: CompositePolicy,
    constraints: Vec<Constraint>,
    include_internal_messages: bool,
    message: Option<String>,
    pub(crate) groups: Groups,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CompositeOptions {
    policy: CompositePolicy,
    constraints: Vec<Constraint>,
    #[serde(default = "default_true")]
    include_internal_messages: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    groups: Groups,
}

const fn default_true() -> bool {
    true
}

impl TryFrom<CompositeOptions> for Composite {
    type Error = DefinitionError;

    fn try_from(options: CompositeOptions) -> Result<Self, Self::Error> {
        let mut composite = Self::new(options.policy, options.constraints)?;
        composite.include_internal_messages = options.include_internal_messages;
        composite.message = options.message;
        composite.with_groups(options.groups)
    }
}

impl Composite {
    crate::error_codes! {
        AT_LEAST_ONE_OF_ERROR = "f27e6d6c-261a-4056-b391-6673a623531c";
        NOT_EXACTLY_N_ERROR = "057a906f-9983-48c3-8ad3-c5e0fd1f44af";
    }

    const AT_LEAST_ONE_OF_MESSAGE: &'static str =
        "This value should satisfy at least one of the following constraints:";
    const COLLECTION_MESSAGE: &'static str =
        "Each element of this collection should satisfy its own set of constraints.";
    const EXACTLY_N_MESSAGE: &'static str = "This value should satisfy exactly {{ limit }} of the following constraint.|This value should satisfy exactly {{ limit }} of the following constraints.";

    /// Runs `constraints` under `policy`.
    ///
    /// Fails when the list is empty or when `ExactlyN` asks for more passing
    /// children than there are.
    pub fn new(
        policy: CompositePolicy,
        mut constraints: Vec<Constraint>,
    ) -> Result<Self, DefinitionError> {
        if constraints.is_empty() {
            return Err(DefinitionError::invalid_option(
                "Composite",
                "constraints",
                "at least one nested constraint is required",
            ));
        }
        if let CompositePolicy::ExactlyN(n) = policy {
            if n > constraints.len() {
                return Err(DefinitionError::invalid_option(
                    "Composite",
                    "policy",
                    format!(
                        "cannot require {n} passing constraints out of {}",
                        constraints.len()
                    ),
                ));
            }
        }
        let mut groups = Groups::default();
        reconcile_groups("Composite", &mut groups, constraints.iter_mut())?;
        Ok(Self {
            policy,
            constraints,
            include_internal_messages: true,
            message: None,
            groups,
        })
    }

    /// Sets explicit groups and hands them down to the children.
    pub fn with_groups(mut self, groups: Groups) -> Result<Self, DefinitionError> {
        if groups.is_explicit() {
            self.groups = groups;
            reconcile_groups("Composite", &mut self.groups, self.constraints.iter_mut())?;
        }
        Ok(self)
    }

    /// Replaces the summary message of `AnyOf` and `ExactlyN`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Leaves the children's messages out of the `AnyOf` summary.
    #[must_use = "builder methods must be chained or built"]
    pub fn without_internal_messages(mut self) -> Self {
        self.include_internal_messages = false;
        self
    }

    /// The policy.
    pub fn policy(&self) -> CompositePolicy {
        self.policy
    }

    /// The nested constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Groups, Vec<&mut Constraint>) {
        (&mut self.groups, self.constraints.iter_mut().collect())
    }

    fn active<'s, 'g>(&'s self, group: &'g str) -> impl Iterator<Item = (usize, &'s Constraint)> {
        self.constraints
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.groups().contains(group))
    }

    fn validate_any_of(
        &self,
        value: &Value,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(), ValidatorError> {
        let mut message = self
            .message
            .clone()
            .unwrap_or_else(|| Self::AT_LEAST_ONE_OF_MESSAGE.to_owned());
        let group = ctx.group();
        for (index, constraint) in self.constraints.iter().enumerate() {
            if !constraint.groups().contains(group) {
                debug!(index, group, "any-of satisfied by a child outside the pass");
                return Ok(());
            }
            let mut inner = ctx.isolated();
            constraint.validate(value, &mut inner)?;
            let violations = inner.into_violations();
            let Some(first) = violations.get(0) else {
                debug!(index, "any-of satisfied");
                return Ok(());
            };
            if self.include_internal_messages {
                let detail = if matches!(constraint, Constraint::Each(_)) {
                    Self::COLLECTION_MESSAGE
                } else {
                    first.message()
                };
                message.push_str(&format!(" [{}] {detail}", index + 1));
            }
        }
        ctx.build_violation(message)
            .set_code(Self::AT_LEAST_ONE_OF_ERROR)
            .add_violation();
        Ok(())
    }

    fn validate_exactly(
        &self,
        n: usize,
        value: &Value,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(), ValidatorError> {
        let group = ctx.group();
        let mut passed = 0;
        for constraint in &self.constraints {
            // A child outside the pass counts as satisfied.
            if !constraint.groups().contains(group) {
                passed += 1;
                continue;
            }
            let mut inner = ctx.isolated();
            constraint.validate(value, &mut inner)?;
            if inner.violations().is_empty() {
                passed += 1;
            }
        }
        if passed != n {
            let template = self
                .message
                .clone()
                .unwrap_or_else(|| Self::EXACTLY_N_MESSAGE.to_owned());
            ctx.build_violation(template)
                .set_parameter("{{ limit }}", n.to_string())
                .set_plural(n as u64)
                .set_code(Self::NOT_EXACTLY_N_ERROR)
                .set_invalid_value(value.clone())
                .add_violation();
        }
        Ok(())
    }

    fn validate_sequentially(
        &self,
        value: &Value,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(), ValidatorError> {
        for (index, constraint) in self.active(ctx.group()) {
            let before = ctx.violations().len();
            constraint.validate(value, ctx)?;
            if ctx.violations().len() > before {
                debug!(index, constraint = constraint.name(), "sequence stopped");
                break;
            }
        }
        Ok(())
    }
}

impl Validate for Composite {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        match self.policy {
            CompositePolicy::AllOf => ctx.validate_nested(value, &self.constraints),
            CompositePolicy::AnyOf => self.validate_any_of(value, ctx),
            CompositePolicy::ExactlyN(n) => self.validate_exactly(n, value, ctx),
            CompositePolicy::Sequential => self.validate_sequentially(value, ctx),
        }
    }
}

// ============================================================================
// WHEN
// ============================================================================

/// Runs `constraints` when an expression is truthy and `otherwise` when it
/// is not.
///
/// The expression is evaluated by the configured
/// [`ExpressionEvaluator`](crate::services::ExpressionEvaluator) with the
/// variables `value`, `this` (the owning object, or null) and every entry of
/// `values`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "WhenOptions")]
pub struct When {
    expression: String,
    constraints: Vec<Constraint>,
    otherwise: Vec<Constraint>,
    values: IndexMap<String, Value>,
    pub(crate) groups: Groups,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WhenOptions {
    expression: String,
    constraints: Vec<Constraint>,
    #[serde(default)]
    otherwise: Vec<Constraint>,
    #[serde(default)]
    values: IndexMap<String, Value>,
    #[serde(default)]
    groups: Groups,
}

impl TryFrom<WhenOptions> for When {
    type Error = DefinitionError;

    fn try_from(options: WhenOptions) -> Result<Self, Self::Error> {
        let mut when = Self::new(options.expression, options.constraints, options.otherwise)?;
        when.values = options.values;
        when.with_groups(options.groups)
    }
}

impl When {
    /// Conditional constraint lists; `otherwise` may be empty.
    pub fn new(
        expression: impl Into<String>,
        mut constraints: Vec<Constraint>,
        mut otherwise: Vec<Constraint>,
    ) -> Result<Self, DefinitionError> {
        let expression = expression.into();
        if expression.trim().is_empty() {
            return Err(DefinitionError::invalid_option(
                "When",
                "expression",
                "must not be empty",
            ));
        }
        if constraints.is_empty() {
            return Err(DefinitionError::MissingOption {
                constraint: "When",
                options: "\"constraints\"",
            });
        }
        let mut groups = Groups::default();
        reconcile_groups(
            "When",
            &mut groups,
            constraints.iter_mut().chain(otherwise.iter_mut()),
        )?;
        Ok(Self {
            expression,
            constraints,
            otherwise,
            values: IndexMap::new(),
            groups,
        })
    }

    /// Extra variables for the expression.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_values(mut self, values: IndexMap<String, Value>) -> Self {
        self.values = values;
        self
    }

    /// Sets explicit groups and hands them down to both lists.
    pub fn with_groups(mut self, groups: Groups) -> Result<Self, DefinitionError> {
        if groups.is_explicit() {
            self.groups = groups;
            reconcile_groups(
                "When",
                &mut self.groups,
                self.constraints.iter_mut().chain(self.otherwise.iter_mut()),
            )?;
        }
        Ok(self)
    }

    /// The condition expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Groups, Vec<&mut Constraint>) {
        let nested = self.constraints.iter_mut().chain(self.otherwise.iter_mut()).collect();
        (&mut self.groups, nested)
    }
}

impl Validate for When {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let evaluator =
            ctx.services()
                .expression_evaluator()
                .ok_or(ValidatorError::MissingService {
                    constraint: "When",
                    service: "expression evaluator",
                })?;

        let mut variables = IndexMap::with_capacity(self.values.len() + 2);
        variables.insert("value".to_owned(), value.clone());
        variables.insert("this".to_owned(), ctx.object().cloned().unwrap_or(Value::Null));
        variables.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));

        let outcome = evaluator
            .evaluate(&self.expression, &variables)
            .map_err(|source| ValidatorError::Service {
                service: "expression evaluator",
                source,
            })?;
        if outcome.is_truthy() {
            ctx.validate_nested(value, &self.constraints)
        } else {
            debug!(expression = %self.expression, "condition false, running otherwise");
            ctx.validate_nested(value, &self.otherwise)
        }
    }
}

// ============================================================================
// EACH
// ============================================================================

/// Applies nested constraints to every element of an array or every value
/// of an object, at the sub-path `[index]` or `[key]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "EachOptions")]
pub struct Each {
    constraints: Vec<Constraint>,
    pub(crate) groups: Groups,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EachOptions {
    constraints: Vec<Constraint>,
    #[serde(default)]
    groups: Groups,
}

impl TryFrom<EachOptions> for Each {
    type Error = DefinitionError;

    fn try_from(options: EachOptions) -> Result<Self, Self::Error> {
        Self::new(options.constraints)?.with_groups(options.groups)
    }
}

impl Each {
    /// Constraints applied to each element.
    pub fn new(mut constraints: Vec<Constraint>) -> Result<Self, DefinitionError> {
        if constraints.is_empty() {
            return Err(DefinitionError::MissingOption {
                constraint: "Each",
                options: "\"constraints\"",
            });
        }
        let mut groups = Groups::default();
        reconcile_groups("Each", &mut groups, constraints.iter_mut())?;
        Ok(Self {
            constraints,
            groups,
        })
    }

    /// Sets explicit groups and hands them down to the children.
    pub fn with_groups(mut self, groups: Groups) -> Result<Self, DefinitionError> {
        if groups.is_explicit() {
            self.groups = groups;
            reconcile_groups("Each", &mut self.groups, self.constraints.iter_mut())?;
        }
        Ok(self)
    }

    /// The nested constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Groups, Vec<&mut Constraint>) {
        (&mut self.groups, self.constraints.iter_mut().collect())
    }
}

impl Validate for Each {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        match value {
            Value::Null => Ok(()),
            Value::Array(items) => items.iter().enumerate().try_for_each(|(index, item)| {
                ctx.in_subpath(&format!("[{index}]"), |ctx| {
                    ctx.validate_nested(item, &self.constraints)
                })
            }),
            Value::Object(entries) => entries.iter().try_for_each(|(key, item)| {
                ctx.in_subpath(&format!("[{key}]"), |ctx| {
                    ctx.validate_nested(item, &self.constraints)
                })
            }),
            other => Err(ValidatorError::unexpected_type("array or object", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Comparison, ComparisonOperator, Length, NotBlank, NotNull};
    use crate::foundation::ServiceError;
    use crate::services::Services;
    use crate::testing::{
        single_code, try_validate_in_with, try_validate_with, validate, validate_in_group,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn greater_than(limit: i64) -> Constraint {
        Comparison::new(ComparisonOperator::GreaterThan, limit).into()
    }

    fn less_than(limit: i64) -> Constraint {
        Comparison::new(ComparisonOperator::LessThan, limit).into()
    }

    fn in_groups(constraint: impl Into<Constraint>, groups: &[&str]) -> Constraint {
        constraint
            .into()
            .with_groups(Groups::new(groups.iter().copied()))
            .unwrap()
    }

    // ========================================================================
    // GROUPS
    // ========================================================================

    #[test]
    fn explicit_groups_flow_down() {
        let inner = Composite::new(CompositePolicy::AllOf, vec![NotBlank::default().into()]).unwrap();
        let outer = Composite::new(CompositePolicy::AllOf, vec![inner.into()])
            .unwrap()
            .with_groups(Groups::new(["strict"]))
            .unwrap();

        let Constraint::Composite(inner) = &outer.constraints()[0] else {
            panic!("expected composite child");
        };
        assert!(inner.groups.contains("strict"));
        assert!(inner.constraints()[0].groups().contains("strict"));
        assert!(!inner.constraints()[0].groups().contains("Default"));
    }

    #[test]
    fn child_groups_must_be_subset() {
        let child = in_groups(NotNull::default(), &["a", "b"]);
        let err = Composite::new(CompositePolicy::AllOf, vec![child])
            .unwrap()
            .with_groups(Groups::new(["a"]))
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::GroupNotInParent {
                groups: "b".to_owned(),
                constraint: "NotNull",
                parent: "Composite",
            }
        );
    }

    #[test]
    fn implicit_container_adopts_union() {
        let composite = Composite::new(
            CompositePolicy::AllOf,
            vec![in_groups(NotNull::default(), &["a"]), NotBlank::default().into()],
        )
        .unwrap();
        assert_eq!(composite.groups.effective(), vec!["a", "Default"]);
    }

    #[test]
    fn children_outside_the_pass_are_skipped() {
        let composite = Composite::new(
            CompositePolicy::AllOf,
            vec![in_groups(less_than(0), &["strict"]), greater_than(10)],
        )
        .unwrap();
        assert!(validate(&composite, &Value::from(20)).is_empty());
        assert_eq!(
            single_code(&validate_in_group(&composite, &Value::from(20), "strict")),
            Comparison::TOO_HIGH_ERROR
        );
    }

    #[test]
    fn any_of_treats_children_outside_the_pass_as_satisfied() {
        let composite = Composite::new(
            CompositePolicy::AnyOf,
            vec![
                in_groups(NotBlank::default(), &["a"]),
                in_groups(Length::min(5), &["b"]),
            ],
        )
        .unwrap();
        assert!(validate_in_group(&composite, &Value::from(""), "a").is_empty());
        assert!(validate_in_group(&composite, &Value::from(""), "b").is_empty());
    }

    #[test]
    fn exactly_n_counts_children_outside_the_pass() {
        let composite = Composite::new(
            CompositePolicy::ExactlyN(1),
            vec![in_groups(greater_than(10), &["a"]), in_groups(less_than(0), &["b"])],
        )
        .unwrap();
        // 20 passes the active child and the inactive one counts too.
        assert_eq!(
            single_code(&validate_in_group(&composite, &Value::from(20), "a")),
            Composite::NOT_EXACTLY_N_ERROR
        );
        assert!(validate_in_group(&composite, &Value::from(5), "a").is_empty());
    }

    #[test]
    fn empty_composite_is_rejected() {
        assert!(Composite::new(CompositePolicy::AllOf, Vec::new()).is_err());
        assert!(Composite::new(CompositePolicy::ExactlyN(2), vec![greater_than(0)]).is_err());
    }

    // ========================================================================
    // POLICIES
    // ========================================================================

    #[test]
    fn all_of_accumulates() {
        let composite = Composite::new(
            CompositePolicy::AllOf,
            vec![greater_than(10), less_than(0)],
        )
        .unwrap();
        assert_eq!(validate(&composite, &Value::from(5)).len(), 2);
    }

    #[test]
    fn sequential_stops_at_first_failure() {
        let composite = Composite::new(
            CompositePolicy::Sequential,
            vec![greater_than(10), less_than(0)],
        )
        .unwrap();
        let violations = validate(&composite, &Value::from(5));
        assert_eq!(single_code(&violations), Comparison::TOO_LOW_ERROR);
    }

    #[rstest]
    #[case(15, true)]
    #[case(-3, true)]
    #[case(5, false)]
    fn any_of_needs_one_pass(#[case] input: i64, #[case] valid: bool) {
        let composite = Composite::new(
            CompositePolicy::AnyOf,
            vec![greater_than(10), less_than(0)],
        )
        .unwrap();
        assert_eq!(validate(&composite, &Value::from(input)).is_empty(), valid);
    }

    #[test]
    fn any_of_lists_internal_messages() {
        let composite = Composite::new(
            CompositePolicy::AnyOf,
            vec![greater_than(10), Length::max(1).into()],
        )
        .unwrap();
        let violations = validate(&composite, &Value::from("!!"));
        assert_eq!(single_code(&violations), Composite::AT_LEAST_ONE_OF_ERROR);
        assert_eq!(
            violations.get(0).unwrap().message(),
            "This value should satisfy at least one of the following constraints: \
             [1] This value should be greater than 10. \
             [2] This value is too long. It should have 1 character or less."
        );

        let terse = composite.without_internal_messages();
        let violations = validate(&terse, &Value::from("!!"));
        assert_eq!(
            violations.get(0).unwrap().message(),
            "This value should satisfy at least one of the following constraints:"
        );
    }

    #[rstest]
    #[case(15, true)]
    #[case(5, false)]
    #[case(-5, false)]
    fn exactly_n_counts_passes(#[case] input: i64, #[case] valid: bool) {
        let composite = Composite::new(
            CompositePolicy::ExactlyN(2),
            vec![greater_than(0), greater_than(10), less_than(0)],
        )
        .unwrap();
        let violations = validate(&composite, &Value::from(input));
        assert_eq!(violations.is_empty(), valid);
        if !valid {
            assert_eq!(
                violations.get(0).unwrap().message(),
                "This value should satisfy exactly 2 of the following constraints."
            );
        }
    }

    #[test]
    fn composite_loads_from_json() {
        let composite: Composite = serde_json::from_str(
            r#"{
                "policy": { "exactly_n": 1 },
                "constraints": [{ "type": "not_blank" }],
                "groups": ["signup"]
            }"#,
        )
        .unwrap();
        assert_eq!(composite.policy(), CompositePolicy::ExactlyN(1));
        assert!(composite.constraints()[0].groups().contains("signup"));
    }

    // ========================================================================
    // WHEN
    // ========================================================================

    fn evaluator() -> Services {
        Services::empty().with_expression_evaluator(
            |expression: &str, variables: &IndexMap<String, Value>| {
                let key = expression.trim_start_matches("this.");
                let this = &variables["this"];
                Ok::<_, ServiceError>(this.lookup(key).cloned().unwrap_or(Value::Null))
            },
        )
    }

    #[rstest]
    #[case(true, "", Some(NotBlank::IS_BLANK_ERROR))]
    #[case(false, "", None)]
    #[case(false, "toolong", Some(Length::TOO_LONG_ERROR))]
    fn when_picks_branch(#[case] flag: bool, #[case] input: &str, #[case] expected: Option<&str>) {
        let when = When::new(
            "this.required",
            vec![NotBlank::default().into()],
            vec![Length::max(3).into()],
        )
        .unwrap();
        let object: Value = serde_json::json!({ "required": flag, "name": input }).into();
        let violations = try_validate_in_with(&when, &Value::from(input), &object, evaluator()).unwrap();
        assert_eq!(violations.codes().first().copied(), expected);
    }

    #[test]
    fn when_sees_configured_values() {
        let services = Services::empty().with_expression_evaluator(
            |_: &str, variables: &IndexMap<String, Value>| {
                Ok::<_, ServiceError>(variables["enabled"].clone())
            },
        );
        let mut values = IndexMap::new();
        values.insert("enabled".to_owned(), Value::from(true));
        let when = When::new("enabled", vec![NotBlank::default().into()], Vec::new())
            .unwrap()
            .with_values(values);
        let violations = try_validate_with(&when, &Value::from(""), services).unwrap();
        assert_eq!(single_code(&violations), NotBlank::IS_BLANK_ERROR);
    }

    #[test]
    fn when_without_evaluator_is_fatal() {
        let when = When::new("true", vec![NotBlank::default().into()], Vec::new()).unwrap();
        let err = try_validate_with(&when, &Value::from("x"), Services::empty()).unwrap_err();
        assert!(matches!(
            err,
            ValidatorError::MissingService { service: "expression evaluator", .. }
        ));
    }

    #[test]
    fn when_requires_constraints() {
        assert!(When::new("true", Vec::new(), Vec::new()).is_err());
        assert!(When::new(" ", vec![NotBlank::default().into()], Vec::new()).is_err());
    }

    // ========================================================================
    // EACH
    // ========================================================================

    #[test]
    fn each_reports_element_paths() {
        let each = Each::new(vec![greater_than(0)]).unwrap();
        let input: Value = serde_json::json!([1, -1, 2, 0]).into();
        let violations = validate(&each, &input);
        let paths: Vec<_> = violations.iter().map(|v| v.property_path()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
    }

    #[test]
    fn each_walks_object_values() {
        let each = Each::new(vec![NotBlank::default().into()]).unwrap();
        let input: Value = serde_json::json!({ "first": "a", "last": "" }).into();
        let violations = validate(&each, &input);
        assert_eq!(violations.get(0).unwrap().property_path(), "[last]");
    }

    #[test]
    fn each_rejects_scalars() {
        let each = Each::new(vec![NotBlank::default().into()]).unwrap();
        let err = crate::testing::try_validate(&each, &Value::from("x")).unwrap_err();
        assert!(matches!(err, ValidatorError::UnexpectedType { .. }));
        assert!(validate(&each, &Value::Null).is_empty());
    }
}
