//! Expression evaluation for conditional constraints.

use indexmap::IndexMap;

use crate::foundation::{ServiceError, Value};

/// Evaluates a condition expression.
///
/// No expression language ships with the crate; callers plug in their own.
/// Variables always contain `value` (the validated value) and `this` (the
/// object owning it, or null), plus any variables configured on the
/// constraint.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluates `expression`; the result is interpreted by truthiness.
    fn evaluate(
        &self,
        expression: &str,
        variables: &IndexMap<String, Value>,
    ) -> Result<Value, ServiceError>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &IndexMap<String, Value>) -> Result<Value, ServiceError> + Send + Sync,
{
    fn evaluate(
        &self,
        expression: &str,
        variables: &IndexMap<String, Value>,
    ) -> Result<Value, ServiceError> {
        self(expression, variables)
    }
}
