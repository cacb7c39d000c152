//! The validator trait.

use std::borrow::Cow;

use crate::foundation::{ExecutionContext, ValidatorError, Value};

// ============================================================================
// CORE VALIDATOR TRAIT
// ============================================================================

/// Executable side of a constraint.
///
/// Implementations report failures through the context and return `Ok(())`;
/// an `Err` means validation itself could not proceed (wrong input type,
/// unresolvable property path, failing service).
///
/// # Examples
///
/// ```
/// use rampart_validator::foundation::{ExecutionContext, Validate, ValidatorError, Value};
///
/// struct NotFortyTwo;
///
/// impl Validate for NotFortyTwo {
///     fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
///         if value.loose_eq(&Value::from(42)) {
///             ctx.build_violation("This value must not be 42.")
///                 .set_code("not-42")
///                 .add_violation();
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    /// Checks `value`, recording violations in `ctx`.
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>)
    -> Result<(), ValidatorError>;
}

/// Text view of a value for string validators.
///
/// Returns `Ok(None)` for null and the empty string, which every string
/// validator treats as valid. Scalars are coerced; arrays, objects and
/// date-times are a type error.
pub fn text_input(value: &Value) -> Result<Option<Cow<'_, str>>, ValidatorError> {
    if value.is_null() || value.is_empty_text() {
        return Ok(None);
    }
    match value.to_text() {
        Some(text) => Ok(Some(text)),
        None => Err(ValidatorError::unexpected_type("string", value)),
    }
}
