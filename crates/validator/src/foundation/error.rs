//! Error types.
//!
//! Three channels are kept apart:
//!
//! - [`DefinitionError`]: a constraint is misconfigured. Raised when the
//!   constraint is built (or deserialized) and never recovered.
//! - Violations: the value does not satisfy the rule. Those are not errors
//!   at all; see [`Violation`](crate::foundation::Violation).
//! - [`ValidatorError`]: validation cannot proceed, e.g. a string validator
//!   was handed an array, or an injected service failed.

use crate::foundation::Value;

// ============================================================================
// DEFINITION ERROR
// ============================================================================

/// A constraint was configured incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// None of the required options was given.
    #[error("either option {options} must be given for constraint {constraint}")]
    MissingOption {
        /// Constraint name.
        constraint: &'static str,
        /// Human readable list of acceptable options.
        options: &'static str,
    },

    /// Two options exclude each other.
    #[error("the options \"{first}\" and \"{second}\" of constraint {constraint} cannot be used together")]
    ConflictingOptions {
        /// Constraint name.
        constraint: &'static str,
        /// First option.
        first: &'static str,
        /// Second option.
        second: &'static str,
    },

    /// An option has an unusable value.
    #[error("invalid option \"{option}\" for constraint {constraint}: {reason}")]
    InvalidOption {
        /// Constraint name.
        constraint: &'static str,
        /// Option name.
        option: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A nested constraint declares groups its container does not have.
    #[error(
        "the group(s) \"{groups}\" passed to the constraint {constraint} should also be passed to its containing constraint {parent}"
    )]
    GroupNotInParent {
        /// Offending groups, comma separated.
        groups: String,
        /// Nested constraint name.
        constraint: &'static str,
        /// Container name.
        parent: &'static str,
    },

    /// A property path could not be resolved against the validated object.
    #[error("invalid property path \"{path}\" provided to constraint {constraint}: {reason}")]
    InvalidPropertyPath {
        /// The path as configured.
        path: String,
        /// Constraint name.
        constraint: &'static str,
        /// Why resolution failed.
        reason: String,
    },
}

impl DefinitionError {
    /// Shorthand for [`DefinitionError::InvalidOption`].
    pub fn invalid_option(
        constraint: &'static str,
        option: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            constraint,
            option,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// SERVICE ERROR
// ============================================================================

/// Failure reported by an injected collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The remote side answered with a non-success status.
    #[error("unexpected response status {0}")]
    Status(u16),

    /// The collaborator cannot answer this kind of question.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

// ============================================================================
// VALIDATOR ERROR
// ============================================================================

/// Validation could not run to completion.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The value has a type the validator cannot handle.
    #[error("expected argument of type \"{expected}\", \"{actual}\" given")]
    UnexpectedType {
        /// Accepted type(s).
        expected: &'static str,
        /// Actual type name.
        actual: &'static str,
    },

    /// A definition problem that only shows up against a concrete value,
    /// such as an unresolvable property path.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A constraint needs a collaborator the validator was built without.
    #[error("constraint {constraint} requires a {service}, but none is configured")]
    MissingService {
        /// Constraint name.
        constraint: &'static str,
        /// Service description.
        service: &'static str,
    },

    /// A collaborator failed.
    #[error("{service} failed")]
    Service {
        /// Service description.
        service: &'static str,
        /// Underlying failure.
        #[source]
        source: ServiceError,
    },
}

impl ValidatorError {
    /// Type mismatch for `value`.
    pub fn unexpected_type(expected: &'static str, value: &Value) -> Self {
        Self::UnexpectedType {
            expected,
            actual: value.type_name(),
        }
    }
}
