//! Prelude module for convenient imports.
//!
//! Provides a single `use rampart_validator::prelude::*;` import that brings
//! in the engine, the constraint catalog and the foundation types.
//!
//! # Examples
//!
//! ```rust
//! use rampart_validator::prelude::*;
//!
//! let rules: Vec<Constraint> = vec![NotBlank::default().into(), Iban::default().into()];
//! let violations = Validator::new()
//!     .validate(&Value::from("GB82 WEST 1234 5698 7654 32"), &rules)
//!     .unwrap();
//! assert!(violations.is_empty());
//! ```

// ============================================================================
// FOUNDATION: Values, violations, errors
// ============================================================================

pub use crate::foundation::{
    DEFAULT_GROUP, DefinitionError, ExecutionContext, Groups, Validate, ValidatorError, Value,
    Violation, ViolationList,
};

// ============================================================================
// CONSTRAINTS: Every built-in constraint
// ============================================================================

#[allow(clippy::wildcard_imports)]
pub use crate::constraints::*;

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::schema::ConstraintSet;
pub use crate::services::Services;
pub use crate::validator::{Validator, ValidatorBuilder};
