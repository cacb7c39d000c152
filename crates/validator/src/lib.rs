//! # rampart-validator
//!
//! A catalog of declarative validation constraints and the validators that
//! run them.
//!
//! ## Quick Start
//!
//! ```rust
//! use rampart_validator::prelude::*;
//!
//! let rules: Vec<Constraint> = vec![
//!     NotBlank::default().into(),
//!     Length::between(3, 20).unwrap().into(),
//! ];
//! let violations = Validator::new().validate(&Value::from("al"), &rules).unwrap();
//! assert_eq!(violations.codes(), vec![Length::TOO_SHORT_ERROR]);
//! ```
//!
//! ## Model
//!
//! - A constraint is a typed option record ([`constraints`]).
//! - Validating a value either records [`Violation`](foundation::Violation)s
//!   in the [`ExecutionContext`](foundation::ExecutionContext) or fails with a
//!   [`ValidatorError`](foundation::ValidatorError).
//! - Misconfigured constraints are rejected when they are built, with a
//!   [`DefinitionError`](foundation::DefinitionError).
//! - Outside knowledge (breach corpus, phone plans, DNS, ...) comes from
//!   injected [`services`].
//!
//! ## Rule Files
//!
//! [`ConstraintSet`](schema::ConstraintSet) loads `field -> constraints`
//! maps from JSON or TOML; [`Validator::validate_object`] applies them.

#[macro_use]
mod macros;

pub mod codes;
pub mod constraints;
pub mod foundation;
pub mod prelude;
pub mod schema;
pub mod services;
pub mod validator;

pub use validator::{Validator, ValidatorBuilder};
