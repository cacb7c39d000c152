//! Building blocks shared by every constraint.
//!
//! - **Values**: [`Value`], the dynamic input under validation
//! - **Violations**: [`Violation`], [`ViolationList`]
//! - **Context**: [`ExecutionContext`], [`ViolationBuilder`]
//! - **Errors**: [`DefinitionError`], [`ValidatorError`], [`ServiceError`]
//! - **Groups**: [`Groups`], [`DEFAULT_GROUP`]
//! - **Trait**: [`Validate`]
//!
//! # Examples
//!
//! ```
//! use rampart_validator::foundation::Value;
//! use rampart_validator::constraints::NotBlank;
//! use rampart_validator::Validator;
//!
//! let validator = Validator::new();
//! let violations = validator
//!     .validate(&Value::from("  "), &[NotBlank::default().trimmed().into()])
//!     .unwrap();
//! assert_eq!(violations.len(), 1);
//! ```

pub mod context;
pub mod error;
pub mod groups;
pub mod traits;
pub mod value;
pub mod violation;

pub use context::{ExecutionContext, ViolationBuilder};
pub use error::{DefinitionError, ServiceError, ValidatorError};
pub use groups::{DEFAULT_GROUP, Groups};
pub use traits::{Validate, text_input};
pub use value::{Number, Value};
pub use violation::{Violation, ViolationList};

