//! Macros for declaring constraints with minimal boilerplate.
//!
//! # Available Macros
//!
//! - [`error_codes!`]: error code constants plus their name table
//! - [`all_of!`]: composite where every child must pass
//! - [`any_of!`]: composite where at least one child must pass
//! - [`sequentially!`]: composite that stops at the first failing child
//!
//! # Examples
//!
//! ```rust
//! use rampart_validator::{all_of, error_codes};
//! use rampart_validator::constraints::{Length, NotBlank};
//!
//! pub struct Sku;
//!
//! impl Sku {
//!     error_codes! {
//!         /// The SKU has the wrong shape.
//!         INVALID_FORMAT_ERROR = "0a1e4a33-5d0d-4d4b-9c43-0a8f1e1c6f01";
//!     }
//! }
//!
//! assert_eq!(Sku::ERROR_NAMES, &[("0a1e4a33-5d0d-4d4b-9c43-0a8f1e1c6f01", "INVALID_FORMAT_ERROR")]);
//!
//! let rule = all_of![NotBlank::default(), Length::between(3, 12).unwrap()].unwrap();
//! ```

// ============================================================================
// ERROR CODES MACRO
// ============================================================================

/// Declares error-code constants inside an `impl` block together with an
/// `ERROR_NAMES` table mapping each code to its constant name.
#[macro_export]
macro_rules! error_codes {
    ($( $(#[$meta:meta])* $name:ident = $code:literal; )+) => {
        $(
            $(#[$meta])*
            pub const $name: &'static str = $code;
        )+

        /// Error code to constant-name pairs.
        pub const ERROR_NAMES: &'static [(&'static str, &'static str)] = &[
            $( ($code, stringify!($name)), )+
        ];
    };
}

// ============================================================================
// CONSTRAINT KINDS MACRO
// ============================================================================

/// Generates the [`Constraint`](crate::constraints::Constraint) sum type,
/// its `From` conversions, and the single-match dispatch.
macro_rules! constraint_kinds {
    ($( $(#[$meta:meta])* $variant:ident($ty:ty) => $name:literal, )+) => {
        /// Every constraint kind, tagged by `type` in rule files.
        #[derive(Debug, Clone, serde::Deserialize)]
        #[serde(tag = "type", rename_all = "snake_case")]
        pub enum Constraint {
            $( $(#[$meta])* $variant($ty), )+
        }

        impl Constraint {
            /// Display name of the constraint kind.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $name, )+
                }
            }

            /// Validation groups of this constraint.
            pub fn groups(&self) -> &$crate::foundation::Groups {
                match self {
                    $( Self::$variant(c) => &c.groups, )+
                }
            }

            pub(crate) fn groups_mut(&mut self) -> &mut $crate::foundation::Groups {
                match self {
                    $( Self::$variant(c) => &mut c.groups, )+
                }
            }
        }

        impl $crate::foundation::Validate for Constraint {
            fn validate(
                &self,
                value: &$crate::foundation::Value,
                ctx: &mut $crate::foundation::ExecutionContext<'_>,
            ) -> Result<(), $crate::foundation::ValidatorError> {
                match self {
                    $( Self::$variant(c) => c.validate(value, ctx), )+
                }
            }
        }

        $(
            impl From<$ty> for Constraint {
                fn from(constraint: $ty) -> Self {
                    Self::$variant(constraint)
                }
            }
        )+
    };
}

pub(crate) use constraint_kinds;

// ============================================================================
// COMPOSITION MACROS
// ============================================================================

/// Builds an all-of composite (`Compound`) from constraints.
///
/// Returns `Result<Constraint, DefinitionError>`.
#[macro_export]
macro_rules! all_of {
    ($($constraint:expr),+ $(,)?) => {
        $crate::constraints::Composite::new(
            $crate::constraints::CompositePolicy::AllOf,
            vec![$($crate::constraints::Constraint::from($constraint)),+],
        )
        .map($crate::constraints::Constraint::from)
    };
}

/// Builds an at-least-one-of composite from constraints.
///
/// Returns `Result<Constraint, DefinitionError>`.
#[macro_export]
macro_rules! any_of {
    ($($constraint:expr),+ $(,)?) => {
        $crate::constraints::Composite::new(
            $crate::constraints::CompositePolicy::AnyOf,
            vec![$($crate::constraints::Constraint::from($constraint)),+],
        )
        .map($crate::constraints::Constraint::from)
    };
}

/// Builds a sequential composite from constraints.
///
/// Returns `Result<Constraint, DefinitionError>`.
#[macro_export]
macro_rules! sequentially {
    ($($constraint:expr),+ $(,)?) => {
        $crate::constraints::Composite::new(
            $crate::constraints::CompositePolicy::Sequential,
            vec![$($crate::constraints::Constraint::from($constraint)),+],
        )
        .map($crate::constraints::Constraint::from)
    };
}
