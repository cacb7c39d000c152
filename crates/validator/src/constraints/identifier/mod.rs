//! Checksum and identifier algorithms.
//!
//! | Constraint | Identifier |
//! |---|---|
//! | [`Iban`] | International Bank Account Number |
//! | [`Bic`] | Business Identifier Code |
//! | [`Isbn`] | ISBN-10 / ISBN-13 |
//! | [`Isin`] | International Securities Identification Number |
//! | [`Issn`] | International Standard Serial Number |
//! | [`Luhn`] | card numbers and other mod-10 codes |
//! | [`Orcid`] | ORCID researcher iD |
//! | [`Uuid`] | UUID |
//! | [`Ulid`] | ULID |

mod bic;
mod iban;
mod isbn;
mod isin;
mod issn;
mod luhn;
mod orcid;
mod ulid;
mod uuid;

pub use bic::{Bic, BicMode};
pub use iban::Iban;
pub use isbn::{Isbn, IsbnType};
pub use isin::Isin;
pub use issn::Issn;
pub use luhn::{Luhn, luhn_checksum_valid};
pub use orcid::Orcid;
pub use ulid::{Ulid, UlidFormat};
pub use uuid::Uuid;
