//! `patron-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod validation;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, EventId};
pub use validation::{FieldViolation, Rules, ValidationErrors, Validator};
pub use value_object::ValueObject;
