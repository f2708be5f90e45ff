//! Domain error model.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Both
/// `MissingArgument` and `Validation` leave the aggregate untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required operation input was empty or absent.
    #[error("argument `{0}` must not be empty")]
    MissingArgument(&'static str),

    /// The candidate state broke one or more field rules.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A stored type tag did not name any known variant.
    #[error("unknown discriminator: {0}")]
    UnknownDiscriminator(String),

    /// A stored type tag named the abstract base type.
    #[error("discriminator names an abstract type and cannot be rehydrated")]
    AbstractDiscriminator,

    /// A requested aggregate was not found.
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A row did not fit the storage column contract.
    #[error("schema violation: {0}")]
    Schema(String),
}

impl DomainError {
    pub fn missing(argument: &'static str) -> Self {
        Self::MissingArgument(argument)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Violations carried by a `Validation` error, if this is one.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
