//! Aggregate root trait for validated, event-emitting domain models.

use crate::error::{DomainError, DomainResult};

/// Aggregate root marker + minimal interface.
///
/// Identity is assigned by persistence, so a freshly constructed aggregate has
/// no id until it is stored for the first time.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier, if one has been assigned.
    fn id(&self) -> Option<Self::Id>;

    /// Number of state changes committed on this aggregate.
    ///
    /// Every successful mutation increments it by exactly one, and the emitted
    /// event carries the resulting value as its sequence number.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for an aggregate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking.
    Any,
    /// Require the stored aggregate to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
