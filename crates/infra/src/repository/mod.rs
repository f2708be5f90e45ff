//! Customer persistence seam.

pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use patron_core::{DomainError, ExpectedVersion};
use patron_customers::{Customer, CustomerEvent, CustomerId};
use patron_events::EventEnvelope;

pub use in_memory::InMemoryCustomerRepository;

/// Events handed back by a successful save, in emission order.
pub type SavedEvents = Vec<EventEnvelope<CustomerEvent>>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The row, or the aggregate rebuilt from it, broke a domain rule.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("customer {0} not found")]
    NotFound(CustomerId),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("customer is already stored as {0}")]
    AlreadyStored(CustomerId),

    #[error("customer has not been stored yet")]
    NotStored,

    #[error("no customer ids left to assign")]
    IdsExhausted,

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Stores customers as single-table rows.
///
/// Saving drains the aggregate's pending events and returns them; whether they
/// are published anywhere is up to the caller. Soft-deleted customers are
/// invisible to `get` and `list`.
pub trait CustomerRepository: Send + Sync {
    /// Store a new customer and assign its generated id.
    fn insert(&self, customer: &mut Customer, actor: &str) -> Result<SavedEvents, RepositoryError>;

    /// Overwrite a stored customer, guarded by the version it was loaded at.
    fn update(
        &self,
        customer: &mut Customer,
        expected: ExpectedVersion,
        actor: &str,
    ) -> Result<SavedEvents, RepositoryError>;

    fn get(&self, id: CustomerId) -> Result<Customer, RepositoryError>;

    /// Live customers ordered by id.
    fn list(&self) -> Result<Vec<Customer>, RepositoryError>;

    fn soft_delete(&self, id: CustomerId, actor: &str) -> Result<(), RepositoryError>;
}

impl<R> CustomerRepository for Arc<R>
where
    R: CustomerRepository + ?Sized,
{
    fn insert(&self, customer: &mut Customer, actor: &str) -> Result<SavedEvents, RepositoryError> {
        (**self).insert(customer, actor)
    }

    fn update(
        &self,
        customer: &mut Customer,
        expected: ExpectedVersion,
        actor: &str,
    ) -> Result<SavedEvents, RepositoryError> {
        (**self).update(customer, expected, actor)
    }

    fn get(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        (**self).list()
    }

    fn soft_delete(&self, id: CustomerId, actor: &str) -> Result<(), RepositoryError> {
        (**self).soft_delete(id, actor)
    }
}
