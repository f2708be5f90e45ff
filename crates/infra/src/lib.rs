//! Infrastructure layer: the storage side of the customer aggregate.
//!
//! Nothing here decides business rules. [`schema`] states the column contract a
//! relational store must honour, and [`repository`] provides the persistence
//! seam plus an in-memory implementation for tests/dev.

pub mod repository;
pub mod schema;

pub use repository::{CustomerRepository, InMemoryCustomerRepository, RepositoryError};
