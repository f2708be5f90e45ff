//! Customers domain module (native and foreign customers).
//!
//! This crate contains the customer aggregate, its rule sets and domain events,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).
//! [`record`] describes how a customer maps onto a single-table row.

pub mod address;
pub mod customer;
pub mod events;
pub mod record;
pub mod validator;

pub use address::Address;
pub use customer::{
    Customer, CustomerId, CustomerKind, CustomerRef, CustomerState, CustomerVariant,
    PersonalDetails, age_between, to_full_mobile_number,
};
pub use events::{
    CustomerAddressUpdated, CustomerEmailUpdated, CustomerEvent, CustomerMobileNumberUpdated,
};
pub use record::{AuditInfo, CustomerRecord, Discriminator};
pub use validator::{
    CustomerRuleSet, CustomerValidator, ForeignCustomerValidator, NativeCustomerValidator,
    UNSET_BIRTH_DATE,
};
