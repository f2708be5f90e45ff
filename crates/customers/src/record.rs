//! Single-table storage mapping.
//!
//! Every customer variant is stored as one [`CustomerRecord`] row. The
//! `Discriminator` column selects the variant on the way back in, and the
//! column of the other variant stays null.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use patron_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Rules, Validator};

use crate::address::Address;
use crate::customer::{Customer, CustomerId, CustomerKind, CustomerState, CustomerVariant};
use crate::validator::CustomerRuleSet;

/// Type tag stored in the `Discriminator` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discriminator {
    /// Abstract base type; never rehydrated.
    Customer,
    NativeCustomer,
    ForeignCustomer,
}

impl Discriminator {
    pub fn as_str(self) -> &'static str {
        match self {
            Discriminator::Customer => "Customer",
            Discriminator::NativeCustomer => "NativeCustomer",
            Discriminator::ForeignCustomer => "ForeignCustomer",
        }
    }

    /// Concrete variant selected by this tag.
    pub fn kind(self) -> DomainResult<CustomerKind> {
        match self {
            Discriminator::Customer => Err(DomainError::AbstractDiscriminator),
            Discriminator::NativeCustomer => Ok(CustomerKind::Native),
            Discriminator::ForeignCustomer => Ok(CustomerKind::Foreign),
        }
    }
}

impl From<CustomerKind> for Discriminator {
    fn from(kind: CustomerKind) -> Self {
        match kind {
            CustomerKind::Native => Discriminator::NativeCustomer,
            CustomerKind::Foreign => Discriminator::ForeignCustomer,
        }
    }
}

impl core::fmt::Display for Discriminator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Discriminator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Discriminator::Customer),
            "NativeCustomer" => Ok(Discriminator::NativeCustomer),
            "ForeignCustomer" => Ok(Discriminator::ForeignCustomer),
            other => Err(DomainError::UnknownDiscriminator(other.to_string())),
        }
    }
}

/// Storage metadata carried next to the customer fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuditInfo {
    pub created_by: Option<String>,
    pub created_date_utc: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_date_utc: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl AuditInfo {
    pub fn created(by: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            created_by: Some(by.into()),
            created_date_utc: at,
            updated_by: None,
            updated_date_utc: None,
            is_deleted: false,
        }
    }

    pub fn touch(&mut self, by: impl Into<String>, at: DateTime<Utc>) {
        self.updated_by = Some(by.into());
        self.updated_date_utc = Some(at);
    }
}

/// One row of the `Customers` table.
///
/// The discriminator is kept as free text so rows with an unrecognised tag can
/// still be read and reported instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerRecord {
    pub id: Option<i32>,
    pub discriminator: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date_utc: DateTime<Utc>,
    pub nationality_code: String,
    pub email: Option<String>,
    pub mobile_country_code: Option<String>,
    pub mobile_area_code: Option<String>,
    pub mobile_number: Option<String>,
    pub citizen_number: Option<String>,
    pub passport_number: Option<String>,
    pub address_city: Option<String>,
    pub address_town: Option<String>,
    pub address_neighborhood: Option<String>,
    pub address_street: Option<String>,
    pub address_gate_number: Option<String>,
    pub address_apartment_number: Option<String>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl CustomerRecord {
    pub fn from_customer(customer: &Customer, audit: AuditInfo) -> Self {
        let state = customer.state();
        let address = state.address();

        Self {
            id: customer.id().map(|id| id.0.get()),
            discriminator: Discriminator::from(state.kind()).as_str().to_string(),
            first_name: state.first_name().to_string(),
            last_name: state.last_name().to_string(),
            birth_date_utc: state.birth_date_utc(),
            nationality_code: state.nationality_code().to_string(),
            email: state.email().map(str::to_string),
            mobile_country_code: state.mobile_country_code().map(str::to_string),
            mobile_area_code: state.mobile_area_code().map(str::to_string),
            mobile_number: state.mobile_number().map(str::to_string),
            citizen_number: state.citizen_number().map(str::to_string),
            passport_number: state.passport_number().map(str::to_string),
            address_city: address.map(|a| a.city().to_string()),
            address_town: address.map(|a| a.town().to_string()),
            address_neighborhood: address.map(|a| a.neighborhood().to_string()),
            address_street: address.and_then(|a| a.street()).map(str::to_string),
            address_gate_number: address.and_then(|a| a.gate_number()).map(str::to_string),
            address_apartment_number: address
                .and_then(|a| a.apartment_number())
                .map(str::to_string),
            audit,
        }
    }

    /// Rehydrate the aggregate this row describes, at `version`.
    ///
    /// The tag picks the variant. A missing identifying column is not filled
    /// in: it surfaces as a violation together with any other broken rule, and
    /// so does a value in the other variant's column.
    pub fn into_customer(self, version: u64) -> DomainResult<Customer> {
        let kind = self.discriminator.parse::<Discriminator>()?.kind()?;

        let mut rules = Rules::new();
        let variant = match kind {
            CustomerKind::Native => {
                rules.check(
                    "passport_number",
                    self.passport_number.is_none(),
                    "must be null for NativeCustomer rows",
                );
                CustomerVariant::native(self.citizen_number.unwrap_or_default())
            }
            CustomerKind::Foreign => {
                rules.check(
                    "citizen_number",
                    self.citizen_number.is_none(),
                    "must be null for ForeignCustomer rows",
                );
                CustomerVariant::foreign(self.passport_number.unwrap_or_default())
            }
        };

        let has_address = [
            &self.address_city,
            &self.address_town,
            &self.address_neighborhood,
            &self.address_street,
            &self.address_gate_number,
            &self.address_apartment_number,
        ]
        .iter()
        .any(|column| column.is_some());

        let address = has_address.then(|| {
            let mut address = Address::new(
                self.address_city.unwrap_or_default(),
                self.address_town.unwrap_or_default(),
                self.address_neighborhood.unwrap_or_default(),
            );
            if let Some(street) = self.address_street {
                address = address.with_street(street);
            }
            if let Some(gate) = self.address_gate_number {
                address = address.with_gate_number(gate);
            }
            if let Some(apartment) = self.address_apartment_number {
                address = address.with_apartment_number(apartment);
            }
            address
        });

        let state = CustomerState {
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date_utc: self.birth_date_utc,
            nationality_code: self.nationality_code,
            email: self.email,
            mobile_country_code: self.mobile_country_code,
            mobile_area_code: self.mobile_area_code,
            mobile_number: self.mobile_number,
            address,
            variant,
        };

        // Rule-set violations first, then stray variant columns.
        let mut all = Rules::new();
        CustomerRuleSet.collect(&state, &mut all);
        if let Err(stray) = rules.finish() {
            for violation in stray.into_vec() {
                all.violate(&violation.field, violation.reason);
            }
        }
        all.finish()?;

        let id = self.id.map(|id| CustomerId::new(AggregateId::new(id)));
        Ok(Customer::from_parts(id, version, state))
    }
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = DomainError;

    fn try_from(record: CustomerRecord) -> Result<Self, Self::Error> {
        record.into_customer(0)
    }
}
