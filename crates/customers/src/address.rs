use serde::{Deserialize, Serialize};

use patron_core::ValueObject;

/// Postal address attached to a customer.
///
/// Immutable: the `with_*` builders return a new value, and a customer's
/// address is only ever replaced as a whole. Length and presence rules are
/// checked by the customer rule set once the address is attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    city: String,
    town: String,
    neighborhood: String,
    street: Option<String>,
    gate_number: Option<String>,
    apartment_number: Option<String>,
}

impl ValueObject for Address {}

impl Address {
    pub fn new(
        city: impl Into<String>,
        town: impl Into<String>,
        neighborhood: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            town: town.into(),
            neighborhood: neighborhood.into(),
            street: None,
            gate_number: None,
            apartment_number: None,
        }
    }

    pub fn with_street(self, street: impl Into<String>) -> Self {
        Self {
            street: Some(street.into()),
            ..self
        }
    }

    pub fn with_gate_number(self, gate_number: impl Into<String>) -> Self {
        Self {
            gate_number: Some(gate_number.into()),
            ..self
        }
    }

    pub fn with_apartment_number(self, apartment_number: impl Into<String>) -> Self {
        Self {
            apartment_number: Some(apartment_number.into()),
            ..self
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn town(&self) -> &str {
        &self.town
    }

    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    pub fn street(&self) -> Option<&str> {
        self.street.as_deref()
    }

    pub fn gate_number(&self) -> Option<&str> {
        self.gate_number.as_deref()
    }

    pub fn apartment_number(&self) -> Option<&str> {
        self.apartment_number.as_deref()
    }
}
