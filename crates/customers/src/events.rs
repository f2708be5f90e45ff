use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use patron_events::Event;

use crate::address::Address;
use crate::customer::CustomerRef;

/// Event: CustomerEmailUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEmailUpdated {
    pub subject: CustomerRef,
    pub previous: Option<String>,
    pub current: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CustomerMobileNumberUpdated.
///
/// Both values are the composed number (country code, area code and number
/// concatenated without separators).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMobileNumberUpdated {
    pub subject: CustomerRef,
    pub previous: Option<String>,
    pub current: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CustomerAddressUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddressUpdated {
    pub subject: CustomerRef,
    pub previous: Option<Address>,
    pub current: Address,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerEvent {
    EmailUpdated(CustomerEmailUpdated),
    MobileNumberUpdated(CustomerMobileNumberUpdated),
    AddressUpdated(CustomerAddressUpdated),
}

impl CustomerEvent {
    /// Name of the customer field the event describes.
    pub fn field(&self) -> &'static str {
        match self {
            CustomerEvent::EmailUpdated(_) => "email",
            CustomerEvent::MobileNumberUpdated(_) => "mobile_number",
            CustomerEvent::AddressUpdated(_) => "address",
        }
    }

    pub fn subject(&self) -> &CustomerRef {
        match self {
            CustomerEvent::EmailUpdated(e) => &e.subject,
            CustomerEvent::MobileNumberUpdated(e) => &e.subject,
            CustomerEvent::AddressUpdated(e) => &e.subject,
        }
    }
}

impl Event for CustomerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CustomerEvent::EmailUpdated(_) => "customers.customer.email_updated",
            CustomerEvent::MobileNumberUpdated(_) => "customers.customer.mobile_number_updated",
            CustomerEvent::AddressUpdated(_) => "customers.customer.address_updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CustomerEvent::EmailUpdated(e) => e.occurred_at,
            CustomerEvent::MobileNumberUpdated(e) => e.occurred_at,
            CustomerEvent::AddressUpdated(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::CustomerKind;

    fn subject() -> CustomerRef {
        CustomerRef {
            id: None,
            kind: CustomerKind::Native,
        }
    }

    #[test]
    fn event_type_and_field_match_variant() {
        let event = CustomerEvent::MobileNumberUpdated(CustomerMobileNumberUpdated {
            subject: subject(),
            previous: None,
            current: "905321234567".to_string(),
            occurred_at: Utc::now(),
        });

        assert_eq!(event.event_type(), "customers.customer.mobile_number_updated");
        assert_eq!(event.field(), "mobile_number");
        assert_eq!(event.version(), 1);
        assert_eq!(event.subject().kind, CustomerKind::Native);
    }

    #[test]
    fn address_event_serializes_previous_as_null() {
        let event = CustomerEvent::AddressUpdated(CustomerAddressUpdated {
            subject: subject(),
            previous: None,
            current: Address::new("Ankara", "Cankaya", "Kizilay"),
            occurred_at: Utc::now(),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert!(json["AddressUpdated"]["previous"].is_null());
        assert_eq!(json["AddressUpdated"]["current"]["city"], "Ankara");
    }
}
