use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use patron_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Validator};
use patron_events::{EventEnvelope, PendingEvents};

use crate::address::Address;
use crate::events::{
    CustomerAddressUpdated, CustomerEmailUpdated, CustomerEvent, CustomerMobileNumberUpdated,
};
use crate::validator::CustomerRuleSet;

/// Aggregate type name carried on event envelopes.
pub const AGGREGATE_TYPE: &str = "Customer";

/// Customer identifier (generated by persistence).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub AggregateId);

impl CustomerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Concrete customer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerKind {
    Native,
    Foreign,
}

impl CustomerKind {
    /// Type name used as the storage discriminator.
    pub fn type_name(self) -> &'static str {
        match self {
            CustomerKind::Native => "NativeCustomer",
            CustomerKind::Foreign => "ForeignCustomer",
        }
    }
}

/// Variant-specific identifying document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerVariant {
    Native { citizen_number: String },
    Foreign { passport_number: String },
}

impl CustomerVariant {
    pub fn native(citizen_number: impl Into<String>) -> Self {
        Self::Native {
            citizen_number: citizen_number.into(),
        }
    }

    pub fn foreign(passport_number: impl Into<String>) -> Self {
        Self::Foreign {
            passport_number: passport_number.into(),
        }
    }

    pub fn kind(&self) -> CustomerKind {
        match self {
            CustomerVariant::Native { .. } => CustomerKind::Native,
            CustomerVariant::Foreign { .. } => CustomerKind::Foreign,
        }
    }
}

/// Reference to the customer an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// `None` until the customer has been stored.
    pub id: Option<CustomerId>,
    pub kind: CustomerKind,
}

/// Mandatory fields supplied at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub birth_date_utc: DateTime<Utc>,
    pub nationality_code: String,
}

/// Field values of a customer, the unit the rule set validates.
///
/// Mutations build a modified copy of this, validate the copy, and only then
/// swap it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerState {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) birth_date_utc: DateTime<Utc>,
    pub(crate) nationality_code: String,
    pub(crate) email: Option<String>,
    pub(crate) mobile_country_code: Option<String>,
    pub(crate) mobile_area_code: Option<String>,
    pub(crate) mobile_number: Option<String>,
    pub(crate) address: Option<Address>,
    pub(crate) variant: CustomerVariant,
}

impl CustomerState {
    pub fn new(details: PersonalDetails, variant: CustomerVariant) -> Self {
        Self {
            first_name: details.first_name,
            last_name: details.last_name,
            birth_date_utc: details.birth_date_utc,
            nationality_code: details.nationality_code,
            email: None,
            mobile_country_code: None,
            mobile_area_code: None,
            mobile_number: None,
            address: None,
            variant,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn birth_date_utc(&self) -> DateTime<Utc> {
        self.birth_date_utc
    }

    pub fn nationality_code(&self) -> &str {
        &self.nationality_code
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn mobile_country_code(&self) -> Option<&str> {
        self.mobile_country_code.as_deref()
    }

    pub fn mobile_area_code(&self) -> Option<&str> {
        self.mobile_area_code.as_deref()
    }

    pub fn mobile_number(&self) -> Option<&str> {
        self.mobile_number.as_deref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn variant(&self) -> &CustomerVariant {
        &self.variant
    }

    pub fn kind(&self) -> CustomerKind {
        self.variant.kind()
    }

    pub fn citizen_number(&self) -> Option<&str> {
        match &self.variant {
            CustomerVariant::Native { citizen_number } => Some(citizen_number),
            CustomerVariant::Foreign { .. } => None,
        }
    }

    pub fn passport_number(&self) -> Option<&str> {
        match &self.variant {
            CustomerVariant::Foreign { passport_number } => Some(passport_number),
            CustomerVariant::Native { .. } => None,
        }
    }

    /// Composed mobile number, or `None` when no part is set.
    ///
    /// Missing parts contribute nothing, so a malformed triad still composes
    /// to whatever was stored.
    pub fn full_mobile_number(&self) -> Option<String> {
        let parts = [
            self.mobile_country_code.as_deref(),
            self.mobile_area_code.as_deref(),
            self.mobile_number.as_deref(),
        ];
        if parts.iter().all(Option::is_none) {
            return None;
        }
        let [country, area, number] = parts.map(Option::unwrap_or_default);
        Some(to_full_mobile_number(country, area, number))
    }
}

/// Concatenate mobile number parts in order, without separators.
pub fn to_full_mobile_number(country_code: &str, area_code: &str, number: &str) -> String {
    format!("{country_code}{area_code}{number}")
}

/// Whole years between `birth` and `now`.
///
/// One year is subtracted while `now` has not yet reached the birth month/day.
pub fn age_between(birth: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let mut age = now.year() - birth.year();
    if (now.month(), now.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Aggregate root: Customer (native or foreign).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: Option<CustomerId>,
    state: CustomerState,
    version: u64,
    pending: PendingEvents<CustomerEvent>,
}

impl Customer {
    /// Construct and validate a new customer.
    pub fn new(details: PersonalDetails, variant: CustomerVariant) -> DomainResult<Self> {
        let state = CustomerState::new(details, variant);
        CustomerRuleSet.validate(&state)?;
        Ok(Self::from_parts(None, 0, state))
    }

    pub fn native(
        details: PersonalDetails,
        citizen_number: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::new(details, CustomerVariant::native(citizen_number))
    }

    pub fn foreign(
        details: PersonalDetails,
        passport_number: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::new(details, CustomerVariant::foreign(passport_number))
    }

    /// Assemble an aggregate from state that has already been validated.
    pub(crate) fn from_parts(id: Option<CustomerId>, version: u64, state: CustomerState) -> Self {
        Self {
            id,
            state,
            version,
            pending: PendingEvents::new(AGGREGATE_TYPE),
        }
    }

    pub fn state(&self) -> &CustomerState {
        &self.state
    }

    pub fn first_name(&self) -> &str {
        self.state.first_name()
    }

    pub fn last_name(&self) -> &str {
        self.state.last_name()
    }

    pub fn birth_date_utc(&self) -> DateTime<Utc> {
        self.state.birth_date_utc()
    }

    pub fn nationality_code(&self) -> &str {
        self.state.nationality_code()
    }

    pub fn email(&self) -> Option<&str> {
        self.state.email()
    }

    pub fn mobile_country_code(&self) -> Option<&str> {
        self.state.mobile_country_code()
    }

    pub fn mobile_area_code(&self) -> Option<&str> {
        self.state.mobile_area_code()
    }

    pub fn mobile_number(&self) -> Option<&str> {
        self.state.mobile_number()
    }

    pub fn full_mobile_number(&self) -> Option<String> {
        self.state.full_mobile_number()
    }

    pub fn address(&self) -> Option<&Address> {
        self.state.address()
    }

    pub fn kind(&self) -> CustomerKind {
        self.state.kind()
    }

    pub fn citizen_number(&self) -> Option<&str> {
        self.state.citizen_number()
    }

    pub fn passport_number(&self) -> Option<&str> {
        self.state.passport_number()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.state.first_name, self.state.last_name)
    }

    /// Age in whole years as of now (UTC). Not cached.
    pub fn age(&self) -> i32 {
        self.age_at(Utc::now())
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> i32 {
        age_between(self.state.birth_date_utc, now)
    }

    /// Re-run the full rule set against the current state.
    pub fn validate(&self) -> DomainResult<()> {
        CustomerRuleSet.validate(&self.state)?;
        Ok(())
    }

    pub fn subject(&self) -> CustomerRef {
        CustomerRef {
            id: self.id,
            kind: self.kind(),
        }
    }

    /// Record the identity generated by persistence.
    pub fn assign_id(&mut self, id: CustomerId) -> DomainResult<()> {
        match self.id {
            Some(existing) if existing != id => Err(DomainError::conflict(format!(
                "customer already has id {existing}, cannot assign {id}"
            ))),
            _ => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    /// Events raised since the last [`Customer::take_events`].
    pub fn pending_events(&self) -> &PendingEvents<CustomerEvent> {
        &self.pending
    }

    pub fn take_events(&mut self) -> Vec<EventEnvelope<CustomerEvent>> {
        self.pending.drain()
    }

    /// Set or replace the email address.
    pub fn add_email(&mut self, email: impl Into<String>) -> DomainResult<CustomerEvent> {
        let email = email.into();
        if email.is_empty() {
            return Err(DomainError::missing("email"));
        }

        let event = CustomerEvent::EmailUpdated(CustomerEmailUpdated {
            subject: self.subject(),
            previous: self.state.email.clone(),
            current: email.clone(),
            occurred_at: Utc::now(),
        });

        let mut candidate = self.state.clone();
        candidate.email = Some(email);
        self.commit(candidate, event)
    }

    /// Set or replace all three mobile number parts together.
    pub fn add_mobile_number(
        &mut self,
        country_code: impl Into<String>,
        area_code: impl Into<String>,
        number: impl Into<String>,
    ) -> DomainResult<CustomerEvent> {
        let country_code = country_code.into();
        let area_code = area_code.into();
        let number = number.into();

        if country_code.is_empty() {
            return Err(DomainError::missing("mobile_country_code"));
        }
        if area_code.is_empty() {
            return Err(DomainError::missing("mobile_area_code"));
        }
        if number.is_empty() {
            return Err(DomainError::missing("mobile_number"));
        }

        let event = CustomerEvent::MobileNumberUpdated(CustomerMobileNumberUpdated {
            subject: self.subject(),
            previous: self.state.full_mobile_number(),
            current: to_full_mobile_number(&country_code, &area_code, &number),
            occurred_at: Utc::now(),
        });

        let mut candidate = self.state.clone();
        candidate.mobile_country_code = Some(country_code);
        candidate.mobile_area_code = Some(area_code);
        candidate.mobile_number = Some(number);
        self.commit(candidate, event)
    }

    /// Attach or replace the address (always as a whole value).
    pub fn add_address(&mut self, address: Address) -> DomainResult<CustomerEvent> {
        let event = CustomerEvent::AddressUpdated(CustomerAddressUpdated {
            subject: self.subject(),
            previous: self.state.address.clone(),
            current: address.clone(),
            occurred_at: Utc::now(),
        });

        let mut candidate = self.state.clone();
        candidate.address = Some(address);
        self.commit(candidate, event)
    }

    /// Validate `candidate` and, only if it passes, make it the live state and
    /// append `event`. On failure neither state nor pending events change.
    fn commit(
        &mut self,
        candidate: CustomerState,
        event: CustomerEvent,
    ) -> DomainResult<CustomerEvent> {
        CustomerRuleSet.validate(&candidate)?;

        self.state = candidate;
        self.version += 1;
        self.pending.record(self.version, event.clone());
        Ok(event)
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
