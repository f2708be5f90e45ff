//! End-to-end behaviour of the customer aggregate through its public API.

use chrono::{DateTime, TimeZone, Utc};

use patron_core::{AggregateRoot, DomainError};
use patron_customers::{
    Address, AuditInfo, Customer, CustomerEvent, CustomerKind, CustomerRecord, PersonalDetails,
};
use patron_events::Event;

fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn details() -> PersonalDetails {
    PersonalDetails {
        first_name: "Zeynep".to_string(),
        last_name: "Aydin".to_string(),
        birth_date_utc: utc(2000, 6, 15),
        nationality_code: "TR".to_string(),
    }
}

#[test]
fn native_customer_lifecycle() {
    let mut customer = Customer::native(details(), "10000000146").unwrap();
    assert_eq!(customer.full_name(), "Zeynep Aydin");
    assert_eq!(customer.age_at(utc(2024, 6, 14)), 23);
    assert_eq!(customer.age_at(utc(2024, 6, 15)), 24);

    customer.add_email("zeynep@example.com").unwrap();
    customer.add_mobile_number("90", "532", "0000000").unwrap();
    let home = Address::new("Bursa", "Nilufer", "Ozluce").with_apartment_number("7");
    customer.add_address(home.clone()).unwrap();

    // Rejected calls in between leave no trace.
    assert!(matches!(
        customer.add_mobile_number("90", "", "1"),
        Err(DomainError::MissingArgument("mobile_area_code"))
    ));
    assert!(matches!(
        customer.add_email("zeynep-at-example"),
        Err(DomainError::Validation(_))
    ));

    assert_eq!(customer.version(), 3);
    assert_eq!(customer.email(), Some("zeynep@example.com"));
    assert_eq!(customer.address(), Some(&home));

    let events = customer.take_events();
    let types: Vec<_> = events.iter().map(|e| e.payload().event_type()).collect();
    assert_eq!(
        types,
        vec![
            "customers.customer.email_updated",
            "customers.customer.mobile_number_updated",
            "customers.customer.address_updated",
        ]
    );
}

#[test]
fn address_event_tracks_before_and_after() {
    let mut customer = Customer::foreign(details(), "X1234567").unwrap();
    let before = customer.address().cloned();
    let office = Address::new("Berlin", "Mitte", "Wedding").with_street("Muellerstr");

    customer.add_address(office).unwrap();

    let events = customer.take_events();
    assert_eq!(events.len(), 1);
    match events[0].payload() {
        CustomerEvent::AddressUpdated(e) => {
            assert_eq!(e.previous, before);
            assert_eq!(Some(&e.current), customer.address());
            assert_eq!(e.subject.kind, CustomerKind::Foreign);
        }
        other => panic!("Expected AddressUpdated event, got {other:?}"),
    }
}

#[test]
fn stored_row_with_broken_triad_is_not_loadable() {
    let customer = Customer::native(details(), "10000000146").unwrap();
    let audit = AuditInfo::created("import", utc(2024, 1, 1));
    let mut row = CustomerRecord::from_customer(&customer, audit);
    row.mobile_country_code = Some("90".to_string());

    let err = Customer::try_from(row).unwrap_err();
    let fields: Vec<_> = err.violations().unwrap().fields().collect();
    assert_eq!(fields, vec!["mobile_area_code", "mobile_number"]);
}

#[test]
fn variants_cannot_borrow_each_others_document() {
    let customer = Customer::native(details(), "10000000146").unwrap();
    let audit = AuditInfo::created("import", utc(2024, 1, 1));
    let mut row = CustomerRecord::from_customer(&customer, audit);
    row.discriminator = "ForeignCustomer".to_string();

    let err = Customer::try_from(row).unwrap_err();
    assert!(err.violations().unwrap().has_field("passport_number"));
    assert!(err.violations().unwrap().has_field("citizen_number"));
}
