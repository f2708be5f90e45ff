//! Column contract of the `Customers` table.
//!
//! All customer variants share this one table. Migrations live outside this
//! crate; [`COLUMNS`] is what they have to produce, and [`check_record`]
//! rejects rows a relational store would refuse.

use patron_core::{DomainError, DomainResult};
use patron_customers::CustomerRecord;
use patron_customers::validator::{
    ADDRESS_LINE_MAX, ADDRESS_NUMBER_MAX, CITIZEN_NUMBER_MAX, EMAIL_MAX, FIRST_NAME_MAX,
    LAST_NAME_MAX, MOBILE_AREA_CODE_MAX, MOBILE_COUNTRY_CODE_MAX, MOBILE_NUMBER_MAX,
    NATIONALITY_CODE_MAX, PASSPORT_NUMBER_MAX,
};

pub const TABLE_NAME: &str = "Customers";

use ColumnType::{Bool, DateTime, Identity, Text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Generated integer key.
    Identity,
    Text,
    DateTime,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
    /// `None` means unbounded.
    pub max_length: Option<usize>,
    pub nullable: bool,
}

const fn col(
    name: &'static str,
    column_type: ColumnType,
    max_length: Option<usize>,
    nullable: bool,
) -> Column {
    Column {
        name,
        column_type,
        max_length,
        nullable,
    }
}

pub const COLUMNS: &[Column] = &[
    col("Id", Identity, None, false),
    col("Discriminator", Text, None, false),
    col("BirthDateUtc", DateTime, None, false),
    col("CreatedBy", Text, None, true),
    col("CreatedDateUtc", DateTime, None, false),
    col("Email", Text, Some(EMAIL_MAX), true),
    col("FirstName", Text, Some(FIRST_NAME_MAX), false),
    col("IsDeleted", Bool, None, false),
    col("LastName", Text, Some(LAST_NAME_MAX), false),
    col("MobileAreaCode", Text, Some(MOBILE_AREA_CODE_MAX), true),
    col("MobileCountryCode", Text, Some(MOBILE_COUNTRY_CODE_MAX), true),
    col("MobileNumber", Text, Some(MOBILE_NUMBER_MAX), true),
    col("NationalityCode", Text, Some(NATIONALITY_CODE_MAX), false),
    col("UpdatedBy", Text, None, true),
    col("UpdatedDateUtc", DateTime, None, true),
    col("CitizenNumber", Text, Some(CITIZEN_NUMBER_MAX), true),
    col("PassportNumber", Text, Some(PASSPORT_NUMBER_MAX), true),
    col("AddressCity", Text, Some(ADDRESS_LINE_MAX), true),
    col("AddressTown", Text, Some(ADDRESS_LINE_MAX), true),
    col("AddressNeighborhood", Text, Some(ADDRESS_LINE_MAX), true),
    col("AddressStreet", Text, Some(ADDRESS_LINE_MAX), true),
    col("AddressGateNumber", Text, Some(ADDRESS_NUMBER_MAX), true),
    col("AddressApartmentNumber", Text, Some(ADDRESS_NUMBER_MAX), true),
];

pub fn column(name: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.name == name)
}

fn text_values(r: &CustomerRecord) -> [(&'static str, Option<&str>); 18] {
    [
        ("Discriminator", Some(r.discriminator.as_str())),
        ("CreatedBy", r.audit.created_by.as_deref()),
        ("Email", r.email.as_deref()),
        ("FirstName", Some(r.first_name.as_str())),
        ("LastName", Some(r.last_name.as_str())),
        ("MobileAreaCode", r.mobile_area_code.as_deref()),
        ("MobileCountryCode", r.mobile_country_code.as_deref()),
        ("MobileNumber", r.mobile_number.as_deref()),
        ("NationalityCode", Some(r.nationality_code.as_str())),
        ("UpdatedBy", r.audit.updated_by.as_deref()),
        ("CitizenNumber", r.citizen_number.as_deref()),
        ("PassportNumber", r.passport_number.as_deref()),
        ("AddressCity", r.address_city.as_deref()),
        ("AddressTown", r.address_town.as_deref()),
        ("AddressNeighborhood", r.address_neighborhood.as_deref()),
        ("AddressStreet", r.address_street.as_deref()),
        ("AddressGateNumber", r.address_gate_number.as_deref()),
        ("AddressApartmentNumber", r.address_apartment_number.as_deref()),
    ]
}

/// Verify every text column of `record` fits its declared length.
pub fn check_record(record: &CustomerRecord) -> DomainResult<()> {
    let mut problems = Vec::new();

    for (name, value) in text_values(record) {
        let Some(value) = value else { continue };
        let Some(max) = column(name).and_then(|c| c.max_length) else {
            continue;
        };
        let len = value.chars().count();
        if len > max {
            problems.push(format!("{name} exceeds {max} characters (got {len})"));
        }
    }

    if record.discriminator.is_empty() {
        problems.push("Discriminator must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DomainError::schema(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use patron_customers::AuditInfo;

    fn row() -> CustomerRecord {
        CustomerRecord {
            id: None,
            discriminator: "ForeignCustomer".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            birth_date_utc: Utc.with_ymd_and_hms(1988, 2, 29, 0, 0, 0).unwrap(),
            nationality_code: "PT".to_string(),
            email: None,
            mobile_country_code: None,
            mobile_area_code: None,
            mobile_number: None,
            citizen_number: None,
            passport_number: Some("CB123456".to_string()),
            address_city: None,
            address_town: None,
            address_neighborhood: None,
            address_street: None,
            address_gate_number: None,
            address_apartment_number: None,
            audit: AuditInfo::created("tester", Utc::now()),
        }
    }

    #[test]
    fn every_text_value_has_a_declared_column() {
        for (name, _) in text_values(&row()) {
            let column = column(name).unwrap_or_else(|| panic!("missing column {name}"));
            assert_eq!(column.column_type, ColumnType::Text);
        }
    }

    #[test]
    fn variant_and_optional_columns_are_nullable() {
        for name in ["CitizenNumber", "PassportNumber", "Email", "UpdatedDateUtc"] {
            assert!(column(name).unwrap().nullable, "{name} should be nullable");
        }
        for name in ["Discriminator", "FirstName", "LastName", "NationalityCode"] {
            assert!(!column(name).unwrap().nullable, "{name} should be required");
        }
        assert_eq!(column("Discriminator").unwrap().max_length, None);
        assert_eq!(column("CitizenNumber").unwrap().max_length, Some(11));
    }

    #[test]
    fn check_record_accepts_fitting_row() {
        assert!(check_record(&row()).is_ok());
    }

    #[test]
    fn check_record_lists_overlong_columns() {
        let mut r = row();
        r.passport_number = Some("P12345678901".to_string());
        r.address_gate_number = Some("1234567".to_string());

        match check_record(&r) {
            Err(DomainError::Schema(msg)) => {
                assert!(msg.contains("PassportNumber exceeds 10"));
                assert!(msg.contains("AddressGateNumber exceeds 6"));
            }
            other => panic!("Expected Schema error, got {other:?}"),
        }
    }
}
