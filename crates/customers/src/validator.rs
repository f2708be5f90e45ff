//! Customer rule sets.
//!
//! [`CustomerValidator`] holds the rules every customer shares. Each variant
//! adds exactly one rule for its identifying document, and [`CustomerRuleSet`]
//! runs the shared rules followed by the rule of the customer's own variant.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};

use patron_core::{Rules, Validator};

use crate::customer::{CustomerKind, CustomerState};

pub const FIRST_NAME_MAX: usize = 50;
pub const LAST_NAME_MAX: usize = 50;
pub const NATIONALITY_CODE_MAX: usize = 10;
pub const EMAIL_MAX: usize = 50;
pub const MOBILE_COUNTRY_CODE_MAX: usize = 5;
pub const MOBILE_AREA_CODE_MAX: usize = 5;
pub const MOBILE_NUMBER_MAX: usize = 15;
pub const ADDRESS_LINE_MAX: usize = 50;
pub const ADDRESS_NUMBER_MAX: usize = 6;
pub const CITIZEN_NUMBER_MAX: usize = 11;
pub const PASSPORT_NUMBER_MAX: usize = 10;

/// Birth date of a customer nobody filled in: `0001-01-01T00:00:00Z`.
pub static UNSET_BIRTH_DATE: LazyLock<DateTime<Utc>> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
});

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Rules shared by every customer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerValidator;

impl Validator<CustomerState> for CustomerValidator {
    fn collect(&self, c: &CustomerState, rules: &mut Rules) {
        rules
            .required("first_name", Some(c.first_name()), FIRST_NAME_MAX)
            .required("last_name", Some(c.last_name()), LAST_NAME_MAX)
            .check(
                "birth_date_utc",
                c.birth_date_utc() != *UNSET_BIRTH_DATE,
                "must be set",
            )
            .required(
                "nationality_code",
                Some(c.nationality_code()),
                NATIONALITY_CODE_MAX,
            );

        if is_set(c.email()) {
            rules
                .required("email", c.email(), EMAIL_MAX)
                .email("email", c.email());
        }

        // Any one part makes the whole triad mandatory.
        let any_mobile_part = is_set(c.mobile_country_code())
            || is_set(c.mobile_area_code())
            || is_set(c.mobile_number());
        if any_mobile_part {
            rules
                .required(
                    "mobile_country_code",
                    c.mobile_country_code(),
                    MOBILE_COUNTRY_CODE_MAX,
                )
                .required("mobile_area_code", c.mobile_area_code(), MOBILE_AREA_CODE_MAX)
                .required("mobile_number", c.mobile_number(), MOBILE_NUMBER_MAX);
        }

        if let Some(address) = c.address() {
            rules
                .required("address.city", Some(address.city()), ADDRESS_LINE_MAX)
                .required("address.town", Some(address.town()), ADDRESS_LINE_MAX)
                .required(
                    "address.neighborhood",
                    Some(address.neighborhood()),
                    ADDRESS_LINE_MAX,
                )
                .max_length("address.street", address.street(), ADDRESS_LINE_MAX)
                .max_length("address.gate_number", address.gate_number(), ADDRESS_NUMBER_MAX)
                .max_length(
                    "address.apartment_number",
                    address.apartment_number(),
                    ADDRESS_NUMBER_MAX,
                );
        }
    }
}

/// Native customers must carry a citizen number.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCustomerValidator;

impl Validator<CustomerState> for NativeCustomerValidator {
    fn collect(&self, c: &CustomerState, rules: &mut Rules) {
        rules.required("citizen_number", c.citizen_number(), CITIZEN_NUMBER_MAX);
    }
}

/// Foreign customers must carry a passport number.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignCustomerValidator;

impl Validator<CustomerState> for ForeignCustomerValidator {
    fn collect(&self, c: &CustomerState, rules: &mut Rules) {
        rules.required("passport_number", c.passport_number(), PASSPORT_NUMBER_MAX);
    }
}

/// Shared rules plus the rule of the customer's own variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerRuleSet;

impl Validator<CustomerState> for CustomerRuleSet {
    fn collect(&self, c: &CustomerState, rules: &mut Rules) {
        CustomerValidator.collect(c, rules);
        match c.kind() {
            CustomerKind::Native => NativeCustomerValidator.collect(c, rules),
            CustomerKind::Foreign => ForeignCustomerValidator.collect(c, rules),
        }
    }
}
