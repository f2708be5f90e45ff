use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use patron_core::{AggregateId, AggregateRoot, ExpectedVersion};
use patron_customers::{AuditInfo, Customer, CustomerId, CustomerRecord};

use super::{CustomerRepository, RepositoryError, SavedEvents};
use crate::schema;

#[derive(Debug, Clone)]
struct StoredRow {
    record: CustomerRecord,
    version: u64,
}

impl StoredRow {
    fn is_live(&self) -> bool {
        !self.record.audit.is_deleted
    }
}

#[derive(Debug)]
struct Table {
    /// Wider than the `Id` column so importing `i32::MAX` cannot overflow it.
    next_id: i64,
    rows: BTreeMap<i32, StoredRow>,
}

/// In-memory `Customers` table.
///
/// Intended for tests/dev. Ids start at 1 and grow by 1, like an identity
/// column; rows pass the schema length checks before they are written.
#[derive(Debug)]
pub struct InMemoryCustomerRepository {
    table: RwLock<Table>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// Raw stored row, soft-deleted ones included.
    pub fn record(&self, id: CustomerId) -> Result<CustomerRecord, RepositoryError> {
        let table = self.table.read().map_err(|_| RepositoryError::Poisoned)?;
        table
            .rows
            .get(&id.0.get())
            .map(|row| row.record.clone())
            .ok_or(RepositoryError::NotFound(id))
    }

    /// Write a row as-is, the way an import or a foreign writer would.
    ///
    /// Only the column contract is checked; domain rules are applied when the
    /// row is loaded.
    pub fn import(&self, mut record: CustomerRecord) -> Result<CustomerId, RepositoryError> {
        schema::check_record(&record)?;

        let mut table = self.table.write().map_err(|_| RepositoryError::Poisoned)?;
        let id = match record.id {
            Some(id) => {
                if table.rows.contains_key(&id) {
                    return Err(RepositoryError::AlreadyStored(customer_id(id)));
                }
                table.next_id = table.next_id.max(i64::from(id) + 1);
                id
            }
            None => Self::allocate(&mut table)?,
        };
        record.id = Some(id);
        table.rows.insert(id, StoredRow { record, version: 0 });

        tracing::debug!(customer_id = id, "customer row imported");
        Ok(customer_id(id))
    }

    fn allocate(table: &mut Table) -> Result<i32, RepositoryError> {
        let id = i32::try_from(table.next_id).map_err(|_| RepositoryError::IdsExhausted)?;
        table.next_id += 1;
        Ok(id)
    }
}

impl Default for InMemoryCustomerRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn customer_id(id: i32) -> CustomerId {
    CustomerId::new(AggregateId::new(id))
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn insert(&self, customer: &mut Customer, actor: &str) -> Result<SavedEvents, RepositoryError> {
        if let Some(id) = customer.id() {
            return Err(RepositoryError::AlreadyStored(id));
        }

        let audit = AuditInfo::created(actor, Utc::now());
        let mut record = CustomerRecord::from_customer(customer, audit);
        if let Err(err) = schema::check_record(&record) {
            tracing::warn!("rejected customer row on insert: {err}");
            return Err(err.into());
        }

        let mut table = self.table.write().map_err(|_| RepositoryError::Poisoned)?;
        let id = Self::allocate(&mut table)?;
        customer.assign_id(customer_id(id))?;
        record.id = Some(id);
        table.rows.insert(
            id,
            StoredRow {
                record,
                version: customer.version(),
            },
        );
        drop(table);

        tracing::debug!(
            customer_id = id,
            kind = customer.kind().type_name(),
            version = customer.version(),
            "customer inserted"
        );
        Ok(customer.take_events())
    }

    fn update(
        &self,
        customer: &mut Customer,
        expected: ExpectedVersion,
        actor: &str,
    ) -> Result<SavedEvents, RepositoryError> {
        let id = customer.id().ok_or(RepositoryError::NotStored)?;

        let mut table = self.table.write().map_err(|_| RepositoryError::Poisoned)?;
        let row = table
            .rows
            .get_mut(&id.0.get())
            .filter(|row| row.is_live())
            .ok_or(RepositoryError::NotFound(id))?;

        if let Err(err) = expected.check(row.version) {
            tracing::warn!(customer_id = %id, "version conflict on update: {err}");
            return Err(RepositoryError::Concurrency(err.to_string()));
        }
        if customer.version() < row.version {
            return Err(RepositoryError::Concurrency(format!(
                "aggregate version {} is behind stored version {}",
                customer.version(),
                row.version
            )));
        }

        let mut audit = row.record.audit.clone();
        audit.touch(actor, Utc::now());
        let record = CustomerRecord::from_customer(customer, audit);
        schema::check_record(&record)?;

        *row = StoredRow {
            record,
            version: customer.version(),
        };
        drop(table);

        tracing::debug!(customer_id = %id, version = customer.version(), "customer updated");
        Ok(customer.take_events())
    }

    fn get(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        let row = {
            let table = self.table.read().map_err(|_| RepositoryError::Poisoned)?;
            table
                .rows
                .get(&id.0.get())
                .filter(|row| row.is_live())
                .cloned()
                .ok_or(RepositoryError::NotFound(id))?
        };

        row.record.into_customer(row.version).map_err(|err| {
            tracing::warn!(customer_id = %id, "stored customer failed to load: {err}");
            err.into()
        })
    }

    fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows: Vec<StoredRow> = {
            let table = self.table.read().map_err(|_| RepositoryError::Poisoned)?;
            table.rows.values().filter(|row| row.is_live()).cloned().collect()
        };

        rows.into_iter()
            .map(|row| row.record.into_customer(row.version).map_err(Into::into))
            .collect()
    }

    fn soft_delete(&self, id: CustomerId, actor: &str) -> Result<(), RepositoryError> {
        let mut table = self.table.write().map_err(|_| RepositoryError::Poisoned)?;
        let row = table
            .rows
            .get_mut(&id.0.get())
            .filter(|row| row.is_live())
            .ok_or(RepositoryError::NotFound(id))?;

        row.record.audit.is_deleted = true;
        row.record.audit.touch(actor, Utc::now());

        tracing::debug!(customer_id = %id, "customer soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use patron_core::DomainError;
    use patron_customers::{Address, CustomerEvent, PersonalDetails};

    fn setup() -> InMemoryCustomerRepository {
        patron_observability::init();
        InMemoryCustomerRepository::new()
    }

    fn customer() -> Customer {
        Customer::native(
            PersonalDetails {
                first_name: "Can".to_string(),
                last_name: "Ozturk".to_string(),
                birth_date_utc: Utc.with_ymd_and_hms(1979, 9, 1, 0, 0, 0).unwrap(),
                nationality_code: "TR".to_string(),
            },
            "10000000078",
        )
        .unwrap()
    }

    #[test]
    fn insert_assigns_sequential_ids_and_returns_events() {
        let repo = setup();

        let mut first = customer();
        first.add_email("can@example.com").unwrap();
        let events = repo.insert(&mut first, "clerk").unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].payload(), CustomerEvent::EmailUpdated(_)));
        assert!(first.pending_events().is_empty());

        let mut second = customer();
        repo.insert(&mut second, "clerk").unwrap();

        assert_eq!(first.id(), Some(customer_id(1)));
        assert_eq!(second.id(), Some(customer_id(2)));

        let row = repo.record(customer_id(1)).unwrap();
        assert_eq!(row.discriminator, "NativeCustomer");
        assert_eq!(row.audit.created_by.as_deref(), Some("clerk"));
        assert_eq!(row.audit.updated_by, None);
    }

    #[test]
    fn insert_twice_is_rejected() {
        let repo = setup();
        let mut c = customer();
        repo.insert(&mut c, "clerk").unwrap();

        assert!(matches!(
            repo.insert(&mut c, "clerk"),
            Err(RepositoryError::AlreadyStored(_))
        ));
    }

    #[test]
    fn get_rehydrates_stored_state() {
        let repo = setup();
        let mut c = customer();
        c.add_mobile_number("90", "216", "3334455").unwrap();
        c.add_address(Address::new("Istanbul", "Uskudar", "Kuzguncuk"))
            .unwrap();
        repo.insert(&mut c, "clerk").unwrap();

        let loaded = repo.get(c.id().unwrap()).unwrap();
        assert_eq!(loaded.state(), c.state());
        assert_eq!(loaded.version(), 2);
        assert!(loaded.pending_events().is_empty());
    }

    #[test]
    fn update_checks_expected_version() {
        let repo = setup();
        let mut c = customer();
        repo.insert(&mut c, "clerk").unwrap();
        let id = c.id().unwrap();

        let mut a = repo.get(id).unwrap();
        let mut b = repo.get(id).unwrap();

        a.add_email("a@example.com").unwrap();
        repo.update(&mut a, ExpectedVersion::Exact(0), "alice").unwrap();

        b.add_email("b@example.com").unwrap();
        let err = repo
            .update(&mut b, ExpectedVersion::Exact(0), "bob")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Concurrency(_)));

        let stored = repo.record(id).unwrap();
        assert_eq!(stored.email.as_deref(), Some("a@example.com"));
        assert_eq!(stored.audit.updated_by.as_deref(), Some("alice"));
        assert!(stored.audit.updated_date_utc.is_some());
    }

    #[test]
    fn update_rejects_stale_aggregate_under_any_version() {
        let repo = setup();
        let mut c = customer();
        repo.insert(&mut c, "clerk").unwrap();
        let id = c.id().unwrap();

        let mut fresh = repo.get(id).unwrap();
        let mut stale = repo.get(id).unwrap();

        fresh.add_email("fresh@example.com").unwrap();
        fresh.add_mobile_number("90", "312", "4445566").unwrap();
        repo.update(&mut fresh, ExpectedVersion::Any, "alice").unwrap();

        stale.add_email("stale@example.com").unwrap();
        let err = repo
            .update(&mut stale, ExpectedVersion::Any, "bob")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Concurrency(_)));
        assert_eq!(stale.pending_events().len(), 1);

        let stored = repo.record(id).unwrap();
        assert_eq!(stored.email.as_deref(), Some("fresh@example.com"));
        assert_eq!(repo.get(id).unwrap().version(), 2);
    }

    #[test]
    fn import_at_max_id_exhausts_identity_without_poisoning() {
        let repo = setup();
        let mut row = CustomerRecord::from_customer(
            &customer(),
            AuditInfo::created("import", Utc::now()),
        );
        row.id = Some(i32::MAX);

        assert_eq!(repo.import(row).unwrap(), customer_id(i32::MAX));

        let mut c = customer();
        assert!(matches!(
            repo.insert(&mut c, "clerk"),
            Err(RepositoryError::IdsExhausted)
        ));
        assert_eq!(c.id(), None);

        let live = repo.list().unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id(), Some(customer_id(i32::MAX)));
    }

    #[test]
    fn update_requires_stored_customer() {
        let repo = setup();
        let mut c = customer();
        assert!(matches!(
            repo.update(&mut c, ExpectedVersion::Any, "clerk"),
            Err(RepositoryError::NotStored)
        ));
    }

    #[test]
    fn soft_deleted_customers_are_hidden() {
        let repo = setup();
        let mut keep = customer();
        let mut gone = customer();
        repo.insert(&mut keep, "clerk").unwrap();
        repo.insert(&mut gone, "clerk").unwrap();

        repo.soft_delete(gone.id().unwrap(), "admin").unwrap();

        assert!(matches!(
            repo.get(gone.id().unwrap()),
            Err(RepositoryError::NotFound(_))
        ));
        let live: Vec<_> = repo.list().unwrap().iter().map(|c| c.id()).collect();
        assert_eq!(live, vec![keep.id()]);

        let row = repo.record(gone.id().unwrap()).unwrap();
        assert!(row.audit.is_deleted);
        assert_eq!(row.audit.updated_by.as_deref(), Some("admin"));

        assert!(matches!(
            repo.soft_delete(gone.id().unwrap(), "admin"),
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[test]
    fn malformed_import_fails_on_load() {
        let repo = setup();
        let mut row = CustomerRecord::from_customer(
            &customer(),
            AuditInfo::created("import", Utc::now()),
        );
        row.mobile_country_code = Some("90".to_string());

        let id = repo.import(row).unwrap();
        match repo.get(id) {
            Err(RepositoryError::Domain(DomainError::Validation(errors))) => {
                assert!(errors.has_field("mobile_area_code"));
                assert!(errors.has_field("mobile_number"));
            }
            other => panic!("Expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn import_rejects_rows_outside_the_column_contract() {
        let repo = setup();
        let mut row = CustomerRecord::from_customer(
            &customer(),
            AuditInfo::created("import", Utc::now()),
        );
        row.first_name = "x".repeat(51);

        assert!(matches!(
            repo.import(row),
            Err(RepositoryError::Domain(DomainError::Schema(_)))
        ));
    }

    #[test]
    fn import_with_explicit_id_advances_identity() {
        let repo = setup();
        let mut row = CustomerRecord::from_customer(
            &customer(),
            AuditInfo::created("import", Utc::now()),
        );
        row.id = Some(10);
        repo.import(row).unwrap();

        let mut c = customer();
        repo.insert(&mut c, "clerk").unwrap();
        assert_eq!(c.id(), Some(customer_id(11)));
    }

    #[test]
    fn works_through_arc_trait_object() {
        let repo: Arc<dyn CustomerRepository> = Arc::new(setup());
        let mut c = customer();
        repo.insert(&mut c, "clerk").unwrap();
        assert_eq!(repo.list().unwrap().len(), 1);
    }
}
