//! Persistence specification: property checks and the verification run.
//!
//! A specification lists, for one entity type, the value each property is
//! set to and how the reloaded value is compared. `verify_the_mappings`
//! builds a single entity carrying every value, persists it once, reloads
//! it from storage and compares property by property. All mismatches are
//! collected before the run fails, so one report names every diverging
//! property.

use std::collections::BTreeSet;
use std::fmt::Debug;

use tracing::{debug, error, info};

use crate::comparer::{Comparer, ValueEquality};
use crate::error::{PropertyMismatch, VerificationError, VerificationResult};
use crate::store::EntityStore;

/// Projects a property out of an entity.
pub type Field<T, V> = fn(&mut T) -> &mut V;

trait PropertyCheck<T>: Send + Sync {
    fn property(&self) -> &str;

    fn apply(&self, entity: &mut T);

    fn verify(&self, reloaded: &mut T) -> Option<PropertyMismatch>;
}

struct ValueCheck<T, V, C> {
    property: String,
    value: V,
    field: Field<T, V>,
    comparer: C,
}

impl<T, V, C> PropertyCheck<T> for ValueCheck<T, V, C>
where
    T: 'static,
    V: Clone + Debug + Send + Sync,
    C: Comparer<V>,
{
    fn property(&self) -> &str {
        &self.property
    }

    fn apply(&self, entity: &mut T) {
        *(self.field)(entity) = self.value.clone();
    }

    fn verify(&self, reloaded: &mut T) -> Option<PropertyMismatch> {
        let actual = (self.field)(reloaded);
        if self.comparer.equals(&self.value, actual) {
            debug!(property = %self.property, "Property round-tripped");
            return None;
        }
        Some(PropertyMismatch {
            property: self.property.clone(),
            expected: format!("{:?}", self.value),
            actual: format!("{:?}", actual),
        })
    }
}

struct AssignedCheck<T> {
    property: String,
    is_assigned: fn(&T) -> bool,
}

/// Checks entity `T` against storage reached through `S`.
pub struct PersistenceSpecification<'s, T, S: ?Sized> {
    store: &'s S,
    checks: Vec<Box<dyn PropertyCheck<T>>>,
    assigned: Vec<AssignedCheck<T>>,
    required: BTreeSet<String>,
}

impl<'s, T, S> PersistenceSpecification<'s, T, S>
where
    T: Default + Clone + Send + Sync + 'static,
    S: EntityStore<T> + ?Sized,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            checks: Vec::new(),
            assigned: Vec::new(),
            required: BTreeSet::new(),
        }
    }

    /// Set `property` to `value` and expect it back unchanged.
    pub fn check_property<V>(self, property: &str, value: V, field: Field<T, V>) -> Self
    where
        V: PartialEq + Clone + Debug + Send + Sync + 'static,
    {
        self.check_property_with(property, value, field, ValueEquality)
    }

    /// Set `property` to `value` and compare the reloaded value with `comparer`.
    pub fn check_property_with<V, C>(
        mut self,
        property: &str,
        value: V,
        field: Field<T, V>,
        comparer: C,
    ) -> Self
    where
        V: Clone + Debug + Send + Sync + 'static,
        C: Comparer<V> + 'static,
    {
        self.checks.push(Box::new(ValueCheck {
            property: property.to_string(),
            value,
            field,
            comparer,
        }));
        self
    }

    /// Expect storage to have assigned `property`; nothing is written to it.
    pub fn check_storage_assigned(mut self, property: &str, is_assigned: fn(&T) -> bool) -> Self {
        self.assigned.push(AssignedCheck {
            property: property.to_string(),
            is_assigned,
        });
        self
    }

    /// Fail the run unless every one of `properties` has a check.
    pub fn require_coverage<I, P>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.required
            .extend(properties.into_iter().map(|p| p.as_ref().to_string()));
        self
    }

    /// Number of value checks registered.
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Persist one entity carrying every value, reload it and compare.
    ///
    /// Returns the reloaded entity when every property round-tripped.
    pub async fn verify_the_mappings(self) -> VerificationResult<T> {
        self.validate()?;

        let mut entity = T::default();
        for check in &self.checks {
            check.apply(&mut entity);
        }

        info!(checks = self.checks.len(), "Persisting entity for verification");
        self.store.persist(entity.clone()).await?;

        let mut reloaded = self
            .store
            .reload(&entity)
            .await?
            .ok_or(VerificationError::NotReloaded)?;

        let mismatches: Vec<PropertyMismatch> = self
            .checks
            .iter()
            .filter_map(|check| check.verify(&mut reloaded))
            .collect();

        if !mismatches.is_empty() {
            for mismatch in &mismatches {
                error!(property = %mismatch.property, "Property did not round-trip: {}", mismatch);
            }
            return Err(VerificationError::Mismatch(mismatches));
        }

        if let Some(missing) = self.assigned.iter().find(|a| !(a.is_assigned)(&reloaded)) {
            error!(property = %missing.property, "Storage-assigned property is missing");
            return Err(VerificationError::NotAssigned(missing.property.clone()));
        }

        info!(checks = self.checks.len(), "All properties round-tripped");
        Ok(reloaded)
    }

    fn validate(&self) -> VerificationResult<()> {
        let mut seen = BTreeSet::new();
        let names = self
            .checks
            .iter()
            .map(|c| c.property())
            .chain(self.assigned.iter().map(|a| a.property.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(VerificationError::DuplicateProperty(name.to_string()));
            }
        }

        let uncovered: Vec<String> = self
            .required
            .iter()
            .filter(|p| !seen.contains(p.as_str()))
            .cloned()
            .collect();
        if !uncovered.is_empty() {
            return Err(VerificationError::Uncovered(uncovered));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::WithinTolerance;
    use crate::store::MockEntityStore;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime, Timelike};
    use common::{AppError, AppResult};
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Widget {
        id: u32,
        name: String,
        flag: bool,
        stamped_at: NaiveDateTime,
        version: i64,
    }

    /// Stores one widget; optionally loses a column or truncates time.
    #[derive(Default)]
    struct FakeStore {
        row: Mutex<Option<Widget>>,
        drop_name: bool,
        truncate_to_minute: bool,
    }

    #[async_trait]
    impl EntityStore<Widget> for FakeStore {
        async fn persist(&self, mut entity: Widget) -> AppResult<()> {
            if self.drop_name {
                entity.name.clear();
            }
            if self.truncate_to_minute {
                entity.stamped_at = entity.stamped_at.with_second(0).unwrap();
            }
            entity.version = 1;
            *self.row.lock().unwrap() = Some(entity);
            Ok(())
        }

        async fn reload(&self, entity: &Widget) -> AppResult<Option<Widget>> {
            Ok(self
                .row
                .lock()
                .unwrap()
                .clone()
                .filter(|row| row.id == entity.id))
        }
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 45, 30)
            .unwrap()
    }

    fn full_specification(store: &FakeStore) -> PersistenceSpecification<'_, Widget, FakeStore> {
        PersistenceSpecification::new(store)
            .check_property("id", 7, |w: &mut Widget| &mut w.id)
            .check_property("name", "bar".to_string(), |w: &mut Widget| &mut w.name)
            .check_property("flag", true, |w: &mut Widget| &mut w.flag)
            .check_property_with(
                "stamped_at",
                stamp(),
                |w: &mut Widget| &mut w.stamped_at,
                WithinTolerance::one_minute(),
            )
            .check_storage_assigned("version", |w: &Widget| w.version > 0)
    }

    #[tokio::test]
    async fn test_verify_returns_reloaded_entity() {
        let store = FakeStore::default();

        let reloaded = full_specification(&store).verify_the_mappings().await.unwrap();

        assert_eq!(reloaded.id, 7);
        assert_eq!(reloaded.name, "bar");
        assert!(reloaded.flag);
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn test_tolerance_accepts_lossy_storage() {
        let store = FakeStore {
            truncate_to_minute: true,
            ..FakeStore::default()
        };

        let result = full_specification(&store).verify_the_mappings().await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_exact_comparison_rejects_lossy_storage() {
        let store = FakeStore {
            truncate_to_minute: true,
            ..FakeStore::default()
        };

        let err = PersistenceSpecification::new(&store)
            .check_property("id", 1, |w: &mut Widget| &mut w.id)
            .check_property("stamped_at", stamp(), |w: &mut Widget| &mut w.stamped_at)
            .verify_the_mappings()
            .await
            .unwrap_err();

        assert_eq!(err.mismatched_properties(), vec!["stamped_at"]);
    }

    #[tokio::test]
    async fn test_dropped_column_is_reported_by_name() {
        let store = FakeStore {
            drop_name: true,
            ..FakeStore::default()
        };

        let err = full_specification(&store).verify_the_mappings().await.unwrap_err();

        match err {
            VerificationError::Mismatch(mismatches) => {
                assert_eq!(mismatches.len(), 1);
                assert_eq!(mismatches[0].property, "name");
                assert_eq!(mismatches[0].expected, "\"bar\"");
                assert_eq!(mismatches[0].actual, "\"\"");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_property_fails_before_storage() {
        let mut store = MockEntityStore::<Widget>::new();
        store.expect_persist().never();
        store.expect_reload().never();

        let err = PersistenceSpecification::new(&store)
            .check_property("name", "a".to_string(), |w: &mut Widget| &mut w.name)
            .check_property("name", "b".to_string(), |w: &mut Widget| &mut w.name)
            .verify_the_mappings()
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::DuplicateProperty(p) if p == "name"));
    }

    #[tokio::test]
    async fn test_uncovered_property_fails_before_storage() {
        let mut store = MockEntityStore::<Widget>::new();
        store.expect_persist().never();

        let err = PersistenceSpecification::new(&store)
            .check_property("id", 1, |w: &mut Widget| &mut w.id)
            .require_coverage(["id", "name", "flag"])
            .verify_the_mappings()
            .await
            .unwrap_err();

        match err {
            VerificationError::Uncovered(missing) => assert_eq!(missing, vec!["flag", "name"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_row_is_not_reloaded() {
        let mut store = MockEntityStore::<Widget>::new();
        store.expect_persist().times(1).returning(|_| Ok(()));
        store.expect_reload().times(1).returning(|_| Ok(None));

        let err = PersistenceSpecification::new(&store)
            .check_property("id", 1, |w: &mut Widget| &mut w.id)
            .verify_the_mappings()
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::NotReloaded));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockEntityStore::<Widget>::new();
        store
            .expect_persist()
            .returning(|_| Err(AppError::script("table is missing")));
        store.expect_reload().never();

        let err = PersistenceSpecification::new(&store)
            .check_property("id", 1, |w: &mut Widget| &mut w.id)
            .verify_the_mappings()
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::Store(AppError::Script(_))));
    }

    #[tokio::test]
    async fn test_unassigned_storage_value_fails() {
        let mut store = MockEntityStore::<Widget>::new();
        store.expect_persist().returning(|_| Ok(()));
        store
            .expect_reload()
            .returning(|w| Ok(Some(w.clone())));

        let err = PersistenceSpecification::new(&store)
            .check_property("id", 3, |w: &mut Widget| &mut w.id)
            .check_storage_assigned("version", |w: &Widget| w.version > 0)
            .verify_the_mappings()
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::NotAssigned(p) if p == "version"));
    }

    #[tokio::test]
    async fn test_persisted_entity_carries_every_value() {
        let mut store = MockEntityStore::<Widget>::new();
        store
            .expect_persist()
            .withf(|w| w.id == 9 && w.name == "bar" && w.flag)
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_reload()
            .returning(|w| Ok(Some(w.clone())));

        let result = PersistenceSpecification::new(&store)
            .check_property("id", 9, |w: &mut Widget| &mut w.id)
            .check_property("name", "bar".to_string(), |w: &mut Widget| &mut w.name)
            .check_property("flag", true, |w: &mut Widget| &mut w.flag)
            .verify_the_mappings()
            .await;

        assert!(result.is_ok());
    }
}
