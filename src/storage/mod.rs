//! In-memory entity store guarded by a single reader/writer lock.
//!
//! Readers may run concurrently; every write excludes all other access. Services
//! that must change several entities at once take [`EntityStore::write`] and keep
//! the guard for the whole mutation so readers never observe a half-applied
//! ledger change.

pub mod table;

use chrono::NaiveDate;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::errors::LedgerResult;
use crate::domain::{
    Account, Category, EntityId, EntityKind, Identifiable, Operation, OperationKind,
};

pub use table::Table;

/// Entities that can be kept in the store.
pub trait StoredEntity: Identifiable + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn assign_id(&mut self, id: EntityId);
    fn table(state: &StoreState) -> &Table<Self>;
    fn table_mut(state: &mut StoreState) -> &mut Table<Self>;
}

impl StoredEntity for Account {
    const KIND: EntityKind = EntityKind::Account;

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn table(state: &StoreState) -> &Table<Self> {
        &state.accounts
    }

    fn table_mut(state: &mut StoreState) -> &mut Table<Self> {
        &mut state.accounts
    }
}

impl StoredEntity for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn table(state: &StoreState) -> &Table<Self> {
        &state.categories
    }

    fn table_mut(state: &mut StoreState) -> &mut Table<Self> {
        &mut state.categories
    }
}

impl StoredEntity for Operation {
    const KIND: EntityKind = EntityKind::Operation;

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn table(state: &StoreState) -> &Table<Self> {
        &state.operations
    }

    fn table_mut(state: &mut StoreState) -> &mut Table<Self> {
        &mut state.operations
    }
}

/// The three tables behind the store lock.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    accounts: Table<Account>,
    categories: Table<Category>,
    operations: Table<Operation>,
}

impl StoreState {
    pub fn put<T: StoredEntity>(&mut self, entity: T) -> LedgerResult<T> {
        T::table_mut(self).put(entity)
    }

    pub fn get<T: StoredEntity>(&self, id: EntityId) -> LedgerResult<&T> {
        T::table(self).get(id)
    }

    pub fn contains<T: StoredEntity>(&self, id: EntityId) -> bool {
        T::table(self).contains(id)
    }

    pub fn all<T: StoredEntity>(&self) -> impl Iterator<Item = &T> {
        T::table(self).iter()
    }

    pub fn update<T: StoredEntity>(&mut self, entity: T) -> LedgerResult<()> {
        T::table_mut(self).update(entity)
    }

    pub fn delete<T: StoredEntity>(&mut self, id: EntityId) -> LedgerResult<T> {
        T::table_mut(self).delete(id)
    }

    pub fn count<T: StoredEntity>(&self) -> usize {
        T::table(self).len()
    }

    pub fn next_id<T: StoredEntity>(&self) -> EntityId {
        T::table(self).next_id()
    }

    pub fn operations_for_account(&self, account_id: EntityId) -> impl Iterator<Item = &Operation> {
        self.operations
            .iter()
            .filter(move |op| op.account_id == account_id)
    }

    pub fn operations_for_category(
        &self,
        category_id: EntityId,
    ) -> impl Iterator<Item = &Operation> {
        self.operations
            .iter()
            .filter(move |op| op.category_id == category_id)
    }

    /// Operations dated within `[start, end]`.
    pub fn operations_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &Operation> {
        self.operations
            .iter()
            .filter(move |op| op.falls_within(start, end))
    }

    pub fn categories_of_kind(&self, kind: OperationKind) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |cat| cat.kind == kind)
    }

    /// Number of operations pointing at the given account or category.
    pub fn references_to(&self, kind: EntityKind, id: EntityId) -> usize {
        match kind {
            EntityKind::Account => self.operations_for_account(id).count(),
            EntityKind::Category => self.operations_for_category(id).count(),
            EntityKind::Operation => 0,
        }
    }
}

/// Shared, lock-guarded store. Construct once and hand an `Arc` to each service.
#[derive(Debug, Default)]
pub struct EntityStore {
    state: RwLock<StoreState>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write()
    }

    /// Inserts `entity`, assigning the next id when it carries the unassigned sentinel.
    pub fn put<T: StoredEntity>(&self, entity: T) -> LedgerResult<T> {
        self.write().put(entity)
    }

    pub fn get_by_id<T: StoredEntity>(&self, id: EntityId) -> LedgerResult<T> {
        self.read().get::<T>(id).cloned()
    }

    /// All rows of one kind in unspecified order; sort explicitly when order matters.
    pub fn get_all<T: StoredEntity>(&self) -> Vec<T> {
        self.read().all::<T>().cloned().collect()
    }

    pub fn update<T: StoredEntity>(&self, entity: T) -> LedgerResult<()> {
        self.write().update(entity)
    }

    pub fn delete<T: StoredEntity>(&self, id: EntityId) -> LedgerResult<T> {
        self.write().delete::<T>(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::LedgerError;
    use chrono::Utc;

    fn account(name: &str) -> Account {
        Account::new(name, Utc::now())
    }

    #[test]
    fn put_assigns_sequential_ids() {
        let store = EntityStore::new();
        let ids: Vec<_> = ["A", "B", "C"]
            .into_iter()
            .map(|name| store.put(account(name)).unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn explicit_id_advances_counter() {
        let store = EntityStore::new();
        let mut imported = account("Imported");
        imported.id = 10;
        store.put(imported).unwrap();

        let created = store.put(account("Fresh")).unwrap();
        assert_eq!(created.id, 11);
    }

    #[test]
    fn explicit_id_below_counter_keeps_counter() {
        let store = EntityStore::new();
        store.put(account("One")).unwrap();
        store.put(account("Two")).unwrap();
        let mut replayed = account("Replayed");
        replayed.id = 1;
        store.put(replayed).unwrap();
        assert_eq!(store.read().next_id::<Account>(), 3);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let store = EntityStore::new();
        let first = store.put(account("First")).unwrap();
        store.delete::<Account>(first.id).unwrap();
        let second = store.put(account("Second")).unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn counters_are_independent_per_kind() {
        let store = EntityStore::new();
        store.put(account("Wallet")).unwrap();
        store.put(account("Card")).unwrap();
        let category = store
            .put(Category::new("Salary", OperationKind::Income, Utc::now()))
            .unwrap();
        assert_eq!(category.id, 1);
    }

    #[test]
    fn missing_rows_report_not_found() {
        let store = EntityStore::new();
        let err = store.get_by_id::<Category>(5).unwrap_err();
        assert_eq!(err, LedgerError::not_found(EntityKind::Category, 5));

        let mut ghost = account("Ghost");
        ghost.id = 42;
        assert!(matches!(
            store.update(ghost),
            Err(LedgerError::NotFound { kind: EntityKind::Account, id: 42 })
        ));
        assert!(store.delete::<Operation>(1).is_err());
    }

    #[test]
    fn get_all_returns_every_row_regardless_of_order() {
        let store = EntityStore::new();
        for name in ["a", "b", "c", "d", "e"] {
            store.put(account(name)).unwrap();
        }
        let mut ids: Vec<_> = store.get_all::<Account>().iter().map(|a| a.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn update_replaces_row() {
        let store = EntityStore::new();
        let mut stored = store.put(account("Old")).unwrap();
        stored.name = "New".into();
        store.update(stored.clone()).unwrap();
        assert_eq!(store.get_by_id::<Account>(stored.id).unwrap().name, "New");
    }
}
