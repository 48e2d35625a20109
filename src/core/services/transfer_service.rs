//! Bulk export and import of the whole data set.
//!
//! Import is all-or-nothing: files are parsed, then the merged result is
//! checked for duplicate ids, dangling references and kind mismatches while the
//! write guard is held. The merge runs on a copy of the store that replaces it
//! only once every step has succeeded. Account balances are rebuilt from the
//! operations; file balances that disagree are reported, not trusted.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::errors::{LedgerError, TransferError, TransferResult};
use crate::core::time::Clock;
use crate::domain::validation::{validate_account, validate_category, validate_operation};
use crate::domain::{Account, Category, EntityId, Identifiable, Operation, OperationKind};
use crate::storage::{EntityStore, StoreState};
use crate::transfer::{self, FileFormat, Snapshot};

use super::account_service::recompute_balance;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub format: FileFormat,
    pub files: Vec<PathBuf>,
    pub accounts: usize,
    pub categories: usize,
    pub operations: usize,
}

/// Account whose balance after import differs from the value it carried before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceWarning {
    pub account_id: EntityId,
    pub name: String,
    pub recorded: Decimal,
    pub recomputed: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub accounts: usize,
    pub categories: usize,
    pub operations: usize,
    pub warnings: Vec<BalanceWarning>,
}

pub struct TransferService {
    store: Arc<EntityStore>,
    clock: Arc<dyn Clock>,
}

impl TransferService {
    pub fn new(store: Arc<EntityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Copies every entity out of the store, ordered by id.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.store.read();
        let mut snapshot = Snapshot {
            accounts: state.all::<Account>().cloned().collect(),
            categories: state.all::<Category>().cloned().collect(),
            operations: state.all::<Operation>().cloned().collect(),
        };
        drop(state);
        snapshot.sort_by_id();
        snapshot
    }

    pub fn export_all(&self, dir: &Path, format: FileFormat) -> TransferResult<ExportReport> {
        let snapshot = self.snapshot();
        let files = transfer::write_snapshot(dir, format, &snapshot)?;
        info!(
            dir = %dir.display(),
            %format,
            accounts = snapshot.accounts.len(),
            categories = snapshot.categories.len(),
            operations = snapshot.operations.len(),
            "data exported"
        );
        Ok(ExportReport {
            format,
            files,
            accounts: snapshot.accounts.len(),
            categories: snapshot.categories.len(),
            operations: snapshot.operations.len(),
        })
    }

    pub fn import_all(&self, dir: &Path, format: FileFormat) -> TransferResult<ImportReport> {
        let snapshot = transfer::read_snapshot(dir, format, self.clock.now())?;
        let report = self.import_snapshot(snapshot)?;
        info!(
            dir = %dir.display(),
            %format,
            accounts = report.accounts,
            categories = report.categories,
            operations = report.operations,
            warnings = report.warnings.len(),
            "data imported"
        );
        Ok(report)
    }

    /// Merges `snapshot` into the store. Entities with ids already present are replaced.
    pub fn import_snapshot(&self, snapshot: Snapshot) -> TransferResult<ImportReport> {
        let mut state = self.store.write();
        check_snapshot(&state, &snapshot)?;

        let mut report = ImportReport {
            accounts: snapshot.accounts.len(),
            categories: snapshot.categories.len(),
            operations: snapshot.operations.len(),
            warnings: Vec::new(),
        };
        let mut staged = state.clone();
        for account in snapshot.accounts {
            staged.put(account)?;
        }
        for category in snapshot.categories {
            staged.put(category)?;
        }
        for operation in snapshot.operations {
            staged.put(operation)?;
        }
        report.warnings = reconcile_balances(&mut staged, self.clock.now())?;
        *state = staged;

        for warning in &report.warnings {
            warn!(
                account_id = warning.account_id,
                recorded = %warning.recorded,
                recomputed = %warning.recomputed,
                "imported balance replaced by recomputed value"
            );
        }
        Ok(report)
    }
}

fn check_snapshot(state: &StoreState, snapshot: &Snapshot) -> TransferResult<()> {
    for account in &snapshot.accounts {
        validate_account(account).map_err(|err| rejected("account", account.id, err))?;
    }
    for category in &snapshot.categories {
        validate_category(category).map_err(|err| rejected("category", category.id, err))?;
    }
    for operation in &snapshot.operations {
        validate_operation(operation).map_err(|err| rejected("operation", operation.id, err))?;
    }
    unique_ids("account", &snapshot.accounts)?;
    unique_ids("category", &snapshot.categories)?;
    unique_ids("operation", &snapshot.operations)?;

    let accounts: HashSet<EntityId> = state
        .all::<Account>()
        .map(|account| account.id)
        .chain(snapshot.accounts.iter().map(|account| account.id))
        .collect();
    let mut category_kinds: HashMap<EntityId, OperationKind> = state
        .all::<Category>()
        .map(|category| (category.id, category.kind))
        .collect();
    category_kinds.extend(snapshot.categories.iter().map(|category| (category.id, category.kind)));

    // Operations already stored stay unless the snapshot replaces them, so they
    // must still line up with any replaced categories or accounts.
    let replaced: HashSet<EntityId> = snapshot.operations.iter().map(|op| op.id).collect();
    let survivors = state
        .all::<Operation>()
        .filter(|operation| !replaced.contains(&operation.id));

    for operation in snapshot.operations.iter().chain(survivors) {
        if !accounts.contains(&operation.account_id) {
            return Err(TransferError::Parse(format!(
                "operation {}: account {} does not exist",
                operation.id, operation.account_id
            )));
        }
        match category_kinds.get(&operation.category_id) {
            None => {
                return Err(TransferError::Parse(format!(
                    "operation {}: category {} does not exist",
                    operation.id, operation.category_id
                )))
            }
            Some(kind) if *kind != operation.kind => {
                return Err(TransferError::Parse(format!(
                    "operation {}: category kind mismatch ({} operation in {} category {})",
                    operation.id, operation.kind, kind, operation.category_id
                )))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn rejected(entity: &str, id: EntityId, err: LedgerError) -> TransferError {
    TransferError::Parse(format!("{entity} {id}: {err}"))
}

fn unique_ids<T: Identifiable>(entity: &str, records: &[T]) -> TransferResult<()> {
    let mut seen = HashSet::new();
    for record in records {
        if record.id() == EntityId::MAX {
            return Err(TransferError::Parse(format!(
                "{entity} id {} is out of range",
                record.id()
            )));
        }
        if !seen.insert(record.id()) {
            return Err(TransferError::Parse(format!(
                "duplicate {entity} id {}",
                record.id()
            )));
        }
    }
    Ok(())
}

fn reconcile_balances(
    state: &mut StoreState,
    now: DateTime<Utc>,
) -> TransferResult<Vec<BalanceWarning>> {
    let view: &StoreState = state;
    let mut drifted: Vec<(Account, Decimal)> = Vec::new();
    for account in view.all::<Account>() {
        let recomputed = recompute_balance(view, account.id)?;
        if recomputed != account.balance {
            drifted.push((account.clone(), recomputed));
        }
    }
    drifted.sort_by_key(|(account, _)| account.id);

    let mut warnings = Vec::with_capacity(drifted.len());
    for (mut account, recomputed) in drifted {
        warnings.push(BalanceWarning {
            account_id: account.id,
            name: account.name.clone(),
            recorded: account.balance,
            recomputed,
        });
        account.balance = recomputed;
        account.updated_at = now;
        state.update(account)?;
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::test_support::{date, fixture};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn account(id: EntityId, name: &str, balance: Decimal) -> Account {
        let mut account = Account::new(name, Utc::now());
        account.id = id;
        account.balance = balance;
        account
    }

    fn category(id: EntityId, name: &str, kind: OperationKind) -> Category {
        let mut category = Category::new(name, kind, Utc::now());
        category.id = id;
        category
    }

    fn operation(id: EntityId, kind: OperationKind, account: EntityId, category: EntityId, amount: Decimal) -> Operation {
        let mut operation = Operation::new(kind, account, category, amount, date(2024, 1, 10), "", Utc::now());
        operation.id = id;
        operation
    }

    #[test]
    fn import_keeps_ids_and_advances_counters() {
        let fx = fixture();
        let snapshot = Snapshot {
            accounts: vec![account(10, "Imported", dec!(75))],
            categories: vec![category(3, "Salary", OperationKind::Income)],
            operations: vec![operation(5, OperationKind::Income, 10, 3, dec!(75))],
        };
        let report = fx.services.transfer.import_snapshot(snapshot).unwrap();
        assert_eq!((report.accounts, report.categories, report.operations), (1, 1, 1));
        assert!(report.warnings.is_empty());

        let created = fx.services.accounts.create("Fresh").unwrap();
        assert_eq!(created.id, 11);
    }

    #[test]
    fn import_rejects_dangling_references_without_writing() {
        let fx = fixture();
        let snapshot = Snapshot {
            accounts: vec![account(1, "Main", dec!(0))],
            categories: vec![],
            operations: vec![operation(1, OperationKind::Expense, 1, 8, dec!(5))],
        };
        let err = fx.services.transfer.import_snapshot(snapshot).unwrap_err();
        assert!(
            matches!(&err, TransferError::Parse(message) if message.contains("category 8")),
            "unexpected: {err}"
        );
        assert!(fx.services.accounts.list().is_empty());
    }

    #[test]
    fn import_rejects_kind_mismatch() {
        let fx = fixture();
        let snapshot = Snapshot {
            accounts: vec![account(1, "Main", dec!(0))],
            categories: vec![category(1, "Food", OperationKind::Expense)],
            operations: vec![operation(1, OperationKind::Income, 1, 1, dec!(5))],
        };
        let err = fx.services.transfer.import_snapshot(snapshot).unwrap_err();
        assert!(err.to_string().contains("kind mismatch"), "unexpected: {err}");
    }

    #[test]
    fn import_rejects_duplicate_ids() {
        let fx = fixture();
        let snapshot = Snapshot {
            accounts: vec![account(1, "A", dec!(0)), account(1, "B", dec!(0))],
            ..Snapshot::default()
        };
        assert!(fx.services.transfer.import_snapshot(snapshot).is_err());
    }

    #[test]
    fn import_rejects_ids_that_would_exhaust_counters() {
        let fx = fixture();
        let snapshot = Snapshot {
            accounts: vec![account(1, "Main", dec!(0))],
            categories: vec![category(1, "Food", OperationKind::Expense)],
            operations: vec![operation(EntityId::MAX, OperationKind::Expense, 1, 1, dec!(5))],
        };
        let err = fx.services.transfer.import_snapshot(snapshot).unwrap_err();
        assert!(
            matches!(&err, TransferError::Parse(message) if message.contains("out of range")),
            "unexpected: {err}"
        );
        assert!(fx.services.accounts.list().is_empty());
        assert!(fx.services.categories.list().is_empty());
        assert_eq!(fx.store.read().next_id::<Account>(), 1);
    }

    #[test]
    fn import_failing_after_checks_leaves_store_untouched() {
        let fx = fixture();
        let main = fx.services.accounts.create("Main").unwrap();
        let salary = fx.category("Salary", OperationKind::Income);
        fx.book(main.id, salary, Decimal::MAX, (2024, 1, 5));
        let before = fx.services.accounts.list();

        let snapshot = Snapshot {
            accounts: vec![account(7, "Side", dec!(0))],
            operations: vec![operation(9, OperationKind::Income, main.id, salary, dec!(1))],
            ..Snapshot::default()
        };
        let err = fx.services.transfer.import_snapshot(snapshot).unwrap_err();
        assert!(
            matches!(&err, TransferError::Ledger(inner) if *inner == LedgerError::amount_overflow()),
            "unexpected: {err}"
        );
        assert_eq!(fx.services.accounts.list(), before);
        assert_eq!(fx.services.operations.list().len(), 1);
        assert!(fx.services.accounts.verify_balance(main.id).unwrap().is_consistent());
    }

    #[test]
    fn import_may_reference_existing_entities() {
        let fx = fixture();
        let main = fx.services.accounts.create("Main").unwrap();
        let food = fx.category("Food", OperationKind::Expense);
        let snapshot = Snapshot {
            operations: vec![operation(40, OperationKind::Expense, main.id, food, dec!(12))],
            ..Snapshot::default()
        };
        let report = fx.services.transfer.import_snapshot(snapshot).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(fx.services.accounts.get(main.id).unwrap().balance, dec!(-12));
    }

    #[test]
    fn retyping_a_used_category_through_import_is_rejected() {
        let fx = fixture();
        let main = fx.services.accounts.create("Main").unwrap();
        let food = fx.category("Food", OperationKind::Expense);
        fx.book(main.id, food, dec!(3), (2024, 1, 2));

        let snapshot = Snapshot {
            categories: vec![category(food, "Food", OperationKind::Income)],
            ..Snapshot::default()
        };
        assert!(fx.services.transfer.import_snapshot(snapshot).is_err());
        assert_eq!(fx.services.categories.get(food).unwrap().kind, OperationKind::Expense);
    }

    #[test]
    fn file_balances_are_reconciled() {
        let fx = fixture();
        let snapshot = Snapshot {
            accounts: vec![account(1, "Main", dec!(999))],
            categories: vec![category(1, "Salary", OperationKind::Income)],
            operations: vec![operation(1, OperationKind::Income, 1, 1, dec!(100))],
        };
        let report = fx.services.transfer.import_snapshot(snapshot).unwrap();
        assert_eq!(
            report.warnings,
            vec![BalanceWarning {
                account_id: 1,
                name: "Main".into(),
                recorded: dec!(999),
                recomputed: dec!(100),
            }]
        );
        assert!(fx.services.accounts.verify_balance(1).unwrap().is_consistent());
    }
}
