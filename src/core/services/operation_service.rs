//! Operation lifecycle with the account balance kept in step.
//!
//! Every mutation runs under a single store write guard. All lookups and checks
//! happen on local copies first; the store is only written once every check has
//! passed, so a failed call leaves operations and balances untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::core::errors::{LedgerError, LedgerResult};
use crate::core::time::Clock;
use crate::domain::validation::{require_id, require_positive_amount, validate_operation};
use crate::domain::{Account, Category, EntityId, Operation, OperationKind};
use crate::storage::EntityStore;

/// Caller-supplied fields for creating or updating an operation.
///
/// `kind` is optional: the operation always takes its category's kind, and an
/// explicit value that disagrees with it is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDraft {
    pub account_id: EntityId,
    pub category_id: EntityId,
    pub amount: Decimal,
    pub kind: Option<OperationKind>,
    pub date: NaiveDate,
    pub description: String,
}

impl OperationDraft {
    pub fn new(account_id: EntityId, category_id: EntityId, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            account_id,
            category_id,
            amount,
            kind: None,
            date,
            description: String::new(),
        }
    }

    pub fn with_kind(mut self, kind: OperationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Starts a draft from an existing operation, for partial edits.
    pub fn from_operation(operation: &Operation) -> Self {
        Self {
            account_id: operation.account_id,
            category_id: operation.category_id,
            amount: operation.amount,
            kind: None,
            date: operation.date,
            description: operation.description.clone(),
        }
    }

    fn check_inputs(&self) -> LedgerResult<()> {
        require_id(self.account_id, "account id must be a positive number")?;
        require_id(self.category_id, "category id must be a positive number")?;
        require_positive_amount(self.amount)
    }

    fn resolve_kind(&self, category: &Category) -> LedgerResult<OperationKind> {
        match self.kind {
            Some(kind) if kind != category.kind => Err(LedgerError::kind_mismatch()),
            _ => Ok(category.kind),
        }
    }
}

/// The ledger service: creates, edits and removes operations.
pub struct OperationService {
    store: Arc<EntityStore>,
    clock: Arc<dyn Clock>,
}

impl OperationService {
    pub fn new(store: Arc<EntityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Books a new operation and moves its account balance by the signed amount.
    pub fn create(&self, draft: OperationDraft) -> LedgerResult<Operation> {
        draft.check_inputs()?;
        let now = self.clock.now();

        let mut state = self.store.write();
        let mut account = state.get::<Account>(draft.account_id)?.clone();
        let category = state.get::<Category>(draft.category_id)?;
        let kind = draft.resolve_kind(category)?;

        let mut operation = Operation::new(
            kind,
            draft.account_id,
            draft.category_id,
            draft.amount,
            draft.date,
            draft.description,
            now,
        );
        operation.id = state.next_id::<Operation>();
        validate_operation(&operation)?;
        account.apply_delta(operation.balance_effect(), now)?;

        let operation = state.put(operation)?;
        state.update(account)?;

        info!(
            operation_id = operation.id,
            account_id = operation.account_id,
            category_id = operation.category_id,
            kind = %operation.kind,
            amount = %operation.amount,
            "operation created"
        );
        Ok(operation)
    }

    pub fn get(&self, id: EntityId) -> LedgerResult<Operation> {
        self.store.get_by_id(id)
    }

    /// All operations ordered by date, then id.
    pub fn list(&self) -> Vec<Operation> {
        sorted(self.store.get_all())
    }

    pub fn list_by_account(&self, account_id: EntityId) -> LedgerResult<Vec<Operation>> {
        let state = self.store.read();
        state.get::<Account>(account_id)?;
        Ok(sorted(state.operations_for_account(account_id).cloned().collect()))
    }

    pub fn list_by_category(&self, category_id: EntityId) -> LedgerResult<Vec<Operation>> {
        let state = self.store.read();
        state.get::<Category>(category_id)?;
        Ok(sorted(state.operations_for_category(category_id).cloned().collect()))
    }

    /// Operations dated within `[start, end]`.
    pub fn list_by_period(&self, start: NaiveDate, end: NaiveDate) -> LedgerResult<Vec<Operation>> {
        ensure_period(start, end)?;
        let state = self.store.read();
        Ok(sorted(state.operations_between(start, end).cloned().collect()))
    }

    /// Rewrites an operation, reversing its old balance effect and applying the new one.
    ///
    /// When the account stays the same the two effects collapse into one balance
    /// write; when it changes, both accounts are written under the same guard.
    /// Every new balance is computed before the first write.
    pub fn update(&self, id: EntityId, draft: OperationDraft) -> LedgerResult<Operation> {
        draft.check_inputs()?;
        let now = self.clock.now();

        let mut state = self.store.write();
        let existing = state.get::<Operation>(id)?.clone();
        let mut source = state.get::<Account>(existing.account_id)?.clone();
        let reversal = existing.kind.reversed(existing.amount);

        let mut target = if draft.account_id != existing.account_id {
            Some(state.get::<Account>(draft.account_id)?.clone())
        } else {
            None
        };
        let category = state.get::<Category>(draft.category_id)?;
        let kind = draft.resolve_kind(category)?;

        let mut updated = existing.clone();
        updated.account_id = draft.account_id;
        updated.category_id = draft.category_id;
        updated.amount = draft.amount;
        updated.kind = kind;
        updated.date = draft.date;
        updated.description = draft.description;
        validate_operation(&updated)?;

        let effect = updated.balance_effect();
        source.apply_delta(reversal, now)?;
        match target.as_mut() {
            Some(target) => target.apply_delta(effect, now)?,
            None => source.apply_delta(effect, now)?,
        }

        state.update(updated.clone())?;
        state.update(source)?;
        if let Some(target) = target {
            state.update(target)?;
        }

        info!(
            operation_id = id,
            from_account = existing.account_id,
            to_account = updated.account_id,
            kind = %updated.kind,
            amount = %updated.amount,
            "operation updated"
        );
        Ok(updated)
    }

    /// Removes an operation and reverses its balance effect.
    pub fn delete(&self, id: EntityId) -> LedgerResult<Operation> {
        let now = self.clock.now();

        let mut state = self.store.write();
        let operation = state.get::<Operation>(id)?.clone();
        let mut account = state.get::<Account>(operation.account_id)?.clone();
        account.apply_delta(operation.kind.reversed(operation.amount), now)?;

        let removed = state.delete::<Operation>(id)?;
        state.update(account)?;

        info!(
            operation_id = id,
            account_id = removed.account_id,
            amount = %removed.amount,
            "operation deleted"
        );
        Ok(removed)
    }
}

pub(crate) fn ensure_period(start: NaiveDate, end: NaiveDate) -> LedgerResult<()> {
    if start > end {
        Err(LedgerError::Validation(format!(
            "start date {start} is after end date {end}"
        )))
    } else {
        Ok(())
    }
}

fn sorted(mut operations: Vec<Operation>) -> Vec<Operation> {
    operations.sort_by_key(|operation| (operation.date, operation.id));
    operations
}
