use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::errors::{LedgerError, LedgerResult};
use crate::core::time::Clock;
use crate::domain::validation::{require_name, validate_account};
use crate::domain::{checked_net, Account, EntityId, EntityKind};
use crate::storage::{EntityStore, StoreState};

/// Stored balance next to the value recomputed from the account's operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceCheck {
    pub account_id: EntityId,
    pub stored: Decimal,
    pub recomputed: Decimal,
}

impl BalanceCheck {
    pub fn is_consistent(&self) -> bool {
        self.stored == self.recomputed
    }

    pub fn drift(&self) -> Decimal {
        self.stored - self.recomputed
    }
}

/// Account lifecycle and balance reconciliation.
pub struct AccountService {
    store: Arc<EntityStore>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(store: Arc<EntityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates an account with a zero balance.
    pub fn create(&self, name: &str) -> LedgerResult<Account> {
        let name = name.trim();
        require_name(name, "account name must not be empty")?;

        let mut state = self.store.write();
        let mut account = Account::new(name, self.clock.now());
        account.id = state.next_id::<Account>();
        validate_account(&account)?;
        let account = state.put(account)?;
        info!(account_id = account.id, name = %account.name, "account created");
        Ok(account)
    }

    pub fn get(&self, id: EntityId) -> LedgerResult<Account> {
        self.store.get_by_id(id)
    }

    /// All accounts ordered by id.
    pub fn list(&self) -> Vec<Account> {
        let mut accounts = self.store.get_all::<Account>();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    pub fn rename(&self, id: EntityId, name: &str) -> LedgerResult<Account> {
        let name = name.trim();
        require_name(name, "account name must not be empty")?;

        let mut state = self.store.write();
        let mut account = state.get::<Account>(id)?.clone();
        account.name = name.to_string();
        account.updated_at = self.clock.now();
        validate_account(&account)?;
        state.update(account.clone())?;
        info!(account_id = id, name = %account.name, "account renamed");
        Ok(account)
    }

    /// Deletes the account unless an operation still references it.
    pub fn delete(&self, id: EntityId) -> LedgerResult<Account> {
        let mut state = self.store.write();
        state.get::<Account>(id)?;
        let references = state.references_to(EntityKind::Account, id);
        if references > 0 {
            warn!(account_id = id, references, "account delete refused");
            return Err(LedgerError::ReferentialIntegrity {
                kind: EntityKind::Account,
                id,
                references,
            });
        }
        let removed = state.delete::<Account>(id)?;
        info!(account_id = id, "account deleted");
        Ok(removed)
    }

    /// Rebuilds the balance from zero out of every operation booked against the account.
    pub fn recalculate_balance(&self, id: EntityId) -> LedgerResult<Account> {
        let mut state = self.store.write();
        let mut account = state.get::<Account>(id)?.clone();
        let recomputed = recompute_balance(&state, id)?;
        if account.balance != recomputed {
            warn!(
                account_id = id,
                stored = %account.balance,
                recomputed = %recomputed,
                "account balance drift corrected"
            );
        }
        account.balance = recomputed;
        account.updated_at = self.clock.now();
        state.update(account.clone())?;
        Ok(account)
    }

    /// Compares the stored balance with a fresh recomputation without persisting anything.
    pub fn verify_balance(&self, id: EntityId) -> LedgerResult<BalanceCheck> {
        let state = self.store.read();
        let account = state.get::<Account>(id)?;
        Ok(BalanceCheck {
            account_id: id,
            stored: account.balance,
            recomputed: recompute_balance(&state, id)?,
        })
    }
}

/// Signed sum of the operations referencing `account_id`.
pub(crate) fn recompute_balance(state: &StoreState, account_id: EntityId) -> LedgerResult<Decimal> {
    checked_net(
        state
            .operations_for_account(account_id)
            .map(|operation| operation.balance_effect()),
    )
}
