//! Structural checks applied before any entity is persisted.
//!
//! These are pure predicates: they look at one entity in isolation and never
//! consult the store. Cross-entity rules (existence, category kind) live in the
//! services.

use rust_decimal::Decimal;

use crate::core::errors::{LedgerError, LedgerResult};
use crate::domain::{Account, Category, EntityId, Operation};

pub fn validate_account(account: &Account) -> LedgerResult<()> {
    require_name(&account.name, "account name must not be empty")?;
    require_id(account.id, "account id must be a positive number")
}

pub fn validate_category(category: &Category) -> LedgerResult<()> {
    require_name(&category.name, "category name must not be empty")?;
    require_id(category.id, "category id must be a positive number")
    // `kind` is a closed enum, so the INCOME/EXPENSE check holds by construction.
}

pub fn validate_operation(operation: &Operation) -> LedgerResult<()> {
    require_id(operation.id, "operation id must be a positive number")?;
    require_id(operation.account_id, "account id must be a positive number")?;
    require_id(operation.category_id, "category id must be a positive number")?;
    require_positive_amount(operation.amount)
}

/// Amount rule shared with the service-level input checks.
pub fn require_positive_amount(amount: Decimal) -> LedgerResult<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(LedgerError::Validation(
            "operation amount must be a positive number".into(),
        ))
    }
}

pub fn require_name(name: &str, message: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        Err(LedgerError::Validation(message.into()))
    } else {
        Ok(())
    }
}

pub fn require_id(id: EntityId, message: &str) -> LedgerResult<()> {
    if id == 0 {
        Err(LedgerError::Validation(message.into()))
    } else {
        Ok(())
    }
}
