use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::errors::{LedgerError, LedgerResult};

/// Integer identifier shared by every stored entity. `0` marks "not yet assigned".
pub type EntityId = u64;

/// Sentinel id carried by entities that have not been persisted yet.
pub const UNASSIGNED_ID: EntityId = 0;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> EntityId;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Sums money amounts, failing instead of overflowing `Decimal`.
pub fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> LedgerResult<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or_else(LedgerError::amount_overflow)
    })
}

/// Net of signed amounts. Opposite signs are paired off first, so an in-range
/// result never overflows on the way regardless of input order.
pub fn checked_net(amounts: impl IntoIterator<Item = Decimal>) -> LedgerResult<Decimal> {
    let (mut debits, mut credits): (Vec<Decimal>, Vec<Decimal>) = amounts
        .into_iter()
        .partition(|amount| amount.is_sign_negative());
    let mut total = Decimal::ZERO;
    loop {
        let next = if total.is_sign_negative() {
            credits.pop().or_else(|| debits.pop())
        } else {
            debits.pop().or_else(|| credits.pop())
        };
        let Some(amount) = next else {
            return Ok(total);
        };
        total = total
            .checked_add(amount)
            .ok_or_else(LedgerError::amount_overflow)?;
    }
}

/// Entity families held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Account,
    Category,
    Operation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Account => "account",
            EntityKind::Category => "category",
            EntityKind::Operation => "operation",
        };
        f.write_str(label)
    }
}

/// Direction of money movement. Shared by categories and operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Income,
    Expense,
}

impl OperationKind {
    pub const ALL: [OperationKind; 2] = [OperationKind::Income, OperationKind::Expense];

    /// Balance effect of an amount of this kind: income adds, expense subtracts.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            OperationKind::Income => amount,
            OperationKind::Expense => -amount,
        }
    }

    /// Undo of [`OperationKind::signed`].
    pub fn reversed(self, amount: Decimal) -> Decimal {
        -self.signed(amount)
    }

    pub fn as_code(self) -> &'static str {
        match self {
            OperationKind::Income => "INCOME",
            OperationKind::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::Income => "Income",
            OperationKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Error returned when text does not name an operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation type `{}` (expected INCOME or EXPENSE)", self.0)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for OperationKind {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "in" | "1" => Ok(OperationKind::Income),
            "expense" | "out" | "2" => Ok(OperationKind::Expense),
            _ => Err(ParseKindError(value.to_string())),
        }
    }
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use rust_decimal;
