use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::errors::{LedgerError, LedgerResult};
use crate::domain::common::*;

/// A named money container whose balance mirrors the operations booked against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an unsaved account with a zero balance.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the balance by `delta` and stamps the update time.
    ///
    /// Leaves the account untouched when the new balance does not fit a `Decimal`.
    pub fn apply_delta(&mut self, delta: Decimal, now: DateTime<Utc>) -> LedgerResult<()> {
        self.balance = self
            .balance
            .checked_add(delta)
            .ok_or_else(LedgerError::amount_overflow)?;
        self.updated_at = now;
        Ok(())
    }
}

impl Identifiable for Account {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("Account #{}: {} (balance {})", self.id, self.name, self.balance)
    }
}
