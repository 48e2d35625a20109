use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A single dated, amount-bearing ledger entry against one account and one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    #[serde(default)]
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub account_id: EntityId,
    pub category_id: EntityId,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Operation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: OperationKind,
        account_id: EntityId,
        category_id: EntityId,
        amount: Decimal,
        date: NaiveDate,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            kind,
            account_id,
            category_id,
            amount,
            date,
            description: description.into(),
            created_at: now,
        }
    }

    /// Contribution of this operation to its account balance.
    pub fn balance_effect(&self) -> Decimal {
        self.kind.signed(self.amount)
    }

    /// Inclusive date-range membership.
    pub fn falls_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.date >= start && self.date <= end
    }
}

impl Identifiable for Operation {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Displayable for Operation {
    fn display_label(&self) -> String {
        let mut label = format!(
            "Operation #{}: {} {} on {} (account #{}, category #{})",
            self.id,
            self.kind,
            self.amount,
            self.date.format("%Y-%m-%d"),
            self.account_id,
            self.category_id
        );
        if !self.description.is_empty() {
            label.push_str(&format!(" - {}", self.description));
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(kind: OperationKind) -> Operation {
        Operation::new(
            kind,
            1,
            2,
            dec!(40),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            "groceries",
            Utc::now(),
        )
    }

    #[test]
    fn balance_effect_is_signed_by_kind() {
        assert_eq!(sample(OperationKind::Income).balance_effect(), dec!(40));
        assert_eq!(sample(OperationKind::Expense).balance_effect(), dec!(-40));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let op = sample(OperationKind::Expense);
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(op.falls_within(day, day));
        assert!(!op.falls_within(day.succ_opt().unwrap(), day.succ_opt().unwrap()));
    }
}
