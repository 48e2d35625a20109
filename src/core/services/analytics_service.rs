//! Read-only aggregates over the operation set.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::errors::{LedgerError, LedgerResult};
use crate::core::time::Clock;
use crate::domain::{checked_net, checked_total, Category, EntityId, Operation, OperationKind};
use crate::storage::{EntityStore, StoreState};

use super::operation_service::ensure_period;

/// Accepted range for [`AnalyticsService::monthly_dynamics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBounds {
    pub min_year: i32,
    /// How far past the clock's current year a request may reach.
    pub max_years_ahead: i32,
}

impl Default for YearBounds {
    fn default() -> Self {
        Self {
            min_year: 2000,
            max_years_ahead: 1,
        }
    }
}

/// Sum of one category's operations within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category_id: EntityId,
    pub name: String,
    pub kind: OperationKind,
    pub total: Decimal,
    pub operations: usize,
}

/// Income and expense sums for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyTotals {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthlyTotals {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Combined view of a period: overall delta plus per-kind category breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodStatistics {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub delta: Decimal,
    pub income_by_category: Vec<CategoryTotal>,
    pub expense_by_category: Vec<CategoryTotal>,
}

pub struct AnalyticsService {
    store: Arc<EntityStore>,
    clock: Arc<dyn Clock>,
    bounds: YearBounds,
}

impl AnalyticsService {
    pub fn new(store: Arc<EntityStore>, clock: Arc<dyn Clock>, bounds: YearBounds) -> Self {
        Self {
            store,
            clock,
            bounds,
        }
    }

    pub fn bounds(&self) -> YearBounds {
        self.bounds
    }

    /// Income minus expense for operations dated within `[start, end]`.
    pub fn period_delta(&self, start: NaiveDate, end: NaiveDate) -> LedgerResult<Decimal> {
        ensure_period(start, end)?;
        let state = self.store.read();
        checked_net(
            state
                .operations_between(start, end)
                .map(|operation| operation.balance_effect()),
        )
    }

    /// Per-category sums within `[start, end]`, keyed by category id.
    ///
    /// Categories without matching operations are absent from the map.
    pub fn category_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<BTreeMap<EntityId, CategoryTotal>> {
        ensure_period(start, end)?;
        let state = self.store.read();
        summarize(&state, start, end, None)
    }

    /// Category totals of one kind, largest first.
    pub fn category_totals_by_kind(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        kind: OperationKind,
    ) -> LedgerResult<Vec<CategoryTotal>> {
        ensure_period(start, end)?;
        let state = self.store.read();
        Ok(ranked(summarize(&state, start, end, Some(kind))?.into_values()))
    }

    pub fn statistics(&self, start: NaiveDate, end: NaiveDate) -> LedgerResult<PeriodStatistics> {
        ensure_period(start, end)?;
        let state = self.store.read();
        let summary = summarize(&state, start, end, None)?;
        drop(state);

        let (income, expense): (Vec<_>, Vec<_>) = summary
            .into_values()
            .partition(|total| total.kind == OperationKind::Income);
        let income_total = checked_total(income.iter().map(|total| total.total))?;
        let expense_total = checked_total(expense.iter().map(|total| total.total))?;

        Ok(PeriodStatistics {
            start,
            end,
            income_total,
            expense_total,
            delta: income_total - expense_total,
            income_by_category: ranked(income),
            expense_by_category: ranked(expense),
        })
    }

    /// Twelve rows, January first, with zeros for months without operations.
    pub fn monthly_dynamics(&self, year: i32) -> LedgerResult<Vec<MonthlyTotals>> {
        self.check_year(year)?;
        let mut months: Vec<MonthlyTotals> = (1..=12)
            .map(|month| MonthlyTotals {
                month,
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
            })
            .collect();

        let state = self.store.read();
        for operation in state.all::<Operation>() {
            if operation.date.year() != year {
                continue;
            }
            let row = &mut months[operation.date.month0() as usize];
            let slot = match operation.kind {
                OperationKind::Income => &mut row.income,
                OperationKind::Expense => &mut row.expense,
            };
            *slot = slot
                .checked_add(operation.amount)
                .ok_or_else(LedgerError::amount_overflow)?;
        }
        Ok(months)
    }

    fn check_year(&self, year: i32) -> LedgerResult<()> {
        let latest = self
            .clock
            .current_year()
            .saturating_add(self.bounds.max_years_ahead);
        if year < self.bounds.min_year || year > latest {
            return Err(LedgerError::Validation(format!(
                "year {year} is outside the supported range {}..={latest}",
                self.bounds.min_year
            )));
        }
        Ok(())
    }
}

fn summarize(
    state: &StoreState,
    start: NaiveDate,
    end: NaiveDate,
    kind: Option<OperationKind>,
) -> LedgerResult<BTreeMap<EntityId, CategoryTotal>> {
    let mut totals: BTreeMap<EntityId, CategoryTotal> = BTreeMap::new();
    for operation in state.operations_between(start, end) {
        if kind.is_some_and(|kind| kind != operation.kind) {
            continue;
        }
        let entry = totals.entry(operation.category_id).or_insert_with(|| {
            let name = state
                .get::<Category>(operation.category_id)
                .map(|category| category.name.clone())
                .unwrap_or_else(|_| format!("category #{}", operation.category_id));
            CategoryTotal {
                category_id: operation.category_id,
                name,
                kind: operation.kind,
                total: Decimal::ZERO,
                operations: 0,
            }
        });
        entry.total = entry
            .total
            .checked_add(operation.amount)
            .ok_or_else(LedgerError::amount_overflow)?;
        entry.operations += 1;
    }
    Ok(totals)
}

fn ranked(totals: impl IntoIterator<Item = CategoryTotal>) -> Vec<CategoryTotal> {
    let mut totals: Vec<_> = totals.into_iter().collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then(a.category_id.cmp(&b.category_id)));
    totals
}
