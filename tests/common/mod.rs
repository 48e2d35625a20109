#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use finance_core::core::services::{LedgerServices, OperationDraft, YearBounds};
use finance_core::core::time::FixedClock;
use finance_core::domain::{EntityId, Operation, OperationKind};
use finance_core::storage::EntityStore;
use rust_decimal::Decimal;

/// Services over a fresh store with the clock frozen at 2025-06-15.
pub fn services() -> LedgerServices {
    services_on(Arc::new(EntityStore::new()))
}

pub fn services_on(store: Arc<EntityStore>) -> LedgerServices {
    LedgerServices::new(
        store,
        Arc::new(FixedClock::on(2025, 6, 15)),
        YearBounds::default(),
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn account(services: &LedgerServices, name: &str) -> EntityId {
    services.accounts.create(name).expect("account created").id
}

pub fn category(services: &LedgerServices, name: &str, kind: OperationKind) -> EntityId {
    services
        .categories
        .create(name, kind)
        .expect("category created")
        .id
}

pub fn book(
    services: &LedgerServices,
    account_id: EntityId,
    category_id: EntityId,
    amount: Decimal,
    on: NaiveDate,
) -> Operation {
    services
        .operations
        .create(OperationDraft::new(account_id, category_id, amount, on))
        .expect("operation booked")
}

/// Accounts A1 and A2, categories C1 (income) and C2 (expense), and three operations:
/// 1000 income on 2024-01-10, 200 expense on 2024-01-15 and 500 income on 2024-02-01, all on A1.
pub struct SampleBook {
    pub services: LedgerServices,
    pub checking: EntityId,
    pub savings: EntityId,
    pub salary: EntityId,
    pub groceries: EntityId,
}

pub fn sample_book() -> SampleBook {
    let services = services();
    let checking = account(&services, "A1");
    let savings = account(&services, "A2");
    let salary = category(&services, "C1", OperationKind::Income);
    let groceries = category(&services, "C2", OperationKind::Expense);
    book(&services, checking, salary, Decimal::new(1000, 0), date(2024, 1, 10));
    book(&services, checking, groceries, Decimal::new(200, 0), date(2024, 1, 15));
    book(&services, checking, salary, Decimal::new(500, 0), date(2024, 2, 1));
    SampleBook {
        services,
        checking,
        savings,
        salary,
        groceries,
    }
}
