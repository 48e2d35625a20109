pub mod account_service;
pub mod analytics_service;
pub mod category_service;
pub mod operation_service;
pub mod transfer_service;

use std::sync::Arc;

pub use account_service::{AccountService, BalanceCheck};
pub use analytics_service::{
    AnalyticsService, CategoryTotal, MonthlyTotals, PeriodStatistics, YearBounds,
};
pub use category_service::CategoryService;
pub use operation_service::{OperationDraft, OperationService};
pub use transfer_service::{BalanceWarning, ExportReport, ImportReport, TransferService};

use crate::core::time::{Clock, SystemClock};
use crate::storage::EntityStore;

/// Every service wired against one store and one clock.
///
/// Built eagerly at startup; the store is only reachable through these services.
pub struct LedgerServices {
    pub accounts: AccountService,
    pub categories: CategoryService,
    pub operations: OperationService,
    pub analytics: AnalyticsService,
    pub transfer: TransferService,
}

impl LedgerServices {
    pub fn new(store: Arc<EntityStore>, clock: Arc<dyn Clock>, bounds: YearBounds) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&store), Arc::clone(&clock)),
            categories: CategoryService::new(Arc::clone(&store), Arc::clone(&clock)),
            operations: OperationService::new(Arc::clone(&store), Arc::clone(&clock)),
            analytics: AnalyticsService::new(Arc::clone(&store), Arc::clone(&clock), bounds),
            transfer: TransferService::new(store, clock),
        }
    }

    /// Empty store, wall clock and default analytics bounds.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(EntityStore::new()),
            Arc::new(SystemClock),
            YearBounds::default(),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{LedgerServices, OperationDraft, YearBounds};
    use crate::core::time::FixedClock;
    use crate::domain::{EntityId, Operation, OperationKind};
    use crate::storage::EntityStore;

    pub(crate) struct Fixture {
        pub services: LedgerServices,
        pub store: Arc<EntityStore>,
    }

    impl Fixture {
        pub fn category(&self, name: &str, kind: OperationKind) -> EntityId {
            self.services
                .categories
                .create(name, kind)
                .expect("category created")
                .id
        }

        pub fn book(
            &self,
            account_id: EntityId,
            category_id: EntityId,
            amount: Decimal,
            (year, month, day): (i32, u32, u32),
        ) -> Operation {
            self.services
                .operations
                .create(OperationDraft::new(
                    account_id,
                    category_id,
                    amount,
                    date(year, month, day),
                ))
                .expect("operation booked")
        }
    }

    pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    pub(crate) fn fixture_at(year: i32, month: u32, day: u32) -> Fixture {
        let store = Arc::new(EntityStore::new());
        let services = LedgerServices::new(
            Arc::clone(&store),
            Arc::new(FixedClock::on(year, month, day)),
            YearBounds::default(),
        );
        Fixture { services, store }
    }

    pub(crate) fn fixture() -> Fixture {
        fixture_at(2024, 12, 31)
    }
}
