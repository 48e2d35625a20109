#![doc(test(attr(deny(warnings))))]

//! Finance Core keeps personal bookkeeping consistent: accounts, income and
//! expense categories, and dated operations whose effects are mirrored in
//! account balances. It adds period analytics and CSV/JSON/YAML transfer on top
//! of an in-memory, lock-guarded store.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use crate::core::errors::{LedgerError, LedgerResult, TransferError, TransferResult};
pub use crate::core::services::LedgerServices;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup info log.
pub fn init() {
    init_with_filter(None);
}

/// Like [`init`], using `directives` when `RUST_LOG` is unset.
pub fn init_with_filter(directives: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directives);
        tracing::info!("Finance Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
