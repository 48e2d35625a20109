use std::result::Result as StdResult;

use thiserror::Error;

use crate::domain::{EntityId, EntityKind};

/// Failures raised by the store, the ledger services, and analytics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: EntityId },
    #[error("cannot delete {kind} #{id}: referenced by {references} operations")]
    ReferentialIntegrity {
        kind: EntityKind,
        id: EntityId,
        references: usize,
    },
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        LedgerError::NotFound { kind, id }
    }

    pub fn kind_mismatch() -> Self {
        LedgerError::Validation("category kind mismatch".into())
    }

    pub fn amount_overflow() -> Self {
        LedgerError::Validation("amount overflows account balance".into())
    }

    /// Only storage corruption is treated as fatal by front ends.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::Storage(_))
    }
}

pub type LedgerResult<T> = StdResult<T, LedgerError>;

/// Failures raised while moving the data set in or out of files.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid record: {0}")]
    Parse(String),
    #[error("Unsupported format `{0}` (expected csv, json or yaml)")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type TransferResult<T> = StdResult<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referential_error_reports_reference_count() {
        let err = LedgerError::ReferentialIntegrity {
            kind: EntityKind::Account,
            id: 4,
            references: 2,
        };
        assert_eq!(
            err.to_string(),
            "cannot delete account #4: referenced by 2 operations"
        );
    }

    #[test]
    fn only_storage_errors_are_fatal() {
        assert!(LedgerError::Storage("map corrupted".into()).is_fatal());
        assert!(!LedgerError::not_found(EntityKind::Category, 9).is_fatal());
        assert!(!LedgerError::kind_mismatch().is_fatal());
    }
}
