mod common;

use std::fs;

use common::{date, sample_book, services};
use finance_core::domain::{Account, Category, Operation, OperationKind};
use finance_core::transfer::{FileFormat, Snapshot};
use finance_core::TransferError;
use rust_decimal_macros::dec;
use tempfile::TempDir;

#[test]
fn export_then_import_restores_every_entity() {
    for format in FileFormat::ALL {
        let sample = sample_book();
        let dir = TempDir::new().unwrap();
        let report = sample.services.transfer.export_all(dir.path(), format).unwrap();
        assert_eq!(report.files.len(), 3);
        assert_eq!(
            (report.accounts, report.categories, report.operations),
            (2, 2, 3)
        );

        let fresh = services();
        let imported = fresh.transfer.import_all(dir.path(), format).unwrap();
        assert!(imported.warnings.is_empty(), "{format}: {:?}", imported.warnings);

        let accounts = fresh.accounts.list();
        assert_eq!(accounts.len(), 2, "{format}");
        let checking = fresh.accounts.get(sample.checking).unwrap();
        assert_eq!(checking.name, "A1");
        assert_eq!(checking.balance, dec!(1300));

        let operations = fresh.operations.list();
        assert_eq!(operations.len(), 3);
        assert_eq!(operations[1].date, date(2024, 1, 15));
        assert_eq!(operations[1].kind, OperationKind::Expense);
        assert_eq!(
            fresh.categories.get(sample.groceries).unwrap().kind,
            OperationKind::Expense
        );

        // Ids continue past the imported ones.
        let next = fresh.accounts.create("Cash").unwrap();
        assert_eq!(next.id, 3);
    }
}

#[test]
fn csv_uses_the_documented_columns() {
    let sample = sample_book();
    let dir = TempDir::new().unwrap();
    sample
        .services
        .transfer
        .export_all(dir.path(), FileFormat::Csv)
        .unwrap();

    let operations = fs::read_to_string(dir.path().join("operations.csv")).unwrap();
    let mut lines = operations.lines();
    assert_eq!(
        lines.next(),
        Some("ID,Type,BankAccountID,Amount,Date,Description,CategoryID")
    );
    assert!(lines
        .next()
        .is_some_and(|row| row.starts_with("1,INCOME,1,1000,2024-01-10T00:00:00Z")));

    let accounts = fs::read_to_string(dir.path().join("accounts.csv")).unwrap();
    assert!(accounts.starts_with("ID,Name,Balance"));
}

#[test]
fn imported_balances_are_recomputed_from_operations() {
    let sample = sample_book();
    let mut snapshot = sample.services.transfer.snapshot();
    snapshot.accounts[0].balance = dec!(1);

    let fresh = services();
    let report = fresh.transfer.import_snapshot(snapshot).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].recorded, dec!(1));
    assert_eq!(report.warnings[0].recomputed, dec!(1300));
    assert_eq!(fresh.accounts.get(sample.checking).unwrap().balance, dec!(1300));
}

#[test]
fn invalid_snapshot_is_rejected_without_side_effects() {
    let now = chrono::Utc::now();
    let mut account = Account::new("Orphaned", now);
    account.id = 1;
    let mut category = Category::new("Salary", OperationKind::Income, now);
    category.id = 1;
    let mut operation = Operation::new(
        OperationKind::Income,
        1,
        99,
        dec!(10),
        date(2024, 1, 1),
        "",
        now,
    );
    operation.id = 1;
    let snapshot = Snapshot {
        accounts: vec![account],
        categories: vec![category],
        operations: vec![operation],
    };

    let fresh = services();
    assert!(fresh.transfer.import_snapshot(snapshot).is_err());
    assert!(fresh.accounts.list().is_empty());
    assert!(fresh.operations.list().is_empty());
}

#[test]
fn missing_files_surface_as_io_errors() {
    let dir = TempDir::new().unwrap();
    let err = services()
        .transfer
        .import_all(dir.path(), FileFormat::Json)
        .unwrap_err();
    assert!(matches!(err, TransferError::Io(_)));
}

#[test]
fn unknown_format_names_are_rejected() {
    assert!(matches!(
        "xml".parse::<FileFormat>(),
        Err(TransferError::UnsupportedFormat(_))
    ));
    assert_eq!("YML".parse::<FileFormat>().unwrap(), FileFormat::Yaml);
}
