mod common;

use common::{account, category, date, services};
use finance_core::core::services::OperationDraft;
use finance_core::domain::{EntityId, OperationKind};
use finance_core::LedgerError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone)]
enum Step {
    Create { account: usize, income: bool, cents: i64, day: u32 },
    Update { pick: usize, account: usize, income: bool, cents: i64 },
    Delete { pick: usize },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0..2usize, any::<bool>(), 1..500_000i64, 1..28u32).prop_map(
            |(account, income, cents, day)| Step::Create { account, income, cents, day }
        ),
        2 => (any::<usize>(), 0..2usize, any::<bool>(), 1..500_000i64).prop_map(
            |(pick, account, income, cents)| Step::Update { pick, account, income, cents }
        ),
        1 => any::<usize>().prop_map(|pick| Step::Delete { pick }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stored_balances_track_operations(steps in prop::collection::vec(step(), 1..40)) {
        let services = services();
        let accounts = [account(&services, "Checking"), account(&services, "Savings")];
        let salary = category(&services, "Salary", OperationKind::Income);
        let rent = category(&services, "Rent", OperationKind::Expense);
        let category_for = |income: bool| if income { salary } else { rent };
        let mut live: Vec<EntityId> = Vec::new();

        for step in steps {
            match step {
                Step::Create { account, income, cents, day } => {
                    let draft = OperationDraft::new(
                        accounts[account],
                        category_for(income),
                        Decimal::new(cents, 2),
                        date(2024, 5, day),
                    );
                    live.push(services.operations.create(draft).unwrap().id);
                }
                Step::Update { pick, account, income, cents } => {
                    if live.is_empty() {
                        continue;
                    }
                    let id = live[pick % live.len()];
                    let existing = services.operations.get(id).unwrap();
                    let mut draft = OperationDraft::from_operation(&existing);
                    draft.account_id = accounts[account];
                    draft.category_id = category_for(income);
                    draft.amount = Decimal::new(cents, 2);
                    services.operations.update(id, draft).unwrap();
                }
                Step::Delete { pick } => {
                    if live.is_empty() {
                        continue;
                    }
                    let id = live.remove(pick % live.len());
                    services.operations.delete(id).unwrap();
                }
            }

            for id in accounts {
                let check = services.accounts.verify_balance(id).unwrap();
                prop_assert!(check.is_consistent(), "drift on account {}: {:?}", id, check);
            }
        }
    }
}

#[test]
fn failed_create_leaves_balance_untouched() {
    let services = services();
    let checking = account(&services, "Checking");
    let salary = category(&services, "Salary", OperationKind::Income);

    let negative = OperationDraft::new(checking, salary, dec!(-5), date(2024, 1, 1));
    assert!(matches!(
        services.operations.create(negative),
        Err(LedgerError::Validation(_))
    ));
    let wrong_kind = OperationDraft::new(checking, salary, dec!(5), date(2024, 1, 1))
        .with_kind(OperationKind::Expense);
    assert!(services.operations.create(wrong_kind).is_err());
    let missing_category = OperationDraft::new(checking, 999, dec!(5), date(2024, 1, 1));
    assert!(matches!(
        services.operations.create(missing_category),
        Err(LedgerError::NotFound { .. })
    ));

    assert_eq!(services.accounts.get(checking).unwrap().balance, dec!(0));
    assert!(services.operations.list().is_empty());
}

#[test]
fn moving_an_operation_between_accounts_moves_its_effect() {
    let services = services();
    let checking = account(&services, "Checking");
    let savings = account(&services, "Savings");
    let rent = category(&services, "Rent", OperationKind::Expense);

    let operation = services
        .operations
        .create(OperationDraft::new(checking, rent, dec!(700), date(2024, 3, 1)))
        .unwrap();
    assert_eq!(services.accounts.get(checking).unwrap().balance, dec!(-700));

    let mut draft = OperationDraft::from_operation(&operation);
    draft.account_id = savings;
    draft.amount = dec!(650);
    services.operations.update(operation.id, draft).unwrap();

    assert_eq!(services.accounts.get(checking).unwrap().balance, dec!(0));
    assert_eq!(services.accounts.get(savings).unwrap().balance, dec!(-650));
}

#[test]
fn referenced_entities_cannot_be_deleted() {
    let services = services();
    let checking = account(&services, "Checking");
    let rent = category(&services, "Rent", OperationKind::Expense);
    let operation = common::book(&services, checking, rent, dec!(10), date(2024, 3, 1));

    assert!(matches!(
        services.accounts.delete(checking),
        Err(LedgerError::ReferentialIntegrity { references: 1, .. })
    ));
    assert!(matches!(
        services.categories.delete(rent),
        Err(LedgerError::ReferentialIntegrity { .. })
    ));

    services.operations.delete(operation.id).unwrap();
    services.categories.delete(rent).unwrap();
    services.accounts.delete(checking).unwrap();
}
