//! CSV codec. Column order is fixed per entity kind:
//!
//! - `accounts.csv`: `ID,Name,Balance`
//! - `categories.csv`: `ID,Type,Name`
//! - `operations.csv`: `ID,Type,BankAccountID,Amount,Date,Description,CategoryID`

use std::io::{Read, Write};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::errors::{TransferError, TransferResult};
use crate::domain::{Account, Category, EntityId, Operation, OperationKind};

use super::TransferRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountRow {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Balance")]
    pub balance: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRow {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OperationRow {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "BankAccountID")]
    pub account_id: EntityId,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "CategoryID")]
    pub category_id: EntityId,
}

impl TransferRecord for Account {
    const FILE_STEM: &'static str = "accounts";
    type Row = AccountRow;
    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Balance"];

    fn to_row(&self) -> AccountRow {
        AccountRow {
            id: self.id,
            name: self.name.clone(),
            balance: self.balance.to_string(),
        }
    }

    fn from_row(row: AccountRow, now: DateTime<Utc>) -> TransferResult<Self> {
        let balance = parse_decimal(&row.balance, "account", row.id, "balance")?;
        let mut account = Account::new(row.name, now);
        account.id = row.id;
        account.balance = balance;
        Ok(account)
    }
}

impl TransferRecord for Category {
    const FILE_STEM: &'static str = "categories";
    type Row = CategoryRow;
    const COLUMNS: &'static [&'static str] = &["ID", "Type", "Name"];

    fn to_row(&self) -> CategoryRow {
        CategoryRow {
            id: self.id,
            kind: self.kind.as_code().to_string(),
            name: self.name.clone(),
        }
    }

    fn from_row(row: CategoryRow, now: DateTime<Utc>) -> TransferResult<Self> {
        let kind = parse_kind(&row.kind, "category", row.id)?;
        let mut category = Category::new(row.name, kind, now);
        category.id = row.id;
        Ok(category)
    }
}

impl TransferRecord for Operation {
    const FILE_STEM: &'static str = "operations";
    type Row = OperationRow;
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Type",
        "BankAccountID",
        "Amount",
        "Date",
        "Description",
        "CategoryID",
    ];

    fn to_row(&self) -> OperationRow {
        OperationRow {
            id: self.id,
            kind: self.kind.as_code().to_string(),
            account_id: self.account_id,
            amount: self.amount.to_string(),
            date: format_date(self.date),
            description: self.description.clone(),
            category_id: self.category_id,
        }
    }

    fn from_row(row: OperationRow, now: DateTime<Utc>) -> TransferResult<Self> {
        let kind = parse_kind(&row.kind, "operation", row.id)?;
        let amount = parse_decimal(&row.amount, "operation", row.id, "amount")?;
        let date = parse_date(&row.date).ok_or_else(|| {
            TransferError::Parse(format!("operation {}: invalid date `{}`", row.id, row.date))
        })?;
        let mut operation = Operation::new(
            kind,
            row.account_id,
            row.category_id,
            amount,
            date,
            row.description,
            now,
        );
        operation.id = row.id;
        Ok(operation)
    }
}

pub fn write_records<T: TransferRecord, W: Write>(writer: W, records: &[T]) -> TransferResult<()> {
    let mut writer = ::csv::Writer::from_writer(writer);
    // Serialising rows emits the header lazily; an empty table still gets one.
    if records.is_empty() {
        writer.write_record(T::COLUMNS)?;
    }
    for record in records {
        writer.serialize(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_records<T: TransferRecord, R: Read>(
    reader: R,
    now: DateTime<Utc>,
) -> TransferResult<Vec<T>> {
    let mut reader = ::csv::ReaderBuilder::new().trim(::csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in reader.deserialize::<T::Row>() {
        records.push(T::from_row(row?, now)?);
    }
    Ok(records)
}

/// Dates are written as RFC 3339 timestamps at midnight UTC.
pub fn format_date(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Accepts RFC 3339 timestamps (keeping the calendar date of their own offset) or plain `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|stamp| stamp.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
}

fn parse_kind(value: &str, entity: &str, id: EntityId) -> TransferResult<OperationKind> {
    value
        .parse()
        .map_err(|err| TransferError::Parse(format!("{entity} {id}: {err}")))
}

fn parse_decimal(value: &str, entity: &str, id: EntityId, field: &str) -> TransferResult<Decimal> {
    Decimal::from_str(value.trim())
        .or_else(|_| Decimal::from_scientific(value.trim()))
        .map_err(|_| TransferError::Parse(format!("{entity} {id}: invalid {field} `{value}`")))
}
