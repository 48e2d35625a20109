pub mod account;
pub mod analytics;
pub mod category;
pub mod config;
pub mod operation;
pub mod system;
pub mod transfer;

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::cli::errors::CommandError;
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::domain::{EntityId, OperationKind};
use crate::transfer::csv::parse_date;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let groups: [fn() -> Vec<CommandEntry>; 7] = [
        system::definitions,
        account::definitions,
        category::definitions,
        operation::definitions,
        analytics::definitions,
        transfer::definitions,
        config::definitions,
    ];
    for entry in groups.into_iter().flat_map(|group| group()) {
        registry.register(entry);
    }
}

/// Lower-cased first argument and the remaining arguments.
pub(crate) fn split_subcommand<'a, 'b>(args: &'a [&'b str]) -> Option<(String, &'a [&'b str])> {
    args.split_first()
        .map(|(first, rest)| (first.to_ascii_lowercase(), rest))
}

pub(crate) fn arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index).copied().ok_or_else(|| CommandError::usage(usage))
}

pub(crate) fn parse_id(value: &str) -> Result<EntityId, CommandError> {
    value
        .trim_start_matches('#')
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("`{value}` is not a valid id")))
}

pub(crate) fn parse_amount(value: &str) -> Result<Decimal, CommandError> {
    Decimal::from_str(value.trim())
        .map_err(|_| CommandError::InvalidArguments(format!("`{value}` is not a valid amount")))
}

pub(crate) fn parse_day(value: &str) -> Result<NaiveDate, CommandError> {
    parse_date(value).ok_or_else(|| {
        CommandError::InvalidArguments(format!("`{value}` is not a date (expected YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_kind(value: &str) -> Result<OperationKind, CommandError> {
    value
        .parse()
        .map_err(|err: crate::domain::ParseKindError| CommandError::InvalidArguments(err.to_string()))
}

/// Joins the remaining words so names need no quoting.
pub(crate) fn join_words(args: &[&str]) -> String {
    args.join(" ").trim().to_string()
}
