use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::errors::TransferResult;

/// Writes `records` as a YAML sequence with the same object shape as JSON.
pub fn write_records<T: Serialize, W: Write>(writer: W, records: &[T]) -> TransferResult<()> {
    serde_yaml::to_writer(writer, records)?;
    Ok(())
}

pub fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> TransferResult<Vec<T>> {
    Ok(serde_yaml::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Operation, OperationKind};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn operations_read_back_from_yaml() {
        let mut op = Operation::new(
            OperationKind::Income,
            1,
            2,
            dec!(1000),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            "January salary",
            Utc::now(),
        );
        op.id = 9;
        let mut buffer = Vec::new();
        write_records(&mut buffer, std::slice::from_ref(&op)).unwrap();

        let parsed: Vec<Operation> = read_records(buffer.as_slice()).unwrap();
        assert_eq!(parsed, vec![op]);
    }
}
