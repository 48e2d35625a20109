use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::errors::TransferResult;

/// Writes `records` as an indented JSON array.
pub fn write_records<T: Serialize, W: Write>(writer: W, records: &[T]) -> TransferResult<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

pub fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> TransferResult<Vec<T>> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, OperationKind};
    use chrono::Utc;

    #[test]
    fn categories_serialise_with_type_field() {
        let mut category = Category::new("Salary", OperationKind::Income, Utc::now());
        category.id = 1;
        let mut buffer = Vec::new();
        write_records(&mut buffer, &[category]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"type\": \"INCOME\""), "{text}");
    }

    #[test]
    fn missing_timestamps_default_on_read() {
        let input = r#"[{"id": 7, "type": "EXPENSE", "name": "Food"}]"#;
        let categories: Vec<Category> = read_records(input.as_bytes()).unwrap();
        assert_eq!(categories[0].id, 7);
        assert_eq!(categories[0].kind, OperationKind::Expense);
    }
}
