//! File codecs for moving the whole data set in and out of a directory.
//!
//! Every format writes three files side by side: `accounts.<ext>`,
//! `categories.<ext>` and `operations.<ext>`. CSV goes through flat row types
//! with a fixed column order; JSON and YAML serialise the domain structs as
//! arrays of objects.

pub mod csv;
pub mod json;
pub mod yaml;

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::errors::{TransferError, TransferResult};
use crate::domain::{Account, Category, Operation};

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Csv,
    Json,
    Yaml,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [FileFormat::Csv, FileFormat::Json, FileFormat::Yaml];

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
            FileFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileFormat {
    type Err = TransferError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            _ => Err(TransferError::UnsupportedFormat(value.to_string())),
        }
    }
}

/// All three entity kinds as read from or written to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    pub operations: Vec<Operation>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.accounts.len() + self.categories.len() + self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Orders every table by id so exported files are stable.
    pub fn sort_by_id(&mut self) {
        self.accounts.sort_by_key(|account| account.id);
        self.categories.sort_by_key(|category| category.id);
        self.operations.sort_by_key(|operation| operation.id);
    }
}

/// Entities that can be written to and read from the per-kind files.
pub trait TransferRecord: Serialize + DeserializeOwned + Sized {
    /// File name without extension.
    const FILE_STEM: &'static str;
    /// Flat CSV representation with a fixed column order.
    type Row: Serialize + DeserializeOwned;
    /// CSV header, matching the field order of `Row`.
    const COLUMNS: &'static [&'static str];

    fn to_row(&self) -> Self::Row;

    /// Builds the entity from a CSV row. `now` fills timestamps the row does not carry.
    fn from_row(row: Self::Row, now: DateTime<Utc>) -> TransferResult<Self>;
}

pub fn file_path(dir: &Path, stem: &str, format: FileFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Writes the snapshot into `dir`, creating it when missing. Returns the written paths.
pub fn write_snapshot(
    dir: &Path,
    format: FileFormat,
    snapshot: &Snapshot,
) -> TransferResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    Ok(vec![
        write_records(dir, format, &snapshot.accounts)?,
        write_records(dir, format, &snapshot.categories)?,
        write_records(dir, format, &snapshot.operations)?,
    ])
}

/// Reads the three files from `dir`. Timestamps absent from the files are set to `now`.
pub fn read_snapshot(dir: &Path, format: FileFormat, now: DateTime<Utc>) -> TransferResult<Snapshot> {
    Ok(Snapshot {
        accounts: read_records(dir, format, now)?,
        categories: read_records(dir, format, now)?,
        operations: read_records(dir, format, now)?,
    })
}

fn write_records<T: TransferRecord>(
    dir: &Path,
    format: FileFormat,
    records: &[T],
) -> TransferResult<PathBuf> {
    let path = file_path(dir, T::FILE_STEM, format);
    let mut writer = BufWriter::new(File::create(&path)?);
    match format {
        FileFormat::Csv => csv::write_records(&mut writer, records)?,
        FileFormat::Json => json::write_records(&mut writer, records)?,
        FileFormat::Yaml => yaml::write_records(&mut writer, records)?,
    }
    writer.flush()?;
    Ok(path)
}

fn read_records<T: TransferRecord>(
    dir: &Path,
    format: FileFormat,
    now: DateTime<Utc>,
) -> TransferResult<Vec<T>> {
    let path = file_path(dir, T::FILE_STEM, format);
    let reader = BufReader::new(File::open(&path)?);
    match format {
        FileFormat::Csv => csv::read_records(reader, now),
        FileFormat::Json => json::read_records(reader),
        FileFormat::Yaml => yaml::read_records(reader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_accepts_aliases() {
        assert_eq!("JSON".parse::<FileFormat>().unwrap(), FileFormat::Json);
        assert_eq!("yml".parse::<FileFormat>().unwrap(), FileFormat::Yaml);
        assert!(matches!(
            "xml".parse::<FileFormat>(),
            Err(TransferError::UnsupportedFormat(name)) if name == "xml"
        ));
    }

    #[test]
    fn file_names_follow_stem_and_extension() {
        let path = file_path(Path::new("/tmp/out"), Operation::FILE_STEM, FileFormat::Yaml);
        assert_eq!(path, PathBuf::from("/tmp/out/operations.yaml"));
    }
}
