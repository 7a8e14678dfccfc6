//! Checks on uploaded transaction files before anything is written to the database.
//!
//! A file is accepted when its extension is allowed, it is no larger than `MAX_FILE_SIZE`, it
//! has every required column, and every row passes the field validators. Spreadsheet files pass
//! the extension check but only CSV content can be read.

use crate::model::TransactionRecord;
use crate::validate::{validate_amount, validate_date, ValidationError};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

pub const ALLOWED_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const REQUIRED_COLUMNS: [&str; 4] = [
    "transaction_date",
    "merchant_name",
    "transaction_amount",
    "transaction_type",
];
const CATEGORY_COLUMN: &str = "category";
/// Amounts strictly above this are reported as high value.
pub const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File type not allowed. Allowed types: {}", ALLOWED_EXTENSIONS.join(", "))]
    FileType,
    #[error("File is too large ({size} bytes). The limit is 5 MB")]
    TooLarge { size: u64 },
    #[error("Spreadsheet files cannot be imported yet, save the sheet as CSV")]
    Spreadsheet,
    #[error("Unable to read the CSV file: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("The file contains no transactions")]
    Empty,
    #[error("Row {row}: {source}")]
    InvalidRow {
        /// 1-based, not counting the header.
        row: usize,
        #[source]
        source: ValidationError,
    },
}

/// True when `filename` ends in an allowed extension, ignoring case.
pub fn is_allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
        .is_some_and(|extension| ALLOWED_EXTENSIONS.contains(&extension.as_str()))
}

pub fn is_valid_file_size(size: u64) -> bool {
    size <= MAX_FILE_SIZE
}

/// A high-value row, reported back to the uploader.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HighValueRow {
    pub row: usize,
    pub merchant_name: String,
    pub amount: Decimal,
}

/// An uploaded CSV file held as text, before any row is interpreted.
#[derive(Debug, Clone)]
pub struct UploadTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl UploadTable {
    pub fn from_csv(bytes: &[u8]) -> Result<Self, UploadError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The entries of `required` that are not among the headers, in the order given.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|column| self.column(column).is_none())
            .map(|column| column.to_string())
            .collect()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cell<'a>(&self, row: &'a StringRecord, name: &str) -> Option<&'a str> {
        self.column(name).and_then(|ix| row.get(ix))
    }
}

/// The transactions read from an upload and the rows that deserve a second look.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub transactions: Vec<TransactionRecord>,
    pub high_value: Vec<HighValueRow>,
}

/// Runs every check on an uploaded file and converts its rows. Nothing is returned unless every
/// row is valid.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<ParsedUpload, UploadError> {
    if !is_allowed_file(filename) {
        return Err(UploadError::FileType);
    }
    let size = bytes.len() as u64;
    if !is_valid_file_size(size) {
        return Err(UploadError::TooLarge { size });
    }
    if !filename.to_lowercase().ends_with(".csv") {
        return Err(UploadError::Spreadsheet);
    }

    let table = UploadTable::from_csv(bytes)?;
    let missing = table.missing_columns(&REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(UploadError::MissingColumns(missing));
    }
    if table.is_empty() {
        return Err(UploadError::Empty);
    }

    let mut transactions = Vec::with_capacity(table.len());
    let mut high_value = Vec::new();
    for (ix, row) in table.rows.iter().enumerate() {
        let row_number = ix + 1;
        let invalid = |source| UploadError::InvalidRow {
            row: row_number,
            source,
        };
        let date = validate_date(table.cell(row, "transaction_date")).map_err(invalid)?;
        let amount = validate_amount(table.cell(row, "transaction_amount")).map_err(invalid)?;
        let merchant = required_text(&table, row, "merchant_name").map_err(invalid)?;
        let transaction_type = required_text(&table, row, "transaction_type").map_err(invalid)?;
        let category = table
            .cell(row, CATEGORY_COLUMN)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        if amount > HIGH_VALUE_THRESHOLD {
            high_value.push(HighValueRow {
                row: row_number,
                merchant_name: merchant.to_string(),
                amount,
            });
        }
        transactions.push(TransactionRecord::new(
            date,
            merchant,
            amount.to_string(),
            transaction_type,
            category,
        ));
    }
    Ok(ParsedUpload {
        transactions,
        high_value,
    })
}

fn required_text<'a>(
    table: &UploadTable,
    row: &'a StringRecord,
    column: &'static str,
) -> Result<&'a str, ValidationError> {
    table
        .cell(row, column)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ValidationError::new(column, format!("{column} is required")))
}
