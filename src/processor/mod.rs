use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod csv_processor;
pub mod filter;
pub mod group_sum;
pub mod query_builder;
pub mod row_source;
pub mod wildcard;

/// One record, keyed by column name
pub type Row = HashMap<String, String>;

/// Column name -> accepted wildcard patterns (OR within a column, AND across columns)
pub type ColumnFilter = HashMap<String, HashSet<String>>;

/// Columns retained in filtered output rows
pub type Projection = HashSet<String>;

/// Grouped sums in first-appearance order, or sorted when requested
pub type GroupedSumTable = Vec<GroupedSumEntry>;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("CSV file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("CSV read error: {0}")]
    FileRead(String),

    #[error("Invalid UTF-8 at byte offset {offset}")]
    InvalidCharacter { offset: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Duplicate header: {0}")]
    DuplicateHeader(String),

    #[error("IO error: {0}")]
    Unknown(#[from] std::io::Error),

    #[error("CSV not loaded")]
    NotLoaded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid query: {0}")]
    Query(String),
}

/// Outcome codes surfaced to callers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok = 0,
    FileNotFound = 1,
    FileReadError = 2,
    InvalidCharacter = 3,
    InvalidData = 4,
    DuplicateHeader = 5,
    UnknownError = 100,
}

impl ProcessorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProcessorError::FileNotFound(_) => ErrorCode::FileNotFound,
            ProcessorError::FileRead(_) => ErrorCode::FileReadError,
            ProcessorError::InvalidCharacter { .. } => ErrorCode::InvalidCharacter,
            ProcessorError::InvalidData(_) => ErrorCode::InvalidData,
            ProcessorError::DuplicateHeader(_) => ErrorCode::DuplicateHeader,
            ProcessorError::Unknown(_)
            | ProcessorError::NotLoaded
            | ProcessorError::Config(_)
            | ProcessorError::Query(_) => ErrorCode::UnknownError,
        }
    }
}

impl<T> From<&Result<T, ProcessorError>> for ErrorCode {
    fn from(result: &Result<T, ProcessorError>) -> Self {
        match result {
            Ok(_) => ErrorCode::Ok,
            Err(e) => e.code(),
        }
    }
}

/// Outcome of ingesting a CSV file
#[derive(Debug)]
pub struct ParseSummary {
    pub rows_processed: usize,
    pub errors: Vec<ParseError>,
}

/// A data row whose cell count differs from the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number in the file (the header is line 1)
    pub line: usize,
    pub expected: usize,
    pub found: usize,
}

/// Per-group totals for every requested sum column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedSumEntry {
    pub key: String,
    pub totals: HashMap<String, u64>,
}

impl GroupedSumEntry {
    pub fn new(key: String) -> Self {
        GroupedSumEntry {
            key,
            totals: HashMap::new(),
        }
    }

    /// Total for `column`, 0 when the column was not summed
    pub fn total(&self, column: &str) -> u64 {
        self.totals.get(column).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ProcessorError::FileNotFound(PathBuf::from("x.csv")).code(),
            ErrorCode::FileNotFound
        );
        assert_eq!(
            ProcessorError::InvalidData("missing".into()).code(),
            ErrorCode::InvalidData
        );
        assert_eq!(ProcessorError::NotLoaded.code(), ErrorCode::UnknownError);
        assert_eq!(ErrorCode::UnknownError as i32, 100);
        assert_eq!(ErrorCode::InvalidCharacter as i32, 3);
    }

    #[test]
    fn test_result_to_code() {
        let ok: Result<(), ProcessorError> = Ok(());
        assert_eq!(ErrorCode::from(&ok), ErrorCode::Ok);

        let err: Result<(), ProcessorError> = Err(ProcessorError::FileRead("empty".into()));
        assert_eq!(ErrorCode::from(&err), ErrorCode::FileReadError);
    }
}
