//! Error types for loading call data and exporting reports

use std::io;
use thiserror::Error;

/// Failure to turn a user-supplied file into a table. Terminal for the
/// current load; no partial table is ever returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet parsing error: {0}")]
    Spreadsheet(String),

    #[error("Workbook contains no readable sheet")]
    NoSheet,

    #[error("File contains no data rows")]
    Empty,
}

impl From<calamine::Error> for LoadError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

/// Failure to write an exported report.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),
}
