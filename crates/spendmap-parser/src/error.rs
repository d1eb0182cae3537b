//! Error types for spendmap-parser

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("{source_name}: missing required column(s): {}", .columns.join(", "))]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error("{source_name}:{line}: cannot parse date '{value}'")]
    InvalidDate {
        source_name: String,
        line: u64,
        value: String,
    },

    #[error("{source_name}:{line}: cannot parse amount '{value}'")]
    InvalidAmount {
        source_name: String,
        line: u64,
        value: String,
    },

    #[error("Malformed CSV in {source_name}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("IO error")]
    IoError(#[from] io::Error),
}

impl ParseError {
    /// Whether the input is missing a required column
    pub fn is_schema_error(&self) -> bool {
        matches!(self, ParseError::MissingColumns { .. })
    }

    /// Whether a row carried a date no configured format accepts
    pub fn is_date_error(&self) -> bool {
        matches!(self, ParseError::InvalidDate { .. })
    }
}
