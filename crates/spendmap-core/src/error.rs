//! Error types for spendmap-core
//!
//! Every failure carries an error code, a severity and a list of
//! suggestions so the command line can explain what to fix.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use spendmap_parser::ParseError;
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed category mapping file
    ConfigError,
    /// Input CSV missing a required column
    SchemaError,
    /// Unparseable date in the input CSV
    DateParseError,
    /// Any other problem reading the input CSV
    ParseError,
    /// File not found
    FileNotFound,
    /// IO error
    IoError,
    /// Caller passed an out-of-range year, month or date
    InvalidInput,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::SchemaError => write!(f, "SCHEMA_ERROR"),
            ErrorCode::DateParseError => write!(f, "DATE_PARSE_ERROR"),
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - persisted state cannot be trusted
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Detailed error information for the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for spendmap-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error in {path}: {message}")]
    ConfigError { path: String, message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error on {path}")]
    IoError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl CoreError {
    /// Wrap an IO error, turning a missing file into `FileNotFound`
    pub fn io(path: impl AsRef<std::path::Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_string_lossy().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            CoreError::FileNotFound { path }
        } else {
            CoreError::IoError { path, source }
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::Parse(e) if e.is_schema_error() => ErrorCode::SchemaError,
            CoreError::Parse(e) if e.is_date_error() => ErrorCode::DateParseError,
            CoreError::Parse(ParseError::FileNotFound { .. }) => ErrorCode::FileNotFound,
            CoreError::Parse(_) => ErrorCode::ParseError,
            CoreError::FileNotFound { .. } => ErrorCode::FileNotFound,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::InvalidInput { .. } => ErrorCode::InvalidInput,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::InvalidInput { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ConfigError { path, message } => {
                details = details.with_detail(serde_json::json!({ "file": path, "yaml_message": message }));
                details = details.with_suggestion(
                    "Each line must look like \"Category\": [\"DESCRIPTION\", ...].".to_string(),
                );
                details = details.with_suggestion(
                    "Restore the file from version control or delete it to start over.".to_string(),
                );
            }
            CoreError::Parse(ParseError::MissingColumns { columns, .. }) => {
                details = details.with_detail(serde_json::json!({ "missing": columns }));
                details = details.with_suggestion(
                    "The CSV header must contain Date, Description and Amount (case-sensitive).".to_string(),
                );
            }
            CoreError::Parse(ParseError::InvalidDate { value, .. }) => {
                details = details.with_detail(serde_json::json!({ "value": value }));
                details = details.with_suggestion(
                    "Add the bank's date layout to csv.date_formats in the config file.".to_string(),
                );
            }
            CoreError::FileNotFound { .. } | CoreError::Parse(ParseError::FileNotFound { .. }) => {
                details = details.with_suggestion("Check if the file path is correct.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
