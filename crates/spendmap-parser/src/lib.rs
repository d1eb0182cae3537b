//! Bank statement CSV parser
//!
//! Reads `Date`, `Description`, `Amount` and the optional `Category`
//! column from bank exports into typed [`Record`]s.

pub mod error;
pub mod types;
pub mod parser;

pub use error::ParseError;
pub use parser::{parse_amount, parse_date, StatementParser};

// Re-export commonly used types
pub use types::{
    Record, Statement, AMOUNT_COLUMN, CATEGORY_COLUMN, DATE_COLUMN, DESCRIPTION_COLUMN,
};
