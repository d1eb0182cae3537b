//! Rows read from a bank statement

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Required column holding the posting date
pub const DATE_COLUMN: &str = "Date";
/// Required column holding the raw bank description
pub const DESCRIPTION_COLUMN: &str = "Description";
/// Required column holding the signed amount
pub const AMOUNT_COLUMN: &str = "Amount";
/// Optional column with the bank's own category label
pub const CATEGORY_COLUMN: &str = "Category";

/// One parsed CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based line in the source file
    pub line: u64,
    pub date: NaiveDate,
    pub description: String,
    /// Negative for expenses, positive for income
    pub amount: Decimal,
    /// The bank's category label, only used as a hint
    pub category: Option<String>,
}

/// All rows of one CSV file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statement {
    /// Where the rows came from (file path or a caller-chosen name)
    pub source: String,
    pub records: Vec<Record>,
}

impl Statement {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct descriptions in first-seen order
    pub fn descriptions(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.description.as_str()))
            .map(|r| r.description.clone())
            .collect()
    }

    /// Distinct, non-empty bank category labels, sorted
    pub fn category_hints(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.category.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
