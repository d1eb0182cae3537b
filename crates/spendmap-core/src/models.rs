//! Core data models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendmap_parser::Record;

use crate::{INCOME_CATEGORY, INTERNAL_TRANSFER_CATEGORY};

/// A bank transaction
///
/// `category` is derived from the category map and never read from the
/// input file; re-categorizing produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Posting date
    pub date: NaiveDate,
    /// Raw bank description, the classification key
    pub description: String,
    /// Negative for expenses, positive for income
    pub amount: Decimal,
    /// Assigned category, `None` while unresolved
    pub category: Option<String>,
}

impl Transaction {
    /// Create an uncategorized transaction
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            category: None,
        }
    }

    /// Copy of this transaction with `category` assigned
    pub fn with_category(&self, category: Option<String>) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    /// Check if a category has been assigned
    pub fn is_categorized(&self) -> bool {
        self.category.is_some()
    }

    /// Check if the transaction moves money between the user's own accounts
    pub fn is_internal_transfer(&self) -> bool {
        self.category.as_deref() == Some(INTERNAL_TRANSFER_CATEGORY)
    }

    pub fn is_income(&self) -> bool {
        self.category.as_deref() == Some(INCOME_CATEGORY)
    }
}

impl From<Record> for Transaction {
    fn from(record: Record) -> Self {
        Transaction::new(record.date, record.description, record.amount)
    }
}

impl From<&Record> for Transaction {
    fn from(record: &Record) -> Self {
        Transaction::new(record.date, record.description.clone(), record.amount)
    }
}
