//! Transaction categorization and calendar aggregation
//!
//! Raw statement rows become [`Transaction`]s, the [`CategoryMapper`]
//! files them under categories, and [`calendar::build_year`] partitions
//! them so [`aggregate::aggregate`] can total any year, month, week or day.

pub mod aggregate;
pub mod calendar;
pub mod error;
pub mod export;
pub mod mapper;
pub mod mapping;
pub mod models;
pub mod prompt;
pub mod reports;
pub mod time;
pub mod types;

use chrono::Weekday;
use spendmap_config::CsvConfig;
use spendmap_parser::{Statement, StatementParser};
use std::path::Path;

pub use aggregate::{aggregate, aggregate_with, Aggregate, AggregateOptions};
pub use calendar::{build_year, build_year_with, CalendarNode};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use mapper::{resolve_unknown, CategoryMapper, Resolution, ResolutionReport};
pub use mapping::{Ambiguity, CategoryMap};
pub use models::Transaction;
pub use prompt::{Answer, PromptRequest, Prompter, ScriptedPrompter};
pub use reports::{CategoryBreakdown, CategoryReport, ChartData, ChartDataPoint};
pub use time::TimeSelection;
pub use types::Granularity;

/// Category dropped by [`aggregate::aggregate`] when income is excluded
pub const INCOME_CATEGORY: &str = "Income";

/// Category for money moved between the user's own accounts
pub const INTERNAL_TRANSFER_CATEGORY: &str = "Internal Transfer";

/// Parse a bank CSV with the configured date formats
pub fn load_statement(path: impl AsRef<Path>, config: &CsvConfig) -> CoreResult<Statement> {
    let parser = StatementParser::new(config.date_formats.clone());
    Ok(parser.parse_file(path)?)
}

/// Uncategorized transactions for every row of a statement
pub fn transactions_from_statement(statement: &Statement) -> Vec<Transaction> {
    statement.records.iter().map(Transaction::from).collect()
}

/// Drop transactions filed under [`INTERNAL_TRANSFER_CATEGORY`]
pub fn exclude_internal_transfers(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let before = transactions.len();
    let kept: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| !t.is_internal_transfer())
        .collect();
    if kept.len() < before {
        log::debug!("Excluded {} internal transfers", before - kept.len());
    }
    kept
}

/// Categorized view of one year of a statement
#[derive(Debug, Clone)]
pub struct Analysis {
    pub year: CalendarNode,
    /// Descriptions still without a category, in first-seen order
    pub unmapped: Vec<String>,
}

impl Analysis {
    /// Categorize `statement`, drop internal transfers and partition `year`
    pub fn build(
        mapper: &CategoryMapper,
        statement: &Statement,
        year: i32,
        week_start: Weekday,
    ) -> CoreResult<Self> {
        let raw = transactions_from_statement(statement);
        let unmapped = mapper.unmapped(&raw);
        if !unmapped.is_empty() {
            log::warn!(
                "{} descriptions in {} have no category",
                unmapped.len(),
                statement.source
            );
        }

        let categorized = exclude_internal_transfers(mapper.categorize(&raw));
        let year = build_year_with(year, &categorized, week_start)?;
        Ok(Self { year, unmapped })
    }

    /// Report on the selected part of the year
    pub fn report(
        &self,
        selection: &TimeSelection,
        options: &AggregateOptions,
        title: &str,
    ) -> CoreResult<CategoryReport> {
        let node = selection.resolve(&self.year)?;
        Ok(CategoryReport::build(node, options, title))
    }
}

// ==================== Tests ====================
