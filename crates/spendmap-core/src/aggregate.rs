//! Per-category totals over a calendar node

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use spendmap_config::AnalysisConfig;
use std::collections::BTreeMap;

use crate::calendar::CalendarNode;
use crate::models::Transaction;

/// Category name to absolute total
pub type Aggregate = BTreeMap<String, Decimal>;

/// Options for [`aggregate_with`]
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    /// Keep the `Income` category
    pub include_income: bool,
    /// Totals below this are dropped as noise
    pub threshold: Decimal,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            include_income: true,
            threshold: Decimal::ONE,
        }
    }
}

impl AggregateOptions {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            include_income: config.include_income,
            threshold: Decimal::from_f64(config.noise_threshold).unwrap_or(Decimal::ONE),
        }
    }

    pub fn with_income(mut self, include_income: bool) -> Self {
        self.include_income = include_income;
        self
    }
}

/// Aggregate with the default noise threshold
pub fn aggregate(node: &CalendarNode, include_income: bool) -> Aggregate {
    aggregate_with(node, &AggregateOptions::default().with_income(include_income))
}

pub fn aggregate_with(node: &CalendarNode, options: &AggregateOptions) -> Aggregate {
    aggregate_transactions(node.transactions(), options)
}

/// Absolute per-category totals of `transactions`
///
/// Uncategorized transactions are left out.
pub fn aggregate_transactions(transactions: &[Transaction], options: &AggregateOptions) -> Aggregate {
    let counted = transactions
        .iter()
        .filter(|t| options.include_income || !t.is_income());
    sum_by_category(counted)
        .into_iter()
        .map(|(category, total)| (category, total.abs()))
        .filter(|(_, total)| *total >= options.threshold)
        .collect()
}

/// Signed per-category sums, without threshold
pub fn category_totals(transactions: &[Transaction]) -> Aggregate {
    sum_by_category(transactions.iter())
}

fn sum_by_category<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Aggregate {
    let mut totals = Aggregate::new();
    for transaction in transactions {
        if let Some(category) = &transaction.category {
            *totals.entry(category.clone()).or_insert(Decimal::ZERO) += transaction.amount;
        }
    }
    totals
}

/// Number of transactions without a category
pub fn unresolved_count(transactions: &[Transaction]) -> usize {
    transactions.iter().filter(|t| !t.is_categorized()).count()
}
