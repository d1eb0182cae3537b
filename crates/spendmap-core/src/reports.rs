//! Report structures built from aggregates

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_with, unresolved_count, Aggregate, AggregateOptions};
use crate::calendar::CalendarNode;

const CHART_COLORS: [&str; 10] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF",
    "#FF9F40", "#7BC225", "#C9CBCF", "#E7E9ED", "#B56576",
];

/// Category breakdown for tables and charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub amount: Decimal,
    pub percentage: f64,
    /// Transactions contributing to the amount
    pub count: usize,
}

/// Category report for one calendar node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub title: String,
    /// Period label, e.g. `2024-Feb`
    pub period: String,
    /// Largest amount first
    pub entries: Vec<CategoryBreakdown>,
    pub total: Decimal,
    /// Transactions left out because they have no category
    pub unresolved: usize,
}

impl CategoryReport {
    /// Aggregate `node` and order the categories by amount
    pub fn build(node: &CalendarNode, options: &AggregateOptions, title: impl Into<String>) -> Self {
        let totals = aggregate_with(node, options);
        let mut report = Self::from_aggregate(&totals, title, node.label());
        for entry in &mut report.entries {
            entry.count = node
                .transactions()
                .iter()
                .filter(|t| t.category.as_deref() == Some(entry.category.as_str()))
                .count();
        }
        report.unresolved = unresolved_count(node.transactions());
        report
    }

    /// Report over precomputed totals; counts are left at zero
    pub fn from_aggregate(totals: &Aggregate, title: impl Into<String>, period: impl Into<String>) -> Self {
        let total: Decimal = totals.values().copied().sum();
        let mut entries: Vec<CategoryBreakdown> = totals
            .iter()
            .map(|(category, amount)| CategoryBreakdown {
                category: category.clone(),
                amount: *amount,
                percentage: percentage(*amount, total),
                count: 0,
            })
            .collect();
        entries.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));

        Self {
            title: title.into(),
            period: period.into(),
            entries,
            total,
            unresolved: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chart data with one colored point per category
    pub fn chart_data(&self) -> ChartData {
        let data_points = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| ChartDataPoint {
                label: entry.category.clone(),
                value: entry.amount.to_f64().unwrap_or(0.0),
                percentage: entry.percentage,
                color: CHART_COLORS[i % CHART_COLORS.len()].to_string(),
            })
            .collect();

        ChartData {
            title: format!("{} ({})", self.title, self.period),
            data_points,
        }
    }
}

fn percentage(amount: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (amount / total * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

/// Chart data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
    pub color: String,
}

/// Chart data for visualization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub data_points: Vec<ChartDataPoint>,
}

impl ChartData {
    pub fn total(&self) -> f64 {
        self.data_points.iter().map(|p| p.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::build_year;
    use crate::models::Transaction;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(day: u32, amount: &str, category: Option<&str>) -> Transaction {
        Transaction::new(NaiveDate::from_ymd_opt(2022, 3, day).unwrap(), "X", d(amount))
            .with_category(category.map(str::to_string))
    }

    #[test]
    fn test_build_orders_and_counts() {
        let transactions = vec![
            tx(1, "-25", Some("Gas")),
            tx(2, "-50", Some("Groceries")),
            tx(3, "-25", Some("Groceries")),
            tx(4, "-5", None),
        ];
        let year = build_year(2022, &transactions).unwrap();
        let march = year.month(3).unwrap();
        let report = CategoryReport::build(march, &AggregateOptions::default(), "Spending");

        assert_eq!(report.period, "2022-Mar");
        assert_eq!(report.total, d("100"));
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.entries[0].category, "Groceries");
        assert_eq!(report.entries[0].count, 2);
        assert!((report.entries[0].percentage - 75.0).abs() < 1e-9);
        assert_eq!(report.entries[1].category, "Gas");
        assert!((report.entries[1].percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report() {
        let report = CategoryReport::from_aggregate(&Aggregate::new(), "Spending", "2022");
        assert!(report.is_empty());
        assert_eq!(report.total, Decimal::ZERO);
        assert!(report.chart_data().data_points.is_empty());
    }

    #[test]
    fn test_chart_data_colors_cycle() {
        let totals: Aggregate = (0..12).map(|i| (format!("C{:02}", i), Decimal::from(12 - i))).collect();
        let chart = CategoryReport::from_aggregate(&totals, "Spending", "2022").chart_data();

        assert_eq!(chart.data_points.len(), 12);
        assert_eq!(chart.data_points[0].color, CHART_COLORS[0]);
        assert_eq!(chart.data_points[10].color, CHART_COLORS[0]);
        assert_eq!(chart.title, "Spending (2022)");
        assert!((chart.total() - 78.0).abs() < 1e-9);
    }
}
