//! Year → Month → Week → Day partition of categorized transactions
//!
//! Every node owns the transactions dated inside its span, and its
//! children tile that span exactly. Weeks start on a configurable weekday
//! and are clipped to their month, so the first and last week of a month
//! can be shorter than seven days.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use spendmap_config::WeekStart;
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;
use crate::types::Granularity;

/// A contiguous date span at one granularity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarNode {
    granularity: Granularity,
    span_start: NaiveDate,
    /// Inclusive
    span_end: NaiveDate,
    transactions: Vec<Transaction>,
    children: Vec<CalendarNode>,
}

/// Build the tree for `year` with weeks starting on Monday
pub fn build_year(year: i32, transactions: &[Transaction]) -> CoreResult<CalendarNode> {
    build_year_with(year, transactions, Weekday::Mon)
}

/// Build the tree for `year`, starting weeks on `week_start`
///
/// Transactions dated outside `year` are ignored.
pub fn build_year_with(
    year: i32,
    transactions: &[Transaction],
    week_start: Weekday,
) -> CoreResult<CalendarNode> {
    let invalid = || CoreError::InvalidInput {
        message: format!("Year {} is outside the supported calendar", year),
    };
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;

    let in_year: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.date.year() == year)
        .cloned()
        .collect();

    let mut months = Vec::with_capacity(12);
    for month in 1..=12 {
        let (month_start, month_end) = month_span(year, month).ok_or_else(invalid)?;
        let month_transactions = within(&in_year, month_start, month_end);
        months.push(build_month(month_start, month_end, month_transactions, week_start));
    }

    log::debug!(
        "Built calendar for {} with {} of {} transactions",
        year,
        in_year.len(),
        transactions.len()
    );

    Ok(CalendarNode {
        granularity: Granularity::Year,
        span_start: start,
        span_end: end,
        transactions: in_year,
        children: months,
    })
}

/// Chrono weekday for a configured week start
pub fn weekday_of(week_start: WeekStart) -> Weekday {
    (0..week_start.days_from_monday()).fold(Weekday::Mon, |day, _| day.succ())
}

/// First and last day of a month
pub fn month_span(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()?
    };
    Some((start, end))
}

/// Last day of the week beginning at `date`, clipped to `limit`
fn week_end(date: NaiveDate, week_start: Weekday, limit: NaiveDate) -> NaiveDate {
    let last = week_start.pred().num_days_from_monday();
    let current = date.weekday().num_days_from_monday();
    let remaining = (7 + last - current) % 7;
    date.checked_add_days(Days::new(remaining as u64))
        .map_or(limit, |end| end.min(limit))
}

fn within(transactions: &[Transaction], start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.date >= start && t.date <= end)
        .cloned()
        .collect()
}

fn build_month(
    start: NaiveDate,
    end: NaiveDate,
    transactions: Vec<Transaction>,
    week_start: Weekday,
) -> CalendarNode {
    let mut weeks = Vec::new();
    let mut cursor = Some(start);
    while let Some(week_first) = cursor.filter(|d| *d <= end) {
        let week_last = week_end(week_first, week_start, end);
        let week_transactions = within(&transactions, week_first, week_last);
        weeks.push(build_week(week_first, week_last, week_transactions));
        cursor = week_last.succ_opt();
    }

    CalendarNode {
        granularity: Granularity::Month,
        span_start: start,
        span_end: end,
        transactions,
        children: weeks,
    }
}

fn build_week(start: NaiveDate, end: NaiveDate, transactions: Vec<Transaction>) -> CalendarNode {
    let days = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| CalendarNode {
            granularity: Granularity::Day,
            span_start: date,
            span_end: date,
            transactions: within(&transactions, date, date),
            children: Vec::new(),
        })
        .collect();

    CalendarNode {
        granularity: Granularity::Week,
        span_start: start,
        span_end: end,
        transactions,
        children: days,
    }
}

impl CalendarNode {
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn span_start(&self) -> NaiveDate {
        self.span_start
    }

    /// Last day of the span, inclusive
    pub fn span_end(&self) -> NaiveDate {
        self.span_end
    }

    /// Transactions dated inside the span
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Nodes at the next finer granularity, in date order
    pub fn children(&self) -> &[CalendarNode] {
        &self.children
    }

    /// Number of days in the span
    pub fn len_days(&self) -> u32 {
        (self.span_end - self.span_start).num_days() as u32 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.span_start && date <= self.span_end
    }

    /// The node at `granularity` whose span holds `date`
    pub fn find(&self, granularity: Granularity, date: NaiveDate) -> Option<&CalendarNode> {
        if !self.contains(date) {
            return None;
        }
        if self.granularity == granularity {
            return Some(self);
        }
        self.children
            .iter()
            .find(|child| child.contains(date))
            .and_then(|child| child.find(granularity, date))
    }

    /// Month `month` (1-12) of a year node
    pub fn month(&self, month: u32) -> Option<&CalendarNode> {
        let date = NaiveDate::from_ymd_opt(self.span_start.year(), month, 1)?;
        self.find(Granularity::Month, date)
    }

    pub fn week_containing(&self, date: NaiveDate) -> Option<&CalendarNode> {
        self.find(Granularity::Week, date)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarNode> {
        self.find(Granularity::Day, date)
    }

    /// All day nodes below this one, in date order
    pub fn days(&self) -> DayIter<'_> {
        DayIter { stack: vec![self] }
    }

    /// Compact period label, e.g. `2024`, `2024-Feb`, `2024-Feb-5..11`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CalendarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.span_start;
        match self.granularity {
            Granularity::Year => write!(f, "{}", start.year()),
            Granularity::Month => write!(f, "{}", start.format("%Y-%b")),
            Granularity::Week if self.span_start == self.span_end => {
                write!(f, "{}-{}", start.format("%Y-%b"), start.day())
            }
            Granularity::Week => write!(
                f,
                "{}-{}..{}",
                start.format("%Y-%b"),
                start.day(),
                self.span_end.day()
            ),
            Granularity::Day => write!(f, "{}-{}", start.format("%Y-%b"), start.day()),
        }
    }
}

/// Depth-first iterator over day nodes
pub struct DayIter<'a> {
    stack: Vec<&'a CalendarNode>,
}

impl<'a> Iterator for DayIter<'a> {
    type Item = &'a CalendarNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.granularity == Granularity::Day {
                return Some(node);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}
