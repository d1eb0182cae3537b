//! Box-drawing table of a category report

use spendmap_core::CategoryReport;
use spendmap_utils::{format_amount, format_number};
use std::fmt;

/// Displays a [`CategoryReport`] as a terminal table
pub struct Table<'d> {
    report: &'d CategoryReport,
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    right: bool,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

struct GridFmt {
    columns: Vec<ColFmt>,
    footer: Vec<BoxFmt>,
}

impl<'d> Table<'d> {
    pub fn from(report: &'d CategoryReport) -> Self {
        Self { report }
    }

    fn to_formatter(&self) -> GridFmt {
        let mut grid = GridFmt::with_columns(vec![
            ColFmt::with_label("Category", false),
            ColFmt::with_label("Amount", true),
            ColFmt::with_label("Share", true),
            ColFmt::with_label("Count", true),
        ]);
        for entry in &self.report.entries {
            grid.push_line(vec![
                BoxFmt::from(entry.category.clone()),
                BoxFmt::from(format_amount(entry.amount)),
                BoxFmt::from(format!("{:.1}%", entry.percentage)),
                BoxFmt::from(format_number(entry.count)),
            ]);
        }
        let share = if self.report.is_empty() { "" } else { "100.0%" };
        grid.set_footer(vec![
            BoxFmt::from("Total".to_string()),
            BoxFmt::from(format_amount(self.report.total)),
            BoxFmt::from(share.to_string()),
            BoxFmt::from(String::new()),
        ]);
        grid
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} ({})", self.report.title, self.report.period)?;
        write!(f, "{}", self.to_formatter())?;
        if self.report.unresolved > 0 {
            writeln!(
                f,
                "{} transactions without a category were left out",
                self.report.unresolved
            )?;
        }
        Ok(())
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let pad = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", pad, self.text)
        } else {
            write!(f, " {}{} ", self.text, pad)
        }
    }
}

impl ColFmt {
    fn with_label(label: &str, right: bool) -> Self {
        let label = BoxFmt::from(label.to_string());
        Self {
            width: label.width,
            right,
            label,
            boxes: Vec::new(),
        }
    }

    fn fit(&mut self, b: &BoxFmt) {
        self.width = self.width.max(b.width);
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

impl GridFmt {
    fn with_columns(columns: Vec<ColFmt>) -> Self {
        Self {
            columns,
            footer: Vec::new(),
        }
    }

    fn push_line(&mut self, boxes: Vec<BoxFmt>) {
        for (column, b) in self.columns.iter_mut().zip(boxes) {
            column.fit(&b);
            column.boxes.push(b);
        }
    }

    fn set_footer(&mut self, boxes: Vec<BoxFmt>) {
        for (column, b) in self.columns.iter_mut().zip(&boxes) {
            column.fit(b);
        }
        self.footer = boxes;
    }

    fn rule(&self, f: &mut fmt::Formatter, left: &str, join: &str, right: &str) -> fmt::Result {
        write!(f, "{}", left)?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", join)?;
            }
            c.hline(f)?;
        }
        writeln!(f, "{}", right)
    }

    fn row<'a>(
        &self,
        f: &mut fmt::Formatter,
        cells: impl Iterator<Item = &'a BoxFmt>,
    ) -> fmt::Result {
        for (c, b) in self.columns.iter().zip(cells) {
            write!(f, "{}", VLINE)?;
            b.write(f, c.width, c.right)?;
        }
        writeln!(f, "{}", VLINE)
    }

    fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.boxes.len())
    }
}

impl fmt::Display for GridFmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.rule(f, ULCORNER, LOJOIN, URCORNER)?;
        self.row(f, self.columns.iter().map(|c| &c.label))?;
        self.rule(f, RTJOIN, CROSS, LTJOIN)?;
        for idx in 0..self.len() {
            self.row(f, self.columns.iter().map(|c| &c.boxes[idx]))?;
        }
        if !self.footer.is_empty() {
            self.rule(f, RTJOIN, CROSS, LTJOIN)?;
            self.row(f, self.footer.iter())?;
        }
        self.rule(f, DLCORNER, HIJOIN, DRCORNER)
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use spendmap_core::Aggregate;

    fn report() -> CategoryReport {
        let totals: Aggregate = [
            ("Groceries".to_string(), Decimal::new(123456, 2)),
            ("Gas".to_string(), Decimal::new(4530, 2)),
        ]
        .into_iter()
        .collect();
        CategoryReport::from_aggregate(&totals, "Spending", "2022-May")
    }

    #[test]
    fn test_table_layout() {
        let text = Table::from(&report()).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Spending (2022-May)");
        assert!(lines[1].starts_with('┌') && lines[1].ends_with('┐'));
        assert!(lines[2].contains("Category") && lines[2].contains("Amount"));
        assert!(lines[4].contains("Groceries") && lines[4].contains("1,234.56"));
        assert!(lines[5].contains("Gas") && lines[5].contains("45.30"));
        assert!(lines[7].contains("Total") && lines[7].contains("1,279.86"));
        assert!(lines[8].starts_with('└'));

        let widths: Vec<usize> = lines[1..].iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_empty_table_and_unresolved_note() {
        let mut report = CategoryReport::from_aggregate(&Aggregate::new(), "Spending", "2022");
        report.unresolved = 3;
        let text = Table::from(&report).to_string();

        assert!(text.contains("Total"));
        assert!(!text.contains("100.0%"));
        assert!(text.ends_with("3 transactions without a category were left out\n"));
    }
}
