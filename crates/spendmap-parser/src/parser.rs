//! Bank statement CSV parser

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ParseError;
use crate::types::{
    Record, Statement, AMOUNT_COLUMN, CATEGORY_COLUMN, DATE_COLUMN, DESCRIPTION_COLUMN,
};

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, source: &str) -> Result<Self, ParseError> {
        let find = |name: &str| headers.iter().position(|h| h.trim_start_matches('\u{feff}') == name);

        let date = find(DATE_COLUMN);
        let description = find(DESCRIPTION_COLUMN);
        let amount = find(AMOUNT_COLUMN);

        match (date, description, amount) {
            (Some(date), Some(description), Some(amount)) => Ok(Columns {
                date,
                description,
                amount,
                category: find(CATEGORY_COLUMN),
            }),
            _ => {
                let columns = [
                    (DATE_COLUMN, date),
                    (DESCRIPTION_COLUMN, description),
                    (AMOUNT_COLUMN, amount),
                ]
                .iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
                Err(ParseError::MissingColumns {
                    source_name: source.to_string(),
                    columns,
                })
            }
        }
    }
}

/// CSV parser turning bank exports into [`Statement`]s
#[derive(Debug, Clone)]
pub struct StatementParser {
    date_formats: Vec<String>,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%m/%d/%Y".to_string(),
                "%m/%d/%y".to_string(),
                "%Y/%m/%d".to_string(),
            ],
        }
    }
}

impl StatementParser {
    /// Create a parser trying `date_formats` in order on each `Date` cell
    pub fn new(date_formats: Vec<String>) -> Self {
        Self { date_formats }
    }

    /// Parse a CSV file on disk
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Statement, ParseError> {
        let path = path.as_ref();
        let source = path.to_string_lossy().to_string();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ParseError::FileNotFound { path: source.clone() }
            } else {
                ParseError::IoError(e)
            }
        })?;
        let statement = self.parse_with_source(file, &source)?;
        log::info!("Read {} rows from {}", statement.len(), source);
        Ok(statement)
    }

    /// Parse CSV content from any reader, naming it `source` in errors
    ///
    /// A single bad row fails the whole statement so no transaction is
    /// silently dropped.
    pub fn parse_with_source<R: Read>(&self, reader: R, source: &str) -> Result<Statement, ParseError> {
        let csv_error = |e: csv::Error| ParseError::Csv {
            source_name: source.to_string(),
            source: e,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().map_err(csv_error)?.clone();
        let columns = Columns::resolve(&headers, source)?;

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row.map_err(csv_error)?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let cell = |idx: usize| row.get(idx).unwrap_or("");

            // Trailing blank lines in bank exports
            if row.iter().all(|c| c.is_empty()) {
                continue;
            }

            let raw_date = cell(columns.date);
            let date = parse_date(raw_date, &self.date_formats).ok_or_else(|| ParseError::InvalidDate {
                source_name: source.to_string(),
                line,
                value: raw_date.to_string(),
            })?;

            let raw_amount = cell(columns.amount);
            let amount = parse_amount(raw_amount).ok_or_else(|| ParseError::InvalidAmount {
                source_name: source.to_string(),
                line,
                value: raw_amount.to_string(),
            })?;

            let category = columns
                .category
                .map(cell)
                .filter(|c| !c.is_empty())
                .map(str::to_string);

            records.push(Record {
                line,
                date,
                description: cell(columns.description).to_string(),
                amount,
                category,
            });
        }

        Ok(Statement {
            source: source.to_string(),
            records,
        })
    }
}

/// Parse a date cell, trying an ISO timestamp first and then each format
///
/// Results outside years 1000-9999 are rejected so that `05/02/22` does not
/// match `%m/%d/%Y` as the year 22.
pub fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    static ISO_TIMESTAMP: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let iso = ISO_TIMESTAMP
        .get_or_init(|| regex::Regex::new(r"^(\d{4}-\d{2}-\d{2})[T ]\d{1,2}:\d{2}").unwrap());

    let raw = raw.trim();
    if let Some(caps) = iso.captures(raw) {
        return NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok();
    }

    formats
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .find(|d| (1000..=9999).contains(&d.year()))
}

/// Parse an amount cell such as `-45.30`, `$1,234.56` or `(12.00)`
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let (negative, body) = match raw.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, raw),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '$' | '€' | '£' | '¥'))
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return None;
    }

    let value: Decimal = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_simple_statement() {
        let input = "Date,Description,Amount\n2022-05-02,WHOLE FOODS,-45.30\n2022-05-02,PAYROLL,2000.00\n";
        let statement = StatementParser::default()
            .parse_with_source(input.as_bytes(), "test.csv")
            .unwrap();

        assert_eq!(statement.len(), 2);
        assert_eq!(statement.records[0].date, ymd(2022, 5, 2));
        assert_eq!(statement.records[0].description, "WHOLE FOODS");
        assert_eq!(statement.records[0].amount, dec("-45.30"));
        assert_eq!(statement.records[0].category, None);
        assert_eq!(statement.records[1].line, 3);
    }

    #[test]
    fn test_parse_category_column_and_column_order() {
        let input = "Amount,Category,Description,Date\n-3.50,Coffee,STARBUCKS,05/03/2022\n-10,,SHELL,05/04/2022\n";
        let statement = StatementParser::default()
            .parse_with_source(input.as_bytes(), "bank.csv")
            .unwrap();

        assert_eq!(statement.records[0].category.as_deref(), Some("Coffee"));
        assert_eq!(statement.records[1].category, None);
        assert_eq!(statement.records[1].date, ymd(2022, 5, 4));
        assert_eq!(statement.category_hints(), vec!["Coffee".to_string()]);
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let input = "Date,Memo,Value\n2022-05-02,X,1\n";
        let err = StatementParser::default()
            .parse_with_source(input.as_bytes(), "bad.csv")
            .unwrap_err();

        assert!(err.is_schema_error());
        match err {
            ParseError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["Description".to_string(), "Amount".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let input = "date,description,amount\n2022-05-02,X,1\n";
        let err = StatementParser::default()
            .parse_with_source(input.as_bytes(), "lower.csv")
            .unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_bad_date_fails_whole_statement() {
        let input = "Date,Description,Amount\n2022-05-02,A,1\nnot a date,B,2\n";
        let err = StatementParser::default()
            .parse_with_source(input.as_bytes(), "dates.csv")
            .unwrap_err();

        assert!(err.is_date_error());
        assert!(err.to_string().contains("dates.csv:3"));
        assert!(err.to_string().contains("not a date"));
    }

    #[test]
    fn test_bad_amount() {
        let input = "Date,Description,Amount\n2022-05-02,A,twelve\n";
        let err = StatementParser::default()
            .parse_with_source(input.as_bytes(), "amounts.csv")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidAmount { line: 2, .. }));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let input = "Date,Description,Amount\n2022-05-02,A,1\n,,\n";
        let statement = StatementParser::default()
            .parse_with_source(input.as_bytes(), "blank.csv")
            .unwrap();
        assert_eq!(statement.len(), 1);
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = StatementParser::default().date_formats;
        assert_eq!(parse_date("2024-02-29", &formats), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("2024-02-29T13:45:00", &formats), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("2024-02-29 08:00", &formats), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("02/29/2024", &formats), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("5/2/22", &formats), Some(ymd(2022, 5, 2)));
        assert_eq!(parse_date("2022/05/02", &formats), Some(ymd(2022, 5, 2)));
        assert_eq!(parse_date("2023-02-29", &formats), None);
        assert_eq!(parse_date("", &formats), None);

        let named = vec!["%b %d, %Y".to_string()];
        assert_eq!(parse_date("May 2, 2022", &named), Some(ymd(2022, 5, 2)));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-45.30"), Some(dec("-45.30")));
        assert_eq!(parse_amount("2,000.00"), Some(dec("2000")));
        assert_eq!(parse_amount("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("-$12.00"), Some(dec("-12")));
        assert_eq!(parse_amount("(12.00)"), Some(dec("-12")));
        assert_eq!(parse_amount("+7"), Some(dec("7")));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = StatementParser::default()
            .parse_file(dir.path().join("missing.csv"))
            .unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.csv");
        std::fs::write(&path, "Date,Description,Amount\n2022-01-01,RENT,-900\n").unwrap();

        let statement = StatementParser::default().parse_file(&path).unwrap();
        assert_eq!(statement.len(), 1);
        assert!(statement.source.ends_with("statement.csv"));
    }

    #[test]
    fn test_descriptions_are_unique_in_order() {
        let input = "Date,Description,Amount\n2022-01-01,B,1\n2022-01-02,A,1\n2022-01-03,B,1\n";
        let statement = StatementParser::default()
            .parse_with_source(input.as_bytes(), "dups.csv")
            .unwrap();
        assert_eq!(statement.descriptions(), vec!["B".to_string(), "A".to_string()]);
    }
}
