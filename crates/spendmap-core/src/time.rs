//! Selecting the calendar node a report covers

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarNode;
use crate::error::{CoreError, CoreResult};
use crate::types::Granularity;

/// Which part of a year to report on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "range", content = "at", rename_all = "lowercase")]
pub enum TimeSelection {
    /// The whole year
    Year,
    /// Month number, 1-12
    Month(u32),
    /// The week containing a date
    Week(NaiveDate),
    Day(NaiveDate),
}

impl Default for TimeSelection {
    fn default() -> Self {
        TimeSelection::Year
    }
}

impl TimeSelection {
    /// Build a selection from optional command line values
    ///
    /// At most one of `month`, `week` and `day` may be set.
    pub fn from_parts(
        month: Option<u32>,
        week: Option<NaiveDate>,
        day: Option<NaiveDate>,
    ) -> CoreResult<Self> {
        match (month, week, day) {
            (None, None, None) => Ok(TimeSelection::Year),
            (Some(m), None, None) => Ok(TimeSelection::Month(m)),
            (None, Some(w), None) => Ok(TimeSelection::Week(w)),
            (None, None, Some(d)) => Ok(TimeSelection::Day(d)),
            _ => Err(CoreError::InvalidInput {
                message: "Choose only one of month, week or day".to_string(),
            }),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            TimeSelection::Year => Granularity::Year,
            TimeSelection::Month(_) => Granularity::Month,
            TimeSelection::Week(_) => Granularity::Week,
            TimeSelection::Day(_) => Granularity::Day,
        }
    }

    /// Find the selected node below a year node
    pub fn resolve<'a>(&self, year: &'a CalendarNode) -> CoreResult<&'a CalendarNode> {
        let found = match *self {
            TimeSelection::Year => Some(year),
            TimeSelection::Month(month) => year.month(month),
            TimeSelection::Week(date) => year.week_containing(date),
            TimeSelection::Day(date) => year.day(date),
        };
        found.ok_or_else(|| CoreError::InvalidInput {
            message: format!(
                "{} is not part of {}",
                self.description(),
                year.span_start().year()
            ),
        })
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match self {
            TimeSelection::Year => "Whole year".to_string(),
            TimeSelection::Month(month) => format!("Month {}", month),
            TimeSelection::Week(date) => format!("Week of {}", date),
            TimeSelection::Day(date) => format!("Day {}", date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::build_year;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(TimeSelection::from_parts(None, None, None).unwrap(), TimeSelection::Year);
        assert_eq!(
            TimeSelection::from_parts(Some(3), None, None).unwrap(),
            TimeSelection::Month(3)
        );
        assert!(TimeSelection::from_parts(Some(3), None, Some(date(2024, 3, 1))).is_err());
    }

    #[test]
    fn test_resolve() {
        let year = build_year(2024, &[]).unwrap();

        let month = TimeSelection::Month(2).resolve(&year).unwrap();
        assert_eq!(month.granularity(), Granularity::Month);
        assert_eq!(month.label(), "2024-Feb");

        let week = TimeSelection::Week(date(2024, 2, 7)).resolve(&year).unwrap();
        assert_eq!(week.span_start(), date(2024, 2, 5));

        let day = TimeSelection::Day(date(2024, 12, 31)).resolve(&year).unwrap();
        assert_eq!(day.len_days(), 1);

        assert_eq!(TimeSelection::Year.resolve(&year).unwrap().label(), "2024");
    }

    #[test]
    fn test_resolve_outside_year() {
        let year = build_year(2024, &[]).unwrap();
        let error = TimeSelection::Month(13).resolve(&year).unwrap_err();
        assert!(matches!(error, CoreError::InvalidInput { .. }));
        assert!(TimeSelection::Day(date(2023, 5, 1)).resolve(&year).is_err());
    }

    #[test]
    fn test_description() {
        assert_eq!(TimeSelection::Year.description(), "Whole year");
        assert_eq!(
            TimeSelection::Week(date(2024, 2, 7)).description(),
            "Week of 2024-02-07"
        );
    }
}
