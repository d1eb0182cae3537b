//! Basic types for the calendar partition

use serde::{Deserialize, Serialize};

/// Width of a calendar node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    Week,
    Day,
}

impl std::str::FromStr for Granularity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" | "yearly" => Ok(Granularity::Year),
            "month" | "monthly" => Ok(Granularity::Month),
            "week" | "weekly" => Ok(Granularity::Week),
            "day" | "daily" => Ok(Granularity::Day),
            _ => Err(format!("Invalid granularity: {}", s)),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Year => write!(f, "year"),
            Granularity::Month => write!(f, "month"),
            Granularity::Week => write!(f, "week"),
            Granularity::Day => write!(f, "day"),
        }
    }
}
