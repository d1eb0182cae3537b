//! Configuration management for spendmap
//!
//! This module handles loading, validation, and management of
//! spendmap configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory scanned for bank statement CSVs by `learn --assets`
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Persisted category mapping file
    #[serde(default = "default_mappings_file")]
    pub mappings_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            mappings_file: default_mappings_file(),
        }
    }
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("./assets")
}

fn default_mappings_file() -> PathBuf {
    PathBuf::from("./assets/category_mappings.yaml")
}

/// Aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Category totals below this absolute value are dropped as noise
    #[serde(default = "default_noise_threshold")]
    pub noise_threshold: f64,
    /// First day of every week in the calendar partition
    #[serde(default)]
    pub week_start: WeekStart,
    /// Keep the "Income" category in reports unless --costs-only is given
    #[serde(default = "default_true")]
    pub include_income: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            noise_threshold: default_noise_threshold(),
            week_start: WeekStart::default(),
            include_income: true,
        }
    }
}

fn default_noise_threshold() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Day a calendar week starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Default for WeekStart {
    fn default() -> Self {
        WeekStart::Monday
    }
}

impl WeekStart {
    /// Days since Monday, Monday being 0
    pub fn days_from_monday(&self) -> u32 {
        match self {
            WeekStart::Monday => 0,
            WeekStart::Tuesday => 1,
            WeekStart::Wednesday => 2,
            WeekStart::Thursday => 3,
            WeekStart::Friday => 4,
            WeekStart::Saturday => 5,
            WeekStart::Sunday => 6,
        }
    }
}

impl std::str::FromStr for WeekStart {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "tuesday" | "tue" => Ok(WeekStart::Tuesday),
            "wednesday" | "wed" => Ok(WeekStart::Wednesday),
            "thursday" | "thu" => Ok(WeekStart::Thursday),
            "friday" | "fri" => Ok(WeekStart::Friday),
            "saturday" | "sat" => Ok(WeekStart::Saturday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            _ => Err(format!("Invalid week start: {}", s)),
        }
    }
}

impl std::fmt::Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekStart::Monday => write!(f, "monday"),
            WeekStart::Tuesday => write!(f, "tuesday"),
            WeekStart::Wednesday => write!(f, "wednesday"),
            WeekStart::Thursday => write!(f, "thursday"),
            WeekStart::Friday => write!(f, "friday"),
            WeekStart::Saturday => write!(f, "saturday"),
            WeekStart::Sunday => write!(f, "sunday"),
        }
    }
}

/// Input CSV settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// chrono format strings tried in order on every `Date` cell
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
        }
    }
}

/// Date layouts commonly found in bank exports
pub fn default_date_formats() -> Vec<String> {
    [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%m/%d/%y",
        "%Y/%m/%d",
        "%b %d, %Y",
        "%B %d, %Y",
        "%d %b %Y",
        "%d %B %Y",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Chart and visualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Default SVG output path
    #[serde(default = "default_chart_output")]
    pub output: PathBuf,
    /// Width and height of the pie chart in pixels
    #[serde(default = "default_chart_size")]
    pub size: u32,
    /// Show chart legends
    #[serde(default = "default_true")]
    pub show_legend: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output: default_chart_output(),
            size: default_chart_size(),
            show_legend: true,
        }
    }
}

fn default_chart_output() -> PathBuf {
    PathBuf::from("spending.svg")
}

fn default_chart_size() -> u32 {
    600
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data file locations
    #[serde(default)]
    pub data: DataConfig,
    /// Aggregation settings
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Input CSV settings
    #[serde(default)]
    pub csv: CsvConfig,
    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound { path: display.clone() }
            } else {
                ConfigError::IoError { path: display.clone(), source: e }
            }
        })?;

        let config = Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::InvalidYaml { message, .. } => ConfigError::InvalidYaml {
                path: display.clone(),
                message,
            },
            other => other,
        })?;

        log::debug!("Loaded configuration from {}", display);
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound { path }) => {
                log::info!("No config file at {}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document is a valid, all-default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
                path: String::new(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.analysis.noise_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.noise_threshold".to_string(),
                reason: "Noise threshold must be a finite, non-negative number".to_string(),
            });
        }

        if self.csv.date_formats.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "csv.date_formats".to_string(),
                reason: "At least one date format is required".to_string(),
            });
        }

        if self.charts.size < 100 {
            return Err(ConfigError::InvalidValue {
                field: "charts.size".to_string(),
                reason: "Chart size must be at least 100 pixels".to_string(),
            });
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" | "off" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    reason: format!("Unknown log level '{}'", other),
                })
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.analysis.noise_threshold, 1.0);
        assert_eq!(config.analysis.week_start, WeekStart::Monday);
        assert!(config.analysis.include_income);
        assert_eq!(config.csv.date_formats[0], "%Y-%m-%d");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "analysis:\n  noise_threshold: 0.5\n  week_start: sunday\n",
        )
        .unwrap();
        assert_eq!(config.analysis.noise_threshold, 0.5);
        assert_eq!(config.analysis.week_start, WeekStart::Sunday);
        assert_eq!(
            config.data.mappings_file,
            PathBuf::from("./assets/category_mappings.yaml")
        );
        assert_eq!(config.charts.size, 600);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("  \n").unwrap();
        assert_eq!(config.charts.output, PathBuf::from("spending.svg"));
    }

    #[test]
    fn test_generated_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.analysis.noise_threshold, 1.0);
        assert_eq!(config.csv.date_formats, default_date_formats());
    }

    #[test]
    fn test_invalid_threshold() {
        let err = Config::from_yaml("analysis:\n  noise_threshold: -2.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "analysis.noise_threshold"));
    }

    #[test]
    fn test_invalid_log_level() {
        let err = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("analysis: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::FileNotFound { .. })
        ));
        assert!(Config::load_or_default(&path).is_ok());
    }

    #[test]
    fn test_load_reports_path_on_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spendmap.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "charts: {{size: [1, 2]}}").unwrap();

        match Config::load(&path) {
            Err(ConfigError::InvalidYaml { path: reported, .. }) => {
                assert!(reported.ends_with("spendmap.yaml"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_week_start_from_str() {
        assert_eq!("Sun".parse::<WeekStart>().unwrap(), WeekStart::Sunday);
        assert_eq!("monday".parse::<WeekStart>().unwrap(), WeekStart::Monday);
        assert!("someday".parse::<WeekStart>().is_err());
        assert_eq!(WeekStart::Wednesday.days_from_monday(), 2);
        assert_eq!(WeekStart::Friday.to_string(), "friday");
    }
}
