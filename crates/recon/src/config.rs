use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::calendar::{BusinessCalendar, FixedHolidays, BUILTIN_HOLIDAY_YEAR};
use crate::columns::ColumnOverrides;
use crate::error::ReconError;
use crate::grid::DEFAULT_SCAN_ROWS;
use crate::model::Source;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Synthesize supplementary work-order rows under each edit.
    #[serde(default = "default_prefill")]
    pub prefill: bool,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub allow_list: Option<AllowListConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "leave reconciliation".to_string()
}

fn default_prefill() -> bool {
    true
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            prefill: default_prefill(),
            calendar: CalendarConfig::default(),
            extraction: ExtractionConfig::default(),
            columns: ColumnsConfig::default(),
            allow_list: None,
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Working-day calendar used by multi-day expansion.
///
/// Without `holidays` the built-in table is used, which only exists for
/// `BUILTIN_HOLIDAY_YEAR`. An explicit list replaces the table entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default)]
    pub holidays: Option<Vec<NaiveDate>>,
}

fn default_year() -> i32 {
    BUILTIN_HOLIDAY_YEAR
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            holidays: None,
        }
    }
}

impl CalendarConfig {
    pub fn build(&self) -> BusinessCalendar {
        match &self.holidays {
            Some(days) => BusinessCalendar::new(FixedHolidays::from_dates(days.iter().copied())),
            None => BusinessCalendar::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Leading rows searched for the header row.
    #[serde(default = "default_scan_rows")]
    pub scan_rows: usize,
    /// Cap per day when spreading a multi-day Oracle entry.
    #[serde(default = "default_max_daily_hours")]
    pub max_daily_hours: f64,
    /// Oracle codes (bridged form) that never take part.
    #[serde(default = "default_excluded_oracle_codes")]
    pub excluded_oracle_codes: Vec<String>,
    /// DRMIS codes starting with this prefix are dropped.
    #[serde(default = "default_excluded_drmis_prefix")]
    pub excluded_drmis_prefix: String,
}

fn default_scan_rows() -> usize {
    DEFAULT_SCAN_ROWS
}

fn default_max_daily_hours() -> f64 {
    8.0
}

fn default_excluded_oracle_codes() -> Vec<String> {
    ["1200", "1260", "1261", "1660"].iter().map(|s| s.to_string()).collect()
}

fn default_excluded_drmis_prefix() -> String {
    "30".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            scan_rows: default_scan_rows(),
            max_daily_hours: default_max_daily_hours(),
            excluded_oracle_codes: default_excluded_oracle_codes(),
            excluded_drmis_prefix: default_excluded_drmis_prefix(),
        }
    }
}

impl ExtractionConfig {
    pub fn is_excluded_oracle(&self, code: &str) -> bool {
        self.excluded_oracle_codes.iter().any(|c| c == code)
    }

    pub fn is_excluded_drmis(&self, code: &str) -> bool {
        !self.excluded_drmis_prefix.is_empty() && code.starts_with(&self.excluded_drmis_prefix)
    }
}

// ---------------------------------------------------------------------------
// Columns + Allow-list + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default)]
    pub drmis: ColumnOverrides,
    #[serde(default)]
    pub oracle: ColumnOverrides,
}

impl ColumnsConfig {
    pub fn for_source(&self, source: Source) -> &ColumnOverrides {
        match source {
            Source::Drmis => &self.drmis,
            Source::Oracle => &self.oracle,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllowListConfig {
    /// Spreadsheet path, relative to the config file.
    pub file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub xlsx: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.calendar.holidays.is_none() && self.calendar.year != BUILTIN_HOLIDAY_YEAR {
            return Err(ReconError::ConfigValidation(format!(
                "no built-in holiday table for {}; list [calendar] holidays explicitly",
                self.calendar.year
            )));
        }

        if let Some(days) = &self.calendar.holidays {
            if let Some(day) = days.iter().find(|d| d.year() != self.calendar.year) {
                log::warn!("holiday {day} is outside calendar year {}", self.calendar.year);
            }
        }

        let ex = &self.extraction;
        if ex.scan_rows == 0 {
            return Err(ReconError::ConfigValidation(
                "extraction.scan_rows must be at least 1".into(),
            ));
        }
        if !ex.max_daily_hours.is_finite() || ex.max_daily_hours <= 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "extraction.max_daily_hours must be positive, got {}",
                ex.max_daily_hours
            )));
        }
        if let Some(code) = ex
            .excluded_oracle_codes
            .iter()
            .find(|c| c.is_empty() || !c.chars().all(|ch| ch.is_ascii_digit()))
        {
            return Err(ReconError::ConfigValidation(format!(
                "extraction.excluded_oracle_codes: '{code}' is not a digit code"
            )));
        }

        if let Some(allow) = &self.allow_list {
            if allow.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "allow_list.file must not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Field;

    const FULL: &str = r#"
name = "April review"
prefill = false

[calendar]
year = 2026
holidays = ["2026-01-01", "2026-04-03"]

[extraction]
scan_rows = 10
max_daily_hours = 7.5
excluded_oracle_codes = ["1200"]

[columns.drmis]
employee_id = "Employee"
leave_type = "Absence"

[columns.oracle]
from_date = "Start"

[allow_list]
file = "codes.xlsx"

[output]
json = "out/report.json"
xlsx = "out/edits.xlsx"
"#;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert!(config.prefill);
        assert_eq!(config.calendar.year, 2025);
        assert_eq!(config.extraction.scan_rows, 30);
        assert_eq!(config.extraction.max_daily_hours, 8.0);
        assert_eq!(config.extraction.excluded_oracle_codes.len(), 4);
        assert_eq!(config.extraction.excluded_drmis_prefix, "30");
        assert!(config.columns.drmis.is_empty());
        assert!(config.allow_list.is_none());
    }

    #[test]
    fn parse_full() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name, "April review");
        assert!(!config.prefill);
        assert_eq!(config.calendar.holidays.as_ref().map(Vec::len), Some(2));
        assert_eq!(config.extraction.max_daily_hours, 7.5);
        assert!(config.extraction.is_excluded_oracle("1200"));
        assert!(!config.extraction.is_excluded_oracle("1260"));

        let drmis: Vec<_> = config.columns.for_source(Source::Drmis).iter().collect();
        assert_eq!(drmis.len(), 2);
        assert_eq!(drmis[0], (&Field::EmployeeId, &"Employee".to_string()));
        assert_eq!(config.allow_list.unwrap().file, "codes.xlsx");
        assert_eq!(config.output.xlsx.as_deref(), Some("out/edits.xlsx"));
    }

    #[test]
    fn explicit_holidays_build_calendar() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        let cal = config.calendar.build();
        let good_friday = NaiveDate::from_ymd_opt(2026, 4, 3).unwrap();
        assert!(!cal.is_business_day(good_friday));
    }

    #[test]
    fn other_year_without_holidays_is_rejected() {
        let err = ReconConfig::from_toml("[calendar]\nyear = 2027\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn bad_holiday_date_fails_parse() {
        let err = ReconConfig::from_toml("[calendar]\nholidays = [\"2025-02-30\"]\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn unknown_column_field_fails_parse() {
        let err = ReconConfig::from_toml("[columns.drmis]\ncolour = \"Red\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn non_positive_cap_is_rejected() {
        let err = ReconConfig::from_toml("[extraction]\nmax_daily_hours = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("max_daily_hours"));
    }

    #[test]
    fn non_digit_excluded_code_is_rejected() {
        let err =
            ReconConfig::from_toml("[extraction]\nexcluded_oracle_codes = [\"12a\"]\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn drmis_prefix_exclusion() {
        let ex = ExtractionConfig::default();
        assert!(ex.is_excluded_drmis("3010"));
        assert!(!ex.is_excluded_drmis("1300"));
        let none = ExtractionConfig {
            excluded_drmis_prefix: String::new(),
            ..Default::default()
        };
        assert!(!none.is_excluded_drmis("3010"));
    }
}
