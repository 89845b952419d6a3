//! Record extraction: detected tables to canonical DRMIS and Oracle records.

use serde::Serialize;

use crate::allow_list::AllowList;
use crate::calendar::BusinessCalendar;
use crate::codes::{is_blank_code, normalize_drmis_code, normalize_oracle_code, parse_hours};
use crate::columns::{resolve_columns, ColumnMap, Field, DRMIS_FIELDS, ORACLE_FIELDS};
use crate::config::ExtractionConfig;
use crate::dates::normalize_date;
use crate::error::ReconError;
use crate::expand::expand_all;
use crate::grid::{cell, DetectedTable, Record};
use crate::model::{DrmisRecord, OracleRecord, Source};

/// Per-source row accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractStats {
    pub rows_read: usize,
    pub bad_dates: usize,
    pub excluded: usize,
    pub not_allowed: usize,
    pub malformed_hours: usize,
    /// Negative hours, clamped to zero.
    pub negative_hours: usize,
    /// Records kept after filtering, before expansion.
    pub kept: usize,
    /// Records after multi-day expansion (Oracle only; equals `kept` for DRMIS).
    pub emitted: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub records: Vec<T>,
    pub stats: ExtractStats,
}

fn header(map: &ColumnMap, field: Field) -> &str {
    // Required fields are guaranteed by resolve_columns.
    map.get(field).unwrap_or_default()
}

fn hours_of(row: &Record, column: &str, stats: &mut ExtractStats, source: Source) -> f64 {
    let hours = parse_hours(cell(row, column));
    if hours.is_malformed() {
        stats.malformed_hours += 1;
        log::debug!("{source}: malformed hours {hours:?}, counted as 0");
    }
    let value = hours.value();
    if value < 0.0 {
        stats.negative_hours += 1;
        log::debug!("{source}: negative hours {value}, counted as 0");
        return 0.0;
    }
    value
}

// ---------------------------------------------------------------------------
// DRMIS
// ---------------------------------------------------------------------------

pub fn extract_drmis(
    table: &DetectedTable,
    settings: &ExtractionConfig,
    allow: Option<&AllowList>,
) -> Result<Extracted<DrmisRecord>, ReconError> {
    let map = resolve_columns(&table.headers, DRMIS_FIELDS, Source::Drmis)?;
    let (emp_col, date_col, hours_col, code_col) = (
        header(&map, Field::EmployeeId),
        header(&map, Field::Date),
        header(&map, Field::Hours),
        header(&map, Field::LeaveType),
    );

    let mut stats = ExtractStats {
        rows_read: table.rows.len(),
        ..Default::default()
    };
    let mut records = Vec::new();

    for row in &table.rows {
        let Some(date) = normalize_date(cell(row, date_col)) else {
            stats.bad_dates += 1;
            continue;
        };
        let leave_code = normalize_drmis_code(cell(row, code_col));
        if settings.is_excluded_drmis(&leave_code) {
            stats.excluded += 1;
            continue;
        }
        if let Some(list) = allow {
            if !is_blank_code(&leave_code) && !list.contains(&leave_code) {
                stats.not_allowed += 1;
                continue;
            }
        }
        let hours = hours_of(row, hours_col, &mut stats, Source::Drmis);
        records.push(DrmisRecord {
            employee_id: cell(row, emp_col).as_text(),
            date,
            hours,
            leave_code,
        });
    }

    stats.kept = records.len();
    stats.emitted = records.len();
    log::info!(
        "DRMIS: {} of {} row(s) kept ({} bad date, {} excluded, {} not allowed)",
        stats.kept,
        stats.rows_read,
        stats.bad_dates,
        stats.excluded,
        stats.not_allowed
    );
    Ok(Extracted { records, stats })
}

// ---------------------------------------------------------------------------
// Oracle
// ---------------------------------------------------------------------------

pub fn extract_oracle(
    table: &DetectedTable,
    settings: &ExtractionConfig,
    allow: Option<&AllowList>,
    calendar: &BusinessCalendar,
) -> Result<Extracted<OracleRecord>, ReconError> {
    let map = resolve_columns(&table.headers, ORACLE_FIELDS, Source::Oracle)?;
    let (date_col, hours_col, code_col) = (
        header(&map, Field::FromDate),
        header(&map, Field::HoursRecorded),
        header(&map, Field::LeaveCode),
    );

    let mut stats = ExtractStats {
        rows_read: table.rows.len(),
        ..Default::default()
    };
    let mut records = Vec::new();

    for row in &table.rows {
        let Some(date) = normalize_date(cell(row, date_col)) else {
            stats.bad_dates += 1;
            continue;
        };
        let leave_code = normalize_oracle_code(cell(row, code_col));
        if settings.is_excluded_oracle(&leave_code) {
            stats.excluded += 1;
            continue;
        }
        if let Some(list) = allow {
            if is_blank_code(&leave_code) || !list.contains(&leave_code) {
                stats.not_allowed += 1;
                continue;
            }
        }
        let hours = hours_of(row, hours_col, &mut stats, Source::Oracle);
        records.push(OracleRecord {
            date,
            hours,
            leave_code,
        });
    }

    stats.kept = records.len();
    let records = expand_all(records, calendar, settings.max_daily_hours);
    stats.emitted = records.len();
    log::info!(
        "Oracle: {} of {} row(s) kept, {} after expansion ({} bad date, {} excluded, {} not allowed)",
        stats.kept,
        stats.rows_read,
        stats.emitted,
        stats.bad_dates,
        stats.excluded,
        stats.not_allowed
    );
    Ok(Extracted { records, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedHolidays;
    use crate::cell::{CellValue, Grid};
    use crate::grid::{detect_table, DEFAULT_SCAN_ROWS};
    use chrono::NaiveDate;

    fn t(s: &str) -> CellValue {
        CellValue::from(s)
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn drmis_table() -> DetectedTable {
        let grid: Grid = vec![
            vec![t("Pers.No."), t("Date"), t("Hours"), t("A/AType"), t("A/A Type Text")],
            vec![n(12345.0), t("28.04.2025"), n(4.25), t("1110"), t("Vacation")],
            vec![n(12345.0), t("29.04.2025"), n(7.5), t(""), t("")],
            vec![n(12345.0), t("not a date"), n(7.5), t("1110"), t("")],
            vec![n(12345.0), t("30.04.2025"), n(7.5), t("3010"), t("Travel")],
            vec![n(12345.0), t("01.05.2025"), n(7.5), t("1120"), t("Sick")],
            vec![n(12345.0), t("02.05.2025"), t("eight"), t("-"), t("")],
        ];
        detect_table(&grid, DEFAULT_SCAN_ROWS)
    }

    fn oracle_table() -> DetectedTable {
        let grid: Grid = vec![
            vec![t("Absence Report")],
            vec![t("From Date"), t("To Date"), t("Hours Recorded"), t("Leave Code")],
            vec![t("2025-04-28"), t("2025-04-28"), n(8.0), t("110")],
            vec![t("2025-05-05"), t("2025-05-07"), n(20.0), t("120")],
            vec![t("2025-05-12"), t("2025-05-12"), n(8.0), t("260")],
            vec![t(""), t(""), n(8.0), t("110")],
            vec![t("2025-05-13"), t("2025-05-13"), n(3.0), t("")],
        ];
        detect_table(&grid, DEFAULT_SCAN_ROWS)
    }

    #[test]
    fn drmis_rows_are_normalized_and_filtered() {
        let out = extract_drmis(&drmis_table(), &ExtractionConfig::default(), None).unwrap();
        let codes: Vec<_> = out.records.iter().map(|r| r.leave_code.as_str()).collect();
        assert_eq!(codes, vec!["1110", "0", "1120", "0"]);
        assert_eq!(out.records[0].employee_id, "12345");
        assert_eq!(out.records[0].date, ymd(2025, 4, 28));
        assert_eq!(out.records[0].hours, 4.25);
        assert_eq!(out.records[3].hours, 0.0);

        assert_eq!(out.stats.rows_read, 6);
        assert_eq!(out.stats.bad_dates, 1);
        assert_eq!(out.stats.excluded, 1);
        assert_eq!(out.stats.malformed_hours, 1);
        assert_eq!(out.stats.kept, 4);
    }

    #[test]
    fn negative_hours_are_clamped_and_counted() {
        let grid: Grid = vec![
            vec![t("Pers.No."), t("Date"), t("Hours"), t("A/AType")],
            vec![n(12345.0), t("28.04.2025"), n(-4.0), t("1110")],
            vec![n(12345.0), t("29.04.2025"), n(7.5), t("1110")],
            vec![n(12345.0), t("30.04.2025"), n(7.5), t("1110")],
        ];
        let table = detect_table(&grid, DEFAULT_SCAN_ROWS);
        let out = extract_drmis(&table, &ExtractionConfig::default(), None).unwrap();
        let hours: Vec<_> = out.records.iter().map(|r| r.hours).collect();
        assert_eq!(hours, vec![0.0, 7.5, 7.5]);
        assert_eq!(out.stats.negative_hours, 1);
        assert_eq!(out.stats.malformed_hours, 0);
    }

    #[test]
    fn drmis_allow_list_keeps_blank_codes() {
        let allow = AllowList::new(["1110"]);
        let out = extract_drmis(&drmis_table(), &ExtractionConfig::default(), Some(&allow)).unwrap();
        let codes: Vec<_> = out.records.iter().map(|r| r.leave_code.as_str()).collect();
        assert_eq!(codes, vec!["1110", "0", "0"]);
        assert_eq!(out.stats.not_allowed, 1);
    }

    #[test]
    fn drmis_missing_columns() {
        let grid: Grid = vec![
            vec![t("Employee"), t("Date"), t("Hours")],
            vec![n(1.0), t("28.04.2025"), n(8.0)],
        ];
        let table = detect_table(&grid, DEFAULT_SCAN_ROWS);
        let err = extract_drmis(&table, &ExtractionConfig::default(), None).unwrap_err();
        assert_eq!(
            err.missing_fields().map(|m| m.to_vec()),
            Some(vec!["employee_id".to_string(), "leave_type".to_string()])
        );
    }

    #[test]
    fn oracle_rows_are_bridged_filtered_and_expanded() {
        let cal = BusinessCalendar::new(FixedHolidays::new());
        let out = extract_oracle(&oracle_table(), &ExtractionConfig::default(), None, &cal).unwrap();

        let rows: Vec<_> = out
            .records
            .iter()
            .map(|r| (r.date, r.hours, r.leave_code.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (ymd(2025, 4, 28), 8.0, "1110"),
                (ymd(2025, 5, 5), 8.0, "1120"),
                (ymd(2025, 5, 6), 8.0, "1120"),
                (ymd(2025, 5, 7), 4.0, "1120"),
                (ymd(2025, 5, 13), 3.0, "0"),
            ]
        );
        assert_eq!(out.stats.excluded, 1);
        assert_eq!(out.stats.bad_dates, 1);
        assert_eq!(out.stats.kept, 3);
        assert_eq!(out.stats.emitted, 5);
    }

    #[test]
    fn oracle_allow_list_drops_blank_codes() {
        let cal = BusinessCalendar::new(FixedHolidays::new());
        let allow = AllowList::new(["1110"]);
        let out =
            extract_oracle(&oracle_table(), &ExtractionConfig::default(), Some(&allow), &cal).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].leave_code, "1110");
        assert_eq!(out.stats.not_allowed, 2);
    }

    #[test]
    fn oracle_missing_columns_lists_headers() {
        let grid: Grid = vec![vec![t("Start"), t("Hours"), t("Type")], vec![t("2025-04-28"), n(8.0), t("110")]];
        let table = detect_table(&grid, DEFAULT_SCAN_ROWS);
        let cal = BusinessCalendar::default();
        match extract_oracle(&table, &ExtractionConfig::default(), None, &cal) {
            Err(ReconError::MissingColumns { source, missing, available }) => {
                assert_eq!(source, Source::Oracle);
                assert_eq!(missing, vec!["from_date", "leave_code"]);
                assert_eq!(available, vec!["Start", "Hours", "Type"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }
}
