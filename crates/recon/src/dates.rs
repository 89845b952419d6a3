// Date normalization for cells from either export.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::cell::{serial_epoch, CellValue};

/// Field order of a date pattern's three capture groups.
#[derive(Clone, Copy)]
enum Order {
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

/// Patterns tried in order. Dotted and dashed short forms are day-first,
/// slashed is month-first, then ISO. A trailing time part is ignored.
fn patterns() -> &'static [(Regex, Order)] {
    static PATTERNS: OnceLock<Vec<(Regex, Order)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^(\d{1,2})\.(\d{1,2})\.(\d{4})(?:[ T].*)?$", Order::DayMonthYear),
            (r"^(\d{1,2})-(\d{1,2})-(\d{4})(?:[ T].*)?$", Order::DayMonthYear),
            (r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:[ T].*)?$", Order::MonthDayYear),
            (r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T].*)?$", Order::YearMonthDay),
        ]
        .into_iter()
        .filter_map(|(src, order)| Regex::new(src).ok().map(|re| (re, order)))
        .collect()
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%a %b %d %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
];

/// Convert a cell into a calendar date, or `None` when it holds no date.
pub fn normalize_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(n) => serial_to_date(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// Whole-day spreadsheet serial (epoch 1899-12-30), fraction discarded.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days.abs() > 2_958_465.0 {
        return None;
    }
    serial_epoch().checked_add_signed(Duration::days(days as i64))
}

/// Parse a date string using the fixed pattern list, then general formats.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for (re, order) in patterns() {
        if let Some(caps) = re.captures(s) {
            let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            let (a, b, c) = (field(1)?, field(2)?, field(3)?);
            let (year, month, day) = match order {
                Order::DayMonthYear => (c, b, a),
                Order::MonthDayYear => (c, a, b),
                Order::YearMonthDay => (a, b, c),
            };
            // A matched pattern is final: an impossible day does not fall through.
            return NaiveDate::from_ymd_opt(year as i32, month, day);
        }
    }

    parse_general(s)
}

fn parse_general(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    log::trace!("unparseable date text '{s}'");
    None
}
