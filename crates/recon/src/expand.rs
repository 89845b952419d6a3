//! Multi-day expansion of Oracle leave entries.
//!
//! Oracle reports a week of leave as one line with the total hours. Anything
//! over the daily cap is spread across consecutive working days.

use chrono::{Duration, NaiveDate};

use crate::calendar::BusinessCalendar;
use crate::model::OracleRecord;

const EPSILON: f64 = 1e-9;

/// Spread one record over working days, at most `max_daily` hours per day.
///
/// The emitted hours always sum to the original. If the calendar runs out of
/// working days the remainder stays on the record's own date.
pub fn expand_record(
    record: &OracleRecord,
    calendar: &BusinessCalendar,
    max_daily: f64,
) -> Vec<OracleRecord> {
    if max_daily.is_nan() || max_daily <= 0.0 {
        log::warn!("daily cap {max_daily} is not positive; {} left unexpanded", record.date);
        return vec![record.clone()];
    }
    if record.hours <= max_daily {
        return vec![record.clone()];
    }

    let mut out = Vec::new();
    let mut remaining = record.hours;
    let mut day = record.date;
    while remaining > EPSILON {
        let Some(business) = calendar.next_business_day(day) else {
            out.push(chunk(record, record.date, remaining));
            break;
        };
        let hours = remaining.min(max_daily);
        out.push(chunk(record, business, hours));
        remaining -= hours;
        match next_day(business) {
            Some(next) => day = next,
            None => {
                if remaining > EPSILON {
                    out.push(chunk(record, record.date, remaining));
                }
                break;
            }
        }
    }

    log::debug!(
        "expanded {}h of {} from {} into {} day(s)",
        record.hours,
        record.leave_code,
        record.date,
        out.len()
    );
    out
}

/// Expand every record, preserving input order.
pub fn expand_all(
    records: Vec<OracleRecord>,
    calendar: &BusinessCalendar,
    max_daily: f64,
) -> Vec<OracleRecord> {
    records
        .iter()
        .flat_map(|r| expand_record(r, calendar, max_daily))
        .collect()
}

fn chunk(record: &OracleRecord, date: NaiveDate, hours: f64) -> OracleRecord {
    OracleRecord {
        date,
        hours,
        leave_code: record.leave_code.clone(),
    }
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(1))
}
