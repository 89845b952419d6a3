//! Working-day calendar.
//!
//! The built-in holiday table covers a single calendar year. Other years need
//! an explicit list (see `[calendar]` in the recon config); dates outside the
//! table are only checked for weekends.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Longest stretch searched for the next working day.
const MAX_SCAN_DAYS: i64 = 366;

/// Year covered by the built-in table.
pub const BUILTIN_HOLIDAY_YEAR: i32 = 2025;

/// Anything that can say whether a date is a non-working holiday.
pub trait HolidaySource {
    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// Holiday name, when known.
    fn holiday_name(&self, _date: NaiveDate) -> Option<&str> {
        None
    }
}

/// A literal holiday table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedHolidays {
    days: BTreeMap<NaiveDate, String>,
}

impl FixedHolidays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, date: NaiveDate, name: impl Into<String>) -> Self {
        self.days.insert(date, name.into());
        self
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            days: dates.into_iter().map(|d| (d, "Holiday".to_string())).collect(),
        }
    }

    /// Federal public-service holidays observed in 2025.
    pub fn builtin() -> Self {
        const TABLE: [(u32, u32, &str); 11] = [
            (1, 1, "New Year's Day"),
            (4, 18, "Good Friday"),
            (4, 21, "Easter Monday"),
            (5, 19, "Victoria Day"),
            (7, 1, "Canada Day"),
            (9, 1, "Labour Day"),
            (9, 30, "National Day for Truth and Reconciliation"),
            (10, 13, "Thanksgiving Day"),
            (11, 11, "Remembrance Day"),
            (12, 25, "Christmas Day"),
            (12, 26, "Boxing Day"),
        ];
        let mut table = Self::new();
        for (month, day, name) in TABLE {
            if let Some(date) = NaiveDate::from_ymd_opt(BUILTIN_HOLIDAY_YEAR, month, day) {
                table.days.insert(date, name.to_string());
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl HolidaySource for FixedHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.days.get(&date).map(String::as_str)
    }
}

/// Weekends plus a holiday source.
pub struct BusinessCalendar {
    holidays: Box<dyn HolidaySource>,
}

impl fmt::Debug for BusinessCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessCalendar").finish_non_exhaustive()
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::new(FixedHolidays::builtin())
    }
}

impl BusinessCalendar {
    pub fn new(holidays: impl HolidaySource + 'static) -> Self {
        Self {
            holidays: Box::new(holidays),
        }
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.is_holiday(date)
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.holiday_name(date)
    }

    /// First working day on or after `from`.
    pub fn next_business_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut day = from;
        for _ in 0..MAX_SCAN_DAYS {
            if self.is_business_day(day) {
                return Some(day);
            }
            day = day.checked_add_signed(Duration::days(1))?;
        }
        log::warn!("no working day within {MAX_SCAN_DAYS} days of {from}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builtin_table_has_eleven_named_days() {
        let table = FixedHolidays::builtin();
        assert_eq!(table.len(), 11);
        assert_eq!(table.holiday_name(ymd(2025, 7, 1)), Some("Canada Day"));
    }

    #[test]
    fn weekends_and_holidays_are_not_business_days() {
        let cal = BusinessCalendar::default();
        assert!(cal.is_business_day(ymd(2025, 4, 28))); // Monday
        assert!(!cal.is_business_day(ymd(2025, 4, 26))); // Saturday
        assert!(!cal.is_business_day(ymd(2025, 4, 27))); // Sunday
        assert!(!cal.is_business_day(ymd(2025, 12, 25)));
        // Same date, different year: table is year-specific.
        assert!(cal.is_business_day(ymd(2026, 12, 25)));
    }

    #[test]
    fn next_business_day_skips_weekend_and_holiday() {
        let cal = BusinessCalendar::default();
        // Friday 2025-04-18 is Good Friday, Monday 04-21 Easter Monday.
        assert_eq!(cal.next_business_day(ymd(2025, 4, 18)), Some(ymd(2025, 4, 22)));
        assert_eq!(cal.next_business_day(ymd(2025, 4, 28)), Some(ymd(2025, 4, 28)));
    }

    #[test]
    fn custom_source_replaces_builtin() {
        let cal = BusinessCalendar::new(FixedHolidays::from_dates([ymd(2026, 1, 2)]));
        assert!(!cal.is_business_day(ymd(2026, 1, 2)));
        assert!(cal.is_business_day(ymd(2025, 12, 25)));
    }

    struct Always;
    impl HolidaySource for Always {
        fn is_holiday(&self, _date: NaiveDate) -> bool {
            true
        }
    }

    #[test]
    fn scan_is_bounded() {
        let cal = BusinessCalendar::new(Always);
        assert_eq!(cal.next_business_day(ymd(2025, 1, 1)), None);
    }
}
