//! School-year date window requested from the portal.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

/// Sept 1 to Aug 31 span bounding the requested calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchoolYearWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SchoolYearWindow {
    /// Window containing `today`. January to August still belongs to the
    /// school year that started the previous September.
    pub fn containing(today: NaiveDate) -> Self {
        let start_year = if today.month0() < 8 {
            today.year() - 1
        } else {
            today.year()
        };

        Self {
            start: first_of_september(start_year),
            end: end_of_august(start_year + 1),
        }
    }

    /// Window for the current wall-clock date.
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// Local midnight of the first day, in epoch milliseconds.
    pub fn start_millis(&self) -> i64 {
        local_midnight_millis(self.start)
    }

    /// Local midnight of the last day, in epoch milliseconds.
    pub fn end_millis(&self) -> i64 {
        local_midnight_millis(self.end)
    }
}

fn first_of_september(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 9, 1).unwrap_or_default()
}

fn end_of_august(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 8, 31).unwrap_or_default()
}

fn local_midnight_millis(date: NaiveDate) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt: DateTime<Local>| dt.timestamp_millis())
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn spring_belongs_to_previous_september() {
        let window = SchoolYearWindow::containing(date(2026, 3, 15));
        assert_eq!(window.start, date(2025, 9, 1));
        assert_eq!(window.end, date(2026, 8, 31));
    }

    #[test]
    fn august_is_still_previous_year() {
        let window = SchoolYearWindow::containing(date(2026, 8, 31));
        assert_eq!(window.start, date(2025, 9, 1));
    }

    #[test]
    fn september_starts_a_new_year() {
        let window = SchoolYearWindow::containing(date(2026, 9, 1));
        assert_eq!(window.start, date(2026, 9, 1));
        assert_eq!(window.end, date(2027, 8, 31));
    }

    #[test]
    fn boundaries_are_ordered() {
        let window = SchoolYearWindow::containing(date(2026, 10, 19));
        assert!(window.start_millis() < window.end_millis());
        let span_days = (window.end_millis() - window.start_millis()) / 86_400_000;
        assert!((363..=365).contains(&span_days));
    }
}
