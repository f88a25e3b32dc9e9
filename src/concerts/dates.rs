//! Search window validation.
//!
//! A window is valid when `date_from <= date_to` and both days fall between
//! today and the same calendar day next year, inclusive.

use chrono::{Local, Months, NaiveDate};

/// Calendar date format accepted from clients.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check a `YYYY-MM-DD` window against the local calendar day.
pub fn validate_dates(date_from: &str, date_to: &str) -> bool {
    validate_dates_as_of(date_from, date_to, Local::now().date_naive())
}

/// Check a `YYYY-MM-DD` window against an explicit `today`.
pub fn validate_dates_as_of(date_from: &str, date_to: &str, today: NaiveDate) -> bool {
    match (parse_date(date_from), parse_date(date_to)) {
        (Some(from), Some(to)) => window_is_valid(from, to, today),
        _ => false,
    }
}

/// Check an already-parsed window against an explicit `today`.
pub fn window_is_valid(from: NaiveDate, to: NaiveDate, today: NaiveDate) -> bool {
    // Feb 29 + 12 months clamps to Feb 28.
    let Some(year_from_today) = today.checked_add_months(Months::new(12)) else {
        return false;
    };

    from <= to && from >= today && to <= year_from_today
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
