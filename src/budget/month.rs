//! "YYYY-MM" month keys.

use chrono::{Datelike, Months, NaiveDate};

/// The current local month.
pub(crate) fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

fn first_day(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()
}

/// Normalize user input into a month key. Accepts "2024-01", "2024-1",
/// or a bare month number ("1", "01") resolved against `year`.
pub(crate) fn parse_month(input: &str, year: i32) -> Option<String> {
    let input = input.trim();
    let candidate = if input.len() <= 2 {
        format!("{year}-{input:0>2}")
    } else {
        input.to_string()
    };
    first_day(&candidate).map(|d| d.format("%Y-%m").to_string())
}

/// Move a month key forward or back by `delta` months.
pub(crate) fn shift_month(month: &str, delta: i32) -> Option<String> {
    let date = first_day(month)?;
    let shifted = if delta >= 0 {
        date.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(delta.unsigned_abs()))
    }?;
    Some(shifted.format("%Y-%m").to_string())
}

/// First and last calendar day of the month, as "YYYY-MM-DD".
pub(crate) fn month_bounds(month: &str) -> Option<(String, String)> {
    let start = first_day(month)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    ))
}

pub(crate) fn year_of(month: &str) -> i32 {
    first_day(month).map_or_else(|| chrono::Local::now().year(), |d| d.year())
}

/// Human label, e.g. "March 2024".
pub(crate) fn month_label(month: &str) -> String {
    first_day(month).map_or_else(|| month.to_string(), |d| d.format("%B %Y").to_string())
}
