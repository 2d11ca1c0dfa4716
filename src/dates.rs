use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

/// Canonical stored date encoding (DD/MM/YYYY)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Older rows were written with dashes instead of slashes
pub const LEGACY_DATE_FORMAT: &str = "%d-%m-%Y";

/// Stored time encoding (24-hour HH:MM)
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a task date in either supported encoding.
///
/// Accepts `DD/MM/YYYY` and the legacy `DD-MM-YYYY`, with or without zero
/// padding on day and month. Returns `None` for anything else so callers can
/// leave the task out of date-sensitive views instead of failing.
pub fn parse_task_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, LEGACY_DATE_FORMAT))
        .ok()
}

/// Format a date in the canonical stored encoding
pub fn format_task_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Rewrite a date string into the canonical encoding.
/// Unparsable input is returned untouched.
pub fn normalize_task_date(date_str: &str) -> String {
    match parse_task_date(date_str) {
        Some(date) => format_task_date(date),
        None => date_str.to_string(),
    }
}

/// Parse a 24-hour `HH:MM` time (hour may be unpadded)
pub fn parse_task_time(time_str: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time_str.trim(), TIME_FORMAT).ok()
}

pub fn format_task_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Rewrite a time string as zero-padded `HH:MM`; unparsable input is kept
pub fn normalize_task_time(time_str: &str) -> String {
    match parse_task_time(time_str) {
        Some(time) => format_task_time(time),
        None => time_str.to_string(),
    }
}

/// Most recent Monday on or before `today`
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

/// The seven consecutive days starting at `monday`
pub fn week_days(monday: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|offset| monday + Duration::days(offset as i64))
}

/// Full English weekday name, e.g. "Monday"
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
