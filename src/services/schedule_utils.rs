use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::time::TimeInterval;

/// Parses `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_date_key(value: &str) -> AppResult<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .map_err(|err| {
            AppError::validation_with_details(
                "invalid date key",
                json!({"value": value, "error": err.to_string()}),
            )
        })
}

/// Serde adapter accepting either date key form.
pub fn deserialize_date_key<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    try_parse_date_key(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date key: {raw}")))
}

/// Quiet variant for scans over external data, where bad rows are skipped.
pub fn try_parse_date_key(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .ok()
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// April-March fiscal year, named after its starting calendar year.
pub fn fiscal_year_of(date: NaiveDate) -> i32 {
    if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    }
}

pub fn fiscal_year_start(fiscal_year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(fiscal_year, 4, 1).unwrap_or(NaiveDate::MIN)
}

pub fn fiscal_year_end(fiscal_year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(fiscal_year + 1, 3, 31).unwrap_or(NaiveDate::MAX)
}

/// 1 = Monday ... 7 = Sunday.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every date from `start` to `end`, inclusive; empty when `end < start`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |date| *date <= end)
}

pub fn parse_clock(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|err| {
        AppError::validation_with_details(
            "invalid time of day",
            json!({"value": value, "error": err.to_string()}),
        )
    })
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Wall-clock arithmetic that wraps around midnight.
pub fn add_minutes(time: NaiveTime, minutes: i64) -> NaiveTime {
    time.overflowing_add_signed(Duration::minutes(minutes)).0
}

/// `add_minutes` on an `HH:MM` string; an empty input stays empty.
pub fn shift_clock(value: &str, minutes: i64) -> AppResult<String> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    let time = parse_clock(value)?;
    Ok(format_clock(add_minutes(time, minutes)))
}

pub fn ensure_window(start: NaiveTime, end: NaiveTime) -> AppResult<()> {
    if end <= start {
        Err(AppError::validation("end time must be after start time"))
    } else {
        Ok(())
    }
}

/// Builds an interval from optional `HH:MM` bounds; a missing bound opens
/// to the start or end of the day. Unparsable or inverted bounds yield `None`.
pub fn interval_from_bounds(start: Option<&str>, end: Option<&str>) -> Option<TimeInterval> {
    let full_day = TimeInterval::full_day();
    let start = match start.map(str::trim).filter(|value| !value.is_empty()) {
        Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M").ok()?,
        None => full_day.start,
    };
    let end = match end.map(str::trim).filter(|value| !value.is_empty()) {
        Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M").ok()?,
        None => full_day.end,
    };
    let interval = TimeInterval::new(start, end);
    interval.is_valid().then_some(interval)
}

/// Like `interval_from_bounds`, but each missing or unparsable bound comes
/// from `fallback`, and an inverted result is replaced by `fallback` whole.
pub fn interval_or(start: Option<&str>, end: Option<&str>, fallback: TimeInterval) -> TimeInterval {
    let parse = |raw: Option<&str>| {
        raw.map(str::trim)
            .and_then(|value| NaiveTime::parse_from_str(value, "%H:%M").ok())
    };
    let interval = TimeInterval::new(
        parse(start).unwrap_or(fallback.start),
        parse(end).unwrap_or(fallback.end),
    );
    if interval.is_valid() {
        interval
    } else {
        fallback
    }
}
