// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Display helpers for timetable times and keyword date/time hints.
//!
//! Inputs are plain `HH:mm` and `YYYY-MM-DD` strings. Hints are keyword
//! lookups only; there is no language understanding here.

use crate::validator::validate_time_format;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::Serialize;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// A coarse time-of-day range, both ends as `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: &'static str,
    pub end: &'static str,
}

// Longer keywords first so 大後天 is not read as 後天.
const DATE_KEYWORDS: &[(&str, i64)] = &[
    ("大後天", 3),
    ("後天", 2),
    ("明天", 1),
    ("明日", 1),
    ("今天", 0),
    ("今日", 0),
];

const TIME_RANGE_KEYWORDS: &[(&str, TimeRange)] = &[
    ("凌晨", TimeRange { start: "00:00", end: "06:00" }),
    ("早上", TimeRange { start: "06:00", end: "12:00" }),
    ("上午", TimeRange { start: "06:00", end: "12:00" }),
    ("中午", TimeRange { start: "11:00", end: "13:00" }),
    ("下午", TimeRange { start: "12:00", end: "18:00" }),
    ("傍晚", TimeRange { start: "17:00", end: "19:00" }),
    ("晚上", TimeRange { start: "18:00", end: "23:59" }),
];

fn parse_hhmm(input: &str) -> Option<NaiveTime> {
    if !validate_time_format(input) {
        return None;
    }
    NaiveTime::parse_from_str(input, "%H:%M").ok()
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight() / 60)
}

/// Travel time between two `HH:mm` times, e.g. `2小時15分`. An arrival
/// earlier than the departure is taken to be on the next day.
pub fn format_duration(departure: &str, arrival: &str) -> Option<String> {
    let dep = minutes_of_day(parse_hhmm(departure)?);
    let arr = minutes_of_day(parse_hhmm(arrival)?);
    let total = (arr - dep).rem_euclid(MINUTES_PER_DAY);

    let (hours, minutes) = (total / 60, total % 60);
    Some(if hours == 0 {
        format!("{minutes}分")
    } else {
        format!("{hours}小時{minutes}分")
    })
}

/// Delay in minutes as shown on a departure board.
pub fn format_delay(minutes: i64) -> String {
    match minutes {
        0 => "準點".to_string(),
        m if m > 0 => format!("晚{m}分"),
        m => format!("早{}分", m.unsigned_abs()),
    }
}

/// `YYYY-MM-DD` as `2026年10月19日 (週一)`.
pub fn format_date(input: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    Some(format!(
        "{}年{}月{}日 (週{})",
        date.year(),
        date.month(),
        date.day(),
        weekday_name(date.weekday())
    ))
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "一",
        Weekday::Tue => "二",
        Weekday::Wed => "三",
        Weekday::Thu => "四",
        Weekday::Fri => "五",
        Weekday::Sat => "六",
        Weekday::Sun => "日",
    }
}

/// Relative date named in `text`, resolved against `today`.
pub fn parse_date_hint(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    DATE_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .and_then(|(_, offset)| today.checked_add_signed(Duration::days(*offset)))
}

/// Time-of-day range named in `text`.
pub fn parse_time_range_hint(text: &str) -> Option<TimeRange> {
    TIME_RANGE_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, range)| *range)
}
