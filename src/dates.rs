use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::model::{NightSpan, Window};

/// Accepted export layouts, day/month/year first, time optional.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Parse a day/month/year date with an optional time-of-day suffix.
/// The time is dropped: stays are counted in nights.
pub fn parse_stay_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok().map(|dt| dt.date()))
        .or_else(|| DATE_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(raw, f).ok()))
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    date + Days::new(1)
}

/// Nights of `[start, end)`, ascending.
pub fn nights(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d < end)
}

/// Inclusive date range `[start, end]`.
pub fn inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Clip a stay to the nights the window analyzes. None if nothing is left.
pub fn clamp_to_window(stay: &NightSpan, window: &Window) -> Option<NightSpan> {
    let bounds = window.span();
    let start = stay.start.max(bounds.start);
    let end = stay.end.min(bounds.end);
    (start < end).then(|| NightSpan::new(start, end))
}
