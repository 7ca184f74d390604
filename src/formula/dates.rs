//! Date Functions
//! CTOD (text → date), NENGO (era name + year), WYEAR (year in era)

use crate::error::{ReportError, ReportResult};
use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// A Japanese imperial era and the Gregorian date it begins on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Era {
    pub name: &'static str,
    pub start: (i32, u32, u32),
}

/// Eras in chronological order
pub const ERAS: &[Era] = &[
    Era {
        name: "明治",
        start: (1868, 1, 1),
    },
    Era {
        name: "大正",
        start: (1912, 7, 30),
    },
    Era {
        name: "昭和",
        start: (1926, 12, 25),
    },
    Era {
        name: "平成",
        start: (1989, 1, 8),
    },
    Era {
        name: "令和",
        start: (2019, 5, 1),
    },
];

impl Era {
    fn start_date(&self) -> Option<NaiveDate> {
        let (y, m, d) = self.start;
        NaiveDate::from_ymd_opt(y, m, d)
    }
}

/// Parse `YYYY/MM/DD` text into a date.
///
/// Returns `None` for anything not matching the pattern exactly. Matching
/// text that names no real calendar day (e.g. `2025/02/30`) is a format error.
pub fn convert_string_to_date(text: &str) -> ReportResult<Option<NaiveDate>> {
    let pattern = Regex::new(r"^([0-9]{4})/([0-9]{2})/([0-9]{2})$")
        .map_err(|e| ReportError::Format(format!("Regex error: {}", e)))?;

    let Some(caps) = pattern.captures(text) else {
        return Ok(None);
    };
    let year: i32 = caps[1].parse().unwrap_or_default();
    let month: u32 = caps[2].parse().unwrap_or_default();
    let day: u32 = caps[3].parse().unwrap_or_default();

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| ReportError::Format(format!("'{}' is not a calendar date", text)))
}

/// Era covering a date, with the year counted from 1 within that era
pub fn era_and_year(date: NaiveDate) -> ReportResult<(&'static str, i32)> {
    let era = ERAS
        .iter()
        .rev()
        .find(|era| era.start_date().is_some_and(|start| date >= start))
        .ok_or_else(|| {
            ReportError::Format(format!("Date {} precedes the supported eras", date))
        })?;
    Ok((era.name, date.year() - era.start.0 + 1))
}

/// Era name and year as `<era><year>年`, e.g. `令和7年`
pub fn japanese_era(date: NaiveDate) -> ReportResult<String> {
    let (name, year) = era_and_year(date)?;
    Ok(format!("{}{}年", name, year))
}

/// Year within the era, e.g. 7 for 2025-04-07
pub fn japanese_year(date: NaiveDate) -> ReportResult<i32> {
    Ok(era_and_year(date)?.1)
}
