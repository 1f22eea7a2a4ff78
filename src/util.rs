// Utility helpers for parsing dates, periods and formatting counts.
//
// This module centralizes all the "dirty" date/month handling so the rest of
// the code can work with typed values.
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use num_format::{Locale, ToFormattedString};
use std::fmt;

use crate::types::Cell;

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y", "%d/%m/%Y", "%d-%b-%Y", "%d %b %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Serial of 9999-12-31, the last date Excel can represent.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const MONTH_ABBREVS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a date string, trying the formats commonly seen in call exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Month-first wins over day-first for ambiguous slash dates.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Convert an Excel serial day number (days since 1899-12-30) to a date.
/// Values outside Excel's date range (ids, phone numbers) yield `None`.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(TimeDelta::try_days(serial.trunc() as i64)?)
}

/// Interpret any cell as a date. Numbers are treated as Excel serials.
pub fn cell_to_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_safe(Some(s)),
        Cell::Number(n) => excel_serial_to_date(*n),
        Cell::Empty => None,
    }
}

/// Month number (1-12) from an abbreviated name, full name or number.
pub fn parse_month(s: &str) -> Option<u32> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let prefix = s.get(..3)?;
    let pos = MONTH_ABBREVS.iter().position(|m| *m == prefix)?;
    // "march" and "mar" are fine, "marble" is not.
    let full = chrono::Month::try_from(pos as u8 + 1).ok()?.name().to_lowercase();
    if s == prefix || s == full || s == "sept" {
        Some(pos as u32 + 1)
    } else {
        None
    }
}

pub fn month_abbrev(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES[(month.clamp(1, 12) - 1) as usize]
}

/// A reporting period: a calendar month, optionally pinned to a year.
///
/// Ordering is by year then month, so `Year Month` values sort
/// chronologically and bare `Month` values sort January to December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: Option<i32>,
    pub month: u32,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(y) => write!(f, "{:04}-{:02}", y, self.month),
            None => f.write_str(month_abbrev(self.month)),
        }
    }
}

/// Parse a `Year Month` value: `2025-03`, `2025/03`, `2025-03-15`,
/// `Mar 2025` or `Mar-2025`. Dates already typed as cells are accepted too.
pub fn parse_year_month(cell: &Cell) -> Option<Period> {
    if let Cell::Date(d) = cell {
        return Some(Period {
            year: Some(d.year()),
            month: d.month(),
        });
    }
    let s = cell.as_text()?;
    let s = s.trim();
    for sep in ['-', '/'] {
        let mut parts = s.splitn(3, sep);
        if let (Some(y), Some(m)) = (parts.next(), parts.next()) {
            if y.len() == 4 {
                if let (Ok(year), Ok(month)) = (y.parse::<i32>(), m.parse::<u32>()) {
                    if (1..=12).contains(&month) {
                        return Some(Period {
                            year: Some(year),
                            month,
                        });
                    }
                }
            }
        }
    }
    let (m, y) = s.split_once([' ', '-'])?;
    let month = parse_month(m)?;
    let year = y.trim().parse::<i32>().ok()?;
    Some(Period {
        year: Some(year),
        month,
    })
}

/// Parse a bare `Month` value into a year-less period.
pub fn parse_month_period(cell: &Cell) -> Option<Period> {
    let month = match cell {
        Cell::Date(d) => d.month(),
        Cell::Number(n) if n.fract() == 0.0 && (1.0..=12.0).contains(n) => *n as u32,
        other => parse_month(&other.as_text()?)?,
    };
    Some(Period { year: None, month })
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts shown to the user
    // (e.g., `9,855 calls`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_date_shapes() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(parse_date_safe(Some("2025-03-15")), Some(d));
        assert_eq!(parse_date_safe(Some(" 03/15/2025 ")), Some(d));
        assert_eq!(parse_date_safe(Some("15-Mar-2025")), Some(d));
        assert_eq!(parse_date_safe(Some("2025-03-15 10:30:00")), Some(d));
        assert_eq!(parse_date_safe(Some("not a date")), None);
        assert_eq!(parse_date_safe(Some("")), None);
        assert_eq!(parse_date_safe(None), None);
    }

    #[test]
    fn excel_serials() {
        assert_eq!(
            excel_serial_to_date(45731.0),
            NaiveDate::from_ymd_opt(2025, 3, 15)
        );
        assert_eq!(excel_serial_to_date(-3.0), None);
        assert_eq!(
            excel_serial_to_date(MAX_EXCEL_SERIAL),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(excel_serial_to_date(MAX_EXCEL_SERIAL + 1.0), None);
        assert_eq!(excel_serial_to_date(919876543210.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn month_names() {
        assert_eq!(parse_month("Mar"), Some(3));
        assert_eq!(parse_month("march"), Some(3));
        assert_eq!(parse_month("Sept"), Some(9));
        assert_eq!(parse_month("12"), Some(12));
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("marble"), None);
    }

    #[test]
    fn year_month_periods_sort_chronologically() {
        let a = parse_year_month(&Cell::from_text("2024-12")).unwrap();
        let b = parse_year_month(&Cell::from_text("2025-01-04")).unwrap();
        let c = parse_year_month(&Cell::from_text("Feb 2025")).unwrap();
        assert!(a < b && b < c);
        assert_eq!(a.to_string(), "2024-12");
        assert_eq!(parse_year_month(&Cell::from_text("garbage")), None);
    }

    #[test]
    fn month_periods_render_abbreviated() {
        let p = parse_month_period(&Cell::from_text("January")).unwrap();
        assert_eq!(p.to_string(), "Jan");
        assert_eq!(parse_month_period(&Cell::Number(4.0)).unwrap().month, 4);
    }

    #[test]
    fn formats_counts_with_separators() {
        assert_eq!(format_int(1234567usize), "1,234,567");
    }
}
