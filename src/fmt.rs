use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};

/// `YYYY-MM-DD`, the form dates are stored and displayed in.
pub fn iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Sheet name for the month a date falls in: `YYYY-MM`.
pub fn month_key(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn amount(val: f64) -> String {
    format!("{val:.2}")
}

/// `YYYYMMDD_HHMMSS`, used to name spreadsheet backups.
pub fn backup_stamp(at: &NaiveDateTime) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Text that is not valid UTF-8 is read as Latin-1, the usual charset of
/// OFX 1.x files and of Windows consoles in pt-BR.
pub fn decode_text(data: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(data) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(data.iter().map(|&b| b as char).collect()),
    }
}
