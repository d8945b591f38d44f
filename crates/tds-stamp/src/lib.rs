//! tds-stamp
//!
//! TimeDateStamp codec.
//!
//! A TDS is exactly 14 ASCII digits laid out as `YYYYMMDDHHMMSS` and names one
//! calendar second in the local timezone. This crate converts between that
//! encoding and a concrete instant, and forces a file's modification/access
//! time to the encoded instant.
//!
//! Parsing is strict: out-of-range fields are rejected, never normalized
//! (no "month 13 rolls into next year").

use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use std::fmt;
use std::fs::{self, FileTimes};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Number of ASCII digits in a TDS.
pub const TDS_LEN: usize = 14;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by the TDS codec.
#[derive(Debug)]
pub enum StampError {
    /// Not 14 ASCII digits.
    Malformed(String),
    /// 14 digits, but not a real calendar date-time.
    InvalidCalendar(String),
    /// Valid calendar fields that name no instant in the local timezone
    /// (skipped by a DST transition).
    NonexistentLocalTime(String),
    /// The target is missing or is not a regular file.
    NotAFile(String),
    /// The OS refused to update the file's times.
    Io { path: String, source: io::Error },
}

impl fmt::Display for StampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StampError::Malformed(code) => {
                write!(f, "timestamp '{code}' not in tds form (yyyymmddhhmmss)")
            }
            StampError::InvalidCalendar(code) => {
                write!(f, "timestamp '{code}' is not a valid calendar date-time")
            }
            StampError::NonexistentLocalTime(code) => {
                write!(f, "timestamp '{code}' does not exist in the local timezone")
            }
            StampError::NotAFile(path) => write!(f, "'{path}' is not a regular file"),
            StampError::Io { path, source } => write!(f, "can't update '{path}': {source}"),
        }
    }
}

impl std::error::Error for StampError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StampError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Parse a TDS into the local-time instant it names.
///
/// An ambiguous local time (the repeated hour when clocks fall back) resolves
/// to the earlier of the two instants.
pub fn parse_timestamp_code(code: &str) -> Result<DateTime<Local>, StampError> {
    let naive = parse_naive(code)?;
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(StampError::NonexistentLocalTime(code.to_string())),
    }
}

/// Parse the calendar fields of a TDS without attaching a timezone.
pub fn parse_naive(code: &str) -> Result<NaiveDateTime, StampError> {
    if code.len() != TDS_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StampError::Malformed(code.to_string()));
    }

    // All-ASCII-digit input: byte slicing and parse cannot fail.
    let field = |from: usize, to: usize| -> u32 {
        code[from..to]
            .bytes()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
    };

    let year = field(0, 4) as i32;
    let month = field(4, 6);
    let day = field(6, 8);
    let hour = field(8, 10);
    let minute = field(10, 12);
    let second = field(12, 14);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| StampError::InvalidCalendar(code.to_string()))
}

/// Encode an instant as a TDS in local time.
pub fn format_timestamp_code<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let local = instant.with_timezone(&Local);
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        local.year(),
        local.month(),
        local.day(),
        local.hour(),
        local.minute(),
        local.second()
    )
}

/// Set both the modification and the access time of `path` to `instant`.
pub fn apply_timestamp(path: &Path, instant: &DateTime<Local>) -> Result<(), StampError> {
    let shown = path.display().to_string();
    if !path.is_file() {
        return Err(StampError::NotAFile(shown));
    }

    let at = SystemTime::from(*instant);
    let times = FileTimes::new().set_modified(at).set_accessed(at);

    let file = open_for_times(path).map_err(|source| StampError::Io {
        path: shown.clone(),
        source,
    })?;
    file.set_times(times)
        .map_err(|source| StampError::Io { path: shown, source })
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> io::Result<fs::File> {
    fs::File::open(path)
}

// Windows needs FILE_WRITE_ATTRIBUTES on the handle; no truncation happens.
#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new().write(true).open(path)
}

/// Parse `code` and apply it to `path` in one step.
pub fn touch_with_code(path: &Path, code: &str) -> Result<DateTime<Local>, StampError> {
    let instant = parse_timestamp_code(code)?;
    apply_timestamp(path, &instant)?;
    Ok(instant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_code() {
        let n = parse_naive("20240229235958").unwrap();
        assert_eq!(n.year(), 2024);
        assert_eq!(n.month(), 2);
        assert_eq!(n.day(), 29);
        assert_eq!((n.hour(), n.minute(), n.second()), (23, 59, 58));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        for bad in [
            "99999999999999",
            "20231301000000", // month 13
            "20230132000000", // day 32
            "20230230000000", // Feb 30
            "20230229000000", // not a leap year
            "20230101240000", // hour 24
            "20230101006000", // minute 60
            "20230101000060", // second 60
            "20230001000000", // month 0
            "20230100000000", // day 0
        ] {
            assert!(
                matches!(parse_naive(bad), Err(StampError::InvalidCalendar(_))),
                "{bad} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_wrong_shape() {
        for bad in ["", "2023010100000", "202301010000000", "2023010100000a", "２０２３"] {
            assert!(matches!(parse_naive(bad), Err(StampError::Malformed(_))));
        }
    }

    #[test]
    fn format_inverts_parse() {
        let code = "20150704123456";
        let instant = parse_timestamp_code(code).unwrap();
        assert_eq!(format_timestamp_code(&instant), code);
    }
}
