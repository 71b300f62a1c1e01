//! Timestamp extraction and level classification for SPIP log lines.
//!
//! SPIP daemons prefix each record with a bracketed timestamp of the form
//! `[YYYY-MM-DD-HH:MM:SS.ffffff]`. Lines without one are continuations of
//! the previous record (stack traces, wrapped output) and carry no time.

use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Length of `[YYYY-MM-DD-HH:MM:SS.ffffff]` in bytes.
pub const TIMESTAMP_LEN: usize = 28;

/// Format of the second-resolution part inside the brackets.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// How naive log timestamps map onto unix time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    /// Wall-clock time of the host that wrote the log.
    #[default]
    Local,
    Utc,
}

impl TimestampZone {
    pub fn to_unix(self, naive: &NaiveDateTime) -> Option<i64> {
        match self {
            TimestampZone::Utc => Some(naive.and_utc().timestamp()),
            TimestampZone::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.timestamp()),
        }
    }

    /// Render a unix time the way SPIP writes it, for building fixtures and notices.
    pub fn format(self, unix: i64) -> Option<String> {
        let utc = chrono::DateTime::from_timestamp(unix, 0)?;
        let text = match self {
            TimestampZone::Utc => utc.format("[%Y-%m-%d-%H:%M:%S.%6f]").to_string(),
            TimestampZone::Local => utc
                .with_timezone(&Local)
                .format("[%Y-%m-%d-%H:%M:%S.%6f]")
                .to_string(),
        };
        Some(text)
    }
}

/// Severity marker carried by a line, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

impl Severity {
    pub fn marker(self) -> &'static str {
        match self {
            Severity::Warn => "WARN:",
            Severity::Error => "ERROR:",
        }
    }
}

/// Locate the first well-formed bracketed timestamp in `line`.
///
/// The match is unanchored: client logs may carry a short prefix before the
/// bracket. Only the shape is checked here; calendar validity is left to
/// [`parse_timestamp`].
pub fn find_timestamp(line: &[u8]) -> Option<&[u8]> {
    if line.len() < TIMESTAMP_LEN {
        return None;
    }

    (0..=line.len() - TIMESTAMP_LEN)
        .filter(|&i| line[i] == b'[')
        .map(|i| &line[i..i + TIMESTAMP_LEN])
        .find(|candidate| has_timestamp_shape(candidate))
}

fn has_timestamp_shape(c: &[u8]) -> bool {
    // [YYYY-MM-DD-HH:MM:SS.ffffff]
    // 0    5  8  11 14 17 20     27
    let digits = |range: std::ops::Range<usize>| c[range].iter().all(u8::is_ascii_digit);

    c[0] == b'['
        && digits(1..5)
        && c[5] == b'-'
        && digits(6..8)
        && c[8] == b'-'
        && digits(9..11)
        && c[11] == b'-'
        && digits(12..14)
        && c[14] == b':'
        && digits(15..17)
        && c[17] == b':'
        && digits(18..20)
        // any separator before the fraction
        && digits(21..27)
        && c[27] == b']'
}

/// Parse the leading timestamp of `line` into unix seconds.
///
/// Returns `None` for continuation lines and for timestamps that do not
/// name a real calendar instant (e.g. month 13).
pub fn parse_timestamp(line: &[u8], zone: TimestampZone) -> Option<i64> {
    let stamp = find_timestamp(line)?;
    let text = std::str::from_utf8(&stamp[1..20]).ok()?;
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?;
    zone.to_unix(&naive)
}
