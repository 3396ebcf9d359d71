//! Conversions between git's `--date=iso` output and the timestamp format
//! stored in the series file.
//!
//! Git prints `2025-11-05 21:38:28 -0700`; the series stores
//! `2025-11-05T21:38:28-0700`, which the chart front end parses directly.
//! All comparisons go through [`DateTime`] so that commits authored in
//! different offsets order by absolute instant.

use crate::error::{BackfillError, Result};
use chrono::{DateTime, FixedOffset, Local};

pub type Timestamp = DateTime<FixedOffset>;

pub const VCS_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
pub const INTERCHANGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

pub fn parse_vcs_timestamp(s: &str) -> Result<Timestamp> {
    DateTime::parse_from_str(s.trim(), VCS_FORMAT)
        .map_err(|_| BackfillError::MalformedTimestamp(s.to_string()))
}

pub fn parse_interchange_timestamp(s: &str) -> Result<Timestamp> {
    DateTime::parse_from_str(s.trim(), INTERCHANGE_FORMAT)
        .map_err(|_| BackfillError::MalformedTimestamp(s.to_string()))
}

/// Parse a `commit_date` read back from a series file.
///
/// Older files hold git-style dates or RFC 3339 strings, so all three shapes
/// are accepted.
pub fn parse_series_timestamp(s: &str) -> Result<Timestamp> {
    parse_interchange_timestamp(s)
        .or_else(|_| parse_vcs_timestamp(s))
        .or_else(|_| {
            DateTime::parse_from_rfc3339(s.trim())
                .map_err(|_| BackfillError::MalformedTimestamp(s.to_string()))
        })
}

pub fn to_interchange(ts: &Timestamp) -> String {
    ts.format(INTERCHANGE_FORMAT).to_string()
}

pub fn to_vcs(ts: &Timestamp) -> String {
    ts.format(VCS_FORMAT).to_string()
}

/// Reformat a git date for export. A date that does not parse is passed
/// through unchanged so one bad record cannot abort a backfill.
pub fn vcs_to_interchange(s: &str) -> String {
    match parse_vcs_timestamp(s) {
        Ok(ts) => to_interchange(&ts),
        Err(e) => {
            tracing::warn!("{e}; keeping the original value");
            s.to_string()
        }
    }
}

/// The current instant in the local offset, as the live data point uses it.
pub fn now() -> Timestamp {
    Local::now().fixed_offset()
}
