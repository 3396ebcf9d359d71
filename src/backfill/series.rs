//! The persisted series: a JSON array of data points sorted by date.

use crate::dates::{self, Timestamp};
use crate::error::Result;
use crate::model::DataPoint;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Load a series. A missing file is an empty series; so is a file that
/// cannot be read or parsed, with a warning.
pub fn load_series(path: &Path) -> Vec<DataPoint> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("no series at {}, starting from the beginning", path.display());
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!("cannot read {}: {e}; starting fresh", path.display());
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<DataPoint>>(&text) {
        Ok(points) => points,
        Err(e) => {
            tracing::warn!("cannot parse {}: {e}; starting fresh", path.display());
            Vec::new()
        }
    }
}

/// Rewrite git-style dates left by older runs into the interchange format.
/// Dates that parse neither way are kept as they are.
pub fn normalize_dates(points: &mut [DataPoint]) {
    for point in points {
        if let Ok(ts) = dates::parse_vcs_timestamp(&point.commit_date) {
            point.commit_date = dates::to_interchange(&ts);
        } else if dates::parse_series_timestamp(&point.commit_date).is_err() {
            point.commit_date = dates::vcs_to_interchange(&point.commit_date);
        }
    }
}

/// Latest instant in the series; entries whose date does not parse are
/// ignored.
pub fn resume_point(points: &[DataPoint]) -> Option<Timestamp> {
    points
        .iter()
        .filter_map(|p| match dates::parse_series_timestamp(&p.commit_date) {
            Ok(ts) => Some(ts),
            Err(e) => {
                tracing::warn!("ignoring data point: {e}");
                None
            }
        })
        .max()
}

/// Stable sort by absolute instant. Points with unparseable dates keep their
/// relative order at the front.
pub fn sort_series(points: &mut [DataPoint]) {
    points.sort_by_cached_key(|p| dates::parse_series_timestamp(&p.commit_date).ok());
}

/// Serialize with four-space indentation and a trailing newline.
pub fn render_series(points: &[DataPoint]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    points.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Replace the file at `path` in one rename, so readers never see a partial
/// series and a failed run leaves the previous file intact.
pub fn write_series(path: &Path, points: &[DataPoint]) -> Result<()> {
    let bytes = render_series(points)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
