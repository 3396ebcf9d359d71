use super::reader::{Snapshot, SnapshotReader};
use super::series;
use crate::dates::{self, Timestamp};
use crate::error::Result;
use crate::model::{CommitRecord, DataPoint, Progress};
use crate::ports::{self, PortsDocument};
use std::io::ErrorKind;
use std::path::Path;

/// Reported after each commit has been attempted.
#[derive(Debug)]
pub struct Step<'a> {
    pub index: usize,
    pub total: usize,
    pub commit: &'a CommitRecord,
    pub snapshot: &'a Snapshot,
}

/// Read every commit, oldest first, one at a time. Skipped commits produce
/// no point; an `Err` from the reader stops the run.
pub fn collect_points<R, F>(commits: &[CommitRecord], reader: &mut R, mut observe: F) -> Result<Vec<DataPoint>>
where
    R: SnapshotReader + ?Sized,
    F: FnMut(Step<'_>),
{
    let total = commits.len();
    let mut points = Vec::with_capacity(total);

    for (index, commit) in commits.iter().rev().enumerate() {
        let snapshot = reader.read(commit)?;
        match &snapshot {
            Snapshot::Counted(progress) => {
                points.push(DataPoint::new(dates::to_interchange(&commit.authored_at), *progress));
            }
            Snapshot::Skipped(reason) => {
                tracing::info!("skipping {}: {reason}", commit.sha);
            }
        }
        observe(Step {
            index,
            total,
            commit,
            snapshot: &snapshot,
        });
    }

    Ok(points)
}

/// Progress of the local, possibly uncommitted, progress file.
pub fn live_point(progress_file: &Path, done_marker: &str) -> Option<Progress> {
    let text = match std::fs::read_to_string(progress_file) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("cannot read {}: {e}", progress_file.display());
            return None;
        }
    };
    match PortsDocument::parse(&text) {
        Ok(doc) => Some(ports::count_document(&doc, done_marker)),
        Err(e) => {
            tracing::warn!("cannot parse {}: {e}", progress_file.display());
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub series: Vec<DataPoint>,
    pub added: usize,
    /// The point appended for the local progress file, if any.
    pub live: Option<DataPoint>,
}

/// Concatenate, sort, and append the live point when it differs from the
/// chronologically last point.
pub fn finalize_series(
    prior: Vec<DataPoint>,
    new: Vec<DataPoint>,
    live: Option<Progress>,
    now: &Timestamp,
) -> Finalized {
    let mut added = new.len();
    let mut series = prior;
    series.extend(new);
    series::sort_series(&mut series);

    let live = live
        .filter(|live| series.last().map(DataPoint::progress) != Some(*live))
        .map(|live| DataPoint::new(dates::to_interchange(now), live));
    if let Some(point) = &live {
        series.push(point.clone());
        series::sort_series(&mut series);
        added += 1;
    }

    Finalized {
        series,
        added,
        live,
    }
}
