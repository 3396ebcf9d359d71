use crate::dates::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub authored_at: Timestamp,
}

impl CommitRecord {
    pub fn short_sha(&self) -> &str {
        self.sha.get(..8).unwrap_or(&self.sha)
    }
}

/// Adoption counts for one merged port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// One sample of the persisted series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub commit_date: String,
    pub completed: u64,
    pub total: u64,
}

impl DataPoint {
    pub fn new(commit_date: String, progress: Progress) -> Self {
        Self {
            commit_date,
            completed: progress.completed,
            total: progress.total,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed,
            total: self.total,
        }
    }
}

/// Summary printed by `show --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub points: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub latest: Option<Progress>,
    pub latest_percent: Option<f64>,
    pub completed_delta: i64,
    pub total_delta: i64,
}
