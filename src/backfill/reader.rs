use crate::config::Settings;
use crate::error::Result;
use crate::git::GitRepo;
use crate::model::{CommitRecord, Progress};
use crate::ports;
use std::path::Path;

/// What one commit contributed to the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Counted(Progress),
    Skipped(String),
}

/// Materializes the tracked files of a commit and counts them.
///
/// `Err` aborts the whole run. Anything that only affects the commit at hand
/// is reported as [`Snapshot::Skipped`].
pub trait SnapshotReader {
    fn read(&mut self, commit: &CommitRecord) -> Result<Snapshot>;
}

/// Reads the tracked files straight from the object store. Nothing in the
/// working tree is touched, so no safety checks are needed.
pub struct ShowReader<'a> {
    repo: &'a GitRepo,
    settings: &'a Settings,
}

impl<'a> ShowReader<'a> {
    pub fn new(repo: &'a GitRepo, settings: &'a Settings) -> Self {
        Self { repo, settings }
    }

    fn read_optional(&self, sha: &str, path: Option<&Path>) -> Result<Option<String>> {
        match path {
            Some(path) => self.repo.read_text_at(sha, &self.settings.repo_relative(path)),
            None => Ok(None),
        }
    }

    fn try_read(&self, commit: &CommitRecord) -> Result<Snapshot> {
        let files = &self.settings.files;
        let baseline_path = self.settings.repo_relative(&files.baseline);
        let Some(baseline) = self.repo.read_text_at(&commit.sha, &baseline_path)? else {
            return Ok(Snapshot::Skipped(format!("{baseline_path} not present")));
        };
        if ports::is_blank_document(&baseline) {
            return Ok(Snapshot::Skipped(format!("{baseline_path} is empty")));
        }

        let overrides = self.read_optional(&commit.sha, files.overrides.as_deref())?;
        let external = self.read_optional(&commit.sha, files.external.as_deref())?;

        let merged = ports::merge_sources(
            &baseline,
            overrides.as_deref(),
            external.as_deref(),
            &self.settings.policy,
        )?;
        Ok(Snapshot::Counted(merged.progress(&self.settings.done_marker)))
    }
}

impl SnapshotReader for ShowReader<'_> {
    fn read(&mut self, commit: &CommitRecord) -> Result<Snapshot> {
        Ok(self
            .try_read(commit)
            .unwrap_or_else(|e| Snapshot::Skipped(e.to_string())))
    }
}
