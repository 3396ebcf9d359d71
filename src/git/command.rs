//! The `git` executable, for the operations that go through porcelain:
//! the commit log and file-scoped checkouts of the working tree.

use crate::dates::{self, Timestamp};
use crate::error::{BackfillError, Result};
use crate::model::CommitRecord;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run git and return its stdout; a non-zero exit is an error.
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        tracing::debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| BackfillError::VcsQuery(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackfillError::VcsQuery(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Commits on `branch`, newest first, authored strictly after `since`.
    pub fn list_commits(&self, branch: &str, since: Option<&Timestamp>) -> Result<Vec<CommitRecord>> {
        let output = self.run(&log_args(branch, since))?;
        parse_log(&output, since)
    }

    /// Porcelain status of tracked files; empty when the tree is clean.
    pub fn tracked_changes(&self) -> Result<String> {
        Ok(self
            .run(&["status", "--porcelain", "--untracked-files=no"])?
            .trim_end()
            .to_string())
    }

    /// `git checkout <rev> -- <paths>`
    pub fn checkout_paths(&self, rev: &str, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["checkout".to_string(), rev.to_string(), "--".to_string()];
        args.extend(paths.iter().cloned());
        self.run(&args).map(|_| ())
    }

    /// Remove paths from the index, and from the working tree unless
    /// `cached_only`.
    pub fn remove_paths(&self, paths: &[String], cached_only: bool) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec![
            "rm".to_string(),
            "-q".to_string(),
            "-f".to_string(),
            "--ignore-unmatch".to_string(),
        ];
        if cached_only {
            args.push("--cached".to_string());
        }
        args.push("--".to_string());
        args.extend(paths.iter().cloned());
        self.run(&args).map(|_| ())
    }

    pub fn reset_hard(&self, rev: &str) -> Result<()> {
        self.run(&["reset", "--quiet", "--hard", rev]).map(|_| ())
    }
}

/// The trailing `--` keeps a branch named like a file from being read as a
/// path.
fn log_args(branch: &str, since: Option<&Timestamp>) -> Vec<String> {
    let mut args = vec![
        "log".to_string(),
        "--date=iso".to_string(),
        "--pretty=format:%H|%ad".to_string(),
    ];
    if let Some(since) = since {
        args.push(format!("--since={}", dates::to_vcs(since)));
    }
    args.push(branch.to_string());
    args.push("--".to_string());
    args
}

/// Parse `%H|%ad` lines. `git log --since` may include commits on the
/// boundary, so results are filtered again to strictly after `since`.
pub fn parse_log(output: &str, since: Option<&Timestamp>) -> Result<Vec<CommitRecord>> {
    let mut commits = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (sha, date) = line
            .split_once('|')
            .ok_or_else(|| BackfillError::VcsQuery(format!("unexpected log line: '{line}'")))?;
        let authored_at = dates::parse_vcs_timestamp(date)?;

        if since.is_some_and(|s| authored_at <= *s) {
            continue;
        }
        commits.push(CommitRecord {
            sha: sha.trim().to_string(),
            authored_at,
        });
    }
    Ok(commits)
}
