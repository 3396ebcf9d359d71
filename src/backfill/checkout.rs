//! Transient checkout of the tracked files into the working tree.
//!
//! Every mutation happens inside a [`CheckoutSession`], which returns the
//! tracked files to `HEAD` and the generated progress file to its previous
//! bytes when it is restored or dropped, whatever happened in between.

use super::reader::{Snapshot, SnapshotReader};
use crate::config::Settings;
use crate::error::{BackfillError, Result};
use crate::git::{Git, GitRepo};
use crate::merge;
use crate::model::{CommitRecord, Progress};
use crate::ports::{self, PortsDocument};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct CheckoutSession<'a> {
    git: &'a Git,
    root: PathBuf,
    in_head: Vec<String>,
    not_in_head: Vec<String>,
    progress_file: PathBuf,
    /// Files outside `HEAD` whose on-disk bytes are put back verbatim.
    preserved: Vec<(PathBuf, Option<Vec<u8>>)>,
    restored: bool,
}

impl<'a> CheckoutSession<'a> {
    /// Record the state to return to. Nothing is modified yet.
    pub fn open(git: &'a Git, repo: &GitRepo, tracked: &[String], progress_file: &str) -> Result<Self> {
        let root = git.workdir().to_path_buf();
        let mut in_head = Vec::new();
        let mut not_in_head = Vec::new();
        for path in tracked {
            if repo.exists_at("HEAD", path)? {
                in_head.push(path.clone());
            } else {
                not_in_head.push(path.clone());
            }
        }

        let mut preserved = Vec::new();
        for path in not_in_head.iter().map(String::as_str).chain([progress_file]) {
            let abs = root.join(path);
            let bytes = read_if_exists(&abs)?;
            preserved.push((abs, bytes));
        }

        Ok(Self {
            git,
            progress_file: root.join(progress_file),
            root,
            in_head,
            not_in_head,
            preserved,
            restored: false,
        })
    }

    /// Bring `present` into the tree as of `sha` and take `absent` out of it,
    /// so the tree holds exactly what the commit had.
    pub fn materialize(&mut self, sha: &str, present: &[String], absent: &[String]) -> Result<()> {
        remove_if_exists(&self.progress_file)?;
        self.git.checkout_paths(sha, present)?;

        let (tracked_at_head, untracked): (Vec<String>, Vec<String>) = absent
            .iter()
            .cloned()
            .partition(|p| self.in_head.contains(p));
        self.git.remove_paths(&tracked_at_head, false)?;
        for path in untracked {
            remove_if_exists(&self.root.join(path))?;
        }
        Ok(())
    }

    /// Return the tree to its state before [`open`](Self::open).
    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        self.restore_inner()
    }

    fn restore_inner(&self) -> Result<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.git.checkout_paths("HEAD", &self.in_head) {
            errors.push(e.to_string());
        }
        if let Err(e) = self.git.remove_paths(&self.not_in_head, true) {
            errors.push(e.to_string());
        }
        for (path, bytes) in &self.preserved {
            let result = match bytes {
                Some(bytes) => write_creating_parent(path, bytes),
                None => remove_if_exists(path),
            };
            if let Err(e) = result {
                errors.push(format!("{}: {e}", path.display()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BackfillError::Restore(errors.join("; ")))
        }
    }
}

impl Drop for CheckoutSession<'_> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        if let Err(e) = self.restore_inner() {
            tracing::warn!("{e}");
        }
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn write_creating_parent(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Checks the tracked files of each commit out, produces the progress file
/// from them and counts it.
pub struct CheckoutReader<'a> {
    git: &'a Git,
    repo: &'a GitRepo,
    settings: &'a Settings,
}

impl<'a> CheckoutReader<'a> {
    pub fn new(git: &'a Git, repo: &'a GitRepo, settings: &'a Settings) -> Self {
        Self {
            git,
            repo,
            settings,
        }
    }

    fn count_materialized(
        &self,
        session: &mut CheckoutSession<'_>,
        commit: &CommitRecord,
        present: &[String],
        absent: &[String],
    ) -> Result<Progress> {
        session.materialize(&commit.sha, present, absent)?;

        let progress_path = self.settings.progress_path();
        match &self.settings.merge_command {
            Some(command) => run_merge_command(command, self.git.workdir())?,
            None => {
                let doc = merge::build_progress_document(
                    self.settings,
                    commit.authored_at.date_naive(),
                )?;
                merge::write_progress_document(&progress_path, &doc)?;
            }
        }

        let text = std::fs::read_to_string(&progress_path).map_err(|e| {
            BackfillError::MergeCommand(format!("no progress file at {}: {e}", progress_path.display()))
        })?;
        let doc = PortsDocument::parse(&text)?;
        Ok(ports::count_document(&doc, &self.settings.done_marker))
    }
}

impl SnapshotReader for CheckoutReader<'_> {
    fn read(&mut self, commit: &CommitRecord) -> Result<Snapshot> {
        let settings = self.settings;
        let tracked: Vec<String> = settings.files.all().map(|p| settings.repo_relative(p)).collect();
        let baseline = settings.repo_relative(&settings.files.baseline);

        let mut present = Vec::new();
        let mut absent = Vec::new();
        for path in &tracked {
            match self.repo.exists_at(&commit.sha, path) {
                Ok(true) => present.push(path.clone()),
                Ok(false) => absent.push(path.clone()),
                Err(e) => return Ok(Snapshot::Skipped(e.to_string())),
            }
        }
        if !present.contains(&baseline) {
            return Ok(Snapshot::Skipped(format!("{baseline} not present")));
        }
        match self.repo.read_text_at(&commit.sha, &baseline) {
            Ok(Some(text)) if !ports::is_blank_document(&text) => {}
            Ok(_) => return Ok(Snapshot::Skipped(format!("{baseline} is empty"))),
            Err(e) => return Ok(Snapshot::Skipped(e.to_string())),
        }

        let progress_file = settings.repo_relative(&settings.progress_file);
        let mut session = CheckoutSession::open(self.git, self.repo, &tracked, &progress_file)?;
        let outcome = self.count_materialized(&mut session, commit, &present, &absent);
        session.restore()?;

        Ok(match outcome {
            Ok(progress) => Snapshot::Counted(progress),
            Err(e) => Snapshot::Skipped(e.to_string()),
        })
    }
}

fn run_merge_command(command: &[String], workdir: &Path) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        return Err(BackfillError::MergeCommand("empty command".to_string()));
    };
    tracing::debug!("running merge command {}", command.join(" "));

    let output = Command::new(program)
        .args(args)
        .current_dir(workdir)
        .output()
        .map_err(|e| BackfillError::MergeCommand(format!("{program}: {e}")))?;
    if !output.status.success() {
        return Err(BackfillError::MergeCommand(format!(
            "{} exited with {}: {}",
            command.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
