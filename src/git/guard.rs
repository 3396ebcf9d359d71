//! Pre-flight checks for runs that mutate the working tree.

use super::{Git, GitRepo};
use crate::error::{BackfillError, Result};

/// Proof that the tree was clean and on the tracked branch, holding the tip
/// to return to once the run is over.
#[derive(Debug)]
pub struct SafetyGuard {
    branch: String,
    original_tip: String,
}

impl SafetyGuard {
    pub fn check(git: &Git, repo: &GitRepo, branch: &str) -> Result<Self> {
        let changes = git.tracked_changes()?;
        if !changes.is_empty() {
            return Err(BackfillError::DirtyWorkingTree(changes));
        }

        let current = repo.current_branch()?;
        if current != branch {
            return Err(BackfillError::WrongBranch {
                expected: branch.to_string(),
                found: current,
            });
        }

        let original_tip = repo.head_sha()?;
        tracing::info!("working tree clean on {branch} at {original_tip}");
        Ok(Self {
            branch: branch.to_string(),
            original_tip,
        })
    }

    /// Hard-reset the branch to the tip recorded by [`check`](Self::check).
    pub fn restore(&self, git: &Git) -> Result<()> {
        tracing::debug!("resetting {} to {}", self.branch, self.original_tip);
        git.reset_hard(&self.original_tip)
            .map_err(|e| BackfillError::Restore(e.to_string()))
    }
}
