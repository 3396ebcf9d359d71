use crate::error::Result;
use gix::{discover, Repository};
use std::path::{Path, PathBuf};

/// Read-only access to the object store of the tracking repository.
pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contents of `path` as of `rev`, or `None` when the path does not
    /// exist there. Equivalent to `git show <rev>:<path>`.
    pub fn read_file_at(&self, rev: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let revspec = format!("{rev}:{path}");
        let id = match self.repo.rev_parse_single(revspec.as_str()) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("{revspec} not found: {e}");
                return Ok(None);
            }
        };

        let object = id.object()?;
        if object.kind != gix::object::Kind::Blob {
            tracing::debug!("{revspec} is a {:?}, not a file", object.kind);
            return Ok(None);
        }
        Ok(Some(object.data.clone()))
    }

    /// Like [`read_file_at`](Self::read_file_at), decoded as UTF-8.
    pub fn read_text_at(&self, rev: &str, path: &str) -> Result<Option<String>> {
        match self.read_file_at(rev, path)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                crate::error::BackfillError::Invalid(format!("{rev}:{path} is not UTF-8: {e}"))
            }),
            None => Ok(None),
        }
    }

    /// Whether `path` exists as of `rev`. Resolves the path without reading
    /// the blob.
    pub fn exists_at(&self, rev: &str, path: &str) -> Result<bool> {
        Ok(self.repo.rev_parse_single(format!("{rev}:{path}").as_str()).is_ok())
    }

    /// Short name of the checked-out branch, or `HEAD` when detached.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        Ok(head
            .referent_name()
            .map(|name| name.shorten().to_string())
            .unwrap_or_else(|| "HEAD".to_string()))
    }

    pub fn head_sha(&self) -> Result<String> {
        let mut head = self.repo.head()?;
        let commit = head.peel_to_commit_in_place()?;
        Ok(commit.id.to_string())
    }
}
