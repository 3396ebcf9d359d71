//! Settings: built-in defaults, overridden by `adoption-history.toml`,
//! overridden by command-line flags.

use crate::error::{BackfillError, Result};
use crate::ports::{OverridePolicy, DEFAULT_DONE_MARKER};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "adoption-history.toml";

/// How historical datasets are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Read files from the object store; never touches the working tree.
    #[default]
    Show,
    /// Check the files out into the working tree and restore them afterwards.
    Checkout,
}

/// Repository-relative paths of the data files replayed for each commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFiles {
    pub baseline: PathBuf,
    pub overrides: Option<PathBuf>,
    pub external: Option<PathBuf>,
}

impl TrackedFiles {
    pub fn optional(&self) -> impl Iterator<Item = &PathBuf> {
        self.overrides.iter().chain(self.external.iter())
    }

    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.baseline).chain(self.optional())
    }
}

impl Default for TrackedFiles {
    fn default() -> Self {
        Self {
            baseline: PathBuf::from("data/generated/vcpkg_packages.yml"),
            overrides: Some(PathBuf::from("data/vcpkg_overrides.yml")),
            external: Some(PathBuf::from("data/external_projects.yml")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Working directory of the tracking repository.
    pub root: PathBuf,
    pub branch: String,
    pub strategy: Strategy,
    pub files: TrackedFiles,
    pub progress_file: PathBuf,
    pub output: PathBuf,
    /// Series the run resumes from; the output file when unset.
    pub prior: Option<PathBuf>,
    pub done_marker: String,
    pub policy: OverridePolicy,
    pub merge_command: Option<Vec<String>>,
    pub live_point: bool,
}

impl Settings {
    pub fn defaults(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            branch: "master".to_string(),
            strategy: Strategy::default(),
            files: TrackedFiles::default(),
            progress_file: PathBuf::from("data/progress.yml"),
            output: PathBuf::from("static/data/cumulative_stats.json"),
            prior: None,
            done_marker: DEFAULT_DONE_MARKER.to_string(),
            policy: OverridePolicy::default(),
            merge_command: None,
            live_point: true,
        }
    }

    /// Load settings for the repository at `root`.
    ///
    /// An explicit `config` path must exist; the default file is optional.
    pub fn load(root: &Path, config: Option<&Path>) -> Result<Self> {
        let mut settings = Self::defaults(root);
        let path = match config {
            Some(p) => p.to_path_buf(),
            None => {
                let default = root.join(CONFIG_FILE_NAME);
                if !default.exists() {
                    return Ok(settings);
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| BackfillError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: FileConfig = toml::from_str(&content).map_err(|e| BackfillError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!("loaded settings from {}", path.display());
        file.apply(&mut settings);
        Ok(settings)
    }

    /// Resolve a configured path against the repository root.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_path(&self) -> PathBuf {
        self.absolute(&self.output)
    }

    pub fn prior_path(&self) -> PathBuf {
        self.absolute(self.prior.as_deref().unwrap_or(&self.output))
    }

    pub fn progress_path(&self) -> PathBuf {
        self.absolute(&self.progress_file)
    }

    /// A path as git names it inside the repository: relative, `/`-separated.
    pub fn repo_relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    branch: Option<String>,
    strategy: Option<Strategy>,
    done_marker: Option<String>,
    live_point: Option<bool>,
    merge_command: Option<Vec<String>>,
    #[serde(default)]
    files: FilesConfig,
    overrides: Option<OverridePolicy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilesConfig {
    baseline: Option<PathBuf>,
    overrides: Option<PathBuf>,
    external: Option<PathBuf>,
    progress: Option<PathBuf>,
    output: Option<PathBuf>,
    prior: Option<PathBuf>,
}

/// An empty path in the config file disables an optional input.
fn optional_path(path: PathBuf) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

impl FileConfig {
    fn apply(self, settings: &mut Settings) {
        if let Some(branch) = self.branch {
            settings.branch = branch;
        }
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy;
        }
        if let Some(marker) = self.done_marker {
            settings.done_marker = marker;
        }
        if let Some(live) = self.live_point {
            settings.live_point = live;
        }
        if let Some(cmd) = self.merge_command {
            settings.merge_command = if cmd.is_empty() { None } else { Some(cmd) };
        }
        if let Some(policy) = self.overrides {
            settings.policy = policy;
        }

        let files = self.files;
        if let Some(p) = files.baseline {
            settings.files.baseline = p;
        }
        if let Some(p) = files.overrides {
            settings.files.overrides = optional_path(p);
        }
        if let Some(p) = files.external {
            settings.files.external = optional_path(p);
        }
        if let Some(p) = files.progress {
            settings.progress_file = p;
        }
        if let Some(p) = files.output {
            settings.output = p;
        }
        if let Some(p) = files.prior {
            settings.prior = optional_path(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &Path, body: &str) {
        std::fs::write(dir.join(CONFIG_FILE_NAME), body).unwrap();
    }

    #[test]
    fn defaults_when_no_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.branch, "master");
        assert_eq!(settings.strategy, Strategy::Show);
        assert_eq!(settings.files, TrackedFiles::default());
        assert_eq!(settings.prior_path(), settings.output_path());
    }

    #[test]
    fn legacy_layout_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
strategy = "checkout"
branch = "main"

[files]
baseline = "data/raw_progress.yml"
overrides = "data/progress_overwrite.yml"
external = ""

[overrides]
add_unmatched = true
"#,
        );

        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.strategy, Strategy::Checkout);
        assert_eq!(settings.branch, "main");
        assert_eq!(settings.files.baseline, PathBuf::from("data/raw_progress.yml"));
        assert_eq!(settings.files.external, None);
        assert!(settings.policy.add_unmatched);
        // unspecified policy fields keep their defaults
        assert_eq!(settings.policy.fields, OverridePolicy::default().fields);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "brnach = \"main\"\n");
        assert!(matches!(
            Settings::load(dir.path(), None),
            Err(BackfillError::Config { .. })
        ));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Settings::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn repo_relative_paths_use_forward_slashes() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::defaults(dir.path());
        let inside = dir.path().join("data").join("progress.yml");
        assert_eq!(settings.repo_relative(&inside), "data/progress.yml");
        assert_eq!(
            settings.repo_relative(Path::new("data/vcpkg_overrides.yml")),
            "data/vcpkg_overrides.yml"
        );
    }
}
