use crate::cli::CommonArgs;
use crate::config::Settings;
use crate::error::{BackfillError, Result};
use crate::git::GitRepo;
use crate::ports::{self, PortsDocument};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use console::style;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub fn exec(common: CommonArgs, output: Option<PathBuf>) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let settings =
        Settings::load(repo.path(), common.config.as_deref()).context("Failed to load settings")?;

    let doc = build_progress_document(&settings, Local::now().date_naive())
        .context("Failed to merge port lists")?;
    let path = output
        .map(|p| settings.absolute(&p))
        .unwrap_or_else(|| settings.progress_path());
    write_progress_document(&path, &doc)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    output_summary(&doc, &settings, &path);
    Ok(())
}

/// Merge the input files as they are in the working tree.
pub fn build_progress_document(settings: &Settings, today: NaiveDate) -> Result<PortsDocument> {
    let files = &settings.files;
    let text = std::fs::read_to_string(settings.absolute(&files.baseline))?;
    if ports::is_blank_document(&text) {
        return Err(BackfillError::Invalid(format!(
            "{} is empty",
            files.baseline.display()
        )));
    }
    let baseline = PortsDocument::parse(&text)?;
    let overrides = read_optional_document(settings, files.overrides.as_deref())?;
    let external = read_optional_document(settings, files.external.as_deref())?;

    let header = baseline.header.clone();
    let merged = ports::merge(baseline, overrides, external, &settings.policy);
    Ok(ports::progress_document(
        header,
        merged,
        &settings.done_marker,
        today,
    ))
}

fn read_optional_document(settings: &Settings, path: Option<&Path>) -> Result<Option<PortsDocument>> {
    let Some(path) = path else {
        return Ok(None);
    };
    match std::fs::read_to_string(settings.absolute(path)) {
        Ok(text) => Ok(Some(PortsDocument::parse(&text)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} not present", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn write_progress_document(path: &Path, doc: &PortsDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_yaml()?)?;
    Ok(())
}

fn output_summary(doc: &PortsDocument, settings: &Settings, path: &Path) {
    let progress = ports::count_document(doc, &settings.done_marker);
    println!(
        "{} {} ports merged into {}",
        style("✓").green(),
        style(progress.total).cyan(),
        style(path.display()).dim()
    );
    println!(
        "  completed: {} ({:.2}%)",
        style(progress.completed).green(),
        progress.percent()
    );
    if let Some(date) = doc
        .header
        .as_ref()
        .and_then(|h| h.get("estimated_completion_date"))
        .and_then(|v| v.as_str())
    {
        println!("  estimated completion: {}", style(date).yellow());
    }
}
