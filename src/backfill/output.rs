use super::engine::{Finalized, Step};
use super::reader::Snapshot;
use crate::config::Strategy;
use crate::dates::Timestamp;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Per-commit progress lines above a progress bar.
pub struct Reporter {
    bar: ProgressBar,
}

impl Reporter {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    pub fn step(&self, step: &Step<'_>) {
        let position = style(format!("{}/{}", step.index + 1, step.total)).cyan();
        let date = step.commit.authored_at.format("%Y-%m-%d");
        let marker = match step.snapshot {
            Snapshot::Counted(p) => style(format!("✓ {}/{}", p.completed, p.total)).green(),
            Snapshot::Skipped(_) => style("skipped".to_string()).yellow(),
        };
        let line = format!("{position} {} ({date})... {marker}", step.commit.short_sha());

        self.bar.suspend(|| println!("{line}"));
        self.bar.set_message(step.commit.short_sha().to_string());
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub fn print_start(strategy: Strategy, branch: &str, resume: Option<&Timestamp>) {
    println!(
        "{}",
        style("Computing historical completion status...").cyan().bold()
    );
    let mode = match strategy {
        Strategy::Show => "reading history from the object store",
        Strategy::Checkout => "checking files out into the working tree",
    };
    println!("  {} on {}", style(mode).dim(), style(branch).bold());
    if let Some(resume) = resume {
        println!("  latest data point: {}", style(resume.format("%Y-%m-%d")).blue());
    }
}

pub fn print_commit_count(count: usize, branch: &str) {
    if count == 0 {
        println!("{}", style(format!("No new commits on {branch}.")).blue());
    } else {
        println!(
            "{}",
            style(format!("Processing {count} commits from {branch}...")).cyan()
        );
    }
}

pub fn print_summary(done: &Finalized, output: &Path) {
    if let Some(live) = &done.live {
        println!(
            "{}",
            style(format!("Added current state: {}/{}", live.completed, live.total)).green()
        );
    }
    println!(
        "{} {} data points written to {}",
        style("✓").green(),
        style(done.series.len()).green().bold(),
        style(output.display()).dim()
    );
    if done.added > 0 {
        println!("  {}", style(format!("(+{} new)", done.added)).cyan());
    }
}
