use super::checkout::CheckoutReader;
use super::engine::{self, collect_points};
use super::output::{self, Reporter};
use super::reader::{ShowReader, SnapshotReader};
use super::series;
use crate::cli::{BackfillArgs, CommonArgs};
use crate::config::{Settings, Strategy};
use crate::dates;
use crate::git::{Git, GitRepo, SafetyGuard};
use crate::model::{CommitRecord, DataPoint};
use anyhow::Context;

pub fn exec(common: CommonArgs, args: BackfillArgs) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let mut settings =
        Settings::load(repo.path(), common.config.as_deref()).context("Failed to load settings")?;
    args.apply(&mut settings);
    let git = Git::new(repo.path());

    let guard = match settings.strategy {
        Strategy::Checkout => Some(
            SafetyGuard::check(&git, &repo, &settings.branch)
                .context("Refusing to check out historical files")?,
        ),
        Strategy::Show => None,
    };

    let mut prior = series::load_series(&settings.prior_path());
    series::normalize_dates(&mut prior);
    let resume = series::resume_point(&prior);
    output::print_start(settings.strategy, &settings.branch, resume.as_ref());

    let commits = git
        .list_commits(&settings.branch, resume.as_ref())
        .with_context(|| format!("Failed to list commits on {}", settings.branch))?;
    output::print_commit_count(commits.len(), &settings.branch);

    let new_points = match &guard {
        Some(guard) => {
            let mut reader = CheckoutReader::new(&git, &repo, &settings);
            let collected = process(&commits, &mut reader);
            // the branch goes back to its original tip even after a fatal error
            let restored = guard.restore(&git);
            let points = collected?;
            restored.context("Failed to reset the working tree")?;
            points
        }
        None => {
            let mut reader = ShowReader::new(&repo, &settings);
            process(&commits, &mut reader)?
        }
    };

    let live = if settings.live_point {
        engine::live_point(&settings.progress_path(), &settings.done_marker)
    } else {
        None
    };
    let done = engine::finalize_series(prior, new_points, live, &dates::now());

    let output_path = settings.output_path();
    series::write_series(&output_path, &done.series)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    output::print_summary(&done, &output_path);
    Ok(())
}

fn process<R: SnapshotReader + ?Sized>(
    commits: &[CommitRecord],
    reader: &mut R,
) -> anyhow::Result<Vec<DataPoint>> {
    if commits.is_empty() {
        return Ok(Vec::new());
    }
    let reporter = Reporter::new(commits.len());
    let points = collect_points(commits, reader, |step| reporter.step(&step));
    reporter.finish();
    points.context("Backfill aborted")
}
