use crate::backfill::series;
use crate::cli::CommonArgs;
use crate::config::Settings;
use crate::git::GitRepo;
use crate::model::{DataPoint, SeriesSummary};
use anyhow::Context;
use console::style;
use std::path::PathBuf;

pub fn exec(common: CommonArgs, json: bool, ndjson: bool, file: Option<PathBuf>) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let settings =
        Settings::load(repo.path(), common.config.as_deref()).context("Failed to load settings")?;
    let path = file
        .map(|p| settings.absolute(&p))
        .unwrap_or_else(|| settings.output_path());

    let mut points = series::load_series(&path);
    series::sort_series(&mut points);

    if json {
        println!("{}", serde_json::to_string_pretty(&summarize(&points))?);
    } else if ndjson {
        for point in &points {
            println!("{}", serde_json::to_string(point)?);
        }
    } else {
        output_summary(&points, &path);
    }
    Ok(())
}

pub fn summarize(points: &[DataPoint]) -> SeriesSummary {
    let first = points.first();
    let last = points.last();
    let delta = |f: fn(&DataPoint) -> u64| match (first, last) {
        (Some(a), Some(b)) => f(b) as i64 - f(a) as i64,
        _ => 0,
    };

    SeriesSummary {
        points: points.len(),
        first_date: first.map(|p| p.commit_date.clone()),
        last_date: last.map(|p| p.commit_date.clone()),
        latest: last.map(DataPoint::progress),
        latest_percent: last.map(|p| (p.progress().percent() * 100.0).round() / 100.0),
        completed_delta: delta(|p| p.completed),
        total_delta: delta(|p| p.total),
    }
}

fn output_summary(points: &[DataPoint], path: &std::path::Path) {
    println!("{}", style("Adoption Series").bold());
    println!("{}", "─".repeat(50));

    let summary = summarize(points);
    if summary.points == 0 {
        println!("No data points in {}", style(path.display()).dim());
        return;
    }

    println!("Data points: {}", style(summary.points).cyan());
    if let (Some(first), Some(last)) = (&summary.first_date, &summary.last_date) {
        println!(
            "Date range: {} to {}",
            style(first.get(..10).unwrap_or(first)).dim(),
            style(last.get(..10).unwrap_or(last)).dim()
        );
    }
    if let (Some(latest), Some(percent)) = (summary.latest, summary.latest_percent) {
        println!(
            "Latest: {}/{} ports ({:.2}%)",
            style(latest.completed).green(),
            style(latest.total).cyan(),
            percent
        );
    }
    println!(
        "Since first point: {} completed, {} total",
        style(format!("{:+}", summary.completed_delta)).green(),
        style(format!("{:+}", summary.total_delta)).yellow()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_empty_series() {
        let s = summarize(&[]);
        assert_eq!(s.points, 0);
        assert!(s.latest.is_none());
        assert_eq!(s.completed_delta, 0);
    }

    #[test]
    fn summary_deltas_between_first_and_last() {
        let points = vec![
            DataPoint {
                commit_date: "2024-01-01T00:00:00+0000".into(),
                completed: 2,
                total: 10,
            },
            DataPoint {
                commit_date: "2024-06-01T00:00:00+0000".into(),
                completed: 5,
                total: 8,
            },
        ];
        let s = summarize(&points);
        assert_eq!(s.completed_delta, 3);
        assert_eq!(s.total_delta, -2);
        assert_eq!(s.latest_percent, Some(62.5));
        assert_eq!(s.last_date.as_deref(), Some("2024-06-01T00:00:00+0000"));
    }
}
