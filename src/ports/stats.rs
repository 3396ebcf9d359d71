//! Header statistics written into the merged progress file.

use super::{PortSet, PortsDocument};
use chrono::{Duration, NaiveDate};
use serde_yaml::{Mapping, Value};

const DAYS_PER_MONTH: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderStats {
    pub total_projects: u64,
    pub completed_projects: u64,
    pub progress_percent: f64,
    pub estimated_completion_date: Option<NaiveDate>,
}

impl HeaderStats {
    pub fn compute(ports: &PortSet, done_marker: &str, today: NaiveDate) -> Self {
        let progress = ports.progress(done_marker);
        let support_dates: Vec<NaiveDate> = ports
            .iter()
            .filter(|p| p.status() == Some(done_marker))
            .filter_map(|p| p.field_str("modules_support_date"))
            .filter_map(parse_support_date)
            .collect();

        Self {
            total_projects: progress.total,
            completed_projects: progress.completed,
            progress_percent: (progress.percent() * 100.0).round() / 100.0,
            estimated_completion_date: estimate_completion(
                &support_dates,
                progress.total,
                progress.completed,
                today,
            ),
        }
    }

    fn write_into(&self, header: &mut Mapping) {
        header.insert("total_projects".into(), self.total_projects.into());
        header.insert("completed_projects".into(), self.completed_projects.into());
        header.insert("progress_percent".into(), self.progress_percent.into());
        if let Some(date) = self.estimated_completion_date {
            header.insert(
                "estimated_completion_date".into(),
                Value::String(date.format("%Y-%m-%d").to_string()),
            );
        }
    }
}

/// Accepts `2020/6/23` as well as `2020-06-23`.
fn parse_support_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Project the completion date from the average adoption rate since the
/// earliest recorded support date.
pub fn estimate_completion(
    support_dates: &[NaiveDate],
    total: u64,
    completed: u64,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let oldest = support_dates.iter().min()?;
    let months_passed = (today - *oldest).num_days() as f64 / DAYS_PER_MONTH;
    if months_passed <= 0.0 {
        return None;
    }

    let monthly_rate = support_dates.len() as f64 / months_passed;
    let remaining = total.saturating_sub(completed) as f64;
    let days = (remaining / monthly_rate * DAYS_PER_MONTH).round();
    if !days.is_finite() || days >= i64::MAX as f64 {
        return None;
    }
    today.checked_add_signed(Duration::try_days(days as i64)?)
}

/// Build the merged progress document: the baseline header extended with
/// the statistics, followed by every merged port.
pub fn progress_document(
    baseline_header: Option<Mapping>,
    ports: PortSet,
    done_marker: &str,
    today: NaiveDate,
) -> PortsDocument {
    let stats = HeaderStats::compute(&ports, done_marker, today);
    let mut header = baseline_header.unwrap_or_default();
    stats.write_into(&mut header);
    PortsDocument {
        header: Some(header),
        ports: ports.into_ports(),
    }
}
