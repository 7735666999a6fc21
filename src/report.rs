//! Person report assembly and the regenerate-everything run.

use crate::aggregate::{OwnerSummary, StatusBucket, group_by_owner};
use crate::config::{Config, ReportConfig};
use crate::gantt::GanttChart;
use crate::persistence::{
    PersistenceResult, ReportWrite, load_projects, report_path, write_back_workdays, write_report,
};
use crate::progress::extract_progress;
use crate::project::{Project, Status};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, warn};

const NOT_SET: &str = "—";

/// Counters for one regenerate run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub projects_loaded: usize,
    pub files_skipped: usize,
    pub unowned: usize,
    pub workdays_updated: usize,
    pub reports_written: usize,
    pub reports_unchanged: usize,
    pub failed_owners: Vec<String>,
}

impl RunSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("projects={}", self.projects_loaded));
        parts.push(format!("skipped={}", self.files_skipped));
        if self.unowned > 0 {
            parts.push(format!("unowned={}", self.unowned));
        }
        parts.push(format!("workdays_updated={}", self.workdays_updated));
        parts.push(format!(
            "owners={}",
            self.reports_written + self.reports_unchanged
        ));
        if self.reports_unchanged > 0 {
            parts.push(format!("unchanged={}", self.reports_unchanged));
        }
        parts.push(format!("failed={}", self.failed_owners.len()));
        if !self.failed_owners.is_empty() {
            parts.push(format!("failed_owners={}", self.failed_owners.join("|")));
        }
        parts.join(", ")
    }
}

fn bucket_title(config: &ReportConfig, bucket: StatusBucket) -> &str {
    match bucket {
        StatusBucket::InProgress => &config.in_progress_title,
        StatusBucket::Pending => &config.pending_title,
        StatusBucket::Completed => &config.completed_title,
        StatusBucket::Other => &config.other_title,
    }
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_SET.to_string())
}

/// Workday count as shown in reports.
pub fn workdays_label(workdays: Option<i64>) -> String {
    workdays
        .map(|days| days.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Gantt definition block plus the rendering date line.
pub fn render_gantt_section(chart: &GanttChart, generated_on: NaiveDate) -> String {
    let mut out = String::from("## Gantt\n\n");
    if chart.is_empty() {
        out.push_str("_No dated projects_\n\n");
    } else {
        out.push_str("```mermaid\n");
        out.push_str(&chart.to_mermaid());
        out.push_str("```\n\n");
    }
    let _ = writeln!(out, "_Gantt generated on {}_", generated_on.format("%Y-%m-%d"));
    out
}

fn blank_line(out: &mut String) {
    while !out.ends_with("\n\n") {
        out.push('\n');
    }
}

fn render_entry(out: &mut String, project: &Project, config: &ReportConfig) {
    let _ = writeln!(out, "### {}", project.title);
    let _ = writeln!(
        out,
        "- Project: {}",
        project.project.as_deref().unwrap_or(NOT_SET)
    );
    if let Status::Other(raw) = &project.status {
        let raw = if raw.is_empty() { NOT_SET } else { raw.as_str() };
        let _ = writeln!(out, "- Status: {raw}");
    }
    let _ = writeln!(
        out,
        "- Start: {} / Due: {}",
        date_or_dash(project.start_date),
        date_or_dash(project.due_date)
    );
    if project.actual_end_date.is_some() {
        let _ = writeln!(out, "- Actual end: {}", date_or_dash(project.actual_end_date));
    }
    let _ = writeln!(out, "- Workdays: {}", workdays_label(project.estimated_workdays));

    if project.status == Status::InProgress {
        let excerpt = extract_progress(&project.body, &project.status, &config.progress_heading);
        if excerpt.is_empty() {
            let _ = writeln!(out, "- Progress: {NOT_SET}");
        } else {
            out.push_str("- Progress:\n");
            for line in excerpt {
                let _ = writeln!(out, "  {line}");
            }
        }
    }
    out.push('\n');
}

/// Markdown report for one owner: Gantt first, then the status sections in
/// fixed order. Output depends only on the projects, the config and
/// `generated_on`.
pub fn render_owner_report(
    summary: &OwnerSummary<'_>,
    config: &ReportConfig,
    generated_on: NaiveDate,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", summary.owner);

    let chart = GanttChart::from_projects(summary.projects());
    out.push_str(&render_gantt_section(&chart, generated_on));

    for bucket in StatusBucket::ORDER {
        if bucket == StatusBucket::Other && summary.other.is_empty() {
            continue;
        }
        blank_line(&mut out);
        let _ = writeln!(out, "## {}\n", bucket_title(config, bucket));
        let (shown, hidden) = summary.visible(bucket, config.in_progress_limit);
        if shown.is_empty() && hidden == 0 {
            out.push_str("- None\n");
            continue;
        }
        for project in shown {
            render_entry(&mut out, project, config);
        }
        if hidden > 0 {
            let _ = writeln!(out, "_…and {hidden} more in-progress projects_");
        }
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push('\n');
    out
}

/// Load every project under `root`, refresh stored workdays and rewrite one
/// report per owner.
///
/// Only an unreadable project directory aborts the run. A failed write-back
/// or a failed report write is logged and counted, and the run moves on.
pub fn generate_reports(
    root: &Path,
    config: &Config,
    generated_on: NaiveDate,
) -> PersistenceResult<RunSummary> {
    let calendar = config.calendar();
    let projects_dir = config.paths.projects_dir(root);
    let people_dir = config.paths.people_dir(root);

    let outcome = load_projects(&projects_dir, &calendar)?;
    let mut summary = RunSummary {
        projects_loaded: outcome.projects.len(),
        files_skipped: outcome.skipped.len(),
        ..RunSummary::default()
    };

    for project in &outcome.projects {
        match write_back_workdays(project) {
            Ok(true) => summary.workdays_updated += 1,
            Ok(false) => {}
            Err(err) => warn!(project = %project.id, %err, "could not store estimated_workdays"),
        }
    }

    summary.unowned = outcome
        .projects
        .iter()
        .filter(|project| project.routed_owner().is_none())
        .count();

    // Case-folded: `Mei` and `mei` share a file on case-insensitive filesystems.
    let mut claimed: HashMap<String, String> = HashMap::new();
    for (owner, owner_summary) in group_by_owner(&outcome.projects) {
        let path = report_path(&people_dir, &owner);
        let key = path.to_string_lossy().to_lowercase();
        if let Some(first) = claimed.get(&key) {
            warn!(
                owner = %owner,
                first_owner = %first,
                path = %path.display(),
                "report path already taken by another owner"
            );
            summary.failed_owners.push(owner);
            continue;
        }
        claimed.insert(key, owner.clone());

        let content = render_owner_report(&owner_summary, &config.report, generated_on);
        match write_report(&people_dir, &owner, &content) {
            Ok(ReportWrite::Written) => {
                info!(owner = %owner, path = %path.display(), "report written");
                summary.reports_written += 1;
            }
            Ok(ReportWrite::Unchanged) => summary.reports_unchanged += 1,
            Err(err) => {
                warn!(owner = %owner, %err, "could not write person report");
                summary.failed_owners.push(owner);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_line_lists_failures() {
        let summary = RunSummary {
            projects_loaded: 4,
            files_skipped: 1,
            workdays_updated: 2,
            reports_written: 1,
            failed_owners: vec!["Ken".into()],
            ..RunSummary::default()
        };
        assert_eq!(
            summary.to_cli_summary(),
            "projects=4, skipped=1, workdays_updated=2, owners=1, failed=1, failed_owners=Ken"
        );
    }

    #[test]
    fn empty_gantt_still_carries_timestamp() {
        let section = render_gantt_section(&GanttChart::default(), d(2025, 3, 10));
        assert_eq!(
            section,
            "## Gantt\n\n_No dated projects_\n\n_Gantt generated on 2025-03-10_\n"
        );
    }

    #[test]
    fn report_lists_entries_with_progress_and_placeholders() {
        let mut active = Project::new("2025-03-03-infra", "Rack migration");
        active.owner = Some("Mei".into());
        active.project = Some("DC refresh".into());
        active.status = Status::InProgress;
        active.start_date = Some(d(2025, 3, 3));
        active.due_date = Some(d(2025, 3, 14));
        active.estimated_workdays = Some(10);
        active.body = "## 進度報告\n- 2025-03-04: rails ordered\n".into();

        let mut waiting = Project::new("2025-02-01-docs", "Runbook rewrite");
        waiting.owner = Some("Mei".into());
        waiting.status = Status::Pending;

        let projects = vec![active, waiting];
        let owners = group_by_owner(&projects);
        let report = render_owner_report(&owners["Mei"], &ReportConfig::default(), d(2025, 3, 10));

        let expected = "\
# Mei

## Gantt

```mermaid
gantt
    dateFormat YYYY-MM-DD
    axisFormat %m/%d
    Rack migration :active, 2025-03-03-infra, 2025-03-03, 2025-03-14
```

_Gantt generated on 2025-03-10_

## In Progress

### Rack migration
- Project: DC refresh
- Start: 2025-03-03 / Due: 2025-03-14
- Workdays: 10
- Progress:
  - 2025-03-04: rails ordered

## Pending

### Runbook rewrite
- Project: —
- Start: — / Due: —
- Workdays: unknown

## Completed

- None
";
        assert_eq!(report, expected);
    }
}
