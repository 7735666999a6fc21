//! Owner and status bucketing.

use crate::project::{Project, Status};
use std::collections::BTreeMap;
use tracing::warn;

/// Report section a project lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusBucket {
    InProgress,
    Pending,
    Completed,
    Other,
}

impl StatusBucket {
    /// Section order in a person report.
    pub const ORDER: [StatusBucket; 4] = [
        StatusBucket::InProgress,
        StatusBucket::Pending,
        StatusBucket::Completed,
        StatusBucket::Other,
    ];
}

impl From<&Status> for StatusBucket {
    fn from(status: &Status) -> Self {
        match status {
            Status::InProgress => StatusBucket::InProgress,
            Status::Pending => StatusBucket::Pending,
            Status::Completed => StatusBucket::Completed,
            Status::Other(_) => StatusBucket::Other,
        }
    }
}

/// One owner's projects split by bucket, each bucket in loader order.
#[derive(Debug, Clone, Default)]
pub struct OwnerSummary<'a> {
    pub owner: String,
    pub in_progress: Vec<&'a Project>,
    pub pending: Vec<&'a Project>,
    pub completed: Vec<&'a Project>,
    pub other: Vec<&'a Project>,
}

impl<'a> OwnerSummary<'a> {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, project: &'a Project) {
        match StatusBucket::from(&project.status) {
            StatusBucket::InProgress => self.in_progress.push(project),
            StatusBucket::Pending => self.pending.push(project),
            StatusBucket::Completed => self.completed.push(project),
            StatusBucket::Other => self.other.push(project),
        }
    }

    pub fn bucket(&self, bucket: StatusBucket) -> &[&'a Project] {
        match bucket {
            StatusBucket::InProgress => &self.in_progress,
            StatusBucket::Pending => &self.pending,
            StatusBucket::Completed => &self.completed,
            StatusBucket::Other => &self.other,
        }
    }

    /// Entries shown in the summary plus how many were held back.
    ///
    /// Only the In-Progress bucket is limited; the cut keeps the newest
    /// entries because buckets preserve the newest-first loader order.
    pub fn visible(&self, bucket: StatusBucket, in_progress_limit: usize) -> (&[&'a Project], usize) {
        let entries = self.bucket(bucket);
        if bucket == StatusBucket::InProgress && entries.len() > in_progress_limit {
            (&entries[..in_progress_limit], entries.len() - in_progress_limit)
        } else {
            (entries, 0)
        }
    }

    /// Every project in report section order.
    pub fn projects(&self) -> impl Iterator<Item = &'a Project> + '_ {
        StatusBucket::ORDER
            .into_iter()
            .flat_map(|bucket| self.bucket(bucket).iter().copied())
    }

    pub fn len(&self) -> usize {
        self.in_progress.len() + self.pending.len() + self.completed.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition projects by owner. Unowned projects are left out with a warning.
pub fn group_by_owner(projects: &[Project]) -> BTreeMap<String, OwnerSummary<'_>> {
    let mut owners: BTreeMap<String, OwnerSummary<'_>> = BTreeMap::new();
    for project in projects {
        let Some(owner) = project.routed_owner() else {
            warn!(
                project = %project.id,
                path = %project.source.display(),
                "project has no owner; excluded from person reports"
            );
            continue;
        };
        owners
            .entry(owner.to_string())
            .or_insert_with(|| OwnerSummary::new(owner))
            .push(project);
    }
    owners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, owner: Option<&str>, status: Status) -> Project {
        let mut project = Project::new(id, format!("title {id}"));
        project.owner = owner.map(str::to_string);
        project.status = status;
        project
    }

    #[test]
    fn groups_by_owner_and_bucket_in_loader_order() {
        let projects = vec![
            project("2025-03-01-b", Some("Mei"), Status::InProgress),
            project("2025-02-01-a", Some("Ken"), Status::Pending),
            project("2025-01-15-c", Some("Mei"), Status::Other("Blocked".into())),
            project("2025-01-01-d", Some("Mei"), Status::InProgress),
            project("2024-12-01-e", None, Status::Completed),
        ];
        let owners = group_by_owner(&projects);
        assert_eq!(owners.keys().collect::<Vec<_>>(), vec!["Ken", "Mei"]);

        let mei = &owners["Mei"];
        let ids: Vec<&str> = mei.in_progress.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2025-03-01-b", "2025-01-01-d"]);
        assert_eq!(mei.other.len(), 1);
        assert_eq!(mei.len(), 3);
        assert!(owners.values().all(|summary| summary.len() < 4));
    }

    #[test]
    fn only_in_progress_is_truncated() {
        let projects: Vec<Project> = (0..7)
            .map(|n| project(&format!("2025-01-0{n}-x"), Some("Mei"), Status::InProgress))
            .chain((0..7).map(|n| project(&format!("2024-01-0{n}-y"), Some("Mei"), Status::Pending)))
            .collect();
        let owners = group_by_owner(&projects);
        let mei = &owners["Mei"];

        let (shown, hidden) = mei.visible(StatusBucket::InProgress, 5);
        assert_eq!(shown.len(), 5);
        assert_eq!(hidden, 2);
        assert_eq!(shown[0].id, "2025-01-00-x");

        let (shown, hidden) = mei.visible(StatusBucket::Pending, 5);
        assert_eq!(shown.len(), 7);
        assert_eq!(hidden, 0);
    }
}
