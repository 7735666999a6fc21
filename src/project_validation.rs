use crate::metadata::RawDocument;
use crate::project::{Project, Status};
use chrono::NaiveDate;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` must be a plain value, not a list or mapping")]
    NotScalar(&'static str),
    #[error("duplicate project id {id} (already defined by {first})")]
    DuplicateId { id: String, first: String },
}

/// Scalar header value as text. Blank strings and nulls count as "not set".
fn scalar_text(
    header: &Mapping,
    field: &'static str,
) -> Result<Option<String>, ProjectValidationError> {
    let Some(value) = header.get(field) else {
        return Ok(None);
    };
    scalar_value_text(value).ok_or(ProjectValidationError::NotScalar(field))
}

fn scalar_value_text(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(text) => {
            let text = text.trim();
            Some((!text.is_empty()).then(|| text.to_string()))
        }
        Value::Number(number) => Some(Some(number.to_string())),
        Value::Bool(flag) => Some(Some(flag.to_string())),
        Value::Tagged(tagged) => scalar_value_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn required_text(header: &Mapping, field: &'static str) -> Result<String, ProjectValidationError> {
    scalar_text(header, field)?.ok_or(ProjectValidationError::MissingField(field))
}

/// Date fields degrade to "not set" when they cannot be read.
fn date_field(header: &Mapping, field: &'static str, id: &str) -> Option<NaiveDate> {
    let raw = match scalar_text(header, field) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(project = id, %err, "ignoring date field");
            return None;
        }
    };
    match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            warn!(project = id, field, value = %raw, %err, "unparsable date treated as not set");
            None
        }
    }
}

/// Build a typed project from a parsed header and body.
///
/// `id` and `title` are required. `estimated_workdays` is not read here; it is
/// derived by the loader.
pub fn project_from_document(
    document: RawDocument,
    source: PathBuf,
) -> Result<Project, ProjectValidationError> {
    let header = &document.header;
    let id = required_text(header, "id")?;
    let title = required_text(header, "title")?;

    let mut project = Project::new(id, title);
    project.project = scalar_text(header, "project")?;
    project.owner = scalar_text(header, "owner")?;
    project.team = scalar_text(header, "team")?;
    project.status = scalar_text(header, "status")?
        .map(|raw| Status::parse(&raw))
        .unwrap_or_default();
    project.start_date = date_field(header, "start_date", &project.id);
    project.due_date = date_field(header, "due_date", &project.id);
    project.actual_end_date = date_field(header, "actual_end_date", &project.id);
    project.body = document.body;
    project.source = source;
    Ok(project)
}

/// Keep the first project for each id and report the rest as duplicates.
pub fn dedupe_projects(
    projects: Vec<Project>,
) -> (Vec<Project>, Vec<(Project, ProjectValidationError)>) {
    let mut first_seen: HashMap<String, PathBuf> = HashMap::with_capacity(projects.len());
    let mut kept = Vec::with_capacity(projects.len());
    let mut duplicates = Vec::new();

    for project in projects {
        if let Some(first) = first_seen.get(&project.id) {
            let err = ProjectValidationError::DuplicateId {
                id: project.id.clone(),
                first: first.display().to_string(),
            };
            duplicates.push((project, err));
            continue;
        }
        first_seen.insert(project.id.clone(), project.source.clone());
        kept.push(project);
    }
    (kept, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_document;

    fn build(content: &str) -> Result<Project, ProjectValidationError> {
        let document = parse_document(content).expect("header parses");
        project_from_document(document, PathBuf::from("projects/test.md"))
    }

    #[test]
    fn typed_fields_are_coerced() {
        let project = build(
            "---\nid: 2025-03-03-infra\ntitle: Rack migration\nproject: DC refresh\nowner: Mei\nstatus: In-Progress\nstart_date: 2025-03-03\ndue_date: '2025-03-14'\nactual_end_date: \"\"\nestimated_workdays: 99\n---\nbody\n",
        )
        .unwrap();
        assert_eq!(project.id, "2025-03-03-infra");
        assert_eq!(project.status, Status::InProgress);
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2025, 3, 3));
        assert_eq!(project.due_date, NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(project.actual_end_date, None);
        assert_eq!(project.estimated_workdays, None);
        assert_eq!(project.body, "body\n");
    }

    #[test]
    fn missing_identity_is_rejected() {
        assert_eq!(
            build("---\ntitle: No id\n---\n").unwrap_err(),
            ProjectValidationError::MissingField("id")
        );
        assert_eq!(
            build("---\nid: x\ntitle: '  '\n---\n").unwrap_err(),
            ProjectValidationError::MissingField("title")
        );
        assert_eq!(
            build("---\nid: [a, b]\ntitle: t\n---\n").unwrap_err(),
            ProjectValidationError::NotScalar("id")
        );
    }

    #[test]
    fn bad_dates_degrade_to_unset() {
        let project = build("---\nid: x\ntitle: t\nstart_date: next week\n---\n").unwrap();
        assert_eq!(project.start_date, None);
        assert_eq!(project.status, Status::Other(String::new()));
    }

    #[test]
    fn later_duplicates_are_dropped() {
        let mut first = Project::new("dup", "first");
        first.source = PathBuf::from("b.md");
        let mut second = Project::new("dup", "second");
        second.source = PathBuf::from("a.md");
        let (kept, duplicates) = dedupe_projects(vec![first, second]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "first");
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].0.title, "second");
    }
}
