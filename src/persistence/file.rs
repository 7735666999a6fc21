use super::{PersistenceError, PersistenceResult};
use crate::calendar::WorkCalendar;
use crate::metadata::{parse_document, rewrite_workdays};
use crate::project::Project;
use crate::project_validation::{dedupe_projects, project_from_document};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

static PROJECT_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}-.+\.md$").expect("project file pattern is valid")
});

/// A project file left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Newest file name first.
    pub projects: Vec<Project>,
    pub skipped: Vec<SkippedFile>,
}

impl LoadOutcome {
    fn skip(&mut self, path: &Path, reason: impl ToString) {
        let reason = reason.to_string();
        warn!(path = %path.display(), %reason, "skipping project file");
        self.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// `YYYY-MM-DD-<category>.md`
pub fn is_project_file_name(name: &str) -> bool {
    PROJECT_FILE_NAME.is_match(name)
}

fn project_paths(dir: &Path, outcome: &mut LoadOutcome) -> PersistenceResult<Vec<PathBuf>> {
    fs::read_dir(dir).map_err(|source| PersistenceError::ProjectDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| b.file_name().cmp(a.file_name()));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                outcome.skip(&path, err);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy();
        if !entry.file_type().is_file() || !is_project_file_name(&name) {
            debug!(path = %entry.path().display(), "not a project file");
            continue;
        }
        paths.push(entry.into_path());
    }
    Ok(paths)
}

fn load_project(path: &Path, calendar: &WorkCalendar) -> Result<Project, String> {
    let content = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let document = parse_document(&content).map_err(|err| err.to_string())?;
    let mut project =
        project_from_document(document, path.to_path_buf()).map_err(|err| err.to_string())?;

    project.estimated_workdays = calendar.estimated_workdays(project.start_date, project.due_date);
    if let Some(workdays) = project.estimated_workdays.filter(|days| *days <= 0) {
        warn!(
            project = %project.id,
            workdays,
            "workday span is zero or negative"
        );
    }
    Ok(project)
}

/// Load every project file in `dir`, newest file name first.
///
/// Only an unreadable directory is an error; individual files that cannot
/// be read or validated are skipped and listed in the outcome.
pub fn load_projects(dir: &Path, calendar: &WorkCalendar) -> PersistenceResult<LoadOutcome> {
    let mut outcome = LoadOutcome::default();
    let mut projects = Vec::new();

    for path in project_paths(dir, &mut outcome)? {
        match load_project(&path, calendar) {
            Ok(project) => projects.push(project),
            Err(reason) => outcome.skip(&path, reason),
        }
    }

    let (kept, duplicates) = dedupe_projects(projects);
    for (project, err) in duplicates {
        outcome.skip(&project.source, err);
    }
    outcome.projects = kept;
    Ok(outcome)
}

/// Store the computed workdays in the project's own header.
///
/// Returns whether the file changed. Projects with unknown workdays are left
/// alone.
pub fn write_back_workdays(project: &Project) -> PersistenceResult<bool> {
    let Some(workdays) = project.estimated_workdays else {
        return Ok(false);
    };
    let path = &project.source;
    let content = fs::read_to_string(path).map_err(|err| PersistenceError::file(path, err))?;
    let rewritten =
        rewrite_workdays(&content, workdays).map_err(|source| PersistenceError::Metadata {
            path: path.clone(),
            source,
        })?;
    if rewritten == content {
        return Ok(false);
    }
    fs::write(path, rewritten).map_err(|err| PersistenceError::file(path, err))?;
    Ok(true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWrite {
    Written,
    Unchanged,
}

fn file_stem_for(owner: &str) -> String {
    let stem: String = owner
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        stem
    }
}

/// `people/<owner>.md`, with characters that are unsafe in file names replaced.
pub fn report_path(people_dir: &Path, owner: &str) -> PathBuf {
    people_dir.join(format!("{}.md", file_stem_for(owner)))
}

/// Replace the owner's report with `content`.
pub fn write_report(people_dir: &Path, owner: &str, content: &str) -> PersistenceResult<ReportWrite> {
    fs::create_dir_all(people_dir).map_err(|err| PersistenceError::file(people_dir, err))?;
    let path = report_path(people_dir, owner);
    if fs::read_to_string(&path).is_ok_and(|existing| existing == content) {
        return Ok(ReportWrite::Unchanged);
    }
    fs::write(&path, content).map_err(|err| PersistenceError::file(&path, err))?;
    Ok(ReportWrite::Written)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectRecord {
    id: String,
    title: String,
    project: String,
    owner: String,
    team: String,
    status: String,
    start_date: String,
    due_date: String,
    actual_end_date: String,
    estimated_workdays: String,
    file: String,
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            project: project.project.clone().unwrap_or_default(),
            owner: project.owner.clone().unwrap_or_default(),
            team: project.team.clone().unwrap_or_default(),
            status: project.status.as_str().to_string(),
            start_date: format_date(project.start_date),
            due_date: format_date(project.due_date),
            actual_end_date: format_date(project.actual_end_date),
            estimated_workdays: format_option_i64(project.estimated_workdays),
            file: project.source.display().to_string(),
        }
    }
}

pub fn save_projects_to_csv<P: AsRef<Path>>(projects: &[Project], path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for project in projects {
        writer.serialize(ProjectRecord::from(project))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_projects_to_json<P: AsRef<Path>>(
    projects: &[Project],
    path: P,
) -> PersistenceResult<()> {
    let records: Vec<ProjectRecord> = projects.iter().map(ProjectRecord::from).collect();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &records)?;
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_option_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
