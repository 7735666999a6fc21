pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod gantt;
pub mod metadata;
pub mod persistence;
pub mod presentation;
pub mod progress;
pub mod project;
pub mod project_validation;
pub mod report;

pub use aggregate::{OwnerSummary, StatusBucket, group_by_owner};
pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use config::{Config, ConfigError};
pub use gantt::{GanttChart, GanttRow, GanttTag};
pub use metadata::{MetadataError, RawDocument, parse_document, rewrite_workdays};
pub use persistence::{
    LoadOutcome, PersistenceError, PersistenceResult, SkippedFile, load_projects,
    save_projects_to_csv, save_projects_to_json,
};
pub use presentation::{PresentationError, SlideDeck, render_deck};
pub use progress::{DEFAULT_PROGRESS_HEADING, extract_progress};
pub use project::{Project, Status};
pub use project_validation::ProjectValidationError;
pub use report::{RunSummary, generate_reports, render_owner_report};
