use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle state recorded in a project's metadata header.
///
/// The three known values are matched exactly; anything else is kept
/// verbatim in `Other` so it can still be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Pending" => Status::Pending,
            "In-Progress" => Status::InProgress,
            "Completed" => Status::Completed,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In-Progress",
            Status::Completed => "Completed",
            Status::Other(raw) => raw,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Other(String::new())
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Status::parse(&value)
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One project file after header validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub project: Option<String>,
    pub owner: Option<String>,
    pub team: Option<String>,
    pub status: Status,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    /// Derived on every load; never read back from the file.
    pub estimated_workdays: Option<i64>,
    #[serde(skip)]
    pub body: String,
    pub source: PathBuf,
}

impl Project {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            project: None,
            owner: None,
            team: None,
            status: Status::default(),
            start_date: None,
            due_date: None,
            actual_end_date: None,
            estimated_workdays: None,
            body: String::new(),
            source: PathBuf::new(),
        }
    }

    /// Owner name suitable for routing, if the header names one.
    pub fn routed_owner(&self) -> Option<&str> {
        self.owner
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
    }
}
