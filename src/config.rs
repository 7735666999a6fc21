//! Configuration loaded from `status-board.toml`.
//!
//! Every section is optional; missing keys fall back to the defaults below.

use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::progress::DEFAULT_PROGRESS_HEADING;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the root directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "status-board.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub report: ReportConfig,
    pub calendar: CalendarConfig,
    pub presentation: PresentationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `YYYY-MM-DD-category.md` project files
    pub projects_dir: PathBuf,

    /// Directory receiving one report per owner
    pub people_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum In-Progress entries listed in a person report
    pub in_progress_limit: usize,

    /// Body heading that introduces progress bullets
    pub progress_heading: String,

    pub in_progress_title: String,
    pub pending_title: String,
    pub completed_title: String,
    pub other_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Extra non-working dates. Empty means weekends are the only days off.
    pub holidays: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub width: u32,
    pub height: u32,

    /// Share of the slide width given to the Gantt image
    pub image_width_ratio: f32,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from("projects"),
            people_dir: PathBuf::from("people"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            in_progress_limit: 5,
            progress_heading: DEFAULT_PROGRESS_HEADING.to_string(),
            in_progress_title: "In Progress".to_string(),
            pending_title: "Pending".to_string(),
            completed_title: "Completed".to_string(),
            other_title: "Other".to_string(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1000,
            image_width_ratio: 0.55,
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn calendar(&self) -> WorkCalendar {
        let config = WorkCalendarConfig::new(
            [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            self.calendar.holidays.iter().copied(),
        );
        WorkCalendar::from_config(&config)
    }
}

impl PathsConfig {
    pub fn projects_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.projects_dir)
    }

    pub fn people_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.people_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            "[report]\nin_progress_limit = 3\n\n[calendar]\nholidays = [\"2025-01-01\"]\n",
        )
        .unwrap();
        assert_eq!(config.report.in_progress_limit, 3);
        assert_eq!(config.report.progress_heading, DEFAULT_PROGRESS_HEADING);
        assert_eq!(config.paths, PathsConfig::default());
        assert_eq!(config.calendar().holiday_count(), 1);
    }

    #[test]
    fn holidays_are_not_workdays() {
        let config = Config::from_toml("[calendar]\nholidays = [\"2025-01-01\"]\n").unwrap();
        let new_year = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(!config.calendar().is_available(new_year));
        assert!(Config::default().calendar().is_available(new_year));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }
}
