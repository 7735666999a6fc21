//! Mermaid Gantt definitions for dated projects.

use crate::project::{Project, Status};
use chrono::NaiveDate;
use std::fmt::Write as _;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GanttTag {
    Active,
    Done,
}

impl GanttTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            GanttTag::Active => "active",
            GanttTag::Done => "done",
        }
    }

    fn from_status(status: &Status) -> Option<Self> {
        match status {
            Status::InProgress => Some(GanttTag::Active),
            Status::Completed => Some(GanttTag::Done),
            _ => None,
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "active" => Some(GanttTag::Active),
            "done" => Some(GanttTag::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttRow {
    pub id: String,
    pub title: String,
    pub tag: Option<GanttTag>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GanttChart {
    pub rows: Vec<GanttRow>,
}

/// Words the Mermaid gantt lexer treats as a directive at the start of a
/// line, matched case-insensitively.
const DIRECTIVES: &[&str] = &[
    "accdescr",
    "acctitle",
    "axisformat",
    "click",
    "dateformat",
    "displaymode",
    "excludes",
    "includes",
    "inclusiveenddates",
    "section",
    "tickinterval",
    "title",
    "todaymarker",
    "topaxis",
    "weekday",
    "weekend",
];

/// Prefix that stops a task name from being read as a directive.
const ZERO_WIDTH_SPACE: char = '\u{200B}';

fn starts_with_directive(name: &str) -> bool {
    if name.starts_with("%%") {
        return true;
    }
    let first = name
        .split(|c: char| c.is_whitespace() || c == '：')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    DIRECTIVES.contains(&first.as_str())
}

/// Mermaid reads `:` `#` and `;` as syntax inside a task line.
fn task_name(title: &str) -> String {
    let name = title
        .chars()
        .map(|c| match c {
            ':' => '：',
            '#' => '＃',
            ';' => '；',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string();
    if starts_with_directive(&name) {
        format!("{ZERO_WIDTH_SPACE}{name}")
    } else {
        name
    }
}

fn task_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl GanttChart {
    /// One row per project that has both a start and a due date, in input
    /// order. Undated projects are skipped.
    pub fn from_projects<'a, I>(projects: I) -> Self
    where
        I: IntoIterator<Item = &'a Project>,
    {
        let rows = projects
            .into_iter()
            .filter_map(|project| {
                let (start, due) = (project.start_date?, project.due_date?);
                // Mermaid rejects a bar that ends before it starts.
                let (start, end) = (start.min(due), start.max(due));
                Some(GanttRow {
                    id: task_id(&project.id),
                    title: task_name(&project.title),
                    tag: GanttTag::from_status(&project.status),
                    start,
                    end,
                })
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest start and latest end across all rows.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|row| row.start.min(row.end)).min()?;
        let last = self.rows.iter().map(|row| row.start.max(row.end)).max()?;
        Some((first, last))
    }

    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("gantt\n    dateFormat YYYY-MM-DD\n    axisFormat %m/%d\n");
        for row in &self.rows {
            let tag = row
                .tag
                .map(|tag| format!("{}, ", tag.as_str()))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "    {} :{}{}, {}, {}",
                row.title,
                tag,
                row.id,
                row.start.format(DATE_FORMAT),
                row.end.format(DATE_FORMAT)
            );
        }
        out
    }

    /// Read task rows back out of a definition produced by [`to_mermaid`].
    ///
    /// Directive lines and rows without two explicit dates are skipped.
    ///
    /// [`to_mermaid`]: GanttChart::to_mermaid
    pub fn parse_mermaid(definition: &str) -> Self {
        let rows = definition
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && *line != "gantt")
            .filter_map(|line| {
                let (name, meta) = line.split_once(':')?;
                let tokens: Vec<&str> = meta.split(',').map(str::trim).collect();
                let (tag, rest) = match tokens.split_first() {
                    Some((first, rest)) if GanttTag::parse(first).is_some() => {
                        (GanttTag::parse(first), rest)
                    }
                    _ => (None, tokens.as_slice()),
                };
                let [id, start, end] = rest else {
                    return None;
                };
                Some(GanttRow {
                    id: id.to_string(),
                    title: name.trim().trim_start_matches(ZERO_WIDTH_SPACE).to_string(),
                    tag,
                    start: NaiveDate::parse_from_str(start, DATE_FORMAT).ok()?,
                    end: NaiveDate::parse_from_str(end, DATE_FORMAT).ok()?,
                })
            })
            .collect();
        Self { rows }
    }
}
