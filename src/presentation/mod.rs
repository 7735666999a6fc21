//! Single-slide deck built from one person report.
//!
//! The report is treated as an opaque pair: the first `mermaid` block is the
//! diagram definition and everything else is text. The diagram is drawn to a
//! PNG, embedded in the SVG slide as a data URI and also kept next to the
//! report.

pub mod raster;
pub mod slide;
pub mod text;

use crate::config::PresentationConfig;
use crate::gantt::GanttChart;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use image::ImageFormat;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub use raster::{GanttRaster, rasterize_gantt};
pub use slide::{SlideImage, render_slide_svg};
pub use text::{SlideLine, clean_inline, slide_lines};

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("no report at {0}")]
    ReportNotFound(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode gantt image: {0}")]
    Image(#[from] image::ImageError),
}

pub type PresentationResult<T> = Result<T, PresentationError>;

/// Report split into its diagram definition and remaining text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportParts {
    pub title: String,
    pub diagram: Option<String>,
    pub text: String,
}

/// Files produced for one deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDeck {
    pub slide: PathBuf,
    pub image: Option<PathBuf>,
}

fn is_gantt_heading(line: &str) -> bool {
    line.trim()
        .strip_prefix("## ")
        .is_some_and(|rest| rest.trim() == "Gantt")
}

/// Pull the title, the first mermaid block and the non-diagram text out of a
/// person report. The Gantt section, including its timestamp line, is left
/// out of the text.
pub fn split_report(markdown: &str) -> ReportParts {
    let mut title = String::new();
    let mut diagram: Option<String> = None;
    let mut text = String::new();
    let mut in_mermaid = false;
    let mut in_gantt_section = false;
    let mut current_block = String::new();

    for line in markdown.lines() {
        let trimmed = line.trim();
        if in_mermaid {
            if trimmed.starts_with("```") {
                in_mermaid = false;
                if diagram.is_none() {
                    diagram = Some(std::mem::take(&mut current_block));
                }
                current_block.clear();
            } else {
                current_block.push_str(line);
                current_block.push('\n');
            }
            continue;
        }
        if trimmed.starts_with("```mermaid") {
            in_mermaid = true;
            continue;
        }
        if title.is_empty() {
            if let Some(rest) = trimmed.strip_prefix("# ") {
                title = rest.trim().to_string();
                continue;
            }
        }
        if is_gantt_heading(line) {
            in_gantt_section = true;
            continue;
        }
        if in_gantt_section {
            if trimmed.starts_with("## ") {
                in_gantt_section = false;
            } else {
                continue;
            }
        }
        if text.is_empty() && trimmed.is_empty() {
            continue;
        }
        text.push_str(line);
        text.push('\n');
    }

    ReportParts {
        title,
        diagram,
        text,
    }
}

/// Text lines for the slide, led by the generation date.
pub fn deck_lines(parts: &ReportParts, generated_on: NaiveDate) -> Vec<SlideLine> {
    let mut lines = vec![SlideLine {
        text: format!("Generated: {}", generated_on.format("%Y-%m-%d")),
        bold: false,
        indent: 0,
    }];
    lines.extend(slide_lines(&parts.text));
    lines
}

fn report_stem(report: &Path) -> String {
    report
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string())
}

fn sibling(report: &Path, suffix: &str) -> PathBuf {
    report.with_file_name(format!("{}{suffix}", report_stem(report)))
}

/// Render `people/<owner>.md` into `<owner>.slide.svg`, plus
/// `<owner>.gantt.png` when the report has dated projects.
pub fn render_deck(
    report: &Path,
    config: &PresentationConfig,
    generated_on: NaiveDate,
) -> PresentationResult<SlideDeck> {
    let markdown = fs::read_to_string(report).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            PresentationError::ReportNotFound(report.to_path_buf())
        } else {
            PresentationError::Io {
                path: report.to_path_buf(),
                source,
            }
        }
    })?;
    let parts = split_report(&markdown);

    let chart = parts
        .diagram
        .as_deref()
        .map(GanttChart::parse_mermaid)
        .unwrap_or_default();

    let mut image_path = None;
    let mut slide_image = None;
    if let Some(raster) = rasterize_gantt(&chart, generated_on) {
        let mut png = Vec::new();
        raster
            .image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        let path = sibling(report, ".gantt.png");
        fs::write(&path, &png).map_err(|source| PresentationError::Io {
            path: path.clone(),
            source,
        })?;
        let labels = chart
            .rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| Some((row.title.clone(), raster.row_center(index)?)))
            .collect();
        slide_image = Some(SlideImage {
            href: format!("data:image/png;base64,{}", STANDARD.encode(&png)),
            width: raster.image.width(),
            height: raster.image.height(),
            gutter: raster.gutter,
            labels,
        });
        image_path = Some(path);
    }

    let title = if parts.title.is_empty() {
        report_stem(report)
    } else {
        parts.title.clone()
    };
    let svg = render_slide_svg(
        &title,
        &deck_lines(&parts, generated_on),
        slide_image.as_ref(),
        config,
    );
    let slide_path = sibling(report, ".slide.svg");
    fs::write(&slide_path, svg).map_err(|source| PresentationError::Io {
        path: slide_path.clone(),
        source,
    })?;
    info!(slide = %slide_path.display(), "slide written");

    Ok(SlideDeck {
        slide: slide_path,
        image: image_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "# Mei\n\n## Gantt\n\n```mermaid\ngantt\n    dateFormat YYYY-MM-DD\n    A :active, a, 2025-03-03, 2025-03-07\n```\n\n_Gantt generated on 2025-03-10_\n\n## In Progress\n\n### A\n- Workdays: 5\n";

    #[test]
    fn report_splits_into_diagram_and_text() {
        let parts = split_report(REPORT);
        assert_eq!(parts.title, "Mei");
        assert_eq!(
            parts.diagram.as_deref(),
            Some("gantt\n    dateFormat YYYY-MM-DD\n    A :active, a, 2025-03-03, 2025-03-07\n")
        );
        assert_eq!(parts.text, "## In Progress\n\n### A\n- Workdays: 5\n");
    }

    #[test]
    fn generation_date_leads_the_text() {
        let parts = split_report(REPORT);
        let lines = deck_lines(&parts, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert_eq!(lines[0].text, "Generated: 2025-03-11");
        assert!(lines[1].bold);
        assert_eq!(lines[1].text, "In Progress");
    }
}
