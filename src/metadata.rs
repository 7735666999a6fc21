//! Metadata header handling for project files.
//!
//! A project file opens with a `---` line, carries YAML key/value pairs, and
//! closes the header with another `---` (or `...`) line. Everything after the
//! closing line is the Markdown body.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::ops::Range;
use std::sync::LazyLock;
use thiserror::Error;

static WORKDAYS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^estimated_workdays:[^\r\n]*").expect("workdays pattern is valid")
});

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("file does not start with a `---` metadata delimiter")]
    MissingOpeningDelimiter,
    #[error("metadata header is never closed")]
    UnterminatedHeader,
    #[error("invalid YAML in metadata header: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("metadata header must be a key/value mapping")]
    NotAMapping,
}

pub type MetadataResult<T> = Result<T, MetadataError>;

/// A project file split into its raw header mapping and raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub header: Mapping,
    pub body: String,
}

#[derive(Debug)]
struct HeaderSpan {
    header: Range<usize>,
    body_start: usize,
    line_ending: &'static str,
}

fn locate_header(content: &str) -> MetadataResult<HeaderSpan> {
    let mut offset = if content.starts_with(BOM) {
        BOM.len_utf8()
    } else {
        0
    };
    let mut lines = content[offset..].split_inclusive('\n');

    let opening = lines.next().ok_or(MetadataError::MissingOpeningDelimiter)?;
    if opening.trim_end() != "---" {
        return Err(MetadataError::MissingOpeningDelimiter);
    }
    let line_ending = if opening.ends_with("\r\n") { "\r\n" } else { "\n" };
    offset += opening.len();
    let header_start = offset;

    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Ok(HeaderSpan {
                header: header_start..offset,
                body_start: offset + line.len(),
                line_ending,
            });
        }
        offset += line.len();
    }
    Err(MetadataError::UnterminatedHeader)
}

/// Split a project file into its header mapping and body text.
pub fn parse_document(content: &str) -> MetadataResult<RawDocument> {
    let span = locate_header(content)?;
    let header_text = &content[span.header.clone()];

    let header = if header_text.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(header_text)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => return Err(MetadataError::NotAMapping),
        }
    };

    Ok(RawDocument {
        header,
        body: content[span.body_start..].to_string(),
    })
}

/// Rewrite the `estimated_workdays` header line, appending it to the header
/// when absent. The body is returned untouched.
pub fn rewrite_workdays(content: &str, workdays: i64) -> MetadataResult<String> {
    let span = locate_header(content)?;
    let header_text = &content[span.header.clone()];
    let line = format!("estimated_workdays: {workdays}");

    let new_header = if WORKDAYS_LINE.is_match(header_text) {
        WORKDAYS_LINE
            .replace(header_text, regex::NoExpand(line.as_str()))
            .into_owned()
    } else {
        let mut header = header_text.to_string();
        if !header.is_empty() && !header.ends_with('\n') {
            header.push_str(span.line_ending);
        }
        header.push_str(&line);
        header.push_str(span.line_ending);
        header
    };

    let mut rewritten = String::with_capacity(content.len() + line.len());
    rewritten.push_str(&content[..span.header.start]);
    rewritten.push_str(&new_header);
    rewritten.push_str(&content[span.header.end..]);
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "---\nid: 2025-01-06-infra\ntitle: Rack migration\nestimated_workdays: 0\n---\n# Notes\nbody text\n";

    #[test]
    fn splits_header_and_body() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(
            doc.header.get("title").and_then(Value::as_str),
            Some("Rack migration")
        );
        assert_eq!(doc.body, "# Notes\nbody text\n");
    }

    #[test]
    fn missing_delimiters_are_errors() {
        assert!(matches!(
            parse_document("id: x\n"),
            Err(MetadataError::MissingOpeningDelimiter)
        ));
        assert!(matches!(
            parse_document("---\nid: x\n"),
            Err(MetadataError::UnterminatedHeader)
        ));
    }

    #[test]
    fn scalar_header_is_rejected() {
        assert!(matches!(
            parse_document("---\njust text\n---\n"),
            Err(MetadataError::NotAMapping)
        ));
    }

    #[test]
    fn rewrite_replaces_existing_line_only_in_header() {
        let content = "---\nid: a\nestimated_workdays: 3\n---\nestimated_workdays: keep me\n";
        let rewritten = rewrite_workdays(content, 12).unwrap();
        assert_eq!(
            rewritten,
            "---\nid: a\nestimated_workdays: 12\n---\nestimated_workdays: keep me\n"
        );
    }

    #[test]
    fn rewrite_appends_missing_line_and_keeps_crlf() {
        let content = "---\r\nid: a\r\n---\r\nbody\r\n";
        let rewritten = rewrite_workdays(content, 4).unwrap();
        assert_eq!(
            rewritten,
            "---\r\nid: a\r\nestimated_workdays: 4\r\n---\r\nbody\r\n"
        );
    }

    #[test]
    fn rewrite_is_stable_when_value_matches() {
        let once = rewrite_workdays(SAMPLE, 5).unwrap();
        let twice = rewrite_workdays(&once, 5).unwrap();
        assert_eq!(once, twice);
    }
}
