//! Progress-report excerpts for in-progress projects.

use crate::project::Status;
use markdown::ParseOptions;
use markdown::mdast::Node;
use tracing::warn;

/// Heading that introduces the dated progress bullets in a project body.
pub const DEFAULT_PROGRESS_HEADING: &str = "進度報告";

/// Source lines of every list item under the first heading containing
/// `section_heading`, in document order.
///
/// Items are sliced from the body by their parsed source span, so wrapped
/// continuation lines and nested items come through verbatim apart from
/// trailing whitespace. The section ends at the next heading of the same or
/// a higher level; headings and lists inside code blocks are not seen. An
/// absent section yields an empty list.
pub fn extract_section_items(body: &str, section_heading: &str) -> Vec<String> {
    let root = match markdown::to_mdast(body, &ParseOptions::default()) {
        Ok(root) => root,
        Err(err) => {
            warn!(%err, "project body is not parseable markdown; no progress excerpt");
            return Vec::new();
        }
    };
    let Some(blocks) = root.children() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    let mut section_depth: Option<u8> = None;
    for block in blocks {
        match (block, section_depth) {
            (Node::Heading(heading), Some(open)) if heading.depth <= open => break,
            (Node::Heading(heading), None) if block.to_string().contains(section_heading) => {
                section_depth = Some(heading.depth);
            }
            (Node::List(list), Some(_)) => {
                for item in &list.children {
                    if let Some(position) = item.position() {
                        push_source_lines(&mut items, body, position.start.offset, position.end.offset);
                    }
                }
            }
            _ => {}
        }
    }
    items
}

/// Lines of `body[start..end]`, widened to the start of the first line so
/// leading indentation is kept. Blank lines inside loose items are dropped.
fn push_source_lines(items: &mut Vec<String>, body: &str, start: usize, end: usize) {
    let end = end.min(body.len());
    let line_start = body[..start.min(end)].rfind('\n').map_or(0, |newline| newline + 1);
    items.extend(
        body[line_start..end]
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string),
    );
}

/// Progress excerpt for a project; only In-Progress projects carry one.
pub fn extract_progress(body: &str, status: &Status, section_heading: &str) -> Vec<String> {
    if *status != Status::InProgress {
        return Vec::new();
    }
    extract_section_items(body, section_heading)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "\
# Rack migration

Some context.

## 進度報告

- 2025-03-04: ordered rails
- 2025-03-06: racked two hosts
  - sub note stays

not a bullet

1. 2025-03-07: numbered entry

### Details inside
- 2025-03-08: still inside

## Risks
- power budget
";

    #[test]
    fn collects_bullets_until_next_sibling_heading() {
        let items = extract_progress(BODY, &Status::InProgress, DEFAULT_PROGRESS_HEADING);
        assert_eq!(
            items,
            vec![
                "- 2025-03-04: ordered rails",
                "- 2025-03-06: racked two hosts",
                "  - sub note stays",
                "1. 2025-03-07: numbered entry",
                "- 2025-03-08: still inside",
            ]
        );
    }

    #[test]
    fn other_statuses_have_no_excerpt() {
        assert!(extract_progress(BODY, &Status::Pending, DEFAULT_PROGRESS_HEADING).is_empty());
        assert!(extract_progress(BODY, &Status::Completed, DEFAULT_PROGRESS_HEADING).is_empty());
    }

    #[test]
    fn missing_section_is_empty() {
        let body = "# Title\n\n- loose bullet\n";
        assert!(extract_progress(body, &Status::InProgress, DEFAULT_PROGRESS_HEADING).is_empty());
    }

    #[test]
    fn headings_inside_code_fences_are_ignored() {
        let body = "```\n## 進度報告\n- fake\n```\n## 進度報告\n- real\n";
        assert_eq!(
            extract_section_items(body, DEFAULT_PROGRESS_HEADING),
            vec!["- real"]
        );
    }

    #[test]
    fn wrapped_bullets_keep_their_continuation_lines() {
        let body = "## 進度報告\n- 2025-03-04: ordered rails,\n  waiting on vendor quote\n- 2025-03-06: done\n";
        assert_eq!(
            extract_section_items(body, DEFAULT_PROGRESS_HEADING),
            vec![
                "- 2025-03-04: ordered rails,",
                "  waiting on vendor quote",
                "- 2025-03-06: done",
            ]
        );
    }

    #[test]
    fn document_order_is_preserved() {
        let body = "## 進度報告\n- 2025-03-09: newest\n- 2025-03-01: oldest\n";
        assert_eq!(
            extract_section_items(body, DEFAULT_PROGRESS_HEADING),
            vec!["- 2025-03-09: newest", "- 2025-03-01: oldest"]
        );
    }
}
