//! Report text reduced to slide lines.

use regex::Regex;
use std::sync::LazyLock;

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("link pattern is valid"));
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<?https?://[^\s>)]+>?").expect("url pattern is valid"));
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{3000}]+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideLine {
    pub text: String,
    pub bold: bool,
    pub indent: usize,
}

impl SlideLine {
    fn plain(text: String, indent: usize) -> Self {
        Self {
            text,
            bold: false,
            indent,
        }
    }

    fn heading(text: String) -> Self {
        Self {
            text,
            bold: true,
            indent: 0,
        }
    }
}

/// Drop hyperlinks (keeping link text) and collapse runs of whitespace.
pub fn clean_inline(text: &str) -> String {
    let text = LINK.replace_all(text, "$1");
    let text = BARE_URL.replace_all(&text, "");
    SPACES.replace_all(text.trim(), " ").into_owned()
}

fn strip_emphasis(text: &str) -> &str {
    let trimmed = text.trim();
    for marker in ["**", "__", "_", "*"] {
        if let Some(inner) = trimmed
            .strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
        {
            return inner.trim();
        }
    }
    trimmed
}

fn list_item(line: &str) -> Option<(usize, &str)> {
    let indent = line.len() - line.trim_start().len();
    let trimmed = line.trim_start();
    ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .map(|rest| (indent / 2, rest))
}

/// Slide text for a report whose diagram has already been removed.
///
/// Status headings (`##`) become bold top-level lines, project headings
/// (`###`) plain top-level lines, list items keep their nesting. Blank lines
/// and lines that are empty after link removal are dropped.
pub fn slide_lines(text: &str) -> Vec<SlideLine> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("<!--") || trimmed.starts_with("```") {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("### ") {
            let text = clean_inline(rest);
            if !text.is_empty() {
                lines.push(SlideLine::plain(text, 0));
            }
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("## ").or_else(|| trimmed.strip_prefix("# ")) {
            let text = clean_inline(rest);
            if !text.is_empty() {
                lines.push(SlideLine::heading(text));
            }
            continue;
        }

        let (indent, content) = match list_item(raw) {
            Some((depth, rest)) => (depth + 1, rest),
            None => (0, trimmed),
        };
        let text = clean_inline(strip_emphasis(content));
        if !text.is_empty() {
            lines.push(SlideLine::plain(text, indent));
        }
    }
    lines
}
