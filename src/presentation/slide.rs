//! Single-slide SVG layout.

use super::text::SlideLine;
use crate::config::PresentationConfig;
use std::fmt::Write as _;

const MARGIN: f64 = 40.0;
const FONT_SIZE: f64 = 20.0;
const HEADING_SIZE: f64 = 24.0;
const LINE_HEIGHT: f64 = 30.0;
const INDENT_WIDTH: f64 = 24.0;
const LABEL_SIZE: f64 = 14.0;
const ELLIPSIS: &str = "…";

/// Raster placed on the slide, in the raster's own pixel space.
#[derive(Debug, Clone)]
pub struct SlideImage {
    /// Usually a `data:image/png;base64,...` URI so the slide is self-contained.
    pub href: String,
    pub width: u32,
    pub height: u32,
    pub gutter: u32,
    /// Row label and its vertical centre in image pixels.
    pub labels: Vec<(String, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Rough advance width: wide glyphs take a full em, everything else ~0.55em.
fn char_width(c: char, size: f64) -> f64 {
    if (c as u32) >= 0x1100 { size } else { size * 0.55 }
}

fn wrap(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let advance = char_width(c, size);
        if width + advance > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current).trim_end().to_string());
            width = 0.0;
            if c == ' ' {
                continue;
            }
        }
        current.push(c);
        width += advance;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn columns(config: &PresentationConfig, has_image: bool) -> (Option<Rect>, Rect) {
    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let body_height = height - 2.0 * MARGIN;
    if !has_image {
        let text = Rect {
            x: MARGIN,
            y: MARGIN,
            width: width - 2.0 * MARGIN,
            height: body_height,
        };
        return (None, text);
    }
    let ratio = f64::from(config.image_width_ratio.clamp(0.2, 0.8));
    let split = (width * ratio).round();
    let image = Rect {
        x: MARGIN,
        y: MARGIN,
        width: split - 1.5 * MARGIN,
        height: body_height,
    };
    let text = Rect {
        x: split + 0.5 * MARGIN,
        y: MARGIN,
        width: width - split - 1.5 * MARGIN,
        height: body_height,
    };
    (Some(image), text)
}

/// Fit the raster into `area` keeping its aspect ratio; returns the scale and
/// the placed rectangle.
fn fit(image: &SlideImage, area: Rect) -> (f64, Rect) {
    let scale = (area.width / f64::from(image.width)).min(area.height / f64::from(image.height));
    let placed = Rect {
        x: area.x,
        y: area.y,
        width: f64::from(image.width) * scale,
        height: f64::from(image.height) * scale,
    };
    (scale, placed)
}

fn write_image(out: &mut String, image: &SlideImage, area: Rect) {
    let (scale, placed) = fit(image, area);
    let _ = writeln!(
        out,
        r#"  <image href="{}" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" preserveAspectRatio="xMinYMin meet"/>"#,
        escape(&image.href),
        placed.x,
        placed.y,
        placed.width,
        placed.height
    );

    let gutter_width = f64::from(image.gutter) * scale - 8.0;
    let label_size = LABEL_SIZE.min(30.0 * scale);
    for (label, center) in &image.labels {
        let text = wrap(label, label_size, gutter_width)
            .into_iter()
            .next()
            .unwrap_or_default();
        let y = placed.y + f64::from(*center) * scale + label_size / 3.0;
        let _ = writeln!(
            out,
            r#"  <text x="{:.1}" y="{:.1}" font-size="{:.1}">{}</text>"#,
            placed.x + 4.0,
            y,
            label_size,
            escape(&text)
        );
    }
}

fn write_text(out: &mut String, lines: &[SlideLine], area: Rect) {
    let capacity = (area.height / LINE_HEIGHT).floor().max(1.0) as usize;

    let mut placed: Vec<(f64, bool, String)> = Vec::new();
    for line in lines {
        let size = if line.bold { HEADING_SIZE } else { FONT_SIZE };
        let x = area.x + line.indent as f64 * INDENT_WIDTH;
        let available = area.width - line.indent as f64 * INDENT_WIDTH;
        let bullet = if line.indent > 0 { "• " } else { "" };
        for (index, chunk) in wrap(&format!("{bullet}{}", line.text), size, available)
            .into_iter()
            .enumerate()
        {
            let x = if index > 0 && line.indent > 0 {
                x + INDENT_WIDTH / 2.0
            } else {
                x
            };
            placed.push((x, line.bold, chunk));
        }
    }

    if placed.len() > capacity {
        placed.truncate(capacity - 1);
        placed.push((area.x, false, ELLIPSIS.to_string()));
    }

    for (row, (x, bold, text)) in placed.into_iter().enumerate() {
        let y = area.y + (row as f64 + 1.0) * LINE_HEIGHT - (LINE_HEIGHT - FONT_SIZE) / 2.0;
        let (size, weight) = if bold {
            (HEADING_SIZE, r#" font-weight="bold""#)
        } else {
            (FONT_SIZE, "")
        };
        let _ = writeln!(
            out,
            r#"  <text x="{x:.1}" y="{y:.1}" font-size="{size:.1}"{weight}>{}</text>"#,
            escape(&text)
        );
    }
}

/// Lay out the optional raster and the text lines on one canvas. The image
/// column and the text column never intersect; text that does not fit is
/// cut and replaced by an ellipsis line.
pub fn render_slide_svg(
    title: &str,
    lines: &[SlideLine],
    image: Option<&SlideImage>,
    config: &PresentationConfig,
) -> String {
    let (image_area, text_area) = columns(config, image.is_some());
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = config.width,
        h = config.height
    );
    let _ = writeln!(out, "  <title>{}</title>", escape(title));
    let _ = writeln!(out, r#"  <rect width="100%" height="100%" fill="white"/>"#);
    if let (Some(image), Some(area)) = (image, image_area) {
        write_image(&mut out, image, area);
    }
    write_text(&mut out, lines, text_area);
    out.push_str("</svg>\n");
    out
}
