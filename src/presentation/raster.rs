//! Gantt rows drawn as a bitmap.
//!
//! The bitmap carries bars, weekend shading and a marker for the rendering
//! date. Row titles are not drawn here; the slide places them in the empty
//! gutter on the left using [`GanttRaster::row_center`].

use crate::gantt::{GanttChart, GanttTag};
use chrono::{Datelike, NaiveDate, Weekday};
use image::{Rgba, RgbaImage};

const WIDTH: u32 = 1200;
const GUTTER: u32 = 360;
const PADDING: u32 = 16;
const ROW_HEIGHT: u32 = 36;
const BAR_INSET: u32 = 8;
const MIN_HEIGHT: u32 = 120;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const WEEKEND: Rgba<u8> = Rgba([238, 238, 238, 255]);
const ROW_RULE: Rgba<u8> = Rgba([220, 220, 220, 255]);
const ACTIVE: Rgba<u8> = Rgba([52, 120, 246, 255]);
const DONE: Rgba<u8> = Rgba([150, 150, 150, 255]);
const PLANNED: Rgba<u8> = Rgba([242, 153, 74, 255]);
const TODAY: Rgba<u8> = Rgba([220, 53, 69, 255]);

#[derive(Debug, Clone)]
pub struct GanttRaster {
    pub image: RgbaImage,
    /// Width in pixels of the label gutter left of the time axis.
    pub gutter: u32,
    rows: usize,
}

impl GanttRaster {
    /// Vertical centre of row `index` in image pixels.
    pub fn row_center(&self, index: usize) -> Option<u32> {
        (index < self.rows).then(|| PADDING + index as u32 * ROW_HEIGHT + ROW_HEIGHT / 2)
    }
}

fn fill_rect(image: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    for y in y0.min(height)..y1.min(height) {
        for x in x0.min(width)..x1.min(width) {
            image.put_pixel(x, y, color);
        }
    }
}

fn bar_color(tag: Option<GanttTag>) -> Rgba<u8> {
    match tag {
        Some(GanttTag::Active) => ACTIVE,
        Some(GanttTag::Done) => DONE,
        None => PLANNED,
    }
}

/// Draw the chart; `None` when it has no rows.
pub fn rasterize_gantt(chart: &GanttChart, today: NaiveDate) -> Option<GanttRaster> {
    let (first, last) = chart.span()?;
    let rows = chart.rows.len();
    let height = (PADDING * 2 + rows as u32 * ROW_HEIGHT).max(MIN_HEIGHT);
    let mut image = RgbaImage::from_pixel(WIDTH, height, BACKGROUND);

    let axis_start = GUTTER;
    let axis_width = WIDTH - GUTTER - PADDING;
    let days = (last - first).num_days() + 1;
    let day_width = axis_width as f64 / days as f64;
    let x_for = |date: NaiveDate| -> u32 {
        let offset = (date - first).num_days().clamp(0, days);
        axis_start + (offset as f64 * day_width).round() as u32
    };

    let mut day = first;
    while day <= last {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let next = day.succ_opt().unwrap_or(day);
            fill_rect(&mut image, x_for(day), 0, x_for(next).max(x_for(day) + 1), height, WEEKEND);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    for (index, row) in chart.rows.iter().enumerate() {
        let top = PADDING + index as u32 * ROW_HEIGHT;
        fill_rect(&mut image, 0, top + ROW_HEIGHT - 1, WIDTH, top + ROW_HEIGHT, ROW_RULE);

        let (start, end) = (row.start.min(row.end), row.start.max(row.end));
        let x0 = x_for(start);
        let x1 = end.succ_opt().map(x_for).unwrap_or(WIDTH - PADDING).max(x0 + 2);
        fill_rect(
            &mut image,
            x0,
            top + BAR_INSET,
            x1,
            top + ROW_HEIGHT - BAR_INSET,
            bar_color(row.tag),
        );
    }

    if (first..=last).contains(&today) {
        let x = x_for(today);
        fill_rect(&mut image, x, 0, x + 2, height, TODAY);
    }

    Some(GanttRaster {
        image,
        gutter: GUTTER,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gantt::GanttRow;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bars_are_coloured_by_tag() {
        let chart = GanttChart {
            rows: vec![
                GanttRow {
                    id: "a".into(),
                    title: "A".into(),
                    tag: Some(GanttTag::Active),
                    start: d(2025, 3, 3),
                    end: d(2025, 3, 7),
                },
                GanttRow {
                    id: "b".into(),
                    title: "B".into(),
                    tag: None,
                    start: d(2025, 3, 10),
                    end: d(2025, 3, 14),
                },
            ],
        };
        let raster = rasterize_gantt(&chart, d(2030, 1, 1)).unwrap();
        assert_eq!(raster.image.width(), WIDTH);
        assert_eq!(raster.image.height(), MIN_HEIGHT);

        let first_row = raster.row_center(0).unwrap();
        let second_row = raster.row_center(1).unwrap();
        assert_eq!(*raster.image.get_pixel(GUTTER + 2, first_row), ACTIVE);
        assert_eq!(*raster.image.get_pixel(WIDTH - PADDING - 2, second_row), PLANNED);
        assert_eq!(*raster.image.get_pixel(10, first_row), BACKGROUND);
        assert_eq!(raster.row_center(2), None);
    }

    #[test]
    fn empty_chart_has_no_image() {
        assert!(rasterize_gantt(&GanttChart::default(), d(2025, 1, 1)).is_none());
    }
}
