//! Custom legend boxes for subplots and the whole figure.
//!
//! The backend's built-in series labels can neither reorder entries nor be
//! attached to the figure as a whole, so legends are drawn directly: a
//! background box, one line glyph per entry, and the label text, laid out in
//! the configured number of columns. Entry order is exactly the configured
//! order.

use crate::config::{LegendPosition, LegendStyle, LineStyle};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::element::{PathElement, Rectangle, Text};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::RGBColor;

// Pixel-space text estimation; fonts are not measured exactly.
const CHAR_WIDTH_RATIO: f64 = 0.6;
const GLYPH_WIDTH: i32 = 18;
const GLYPH_GAP: i32 = 5;
const PADDING: i32 = 5;
const MARGIN: i32 = 6;

/// One legend entry: the label text plus the glyph styling of its line.
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub style: LineStyle,
}

/// Draw a legend for `entries` within the pixel rectangle `rect` of `root`.
///
/// When `anchor` is set, the box's upper-left corner lands on the anchor
/// point (axes fractions, y measured upward) and the configured
/// position/column settings are ignored.
pub fn draw_legend<DB>(
    root: &DrawingArea<DB, Shift>,
    rect: (i32, i32, i32, i32),
    entries: &[LegendEntry],
    style: &LegendStyle,
    anchor: Option<(f64, f64)>,
    fontsize: u32,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if entries.is_empty() {
        return Ok(());
    }

    let columns = if anchor.is_some() {
        1
    } else {
        style.columns.max(1)
    };
    let rows = entries.len().div_ceil(columns);
    let (box_w, box_h, col_widths) = box_size(entries, columns, rows, fontsize);
    let (bx, by) = origin(rect, style.position, anchor, (box_w, box_h));

    root.draw(&Rectangle::new(
        [(bx, by), (bx + box_w, by + box_h)],
        WHITE.mix(0.8).filled(),
    ))?;
    root.draw(&Rectangle::new(
        [(bx, by), (bx + box_w, by + box_h)],
        BLACK.stroke_width(1),
    ))?;

    let row_h = row_height(fontsize);
    let text_font = ("sans-serif", fontsize)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    // Entries fill column by column, preserving configured order.
    let mut col_x = bx + PADDING;
    for (col, col_width) in col_widths.iter().enumerate() {
        for row in 0..rows {
            let Some(entry) = entries.get(col * rows + row) else {
                break;
            };
            let y = by + PADDING + row as i32 * row_h + row_h / 2;
            draw_glyph(root, (col_x, y), entry)?;
            root.draw(&Text::new(
                entry.label.clone(),
                (col_x + GLYPH_WIDTH + GLYPH_GAP, y),
                text_font.clone(),
            ))?;
        }
        col_x += col_width;
    }

    Ok(())
}

fn draw_glyph<DB>(
    root: &DrawingArea<DB, Shift>,
    at: (i32, i32),
    entry: &LegendEntry,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x, y) = at;
    let stroke = entry.color.stroke_width(2);
    match entry.style {
        LineStyle::Solid => {
            root.draw(&PathElement::new(vec![(x, y), (x + GLYPH_WIDTH, y)], stroke))?;
        }
        LineStyle::Dashed | LineStyle::DashDot => {
            root.draw(&PathElement::new(vec![(x, y), (x + 7, y)], stroke))?;
            root.draw(&PathElement::new(
                vec![(x + 11, y), (x + GLYPH_WIDTH, y)],
                stroke,
            ))?;
        }
        LineStyle::Dotted => {
            for dot in 0..4 {
                let dx = x + dot * 5;
                root.draw(&PathElement::new(vec![(dx, y), (dx + 2, y)], stroke))?;
            }
        }
    }
    Ok(())
}

fn row_height(fontsize: u32) -> i32 {
    fontsize as i32 + 6
}

/// Estimated box size plus per-column widths, entries laid out column-major.
fn box_size(
    entries: &[LegendEntry],
    columns: usize,
    rows: usize,
    fontsize: u32,
) -> (i32, i32, Vec<i32>) {
    let char_w = fontsize as f64 * CHAR_WIDTH_RATIO;
    let mut col_widths = Vec::with_capacity(columns);
    for col in 0..columns {
        let widest = entries
            .iter()
            .skip(col * rows)
            .take(rows)
            .map(|e| (e.label.chars().count() as f64 * char_w).ceil() as i32)
            .max()
            .unwrap_or(0);
        col_widths.push(GLYPH_WIDTH + GLYPH_GAP + widest + PADDING);
    }
    let width = col_widths.iter().sum::<i32>() + 2 * PADDING;
    let height = rows as i32 * row_height(fontsize) + 2 * PADDING;
    (width, height, col_widths)
}

/// Upper-left pixel corner for the legend box inside `rect`.
fn origin(
    rect: (i32, i32, i32, i32),
    position: LegendPosition,
    anchor: Option<(f64, f64)>,
    size: (i32, i32),
) -> (i32, i32) {
    let (x0, y0, x1, y1) = rect;
    let (w, h) = size;

    if let Some((ax, ay)) = anchor {
        let x = x0 + (ax * (x1 - x0) as f64).round() as i32;
        let y = y1 - (ay * (y1 - y0) as f64).round() as i32;
        return (x, y);
    }

    let left = x0 + MARGIN;
    let right = x1 - w - MARGIN;
    let center_x = x0 + (x1 - x0 - w) / 2;
    let top = y0 + MARGIN;
    let bottom = y1 - h - MARGIN;
    let center_y = y0 + (y1 - y0 - h) / 2;

    match position {
        LegendPosition::Best | LegendPosition::UpperRight => (right, top),
        LegendPosition::UpperLeft => (left, top),
        LegendPosition::LowerLeft => (left, bottom),
        LegendPosition::LowerRight => (right, bottom),
        LegendPosition::CenterLeft => (left, center_y),
        LegendPosition::CenterRight => (right, center_y),
        LegendPosition::UpperCenter => (center_x, top),
        LegendPosition::LowerCenter => (center_x, bottom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str) -> LegendEntry {
        LegendEntry {
            label: label.to_string(),
            color: RGBColor(0, 0, 0),
            style: LineStyle::Solid,
        }
    }

    #[test]
    fn box_grows_with_rows_and_columns() {
        let entries = vec![entry("aa"), entry("bb"), entry("cc"), entry("dd")];
        let (w1, h1, _) = box_size(&entries, 1, 4, 10);
        let (w2, h2, cols) = box_size(&entries, 2, 2, 10);
        assert!(h1 > h2);
        assert!(w2 > w1);
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn positions_stay_inside_rect() {
        let rect = (100, 100, 400, 300);
        for pos in [
            LegendPosition::Best,
            LegendPosition::UpperLeft,
            LegendPosition::LowerRight,
            LegendPosition::UpperCenter,
        ] {
            let (x, y) = origin(rect, pos, None, (80, 40));
            assert!(x >= rect.0 && x + 80 <= rect.2, "{:?}", pos);
            assert!(y >= rect.1 && y + 40 <= rect.3, "{:?}", pos);
        }
    }

    #[test]
    fn anchor_overrides_position() {
        let rect = (0, 0, 200, 100);
        // Anchor y is measured upward from the bottom edge.
        let (x, y) = origin(rect, LegendPosition::LowerLeft, Some((0.5, 0.5)), (80, 40));
        assert_eq!((x, y), (100, 50));
    }
}
