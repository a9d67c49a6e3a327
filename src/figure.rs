//! Figure surface construction: grid layout, margins, and the figure title.
//!
//! Physical size is given in inches and rendered at 100 dpi. Margins and
//! inter-subplot spacing are fractions of figure size, translated into pixel
//! breakpoints so the drawing area splits into margin, panel, and gap cells.
//! The font size lives on the surface and is threaded through every draw
//! call; no process-wide rendering state is touched.

use crate::config::FigureConfig;
use anyhow::Result;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::Text;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Pixels per inch of configured figure size.
pub const DPI: f64 = 100.0;

/// One subplot panel: its drawing area plus its absolute pixel rectangle,
/// used for titles and legends drawn on the root without clipping.
pub struct Panel<DB: DrawingBackend> {
    pub area: DrawingArea<DB, Shift>,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl<DB: DrawingBackend> Panel<DB> {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// The assembled drawing surface: root area plus the 2-D panel grid in
/// row-major order (subplot index 1 is the top-left panel).
pub struct FigureSurface<DB: DrawingBackend> {
    pub root: DrawingArea<DB, Shift>,
    pub panels: Vec<Panel<DB>>,
    pub rows: usize,
    pub cols: usize,
    pub fontsize: u32,
}

impl<DB: DrawingBackend> FigureSurface<DB> {
    /// Panel for a 1-based subplot index, if it is inside the grid.
    pub fn panel(&self, index: usize) -> Option<&Panel<DB>> {
        index.checked_sub(1).and_then(|i| self.panels.get(i))
    }
}

/// Pixel dimensions for a figure configuration.
pub fn pixel_size(cfg: &FigureConfig) -> (u32, u32) {
    (
        (cfg.width * DPI).round().max(1.0) as u32,
        (cfg.height * DPI).round().max(1.0) as u32,
    )
}

/// Build the figure surface on `backend`: white background, panel grid, and
/// the figure title at its configured vertical offset.
pub fn build<DB>(backend: DB, cfg: &FigureConfig) -> Result<FigureSurface<DB>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let (width, height) = root.dim_in_pixel();
    let rows = cfg.num_rows.max(1);
    let cols = cfg.num_cols.max(1);
    let (x_breaks, y_breaks) = grid_breakpoints(cfg, width, height);

    let cells = root.split_by_breakpoints(&x_breaks[..], &y_breaks[..]);
    let cells_per_row = x_breaks.len() + 1;

    let mut panels = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            // Cells alternate margin/panel/gap; panels sit at the odd slots.
            let cell = cells[(2 * row + 1) * cells_per_row + (2 * col + 1)].clone();
            let (x_range, y_range) = cell.get_pixel_range();
            panels.push(Panel {
                x0: x_range.start,
                y0: y_range.start,
                x1: x_range.end,
                y1: y_range.end,
                area: cell,
            });
        }
    }

    if let Some(title) = &cfg.fig_title {
        let size = (cfg.fontsize as f64 * 1.2).round() as u32;
        let style = ("sans-serif", size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let x = width as i32 / 2;
        let y = ((1.0 - cfg.title_y) * height as f64).round() as i32;
        root.draw(&Text::new(title.clone(), (x, y), style))?;
    }

    Ok(FigureSurface {
        root,
        panels,
        rows,
        cols,
        fontsize: cfg.fontsize,
    })
}

/// Pixel breakpoints splitting the figure into margin/panel/gap cells along
/// each axis. The fractional `top`/`bottom` margins are measured from the
/// figure bottom, matching the configuration convention.
fn grid_breakpoints(cfg: &FigureConfig, width: u32, height: u32) -> (Vec<i32>, Vec<i32>) {
    let rows = cfg.num_rows.max(1) as f64;
    let cols = cfg.num_cols.max(1) as f64;

    let left = cfg.left * width as f64;
    let right = cfg.right * width as f64;
    let panel_w = (right - left).max(0.0) / (cols + (cols - 1.0) * cfg.wspace);
    let gap_w = panel_w * cfg.wspace;

    let mut x_breaks = Vec::new();
    let mut x = left;
    x_breaks.push(x.round() as i32);
    for col in 0..cfg.num_cols.max(1) {
        x += panel_w;
        x_breaks.push(x.round() as i32);
        if col + 1 < cfg.num_cols.max(1) {
            x += gap_w;
            x_breaks.push(x.round() as i32);
        }
    }

    let top = (1.0 - cfg.top) * height as f64;
    let bottom = (1.0 - cfg.bottom) * height as f64;
    let panel_h = (bottom - top).max(0.0) / (rows + (rows - 1.0) * cfg.hspace);
    let gap_h = panel_h * cfg.hspace;

    let mut y_breaks = Vec::new();
    let mut y = top;
    y_breaks.push(y.round() as i32);
    for row in 0..cfg.num_rows.max(1) {
        y += panel_h;
        y_breaks.push(y.round() as i32);
        if row + 1 < cfg.num_rows.max(1) {
            y += gap_h;
            y_breaks.push(y.round() as i32);
        }
    }

    (x_breaks, y_breaks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_breakpoints() {
        let cfg = FigureConfig::default();
        let (xb, yb) = grid_breakpoints(&cfg, 600, 900);
        // left=0.125, right=0.9 of 600px; top=0.9, bottom=0.05 of 900px
        // measured from the bottom.
        assert_eq!(xb, vec![75, 540]);
        assert_eq!(yb, vec![90, 855]);
    }

    #[test]
    fn two_columns_insert_a_gap() {
        let cfg = FigureConfig {
            num_cols: 2,
            ..Default::default()
        };
        let (xb, _) = grid_breakpoints(&cfg, 600, 900);
        assert_eq!(xb.len(), 4);
        assert!(xb.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(xb[0], 75);
        assert_eq!(*xb.last().unwrap(), 540);
        // Gap width is wspace times the panel width.
        let panel = xb[1] - xb[0];
        let gap = xb[2] - xb[1];
        assert!((gap as f64 - panel as f64 * 0.2).abs() <= 1.0);
    }

    #[test]
    fn pixel_size_uses_100_dpi() {
        let cfg = FigureConfig::default();
        assert_eq!(pixel_size(&cfg), (600, 900));
    }

    #[test]
    fn grid_is_always_two_dimensional() {
        let cfg = FigureConfig {
            num_rows: 2,
            num_cols: 3,
            ..Default::default()
        };
        let (xb, yb) = grid_breakpoints(&cfg, 600, 900);
        assert_eq!(xb.len(), 6);
        assert_eq!(yb.len(), 4);
    }
}
