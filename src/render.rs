//! Line and axis rendering onto a built figure surface.
//!
//! Subplots are rendered in ascending index order. Every axis setting is
//! applied only when configured; anything absent keeps the backend default.
//! Lines are drawn in their configured order, on the primary y-axis or on a
//! secondary y-axis sharing the same x-axis, followed by the optional span
//! shading and the configured legends. Because axis ranges are fixed before
//! any drawing, shading can never disturb the visible y-range.

use crate::config::{
    FigureConfig, GridAxis, GridWhich, LineConfig, LineStyle, Marker, Scale, SubplotConfig,
};
use crate::error::PlotError;
use crate::figure::{FigureSurface, Panel};
use crate::legend::{draw_legend, LegendEntry};
use crate::table::Series;
use anyhow::Result;
use plotters::chart::{ChartBuilder, ChartContext};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::element::{
    Circle, Cross, DynElement, EmptyElement, IntoDynElement, PathElement, Rectangle, Text,
    TriangleMarker,
};
use plotters::prelude::*;
use plotters::series::{DashedLineSeries, LineSeries};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;
use std::ops::Range;

const X_LABEL_AREA: i32 = 30;
const Y_LABEL_AREA: i32 = 45;

/// Render every configured subplot onto `surface`, then the figure-level
/// legend if one is requested. `series` must hold resolved data for every
/// line id referenced by the subplots.
pub fn render<DB>(
    surface: &FigureSurface<DB>,
    fig: &FigureConfig,
    subplots: &BTreeMap<usize, SubplotConfig>,
    lines: &BTreeMap<String, LineConfig>,
    series: &BTreeMap<String, Series>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    // Validate every reference before a single mark is drawn.
    for (&index, cfg) in subplots {
        if surface.panel(index).is_none() {
            return Err(PlotError::SubplotOutOfRange {
                subplot: index,
                rows: surface.rows,
                cols: surface.cols,
            }
            .into());
        }
        for id in cfg.lines.iter().chain(cfg.legend.iter().flatten()) {
            if !lines.contains_key(id) || !series.contains_key(id) {
                return Err(PlotError::UnknownLine {
                    subplot: index,
                    line: id.clone(),
                }
                .into());
            }
        }
    }
    for &index in &fig.legend_ids {
        if surface.panel(index).is_none() {
            return Err(PlotError::SubplotOutOfRange {
                subplot: index,
                rows: surface.rows,
                cols: surface.cols,
            }
            .into());
        }
    }

    let mut drawn: BTreeMap<usize, Vec<LegendEntry>> = BTreeMap::new();
    for (&index, cfg) in subplots {
        let panel = surface
            .panel(index)
            .ok_or(PlotError::SubplotOutOfRange {
                subplot: index,
                rows: surface.rows,
                cols: surface.cols,
            })?;
        let entries = render_subplot(surface, panel, cfg, lines, series)?;
        drawn.insert(index, entries);
    }

    if !fig.legend_ids.is_empty() {
        let mut entries = Vec::new();
        for index in &fig.legend_ids {
            if let Some(subplot_entries) = drawn.get(index) {
                entries.extend(subplot_entries.iter().cloned());
            }
        }
        let (width, height) = surface.root.dim_in_pixel();
        draw_legend(
            &surface.root,
            (0, 0, width as i32, height as i32),
            &entries,
            &fig.legend,
            None,
            surface.fontsize,
        )?;
    }

    Ok(())
}

/// Axis coordinate flavor, decided by scale and explicit tick positions.
enum AxisSpec {
    Linear(Range<f64>),
    Ticks(Range<f64>, Vec<f64>),
    Log(Range<f64>),
}

impl AxisSpec {
    fn new(scale: Scale, ticks: Option<&Vec<f64>>, range: Range<f64>) -> Self {
        match (scale, ticks) {
            (Scale::Log, _) => AxisSpec::Log(log_safe(range)),
            (Scale::Linear, Some(points)) if !points.is_empty() => {
                AxisSpec::Ticks(range, points.clone())
            }
            (Scale::Linear, _) => AxisSpec::Linear(range),
        }
    }
}

/// `WithKeyPoints<RangedCoordf64>` carries `NoDefaultFormatting` without a
/// `ValueFormatter` impl in plotters 0.3, so `configure_mesh` cannot format
/// its labels; this wrapper delegates both traits without changing behavior.
struct KeyPointCoord(WithKeyPoints<RangedCoordf64>);

impl Ranged for KeyPointCoord {
    type ValueType = f64;
    type FormatOption = NoDefaultFormatting;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn range(&self) -> Range<f64> {
        self.0.range()
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

impl ValueFormatter<f64> for KeyPointCoord {
    fn format(value: &f64) -> String {
        <RangedCoordf64 as ValueFormatter<f64>>::format(value)
    }
}

/// Secondary y-axis settings taken from the first line that declares one.
struct SecondaryAxis {
    label: String,
    percentage: bool,
}

fn render_subplot<DB>(
    surface: &FigureSurface<DB>,
    panel: &Panel<DB>,
    cfg: &SubplotConfig,
    lines: &BTreeMap<String, LineConfig>,
    series: &BTreeMap<String, Series>,
) -> Result<Vec<LegendEntry>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let ordered: Vec<(&String, &LineConfig, &Series)> = cfg
        .lines
        .iter()
        .map(|id| (id, &lines[id], &series[id]))
        .collect();

    let x_range = match cfg.xlim {
        Some((lo, hi)) => lo..hi,
        None => auto_range(ordered.iter().flat_map(|(_, _, s)| s.x.iter().copied())),
    };
    let y_range = match cfg.ylim {
        Some((lo, hi)) => lo..hi,
        None => auto_range(
            ordered
                .iter()
                .filter(|(_, l, _)| l.right_axis.is_none())
                .flat_map(|(_, _, s)| s.y.iter().copied()),
        ),
    };

    let secondary_lines: Vec<&(&String, &LineConfig, &Series)> = ordered
        .iter()
        .filter(|(_, l, _)| l.right_axis.is_some())
        .collect();
    let secondary = secondary_lines.first().and_then(|(_, l, _)| {
        l.right_axis.as_ref().map(|axis| SecondaryAxis {
            label: axis.label.clone(),
            percentage: axis.percentage,
        })
    });
    let y2_range = match secondary_lines
        .first()
        .and_then(|(_, l, _)| l.right_axis.as_ref().and_then(|a| a.ylim))
    {
        Some((lo, hi)) => lo..hi,
        None if !secondary_lines.is_empty() => auto_range(
            secondary_lines
                .iter()
                .flat_map(|(_, _, s)| s.y.iter().copied()),
        ),
        None => y_range.clone(),
    };

    let mut builder = ChartBuilder::on(&panel.area);
    builder
        .margin(1)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA);
    if secondary.is_some() {
        builder.right_y_label_area_size(Y_LABEL_AREA);
    }

    let xspec = AxisSpec::new(cfg.xscale, cfg.xticks.as_ref(), x_range.clone());
    let yspec = AxisSpec::new(cfg.yscale, cfg.yticks.as_ref(), y_range.clone());
    let shade_bounds = (y_range.start, y_range.end);

    let entries = match (xspec, yspec) {
        (AxisSpec::Linear(x), AxisSpec::Linear(y)) => draw_subplot_chart(
            builder.build_cartesian_2d(x, y)?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Linear(x), AxisSpec::Ticks(y, ticks)) => draw_subplot_chart(
            builder.build_cartesian_2d(x, KeyPointCoord(y.with_key_points(ticks)))?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Linear(x), AxisSpec::Log(y)) => draw_subplot_chart(
            builder.build_cartesian_2d(x, y.log_scale())?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Ticks(x, ticks), AxisSpec::Linear(y)) => draw_subplot_chart(
            builder.build_cartesian_2d(KeyPointCoord(x.with_key_points(ticks)), y)?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Ticks(x, xt), AxisSpec::Ticks(y, yt)) => draw_subplot_chart(
            builder.build_cartesian_2d(
                KeyPointCoord(x.with_key_points(xt)),
                KeyPointCoord(y.with_key_points(yt)),
            )?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Ticks(x, ticks), AxisSpec::Log(y)) => draw_subplot_chart(
            builder.build_cartesian_2d(KeyPointCoord(x.with_key_points(ticks)), y.log_scale())?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Log(x), AxisSpec::Linear(y)) => draw_subplot_chart(
            builder.build_cartesian_2d(x.log_scale(), y)?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Log(x), AxisSpec::Ticks(y, ticks)) => draw_subplot_chart(
            builder.build_cartesian_2d(x.log_scale(), KeyPointCoord(y.with_key_points(ticks)))?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
        (AxisSpec::Log(x), AxisSpec::Log(y)) => draw_subplot_chart(
            builder.build_cartesian_2d(x.log_scale(), y.log_scale())?,
            surface.fontsize,
            cfg,
            &ordered,
            x_range,
            y2_range,
            secondary,
            shade_bounds,
        )?,
    };

    if let Some(title) = &cfg.title {
        let style = ("sans-serif", surface.fontsize + 1)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let x = (panel.x0 + panel.x1) / 2;
        let y = panel.y0 + ((1.0 - cfg.title_y) * panel.height() as f64).round() as i32;
        surface.root.draw(&Text::new(title.clone(), (x, y), style))?;
    }

    if let Some(legend_ids) = &cfg.legend {
        let legend_entries: Vec<LegendEntry> = legend_ids
            .iter()
            .map(|id| {
                let line = &lines[id];
                LegendEntry {
                    label: line.label.clone().unwrap_or_else(|| id.clone()),
                    color: line.color.rgb(),
                    style: line.linestyle,
                }
            })
            .collect();
        draw_legend(
            &surface.root,
            (panel.x0, panel.y0, panel.x1, panel.y1),
            &legend_entries,
            &cfg.legend_style,
            cfg.bbox_anchor,
            surface.fontsize,
        )?;
    }

    Ok(entries)
}

#[allow(clippy::too_many_arguments)]
fn draw_subplot_chart<'a, DB, X, Y>(
    chart: ChartContext<'a, DB, Cartesian2d<X, Y>>,
    fontsize: u32,
    cfg: &SubplotConfig,
    ordered: &[(&String, &LineConfig, &Series)],
    x_range: Range<f64>,
    y2_range: Range<f64>,
    secondary: Option<SecondaryAxis>,
    shade_bounds: (f64, f64),
) -> Result<Vec<LegendEntry>>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    X: Ranged<ValueType = f64> + ValueFormatter<f64>,
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    // The secondary coordinate always exists so the chart type is uniform;
    // its axis is only configured and used when a line asks for it.
    let mut chart = chart.set_secondary_coord(x_range, y2_range);

    let percent = |v: &f64| format!("{:.0}%", v);
    {
        let mut mesh = chart.configure_mesh();
        mesh.label_style(("sans-serif", fontsize));
        mesh.axis_desc_style(("sans-serif", fontsize));
        match cfg.show_grid {
            None => {
                mesh.disable_mesh();
            }
            Some(which) => {
                match which {
                    GridWhich::Major => {
                        mesh.light_line_style(&TRANSPARENT);
                    }
                    GridWhich::Minor => {
                        mesh.bold_line_style(&TRANSPARENT);
                    }
                    GridWhich::Both => {}
                }
                match cfg.grid_axis {
                    GridAxis::X => {
                        mesh.disable_y_mesh();
                    }
                    GridAxis::Y => {
                        mesh.disable_x_mesh();
                    }
                    GridAxis::Both => {}
                }
            }
        }
        if let Some(label) = &cfg.xlabel {
            mesh.x_desc(label);
        }
        if let Some(label) = &cfg.ylabel {
            mesh.y_desc(label);
        }
        if cfg.xticks_percentage {
            mesh.x_label_formatter(&percent);
        }
        if cfg.yticks_percentage {
            mesh.y_label_formatter(&percent);
        }
        mesh.draw()?;
    }

    if let Some(axis) = &secondary {
        let mut axes = chart.configure_secondary_axes();
        axes.y_desc(&axis.label);
        axes.label_style(("sans-serif", fontsize));
        if axis.percentage {
            axes.y_label_formatter(&percent);
        }
        axes.draw()?;
    }

    let mut entries = Vec::new();
    for (_, line, data) in ordered {
        let points: Vec<(f64, f64)> = data.points().collect();
        // Drawn element-by-element on the plotting areas (what draw_series
        // does internally) because the HRTB on draw_series would force the
        // boxed elements, and thus `DB`, to be 'static.
        let elements = line_elements::<DB>(&points, line);
        if line.right_axis.is_some() {
            for element in &elements {
                chart.secondary_plotting_area().draw(element)?;
            }
        } else {
            for element in &elements {
                chart.plotting_area().draw(element)?;
            }
        }
        if let Some(label) = &line.label {
            entries.push(LegendEntry {
                label: label.clone(),
                color: line.color.rgb(),
                style: line.linestyle,
            });
        }
    }

    if let (Some(xspan), Some(yspan)) = (&cfg.xspan, &cfg.yspan) {
        let (ymin, ymax) = shade_bounds;
        let fill = cfg.fill.color.rgb().mix(cfg.fill.alpha).filled();
        for (x0, x1) in span_intervals(xspan, yspan) {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x0, ymin), (x1, ymax)],
                fill,
            )))?;
        }
    }

    Ok(entries)
}

/// Build the drawable elements of one line: the path in its configured
/// style plus any markers at the configured stride.
fn line_elements<'a, DB: DrawingBackend + 'a>(
    points: &[(f64, f64)],
    line: &LineConfig,
) -> Vec<DynElement<'a, DB, (f64, f64)>> {
    let color = line.color.rgb();
    let stroke = color.stroke_width(1);
    let owned: Vec<(f64, f64)> = points.to_vec();

    let mut elements: Vec<DynElement<'a, DB, (f64, f64)>> = Vec::new();
    match line.linestyle {
        LineStyle::Solid => {
            for element in LineSeries::new(owned.clone(), stroke) {
                elements.push(element);
            }
        }
        LineStyle::Dashed => {
            for element in DashedLineSeries::new(owned.clone().into_iter(), 8, 4, stroke) {
                elements.push(element.into_dyn());
            }
        }
        LineStyle::DashDot => {
            for element in DashedLineSeries::new(owned.clone().into_iter(), 7, 4, stroke) {
                elements.push(element.into_dyn());
            }
        }
        LineStyle::Dotted => {
            for element in DashedLineSeries::new(owned.clone().into_iter(), 2, 4, stroke) {
                elements.push(element.into_dyn());
            }
        }
    }

    if let Some(marker) = line.marker {
        let stride = line.markevery.max(1);
        for &(x, y) in owned.iter().step_by(stride) {
            let element: DynElement<'a, DB, (f64, f64)> = match marker {
                Marker::Circle => {
                    (EmptyElement::at((x, y)) + Circle::new((0, 0), 3, stroke)).into_dyn()
                }
                Marker::Point => {
                    (EmptyElement::at((x, y)) + Circle::new((0, 0), 2, color.filled())).into_dyn()
                }
                Marker::Square => (EmptyElement::at((x, y))
                    + Rectangle::new([(-3, -3), (3, 3)], color.filled()))
                .into_dyn(),
                Marker::Triangle => {
                    (EmptyElement::at((x, y)) + TriangleMarker::new((0, 0), 4, color.filled()))
                        .into_dyn()
                }
                Marker::Cross => {
                    (EmptyElement::at((x, y)) + Cross::new((0, 0), 3, stroke)).into_dyn()
                }
                Marker::Plus => (EmptyElement::at((x, y))
                    + PathElement::new(vec![(-3, 0), (3, 0)], stroke)
                    + PathElement::new(vec![(0, -3), (0, 3)], stroke))
                .into_dyn(),
            };
            elements.push(element);
        }
    }

    elements
}

/// Contiguous x intervals where the span predicate holds (value > 0).
/// Isolated single points shade nothing, matching a fill between adjacent
/// predicate-true samples.
fn span_intervals(xspan: &[f64], yspan: &[f64]) -> Vec<(f64, f64)> {
    let n = xspan.len().min(yspan.len());
    let mut intervals = Vec::new();
    let mut run_start: Option<usize> = None;
    for i in 0..=n {
        let on = i < n && yspan[i] > 0.0;
        match (run_start, on) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                if i - start >= 2 {
                    intervals.push((xspan[start], xspan[i - 1]));
                }
                run_start = None;
            }
            _ => {}
        }
    }
    intervals
}

/// Range over the finite values with padding, in the pack's style: 15% of
/// the span, or a fixed pad for degenerate spans.
fn auto_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = (max - min).abs();
    let padding = if span < 1e-6 { 0.5 } else { span * 0.15 };
    (min - padding)..(max + padding)
}

/// Force a range positive so a log scale stays well-defined.
fn log_safe(range: Range<f64>) -> Range<f64> {
    if range.end <= 0.0 {
        return 0.1..1.0;
    }
    let start = if range.start > 0.0 {
        range.start
    } else {
        range.end * 1e-3
    };
    start..range.end
}
