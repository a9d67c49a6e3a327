//! Writing figures to disk.
//!
//! The output path is built by string concatenation of the configured
//! directory prefix, file name, and format extension. A vector format also
//! writes a PNG companion next to it, so every invocation leaves a raster
//! file behind. Data resolution happens once, before any backend is opened,
//! so a configuration error produces no output file at all.

use crate::config::{FigFormat, PlotSpec};
use crate::figure;
use crate::render;
use crate::table::{resolve_lines, Series, TableCache};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::collections::BTreeMap;

/// Output files for a figure configuration: the requested format first,
/// then the PNG companion when the requested format is not already PNG.
pub fn output_targets(
    file_path: &str,
    filename: &str,
    format: FigFormat,
) -> Vec<(String, FigFormat)> {
    let base = format!("{}{}", file_path, filename);
    let mut targets = vec![(format!("{}.{}", base, format.extension()), format)];
    if format != FigFormat::Png {
        targets.push((format!("{}.png", base), FigFormat::Png));
    }
    targets
}

/// Resolve the spec's data, render it once per output target, and return the
/// written paths in the order they were written.
pub fn save(spec: &PlotSpec) -> Result<Vec<String>> {
    let mut cache = TableCache::new();
    let series = resolve_lines(&spec.lines, &mut cache)?;

    let targets = output_targets(
        &spec.figure.file_path,
        &spec.figure.filename,
        spec.figure.format,
    );
    let (width, height) = figure::pixel_size(&spec.figure);
    for (path, format) in &targets {
        match format {
            FigFormat::Png => {
                render_to(BitMapBackend::new(path, (width, height)), spec, &series)
                    .with_context(|| format!("Failed to write figure to {}", path))?;
            }
            FigFormat::Svg => {
                render_to(SVGBackend::new(path, (width, height)), spec, &series)
                    .with_context(|| format!("Failed to write figure to {}", path))?;
            }
        }
    }

    Ok(targets.into_iter().map(|(path, _)| path).collect())
}

fn render_to<DB>(backend: DB, spec: &PlotSpec, series: &BTreeMap<String, Series>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let surface = figure::build(backend, &spec.figure)?;
    render::render(&surface, &spec.figure, &spec.subplots, &spec.lines, series)?;
    surface.root.present()?;
    Ok(())
}
