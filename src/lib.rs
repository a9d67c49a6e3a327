//! Declarative CSV plotting.
//!
//! A figure is described by a JSON specification: one figure configuration,
//! subplot configurations keyed by 1-based index, and line configurations
//! keyed by id. Line data comes from CSV columns or precomputed arrays;
//! referenced files are read once per render call. Figures are written as
//! PNG or SVG, with a PNG companion next to every vector output. A small
//! row-range concatenator for CSV files rounds out the toolkit.

pub mod combine;
pub mod config;
pub mod error;
pub mod figure;
pub mod legend;
pub mod output;
pub mod render;
pub mod table;

pub use combine::{combine_csv_files, CsvRange};
pub use config::{FigureConfig, LineConfig, PlotSpec, SubplotConfig};
pub use error::PlotError;
pub use output::save;
