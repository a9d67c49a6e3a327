//! Error taxonomy for configuration, data resolution, and output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving configuration into a rendered figure.
///
/// None of these are retried or recovered internally; they propagate to the
/// caller, which is responsible for reporting.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A line entry carries neither a precomputed array nor a (file, column)
    /// reference for one of its axes.
    #[error("line '{line}' is missing both {axis}data and {axis}data_array")]
    MissingDataSource { line: String, axis: char },

    /// A referenced column name is absent from a loaded table.
    #[error("column '{column}' not found in {}", file.display())]
    MissingColumn { column: String, file: PathBuf },

    /// A subplot's line list names a line id with no configuration entry.
    #[error("subplot {subplot} references unknown line '{line}'")]
    UnknownLine { subplot: usize, line: String },

    /// A subplot index falls outside the figure's grid.
    #[error("subplot index {subplot} outside {rows}x{cols} grid")]
    SubplotOutOfRange {
        subplot: usize,
        rows: usize,
        cols: usize,
    },

    /// A line's resolved x and y arrays differ in length.
    #[error("line '{line}' has {xlen} x values but {ylen} y values")]
    LengthMismatch {
        line: String,
        xlen: usize,
        ylen: usize,
    },

    /// The requested output format is neither png nor svg.
    #[error("unsupported figure format '{0}' (expected png or svg)")]
    UnsupportedFormat(String),

    /// A style code (color, line style, marker, legend position) could not be
    /// parsed.
    #[error("unrecognized {what} '{value}'")]
    BadStyle { what: &'static str, value: String },

    /// File I/O failure, carrying the path it happened on.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlotError::Io {
            path: path.into(),
            source,
        }
    }
}
