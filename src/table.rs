//! CSV tables, the per-call file cache, and line data resolution.
//!
//! The resolver runs once over all line configurations before any rendering,
//! so configuration errors surface before a single pixel is drawn and each
//! distinct file is read from storage exactly once per call.

use crate::config::{DataSource, LineConfig};
use crate::error::PlotError;
use csv::ReaderBuilder;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A loaded CSV file: header row plus one numeric column per header.
/// Cells that do not parse as numbers become NaN.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    /// Read and parse a whole CSV file.
    pub fn from_path(path: &Path) -> Result<Self, PlotError> {
        let file = File::open(path).map_err(|e| PlotError::io(path, e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PlotError::io(path, std::io::Error::other(e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut columns = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(|e| PlotError::io(path, std::io::Error::other(e)))?;
            for (i, column) in columns.iter_mut().enumerate() {
                let value = record
                    .get(i)
                    .and_then(|field| field.parse::<f64>().ok())
                    .unwrap_or(f64::NAN);
                column.push(value);
            }
        }

        Ok(Self { headers, columns })
    }

    /// Look up a column by header name.
    pub fn column(&self, name: &str, path: &Path) -> Result<&[f64], PlotError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| PlotError::MissingColumn {
                column: name.to_string(),
                file: path.to_path_buf(),
            })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

/// Cache mapping file path to its loaded table, rebuilt per rendering call.
/// However many lines and axes reference the same path, it is read from
/// storage once; `files_read` exposes the count for tests.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<PathBuf, Table>,
    reads: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, reading it on first use.
    pub fn load(&mut self, path: &Path) -> Result<&Table, PlotError> {
        match self.tables.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let table = Table::from_path(path)?;
                self.reads += 1;
                Ok(slot.insert(table))
            }
        }
    }

    /// How many files have actually been read from storage.
    pub fn files_read(&self) -> usize {
        self.reads
    }
}

/// A line's resolved data arrays.
#[derive(Debug, Clone)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    /// The (x, y) pairs, in order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Resolve every line's x and y arrays, loading each referenced file at most
/// once via `cache`. Fails when a line carries neither an array nor a file
/// reference for an axis, when a referenced column is absent, or when the
/// resolved arrays differ in length.
pub fn resolve_lines(
    lines: &BTreeMap<String, LineConfig>,
    cache: &mut TableCache,
) -> Result<BTreeMap<String, Series>, PlotError> {
    let mut resolved = BTreeMap::new();
    for (id, line) in lines {
        let x = resolve_axis(cache, line.xdata.as_ref(), id, 'x')?;
        let y = resolve_axis(cache, line.ydata.as_ref(), id, 'y')?;
        if x.len() != y.len() {
            return Err(PlotError::LengthMismatch {
                line: id.clone(),
                xlen: x.len(),
                ylen: y.len(),
            });
        }
        resolved.insert(id.clone(), Series { x, y });
    }
    Ok(resolved)
}

fn resolve_axis(
    cache: &mut TableCache,
    source: Option<&DataSource>,
    line: &str,
    axis: char,
) -> Result<Vec<f64>, PlotError> {
    match source {
        Some(DataSource::Array(values)) => Ok(values.clone()),
        Some(DataSource::Column(file, column)) => {
            let table = cache.load(file)?;
            Ok(table.column(column, file)?.to_vec())
        }
        None => Err(PlotError::MissingDataSource {
            line: line.to_string(),
            axis,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn line(file: &Path, xcol: &str, ycol: &str) -> LineConfig {
        LineConfig {
            xdata: Some(DataSource::Column(file.to_path_buf(), xcol.to_string())),
            ydata: Some(DataSource::Column(file.to_path_buf(), ycol.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn shared_file_is_read_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "t,a,b\n0,1,10\n1,2,20\n2,3,30\n").unwrap();

        let mut lines = BTreeMap::new();
        lines.insert("first".to_string(), line(&path, "t", "a"));
        lines.insert("second".to_string(), line(&path, "t", "b"));

        let mut cache = TableCache::new();
        let resolved = resolve_lines(&lines, &mut cache).unwrap();

        assert_eq!(cache.files_read(), 1);
        assert_eq!(resolved["first"].y, vec![1.0, 2.0, 3.0]);
        assert_eq!(resolved["second"].y, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn precomputed_arrays_bypass_files() {
        let mut lines = BTreeMap::new();
        lines.insert(
            "inline".to_string(),
            LineConfig {
                xdata: Some(DataSource::Array(vec![0.0, 1.0])),
                ydata: Some(DataSource::Array(vec![5.0, 6.0])),
                ..Default::default()
            },
        );

        let mut cache = TableCache::new();
        let resolved = resolve_lines(&lines, &mut cache).unwrap();

        assert_eq!(cache.files_read(), 0);
        assert_eq!(resolved["inline"].x, vec![0.0, 1.0]);
    }

    #[test]
    fn missing_source_is_a_configuration_error() {
        let mut lines = BTreeMap::new();
        lines.insert(
            "bad".to_string(),
            LineConfig {
                ydata: Some(DataSource::Array(vec![1.0])),
                ..Default::default()
            },
        );

        let err = resolve_lines(&lines, &mut TableCache::new()).unwrap_err();
        assert!(matches!(
            err,
            PlotError::MissingDataSource { ref line, axis: 'x' } if line == "bad"
        ));
    }

    #[test]
    fn missing_column_is_reported_with_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "t,a\n0,1\n").unwrap();

        let mut lines = BTreeMap::new();
        lines.insert("bad".to_string(), line(&path, "t", "nope"));

        let err = resolve_lines(&lines, &mut TableCache::new()).unwrap_err();
        assert!(matches!(
            err,
            PlotError::MissingColumn { ref column, .. } if column == "nope"
        ));
    }

    #[test]
    fn missing_file_propagates_not_found() {
        let mut lines = BTreeMap::new();
        lines.insert(
            "bad".to_string(),
            line(Path::new("/definitely/not/here.csv"), "t", "a"),
        );

        let err = resolve_lines(&lines, &mut TableCache::new()).unwrap_err();
        assert!(matches!(err, PlotError::Io { .. }));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut lines = BTreeMap::new();
        lines.insert(
            "bad".to_string(),
            LineConfig {
                xdata: Some(DataSource::Array(vec![0.0, 1.0, 2.0])),
                ydata: Some(DataSource::Array(vec![1.0])),
                ..Default::default()
            },
        );

        let err = resolve_lines(&lines, &mut TableCache::new()).unwrap_err();
        assert!(matches!(err, PlotError::LengthMismatch { xlen: 3, ylen: 1, .. }));
    }

    #[test]
    fn non_numeric_cells_become_nan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "t,a\n0,oops\n1,2\n").unwrap();

        let table = Table::from_path(&path).unwrap();
        let col = table.column("a", &path).unwrap();
        assert!(col[0].is_nan());
        assert_eq!(col[1], 2.0);
    }
}
