//! tracefig - render figures from JSON plot specifications and splice CSV
//! files by row range.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracefig::{combine_csv_files, save, CsvRange, PlotSpec};

/// Configuration-driven CSV plotting and row-range concatenation
#[derive(Parser, Debug)]
#[command(name = "tracefig")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON plot specification to render
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Concatenate CSV row ranges into this file (use with --range)
    #[arg(long)]
    combine: Option<PathBuf>,

    /// Row range to copy: path:start:end[:step]; repeatable, applied in order
    #[arg(long)]
    range: Vec<String>,
}

fn parse_range(spec: &str) -> Result<CsvRange> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 3 || parts.len() > 4 {
        bail!("invalid range '{}' (expected path:start:end[:step])", spec);
    }
    let start: usize = parts[1]
        .parse()
        .with_context(|| format!("invalid start row in range '{}'", spec))?;
    let end: usize = parts[2]
        .parse()
        .with_context(|| format!("invalid end row in range '{}'", spec))?;
    let mut range = CsvRange::new(parts[0], start, end);
    if let Some(step) = parts.get(3) {
        let step: usize = step
            .parse()
            .with_context(|| format!("invalid step in range '{}'", spec))?;
        range = range.with_step(step);
    }
    Ok(range)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Combine mode: splice row ranges into one file, then exit
    if let Some(ref destination) = args.combine {
        if args.range.is_empty() {
            bail!("--combine needs at least one --range");
        }
        let ranges: Vec<CsvRange> = args
            .range
            .iter()
            .map(|spec| parse_range(spec))
            .collect::<Result<_>>()?;
        combine_csv_files(destination, &ranges)?;
        eprintln!("Combined {} ranges into: {}", ranges.len(), destination.display());
        return Ok(());
    }

    let Some(ref config_path) = args.config else {
        bail!("nothing to do: pass --config to render or --combine to splice CSV files");
    };

    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let spec: PlotSpec = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    let written = save(&spec)?;
    eprintln!("Generated {} file(s):", written.len());
    for path in written {
        eprintln!("  {}", path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_specs_parse() {
        let range = parse_range("data.csv:5:100").unwrap();
        assert_eq!(range.path, PathBuf::from("data.csv"));
        assert_eq!((range.start, range.end, range.step), (5, 100, None));

        let stepped = parse_range("data.csv:0:10:2").unwrap();
        assert_eq!(stepped.step, Some(2));

        assert!(parse_range("data.csv:5").is_err());
        assert!(parse_range("data.csv:a:b").is_err());
    }
}
