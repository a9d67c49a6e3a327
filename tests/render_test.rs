//! End-to-end rendering tests: build a spec against real CSV files, save it,
//! and inspect the SVG output.

use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tracefig::config::{DataSource, FigFormat, LineColor, LineStyle};
use tracefig::{save, FigureConfig, LineConfig, PlotSpec, SubplotConfig};

fn write_sample_csv(path: &Path) {
    let mut body = String::from("t,throughput,errors\n");
    for i in 0..50 {
        let t = i as f64 * 0.1;
        body.push_str(&format!("{},{},{}\n", t, 100.0 + t * 10.0, i % 7));
    }
    fs::write(path, body).unwrap();
}

fn base_spec(dir: &Path) -> PlotSpec {
    let csv = dir.join("samples.csv");
    write_sample_csv(&csv);

    let mut spec = PlotSpec {
        figure: FigureConfig {
            file_path: format!("{}/", dir.display()),
            filename: "figure".to_string(),
            format: FigFormat::Svg,
            fig_title: Some("Run overview".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    spec.lines.insert(
        "throughput".to_string(),
        LineConfig {
            xdata: Some(DataSource::Column(csv.clone(), "t".to_string())),
            ydata: Some(DataSource::Column(csv.clone(), "throughput".to_string())),
            color: LineColor::Red,
            label: Some("Throughput".to_string()),
            ..Default::default()
        },
    );
    spec.lines.insert(
        "errors".to_string(),
        LineConfig {
            xdata: Some(DataSource::Column(csv.clone(), "t".to_string())),
            ydata: Some(DataSource::Column(csv, "errors".to_string())),
            linestyle: LineStyle::Dashed,
            label: Some("Errors".to_string()),
            ..Default::default()
        },
    );
    spec.subplots.insert(
        1,
        SubplotConfig {
            xlabel: Some("Time (s)".to_string()),
            ylabel: Some("Requests".to_string()),
            title: Some("Service load".to_string()),
            lines: vec!["throughput".to_string(), "errors".to_string()],
            legend: Some(vec!["throughput".to_string(), "errors".to_string()]),
            ..Default::default()
        },
    );
    spec
}

#[test]
fn svg_output_gets_a_png_companion() {
    let dir = tempdir().unwrap();
    let spec = base_spec(dir.path());

    let written = save(&spec).unwrap();

    assert_eq!(written.len(), 2);
    assert!(written[0].ends_with("figure.svg"));
    assert!(written[1].ends_with("figure.png"));
    assert!(dir.path().join("figure.svg").exists());
    assert!(dir.path().join("figure.png").exists());
}

#[test]
fn svg_contains_titles_labels_and_lines() {
    let dir = tempdir().unwrap();
    let spec = base_spec(dir.path());

    save(&spec).unwrap();
    let svg = fs::read_to_string(dir.path().join("figure.svg")).unwrap();

    assert!(svg.contains("Run overview"));
    assert!(svg.contains("Service load"));
    assert!(svg.contains("Time (s)"));
    assert!(svg.contains("Requests"));
    assert!(svg.contains("Throughput"));
    assert!(svg.contains("Errors"));
    assert!(svg.contains("<polyline"));
}

#[test]
fn figure_legend_collects_labeled_lines() {
    let dir = tempdir().unwrap();
    let mut spec = base_spec(dir.path());
    spec.figure.legend_ids = vec![1];
    // No per-subplot legend; only the figure-level one.
    spec.subplots.get_mut(&1).unwrap().legend = None;

    save(&spec).unwrap();
    let svg = fs::read_to_string(dir.path().join("figure.svg")).unwrap();

    assert!(svg.contains("Throughput"));
    assert!(svg.contains("Errors"));
}

#[test]
fn subplot_legends_show_only_their_listed_lines() {
    let dir = tempdir().unwrap();
    let mut spec = base_spec(dir.path());
    spec.figure.num_rows = 2;
    spec.lines.get_mut("throughput").unwrap().label = Some("AlphaSeries".to_string());
    spec.lines.get_mut("errors").unwrap().label = Some("BetaSeries".to_string());
    spec.lines.insert(
        "baseline".to_string(),
        LineConfig {
            xdata: Some(DataSource::Array(vec![0.0, 5.0])),
            ydata: Some(DataSource::Array(vec![100.0, 100.0])),
            label: Some("GammaSeries".to_string()),
            ..Default::default()
        },
    );
    spec.subplots.insert(
        1,
        SubplotConfig {
            lines: vec!["throughput".to_string(), "baseline".to_string()],
            legend: Some(vec!["throughput".to_string()]),
            ..Default::default()
        },
    );
    spec.subplots.insert(
        2,
        SubplotConfig {
            lines: vec!["errors".to_string()],
            legend: Some(vec!["errors".to_string()]),
            ..Default::default()
        },
    );

    save(&spec).unwrap();
    let svg = fs::read_to_string(dir.path().join("figure.svg")).unwrap();

    assert!(svg.contains("AlphaSeries"));
    assert!(svg.contains("BetaSeries"));
    // Drawn but listed in no legend, so its label appears nowhere.
    assert!(!svg.contains("GammaSeries"));
}

#[test]
fn configuration_errors_produce_no_output() {
    let dir = tempdir().unwrap();
    let mut spec = base_spec(dir.path());
    spec.lines.get_mut("errors").unwrap().ydata = Some(DataSource::Column(
        dir.path().join("samples.csv"),
        "nope".to_string(),
    ));

    let err = save(&spec).unwrap_err();
    assert!(err.to_string().contains("nope"));
    assert!(!dir.path().join("figure.svg").exists());
    assert!(!dir.path().join("figure.png").exists());
}

#[test]
fn unknown_line_reference_is_rejected_before_drawing() {
    let dir = tempdir().unwrap();
    let mut spec = base_spec(dir.path());
    spec.subplots
        .get_mut(&1)
        .unwrap()
        .lines
        .push("ghost".to_string());

    let err = save(&spec).unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn secondary_axis_and_span_render() {
    let dir = tempdir().unwrap();
    let mut spec = base_spec(dir.path());
    {
        let errors = spec.lines.get_mut("errors").unwrap();
        errors.right_axis = Some(tracefig::config::RightAxis {
            label: "Error rate".to_string(),
            ylim: Some((0.0, 10.0)),
            percentage: true,
        });
    }
    {
        let subplot = spec.subplots.get_mut(&1).unwrap();
        subplot.xspan = Some(vec![0.0, 1.0, 2.0, 3.0]);
        subplot.yspan = Some(vec![0.0, 1.0, 1.0, 0.0]);
    }

    save(&spec).unwrap();
    let svg = fs::read_to_string(dir.path().join("figure.svg")).unwrap();

    assert!(svg.contains("Error rate"));
    // Percentage formatting on the secondary ticks.
    assert!(svg.contains('%'));
}
