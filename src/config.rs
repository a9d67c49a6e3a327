//! Figure, subplot, and line configuration structures.
//!
//! These mirror the three nested mapping surfaces of the plotting helper:
//! one [`FigureConfig`] per invocation, [`SubplotConfig`] keyed by 1-based
//! subplot index, and [`LineConfig`] keyed by an arbitrary line id. Every
//! optional field left unset keeps the plotting backend's default.

use crate::error::PlotError;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

/// A complete plot specification: figure, subplots by index, lines by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSpec {
    pub figure: FigureConfig,
    pub subplots: BTreeMap<usize, SubplotConfig>,
    pub lines: BTreeMap<String, LineConfig>,
}

/// Figure-level configuration: grid shape, physical size, title, margins,
/// figure legend, and output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Number of subplot rows.
    pub num_rows: usize,
    /// Number of subplot columns.
    pub num_cols: usize,
    /// Figure width in inches (rendered at 100 dpi).
    pub width: f64,
    /// Figure height in inches, defaulting to 9 (portrait).
    pub height: f64,
    /// Overall figure title.
    pub fig_title: Option<String>,
    /// Vertical placement of the title, as a fraction of figure height
    /// measured from the bottom.
    pub title_y: f64,
    /// Base font size for all text in this figure. Scoped to the render
    /// call; nothing process-wide is mutated.
    pub fontsize: u32,
    /// Left edge of the subplot region, as a fraction of figure width.
    pub left: f64,
    /// Right edge of the subplot region, as a fraction of figure width.
    pub right: f64,
    /// Bottom edge of the subplot region, as a fraction of figure height.
    pub bottom: f64,
    /// Top edge of the subplot region, as a fraction of figure height.
    pub top: f64,
    /// Horizontal gap between subplots, as a fraction of average panel width.
    pub wspace: f64,
    /// Vertical gap between subplots, as a fraction of average panel height.
    pub hspace: f64,
    /// Subplot indices whose drawn lines feed the figure-level legend, in
    /// the order their entries are concatenated. Empty means no figure legend.
    pub legend_ids: Vec<usize>,
    /// Placement options for the figure-level legend.
    pub legend: LegendStyle,
    /// Directory prefix for output files, joined by string concatenation.
    pub file_path: String,
    /// Output file name without extension.
    pub filename: String,
    /// Output format; a non-PNG format also writes a PNG companion.
    pub format: FigFormat,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            num_rows: 1,
            num_cols: 1,
            width: 6.0,
            height: 9.0,
            fig_title: None,
            title_y: 0.98,
            fontsize: 10,
            left: 0.125,
            right: 0.9,
            bottom: 0.05,
            top: 0.9,
            wspace: 0.2,
            hspace: 0.2,
            legend_ids: Vec::new(),
            legend: LegendStyle::default(),
            file_path: "./".to_string(),
            filename: "new_fig".to_string(),
            format: FigFormat::Png,
        }
    }
}

/// Per-subplot configuration. Absent fields leave the backend default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubplotConfig {
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub xscale: Scale,
    pub yscale: Scale,
    /// Explicit x tick positions. Applies to linear axes; a log axis keeps
    /// its own tick generation.
    pub xticks: Option<Vec<f64>>,
    pub yticks: Option<Vec<f64>>,
    /// Format x tick labels as percentages.
    pub xticks_percentage: bool,
    pub yticks_percentage: bool,
    /// Which grid lines to show; `None` hides the grid entirely.
    pub show_grid: Option<GridWhich>,
    /// Axis the grid applies to. Only meaningful when `show_grid` is set.
    pub grid_axis: GridAxis,
    pub title: Option<String>,
    /// Vertical placement of the title in axes coordinates (1.0 = top edge;
    /// negative values sit below the panel).
    pub title_y: f64,
    /// Line ids to draw, in order.
    pub lines: Vec<String>,
    /// Line ids to include in this subplot's legend, in order. `None` means
    /// no legend.
    pub legend: Option<Vec<String>>,
    /// Legend placement and column count. When `bbox_anchor` is set, the
    /// anchor wins and these are ignored.
    pub legend_style: LegendStyle,
    /// Anchor point for the legend box in axes coordinates.
    pub bbox_anchor: Option<(f64, f64)>,
    /// X positions of the shaded span. Shading happens only when `yspan` is
    /// present as well.
    pub xspan: Option<Vec<f64>>,
    /// Predicate values for the span: the region is shaded where the value
    /// exceeds zero.
    pub yspan: Option<Vec<f64>>,
    /// Fill styling for the shaded span.
    pub fill: FillStyle,
}

impl Default for SubplotConfig {
    fn default() -> Self {
        Self {
            xlabel: None,
            ylabel: None,
            xlim: None,
            ylim: None,
            xscale: Scale::Linear,
            yscale: Scale::Linear,
            xticks: None,
            yticks: None,
            xticks_percentage: false,
            yticks_percentage: false,
            show_grid: None,
            grid_axis: GridAxis::Both,
            title: None,
            title_y: 1.0,
            lines: Vec::new(),
            legend: None,
            legend_style: LegendStyle::default(),
            bbox_anchor: None,
            xspan: None,
            yspan: None,
            fill: FillStyle::default(),
        }
    }
}

/// Per-line configuration: data sources, styling, and optional secondary
/// y-axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// X data: a (file, column) reference or a precomputed array. One of the
    /// two must be present.
    pub xdata: Option<DataSource>,
    /// Y data, same shape as `xdata`.
    pub ydata: Option<DataSource>,
    pub color: LineColor,
    pub linestyle: LineStyle,
    pub marker: Option<Marker>,
    /// Draw a marker only every n-th point.
    pub markevery: usize,
    /// Legend label. Unlabeled lines are drawn but never appear in legends.
    pub label: Option<String>,
    /// Secondary y-axis for this line; the label doubles as the axis label.
    pub right_axis: Option<RightAxis>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            xdata: None,
            ydata: None,
            color: LineColor::Blue,
            linestyle: LineStyle::Solid,
            marker: None,
            markevery: 1,
            label: None,
            right_axis: None,
        }
    }
}

/// Secondary y-axis settings for a single line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightAxis {
    /// Axis label for the right-hand y-axis.
    pub label: String,
    /// Explicit limits for the right-hand y-axis.
    #[serde(default)]
    pub ylim: Option<(f64, f64)>,
    /// Format the right-hand tick labels as percentages.
    #[serde(default)]
    pub percentage: bool,
}

/// Where a line's data comes from. In JSON a two-string array is a
/// (file, column) reference and a numeric array is the data itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    Column(PathBuf, String),
    Array(Vec<f64>),
}

/// Legend placement and layout options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendStyle {
    pub position: LegendPosition,
    pub columns: usize,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            position: LegendPosition::Best,
            columns: 1,
        }
    }
}

/// Fill styling for span shading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillStyle {
    pub color: LineColor,
    /// Fill opacity between 0 and 1.
    pub alpha: f64,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            color: LineColor::Blue,
            alpha: 0.3,
        }
    }
}

/// Axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Linear,
    Log,
}

/// Which grid lines to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridWhich {
    Major,
    Minor,
    Both,
}

/// Which axis the grid applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridAxis {
    X,
    Y,
    Both,
}

/// Line color: matplotlib-style single-letter codes or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineColor {
    Blue,
    Green,
    Red,
    Cyan,
    Magenta,
    Yellow,
    Black,
    White,
    Rgb(u8, u8, u8),
}

impl LineColor {
    /// The concrete backend color.
    pub fn rgb(&self) -> RGBColor {
        match self {
            LineColor::Blue => RGBColor(0, 0, 255),
            LineColor::Green => RGBColor(0, 128, 0),
            LineColor::Red => RGBColor(255, 0, 0),
            LineColor::Cyan => RGBColor(0, 191, 191),
            LineColor::Magenta => RGBColor(191, 0, 191),
            LineColor::Yellow => RGBColor(191, 191, 0),
            LineColor::Black => RGBColor(0, 0, 0),
            LineColor::White => RGBColor(255, 255, 255),
            LineColor::Rgb(r, g, b) => RGBColor(*r, *g, *b),
        }
    }
}

impl FromStr for LineColor {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "b" => Ok(LineColor::Blue),
            "g" => Ok(LineColor::Green),
            "r" => Ok(LineColor::Red),
            "c" => Ok(LineColor::Cyan),
            "m" => Ok(LineColor::Magenta),
            "y" => Ok(LineColor::Yellow),
            "k" => Ok(LineColor::Black),
            "w" => Ok(LineColor::White),
            hex if hex.len() == 7 && hex.starts_with('#') => {
                let parse = |range| u8::from_str_radix(&hex[range], 16);
                match (parse(1..3), parse(3..5), parse(5..7)) {
                    (Ok(r), Ok(g), Ok(b)) => Ok(LineColor::Rgb(r, g, b)),
                    _ => Err(PlotError::BadStyle {
                        what: "color",
                        value: s.to_string(),
                    }),
                }
            }
            _ => Err(PlotError::BadStyle {
                what: "color",
                value: s.to_string(),
            }),
        }
    }
}

impl From<LineColor> for String {
    fn from(color: LineColor) -> String {
        match color {
            LineColor::Blue => "b".to_string(),
            LineColor::Green => "g".to_string(),
            LineColor::Red => "r".to_string(),
            LineColor::Cyan => "c".to_string(),
            LineColor::Magenta => "m".to_string(),
            LineColor::Yellow => "y".to_string(),
            LineColor::Black => "k".to_string(),
            LineColor::White => "w".to_string(),
            LineColor::Rgb(r, g, b) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

impl TryFrom<String> for LineColor {
    type Error = PlotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Line style codes: `-`, `--`, `-.`, `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl FromStr for LineStyle {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(LineStyle::Solid),
            "--" => Ok(LineStyle::Dashed),
            "-." => Ok(LineStyle::DashDot),
            ":" => Ok(LineStyle::Dotted),
            _ => Err(PlotError::BadStyle {
                what: "line style",
                value: s.to_string(),
            }),
        }
    }
}

impl From<LineStyle> for String {
    fn from(style: LineStyle) -> String {
        match style {
            LineStyle::Solid => "-",
            LineStyle::Dashed => "--",
            LineStyle::DashDot => "-.",
            LineStyle::Dotted => ":",
        }
        .to_string()
    }
}

impl TryFrom<String> for LineStyle {
    type Error = PlotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Marker codes: `o`, `.`, `s`, `^`, `x`, `+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Marker {
    Circle,
    Point,
    Square,
    Triangle,
    Cross,
    Plus,
}

impl FromStr for Marker {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "o" => Ok(Marker::Circle),
            "." => Ok(Marker::Point),
            "s" => Ok(Marker::Square),
            "^" => Ok(Marker::Triangle),
            "x" => Ok(Marker::Cross),
            "+" => Ok(Marker::Plus),
            _ => Err(PlotError::BadStyle {
                what: "marker",
                value: s.to_string(),
            }),
        }
    }
}

impl From<Marker> for String {
    fn from(marker: Marker) -> String {
        match marker {
            Marker::Circle => "o",
            Marker::Point => ".",
            Marker::Square => "s",
            Marker::Triangle => "^",
            Marker::Cross => "x",
            Marker::Plus => "+",
        }
        .to_string()
    }
}

impl TryFrom<String> for Marker {
    type Error = PlotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Legend placement, matplotlib location strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LegendPosition {
    Best,
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
    CenterLeft,
    CenterRight,
    UpperCenter,
    LowerCenter,
}

impl FromStr for LegendPosition {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(LegendPosition::Best),
            "upper right" => Ok(LegendPosition::UpperRight),
            "upper left" => Ok(LegendPosition::UpperLeft),
            "lower left" => Ok(LegendPosition::LowerLeft),
            "lower right" => Ok(LegendPosition::LowerRight),
            "center left" => Ok(LegendPosition::CenterLeft),
            "center right" => Ok(LegendPosition::CenterRight),
            "upper center" => Ok(LegendPosition::UpperCenter),
            "lower center" => Ok(LegendPosition::LowerCenter),
            _ => Err(PlotError::BadStyle {
                what: "legend position",
                value: s.to_string(),
            }),
        }
    }
}

impl From<LegendPosition> for String {
    fn from(pos: LegendPosition) -> String {
        match pos {
            LegendPosition::Best => "best",
            LegendPosition::UpperRight => "upper right",
            LegendPosition::UpperLeft => "upper left",
            LegendPosition::LowerLeft => "lower left",
            LegendPosition::LowerRight => "lower right",
            LegendPosition::CenterLeft => "center left",
            LegendPosition::CenterRight => "center right",
            LegendPosition::UpperCenter => "upper center",
            LegendPosition::LowerCenter => "lower center",
        }
        .to_string()
    }
}

impl TryFrom<String> for LegendPosition {
    type Error = PlotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Output figure format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FigFormat {
    Png,
    Svg,
}

impl FigFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FigFormat::Png => "png",
            FigFormat::Svg => "svg",
        }
    }
}

impl FromStr for FigFormat {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(FigFormat::Png),
            "svg" => Ok(FigFormat::Svg),
            _ => Err(PlotError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl From<FigFormat> for String {
    fn from(format: FigFormat) -> String {
        format.extension().to_string()
    }
}

impl TryFrom<String> for FigFormat {
    type Error = PlotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_defaults_match_runtime_values() {
        let cfg = FigureConfig::default();
        assert_eq!(cfg.num_rows, 1);
        assert_eq!(cfg.num_cols, 1);
        assert_eq!(cfg.width, 6.0);
        assert_eq!(cfg.height, 9.0);
        assert_eq!(cfg.fontsize, 10);
        assert_eq!(cfg.left, 0.125);
        assert_eq!(cfg.right, 0.9);
        assert_eq!(cfg.bottom, 0.05);
        assert_eq!(cfg.top, 0.9);
        assert_eq!(cfg.wspace, 0.2);
        assert_eq!(cfg.hspace, 0.2);
        assert_eq!(cfg.file_path, "./");
        assert_eq!(cfg.filename, "new_fig");
        assert_eq!(cfg.format, FigFormat::Png);
    }

    #[test]
    fn style_codes_parse() {
        assert_eq!("k".parse::<LineColor>().unwrap(), LineColor::Black);
        assert_eq!(
            "#ff8000".parse::<LineColor>().unwrap(),
            LineColor::Rgb(255, 128, 0)
        );
        assert_eq!("-.".parse::<LineStyle>().unwrap(), LineStyle::DashDot);
        assert_eq!("^".parse::<Marker>().unwrap(), Marker::Triangle);
        assert_eq!(
            "upper right".parse::<LegendPosition>().unwrap(),
            LegendPosition::UpperRight
        );
        assert!("z".parse::<LineColor>().is_err());
        assert!("pdf".parse::<FigFormat>().is_err());
    }

    #[test]
    fn spec_round_trips_through_json() {
        let mut spec = PlotSpec::default();
        spec.lines.insert(
            "model".to_string(),
            LineConfig {
                xdata: Some(DataSource::Column("data.csv".into(), "t".to_string())),
                ydata: Some(DataSource::Array(vec![1.0, 2.0, 3.0])),
                color: LineColor::Red,
                linestyle: LineStyle::Dashed,
                label: Some("Model".to_string()),
                ..Default::default()
            },
        );
        spec.subplots.insert(
            1,
            SubplotConfig {
                lines: vec!["model".to_string()],
                legend: Some(vec!["model".to_string()]),
                ..Default::default()
            },
        );

        let json = serde_json::to_string(&spec).unwrap();
        let back: PlotSpec = serde_json::from_str(&json).unwrap();
        let line = &back.lines["model"];
        assert!(matches!(line.xdata, Some(DataSource::Column(_, _))));
        assert!(matches!(line.ydata, Some(DataSource::Array(ref a)) if a.len() == 3));
        assert_eq!(line.color, LineColor::Red);
        assert_eq!(back.subplots[&1].lines, vec!["model".to_string()]);
    }

    #[test]
    fn data_source_json_shapes_disambiguate() {
        let col: DataSource = serde_json::from_str(r#"["a.csv", "t"]"#).unwrap();
        assert!(matches!(col, DataSource::Column(_, _)));
        let arr: DataSource = serde_json::from_str("[1.5, 2.5]").unwrap();
        assert!(matches!(arr, DataSource::Array(ref a) if a == &vec![1.5, 2.5]));
    }
}
