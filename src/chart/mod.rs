//! Minimal charting engine
//!
//! Draws the deck's chart types to SVG: horizontal bar charts (single,
//! grouped or stacked, with optional scatter overlays) and doughnuts.
//!
//! # Pipeline
//!
//! ```text
//! ChartConfig ──► layout::compute ──► Layout (chart area + per-point geometry)
//!                                        │
//!     grid/axes ► plugins.before ► datasets ► plugins.after ► labels/legend
//!                                        │
//!                                  Vec<DrawOp> ──► SVG
//! ```
//!
//! Layout is recomputed on every render, so plugins always see the geometry
//! of the bars they annotate, including after a resize.
//!
//! Charts are mounted on a [`canvas::Canvas`]; a canvas holds at most one
//! live [`canvas::Chart`] and refuses a second until the first is destroyed.

pub mod canvas;
pub mod draw;
pub mod layout;
pub mod plugin;

use serde::Serialize;

pub use canvas::{Canvas, Chart};
pub use draw::{DrawOp, GroupRole, TextAnchor};
pub use layout::{BarGeometry, Layout, Rect};
pub use plugin::{ChartPlugin, Frame};

pub const TEXT_DARK: &str = "#2c3e50";
pub const TEXT_AXIS: &str = "#4B5563";
pub const TEXT_TICK: &str = "#6B7280";
pub const GRID: &str = "rgba(0,0,0,0.08)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Horizontal bars, one category per row
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Bar,
    /// One dot per category, drawn over the bars
    Scatter,
}

/// Colour for a whole dataset or one per point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    Solid(String),
    PerPoint(Vec<String>),
}

impl Paint {
    pub fn at(&self, index: usize) -> &str {
        match self {
            Paint::Solid(c) => c,
            Paint::PerPoint(colors) => {
                if colors.is_empty() {
                    "#999999"
                } else {
                    &colors[index % colors.len()]
                }
            }
        }
    }
}

impl From<&str> for Paint {
    fn from(s: &str) -> Self {
        Paint::Solid(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ValueFormat {
    /// `42.5%`
    Percent(usize),
    /// `3.27`
    Fixed(usize),
}

impl ValueFormat {
    pub fn format(&self, value: f64) -> String {
        match *self {
            ValueFormat::Percent(d) => format!("{:.*}%", d, value),
            ValueFormat::Fixed(d) => format!("{:.*}", d, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
    pub kind: DatasetKind,
    pub fill: Paint,
    pub border: Paint,
    pub border_width: f64,
    /// Hidden datasets start switched off; their legend entry turns them on
    pub hidden: bool,
    /// Lower order is drawn last, i.e. on top
    pub order: i32,
    /// Per-point hover text; points without one get category and value
    pub tooltips: Vec<String>,
}

impl Dataset {
    pub fn bar(label: &str, values: Vec<f64>, fill: impl Into<Paint>, border: impl Into<Paint>) -> Self {
        Self {
            label: label.to_string(),
            values,
            kind: DatasetKind::Bar,
            fill: fill.into(),
            border: border.into(),
            border_width: 2.0,
            hidden: false,
            order: 0,
            tooltips: Vec::new(),
        }
    }

    pub fn scatter(label: &str, values: Vec<f64>, fill: &str, border: &str) -> Self {
        Self {
            kind: DatasetKind::Scatter,
            ..Self::bar(label, values, fill, border)
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_border_width(mut self, width: f64) -> Self {
        self.border_width = width;
        self
    }

    pub fn with_tooltips(mut self, tooltips: Vec<String>) -> Self {
        self.tooltips = tooltips;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// The value axis (x on horizontal bars)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueAxis {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Used when `max` is unset and the data stays below it
    pub suggested_max: Option<f64>,
    pub step: Option<f64>,
    pub title: Option<String>,
    pub percent_ticks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLabels {
    pub format: ValueFormat,
    /// Only label values strictly above this
    pub above: Option<f64>,
    /// Only label these datasets (all when `None`)
    pub datasets: Option<Vec<usize>>,
    /// Centre the label inside the bar instead of after its end
    pub inside: bool,
    pub color: String,
    /// Per-dataset colour override, e.g. white on the darkest stack segment
    pub dataset_colors: Vec<(usize, String)>,
}

impl DataLabels {
    pub fn outside(format: ValueFormat) -> Self {
        Self {
            format,
            above: None,
            datasets: None,
            inside: false,
            color: TEXT_DARK.to_string(),
            dataset_colors: Vec::new(),
        }
    }

    pub fn inside(format: ValueFormat, color: &str) -> Self {
        Self { inside: true, color: color.to_string(), ..Self::outside(format) }
    }

    pub fn shows(&self, dataset: usize, value: f64) -> bool {
        let dataset_ok = self.datasets.as_ref().map_or(true, |d| d.contains(&dataset));
        let value_ok = self.above.map_or(true, |min| value > min);
        dataset_ok && value_ok
    }

    pub fn color_for(&self, dataset: usize) -> &str {
        self.dataset_colors
            .iter()
            .find(|(i, _)| *i == dataset)
            .map(|(_, c)| c.as_str())
            .unwrap_or(&self.color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub position: LegendPosition,
    /// Drop entries whose value is zero (doughnuts)
    pub hide_zero: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Padding {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub stacked: bool,
    pub x: ValueAxis,
    pub padding: Padding,
    pub legend: Option<Legend>,
    pub data_labels: Option<DataLabels>,
    pub bar_percentage: f64,
    pub category_percentage: f64,
    /// Cut category labels longer than this
    pub label_truncate: Option<usize>,
    pub font: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            stacked: false,
            x: ValueAxis::default(),
            padding: Padding::default(),
            legend: None,
            data_labels: None,
            bar_percentage: 0.9,
            category_percentage: 0.8,
            label_truncate: None,
            font: "Manrope".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    /// One entry per category; each may span several lines
    pub labels: Vec<Vec<String>>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

impl ChartConfig {
    pub fn bar(labels: Vec<Vec<String>>) -> Self {
        Self { kind: ChartKind::Bar, labels, datasets: Vec::new(), options: ChartOptions::default() }
    }

    pub fn doughnut(labels: Vec<String>) -> Self {
        Self {
            kind: ChartKind::Doughnut,
            labels: labels.into_iter().map(|l| vec![l]).collect(),
            datasets: Vec::new(),
            options: ChartOptions::default(),
        }
    }

    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn options(mut self, options: ChartOptions) -> Self {
        self.options = options;
        self
    }

    pub fn category_count(&self) -> usize {
        self.labels.len()
    }
}

/// Single-line labels
pub fn plain_labels<I, S>(labels: I) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels.into_iter().map(|l| vec![l.into()]).collect()
}

/// Rendered size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_format() {
        assert_eq!(ValueFormat::Percent(1).format(42.46), "42.5%");
        assert_eq!(ValueFormat::Percent(0).format(19.6), "20%");
        assert_eq!(ValueFormat::Fixed(2).format(3.14159), "3.14");
    }

    #[test]
    fn test_paint_per_point_cycles() {
        let paint = Paint::PerPoint(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(paint.at(0), "a");
        assert_eq!(paint.at(3), "b");
        assert_eq!(Paint::from("c").at(7), "c");
    }

    #[test]
    fn test_data_labels_filters() {
        let mut labels = DataLabels::inside(ValueFormat::Percent(0), TEXT_DARK);
        labels.above = Some(5.0);
        labels.dataset_colors.push((2, "white".to_string()));

        assert!(!labels.shows(0, 5.0));
        assert!(labels.shows(0, 5.1));
        assert_eq!(labels.color_for(2), "white");
        assert_eq!(labels.color_for(0), TEXT_DARK);

        labels.datasets = Some(vec![0]);
        assert!(!labels.shows(1, 50.0));
    }

    #[test]
    fn test_builder() {
        let config = ChartConfig::bar(plain_labels(["A", "B"]))
            .dataset(Dataset::bar("x", vec![1.0, 2.0], "red", "red"))
            .dataset(Dataset::scatter("y", vec![1.5, 2.5], "blue", "blue").hidden());
        assert_eq!(config.category_count(), 2);
        assert_eq!(config.datasets[1].kind, DatasetKind::Scatter);
        assert!(config.datasets[1].hidden);
    }
}
