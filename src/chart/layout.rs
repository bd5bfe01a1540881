//! Geometry for a chart at a given size
//!
//! Bar charts are horizontal: categories run top to bottom, values left to
//! right. Each point gets a [`BarGeometry`] with its vertical centre and
//! thickness, which is what the zone plugin reads to place its bands.

use super::{ChartConfig, ChartKind, DatasetKind, LegendPosition, Size};
use crate::wrap::truncate_label;
use serde::Serialize;
use std::f64::consts::PI;

/// Approximate glyph width at the 11-12px label size
pub const CHAR_WIDTH: f64 = 6.5;
pub const LINE_HEIGHT: f64 = 13.0;
pub const LEGEND_HEIGHT: f64 = 28.0;
pub const TICK_HEIGHT: f64 = 18.0;
pub const AXIS_TITLE_HEIGHT: f64 = 22.0;
pub const POINT_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// One drawn point: a bar, a stack segment or a scatter dot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarGeometry {
    /// Where the value ends (bar tip or dot centre)
    pub x: f64,
    /// Where the bar starts
    pub base: f64,
    /// Vertical centre
    pub y: f64,
    /// Thickness
    pub height: f64,
}

impl BarGeometry {
    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn width(&self) -> f64 {
        (self.x - self.base).abs()
    }
}

/// Linear value scale mapped onto the chart area
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
    pub left: f64,
    pub width: f64,
}

impl Scale {
    pub fn x(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        let t = ((value - self.min) / span).clamp(0.0, 1.0);
        self.left + t * self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcGeometry {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcGeometry {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Donut {
    pub cx: f64,
    pub cy: f64,
    pub outer: f64,
    pub inner: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub size: Size,
    pub area: Rect,
    pub scale: Scale,
    pub ticks: Vec<f64>,
    /// Category labels after truncation
    pub labels: Vec<Vec<String>>,
    /// Vertical centre of each category row
    pub centers: Vec<f64>,
    /// `datasets[d][i]` is point `i` of dataset `d`
    pub datasets: Vec<Vec<BarGeometry>>,
    pub donut: Option<Donut>,
    pub arcs: Vec<ArcGeometry>,
    pub legend: Option<Rect>,
}

pub fn compute(config: &ChartConfig, size: Size) -> Layout {
    match config.kind {
        ChartKind::Bar => bar_layout(config, size),
        ChartKind::Doughnut => doughnut_layout(config, size),
    }
}

fn legend_rect(config: &ChartConfig, size: Size) -> Option<Rect> {
    let legend = config.options.legend.as_ref()?;
    let pad = config.options.padding;
    let y = match legend.position {
        LegendPosition::Top => pad.top,
        LegendPosition::Bottom => size.height - pad.bottom - LEGEND_HEIGHT,
    };
    Some(Rect { x: pad.left, y, width: size.width - pad.left - pad.right, height: LEGEND_HEIGHT })
}

fn bar_layout(config: &ChartConfig, size: Size) -> Layout {
    let opts = &config.options;
    let pad = opts.padding;
    let legend = legend_rect(config, size);

    let labels: Vec<Vec<String>> = match opts.label_truncate {
        Some(max) => config
            .labels
            .iter()
            .map(|lines| lines.iter().map(|l| truncate_label(l, max)).collect())
            .collect(),
        None => config.labels.clone(),
    };
    let longest = labels
        .iter()
        .flatten()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let label_width = if longest > 0 { longest as f64 * CHAR_WIDTH + 10.0 } else { 0.0 };

    let legend_top = matches!(opts.legend.as_ref().map(|l| l.position), Some(LegendPosition::Top));
    let legend_bottom = matches!(opts.legend.as_ref().map(|l| l.position), Some(LegendPosition::Bottom));

    let left = pad.left + label_width;
    let right = size.width - pad.right;
    let top = pad.top + if legend_top { LEGEND_HEIGHT } else { 0.0 };
    let bottom = size.height
        - pad.bottom
        - TICK_HEIGHT
        - if opts.x.title.is_some() { AXIS_TITLE_HEIGHT } else { 0.0 }
        - if legend_bottom { LEGEND_HEIGHT } else { 0.0 };
    let area = Rect {
        x: left,
        y: top,
        width: (right - left).max(1.0),
        height: (bottom - top).max(1.0),
    };

    let (min, max) = value_range(config);
    let scale = Scale { min, max, left: area.x, width: area.width };
    let step = opts.x.step.unwrap_or_else(|| nice_step(max - min));
    let ticks = tick_values(min, max, step);

    let n = labels.len();
    let category_height = if n > 0 { area.height / n as f64 } else { 0.0 };
    let centers: Vec<f64> = (0..n)
        .map(|i| area.y + category_height * (i as f64 + 0.5))
        .collect();

    let bar_sets: Vec<usize> = config
        .datasets
        .iter()
        .enumerate()
        .filter(|(_, d)| d.kind == DatasetKind::Bar && !d.hidden)
        .map(|(i, _)| i)
        .collect();
    let slot = category_height * opts.category_percentage;
    let grouped = !opts.stacked && bar_sets.len() > 1;
    let thickness = if grouped {
        slot / bar_sets.len() as f64 * opts.bar_percentage
    } else {
        slot * opts.bar_percentage
    };

    let mut stack_ends = vec![min; n];
    let datasets = config
        .datasets
        .iter()
        .enumerate()
        .map(|(d, dataset)| {
            (0..n)
                .map(|i| {
                    let value = dataset.values.get(i).copied().unwrap_or(0.0);
                    let center = centers[i];
                    match dataset.kind {
                        DatasetKind::Scatter => BarGeometry {
                            x: scale.x(value),
                            base: scale.x(value),
                            y: center,
                            height: POINT_RADIUS * 2.0,
                        },
                        DatasetKind::Bar if opts.stacked && !dataset.hidden => {
                            let start = stack_ends[i];
                            stack_ends[i] = start + value;
                            BarGeometry {
                                x: scale.x(start + value),
                                base: scale.x(start),
                                y: center,
                                height: thickness,
                            }
                        }
                        DatasetKind::Bar => {
                            let y = match bar_sets.iter().position(|&b| b == d) {
                                Some(pos) if grouped => {
                                    let slot_top = center - slot / 2.0;
                                    let per = slot / bar_sets.len() as f64;
                                    slot_top + per * (pos as f64 + 0.5)
                                }
                                _ => center,
                            };
                            BarGeometry {
                                x: scale.x(value),
                                base: scale.x(min.max(0.0).min(max)),
                                y,
                                height: thickness,
                            }
                        }
                    }
                })
                .collect()
        })
        .collect();

    Layout {
        size,
        area,
        scale,
        ticks,
        labels,
        centers,
        datasets,
        donut: None,
        arcs: Vec::new(),
        legend,
    }
}

/// Axis bounds: explicit min/max win, otherwise fit the data
fn value_range(config: &ChartConfig) -> (f64, f64) {
    let axis = &config.options.x;
    let min = axis.min.unwrap_or(0.0);
    if let Some(max) = axis.max {
        return (min, if max > min { max } else { min + 1.0 });
    }

    let visible = config.datasets.iter().filter(|d| !d.hidden);
    let data_max = if config.options.stacked {
        (0..config.labels.len())
            .map(|i| {
                visible
                    .clone()
                    .filter(|d| d.kind == DatasetKind::Bar)
                    .map(|d| d.values.get(i).copied().unwrap_or(0.0))
                    .sum::<f64>()
            })
            .fold(f64::NEG_INFINITY, f64::max)
    } else {
        visible
            .flat_map(|d| d.values.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max)
    };

    let wanted = match axis.suggested_max {
        Some(s) if !data_max.is_finite() || s > data_max => s,
        _ => data_max,
    };
    if !wanted.is_finite() || wanted <= min {
        return (min, min + 1.0);
    }
    let step = axis.step.unwrap_or_else(|| nice_step(wanted - min));
    (min, min + ((wanted - min) / step).ceil() * step)
}

/// 1, 2 or 5 times a power of ten, giving roughly five to ten ticks
pub fn nice_step(span: f64) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let raw = span / 8.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn tick_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 {
        return vec![min, max];
    }
    let count = ((max - min) / step + 1e-9).floor() as usize;
    (0..=count).map(|k| min + step * k as f64).collect()
}

fn doughnut_layout(config: &ChartConfig, size: Size) -> Layout {
    let pad = config.options.padding;
    let legend = legend_rect(config, size);
    let legend_top = legend.filter(|_| {
        matches!(config.options.legend.as_ref().map(|l| l.position), Some(LegendPosition::Top))
    });

    let top = pad.top + legend_top.map_or(0.0, |r| r.height);
    let bottom = size.height - pad.bottom - if legend.is_some() && legend_top.is_none() { LEGEND_HEIGHT } else { 0.0 };
    let area = Rect {
        x: pad.left,
        y: top,
        width: (size.width - pad.left - pad.right).max(1.0),
        height: (bottom - top).max(1.0),
    };
    let outer = (area.width.min(area.height) / 2.0 - 4.0).max(1.0);
    let donut = Donut {
        cx: area.x + area.width / 2.0,
        cy: area.y + area.height / 2.0,
        outer,
        inner: outer * 0.5,
    };

    let values: &[f64] = config.datasets.first().map(|d| d.values.as_slice()).unwrap_or(&[]);
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let mut arcs = Vec::new();
    if total > 0.0 {
        let mut angle = -PI / 2.0;
        for (index, &v) in values.iter().enumerate() {
            if v <= 0.0 {
                continue;
            }
            let sweep = v / total * 2.0 * PI;
            arcs.push(ArcGeometry { index, start_angle: angle, end_angle: angle + sweep });
            angle += sweep;
        }
    }

    Layout {
        size,
        area,
        scale: Scale { min: 0.0, max: 1.0, left: area.x, width: area.width },
        ticks: Vec::new(),
        labels: config.labels.clone(),
        centers: Vec::new(),
        datasets: Vec::new(),
        donut: Some(donut),
        arcs,
        legend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{plain_labels, ChartOptions, Dataset, ValueAxis};

    fn bars(values: Vec<f64>) -> ChartConfig {
        let labels = plain_labels((0..values.len()).map(|i| format!("c{}", i)));
        ChartConfig::bar(labels).dataset(Dataset::bar("v", values, "red", "red"))
    }

    #[test]
    fn test_bars_stack_top_to_bottom() {
        let layout = compute(&bars(vec![4.0, 3.0, 2.0]), Size::new(600.0, 300.0));
        let g = &layout.datasets[0];
        assert_eq!(g.len(), 3);
        assert!(g[0].y < g[1].y && g[1].y < g[2].y);
        // Rows do not overlap
        assert!(g[0].bottom() <= g[1].top());
    }

    #[test]
    fn test_bar_width_follows_value() {
        let mut config = bars(vec![5.0, 2.5]);
        config.options.x = ValueAxis { min: Some(0.0), max: Some(5.0), ..Default::default() };
        let layout = compute(&config, Size::new(600.0, 200.0));
        let g = &layout.datasets[0];
        assert!((g[0].width() - layout.area.width).abs() < 1e-9);
        assert!((g[1].width() - layout.area.width / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_changes_geometry() {
        let config = bars(vec![4.0, 3.0]);
        let small = compute(&config, Size::new(600.0, 200.0));
        let tall = compute(&config, Size::new(600.0, 400.0));
        assert!(tall.datasets[0][1].y > small.datasets[0][1].y);
    }

    #[test]
    fn test_stacked_segments_are_adjacent() {
        let config = ChartConfig::bar(plain_labels(["a"]))
            .dataset(Dataset::bar("low", vec![20.0], "a", "a"))
            .dataset(Dataset::bar("med", vec![30.0], "b", "b"))
            .dataset(Dataset::bar("high", vec![50.0], "c", "c"))
            .options(ChartOptions {
                stacked: true,
                x: ValueAxis { max: Some(100.0), ..Default::default() },
                ..Default::default()
            });
        let layout = compute(&config, Size::new(700.0, 120.0));
        let (low, med, high) = (layout.datasets[0][0], layout.datasets[1][0], layout.datasets[2][0]);
        assert!((low.x - med.base).abs() < 1e-9);
        assert!((med.x - high.base).abs() < 1e-9);
        assert!((high.x - layout.area.right()).abs() < 1e-9);
        let w = layout.area.width;
        assert!((low.width() - 0.2 * w).abs() < 1e-9);
        assert!((med.width() - 0.3 * w).abs() < 1e-9);
        assert!((high.width() - 0.5 * w).abs() < 1e-9);
    }

    #[test]
    fn test_suggested_max_extends_axis() {
        let mut config = bars(vec![12.0, 30.0]);
        config.options.x.suggested_max = Some(35.0);
        let layout = compute(&config, Size::new(600.0, 200.0));
        assert!(layout.scale.max >= 35.0);
    }

    #[test]
    fn test_empty_bar_chart() {
        let layout = compute(&bars(vec![]), Size::new(600.0, 200.0));
        assert!(layout.centers.is_empty());
        assert!(layout.datasets[0].is_empty());
    }

    #[test]
    fn test_doughnut_skips_zero_segments() {
        let config = ChartConfig::doughnut(vec!["a".into(), "b".into(), "c".into()])
            .dataset(Dataset::bar("g", vec![60.0, 0.0, 40.0], "x", "x"));
        let layout = compute(&config, Size::new(300.0, 300.0));
        assert_eq!(layout.arcs.len(), 2);
        assert_eq!(layout.arcs[1].index, 2);
        let sweep: f64 = layout.arcs.iter().map(|a| a.end_angle - a.start_angle).sum();
        assert!((sweep - 2.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(100.0), 20.0);
        assert_eq!(nice_step(40.0), 5.0);
        assert!((nice_step(4.0) - 0.5).abs() < 1e-12);
    }
}
