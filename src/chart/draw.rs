//! Paint pass and SVG output

use super::layout::{self, Layout, Rect, LINE_HEIGHT, POINT_RADIUS};
use super::plugin::{ChartPlugin, Frame};
use super::{ChartConfig, ChartKind, DatasetKind, Size, GRID, TEXT_AXIS, TEXT_DARK, TEXT_TICK};
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// What a `<g>` group stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    /// The marks and labels of one dataset
    Series,
    /// One clickable legend entry
    LegendItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawOp {
    Rect {
        rect: Rect,
        fill: String,
        stroke: Option<String>,
        stroke_width: f64,
        radius: f64,
        /// Hover text
        tip: Option<String>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
        width: f64,
        dash: Option<(f64, f64)>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: TextAnchor,
        size: f64,
        weight: u16,
        color: String,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
        stroke: String,
        stroke_width: f64,
        tip: Option<String>,
    },
    /// Ring segment between `inner` and `outer` radius
    Arc {
        cx: f64,
        cy: f64,
        outer: f64,
        inner: f64,
        start: f64,
        end: f64,
        fill: String,
        stroke: String,
        stroke_width: f64,
        tip: Option<String>,
    },
    /// Opens a group bound to one dataset; closed by `EndGroup`
    Group {
        role: GroupRole,
        dataset: usize,
        hidden: bool,
    },
    EndGroup,
}

impl DrawOp {
    pub fn text(x: f64, y: f64, text: impl Into<String>, anchor: TextAnchor, size: f64, weight: u16, color: &str) -> Self {
        DrawOp::Text { x, y, text: text.into(), anchor, size, weight, color: color.to_string() }
    }

    pub fn hline(x1: f64, x2: f64, y: f64, stroke: &str, width: f64, dash: Option<(f64, f64)>) -> Self {
        DrawOp::Line { x1, y1: y, x2, y2: y, stroke: stroke.to_string(), width, dash }
    }
}

/// Lay out the chart and produce every draw operation, plugins included
pub fn paint(config: &ChartConfig, plugins: &[&dyn ChartPlugin], size: Size) -> (Layout, Vec<DrawOp>) {
    let layout = layout::compute(config, size);
    let mut ops = Vec::new();

    match config.kind {
        ChartKind::Bar => {
            paint_axes(config, &layout, &mut ops);
            let frame = Frame { config, layout: &layout };
            for plugin in plugins {
                plugin.before_datasets_draw(&frame, &mut ops);
            }
            paint_bars(config, &layout, &mut ops);
            for plugin in plugins {
                plugin.after_datasets_draw(&frame, &mut ops);
            }
            paint_bar_labels(config, &layout, &mut ops);
        }
        ChartKind::Doughnut => {
            let frame = Frame { config, layout: &layout };
            for plugin in plugins {
                plugin.before_datasets_draw(&frame, &mut ops);
            }
            paint_arcs(config, &layout, &mut ops);
            for plugin in plugins {
                plugin.after_datasets_draw(&frame, &mut ops);
            }
        }
    }
    paint_legend(config, &layout, &mut ops);

    (layout, ops)
}

/// One-shot render without a canvas
pub fn render_svg(id: &str, config: &ChartConfig, plugins: &[&dyn ChartPlugin], size: Size) -> String {
    let (_, ops) = paint(config, plugins, size);
    to_svg(id, &ops, size, &config.options.font)
}

fn format_tick(value: f64, percent: bool) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if percent {
        format!("{}%", rounded)
    } else {
        format!("{}", rounded)
    }
}

fn paint_axes(config: &ChartConfig, layout: &Layout, ops: &mut Vec<DrawOp>) {
    let area = layout.area;
    let axis = &config.options.x;

    for &tick in &layout.ticks {
        let x = layout.scale.x(tick);
        ops.push(DrawOp::Line {
            x1: x,
            y1: area.y,
            x2: x,
            y2: area.bottom(),
            stroke: GRID.to_string(),
            width: 1.0,
            dash: None,
        });
        ops.push(DrawOp::text(
            x,
            area.bottom() + 13.0,
            format_tick(tick, axis.percent_ticks),
            TextAnchor::Middle,
            11.0,
            500,
            TEXT_TICK,
        ));
    }

    if let Some(title) = &axis.title {
        ops.push(DrawOp::text(
            area.x + area.width / 2.0,
            area.bottom() + 36.0,
            title.clone(),
            TextAnchor::Middle,
            13.0,
            600,
            TEXT_AXIS,
        ));
    }

    for (lines, &center) in layout.labels.iter().zip(&layout.centers) {
        let first = center - (lines.len() as f64 - 1.0) * LINE_HEIGHT / 2.0;
        for (k, line) in lines.iter().enumerate() {
            ops.push(DrawOp::text(
                area.x - 8.0,
                first + k as f64 * LINE_HEIGHT + 4.0,
                line.clone(),
                TextAnchor::End,
                11.0,
                500,
                TEXT_AXIS,
            ));
        }
    }
}

/// Dataset indices back to front: higher `order` first, ties by index
fn draw_order(config: &ChartConfig) -> Vec<usize> {
    let mut order: Vec<usize> = (0..config.datasets.len()).collect();
    order.sort_by(|&a, &b| config.datasets[b].order.cmp(&config.datasets[a].order));
    order
}

/// Hover text for one point: the dataset's own text, or category and value
fn tooltip(config: &ChartConfig, d: usize, i: usize) -> String {
    let dataset = &config.datasets[d];
    if let Some(tip) = dataset.tooltips.get(i) {
        return tip.clone();
    }
    let category = config.labels.get(i).map(|l| l.join(" ")).unwrap_or_default();
    let value = dataset.values.get(i).copied().unwrap_or(0.0);
    match config.kind {
        ChartKind::Doughnut => format!("{}: {:.1}%", category, value),
        ChartKind::Bar if dataset.label.is_empty() => format!("{}\n{:.2}", category, value),
        ChartKind::Bar => format!("{}\n{}: {:.2}", category, dataset.label, value),
    }
}

// Hidden datasets are still painted, inside a hidden group, so the legend can
// switch them on in the browser
fn paint_bars(config: &ChartConfig, layout: &Layout, ops: &mut Vec<DrawOp>) {
    for d in draw_order(config) {
        let dataset = &config.datasets[d];
        ops.push(DrawOp::Group { role: GroupRole::Series, dataset: d, hidden: dataset.hidden });
        for (i, g) in layout.datasets[d].iter().enumerate() {
            match dataset.kind {
                DatasetKind::Bar => ops.push(DrawOp::Rect {
                    rect: Rect {
                        x: g.base.min(g.x),
                        y: g.top(),
                        width: g.width(),
                        height: g.height,
                    },
                    fill: dataset.fill.at(i).to_string(),
                    stroke: Some(dataset.border.at(i).to_string()),
                    stroke_width: dataset.border_width,
                    radius: 4.0,
                    tip: Some(tooltip(config, d, i)),
                }),
                DatasetKind::Scatter => ops.push(DrawOp::Circle {
                    cx: g.x,
                    cy: g.y,
                    r: POINT_RADIUS,
                    fill: dataset.fill.at(i).to_string(),
                    stroke: dataset.border.at(i).to_string(),
                    stroke_width: dataset.border_width,
                    tip: Some(tooltip(config, d, i)),
                }),
            }
        }
        ops.push(DrawOp::EndGroup);
    }
}

fn paint_bar_labels(config: &ChartConfig, layout: &Layout, ops: &mut Vec<DrawOp>) {
    let Some(labels) = &config.options.data_labels else {
        return;
    };
    for (d, dataset) in config.datasets.iter().enumerate() {
        let mut group = Vec::new();
        for (i, g) in layout.datasets[d].iter().enumerate() {
            let value = dataset.values.get(i).copied().unwrap_or(0.0);
            if !labels.shows(d, value) {
                continue;
            }
            let (x, anchor) = if labels.inside {
                ((g.base + g.x) / 2.0, TextAnchor::Middle)
            } else {
                (g.x.max(g.base) + 6.0, TextAnchor::Start)
            };
            group.push(DrawOp::text(
                x,
                g.y + 4.0,
                labels.format.format(value),
                anchor,
                11.0,
                700,
                labels.color_for(d),
            ));
        }
        if !group.is_empty() {
            ops.push(DrawOp::Group { role: GroupRole::Series, dataset: d, hidden: dataset.hidden });
            ops.append(&mut group);
            ops.push(DrawOp::EndGroup);
        }
    }
}

fn paint_arcs(config: &ChartConfig, layout: &Layout, ops: &mut Vec<DrawOp>) {
    let (Some(donut), Some(dataset)) = (layout.donut, config.datasets.first()) else {
        return;
    };
    for arc in &layout.arcs {
        let fill = dataset.fill.at(arc.index).to_string();
        let stroke = dataset.border.at(arc.index).to_string();
        // A single full ring cannot be one SVG arc; split it in two halves
        let pieces = if arc.end_angle - arc.start_angle >= 2.0 * PI - 1e-9 {
            vec![(arc.start_angle, arc.start_angle + PI), (arc.start_angle + PI, arc.end_angle)]
        } else {
            vec![(arc.start_angle, arc.end_angle)]
        };
        for (start, end) in pieces {
            ops.push(DrawOp::Arc {
                cx: donut.cx,
                cy: donut.cy,
                outer: donut.outer,
                inner: donut.inner,
                start,
                end,
                fill: fill.clone(),
                stroke: stroke.clone(),
                stroke_width: dataset.border_width,
                tip: Some(tooltip(config, 0, arc.index)),
            });
        }
    }

    if let Some(labels) = &config.options.data_labels {
        let r = (donut.outer + donut.inner) / 2.0;
        for arc in &layout.arcs {
            let value = dataset.values[arc.index];
            if !labels.shows(0, value) {
                continue;
            }
            let a = arc.mid_angle();
            ops.push(DrawOp::text(
                donut.cx + r * a.cos(),
                donut.cy + r * a.sin() + 5.0,
                labels.format.format(value),
                TextAnchor::Middle,
                13.0,
                700,
                labels.color_for(0),
            ));
        }
    }
}

fn paint_legend(config: &ChartConfig, layout: &Layout, ops: &mut Vec<DrawOp>) {
    let (Some(legend), Some(rect)) = (&config.options.legend, layout.legend) else {
        return;
    };

    // (label, colour, round swatch, dimmed, toggles dataset)
    let entries: Vec<(String, String, bool, bool, Option<usize>)> = match config.kind {
        ChartKind::Doughnut => {
            let values: &[f64] = config.datasets.first().map(|d| d.values.as_slice()).unwrap_or(&[]);
            config
                .labels
                .iter()
                .enumerate()
                .filter(|(i, _)| !(legend.hide_zero && values.get(*i).copied().unwrap_or(0.0) == 0.0))
                .map(|(i, lines)| {
                    let color = config.datasets.first().map(|d| d.fill.at(i)).unwrap_or(TEXT_DARK);
                    (lines.join(" "), color.to_string(), false, false, None)
                })
                .collect()
        }
        ChartKind::Bar => config
            .datasets
            .iter()
            .enumerate()
            .map(|(i, d)| (d.label.clone(), d.fill.at(0).to_string(), d.kind == DatasetKind::Scatter, d.hidden, Some(i)))
            .collect(),
    };

    let widths: Vec<f64> = entries
        .iter()
        .map(|(label, ..)| 15.0 + 6.0 + label.chars().count() as f64 * 7.0 + 15.0)
        .collect();
    let total: f64 = widths.iter().sum();
    let mut x = rect.x + ((rect.width - total) / 2.0).max(0.0);
    let y = rect.y + rect.height / 2.0;

    for ((label, color, round, dimmed, dataset), w) in entries.into_iter().zip(widths) {
        if let Some(dataset) = dataset {
            ops.push(DrawOp::Group { role: GroupRole::LegendItem, dataset, hidden: dimmed });
        }
        if round {
            ops.push(DrawOp::Circle {
                cx: x + 7.5,
                cy: y,
                r: 6.0,
                fill: color,
                stroke: color_or_dim(dimmed),
                stroke_width: 0.0,
                tip: None,
            });
        } else {
            ops.push(DrawOp::Rect {
                rect: Rect { x, y: y - 7.5, width: 15.0, height: 15.0 },
                fill: color,
                stroke: None,
                stroke_width: 0.0,
                radius: 2.0,
                tip: None,
            });
        }
        ops.push(DrawOp::text(
            x + 21.0,
            y + 4.0,
            label,
            TextAnchor::Start,
            12.0,
            600,
            if dimmed { TEXT_TICK } else { TEXT_DARK },
        ));
        if dataset.is_some() {
            ops.push(DrawOp::EndGroup);
        }
        x += w;
    }
}

fn color_or_dim(dimmed: bool) -> String {
    if dimmed { TEXT_TICK.to_string() } else { "none".to_string() }
}

fn arc_path(cx: f64, cy: f64, outer: f64, inner: f64, start: f64, end: f64) -> String {
    let large = if end - start > PI { 1 } else { 0 };
    let (sx, sy) = (cx + outer * start.cos(), cy + outer * start.sin());
    let (ex, ey) = (cx + outer * end.cos(), cy + outer * end.sin());
    let (ix, iy) = (cx + inner * end.cos(), cy + inner * end.sin());
    let (jx, jy) = (cx + inner * start.cos(), cy + inner * start.sin());
    format!(
        "M{:.2},{:.2} A{:.2},{:.2} 0 {} 1 {:.2},{:.2} L{:.2},{:.2} A{:.2},{:.2} 0 {} 0 {:.2},{:.2} Z",
        sx, sy, outer, outer, large, ex, ey, ix, iy, inner, inner, large, jx, jy
    )
}

/// End a shape element, with its hover text as a `<title>` child
fn close(tag: &str, tip: &Option<String>) -> String {
    match tip {
        Some(tip) => format!("><title>{}</title></{}>", escape_xml(tip), tag),
        None => "/>".to_string(),
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialize draw operations as a standalone `<svg>` element
pub fn to_svg(id: &str, ops: &[DrawOp], size: Size, font: &str) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" class="chart" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" font-family="{}, sans-serif">"#,
        escape_xml(id),
        size.width,
        size.height,
        size.width,
        size.height,
        escape_xml(font)
    );

    for op in ops {
        let _ = match op {
            DrawOp::Rect { rect, fill, stroke, stroke_width, radius, tip } => write!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.1}" fill="{}" stroke="{}" stroke-width="{:.1}"{}"#,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                radius,
                fill,
                stroke.as_deref().unwrap_or("none"),
                stroke_width,
                close("rect", tip)
            ),
            DrawOp::Line { x1, y1, x2, y2, stroke, width, dash } => write!(
                svg,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.1}"{}/>"#,
                x1,
                y1,
                x2,
                y2,
                stroke,
                width,
                dash.map(|(on, off)| format!(r#" stroke-dasharray="{},{}""#, on, off))
                    .unwrap_or_default()
            ),
            DrawOp::Text { x, y, text, anchor, size, weight, color } => write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="{}" font-size="{}" font-weight="{}" fill="{}">{}</text>"#,
                x,
                y,
                anchor.svg(),
                size,
                weight,
                color,
                escape_xml(text)
            ),
            DrawOp::Circle { cx, cy, r, fill, stroke, stroke_width, tip } => write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.1}" fill="{}" stroke="{}" stroke-width="{:.1}"{}"#,
                cx,
                cy,
                r,
                fill,
                stroke,
                stroke_width,
                close("circle", tip)
            ),
            DrawOp::Arc { cx, cy, outer, inner, start, end, fill, stroke, stroke_width, tip } => write!(
                svg,
                r#"<path d="{}" fill="{}" stroke="{}" stroke-width="{:.1}"{}"#,
                arc_path(*cx, *cy, *outer, *inner, *start, *end),
                fill,
                stroke,
                stroke_width,
                close("path", tip)
            ),
            DrawOp::Group { role: GroupRole::Series, dataset, hidden } => write!(
                svg,
                r#"<g class="series" data-dataset="{}"{}>"#,
                dataset,
                if *hidden { r#" style="display:none""# } else { "" }
            ),
            DrawOp::Group { role: GroupRole::LegendItem, dataset, hidden } => write!(
                svg,
                r#"<g class="legend-item{}" data-dataset="{}">"#,
                if *hidden { " off" } else { "" },
                dataset
            ),
            DrawOp::EndGroup => write!(svg, "</g>"),
        };
    }

    svg.push_str("</svg>");
    svg
}
