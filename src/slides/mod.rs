//! Slide renderers
//!
//! Each renderer reads the typed survey data, derives display series and
//! draws one or more charts onto the canvases of a [`Page`]. Failures stay
//! local: a missing canvas or an empty series skips that one chart with a
//! log line and an inline placeholder, and every sibling still renders.
//!
//! | Slides | Module            | Charts                                          |
//! |--------|-------------------|-------------------------------------------------|
//! | 1-2    | [`demographics`]  | participation, age, gender, viewpoint           |
//! | 3-5    | [`alignment`]     | mission importance, program / community overlay |
//! | 8-9    | [`gaps`]          | top gaps, per-dimension drill-down              |
//! | 10     | [`consensus`]     | stacked agreement bars (high/medium/low rWG)    |

pub mod alignment;
pub mod consensus;
pub mod demographics;
pub mod gaps;

use crate::chart::{Canvas, Chart, ChartConfig, ChartPlugin, Size};
use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use crate::model::SurveyData;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Canvas ids the deck template provides
pub const DECK_CANVASES: &[&str] = &[
    "programChart",
    "ageChart",
    "genderChart",
    "viewpointChart",
    "missionChart",
    "programAlignmentChart",
    "communityAlignmentChart",
    "consensusChartHigh",
    "consensusChartMedium",
    "consensusChartLow",
];

/// Vertical space taken by axis ticks, axis title and padding
const BAR_CHART_CHROME: f64 = 90.0;

#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub canvas: String,
    pub svg: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Block {
    Chart(RenderedChart),
    Html(String),
    /// Empty-state text shown where a chart could not be drawn
    Placeholder(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SlideOutput {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
    /// Canvases that were skipped, with the reason
    pub skipped: Vec<(String, String)>,
}

impl SlideOutput {
    pub fn new(id: &str, title: &str) -> Self {
        Self { id: id.to_string(), title: title.to_string(), blocks: Vec::new(), skipped: Vec::new() }
    }

    pub fn charts(&self) -> impl Iterator<Item = &RenderedChart> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Chart(c) => Some(c),
            _ => None,
        })
    }

    /// Record the outcome of drawing one chart. Errors become a placeholder
    /// for that chart only.
    pub fn push_chart(&mut self, canvas: &str, result: Result<RenderedChart>) {
        match result {
            Ok(chart) => self.blocks.push(Block::Chart(chart)),
            Err(e) => {
                warn!(slide = %self.id, canvas, error = %e, "chart skipped");
                self.blocks.push(Block::Placeholder(empty_state_text(&e)));
                self.skipped.push((canvas.to_string(), e.to_string()));
            }
        }
    }
}

pub fn empty_state_text(error: &DeckError) -> String {
    match error {
        DeckError::MissingData(_) => "No data available for this chart.".to_string(),
        DeckError::UnknownCanvas(_) => "Chart unavailable on this page.".to_string(),
        _ => "This chart could not be drawn.".to_string(),
    }
}

struct Slot {
    canvas: Canvas,
    chart: Option<Chart>,
}

/// The set of canvases a page offers, each holding at most one chart
pub struct Page {
    slots: BTreeMap<String, Slot>,
}

impl Page {
    pub fn new<'a>(canvas_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let slots = canvas_ids
            .into_iter()
            .map(|id| (id.to_string(), Slot { canvas: Canvas::new(id), chart: None }))
            .collect();
        Self { slots }
    }

    /// Every canvas of the standard deck
    pub fn standard() -> Self {
        Self::new(DECK_CANVASES.iter().copied())
    }

    /// Same page with one canvas removed
    pub fn without(mut self, canvas_id: &str) -> Self {
        self.slots.remove(canvas_id);
        self
    }

    pub fn has_canvas(&self, canvas_id: &str) -> bool {
        self.slots.contains_key(canvas_id)
    }

    /// Draw a chart onto a canvas, replacing whatever was there
    pub fn draw(
        &mut self,
        canvas_id: &str,
        config: ChartConfig,
        plugins: Vec<Box<dyn ChartPlugin>>,
        size: Size,
    ) -> Result<RenderedChart> {
        let slot = self
            .slots
            .get_mut(canvas_id)
            .ok_or_else(|| DeckError::UnknownCanvas(canvas_id.to_string()))?;
        if let Some(old) = slot.chart.take() {
            old.destroy(&mut slot.canvas);
        }
        let chart = slot.canvas.mount(config, plugins, size)?;
        let svg = chart.svg();
        slot.chart = Some(chart);
        debug!(canvas = canvas_id, "chart drawn");
        Ok(RenderedChart { canvas: canvas_id.to_string(), svg })
    }

    pub fn chart(&self, canvas_id: &str) -> Option<&Chart> {
        self.slots.get(canvas_id)?.chart.as_ref()
    }

    pub fn live_charts(&self) -> usize {
        self.slots.values().map(|s| s.canvas.live_charts()).sum()
    }
}

/// Height of a horizontal bar chart with `categories` rows
pub fn bar_chart_size(config: &DeckConfig, categories: usize, extra: f64) -> Size {
    let rows = categories.max(1) as f64;
    Size::new(
        config.chart.width as f64,
        rows * config.chart.bar_height as f64 + BAR_CHART_CHROME + extra,
    )
}

pub fn doughnut_size() -> Size {
    Size::new(360.0, 340.0)
}

/// Render every static slide of the deck
pub fn render_all(data: &SurveyData, config: &DeckConfig, page: &mut Page) -> Vec<SlideOutput> {
    vec![
        demographics::render(data, config, page),
        alignment::render(data, config, page),
        consensus::render(data, config, page),
    ]
}
