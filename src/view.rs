//! Gap view controller (slides 8-9)
//!
//! The gap view has one content pane and one chart canvas. The user toggles
//! between the top-gaps overview and a per-dimension view, and picks a
//! dimension from a selector:
//!
//! ```text
//!                 ShowOverview
//!        ┌────────────────────────────┐
//!        ▼                            │
//!   ┌─────────┐  ShowDimensionView  ┌─┴──────────────┐  Select(Some)  ┌─────────────────────┐
//!   │ TopGaps │ ──────────────────► │ DimensionEmpty │ ─────────────► │ DimensionSelected(d)│
//!   └─────────┘  (nothing chosen)   └────────────────┘ ◄───────────── └─────────────────────┘
//!                                                        Select(None)
//! ```
//!
//! Every transition tears down the chart on screen before anything new is
//! mounted, so the canvas never holds more than one live chart.

use crate::chart::{Canvas, Chart, ChartConfig, Size};
use crate::config::DeckConfig;
use crate::error::Result;
use crate::model::{DimensionIndicators, GapIndicator, SurveyData};
use crate::slides::gaps::{self, DimensionOption};
use crate::slides::{bar_chart_size, empty_state_text};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const GAP_CANVAS: &str = "gapsChart";

pub const PROMPT_CHOOSE: &str = "Select a dimension from the dropdown above to view all opportunities.";
/// Selector cleared back to its empty option, or pointed at an unknown id
pub const PROMPT_SELECT: &str = "Select a dimension from the dropdown above.";
pub const DATA_NOT_LOADED: &str = "Chart data not loaded.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "dimension", rename_all = "snake_case")]
pub enum ViewState {
    TopGaps,
    DimensionEmpty,
    DimensionSelected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    ShowOverview,
    ShowDimensionView,
    SelectDimension(Option<String>),
}

/// Where a state leads on an event, given the remembered selection
pub fn transition(selected: Option<&str>, event: &ViewEvent) -> ViewState {
    match event {
        ViewEvent::ShowOverview => ViewState::TopGaps,
        ViewEvent::ShowDimensionView => match selected {
            Some(id) => ViewState::DimensionSelected(id.to_string()),
            None => ViewState::DimensionEmpty,
        },
        ViewEvent::SelectDimension(Some(id)) if !id.is_empty() => ViewState::DimensionSelected(id.clone()),
        ViewEvent::SelectDimension(_) => ViewState::DimensionEmpty,
    }
}

/// Gap data the controller renders from. `None` when the input lacks it.
struct GapData {
    indicators: Vec<GapIndicator>,
    dimensions: BTreeMap<String, DimensionIndicators>,
}

pub struct ViewController {
    data: Option<GapData>,
    config: DeckConfig,
    canvas: Canvas,
    chart: Option<Chart>,
    state: ViewState,
    selected: Option<String>,
    /// Text for `DimensionEmpty`, which depends on how the view got there
    prompt: &'static str,
    pane: String,
}

impl ViewController {
    /// Opens on the top-gaps overview
    pub fn new(data: &SurveyData, config: &DeckConfig) -> Self {
        let gap_data = match (&data.all_indicators, &data.dimension_data) {
            (Some(indicators), Some(dimensions)) => Some(GapData {
                indicators: indicators.clone(),
                dimensions: dimensions.clone(),
            }),
            _ => {
                warn!("gap data not available, gap view shows an error pane");
                None
            }
        };
        let mut controller = Self {
            data: gap_data,
            config: config.clone(),
            canvas: Canvas::new(GAP_CANVAS),
            chart: None,
            state: ViewState::TopGaps,
            selected: None,
            prompt: PROMPT_CHOOSE,
            pane: String::new(),
        };
        controller.render();
        controller
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The dimension the selector currently shows
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Current content pane HTML
    pub fn pane(&self) -> &str {
        &self.pane
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn live_charts(&self) -> usize {
        self.canvas.live_charts()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn options(&self) -> Vec<DimensionOption> {
        self.data
            .as_ref()
            .map(|d| gaps::dimension_options(&d.dimensions))
            .unwrap_or_default()
    }

    pub fn top_gaps(&self) -> Vec<GapIndicator> {
        self.data
            .as_ref()
            .map(|d| gaps::top_gaps(&d.indicators, &self.config.gaps))
            .unwrap_or_default()
    }

    /// Apply one UI event and return the new pane
    pub fn apply(&mut self, event: ViewEvent) -> &str {
        let next = transition(self.selected.as_deref(), &event);
        self.selected = match &next {
            ViewState::DimensionSelected(id) => Some(id.clone()),
            _ => None,
        };
        self.prompt = match event {
            ViewEvent::SelectDimension(_) => PROMPT_SELECT,
            _ => PROMPT_CHOOSE,
        };
        debug!(?event, from = ?self.state, to = ?next, "view transition");
        self.state = next;
        self.render();
        &self.pane
    }

    /// Redraw the current chart at a new size
    pub fn resize(&mut self, size: Size) {
        if let Some(chart) = self.chart.as_mut() {
            chart.resize(size);
            let svg = chart.svg();
            if let Some(table) = self.pane.find("<table") {
                self.pane = chart_pane(&svg, &self.pane[table..]);
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(old) = self.chart.take() {
            old.destroy(&mut self.canvas);
        }
    }

    fn mount(&mut self, config: ChartConfig) -> Result<String> {
        let mut config = config;
        config.options.font = self.config.chart.font.clone();
        let size = bar_chart_size(&self.config, config.category_count(), 0.0);
        let chart = self.canvas.mount(config, vec![], size)?;
        let svg = chart.svg();
        self.chart = Some(chart);
        Ok(svg)
    }

    fn render(&mut self) {
        self.teardown();

        let Some(data) = self.data.as_ref() else {
            self.pane = placeholder(DATA_NOT_LOADED, true);
            return;
        };

        let (chart, table) = match &self.state {
            ViewState::TopGaps => {
                let items = gaps::top_gaps(&data.indicators, &self.config.gaps);
                (gaps::top_gaps_chart(&items, &self.config.gaps), gaps::top_gaps_table(&items))
            }
            ViewState::DimensionEmpty => {
                self.pane = placeholder(self.prompt, false);
                return;
            }
            ViewState::DimensionSelected(id) => match gaps::dimension_drilldown(&data.dimensions, id) {
                Some(drill) => (
                    gaps::dimension_chart(&drill.indicators, &self.config.gaps),
                    gaps::dimension_table(&drill.indicators),
                ),
                None => {
                    debug!(dimension = %id, "unknown dimension");
                    self.pane = placeholder(PROMPT_SELECT, false);
                    return;
                }
            },
        };

        self.pane = match self.mount(chart) {
            Ok(svg) => chart_pane(&svg, &table),
            Err(e) => {
                warn!(error = %e, "gap chart not drawn");
                format!("{}{}", placeholder(&empty_state_text(&e), true), table)
            }
        };
    }
}

fn chart_pane(svg: &str, table: &str) -> String {
    format!(r#"<div class="chart-container">{}</div>{}"#, svg, table)
}

fn placeholder(text: &str, error: bool) -> String {
    let class = if error { "placeholder error" } else { "placeholder" };
    format!(r#"<div class="{}">{}</div>"#, class, text)
}
