//! Deck assembly and output
//!
//! This module renders every slide once and hands the result to a writer:
//!
//! - **HTML**: the self-contained slide deck with inline SVG charts
//! - **JSON**: the derived series behind the charts, for checking or reuse
//!
//! # Usage
//!
//! ```ignore
//! use surveydeck::{report, DeckConfig, SurveyData};
//!
//! let data = SurveyData::load("survey.json")?;
//! let config = DeckConfig::default();
//!
//! // Picks the format from the extension
//! report::generate("deck.html", &data, &config)?;
//! report::generate("deck.json", &data, &config)?;
//! ```

pub mod html;
pub mod json;

use crate::bucket::{BandRuns, Thresholds};
use crate::config::DeckConfig;
use crate::error::Result;
use crate::model::{DataWarning, GapIndicator, SurveyData};
use crate::slides::gaps::{self, DimensionOption, Drilldown};
use crate::slides::{self, Page, SlideOutput};
use crate::view::{ViewController, ViewEvent};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Generate a deck in the format implied by the file extension
pub fn generate<P: AsRef<Path>>(path: P, data: &SurveyData, config: &DeckConfig) -> Result<Summary> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let deck = Deck::build(data, config);
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);

    match ext.as_str() {
        "json" => json::write(&mut file, &deck)?,
        _ => html::write(&mut file, &deck, config)?,
    }
    info!(path = %path.display(), charts = deck.summary.charts_rendered, "deck written");
    Ok(deck.summary)
}

/// Every pane the gap view can show, pre-rendered
#[derive(Debug, Clone, Serialize)]
pub struct GapPanes {
    pub has_data: bool,
    pub top_gaps: Vec<GapIndicator>,
    pub options: Vec<DimensionOption>,
    pub drilldowns: Vec<Drilldown>,
    pub overview: String,
    /// Dimension view with nothing selected
    pub prompt: String,
    /// Selector cleared back to its empty option
    pub cleared: String,
    /// One pane per selector option, in selector order
    pub dimensions: Vec<(String, String)>,
}

impl GapPanes {
    /// Walk a controller through every view it can reach
    pub fn render(data: &SurveyData, config: &DeckConfig) -> Self {
        let mut view = ViewController::new(data, config);
        let overview = view.pane().to_string();
        let options = view.options();
        let dimensions = options
            .iter()
            .map(|o| {
                let pane = view.apply(ViewEvent::SelectDimension(Some(o.id.clone())));
                (o.id.clone(), pane.to_string())
            })
            .collect();
        let cleared = view.apply(ViewEvent::SelectDimension(None)).to_string();
        let prompt = view.apply(ViewEvent::ShowDimensionView).to_string();
        view.apply(ViewEvent::ShowOverview);

        let drilldowns = match &data.dimension_data {
            Some(dims) if view.has_data() => options
                .iter()
                .filter_map(|o| gaps::dimension_drilldown(dims, &o.id))
                .collect(),
            _ => Vec::new(),
        };

        Self {
            has_data: view.has_data(),
            top_gaps: view.top_gaps(),
            options,
            drilldowns,
            overview,
            prompt,
            cleared,
            dimensions,
        }
    }
}

/// A fully rendered deck
#[derive(Debug, Clone, Serialize)]
pub struct Deck {
    pub title: String,
    pub thresholds: Thresholds,
    /// Zone runs over the mission importance ratings
    pub mission_zones: Option<BandRuns>,
    pub slides: Vec<SlideOutput>,
    pub gaps: GapPanes,
    pub warnings: Vec<DataWarning>,
    pub summary: Summary,
}

impl Deck {
    pub fn build(data: &SurveyData, config: &DeckConfig) -> Self {
        let warnings = data.validate(&config.validation);
        for w in &warnings {
            warn!(field = %w.field, "{}", w.message);
        }

        let mut page = Page::standard();
        let slides = slides::render_all(data, config, &mut page);
        let gaps = GapPanes::render(data, config);
        let summary = Summary::from_deck(&slides, &gaps, warnings.len());
        let mission_zones = data.mission.as_ref().map(|items| {
            let values: Vec<f64> = items.iter().map(|m| m.mean).collect();
            BandRuns::scan(&values, &config.thresholds)
        });

        Self {
            title: config.title.clone(),
            thresholds: config.thresholds,
            mission_zones,
            slides,
            gaps,
            warnings,
            summary,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideSummary {
    pub id: String,
    pub rendered: usize,
    pub skipped: usize,
}

/// Chart counts for a rendered deck
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub slides: Vec<SlideSummary>,
    pub charts_rendered: usize,
    pub charts_skipped: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn from_deck(slides: &[SlideOutput], gaps: &GapPanes, warnings: usize) -> Self {
        let mut summary = Self { warnings, ..Self::default() };

        for slide in slides {
            let rendered = slide.charts().count();
            let skipped = slide.skipped.len();
            summary.charts_rendered += rendered;
            summary.charts_skipped += skipped;
            summary.slides.push(SlideSummary { id: slide.id.clone(), rendered, skipped });
        }

        let (rendered, skipped) = if gaps.has_data { (1 + gaps.dimensions.len(), 0) } else { (0, 1) };
        summary.charts_rendered += rendered;
        summary.charts_skipped += skipped;
        summary.slides.push(SlideSummary { id: "slide-08".to_string(), rendered, skipped });

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DimensionIndicators, Opportunity, Series};
    use std::collections::BTreeMap;

    fn gap_data() -> SurveyData {
        let mut dims = BTreeMap::new();
        for (id, name) in [("2", "Health"), ("1", "Education")] {
            dims.insert(
                id.to_string(),
                DimensionIndicators {
                    name: name.to_string(),
                    indicators: vec![Opportunity {
                        name: format!("{} access", name),
                        community: 4.0,
                        offerings: 3.0,
                        gap: 1.0,
                        pct_high: 60.0,
                    }],
                },
            );
        }
        SurveyData {
            all_indicators: Some(vec![]),
            dimension_data: Some(dims),
            ..Default::default()
        }
    }

    // ==========================================================================
    // GAP PANES
    // ==========================================================================

    #[test]
    fn test_gap_panes_follow_selector_order() {
        let panes = GapPanes::render(&gap_data(), &DeckConfig::default());
        assert!(panes.has_data);
        let ids: Vec<&str> = panes.dimensions.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(panes.dimensions[0].1.contains("Education access"));
        assert!(panes.prompt.contains("Select a dimension from the dropdown above to view all opportunities."));
        assert!(panes.cleared.contains("Select a dimension from the dropdown above.</div>"));
    }

    #[test]
    fn test_gap_panes_without_data() {
        let panes = GapPanes::render(&SurveyData::default(), &DeckConfig::default());
        assert!(!panes.has_data);
        assert!(panes.dimensions.is_empty());
        assert!(panes.overview.contains("Chart data not loaded."));
    }

    // ==========================================================================
    // SUMMARY STATISTICS
    // ==========================================================================

    #[test]
    fn test_summary_empty_input() {
        let deck = Deck::build(&SurveyData::default(), &DeckConfig::default());
        assert_eq!(deck.summary.charts_rendered, 0);
        // 10 static canvases plus the gap view
        assert_eq!(deck.summary.charts_skipped, 11);
        assert_eq!(deck.summary.warnings, 0);
    }

    #[test]
    fn test_summary_counts_per_slide() {
        let mut data = gap_data();
        data.age = Some(Series { labels: vec!["18-24".to_string()], values: vec![12.0] });
        let deck = Deck::build(&data, &DeckConfig::default());

        let demographics = &deck.summary.slides[0];
        assert_eq!(demographics.rendered, 1);
        assert_eq!(demographics.skipped, 3);
        let gap_view = deck.summary.slides.last().unwrap();
        assert_eq!(gap_view.rendered, 3);
    }

    #[test]
    fn test_generate_picks_format() {
        let dir = tempfile::tempdir().unwrap();
        let html_path = dir.path().join("deck.HTML");
        let json_path = dir.path().join("deck.json");

        generate(&html_path, &gap_data(), &DeckConfig::default()).unwrap();
        generate(&json_path, &gap_data(), &DeckConfig::default()).unwrap();

        let html = std::fs::read_to_string(html_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert!(json.get("summary").is_some());
    }
}
