//! Slides 3-5: mission importance and how programs / community line up with it
//!
//! All three charts share the mission ordering (already sorted upstream) and
//! the band colouring, and carry a [`ZoneAnnotator`] over the mission bars.

use super::{bar_chart_size, Page, RenderedChart, SlideOutput};
use crate::bucket::{Band, Thresholds};
use crate::chart::{
    plain_labels, ChartConfig, ChartOptions, ChartPlugin, DataLabels, Dataset, Legend, LegendPosition, Padding,
    Paint, ValueAxis, ValueFormat,
};
use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use crate::model::{MissionItem, SurveyData};
use crate::zones::ZoneAnnotator;

const PROGRAMS_FILL: &str = "rgba(139, 154, 0, 1)";
const PROGRAMS_BORDER: &str = "rgba(100, 110, 0, 1)";
const COMMUNITY_FILL: &str = "rgba(218, 140, 15, 1)";
const COMMUNITY_BORDER: &str = "rgba(180, 110, 10, 1)";

/// Room on the right for the zone labels
const ZONE_LABEL_ROOM: f64 = 160.0;

/// One row of an alignment chart: mission importance plus the two overlays
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRow {
    pub name: String,
    pub mission: f64,
    pub program: f64,
    pub community: f64,
}

/// Join mission items with their dimension scores. A dimension that cannot
/// be found scores 0.
pub fn alignment_rows(data: &SurveyData) -> Vec<AlignmentRow> {
    data.mission
        .iter()
        .flatten()
        .map(|item| {
            let dim = data.dimension(&item.dim);
            AlignmentRow {
                name: item.name.clone(),
                mission: item.mean,
                program: dim.map_or(0.0, |d| d.programs.mean),
                community: dim.map_or(0.0, |d| d.community.mean),
            }
        })
        .collect()
}

fn band_paints(values: &[f64], thresholds: &Thresholds) -> (Paint, Paint) {
    let bands: Vec<Band> = values.iter().map(|v| thresholds.classify(*v)).collect();
    (
        Paint::PerPoint(bands.iter().map(|b| b.fill().to_string()).collect()),
        Paint::PerPoint(bands.iter().map(|b| b.border().to_string()).collect()),
    )
}

fn mission_dataset(label: &str, values: Vec<f64>, thresholds: &Thresholds) -> Dataset {
    let (fill, border) = band_paints(&values, thresholds);
    Dataset::bar(label, values, fill, border)
}

fn rating_options(title: &str, legend: bool) -> ChartOptions {
    let mut labels = DataLabels::outside(ValueFormat::Fixed(2));
    labels.datasets = Some(vec![0]);
    ChartOptions {
        x: ValueAxis {
            min: Some(1.0),
            max: Some(5.0),
            step: Some(0.5),
            title: Some(title.to_string()),
            ..Default::default()
        },
        padding: Padding::new(10.0, ZONE_LABEL_ROOM, 10.0, 10.0),
        legend: legend.then_some(Legend { position: LegendPosition::Top, hide_zero: false }),
        data_labels: Some(labels),
        bar_percentage: 0.7,
        category_percentage: 0.8,
        ..Default::default()
    }
}

pub fn mission_chart(items: &[MissionItem], thresholds: &Thresholds) -> ChartConfig {
    let values = items.iter().map(|m| m.mean).collect();
    ChartConfig::bar(plain_labels(items.iter().map(|m| m.name.clone())))
        .dataset(mission_dataset("Board/Staff Importance", values, thresholds))
        .options(rating_options("Board/Staff importance ratings (Scale 1-5)", false))
}

pub fn program_alignment_chart(rows: &[AlignmentRow], thresholds: &Thresholds) -> ChartConfig {
    let mission = rows.iter().map(|r| r.mission).collect();
    let programs = rows.iter().map(|r| r.program).collect();
    ChartConfig::bar(plain_labels(rows.iter().map(|r| r.name.clone())))
        .dataset(mission_dataset("Organizational Priorities", mission, thresholds).with_order(2))
        .dataset(Dataset::scatter("Programs/Offerings", programs, PROGRAMS_FILL, PROGRAMS_BORDER).with_order(1))
        .options(rating_options("Board/Staff importance ratings (Scale 1-5)", true))
}

/// Programs start hidden so the community overlay reads on its own first
pub fn community_alignment_chart(rows: &[AlignmentRow], thresholds: &Thresholds) -> ChartConfig {
    let mission = rows.iter().map(|r| r.mission).collect();
    let community = rows.iter().map(|r| r.community).collect();
    let programs = rows.iter().map(|r| r.program).collect();
    ChartConfig::bar(plain_labels(rows.iter().map(|r| r.name.clone())))
        .dataset(mission_dataset("Organizational Priorities", mission, thresholds).with_order(3))
        .dataset(
            Dataset::scatter("Community Priorities", community, COMMUNITY_FILL, COMMUNITY_BORDER).with_order(1),
        )
        .dataset(
            Dataset::scatter("Programs/Offerings", programs, PROGRAMS_FILL, PROGRAMS_BORDER)
                .with_order(2)
                .hidden(),
        )
        .options(rating_options("Importance ratings (Scale 1-5)", true))
}

fn zones(id: &str, config: &DeckConfig) -> Vec<Box<dyn ChartPlugin>> {
    vec![Box::new(ZoneAnnotator::new(id, config.thresholds, 0))]
}

fn draw(page: &mut Page, config: &DeckConfig, canvas: &str, zone_id: &str, chart: ChartConfig) -> Result<RenderedChart> {
    let mut chart = chart;
    chart.options.font = config.chart.font.clone();
    let legend = if chart.options.legend.is_some() { crate::chart::layout::LEGEND_HEIGHT } else { 0.0 };
    let size = bar_chart_size(config, chart.category_count(), legend);
    page.draw(canvas, chart, zones(zone_id, config), size)
}

pub fn render(data: &SurveyData, config: &DeckConfig, page: &mut Page) -> SlideOutput {
    let mut slide = SlideOutput::new("slide-03", "Mission and Alignment");

    let mission = match data.mission.as_deref() {
        Some(items) if !items.is_empty() => items,
        _ => {
            for canvas in ["missionChart", "programAlignmentChart", "communityAlignmentChart"] {
                slide.push_chart(canvas, Err(DeckError::MissingData("mission".to_string())));
            }
            return slide;
        }
    };
    let rows = alignment_rows(data);

    let chart = mission_chart(mission, &config.thresholds);
    slide.push_chart("missionChart", draw(page, config, "missionChart", "missionZones", chart));

    let chart = program_alignment_chart(&rows, &config.thresholds);
    slide.push_chart(
        "programAlignmentChart",
        draw(page, config, "programAlignmentChart", "programAlignmentZones", chart),
    );

    let chart = community_alignment_chart(&rows, &config.thresholds);
    slide.push_chart(
        "communityAlignmentChart",
        draw(page, config, "communityAlignmentChart", "communityAlignmentZones", chart),
    );

    slide
}
