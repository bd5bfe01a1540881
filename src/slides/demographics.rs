//! Slides 1-2: who answered the survey

use super::{bar_chart_size, doughnut_size, Page, RenderedChart, SlideOutput};
use crate::chart::{
    plain_labels, ChartConfig, ChartOptions, DataLabels, Dataset, Legend, LegendPosition, Padding, Paint,
    ValueAxis, ValueFormat,
};
use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use crate::model::{Series, SurveyData};

const PARTICIPATION_FILL: &str = "rgba(112, 195, 233, 0.85)";
const PARTICIPATION_BORDER: &str = "rgba(112, 195, 233, 1)";
const AGE_FILL: &str = "rgba(195, 214, 0, 0.85)";
const AGE_BORDER: &str = "rgba(195, 214, 0, 1)";

const GENDER_FILLS: [&str; 3] = ["rgba(252, 196, 15, 0.85)", "rgba(112, 195, 233, 0.85)", "rgba(195, 214, 0, 0.85)"];
const GENDER_BORDERS: [&str; 3] = ["rgba(252, 196, 15, 1)", "rgba(112, 195, 233, 1)", "rgba(195, 214, 0, 1)"];
const VIEWPOINT_FILLS: [&str; 3] = ["rgba(209, 34, 63, 0.85)", "rgba(112, 195, 233, 0.85)", "rgba(195, 214, 0, 0.85)"];
const VIEWPOINT_BORDERS: [&str; 3] = ["rgba(209, 34, 63, 1)", "rgba(112, 195, 233, 1)", "rgba(195, 214, 0, 1)"];

/// Category labels longer than this are cut with "..."
const LABEL_MAX: usize = 20;
/// Age axis upper bound when there is no data to fit
const AGE_DEFAULT_MAX: f64 = 40.0;

fn require<'a>(series: &'a Option<Series>, name: &str) -> Result<&'a Series> {
    series
        .as_ref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DeckError::MissingData(name.to_string()))
}

fn palette(colors: &[&str]) -> Paint {
    Paint::PerPoint(colors.iter().map(|c| c.to_string()).collect())
}

fn tips(series: &Series, prefix: &str) -> Vec<String> {
    series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, v)| format!("{}\n{}{:.1}%", label, prefix, v))
        .collect()
}

pub fn participation_chart(series: &Series) -> ChartConfig {
    ChartConfig::bar(plain_labels(series.labels.iter().cloned()))
        .dataset(
            Dataset::bar("Participation Rate", series.values.clone(), PARTICIPATION_FILL, PARTICIPATION_BORDER)
                .with_tooltips(tips(series, "Participation: ")),
        )
        .options(ChartOptions {
            x: ValueAxis {
                min: Some(0.0),
                max: Some(100.0),
                title: Some("Percentage of Respondents".to_string()),
                percent_ticks: true,
                ..Default::default()
            },
            data_labels: Some(DataLabels::outside(ValueFormat::Percent(1))),
            label_truncate: Some(LABEL_MAX),
            padding: Padding::new(0.0, 50.0, 8.0, 8.0),
            ..Default::default()
        })
}

pub fn age_chart(series: &Series) -> ChartConfig {
    let suggested = series.max_value().map_or(AGE_DEFAULT_MAX, |m| m + 5.0);
    ChartConfig::bar(plain_labels(series.labels.iter().cloned()))
        .dataset(
            Dataset::bar("Age Distribution", series.values.clone(), AGE_FILL, AGE_BORDER).with_tooltips(tips(series, "")),
        )
        .options(ChartOptions {
            x: ValueAxis {
                min: Some(0.0),
                suggested_max: Some(suggested),
                percent_ticks: true,
                ..Default::default()
            },
            data_labels: Some(DataLabels::outside(ValueFormat::Percent(1))),
            label_truncate: Some(LABEL_MAX),
            padding: Padding::new(0.0, 50.0, 8.0, 8.0),
            ..Default::default()
        })
}

fn doughnut(series: &Series, fills: &[&str], borders: &[&str], hide_zero: bool) -> ChartConfig {
    let dataset = Dataset::bar("", series.values.clone(), palette(fills), palette(borders));
    ChartConfig::doughnut(series.labels.clone())
        .dataset(dataset)
        .options(ChartOptions {
            legend: Some(Legend { position: LegendPosition::Bottom, hide_zero }),
            data_labels: Some(DataLabels::inside(ValueFormat::Percent(1), "#ffffff")),
            padding: Padding::new(8.0, 8.0, 8.0, 8.0),
            ..Default::default()
        })
}

/// Zero shares get neither a segment nor a legend entry
pub fn gender_chart(series: &Series) -> ChartConfig {
    doughnut(series, &GENDER_FILLS, &GENDER_BORDERS, true)
}

pub fn viewpoint_chart(series: &Series) -> ChartConfig {
    doughnut(series, &VIEWPOINT_FILLS, &VIEWPOINT_BORDERS, false)
}

fn draw_bar(page: &mut Page, config: &DeckConfig, canvas: &str, chart: ChartConfig) -> Result<RenderedChart> {
    let mut chart = chart;
    chart.options.font = config.chart.font.clone();
    let size = bar_chart_size(config, chart.category_count(), 0.0);
    page.draw(canvas, chart, vec![], size)
}

fn draw_doughnut(page: &mut Page, config: &DeckConfig, canvas: &str, chart: ChartConfig) -> Result<RenderedChart> {
    let mut chart = chart;
    chart.options.font = config.chart.font.clone();
    page.draw(canvas, chart, vec![], doughnut_size())
}

pub fn render(data: &SurveyData, config: &DeckConfig, page: &mut Page) -> SlideOutput {
    let mut slide = SlideOutput::new("slide-02", "Who Responded");

    let result = require(&data.program_participation, "programParticipation")
        .and_then(|s| draw_bar(page, config, "programChart", participation_chart(s)));
    slide.push_chart("programChart", result);

    let result = require(&data.age, "age").and_then(|s| draw_bar(page, config, "ageChart", age_chart(s)));
    slide.push_chart("ageChart", result);

    let result = require(&data.gender, "gender")
        .and_then(|s| draw_doughnut(page, config, "genderChart", gender_chart(s)));
    slide.push_chart("genderChart", result);

    let result = require(&data.viewpoint, "viewpoint")
        .and_then(|s| draw_doughnut(page, config, "viewpointChart", viewpoint_chart(s)));
    slide.push_chart("viewpointChart", result);

    slide
}
