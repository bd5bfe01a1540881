//! Slide 10: board and staff consensus, grouped by rWG agreement level

use super::{bar_chart_size, Block, Page, RenderedChart, SlideOutput};
use crate::chart::{ChartConfig, ChartOptions, DataLabels, Dataset, Padding, ValueAxis, ValueFormat, TEXT_DARK};
use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use crate::model::{ConsensusEntry, SurveyData};

/// (label, fill, border) for each stack segment, bottom to top
const SEGMENTS: [(&str, &str, &str); 3] = [
    ("Low (1-2)", "rgba(173, 216, 230, 0.5)", "rgba(173, 216, 230, 1)"),
    ("Medium (3)", "rgba(112, 195, 233, 0.7)", "rgba(112, 195, 233, 1)"),
    ("High (4-5)", "rgba(44, 144, 196, 0.9)", "rgba(44, 144, 196, 1)"),
];

/// Segments at or below this share stay unlabelled
const LABEL_MIN_PCT: f64 = 5.0;

/// The three consensus groups and the canvas each is drawn on
pub const GROUPS: [(&str, &str); 3] = [
    ("consensusChartHigh", "High consensus"),
    ("consensusChartMedium", "Medium consensus"),
    ("consensusChartLow", "Low consensus"),
];

pub fn format_rwg(rwg: f64) -> String {
    format!("rWG {:.3}", rwg)
}

pub fn consensus_chart(entries: &[ConsensusEntry]) -> ChartConfig {
    let labels = entries.iter().map(|e| vec![e.name.clone(), format_rwg(e.rwg)]).collect();
    let shares: [Vec<f64>; 3] = [
        entries.iter().map(|e| e.low).collect(),
        entries.iter().map(|e| e.medium).collect(),
        entries.iter().map(|e| e.high).collect(),
    ];

    let mut data_labels = DataLabels::inside(ValueFormat::Percent(0), TEXT_DARK);
    data_labels.above = Some(LABEL_MIN_PCT);
    data_labels.dataset_colors.push((2, "white".to_string()));

    let mut chart = ChartConfig::bar(labels);
    for ((label, fill, border), values) in SEGMENTS.into_iter().zip(shares) {
        let tips = entries
            .iter()
            .zip(&values)
            .map(|(e, v)| format!("{}\nrWG: {:.3}\n{}: {:.1}%", e.name, e.rwg, label, v))
            .collect();
        chart = chart.dataset(
            Dataset::bar(label, values, fill, border)
                .with_border_width(1.5)
                .with_tooltips(tips),
        );
    }
    chart.options(ChartOptions {
        stacked: true,
        x: ValueAxis {
            min: Some(0.0),
            max: Some(100.0),
            title: Some("Percentage of Board and Staff Members".to_string()),
            percent_ticks: true,
            ..Default::default()
        },
        data_labels: Some(data_labels),
        padding: Padding::new(10.0, 10.0, 10.0, 10.0),
        ..Default::default()
    })
}

fn legend_html() -> String {
    let mut html = String::from(r#"<div class="segment-legend">"#);
    for (label, fill, border) in SEGMENTS {
        html.push_str(&format!(
            r#"<span class="segment"><i style="background:{};border-color:{}"></i>{}</span>"#,
            fill, border, label
        ));
    }
    html.push_str("</div>");
    html
}

fn draw_group(page: &mut Page, config: &DeckConfig, canvas: &str, entries: Option<&[ConsensusEntry]>) -> Result<RenderedChart> {
    if !page.has_canvas(canvas) {
        return Err(DeckError::UnknownCanvas(canvas.to_string()));
    }
    let entries = entries
        .filter(|e| !e.is_empty())
        .ok_or_else(|| DeckError::MissingData(canvas.to_string()))?;
    let mut chart = consensus_chart(entries);
    chart.options.font = config.chart.font.clone();
    let size = bar_chart_size(config, chart.category_count(), 0.0);
    page.draw(canvas, chart, vec![], size)
}

pub fn render(data: &SurveyData, config: &DeckConfig, page: &mut Page) -> SlideOutput {
    let mut slide = SlideOutput::new("slide-10", "Consensus");
    slide.blocks.push(Block::Html(legend_html()));

    let groups = [&data.consensus_high, &data.consensus_medium, &data.consensus_low];
    for ((canvas, _), entries) in GROUPS.into_iter().zip(groups) {
        let result = draw_group(page, config, canvas, entries.as_deref());
        slide.push_chart(canvas, result);
    }
    slide
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{draw, DrawOp, Size};

    fn entry(name: &str, low: f64, medium: f64, high: f64, rwg: f64) -> ConsensusEntry {
        ConsensusEntry { name: name.to_string(), low, medium, high, rwg }
    }

    #[test]
    fn test_segments_proportional() {
        let chart = consensus_chart(&[entry("Health", 20.0, 30.0, 50.0, 0.8125)]);
        let (layout, ops) = draw::paint(&chart, &[], Size::new(800.0, 200.0));

        let widths: Vec<f64> = layout.datasets.iter().map(|d| d[0].width()).collect();
        let full = layout.area.width;
        assert!((widths[0] / full - 0.2).abs() < 1e-9);
        assert!((widths[1] / full - 0.3).abs() < 1e-9);
        assert!((widths[2] / full - 0.5).abs() < 1e-9);
        // Segments sit end to end
        assert!((layout.datasets[1][0].base - layout.datasets[0][0].x).abs() < 1e-9);
        assert!((layout.datasets[2][0].x - layout.area.right()).abs() < 1e-9);

        let labels: Vec<(&str, &str)> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, color, .. } if text.ends_with('%') && text.len() <= 4 => {
                    Some((text.as_str(), color.as_str()))
                }
                _ => None,
            })
            .filter(|(t, _)| ["20%", "30%", "50%"].contains(t))
            .collect();
        assert!(labels.contains(&("20%", TEXT_DARK)));
        assert!(labels.contains(&("30%", TEXT_DARK)));
        assert!(labels.contains(&("50%", "white")));
    }

    #[test]
    fn test_small_segments_unlabelled() {
        let chart = consensus_chart(&[entry("Arts", 4.0, 6.0, 90.0, 0.9)]);
        let labels = chart.options.data_labels.as_ref().unwrap();
        assert!(!labels.shows(0, 4.0));
        assert!(labels.shows(1, 6.0));
    }

    #[test]
    fn test_rwg_three_decimals() {
        let chart = consensus_chart(&[entry("Arts", 10.0, 20.0, 70.0, 0.81249)]);
        assert_eq!(chart.labels[0], vec!["Arts".to_string(), "rWG 0.812".to_string()]);
        assert_eq!(chart.datasets[2].tooltips[0], "Arts\nrWG: 0.812\nHigh (4-5): 70.0%");
    }

    #[test]
    fn test_empty_group_and_missing_canvas_skip() {
        let data = SurveyData {
            consensus_high: Some(vec![entry("Health", 20.0, 30.0, 50.0, 0.8)]),
            consensus_medium: Some(vec![]),
            consensus_low: Some(vec![entry("Arts", 50.0, 30.0, 20.0, 0.2)]),
            ..Default::default()
        };
        let mut page = Page::standard().without("consensusChartLow");
        let slide = render(&data, &DeckConfig::default(), &mut page);

        assert_eq!(slide.charts().count(), 1);
        let skipped: Vec<&str> = slide.skipped.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(skipped, vec!["consensusChartMedium", "consensusChartLow"]);
    }
}
