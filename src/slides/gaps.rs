//! Slides 8-9: where community priorities run ahead of current offerings
//!
//! Two listings feed the gap view:
//!
//! - **Top gaps**: every indicator whose gap reaches `min_gap`, ranked by the
//!   share of respondents rating it 4-5, capped at `top_n`.
//! - **Drill-down**: all indicators of one dimension, same ranking, no cap.
//!
//! Both rankings are stable, so ties keep their input order. The selection
//! functions are pure; [`crate::view::ViewController`] decides which listing
//! is on screen.

use crate::chart::draw::escape_xml;
use crate::chart::{ChartConfig, ChartOptions, DataLabels, Dataset, Padding, Paint, ValueAxis, ValueFormat};
use crate::config::GapConfig;
use crate::model::{DimensionIndicators, GapIndicator, Opportunity};
use crate::wrap::wrap_label;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;

const PCT_BRIGHT: &str = "#70C3E9";
const PCT_MID: &str = "#2C90C4";
const PCT_LOW: &str = "#2C80DE";
const BAR_BORDER: &str = "#2C90C4";

/// |gap| at which a gap is called out as positive or negative
pub const GAP_EMPHASIS: f64 = 0.5;

// ============================================================================
// SELECTION
// ============================================================================

fn by_pct_high_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Indicators with a gap of at least `min_gap`, highest % High first, at most `top_n`
pub fn top_gaps(indicators: &[GapIndicator], config: &GapConfig) -> Vec<GapIndicator> {
    let mut significant: Vec<GapIndicator> = indicators
        .iter()
        .filter(|i| i.gap >= config.min_gap)
        .cloned()
        .collect();
    significant.sort_by(|a, b| by_pct_high_desc(a.pct_high, b.pct_high));
    significant.truncate(config.top_n);
    significant
}

/// One dimension's indicators, ranked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drilldown {
    pub id: String,
    pub name: String,
    pub indicators: Vec<Opportunity>,
}

pub fn dimension_drilldown(dimensions: &BTreeMap<String, DimensionIndicators>, id: &str) -> Option<Drilldown> {
    let dim = dimensions.get(id)?;
    let mut indicators = dim.indicators.clone();
    indicators.sort_by(|a, b| by_pct_high_desc(a.pct_high, b.pct_high));
    Some(Drilldown { id: id.to_string(), name: dim.name.clone(), indicators })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionOption {
    pub id: String,
    pub name: String,
}

/// Selector entries: numeric ids in numeric order, then the rest by string
pub fn dimension_options(dimensions: &BTreeMap<String, DimensionIndicators>) -> Vec<DimensionOption> {
    let mut options: Vec<DimensionOption> = dimensions
        .iter()
        .map(|(id, dim)| DimensionOption { id: id.clone(), name: dim.name.clone() })
        .collect();
    options.sort_by(|a, b| match (a.id.trim().parse::<i64>(), b.id.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.id.cmp(&b.id),
    });
    options
}

// ============================================================================
// STYLING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStyle {
    Positive,
    Negative,
    Neutral,
}

impl GapStyle {
    pub fn of(gap: f64) -> Self {
        if gap.abs() >= GAP_EMPHASIS {
            if gap > 0.0 {
                GapStyle::Positive
            } else {
                GapStyle::Negative
            }
        } else {
            GapStyle::Neutral
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            GapStyle::Positive => "gap-positive",
            GapStyle::Negative => "gap-negative",
            GapStyle::Neutral => "gap-neutral",
        }
    }
}

/// Two decimals with an explicit "+" on positive gaps
pub fn format_gap(gap: f64) -> String {
    if gap > 0.0 {
        format!("+{:.2}", gap)
    } else {
        format!("{:.2}", gap)
    }
}

/// Bar colour by share of 4-5 ratings
pub fn pct_color(pct_high: f64, config: &GapConfig) -> &'static str {
    if pct_high >= config.pct_bright {
        PCT_BRIGHT
    } else if pct_high >= config.pct_mid {
        PCT_MID
    } else {
        PCT_LOW
    }
}

// ============================================================================
// CHARTS
// ============================================================================

fn pct_chart(
    labels: Vec<Vec<String>>,
    values: Vec<f64>,
    tooltips: Vec<String>,
    config: &GapConfig,
    padding: Padding,
) -> ChartConfig {
    let fills = Paint::PerPoint(values.iter().map(|v| pct_color(*v, config).to_string()).collect());
    ChartConfig::bar(labels)
        .dataset(
            Dataset::bar("% Rated 4-5", values, fills, BAR_BORDER)
                .with_border_width(1.5)
                .with_tooltips(tooltips),
        )
        .options(ChartOptions {
            x: ValueAxis {
                min: Some(0.0),
                max: Some(100.0),
                percent_ticks: true,
                ..Default::default()
            },
            padding,
            data_labels: Some(DataLabels::outside(ValueFormat::Percent(1))),
            ..Default::default()
        })
}

pub fn top_gaps_chart(items: &[GapIndicator], config: &GapConfig) -> ChartConfig {
    let labels = items.iter().map(|i| wrap_label(&i.indicator, config.wrap_top)).collect();
    let values = items.iter().map(|i| i.pct_high).collect();
    let tips = items
        .iter()
        .map(|i| format!("{}\n{:.1}% rated 4-5", i.indicator, i.pct_high))
        .collect();
    pct_chart(labels, values, tips, config, Padding::new(160.0, 30.0, 8.0, 8.0))
}

pub fn dimension_chart(items: &[Opportunity], config: &GapConfig) -> ChartConfig {
    let labels = items.iter().map(|i| wrap_label(&i.name, config.wrap_dimension)).collect();
    let values = items.iter().map(|i| i.pct_high).collect();
    let tips = items
        .iter()
        .map(|i| {
            format!(
                "{}\n% High (4-5): {:.1}%\nCommunity: {:.2}\nOfferings: {:.2}\nGap: {}",
                i.name,
                i.pct_high,
                i.community,
                i.offerings,
                format_gap(i.gap)
            )
        })
        .collect();
    pct_chart(labels, values, tips, config, Padding::new(160.0, 40.0, 10.0, 10.0))
}

// ============================================================================
// TABLES
// ============================================================================

fn gap_cell(gap: f64) -> String {
    format!(
        r#"<td class="num"><span class="{}">{}</span></td>"#,
        GapStyle::of(gap).class(),
        format_gap(gap)
    )
}

pub fn top_gaps_table(items: &[GapIndicator]) -> String {
    let mut html = String::from(
        r#"<table class="stats-table"><thead><tr><th>Dimension</th><th>Opportunity</th><th class="num">Community</th><th class="num">Offerings</th><th class="num">Gap</th><th class="num">% High (4-5)</th></tr></thead><tbody>"#,
    );
    for item in items {
        let _ = write!(
            html,
            r#"<tr><td><span class="dimension-badge">{}</span></td><td>{}</td><td class="num">{:.2}</td><td class="num">{:.2}</td>{}<td class="num pct">{:.1}%</td></tr>"#,
            escape_xml(&item.dimension),
            escape_xml(&item.indicator),
            item.community,
            item.offerings,
            gap_cell(item.gap),
            item.pct_high
        );
    }
    html.push_str("</tbody></table>");
    html
}

pub fn dimension_table(items: &[Opportunity]) -> String {
    let mut html = String::from(
        r#"<table class="stats-table"><thead><tr><th>Opportunity</th><th class="num">Community</th><th class="num">Offerings</th><th class="num">Gap</th><th class="num">% High (4-5)</th></tr></thead><tbody>"#,
    );
    for item in items {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td class="num">{:.2}</td><td class="num">{:.2}</td>{}<td class="num">{:.1}%</td></tr>"#,
            escape_xml(&item.name),
            item.community,
            item.offerings,
            gap_cell(item.gap),
            item.pct_high
        );
    }
    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn indicator(name: &str, gap: f64, pct_high: f64) -> GapIndicator {
        GapIndicator {
            dimension: "Health".to_string(),
            indicator: name.to_string(),
            community: 3.0 + gap,
            offerings: 3.0,
            gap,
            pct_high,
        }
    }

    fn opportunity(name: &str, gap: f64, pct_high: f64) -> Opportunity {
        Opportunity { name: name.to_string(), community: 3.0 + gap, offerings: 3.0, gap, pct_high }
    }

    fn names(items: &[GapIndicator]) -> Vec<&str> {
        items.iter().map(|i| i.indicator.as_str()).collect()
    }

    // ==========================================================================
    // TOP GAPS
    // ==========================================================================

    #[test]
    fn test_top_gaps_scenario() {
        let items = vec![indicator("A", 0.6, 40.0), indicator("B", 0.4, 90.0), indicator("C", 1.0, 55.0)];
        let top = top_gaps(&items, &GapConfig::default());
        assert_eq!(names(&top), vec!["C", "A"]);
    }

    #[test]
    fn test_top_gaps_ranks_by_share_not_gap() {
        let items = vec![indicator("A", 0.6, 80.0), indicator("B", 0.3, 90.0), indicator("C", 1.2, 40.0)];
        let top = top_gaps(&items, &GapConfig::default());
        assert_eq!(names(&top), vec!["A", "C"]);
    }

    #[test]
    fn test_no_qualifying_gaps_gives_empty_chart_and_table() {
        let items = vec![indicator("A", 0.2, 80.0), indicator("B", -1.0, 90.0)];
        let top = top_gaps(&items, &GapConfig::default());
        assert!(top.is_empty());

        let chart = top_gaps_chart(&top, &GapConfig::default());
        assert_eq!(chart.category_count(), 0);
        let table = top_gaps_table(&top);
        assert!(table.contains("<th>Dimension</th>"));
        assert!(table.ends_with("<tbody></tbody></table>"));
    }

    #[test]
    fn test_top_gaps_threshold_inclusive() {
        let items = vec![indicator("edge", 0.5, 10.0)];
        assert_eq!(top_gaps(&items, &GapConfig::default()).len(), 1);
    }

    #[test]
    fn test_top_gaps_caps_without_padding() {
        let many: Vec<GapIndicator> = (0..15).map(|i| indicator(&format!("i{}", i), 1.0, i as f64)).collect();
        let top = top_gaps(&many, &GapConfig::default());
        assert_eq!(top.len(), 9);
        assert_eq!(top[0].indicator, "i14");

        let few = vec![indicator("only", 1.0, 10.0)];
        assert_eq!(top_gaps(&few, &GapConfig::default()).len(), 1);
    }

    #[test]
    fn test_top_gaps_ties_keep_input_order() {
        let items = vec![indicator("first", 1.0, 50.0), indicator("second", 2.0, 50.0)];
        assert_eq!(names(&top_gaps(&items, &GapConfig::default())), vec!["first", "second"]);
    }

    // ==========================================================================
    // DRILL-DOWN AND SELECTOR
    // ==========================================================================

    fn dimensions() -> BTreeMap<String, DimensionIndicators> {
        let mut map = BTreeMap::new();
        for (id, name) in [("10", "Arts"), ("2", "Health"), ("1", "Education"), ("misc", "Other")] {
            map.insert(
                id.to_string(),
                DimensionIndicators {
                    name: name.to_string(),
                    indicators: vec![opportunity("low", -0.7, 20.0), opportunity("high", 0.2, 80.0)],
                },
            );
        }
        map
    }

    #[test]
    fn test_drilldown_sorted_uncapped() {
        let d = dimension_drilldown(&dimensions(), "2").unwrap();
        assert_eq!(d.name, "Health");
        let names: Vec<&str> = d.indicators.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["high", "low"]);
    }

    #[test]
    fn test_drilldown_unknown_id() {
        assert!(dimension_drilldown(&dimensions(), "99").is_none());
    }

    #[test]
    fn test_dimension_options_numeric_order() {
        let ids: Vec<String> = dimension_options(&dimensions()).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["1", "2", "10", "misc"]);
    }

    // ==========================================================================
    // STYLING AND OUTPUT
    // ==========================================================================

    #[test]
    fn test_gap_style() {
        assert_eq!(GapStyle::of(0.5), GapStyle::Positive);
        assert_eq!(GapStyle::of(-0.5), GapStyle::Negative);
        assert_eq!(GapStyle::of(0.49), GapStyle::Neutral);
        assert_eq!(format_gap(0.3), "+0.30");
        assert_eq!(format_gap(-0.7), "-0.70");
        assert_eq!(format_gap(0.0), "0.00");
    }

    #[test]
    fn test_pct_color_cutoffs() {
        let cfg = GapConfig::default();
        assert_eq!(pct_color(50.0, &cfg), "#70C3E9");
        assert_eq!(pct_color(30.0, &cfg), "#2C90C4");
        assert_eq!(pct_color(29.9, &cfg), "#2C80DE");
    }

    #[test]
    fn test_chart_labels_wrapped() {
        let items = vec![indicator("Affordable after-school programs for working families", 1.0, 60.0)];
        let chart = top_gaps_chart(&items, &GapConfig::default());
        assert!(chart.labels[0].len() > 1);
        assert!(chart.labels[0].iter().all(|l| l.chars().count() <= 32));
        assert_eq!(chart.options.padding.left, 160.0);
    }

    #[test]
    fn test_chart_tooltips_carry_table_figures() {
        let top = top_gaps_chart(&[indicator("Clinics", 1.1, 72.5)], &GapConfig::default());
        assert_eq!(top.datasets[0].tooltips, vec!["Clinics\n72.5% rated 4-5".to_string()]);

        let dim = dimension_chart(&[opportunity("Clinics", -0.4, 20.0)], &GapConfig::default());
        assert_eq!(
            dim.datasets[0].tooltips[0],
            "Clinics\n% High (4-5): 20.0%\nCommunity: 2.60\nOfferings: 3.00\nGap: -0.40"
        );
    }

    #[test]
    fn test_tables_escape_and_style() {
        let html = dimension_table(&[opportunity("Food <& shelter>", -0.8, 12.0)]);
        assert!(html.contains("Food &lt;&amp; shelter&gt;"));
        assert!(html.contains(r#"<span class="gap-negative">-0.80</span>"#));

        let html = top_gaps_table(&[indicator("Clinics", 1.1, 72.5)]);
        assert!(html.contains("<th>Dimension</th>"));
        assert!(html.contains("+1.10"));
        assert!(html.contains("72.5%"));
    }

    // ==========================================================================
    // PROPERTIES
    // ==========================================================================

    fn arb_indicator() -> impl Strategy<Value = GapIndicator> {
        (-3.0f64..3.0, 0.0f64..100.0).prop_map(|(gap, pct)| indicator("x", gap, pct))
    }

    proptest! {
        #[test]
        fn top_gaps_are_the_best_significant(items in prop::collection::vec(arb_indicator(), 0..40)) {
            let cfg = GapConfig::default();
            let top = top_gaps(&items, &cfg);
            let significant: Vec<&GapIndicator> = items.iter().filter(|i| i.gap >= cfg.min_gap).collect();

            prop_assert_eq!(top.len(), significant.len().min(cfg.top_n));
            prop_assert!(top.iter().all(|i| i.gap >= cfg.min_gap));
            prop_assert!(top.windows(2).all(|w| w[0].pct_high >= w[1].pct_high));
            if let Some(last) = top.last() {
                // Nothing left out ranks strictly above the weakest kept item
                let kept_above = significant.iter().filter(|i| i.pct_high > last.pct_high).count();
                prop_assert!(kept_above < top.len());
            }
        }

        #[test]
        fn drilldown_is_a_sorted_permutation(pcts in prop::collection::vec(0.0f64..100.0, 0..30)) {
            let mut map = BTreeMap::new();
            let indicators: Vec<Opportunity> = pcts.iter().map(|p| opportunity("x", 0.0, *p)).collect();
            map.insert("1".to_string(), DimensionIndicators { name: "D".to_string(), indicators });
            let d = dimension_drilldown(&map, "1").unwrap();

            prop_assert_eq!(d.indicators.len(), pcts.len());
            prop_assert!(d.indicators.windows(2).all(|w| w[0].pct_high >= w[1].pct_high));
            let mut got: Vec<f64> = d.indicators.iter().map(|i| i.pct_high).collect();
            let mut want = pcts.clone();
            got.sort_by(|a, b| a.partial_cmp(b).unwrap());
            want.sort_by(|a, b| a.partial_cmp(b).unwrap());
            prop_assert_eq!(got, want);
        }
    }
}
