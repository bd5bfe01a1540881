//! JSON export of the derived chart series

use super::{Deck, Summary};
use crate::bucket::{BandRuns, Thresholds};
use crate::error::Result;
use crate::model::{DataWarning, GapIndicator};
use crate::slides::gaps::{DimensionOption, Drilldown};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct SlideExport<'a> {
    id: &'a str,
    title: &'a str,
    charts: Vec<&'a str>,
    skipped: &'a [(String, String)],
}

#[derive(Serialize)]
struct DeckExport<'a> {
    title: &'a str,
    summary: &'a Summary,
    warnings: &'a [DataWarning],
    slides: Vec<SlideExport<'a>>,
    thresholds: Thresholds,
    mission_zones: Option<&'a BandRuns>,
    top_gaps: &'a [GapIndicator],
    dimensions: &'a [DimensionOption],
    drilldowns: &'a [Drilldown],
}

pub fn write<W: Write>(writer: &mut W, deck: &Deck) -> Result<()> {
    let slides = deck
        .slides
        .iter()
        .map(|s| SlideExport {
            id: &s.id,
            title: &s.title,
            charts: s.charts().map(|c| c.canvas.as_str()).collect(),
            skipped: &s.skipped,
        })
        .collect();

    let export = DeckExport {
        title: &deck.title,
        summary: &deck.summary,
        warnings: &deck.warnings,
        slides,
        thresholds: deck.thresholds,
        mission_zones: deck.mission_zones.as_ref(),
        top_gaps: &deck.gaps.top_gaps,
        dimensions: &deck.gaps.options,
        drilldowns: &deck.gaps.drilldowns,
    };

    serde_json::to_writer_pretty(&mut *writer, &export)?;
    writeln!(writer)?;
    Ok(())
}
