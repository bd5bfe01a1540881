//! Threshold zones behind rating bar charts
//!
//! Shades the HIGH / MEDIUM / LOW runs of an already-sorted bar chart, draws
//! dashed dividers between neighbouring runs and labels each run at the
//! right edge of the chart area:
//!
//! ```text
//!  ┌──────────────────────────────────────────┐
//!  │ ████████████                 HIGH (≥4)   │  tinted
//!  │ ██████████                               │
//!  ├ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─┤
//!  │ ███████                  MEDIUM (3-4)    │  tinted
//!  ├ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─┤
//!  │ ████                         LOW (<3)    │  tinted
//!  └──────────────────────────────────────────┘
//! ```
//!
//! Runs come from [`BandRuns::scan`]; positions come from the rendered bars,
//! so the overlay is rebuilt on every draw.

use crate::bucket::{Band, BandRuns, Thresholds};
use crate::chart::layout::BarGeometry;
use crate::chart::{ChartPlugin, DrawOp, Frame, Rect, TextAnchor};
use std::ops::Range;

const LABEL_COLOR: &str = "rgba(44, 62, 80, 0.8)";
const LABEL_INSET: f64 = 10.0;
const DASH: (f64, f64) = (6.0, 3.0);

fn divider_color(upper: Band) -> &'static str {
    match upper {
        Band::High => "rgba(44, 144, 196, 0.4)",
        _ => "rgba(112, 195, 233, 0.4)",
    }
}

pub struct ZoneAnnotator {
    id: String,
    thresholds: Thresholds,
    /// Dataset whose values and bars define the zones
    dataset: usize,
}

impl ZoneAnnotator {
    pub fn new(id: &str, thresholds: Thresholds, dataset: usize) -> Self {
        Self { id: id.to_string(), thresholds, dataset }
    }

    /// Runs clipped to the bars actually drawn
    fn runs<'a>(&self, frame: &Frame<'a>) -> (Vec<(Band, Range<usize>)>, &'a [BarGeometry]) {
        let bars = frame.bars(self.dataset);
        let values = frame.values(self.dataset);
        let n = values.len().min(bars.len());
        let runs = BandRuns::scan(&values[..n], &self.thresholds)
            .iter()
            .map(|(band, range)| (band, range.clone()))
            .collect();
        (runs, bars)
    }
}

impl ChartPlugin for ZoneAnnotator {
    fn id(&self) -> &str {
        &self.id
    }

    fn before_datasets_draw(&self, frame: &Frame<'_>, ops: &mut Vec<DrawOp>) {
        let (runs, bars) = self.runs(frame);
        let area = frame.area();

        for (band, range) in runs {
            let top = bars[range.start].top();
            let bottom = bars[range.end - 1].bottom();
            ops.push(DrawOp::Rect {
                rect: Rect { x: area.x, y: top, width: area.width, height: bottom - top },
                fill: band.tint().to_string(),
                stroke: None,
                stroke_width: 0.0,
                radius: 0.0,
                tip: None,
            });
        }
    }

    fn after_datasets_draw(&self, frame: &Frame<'_>, ops: &mut Vec<DrawOp>) {
        let (runs, bars) = self.runs(frame);
        let area = frame.area();

        for pair in runs.windows(2) {
            let (upper, above) = &pair[0];
            let (_, below) = &pair[1];
            let y = (bars[above.end - 1].y + bars[below.start].y) / 2.0;
            ops.push(DrawOp::hline(area.x, area.right(), y, divider_color(*upper), 2.0, Some(DASH)));
        }

        for (band, range) in &runs {
            let y = (bars[range.start].y + bars[range.end - 1].y) / 2.0;
            ops.push(DrawOp::text(
                area.right() - LABEL_INSET,
                y,
                self.thresholds.label(*band),
                TextAnchor::End,
                12.0,
                600,
                LABEL_COLOR,
            ));
        }
    }
}
