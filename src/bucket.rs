//! Threshold bucketing on the 1-5 rating scale
//!
//! Ratings fall into three bands:
//!
//! ```text
//! Band    | Rule              | Default
//! --------|-------------------|---------
//! HIGH    | value >= high     | >= 4
//! MEDIUM  | value >= medium   | 3 - 4
//! LOW     | otherwise         | < 3
//! ```
//!
//! [`BandRuns::scan`] turns a sequence that is already in display order into
//! at most three contiguous index runs. It never sorts: the bands only look
//! contiguous on screen when the caller sorted the data by value first.

use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { high: 4.0, medium: 3.0 }
    }
}

impl Thresholds {
    pub fn classify(&self, value: f64) -> Band {
        if value >= self.high {
            Band::High
        } else if value >= self.medium {
            Band::Medium
        } else {
            Band::Low
        }
    }

    /// Zone label, e.g. `HIGH (≥4)`
    pub fn label(&self, band: Band) -> String {
        match band {
            Band::High => format!("HIGH (≥{})", self.high),
            Band::Medium => format!("MEDIUM ({}-{})", self.medium, self.high),
            Band::Low => format!("LOW (<{})", self.medium),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Band {
    High,
    Medium,
    Low,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::High, Band::Medium, Band::Low];

    /// Bar fill
    pub fn fill(self) -> &'static str {
        match self {
            Band::High => "rgba(44, 144, 196, 0.85)",
            Band::Medium => "rgba(112, 195, 233, 0.75)",
            Band::Low => "rgba(173, 216, 230, 0.65)",
        }
    }

    /// Bar border
    pub fn border(self) -> &'static str {
        match self {
            Band::High => "rgba(44, 144, 196, 1)",
            Band::Medium => "rgba(112, 195, 233, 1)",
            Band::Low => "rgba(173, 216, 230, 1)",
        }
    }

    /// Background tint of the zone behind the bars
    pub fn tint(self) -> &'static str {
        match self {
            Band::High => "rgba(44, 144, 196, 0.08)",
            Band::Medium => "rgba(112, 195, 233, 0.08)",
            Band::Low => "rgba(173, 216, 230, 0.08)",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::High => write!(f, "HIGH"),
            Band::Medium => write!(f, "MEDIUM"),
            Band::Low => write!(f, "LOW"),
        }
    }
}

/// Contiguous index runs per band, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BandRuns {
    pub high: Option<Range<usize>>,
    pub medium: Option<Range<usize>>,
    pub low: Option<Range<usize>>,
}

impl BandRuns {
    /// One pass: remember the last HIGH index and the last MEDIUM index,
    /// then cut the sequence there. LOW takes whatever follows.
    pub fn scan(values: &[f64], thresholds: &Thresholds) -> Self {
        let mut last_high: Option<usize> = None;
        let mut last_medium: Option<usize> = None;

        for (i, &v) in values.iter().enumerate() {
            match thresholds.classify(v) {
                Band::High => last_high = Some(i),
                Band::Medium => last_medium = Some(i),
                Band::Low => {}
            }
        }

        let high = last_high.map(|end| 0..end + 1);

        let medium_start = last_high.map_or(0, |i| i + 1);
        let medium = match last_medium {
            Some(end) if end >= medium_start => Some(medium_start..end + 1),
            _ => None,
        };

        let low_start = match (last_high, last_medium) {
            (Some(h), Some(m)) => h.max(m) + 1,
            (Some(i), None) | (None, Some(i)) => i + 1,
            (None, None) => 0,
        };
        let low = (low_start < values.len()).then(|| low_start..values.len());

        Self { high, medium, low }
    }

    pub fn get(&self, band: Band) -> Option<&Range<usize>> {
        match band {
            Band::High => self.high.as_ref(),
            Band::Medium => self.medium.as_ref(),
            Band::Low => self.low.as_ref(),
        }
    }

    /// Non-empty runs in display order
    pub fn iter(&self) -> impl Iterator<Item = (Band, &Range<usize>)> {
        Band::ALL.into_iter().filter_map(move |b| self.get(b).map(|r| (b, r)))
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_none() && self.medium.is_none() && self.low.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==========================================================================
    // CLASSIFICATION
    // ==========================================================================

    #[test]
    fn test_classify_boundaries() {
        let t = Thresholds::default();
        assert_eq!(t.classify(4.0), Band::High);
        assert_eq!(t.classify(3.99), Band::Medium);
        assert_eq!(t.classify(3.0), Band::Medium);
        assert_eq!(t.classify(2.99), Band::Low);
        assert_eq!(t.classify(1.0), Band::Low);
    }

    #[test]
    fn test_labels() {
        let t = Thresholds::default();
        assert_eq!(t.label(Band::High), "HIGH (≥4)");
        assert_eq!(t.label(Band::Medium), "MEDIUM (3-4)");
        assert_eq!(t.label(Band::Low), "LOW (<3)");
    }

    // ==========================================================================
    // RUN SCANNING
    // ==========================================================================

    #[test]
    fn test_scan_sorted_all_bands() {
        let runs = BandRuns::scan(&[4.6, 4.1, 3.8, 3.2, 2.9, 2.1], &Thresholds::default());
        assert_eq!(runs.high, Some(0..2));
        assert_eq!(runs.medium, Some(2..4));
        assert_eq!(runs.low, Some(4..6));
    }

    #[test]
    fn test_scan_empty() {
        let runs = BandRuns::scan(&[], &Thresholds::default());
        assert!(runs.is_empty());
    }

    #[test]
    fn test_scan_no_low() {
        let runs = BandRuns::scan(&[4.5, 3.5], &Thresholds::default());
        assert_eq!(runs.high, Some(0..1));
        assert_eq!(runs.medium, Some(1..2));
        assert_eq!(runs.low, None);
    }

    #[test]
    fn test_scan_no_high() {
        let runs = BandRuns::scan(&[3.5, 3.1, 2.0], &Thresholds::default());
        assert_eq!(runs.high, None);
        assert_eq!(runs.medium, Some(0..2));
        assert_eq!(runs.low, Some(2..3));
    }

    #[test]
    fn test_scan_only_low() {
        let runs = BandRuns::scan(&[2.5, 1.0], &Thresholds::default());
        assert_eq!(runs.high, None);
        assert_eq!(runs.medium, None);
        assert_eq!(runs.low, Some(0..2));
    }

    #[test]
    fn test_scan_does_not_sort() {
        // A HIGH value after a MEDIUM one pulls the HIGH run over it
        let runs = BandRuns::scan(&[4.2, 3.5, 4.1, 2.0], &Thresholds::default());
        assert_eq!(runs.high, Some(0..3));
        assert_eq!(runs.medium, None);
        assert_eq!(runs.low, Some(3..4));
    }

    #[test]
    fn test_iter_skips_empty_bands() {
        let runs = BandRuns::scan(&[4.5, 2.0], &Thresholds::default());
        let bands: Vec<Band> = runs.iter().map(|(b, _)| b).collect();
        assert_eq!(bands, vec![Band::High, Band::Low]);
    }

    proptest! {
        /// Runs tile 0..len in order, with no gaps or overlaps
        #[test]
        fn prop_runs_partition_sequence(values in prop::collection::vec(1.0f64..5.0, 1..40)) {
            let runs = BandRuns::scan(&values, &Thresholds::default());
            let mut next = 0;
            for (_, range) in runs.iter() {
                prop_assert_eq!(range.start, next);
                prop_assert!(range.end > range.start);
                next = range.end;
            }
            prop_assert_eq!(next, values.len());
        }

        /// On sorted input every value sits in the run of its own band
        #[test]
        fn prop_sorted_runs_match_classification(mut values in prop::collection::vec(1.0f64..5.0, 1..40)) {
            values.sort_by(|a, b| b.total_cmp(a));
            let t = Thresholds::default();
            let runs = BandRuns::scan(&values, &t);
            for (i, &v) in values.iter().enumerate() {
                let range = runs.get(t.classify(v)).expect("band of a present value is non-empty");
                prop_assert!(range.contains(&i));
            }
        }
    }
}
