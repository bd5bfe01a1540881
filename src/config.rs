//! Deck configuration
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or no file at all) gives the stock deck:
//!
//! ```toml
//! title = "Community Survey Results"
//!
//! [thresholds]
//! high = 4.0
//! medium = 3.0
//!
//! [gaps]
//! min_gap = 0.5
//! top_n = 9
//! ```

use crate::bucket::Thresholds;
use crate::error::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub title: String,
    pub thresholds: Thresholds,
    pub gaps: GapConfig,
    pub validation: ValidationConfig,
    pub chart: ChartConfigDefaults,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            thresholds: Thresholds::default(),
            gaps: GapConfig::default(),
            validation: ValidationConfig::default(),
            chart: ChartConfigDefaults::default(),
        }
    }
}

fn default_title() -> String {
    "Survey Results".to_string()
}

/// Settings for the gap-analysis view (slides 8/9)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Minimum signed gap for an indicator to count as a top gap
    pub min_gap: f64,
    /// How many top gaps to show
    pub top_n: usize,
    /// Label wrap width for the top-gaps chart
    pub wrap_top: usize,
    /// Label wrap width for the per-dimension chart
    pub wrap_dimension: usize,
    /// % High at or above which bars use the bright colour
    pub pct_bright: f64,
    /// % High at or above which bars use the mid colour
    pub pct_mid: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            min_gap: 0.5,
            top_n: 9,
            wrap_top: 32,
            wrap_dimension: 30,
            pct_bright: 50.0,
            pct_mid: 30.0,
        }
    }
}

/// Tolerances for the data-boundary checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed distance of low+medium+high from 100
    pub pct_tolerance: f64,
    /// Allowed distance of gap from community - offerings
    pub gap_tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { pct_tolerance: 1.0, gap_tolerance: 0.01 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfigDefaults {
    pub width: u32,
    /// Vertical space per category on horizontal bar charts
    pub bar_height: u32,
    pub font: String,
}

impl Default for ChartConfigDefaults {
    fn default() -> Self {
        Self { width: 900, bar_height: 42, font: "Manrope".to_string() }
    }
}

impl DeckConfig {
    /// Load from a TOML file, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        let config: DeckConfig = toml::from_str(&text)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.thresholds.medium > self.thresholds.high {
            return Err(DeckError::Config(format!(
                "thresholds.medium ({}) must not exceed thresholds.high ({})",
                self.thresholds.medium, self.thresholds.high
            )));
        }
        if self.gaps.wrap_top == 0 || self.gaps.wrap_dimension == 0 {
            return Err(DeckError::Config("wrap widths must be positive".to_string()));
        }
        if self.chart.width < 200 || self.chart.bar_height == 0 {
            return Err(DeckError::Config("chart is too small to draw".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_deck() {
        let config = DeckConfig::default();
        assert_eq!(config.thresholds.high, 4.0);
        assert_eq!(config.thresholds.medium, 3.0);
        assert_eq!(config.gaps.min_gap, 0.5);
        assert_eq!(config.gaps.top_n, 9);
        assert_eq!(config.gaps.wrap_top, 32);
        assert_eq!(config.gaps.wrap_dimension, 30);
    }

    #[test]
    fn test_load_none_gives_defaults() {
        let config = DeckConfig::load(None).unwrap();
        assert_eq!(config.title, "Survey Results");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title = \"Board Survey\"\n[gaps]\ntop_n = 5").unwrap();

        let config = DeckConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.title, "Board Survey");
        assert_eq!(config.gaps.top_n, 5);
        assert_eq!(config.gaps.min_gap, 0.5);
        assert_eq!(config.thresholds.high, 4.0);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\nhigh = 2.0\nmedium = 3.0").unwrap();

        let err = DeckConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, DeckError::Config(_)));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title = ").unwrap();

        assert!(matches!(DeckConfig::load(Some(file.path())), Err(DeckError::Toml(_))));
    }
}
