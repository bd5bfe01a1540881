//! surveydeck - Render survey results as a slide deck
//!
//! surveydeck takes survey data that was already aggregated upstream (means,
//! percentage shares, rWG agreement, gaps) and renders the charts and tables
//! of a results deck to a self-contained HTML file with inline SVG.
//!
//! # Overview
//!
//! The deck has four kinds of slide:
//!
//! 1. **Demographics** (slides 1-2): who answered, as bars and doughnuts.
//! 2. **Alignment** (slides 3-5): mission importance per dimension, shaded
//!    into HIGH / MEDIUM / LOW zones, with program and community overlays.
//! 3. **Gaps** (slides 8-9): where community priorities outrun offerings,
//!    either as a ranked top list or drilled down by dimension.
//! 4. **Consensus** (slide 10): stacked agreement bars per rWG group.
//!
//! # Quick Start
//!
//! ```no_run
//! use surveydeck::{report, DeckConfig, SurveyData};
//!
//! let data = SurveyData::load("survey.json").unwrap();
//! let config = DeckConfig::default();
//!
//! for warning in data.validate(&config.validation) {
//!     println!("warning: {}", warning);
//! }
//!
//! let summary = report::generate("deck.html", &data, &config).unwrap();
//! println!("{} charts, {} skipped", summary.charts_rendered, summary.charts_skipped);
//! ```
//!
//! # Threshold Bands
//!
//! | Band   | Rating      | Zone tint                  |
//! |--------|-------------|----------------------------|
//! | HIGH   | >= 4        | rgba(44, 144, 196, 0.08)   |
//! | MEDIUM | 3 to 4      | rgba(112, 195, 233, 0.08)  |
//! | LOW    | < 3         | rgba(173, 216, 230, 0.08)  |
//!
//! # Modules
//!
//! - [`model`]: input schema and boundary checks
//! - [`bucket`] / [`zones`]: threshold bands and the zone overlay plugin
//! - [`chart`]: layout, plugin hooks, SVG output, canvas lifecycle
//! - [`slides`]: per-slide chart builders
//! - [`view`]: the gap view state machine
//! - [`report`] / [`serve`]: static deck output and the local server

pub mod bucket;
pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod serve;
pub mod slides;
pub mod view;
pub mod wrap;
pub mod zones;

pub use bucket::{Band, BandRuns, Thresholds};
pub use config::DeckConfig;
pub use error::{DeckError, Result};
pub use model::{DataWarning, SurveyData};
pub use view::{ViewController, ViewEvent, ViewState};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests pin the re-exported surface that the binary and callers use.
    // ==========================================================================

    #[test]
    fn test_band_reexport() {
        let t = Thresholds::default();
        assert_eq!(t.classify(4.0), Band::High);
        assert_eq!(t.classify(3.99), Band::Medium);
        assert_eq!(t.classify(2.0), Band::Low);
    }

    #[test]
    fn test_config_defaults_reexport() {
        let config = DeckConfig::default();
        assert_eq!(config.gaps.top_n, 9);
        assert_eq!(config.gaps.min_gap, 0.5);
    }

    #[test]
    fn test_controller_reexport() {
        let view = ViewController::new(&SurveyData::default(), &DeckConfig::default());
        assert_eq!(view.state(), &ViewState::TopGaps);
        assert_eq!(view.live_charts(), 0);
    }

    #[test]
    fn test_error_display() {
        let err = DeckError::MissingData("age".to_string());
        assert_eq!(err.to_string(), "no data for 'age'");
    }
}
