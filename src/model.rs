//! Survey data as handed over by the aggregation step
//!
//! Everything here is already computed upstream: means, percentage shares,
//! rWG agreement scores and gaps. This module only parses it and checks the
//! few relationships the charts rely on. Every top-level field is optional and
//! parsed on its own; a missing or unreadable field turns into an empty-state
//! placeholder on its slide instead of failing the whole deck.

use crate::config::ValidationConfig;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Parallel label/value arrays (participation, age, gender, viewpoint)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

/// Importance of one dimension to the organization (slide 3)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionItem {
    pub name: String,
    pub mean: f64,
    #[serde(deserialize_with = "id_string")]
    pub dim: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanScore {
    pub mean: f64,
}

/// Per-dimension alignment scores (slides 4-5)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub programs: MeanScore,
    #[serde(default)]
    pub community: MeanScore,
}

/// Agreement on one dimension among board and staff (slide 10)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusEntry {
    pub name: String,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub rwg: f64,
}

impl ConsensusEntry {
    pub fn total(&self) -> f64 {
        self.low + self.medium + self.high
    }
}

/// One survey item in the flat top-gaps list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapIndicator {
    pub dimension: String,
    pub indicator: String,
    pub community: f64,
    pub offerings: f64,
    pub gap: f64,
    pub pct_high: f64,
}

/// One survey item inside a dimension drill-down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub name: String,
    pub community: f64,
    pub offerings: f64,
    pub gap: f64,
    pub pct_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionIndicators {
    pub name: String,
    #[serde(default)]
    pub indicators: Vec<Opportunity>,
}

/// Dimension ids arrive either as strings or as bare numbers
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Everything the deck renders from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyData {
    pub program_participation: Option<Series>,
    pub age: Option<Series>,
    pub gender: Option<Series>,
    pub viewpoint: Option<Series>,
    pub mission: Option<Vec<MissionItem>>,
    pub dimensions: Option<Vec<DimensionSummary>>,
    pub consensus_high: Option<Vec<ConsensusEntry>>,
    pub consensus_medium: Option<Vec<ConsensusEntry>>,
    pub consensus_low: Option<Vec<ConsensusEntry>>,
    pub all_indicators: Option<Vec<GapIndicator>>,
    pub dimension_data: Option<BTreeMap<String, DimensionIndicators>>,
    /// Fields that were present but could not be read
    #[serde(skip)]
    pub unreadable: Vec<DataWarning>,
}

/// A broken upstream relationship. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataWarning {
    /// Which input field the problem is in, e.g. `consensusHigh[2]`
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl SurveyData {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Only a document that is not a JSON object fails. Each field is read on
    /// its own, and one that does not fit its shape is dropped with a warning.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut fields: Map<String, Value> = serde_json::from_str(text)?;
        let mut unreadable = Vec::new();
        let u = &mut unreadable;

        Ok(Self {
            program_participation: take_field(&mut fields, "programParticipation", u),
            age: take_field(&mut fields, "age", u),
            gender: take_field(&mut fields, "gender", u),
            viewpoint: take_field(&mut fields, "viewpoint", u),
            mission: take_field(&mut fields, "mission", u),
            dimensions: take_field(&mut fields, "dimensions", u),
            consensus_high: take_field(&mut fields, "consensusHigh", u),
            consensus_medium: take_field(&mut fields, "consensusMedium", u),
            consensus_low: take_field(&mut fields, "consensusLow", u),
            all_indicators: take_field(&mut fields, "allIndicators", u),
            dimension_data: take_field(&mut fields, "dimensionData", u),
            unreadable,
        })
    }

    pub fn dimension(&self, id: &str) -> Option<&DimensionSummary> {
        self.dimensions.as_ref()?.iter().find(|d| d.id == id)
    }

    /// Check the relationships the charts assume but nobody upstream enforces
    pub fn validate(&self, config: &ValidationConfig) -> Vec<DataWarning> {
        let mut warnings = self.unreadable.clone();
        let mut warn = |field: String, message: String| warnings.push(DataWarning { field, message });

        let series = [
            ("programParticipation", &self.program_participation),
            ("age", &self.age),
            ("gender", &self.gender),
            ("viewpoint", &self.viewpoint),
        ];
        for (field, s) in series {
            let Some(s) = s else { continue };
            if s.labels.len() != s.values.len() {
                warn(
                    field.to_string(),
                    format!("{} labels but {} values", s.labels.len(), s.values.len()),
                );
            }
            if s.values.iter().any(|v| !v.is_finite()) {
                warn(field.to_string(), "non-finite value".to_string());
            }
        }

        if let Some(mission) = &self.mission {
            for (i, item) in mission.iter().enumerate() {
                if !item.mean.is_finite() {
                    warn(format!("mission[{}]", i), "non-finite mean".to_string());
                }
                if self.dimension(&item.dim).is_none() {
                    warn(
                        format!("mission[{}]", i),
                        format!("dimension '{}' not in dimensions", item.dim),
                    );
                }
            }
        }

        let groups = [
            ("consensusHigh", &self.consensus_high),
            ("consensusMedium", &self.consensus_medium),
            ("consensusLow", &self.consensus_low),
        ];
        for (field, entries) in groups {
            for (i, e) in entries.iter().flatten().enumerate() {
                let total = e.total();
                if !total.is_finite() || (total - 100.0).abs() > config.pct_tolerance {
                    warn(
                        format!("{}[{}]", field, i),
                        format!("'{}' shares sum to {:.1}, expected 100", e.name, total),
                    );
                }
            }
        }

        for (i, ind) in self.all_indicators.iter().flatten().enumerate() {
            if let Some(msg) = gap_mismatch(ind.community, ind.offerings, ind.gap, config) {
                warn(format!("allIndicators[{}]", i), format!("'{}' {}", ind.indicator, msg));
            }
        }

        for (id, dim) in self.dimension_data.iter().flatten() {
            for (i, op) in dim.indicators.iter().enumerate() {
                if let Some(msg) = gap_mismatch(op.community, op.offerings, op.gap, config) {
                    warn(
                        format!("dimensionData.{}.indicators[{}]", id, i),
                        format!("'{}' {}", op.name, msg),
                    );
                }
            }
        }

        warnings
    }
}

fn take_field<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    key: &str,
    unreadable: &mut Vec<DataWarning>,
) -> Option<T> {
    let value = fields.remove(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            unreadable.push(DataWarning { field: key.to_string(), message: format!("unreadable, skipped: {}", e) });
            None
        }
    }
}

fn gap_mismatch(community: f64, offerings: f64, gap: f64, config: &ValidationConfig) -> Option<String> {
    let expected = community - offerings;
    if !gap.is_finite() || (gap - expected).abs() > config.gap_tolerance {
        Some(format!("gap {:.2} but community - offerings = {:.2}", gap, expected))
    } else {
        None
    }
}
