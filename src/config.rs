use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::AlignmentError;

/// Edit costs for order-only alignment.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevenshteinCosts {
    pub deletion_cost: f64,
    pub insertion_cost: f64,
    pub substitution_cost: f64,
}

impl LevenshteinCosts {
    pub const DEFAULT_DELETION_COST: f64 = 3.0;
    pub const DEFAULT_INSERTION_COST: f64 = 3.0;
    pub const DEFAULT_SUBSTITUTION_COST: f64 = 4.0;

    pub fn validate(&self) -> Result<(), AlignmentError> {
        non_negative("deletion_cost", self.deletion_cost)?;
        non_negative("insertion_cost", self.insertion_cost)?;
        non_negative("substitution_cost", self.substitution_cost)
    }
}

impl Default for LevenshteinCosts {
    fn default() -> Self {
        Self {
            deletion_cost: Self::DEFAULT_DELETION_COST,
            insertion_cost: Self::DEFAULT_INSERTION_COST,
            substitution_cost: Self::DEFAULT_SUBSTITUTION_COST,
        }
    }
}

/// Penalties feeding the bipartite cost matrix.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchingPenalties {
    /// Scales the fraction of the reference label not covered by the hypothesis.
    pub non_overlap_penalty_weight: f64,
    pub substitution_penalty: f64,
    pub insertion_penalty: f64,
    pub deletion_penalty: f64,
}

impl MatchingPenalties {
    /// Cost of pairing two labels the candidate finder did not admit.
    pub fn invalid_penalty(&self) -> f64 {
        self.non_overlap_penalty_weight + self.insertion_penalty + self.deletion_penalty
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        non_negative("non_overlap_penalty_weight", self.non_overlap_penalty_weight)?;
        non_negative("substitution_penalty", self.substitution_penalty)?;
        non_negative("insertion_penalty", self.insertion_penalty)?;
        non_negative("deletion_penalty", self.deletion_penalty)
    }
}

impl Default for MatchingPenalties {
    fn default() -> Self {
        Self {
            non_overlap_penalty_weight: 1.0,
            substitution_penalty: 2.0,
            insertion_penalty: 10.0,
            deletion_penalty: 10.0,
        }
    }
}

/// Tolerances (seconds) for pairing labels by boundary distance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StartEndThresholds {
    pub start_delta_threshold: f64,
    /// `None` disables the end check. A negative value in a config file,
    /// such as the `-1` sentinel, reads as `None`.
    #[serde(deserialize_with = "end_check_from_raw")]
    pub end_delta_threshold: Option<f64>,
}

impl StartEndThresholds {
    pub const DEFAULT_START_DELTA: f64 = 0.5;

    pub fn validate(&self) -> Result<(), AlignmentError> {
        non_negative("start_delta_threshold", self.start_delta_threshold)?;
        if let Some(end) = self.end_delta_threshold {
            non_negative("end_delta_threshold", end)?;
        }
        Ok(())
    }
}

impl Default for StartEndThresholds {
    fn default() -> Self {
        Self {
            start_delta_threshold: Self::DEFAULT_START_DELTA,
            end_delta_threshold: None,
        }
    }
}

fn end_check_from_raw<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|limit| *limit >= 0.0))
}

/// Minimum overlap (seconds) for pairing labels; `<= 0` accepts any positive overlap.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlapThreshold {
    pub min_overlap: f64,
}

impl OverlapThreshold {
    pub const DEFAULT_MIN_OVERLAP: f64 = 0.05;

    pub fn validate(&self) -> Result<(), AlignmentError> {
        finite("min_overlap", self.min_overlap)
    }
}

impl Default for OverlapThreshold {
    fn default() -> Self {
        Self {
            min_overlap: Self::DEFAULT_MIN_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Event times closer than this (seconds) collapse into one boundary.
    pub snap_threshold: f64,
    /// End time substituted for open-ended labels.
    pub closing_time: Option<f64>,
}

impl SegmentConfig {
    pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.01;

    pub fn validate(&self) -> Result<(), AlignmentError> {
        non_negative("snap_threshold", self.snap_threshold)?;
        if let Some(closing_time) = self.closing_time {
            finite("closing_time", closing_time)?;
        }
        Ok(())
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            snap_threshold: Self::DEFAULT_SNAP_THRESHOLD,
            closing_time: None,
        }
    }
}

/// Candidate finder selection for the bipartite aligner.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "finder", rename_all = "snake_case")]
pub enum CandidateConfig {
    Overlap(OverlapThreshold),
    StartEnd(StartEndThresholds),
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self::Overlap(OverlapThreshold::default())
    }
}

/// Selects one aligner and its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignerConfig {
    Levenshtein {
        #[serde(flatten)]
        costs: LevenshteinCosts,
    },
    Bipartite {
        #[serde(default)]
        candidates: CandidateConfig,
        #[serde(flatten)]
        penalties: MatchingPenalties,
    },
    OneToOne {
        #[serde(default)]
        thresholds: StartEndThresholds,
        #[serde(flatten)]
        penalties: MatchingPenalties,
    },
    FullMatching {
        #[serde(default)]
        min_overlap: f64,
    },
    Segment {
        #[serde(flatten)]
        segment: SegmentConfig,
    },
}

impl AlignerConfig {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, AlignmentError> {
        let config: Self = serde_json::from_str(data)
            .map_err(|e| AlignmentError::json("parse aligner config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        match self {
            Self::Levenshtein { costs } => costs.validate(),
            Self::Bipartite {
                candidates,
                penalties,
            } => {
                match candidates {
                    CandidateConfig::Overlap(overlap) => overlap.validate()?,
                    CandidateConfig::StartEnd(thresholds) => thresholds.validate()?,
                }
                penalties.validate()
            }
            Self::OneToOne {
                thresholds,
                penalties,
            } => {
                thresholds.validate()?;
                penalties.validate()
            }
            Self::FullMatching { min_overlap } => finite("min_overlap", *min_overlap),
            Self::Segment { segment } => segment.validate(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Levenshtein { .. } => "levenshtein",
            Self::Bipartite { .. } => "bipartite",
            Self::OneToOne { .. } => "one_to_one",
            Self::FullMatching { .. } => "full_matching",
            Self::Segment { .. } => "segment",
        }
    }
}

fn finite(name: &str, value: f64) -> Result<(), AlignmentError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AlignmentError::invalid_input(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), AlignmentError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(AlignmentError::invalid_input(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_defaults() {
        let costs = LevenshteinCosts::default();
        assert_eq!(
            (costs.deletion_cost, costs.insertion_cost, costs.substitution_cost),
            (3.0, 3.0, 4.0)
        );

        let penalties = MatchingPenalties::default();
        assert_eq!(penalties.invalid_penalty(), 21.0);

        assert_eq!(StartEndThresholds::default().end_delta_threshold, None);
        assert_eq!(OverlapThreshold::default().min_overlap, 0.05);
        assert_eq!(SegmentConfig::default().snap_threshold, 0.01);
    }

    #[test]
    fn parses_levenshtein_with_partial_costs() {
        let config =
            AlignerConfig::from_json_str(r#"{"kind": "levenshtein", "substitution_cost": 20}"#)
                .unwrap();
        let AlignerConfig::Levenshtein { costs } = config else {
            panic!("expected levenshtein config, got {config:?}");
        };
        assert_eq!(costs.substitution_cost, 20.0);
        assert_eq!(costs.deletion_cost, 3.0);
    }

    #[test]
    fn parses_bipartite_with_start_end_finder() {
        let json = r#"{
            "kind": "bipartite",
            "candidates": {"finder": "start_end", "start_delta_threshold": 0.2, "end_delta_threshold": 0.3},
            "insertion_penalty": 5
        }"#;
        let config = AlignerConfig::from_json_str(json).unwrap();
        let AlignerConfig::Bipartite {
            candidates,
            penalties,
        } = config
        else {
            panic!("expected bipartite config, got {config:?}");
        };
        assert_eq!(
            candidates,
            CandidateConfig::StartEnd(StartEndThresholds {
                start_delta_threshold: 0.2,
                end_delta_threshold: Some(0.3),
            })
        );
        assert_eq!(penalties.insertion_penalty, 5.0);
        assert_eq!(penalties.deletion_penalty, 10.0);
    }

    #[test]
    fn full_matching_defaults_to_any_overlap() {
        let config = AlignerConfig::from_json_str(r#"{"kind": "full_matching"}"#).unwrap();
        assert_eq!(
            config,
            AlignerConfig::FullMatching { min_overlap: 0.0 }
        );
    }

    #[test]
    fn rejects_negative_penalty() {
        let err = AlignerConfig::from_json_str(r#"{"kind": "one_to_one", "deletion_penalty": -1}"#)
            .unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidInput { .. }));
    }

    #[test]
    fn negative_end_threshold_disables_end_check() {
        let json = r#"{
            "kind": "one_to_one",
            "thresholds": {"start_delta_threshold": 0.2, "end_delta_threshold": -1}
        }"#;
        let config = AlignerConfig::from_json_str(json).unwrap();
        let AlignerConfig::OneToOne { thresholds, .. } = config else {
            panic!("expected one_to_one config, got {config:?}");
        };
        assert_eq!(thresholds.start_delta_threshold, 0.2);
        assert_eq!(thresholds.end_delta_threshold, None);

        let json = r#"{"kind": "one_to_one", "thresholds": {"end_delta_threshold": null}}"#;
        let config = AlignerConfig::from_json_str(json).unwrap();
        assert!(matches!(
            config,
            AlignerConfig::OneToOne { thresholds, .. } if thresholds.end_delta_threshold.is_none()
        ));
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = AlignerConfig::from_json_str(r#"{"kind": "dtw"}"#).unwrap_err();
        assert!(matches!(err, AlignmentError::Json { .. }));
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join("evalign_rs_config_load.json");
        std::fs::write(&path, r#"{"kind": "segment", "snap_threshold": 0.02}"#)
            .expect("write config");
        let config = AlignerConfig::load(&path).unwrap();
        assert_eq!(config.kind_name(), "segment");
        let _ = std::fs::remove_file(&path);

        let missing = AlignerConfig::load(Path::new("/nonexistent/aligner.json"));
        assert!(matches!(missing, Err(AlignmentError::Io { .. })));
    }
}
