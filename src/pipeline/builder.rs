use crate::config::{AlignerConfig, SegmentConfig};
use crate::error::AlignmentError;
use crate::pipeline::defaults::{
    candidate_finder, BipartiteMatchingAligner, FullMatchingAligner, InvariantSegmentAligner,
    LevenshteinAligner,
};
use crate::pipeline::traits::{CandidateFinder, EventAligner};

/// Builds the aligner an [`AlignerConfig`] selects.
pub struct AlignerBuilder {
    config: AlignerConfig,
    candidate_finder: Option<Box<dyn CandidateFinder>>,
}

impl AlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            candidate_finder: None,
        }
    }

    /// Overrides the candidate finder of a bipartite aligner.
    pub fn with_candidate_finder(mut self, finder: Box<dyn CandidateFinder>) -> Self {
        self.candidate_finder = Some(finder);
        self
    }

    /// Builds a pair-producing aligner. Fails for a segment configuration.
    pub fn build_event_aligner(self) -> Result<EventAligner, AlignmentError> {
        self.config.validate()?;
        tracing::debug!(kind = self.config.kind_name(), "builder: event aligner");

        let aligner: EventAligner = match self.config {
            AlignerConfig::Levenshtein { costs } => Box::new(LevenshteinAligner::new(costs)),
            AlignerConfig::Bipartite {
                candidates,
                penalties,
            } => {
                let finder = self
                    .candidate_finder
                    .unwrap_or_else(|| candidate_finder(candidates));
                Box::new(BipartiteMatchingAligner::new(finder, penalties))
            }
            AlignerConfig::OneToOne {
                thresholds,
                penalties,
            } => match self.candidate_finder {
                Some(finder) => Box::new(BipartiteMatchingAligner::new(finder, penalties)),
                None => Box::new(BipartiteMatchingAligner::one_to_one(thresholds, penalties)),
            },
            AlignerConfig::FullMatching { min_overlap } => {
                Box::new(FullMatchingAligner::new(min_overlap))
            }
            AlignerConfig::Segment { .. } => {
                return Err(AlignmentError::invalid_input(
                    "segment configuration does not describe a label-pair aligner",
                ))
            }
        };
        Ok(aligner)
    }

    /// Builds the segment aligner. Fails for any other configuration.
    pub fn build_segment_aligner(self) -> Result<InvariantSegmentAligner, AlignmentError> {
        self.config.validate()?;
        match self.config {
            AlignerConfig::Segment { segment } => {
                tracing::debug!(
                    snap_threshold = segment.snap_threshold,
                    "builder: segment aligner"
                );
                Ok(InvariantSegmentAligner::new(segment))
            }
            other => Err(AlignmentError::invalid_input(format!(
                "'{}' configuration does not describe a segment aligner",
                other.kind_name()
            ))),
        }
    }
}

impl Default for AlignerBuilder {
    fn default() -> Self {
        Self::new(AlignerConfig::Segment {
            segment: SegmentConfig::default(),
        })
    }
}
