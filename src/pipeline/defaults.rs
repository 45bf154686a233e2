use std::sync::Arc;

use crate::alignment::bipartite::{degenerate_pairs, match_all_candidates, match_one_to_one};
use crate::alignment::candidates::{find_overlap_candidates, find_start_end_candidates, Candidates};
use crate::alignment::levenshtein::{
    align_sequences, edit_distance, AlignedItem, SequenceItem, SubstitutionCostFn,
};
use crate::alignment::segment::{flatten_segments, sweep_segments};
use crate::config::{
    CandidateConfig, LevenshteinCosts, MatchingPenalties, OverlapThreshold, SegmentConfig,
    StartEndThresholds,
};
use crate::error::AlignmentError;
use crate::pipeline::traits::{Aligner, CandidateFinder};
use crate::types::{FlatSegment, Label, LabelPair, Segment};

#[derive(Debug, Clone, Copy, Default)]
pub struct StartEndCandidateFinder {
    thresholds: StartEndThresholds,
}

impl StartEndCandidateFinder {
    pub fn new(thresholds: StartEndThresholds) -> Self {
        Self { thresholds }
    }
}

impl CandidateFinder for StartEndCandidateFinder {
    fn find(&self, reference: &[Label], hypothesis: &[Label]) -> Candidates {
        find_start_end_candidates(reference, hypothesis, &self.thresholds)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapCandidateFinder {
    threshold: OverlapThreshold,
}

impl OverlapCandidateFinder {
    pub fn new(min_overlap: f64) -> Self {
        Self {
            threshold: OverlapThreshold { min_overlap },
        }
    }
}

impl CandidateFinder for OverlapCandidateFinder {
    fn find(&self, reference: &[Label], hypothesis: &[Label]) -> Candidates {
        find_overlap_candidates(reference, hypothesis, &self.threshold)
    }
}

pub fn candidate_finder(config: CandidateConfig) -> Box<dyn CandidateFinder> {
    match config {
        CandidateConfig::Overlap(threshold) => Box::new(OverlapCandidateFinder { threshold }),
        CandidateConfig::StartEnd(thresholds) => Box::new(StartEndCandidateFinder::new(thresholds)),
    }
}

/// Order-only alignment by weighted edit distance.
///
/// Works on any [`SequenceItem`]; as an [`Aligner`] it aligns labels by value
/// and ignores their times.
pub struct LevenshteinAligner<T = Label> {
    costs: LevenshteinCosts,
    substitution_cost: Option<Arc<SubstitutionCostFn<T>>>,
}

impl<T> LevenshteinAligner<T> {
    pub fn new(costs: LevenshteinCosts) -> Self {
        Self {
            costs,
            substitution_cost: None,
        }
    }

    /// Replaces the fixed substitution cost for differing tokens.
    pub fn with_substitution_cost<F>(mut self, cost_fn: F) -> Self
    where
        F: Fn(&T, &T) -> f64 + Send + Sync + 'static,
    {
        self.substitution_cost = Some(Arc::new(cost_fn));
        self
    }

    pub fn costs(&self) -> &LevenshteinCosts {
        &self.costs
    }
}

impl<T: SequenceItem> LevenshteinAligner<T> {
    pub fn align_sequence<'a>(
        &self,
        reference: &'a [T],
        hypothesis: &'a [T],
    ) -> Vec<AlignedItem<'a, T>> {
        align_sequences(
            reference,
            hypothesis,
            &self.costs,
            self.substitution_cost.as_deref(),
        )
    }

    pub fn calculate_edit_distance(&self, reference: &[T], hypothesis: &[T]) -> f64 {
        edit_distance(
            reference,
            hypothesis,
            &self.costs,
            self.substitution_cost.as_deref(),
        )
    }
}

impl<T> Default for LevenshteinAligner<T> {
    fn default() -> Self {
        Self::new(LevenshteinCosts::default())
    }
}

impl Aligner for LevenshteinAligner<Label> {
    type Unit = LabelPair;

    fn align(
        &self,
        reference: &[Label],
        hypothesis: &[Label],
    ) -> Result<Vec<LabelPair>, AlignmentError> {
        Ok(self
            .align_sequence(reference, hypothesis)
            .into_iter()
            .map(|(r, h)| LabelPair::new(r.cloned(), h.cloned()))
            .collect())
    }
}

/// Minimum-cost one-to-one matching over the pairs a [`CandidateFinder`] admits.
pub struct BipartiteMatchingAligner {
    finder: Box<dyn CandidateFinder>,
    penalties: MatchingPenalties,
}

impl BipartiteMatchingAligner {
    pub fn new(finder: Box<dyn CandidateFinder>, penalties: MatchingPenalties) -> Self {
        Self { finder, penalties }
    }

    /// Matching restricted to labels with close boundaries.
    pub fn one_to_one(thresholds: StartEndThresholds, penalties: MatchingPenalties) -> Self {
        Self::new(Box::new(StartEndCandidateFinder::new(thresholds)), penalties)
    }

    pub fn penalties(&self) -> &MatchingPenalties {
        &self.penalties
    }
}

impl Default for BipartiteMatchingAligner {
    fn default() -> Self {
        Self::new(
            Box::new(OverlapCandidateFinder::default()),
            MatchingPenalties::default(),
        )
    }
}

impl Aligner for BipartiteMatchingAligner {
    type Unit = LabelPair;

    fn align(
        &self,
        reference: &[Label],
        hypothesis: &[Label],
    ) -> Result<Vec<LabelPair>, AlignmentError> {
        if let Some(pairs) = degenerate_pairs(reference, hypothesis) {
            return Ok(pairs);
        }
        let candidates = self.finder.find(reference, hypothesis);
        Ok(match_one_to_one(
            reference,
            hypothesis,
            &candidates,
            &self.penalties,
        ))
    }
}

/// Reports every overlapping pair, so a label may appear in several pairs.
#[derive(Debug, Clone, Copy)]
pub struct FullMatchingAligner {
    finder: OverlapCandidateFinder,
}

impl FullMatchingAligner {
    pub fn new(min_overlap: f64) -> Self {
        Self {
            finder: OverlapCandidateFinder::new(min_overlap),
        }
    }
}

impl Default for FullMatchingAligner {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Aligner for FullMatchingAligner {
    type Unit = LabelPair;

    fn align(
        &self,
        reference: &[Label],
        hypothesis: &[Label],
    ) -> Result<Vec<LabelPair>, AlignmentError> {
        let candidates = self.finder.find(reference, hypothesis);
        Ok(match_all_candidates(reference, hypothesis, &candidates))
    }
}

/// Splits the timeline into segments with constant active labels per side.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvariantSegmentAligner {
    config: SegmentConfig,
}

impl InvariantSegmentAligner {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Aligns with `closing_time` overriding the configured one, if given.
    pub fn align_until(
        &self,
        reference: &[Label],
        hypothesis: &[Label],
        closing_time: Option<f64>,
    ) -> Result<Vec<Segment>, AlignmentError> {
        let config = SegmentConfig {
            closing_time: closing_time.or(self.config.closing_time),
            ..self.config
        };
        sweep_segments(reference, hypothesis, &config)
    }

    /// Like [`Self::align_until`], but with at most one label per side and segment.
    pub fn align_flat(
        &self,
        reference: &[Label],
        hypothesis: &[Label],
        closing_time: Option<f64>,
    ) -> Result<Vec<FlatSegment>, AlignmentError> {
        flatten_segments(self.align_until(reference, hypothesis, closing_time)?)
    }
}

impl Aligner for InvariantSegmentAligner {
    type Unit = Segment;

    fn align(
        &self,
        reference: &[Label],
        hypothesis: &[Label],
    ) -> Result<Vec<Segment>, AlignmentError> {
        sweep_segments(reference, hypothesis, &self.config)
    }
}
