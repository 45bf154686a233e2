use std::collections::BTreeMap;

use crate::error::AlignmentError;
use crate::pipeline::defaults::InvariantSegmentAligner;
use crate::pipeline::traits::Aligner;
use crate::types::{FlatSegment, Label};

/// Labels of one side, keyed by utterance id.
pub type UtteranceLabels = BTreeMap<String, Vec<Label>>;

/// Aligns every reference utterance with its hypothesis counterpart.
///
/// Hypothesis-only utterances are skipped. Failures carry the utterance id.
pub fn align_utterances<A>(
    aligner: &A,
    reference: &UtteranceLabels,
    hypothesis: &UtteranceLabels,
) -> Result<BTreeMap<String, Vec<A::Unit>>, AlignmentError>
where
    A: Aligner + ?Sized,
{
    log_hypothesis_only(reference, hypothesis);

    let mut aligned = BTreeMap::new();
    for (utterance_id, ref_labels) in reference {
        let hyp_labels = hypothesis
            .get(utterance_id)
            .ok_or_else(|| AlignmentError::missing_counterpart(utterance_id))?;
        let units = aligner
            .align(ref_labels, hyp_labels)
            .map_err(|e| e.in_utterance(utterance_id))?;

        tracing::debug!(
            utterance = %utterance_id,
            n_ref = ref_labels.len(),
            n_hyp = hyp_labels.len(),
            units = units.len(),
            "runtime: utterance aligned"
        );
        aligned.insert(utterance_id.clone(), units);
    }
    Ok(aligned)
}

/// Segment-aligns and flattens every reference utterance.
///
/// Open label ends are closed at the utterance's entry in `closing_times`,
/// falling back to the aligner's configured closing time.
pub fn align_utterance_segments(
    aligner: &InvariantSegmentAligner,
    reference: &UtteranceLabels,
    hypothesis: &UtteranceLabels,
    closing_times: &BTreeMap<String, f64>,
) -> Result<BTreeMap<String, Vec<FlatSegment>>, AlignmentError> {
    log_hypothesis_only(reference, hypothesis);

    let mut aligned = BTreeMap::new();
    for (utterance_id, ref_labels) in reference {
        let hyp_labels = hypothesis
            .get(utterance_id)
            .ok_or_else(|| AlignmentError::missing_counterpart(utterance_id))?;
        let closing_time = closing_times.get(utterance_id).copied();
        let segments = aligner
            .align_flat(ref_labels, hyp_labels, closing_time)
            .map_err(|e| e.in_utterance(utterance_id))?;

        tracing::debug!(
            utterance = %utterance_id,
            closing_time = ?closing_time,
            segments = segments.len(),
            "runtime: utterance segmented"
        );
        aligned.insert(utterance_id.clone(), segments);
    }
    Ok(aligned)
}

fn log_hypothesis_only(reference: &UtteranceLabels, hypothesis: &UtteranceLabels) {
    for utterance_id in hypothesis.keys().filter(|id| !reference.contains_key(*id)) {
        tracing::debug!(utterance = %utterance_id, "runtime: hypothesis-only utterance ignored");
    }
}
