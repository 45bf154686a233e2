use std::collections::BTreeSet;

use crate::alignment::interval::overlap_time;
use crate::config::{OverlapThreshold, StartEndThresholds};
use crate::types::Label;

/// Plausible `(ref_index, hyp_index)` pairs plus the indices left without any.
///
/// A label may appear in several pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    pub pairs: Vec<(usize, usize)>,
    pub ref_unmatched: BTreeSet<usize>,
    pub hyp_unmatched: BTreeSet<usize>,
}

impl Candidates {
    fn all_unmatched(n_ref: usize, n_hyp: usize) -> Self {
        Self {
            pairs: Vec::new(),
            ref_unmatched: (0..n_ref).collect(),
            hyp_unmatched: (0..n_hyp).collect(),
        }
    }

    fn admit(&mut self, ref_index: usize, hyp_index: usize) {
        self.pairs.push((ref_index, hyp_index));
        self.ref_unmatched.remove(&ref_index);
        self.hyp_unmatched.remove(&hyp_index);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Pairs every combination accepted by `admissible`, reference-major.
pub fn find_candidates<F>(reference: &[Label], hypothesis: &[Label], admissible: F) -> Candidates
where
    F: Fn(&Label, &Label) -> bool,
{
    let mut candidates = Candidates::all_unmatched(reference.len(), hypothesis.len());

    for (ref_index, r) in reference.iter().enumerate() {
        for (hyp_index, h) in hypothesis.iter().enumerate() {
            if admissible(r, h) {
                candidates.admit(ref_index, hyp_index);
            }
        }
    }

    tracing::trace!(
        pairs = candidates.pairs.len(),
        ref_unmatched = candidates.ref_unmatched.len(),
        hyp_unmatched = candidates.hyp_unmatched.len(),
        "candidates: search finished"
    );
    candidates
}

/// Starts within `start_delta_threshold`, and ends strictly within
/// `end_delta_threshold` when one is set.
pub fn start_end_admissible(r: &Label, h: &Label, thresholds: &StartEndThresholds) -> bool {
    if (r.start - h.start).abs() > thresholds.start_delta_threshold {
        return false;
    }
    match thresholds.end_delta_threshold {
        None => true,
        Some(limit) => end_delta(r, h).is_some_and(|delta| delta < limit),
    }
}

/// Distance between ends. Two open ends coincide; one open end is not comparable.
fn end_delta(r: &Label, h: &Label) -> Option<f64> {
    match (r.end, h.end) {
        (Some(a), Some(b)) => Some((a - b).abs()),
        (None, None) => Some(0.0),
        _ => None,
    }
}

/// Overlap of at least `min_overlap` seconds, or any positive overlap when `min_overlap <= 0`.
pub fn overlap_admissible(r: &Label, h: &Label, threshold: &OverlapThreshold) -> bool {
    let overlap = overlap_time(r, h);
    if threshold.min_overlap <= 0.0 {
        overlap > 0.0
    } else {
        overlap >= threshold.min_overlap
    }
}

pub fn find_start_end_candidates(
    reference: &[Label],
    hypothesis: &[Label],
    thresholds: &StartEndThresholds,
) -> Candidates {
    find_candidates(reference, hypothesis, |r, h| {
        start_end_admissible(r, h, thresholds)
    })
}

pub fn find_overlap_candidates(
    reference: &[Label],
    hypothesis: &[Label],
    threshold: &OverlapThreshold,
) -> Candidates {
    find_candidates(reference, hypothesis, |r, h| {
        overlap_admissible(r, h, threshold)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(start: f64, end: Option<f64>) -> StartEndThresholds {
        StartEndThresholds {
            start_delta_threshold: start,
            end_delta_threshold: end,
        }
    }

    #[test]
    fn start_end_without_end_check() {
        let reference = vec![Label::new("a", 1.0, 2.0), Label::new("b", 5.0, 6.0)];
        let hypothesis = vec![
            Label::new("a", 1.4, 9.0),
            Label::new("x", 3.0, 4.0),
            Label::new("b", 5.5, 6.0),
        ];

        let found = find_start_end_candidates(&reference, &hypothesis, &thresholds(0.5, None));
        assert_eq!(found.pairs, vec![(0, 0), (1, 2)]);
        assert!(found.ref_unmatched.is_empty());
        assert_eq!(found.hyp_unmatched, BTreeSet::from([1]));
    }

    #[test]
    fn start_end_with_strict_end_check() {
        let reference = vec![Label::new("a", 1.0, 2.0)];
        let hypothesis = vec![Label::new("a", 1.0, 2.25), Label::new("a", 1.0, 2.1)];

        let found =
            find_start_end_candidates(&reference, &hypothesis, &thresholds(0.5, Some(0.25)));
        assert_eq!(found.pairs, vec![(0, 1)]);
        assert_eq!(found.hyp_unmatched, BTreeSet::from([0]));
    }

    #[test]
    fn start_end_open_ends() {
        let open = Label::open("a", 1.0);
        let closed = Label::new("a", 1.0, 2.0);
        let t = thresholds(0.5, Some(1.0));
        assert!(start_end_admissible(&open, &Label::open("a", 1.2), &t));
        assert!(!start_end_admissible(&open, &closed, &t));
        assert!(start_end_admissible(&open, &closed, &thresholds(0.5, None)));
    }

    #[test]
    fn overlap_minimum_is_inclusive() {
        let r = Label::new("a", 0.0, 1.0);
        let h = Label::new("a", 0.75, 2.0);
        let t = OverlapThreshold { min_overlap: 0.25 };
        assert!(overlap_admissible(&r, &h, &t));
        let t = OverlapThreshold { min_overlap: 0.3 };
        assert!(!overlap_admissible(&r, &h, &t));
    }

    #[test]
    fn zero_minimum_requires_positive_overlap() {
        let t = OverlapThreshold { min_overlap: 0.0 };
        let r = Label::new("a", 0.0, 1.0);
        assert!(!overlap_admissible(&r, &Label::new("a", 1.0, 2.0), &t));
        assert!(overlap_admissible(&r, &Label::new("a", 0.999, 2.0), &t));
    }

    #[test]
    fn overlap_many_to_many() {
        let reference = vec![Label::new("a", 0.0, 2.0), Label::new("b", 2.0, 4.0)];
        let hypothesis = vec![Label::new("c", 1.0, 3.0), Label::new("d", 8.0, 9.0)];

        let found =
            find_overlap_candidates(&reference, &hypothesis, &OverlapThreshold::default());
        assert_eq!(found.pairs, vec![(0, 0), (1, 0)]);
        assert!(found.ref_unmatched.is_empty());
        assert_eq!(found.hyp_unmatched, BTreeSet::from([1]));
    }

    #[test]
    fn empty_inputs() {
        let found = find_overlap_candidates(&[], &[], &OverlapThreshold::default());
        assert!(found.is_empty());
        assert!(found.ref_unmatched.is_empty());

        let reference = vec![Label::new("a", 0.0, 1.0)];
        let found = find_overlap_candidates(&reference, &[], &OverlapThreshold::default());
        assert_eq!(found.ref_unmatched, BTreeSet::from([0]));
    }
}
