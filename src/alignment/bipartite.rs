use crate::alignment::assignment::{assignment_cost, solve_assignment, CostMatrix};
use crate::alignment::candidates::Candidates;
use crate::alignment::interval::overlap_percentage;
use crate::config::MatchingPenalties;
use crate::types::{Label, LabelPair};

/// Alignments that need no search: both sides empty, or exactly one side empty.
pub fn degenerate_pairs(reference: &[Label], hypothesis: &[Label]) -> Option<Vec<LabelPair>> {
    match (reference.is_empty(), hypothesis.is_empty()) {
        (true, true) => Some(Vec::new()),
        (true, false) => Some(hypothesis.iter().cloned().map(LabelPair::insertion).collect()),
        (false, true) => Some(reference.iter().cloned().map(LabelPair::deletion).collect()),
        (false, false) => None,
    }
}

/// Cost of pairing two admitted labels.
pub fn pair_cost(r: &Label, h: &Label, penalties: &MatchingPenalties) -> f64 {
    let substitution = if r.value != h.value {
        penalties.substitution_penalty
    } else {
        0.0
    };
    substitution + penalties.non_overlap_penalty_weight * (1.0 - overlap_percentage(r, h))
}

/// Square `(n+m)×(n+m)` matrix: rows are the `n` references followed by `m`
/// insertion slots, columns the `m` hypotheses followed by `n` deletion slots.
pub fn build_cost_matrix(
    reference: &[Label],
    hypothesis: &[Label],
    candidates: &Candidates,
    penalties: &MatchingPenalties,
) -> CostMatrix {
    let n = reference.len();
    let m = hypothesis.len();
    let size = n + m;

    let mut cost = CostMatrix::filled(size, penalties.invalid_penalty());
    cost.fill_rows(n..size, penalties.insertion_penalty);
    cost.fill_cols(m..size, penalties.deletion_penalty);

    for &(i, j) in &candidates.pairs {
        cost.set(i, j, pair_cost(&reference[i], &hypothesis[j], penalties));
    }
    cost
}

/// Solves the one-to-one matching and maps slots back to labels.
///
/// Insertion-slot × deletion-slot assignments are dropped.
pub fn match_one_to_one(
    reference: &[Label],
    hypothesis: &[Label],
    candidates: &Candidates,
    penalties: &MatchingPenalties,
) -> Vec<LabelPair> {
    let n = reference.len();
    let m = hypothesis.len();
    let cost = build_cost_matrix(reference, hypothesis, candidates, penalties);
    let assignment = solve_assignment(&cost);

    tracing::debug!(
        n_ref = n,
        n_hyp = m,
        candidates = candidates.pairs.len(),
        total_cost = format!("{:.3}", assignment_cost(&cost, &assignment)),
        "bipartite: assignment solved"
    );

    assignment
        .into_iter()
        .enumerate()
        .filter_map(|(row, col)| {
            // Slots past the real labels are insertion rows / deletion columns.
            match (reference.get(row).cloned(), hypothesis.get(col).cloned()) {
                (None, None) => None,
                (r, h) => Some(LabelPair::new(r, h)),
            }
        })
        .collect()
}

/// Every candidate pair, then one deletion per unmatched reference and one
/// insertion per unmatched hypothesis.
pub fn match_all_candidates(
    reference: &[Label],
    hypothesis: &[Label],
    candidates: &Candidates,
) -> Vec<LabelPair> {
    let paired = candidates
        .pairs
        .iter()
        .map(|&(i, j)| LabelPair::matched(reference[i].clone(), hypothesis[j].clone()));
    let deletions = candidates
        .ref_unmatched
        .iter()
        .map(|&i| LabelPair::deletion(reference[i].clone()));
    let insertions = candidates
        .hyp_unmatched
        .iter()
        .map(|&j| LabelPair::insertion(hypothesis[j].clone()));

    paired.chain(deletions).chain(insertions).collect()
}
