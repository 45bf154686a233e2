use crate::config::LevenshteinCosts;
use crate::types::Label;

/// Element of an order-only alignment, compared by its token.
pub trait SequenceItem {
    fn token(&self) -> &str;
}

impl SequenceItem for Label {
    fn token(&self) -> &str {
        &self.value
    }
}

impl SequenceItem for String {
    fn token(&self) -> &str {
        self
    }
}

impl SequenceItem for str {
    fn token(&self) -> &str {
        self
    }
}

impl<T: SequenceItem + ?Sized> SequenceItem for &T {
    fn token(&self) -> &str {
        (**self).token()
    }
}

/// Cost of substituting `hyp` for `ref`; only consulted for differing tokens.
pub type SubstitutionCostFn<T> = dyn Fn(&T, &T) -> f64 + Send + Sync;

/// One aligned position: `(None, Some(h))` insertion, `(Some(r), None)` deletion.
pub type AlignedItem<'a, T> = (Option<&'a T>, Option<&'a T>);

/// Row-major `(n+1)×(m+1)` edit-distance table.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    cols: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.cols + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.cells[i * self.cols + j] = value;
    }

    /// Cost of the full alignment, `M[n][m]`.
    pub fn total(&self) -> f64 {
        self.cells.last().copied().unwrap_or(0.0)
    }
}

fn substitution_cost<T: SequenceItem>(
    r: &T,
    h: &T,
    costs: &LevenshteinCosts,
    custom: Option<&SubstitutionCostFn<T>>,
) -> f64 {
    if r.token() == h.token() {
        return 0.0;
    }
    match custom {
        Some(cost_fn) => cost_fn(r, h),
        None => costs.substitution_cost,
    }
}

pub fn distance_matrix<T: SequenceItem>(
    reference: &[T],
    hypothesis: &[T],
    costs: &LevenshteinCosts,
    custom: Option<&SubstitutionCostFn<T>>,
) -> DistanceMatrix {
    let rows = reference.len() + 1;
    let cols = hypothesis.len() + 1;
    let mut mat = DistanceMatrix {
        cols,
        cells: vec![0.0; rows * cols],
    };

    // Borders are accumulated rather than multiplied so the backtrace's
    // equality checks hold exactly for fractional costs too.
    for i in 1..rows {
        let above = mat.get(i - 1, 0);
        mat.set(i, 0, above + costs.deletion_cost);
    }
    for j in 1..cols {
        let left = mat.get(0, j - 1);
        mat.set(0, j, left + costs.insertion_cost);
    }

    for i in 1..rows {
        for j in 1..cols {
            let sub = substitution_cost(&reference[i - 1], &hypothesis[j - 1], costs, custom);
            let diagonal = mat.get(i - 1, j - 1) + sub;
            let insertion = mat.get(i, j - 1) + costs.insertion_cost;
            let deletion = mat.get(i - 1, j) + costs.deletion_cost;
            mat.set(i, j, diagonal.min(insertion).min(deletion));
        }
    }

    mat
}

/// Walks the table back from `(n, m)`.
///
/// On equal cost an insertion is taken before a deletion, and a deletion
/// before the diagonal move.
pub fn backtrace<'a, T>(
    mat: &DistanceMatrix,
    reference: &'a [T],
    hypothesis: &'a [T],
    costs: &LevenshteinCosts,
) -> Vec<AlignedItem<'a, T>> {
    let mut i = reference.len();
    let mut j = hypothesis.len();
    let mut aligned = Vec::with_capacity(i + j);

    while i > 0 || j > 0 {
        let here = mat.get(i, j);
        if j > 0 && (i == 0 || mat.get(i, j - 1) + costs.insertion_cost == here) {
            aligned.push((None, Some(&hypothesis[j - 1])));
            j -= 1;
        } else if i > 0 && (j == 0 || mat.get(i - 1, j) + costs.deletion_cost == here) {
            aligned.push((Some(&reference[i - 1]), None));
            i -= 1;
        } else {
            aligned.push((Some(&reference[i - 1]), Some(&hypothesis[j - 1])));
            i -= 1;
            j -= 1;
        }
    }

    aligned.reverse();
    aligned
}

pub fn align_sequences<'a, T: SequenceItem>(
    reference: &'a [T],
    hypothesis: &'a [T],
    costs: &LevenshteinCosts,
    custom: Option<&SubstitutionCostFn<T>>,
) -> Vec<AlignedItem<'a, T>> {
    let mat = distance_matrix(reference, hypothesis, costs, custom);
    tracing::trace!(
        n_ref = reference.len(),
        n_hyp = hypothesis.len(),
        cost = mat.total(),
        "levenshtein: distance matrix filled"
    );
    backtrace(&mat, reference, hypothesis, costs)
}

pub fn edit_distance<T: SequenceItem>(
    reference: &[T],
    hypothesis: &[T],
    costs: &LevenshteinCosts,
    custom: Option<&SubstitutionCostFn<T>>,
) -> f64 {
    distance_matrix(reference, hypothesis, costs, custom).total()
}
