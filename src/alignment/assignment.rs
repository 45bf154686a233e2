/// Dense square cost matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.size + col] = value;
    }

    pub fn fill_rows(&mut self, rows: std::ops::Range<usize>, value: f64) {
        for row in rows {
            let offset = row * self.size;
            self.cells[offset..offset + self.size].fill(value);
        }
    }

    pub fn fill_cols(&mut self, cols: std::ops::Range<usize>, value: f64) {
        for row in 0..self.size {
            let offset = row * self.size;
            self.cells[offset + cols.start..offset + cols.end].fill(value);
        }
    }

    pub fn is_finite(&self) -> bool {
        self.cells.iter().all(|c| c.is_finite())
    }
}

/// Minimum-cost perfect matching on a square matrix (Hungarian method with
/// row/column potentials, O(n³)).
///
/// Returns `assignment[row] = col`. All costs must be finite.
pub fn solve_assignment(cost: &CostMatrix) -> Vec<usize> {
    let n = cost.size();
    if n == 0 {
        return Vec::new();
    }
    debug_assert!(cost.is_finite(), "assignment costs must be finite");

    // 1-based potentials; index 0 of `col_owner` is the virtual column the
    // augmenting search starts from.
    let mut row_pot = vec![0.0f64; n + 1];
    let mut col_pot = vec![0.0f64; n + 1];
    let mut col_owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];
    let mut min_slack = vec![f64::INFINITY; n + 1];
    let mut used = vec![false; n + 1];

    for row in 1..=n {
        col_owner[0] = row;
        let mut col0 = 0usize;
        min_slack.fill(f64::INFINITY);
        used.fill(false);

        loop {
            used[col0] = true;
            let row0 = col_owner[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0usize;

            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let slack = cost.get(row0 - 1, col - 1) - row_pot[row0] - col_pot[col];
                if slack < min_slack[col] {
                    min_slack[col] = slack;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }

            for col in 0..=n {
                if used[col] {
                    row_pot[col_owner[col]] += delta;
                    col_pot[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            col0 = col1;
            if col_owner[col0] == 0 {
                break;
            }
        }

        // Flip the augmenting path.
        loop {
            let prev = way[col0];
            col_owner[col0] = col_owner[prev];
            col0 = prev;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for col in 1..=n {
        assignment[col_owner[col] - 1] = col - 1;
    }
    assignment
}

pub fn assignment_cost(cost: &CostMatrix, assignment: &[usize]) -> f64 {
    assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| cost.get(row, col))
        .sum()
}
