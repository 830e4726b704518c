//! Dense-tableau two-phase primal simplex.
//!
//! Solves small linear programs in standard form:
//! minimize `c^T x` subject to `A x <= b`, `x >= 0`.
//!
//! Rows with negative right-hand sides are negated and given artificial
//! variables; Phase I minimizes the artificial sum to find a basic feasible
//! solution, Phase II optimizes the real objective. The kernel never
//! panics on a bad problem: infeasible, unbounded, or iteration-capped
//! solves come back with `converged: false` and whatever point the tableau
//! held, which the caller treats as a recoverable warning.

use std::fmt::Debug;

use num_traits::Float;

/// Pivot tolerance: entries smaller than this count as zero.
const EPSILON: f64 = 1e-10;
/// Phase I residual above which the program is declared infeasible.
const FEASIBILITY_TOLERANCE: f64 = 1e-7;

/// A linear program in standard form.
#[derive(Debug, Clone)]
pub struct LinearProgram<T>
where
    T: Float + Debug,
{
    /// Objective coefficients (`c` in `min c^T x`).
    pub objective: Vec<T>,
    /// Constraint matrix (`A` in `A x <= b`), one row per constraint.
    pub constraints: Vec<Vec<T>>,
    /// Right-hand side (`b` in `A x <= b`).
    pub rhs: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct SimplexConfig {
    /// Cap on pivots per phase.
    pub max_iterations: usize,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimplexOutcome<T>
where
    T: Float + Debug,
{
    pub optimal_point: Vec<T>,
    pub optimal_value: T,
    pub iterations: usize,
    pub converged: bool,
}

enum Step {
    Optimal,
    Pivoted,
    Unbounded,
}

struct Tableau<T>
where
    T: Float + Debug,
{
    /// `m` rows of `cols + 1` entries; the last entry is the RHS.
    rows: Vec<Vec<T>>,
    /// Reduced-cost row; its last entry is the negated objective value.
    cost_row: Vec<T>,
    /// Basic column per row.
    basis: Vec<usize>,
    /// Total variable columns (structural + slack + artificial).
    cols: usize,
    /// First artificial column; artificials never enter the basis.
    first_artificial: usize,
}

impl<T> Tableau<T>
where
    T: Float + Debug,
{
    fn eps() -> T {
        T::from(EPSILON).unwrap()
    }

    /// Builds the initial tableau with slack variables, negating rows with
    /// negative RHS and covering them with artificial variables.
    fn new(lp: &LinearProgram<T>) -> Tableau<T> {
        let m = lp.constraints.len();
        let n = lp.objective.len();
        let negated: Vec<bool> = lp.rhs.iter().map(|&b| b < T::zero()).collect();
        let num_artificial = negated.iter().filter(|&&neg| neg).count();
        let cols = n + m + num_artificial;

        let mut rows = vec![vec![T::zero(); cols + 1]; m];
        let mut basis = vec![0_usize; m];
        let mut next_artificial = n + m;
        for i in 0..m {
            let sign = if negated[i] { -T::one() } else { T::one() };
            for j in 0..n {
                rows[i][j] = sign * lp.constraints[i][j];
            }
            rows[i][n + i] = sign;
            rows[i][cols] = sign * lp.rhs[i];
            if negated[i] {
                rows[i][next_artificial] = T::one();
                basis[i] = next_artificial;
                next_artificial += 1;
            } else {
                basis[i] = n + i;
            }
        }

        Tableau {
            rows,
            cost_row: vec![T::zero(); cols + 1],
            basis,
            cols,
            first_artificial: n + m,
        }
    }

    /// Installs the reduced-cost row for the given per-column costs:
    /// `z[j] = c[j] - sum_i c[basis[i]] * rows[i][j]`.
    fn set_costs(&mut self, costs: &[T]) {
        for j in 0..=self.cols {
            self.cost_row[j] = if j < self.cols { costs[j] } else { T::zero() };
        }
        for (i, row) in self.rows.iter().enumerate() {
            let basic_cost = costs[self.basis[i]];
            if basic_cost.abs() > Self::eps() {
                for j in 0..=self.cols {
                    self.cost_row[j] = self.cost_row[j] - basic_cost * row[j];
                }
            }
        }
    }

    /// Current objective value (the cost row stores its negation).
    fn objective_value(&self) -> T {
        -self.cost_row[self.cols]
    }

    /// One simplex step: Dantzig entering rule over non-artificial columns,
    /// minimum-ratio leaving rule with lowest-basis-index tie-breaking.
    fn step(&mut self) -> Step {
        let eps = Self::eps();
        let mut entering = None;
        let mut most_negative = -eps;
        for j in 0..self.first_artificial {
            if self.cost_row[j] < most_negative {
                most_negative = self.cost_row[j];
                entering = Some(j);
            }
        }
        let Some(entering) = entering else {
            return Step::Optimal;
        };

        let mut leaving = None;
        let mut best_ratio = T::infinity();
        for (i, row) in self.rows.iter().enumerate() {
            let coefficient = row[entering];
            if coefficient > eps {
                let ratio = row[self.cols] / coefficient;
                let better = match leaving {
                    None => true,
                    Some(current) => {
                        ratio < best_ratio - eps
                            || (ratio < best_ratio + eps && self.basis[i] < self.basis[current])
                    }
                };
                if better {
                    best_ratio = ratio;
                    leaving = Some(i);
                }
            }
        }
        let Some(leaving) = leaving else {
            return Step::Unbounded;
        };

        self.pivot(leaving, entering);
        Step::Pivoted
    }

    fn pivot(&mut self, leaving: usize, entering: usize) {
        let eps = Self::eps();
        let pivot = self.rows[leaving][entering];
        let scale = T::one() / pivot;
        for value in self.rows[leaving].iter_mut() {
            *value = *value * scale;
            if value.abs() < eps {
                *value = T::zero();
            }
        }
        self.rows[leaving][entering] = T::one();
        let pivot_row = self.rows[leaving].clone();

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == leaving {
                continue;
            }
            let factor = row[entering];
            if factor.abs() > eps {
                for (value, &p) in row.iter_mut().zip(&pivot_row) {
                    *value = *value - factor * p;
                }
                row[entering] = T::zero();
            }
        }
        let factor = self.cost_row[entering];
        if factor.abs() > eps {
            for (value, &p) in self.cost_row.iter_mut().zip(&pivot_row) {
                *value = *value - factor * p;
            }
            self.cost_row[entering] = T::zero();
        }
        self.basis[leaving] = entering;
    }

    /// Runs simplex steps until optimal, unbounded, or the iteration cap.
    /// Returns (pivots taken, reached optimality).
    fn optimize(&mut self, max_iterations: usize) -> (usize, bool) {
        for iteration in 0..max_iterations {
            match self.step() {
                Step::Optimal => return (iteration, true),
                Step::Pivoted => {}
                Step::Unbounded => return (iteration, false),
            }
        }
        (max_iterations, false)
    }

    /// Pivots still-basic artificial variables out on any usable column.
    /// A row with no usable column is redundant and left in place; its
    /// artificial stays basic at zero and never re-enters elsewhere.
    fn drive_out_artificials(&mut self) {
        let eps = Self::eps();
        for i in 0..self.rows.len() {
            if self.basis[i] < self.first_artificial {
                continue;
            }
            let column = (0..self.first_artificial).find(|&j| self.rows[i][j].abs() > eps);
            if let Some(j) = column {
                self.pivot(i, j);
            }
        }
    }

    /// Value of each of the first `n` (structural) variables.
    fn extract(&self, n: usize) -> Vec<T> {
        let mut point = vec![T::zero(); n];
        for (i, &basic) in self.basis.iter().enumerate() {
            if basic < n {
                point[basic] = self.rows[i][self.cols];
            }
        }
        point
    }
}

/// Minimizes a standard-form linear program. Never panics on a bad
/// problem; inspect `converged` on the outcome.
pub fn minimize<T>(lp: &LinearProgram<T>, config: &SimplexConfig) -> SimplexOutcome<T>
where
    T: Float + Debug,
{
    let n = lp.objective.len();
    debug_assert!(lp.constraints.len() == lp.rhs.len());
    debug_assert!(lp.constraints.iter().all(|row| row.len() == n));

    let mut tableau = Tableau::new(lp);
    let mut iterations = 0;

    // Phase I: minimize the artificial sum down to zero.
    if tableau.first_artificial < tableau.cols {
        let mut phase_one_costs = vec![T::zero(); tableau.cols];
        for cost in phase_one_costs.iter_mut().skip(tableau.first_artificial) {
            *cost = T::one();
        }
        tableau.set_costs(&phase_one_costs);
        let (pivots, optimal) = tableau.optimize(config.max_iterations);
        iterations += pivots;
        let residual = tableau.objective_value();
        if !optimal || residual > T::from(FEASIBILITY_TOLERANCE).unwrap() {
            // Infeasible (or Phase I stalled): no meaningful point exists.
            return SimplexOutcome {
                optimal_point: vec![T::zero(); n],
                optimal_value: T::zero(),
                iterations,
                converged: false,
            };
        }
        tableau.drive_out_artificials();
    }

    // Phase II: optimize the real objective from the feasible basis.
    let mut costs = vec![T::zero(); tableau.cols];
    costs[..n].copy_from_slice(&lp.objective);
    tableau.set_costs(&costs);
    let (pivots, converged) = tableau.optimize(config.max_iterations);
    iterations += pivots;

    let optimal_point = tableau.extract(n);
    let optimal_value = optimal_point
        .iter()
        .zip(&lp.objective)
        .fold(T::zero(), |acc, (&x, &c)| acc + c * x);
    SimplexOutcome {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_a_basic_feasible_program() {
        // min -x - y  s.t.  x + y <= 1  =>  value -1 on the simplex edge.
        let lp = LinearProgram {
            objective: vec![-1.0, -1.0],
            constraints: vec![vec![1.0, 1.0]],
            rhs: vec![1.0],
        };
        let outcome = minimize(&lp, &SimplexConfig::default());
        assert!(outcome.converged);
        assert_abs_diff_eq!(outcome.optimal_value, -1.0, epsilon = 1e-9);
        let sum: f64 = outcome.optimal_point.iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn phase_one_handles_negative_rhs() {
        // min x  s.t.  x >= 1 (written as -x <= -1)  =>  x = 1.
        let lp = LinearProgram {
            objective: vec![1.0],
            constraints: vec![vec![-1.0]],
            rhs: vec![-1.0],
        };
        let outcome = minimize(&lp, &SimplexConfig::default());
        assert!(outcome.converged);
        assert_abs_diff_eq!(outcome.optimal_point[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.optimal_value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn bounded_two_variable_program() {
        // min -2x - 3y  s.t.  x <= 4, y <= 3, x + y <= 5  =>  x=2, y=3.
        let lp = LinearProgram {
            objective: vec![-2.0, -3.0],
            constraints: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
            rhs: vec![4.0, 3.0, 5.0],
        };
        let outcome = minimize(&lp, &SimplexConfig::default());
        assert!(outcome.converged);
        assert_abs_diff_eq!(outcome.optimal_point[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.optimal_point[1], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.optimal_value, -13.0, epsilon = 1e-9);
    }

    #[test]
    fn reports_infeasible_programs() {
        // x <= -1 contradicts x >= 0.
        let lp = LinearProgram {
            objective: vec![1.0],
            constraints: vec![vec![1.0]],
            rhs: vec![-1.0],
        };
        let outcome = minimize(&lp, &SimplexConfig::default());
        assert!(!outcome.converged);
    }

    #[test]
    fn reports_unbounded_programs() {
        // min -x with no constraints at all.
        let lp = LinearProgram {
            objective: vec![-1.0],
            constraints: vec![],
            rhs: vec![],
        };
        let outcome = minimize(&lp, &SimplexConfig::default());
        assert!(!outcome.converged);
    }

    #[test]
    fn equality_via_opposing_inequalities() {
        // min x + y  s.t.  x + y >= 2, x + y <= 2, x <= 1.5  =>  value 2.
        let lp = LinearProgram {
            objective: vec![1.0, 1.0],
            constraints: vec![vec![-1.0, -1.0], vec![1.0, 1.0], vec![1.0, 0.0]],
            rhs: vec![-2.0, 2.0, 1.5],
        };
        let outcome = minimize(&lp, &SimplexConfig::default());
        assert!(outcome.converged);
        assert_abs_diff_eq!(outcome.optimal_value, 2.0, epsilon = 1e-9);
    }
}
