//! Optimal value-function and policy computation.
//!
//! Three methods share one transition-model abstraction and one definition
//! of the action value `Q(V, s, a) = Σ p·(r + γ·V[s'])`: value iteration,
//! policy iteration, and a linear-programming formulation solved by the
//! simplex kernel. All three must agree on the value function within
//! numerical tolerance for any well-formed MDP.

pub mod linear_programming;
pub mod policy_iteration;
pub mod simplex;
pub mod value_iteration;

use std::str::FromStr;

use ndarray::Array1;

use crate::error::{Error, Result};
use crate::mdp::Mdp;

/// Euclidean-norm tolerance for the fixed-point iterations.
pub const TOLERANCE: f64 = 1e-12;

/// Safety cap on fixed-point sweeps. The discount contraction guarantees
/// termination long before this; exceeding it indicates a modeling bug
/// such as a discount at or above one.
pub const MAX_SWEEPS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    ValueIteration,
    PolicyIteration,
    LinearProgramming,
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Algorithm> {
        match s {
            "vi" => Ok(Algorithm::ValueIteration),
            "pi" => Ok(Algorithm::PolicyIteration),
            "lp" => Ok(Algorithm::LinearProgramming),
            other => Err(Error::Precondition(format!(
                "unknown algorithm `{other}`; expected vi, pi or lp"
            ))),
        }
    }
}

/// Recoverable solver conditions, surfaced to the caller alongside the
/// solution instead of aborting the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveWarning {
    /// The LP solver stopped without proving optimality; the returned
    /// variable values were used anyway.
    LpNonOptimal { iterations: usize },
}

/// A solved MDP: one value per state, one action index per state, and any
/// recoverable warnings raised along the way. The policy entry of a
/// terminal state is irrelevant.
#[derive(Debug, Clone)]
pub struct Solution {
    pub values: Array1<f64>,
    pub policy: Vec<usize>,
    pub warnings: Vec<SolveWarning>,
}

/// Solves an MDP with the requested algorithm after checking the solver
/// preconditions.
pub fn solve(mdp: &Mdp, algorithm: Algorithm) -> Result<Solution> {
    mdp.check()?;
    match algorithm {
        Algorithm::ValueIteration => value_iteration::solve(mdp),
        Algorithm::PolicyIteration => policy_iteration::solve(mdp),
        Algorithm::LinearProgramming => linear_programming::solve(mdp),
    }
}

/// The shared action-value primitive: `Q(V, s, a) = Σ p·(r + γ·V[s'])`.
/// An empty transition list (terminal state) yields zero.
pub fn q_value(mdp: &Mdp, values: &Array1<f64>, state: usize, action: usize) -> f64 {
    mdp.transitions[state][action]
        .iter()
        .map(|t| t.probability * (t.reward + mdp.discount * values[t.next]))
        .sum()
}

/// Greedy action and its Q-value; the first maximum wins ties, so the
/// lowest action index is deterministic under equal Q-values.
pub fn best_action(mdp: &Mdp, values: &Array1<f64>, state: usize) -> (usize, f64) {
    let mut best = 0;
    let mut best_q = q_value(mdp, values, state, 0);
    for action in 1..mdp.num_actions {
        let q = q_value(mdp, values, state, action);
        if q > best_q {
            best = action;
            best_q = q;
        }
    }
    (best, best_q)
}

/// Greedy policy with respect to a value function.
pub fn greedy_policy(mdp: &Mdp, values: &Array1<f64>) -> Vec<usize> {
    (0..mdp.num_states)
        .map(|s| best_action(mdp, values, s).0)
        .collect()
}

/// Fixed-point policy evaluation by repeated substitution:
/// `V[s] ← Q(V, π(s), s)` until the Euclidean norm of successive value
/// vectors drops below [`TOLERANCE`].
pub fn evaluate_policy(mdp: &Mdp, policy: &[usize]) -> Result<Array1<f64>> {
    if policy.len() != mdp.num_states {
        return Err(Error::Precondition(format!(
            "policy covers {} states, expected {}",
            policy.len(),
            mdp.num_states
        )));
    }
    let mut values = Array1::zeros(mdp.num_states);
    for _ in 0..MAX_SWEEPS {
        let next = Array1::from_shape_fn(mdp.num_states, |s| q_value(mdp, &values, s, policy[s]));
        let delta = (&next - &values).mapv(|d| d * d).sum().sqrt();
        values = next;
        if delta < TOLERANCE {
            return Ok(values);
        }
    }
    Err(Error::Internal(format!(
        "policy evaluation did not converge within {MAX_SWEEPS} sweeps"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::generator::MdpGenerator;
    use crate::grid::Grid;
    use crate::mdp::Transition;
    use approx::assert_abs_diff_eq;

    /// Two states, two actions: staying in state 1 under action 1 pays 2
    /// forever, so V(1) = 2 / (1 - 0.9) = 20.
    fn recurrent_mdp() -> Mdp {
        Mdp {
            num_states: 2,
            num_actions: 2,
            start: 0,
            terminals: Vec::new(),
            transitions: vec![
                vec![
                    vec![Transition {
                        next: 0,
                        reward: 1.0,
                        probability: 1.0,
                    }],
                    vec![Transition {
                        next: 1,
                        reward: 0.0,
                        probability: 1.0,
                    }],
                ],
                vec![
                    vec![Transition {
                        next: 0,
                        reward: 0.0,
                        probability: 1.0,
                    }],
                    vec![Transition {
                        next: 1,
                        reward: 2.0,
                        probability: 1.0,
                    }],
                ],
            ],
            discount: 0.9,
            episodic: false,
        }
    }

    #[test]
    fn q_value_weights_rewards_and_discounted_values() {
        let mdp = recurrent_mdp();
        let values = Array1::from(vec![1.0, 10.0]);
        assert_abs_diff_eq!(q_value(&mdp, &values, 0, 0), 1.9, epsilon = 1e-12);
        assert_abs_diff_eq!(q_value(&mdp, &values, 0, 1), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn best_action_breaks_ties_toward_the_lowest_index() {
        let mdp = recurrent_mdp();
        // With V = 0 everywhere, Q(1, 0) = 0 < Q(1, 1) = 2.
        let zeros = Array1::zeros(2);
        assert_eq!(best_action(&mdp, &zeros, 1).0, 1);

        // Two actions with identical outcomes tie exactly; the first wins.
        let mut tied = recurrent_mdp();
        tied.transitions[0][1] = tied.transitions[0][0].clone();
        let (action, _) = best_action(&tied, &zeros, 0);
        assert_eq!(action, 0);
    }

    #[test]
    fn evaluate_policy_reaches_the_closed_form_fixed_point() {
        let mdp = recurrent_mdp();
        let values = evaluate_policy(&mdp, &[1, 1]).unwrap();
        // V(1) = 2 + 0.9·V(1) ⇒ 20; V(0) = 0 + 0.9·V(1) ⇒ 18.
        assert_abs_diff_eq!(values[1], 20.0, epsilon = 1e-6);
        assert_abs_diff_eq!(values[0], 18.0, epsilon = 1e-6);
    }

    #[test]
    fn evaluate_policy_rejects_wrong_length_policies() {
        let mdp = recurrent_mdp();
        assert!(matches!(
            evaluate_policy(&mdp, &[0]),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn solve_checks_preconditions_first() {
        let mut mdp = recurrent_mdp();
        mdp.start = 9;
        assert!(matches!(
            solve(&mdp, Algorithm::ValueIteration),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("vi".parse::<Algorithm>().unwrap(), Algorithm::ValueIteration);
        assert_eq!("pi".parse::<Algorithm>().unwrap(), Algorithm::PolicyIteration);
        assert_eq!(
            "lp".parse::<Algorithm>().unwrap(),
            Algorithm::LinearProgramming
        );
        assert!("dp".parse::<Algorithm>().is_err());
    }

    #[test]
    fn all_three_methods_agree_on_a_maze() {
        let grid = Grid::parse("1 1 1 1 1\n1 2 0 0 1\n1 1 0 1 1\n1 0 0 3 1\n1 1 1 1 1\n").unwrap();
        let (mdp, _) = encode(&grid);
        let vi = solve(&mdp, Algorithm::ValueIteration).unwrap();
        let pi = solve(&mdp, Algorithm::PolicyIteration).unwrap();
        let lp = solve(&mdp, Algorithm::LinearProgramming).unwrap();
        for s in 0..mdp.num_states {
            assert_abs_diff_eq!(vi.values[s], pi.values[s], epsilon = 1e-4);
            assert_abs_diff_eq!(vi.values[s], lp.values[s], epsilon = 1e-4);
            // Policies are identical or tied in Q-value.
            for other in [&pi, &lp] {
                if other.policy[s] != vi.policy[s] {
                    let q_a = q_value(&mdp, &vi.values, s, vi.policy[s]);
                    let q_b = q_value(&mdp, &vi.values, s, other.policy[s]);
                    assert_abs_diff_eq!(q_a, q_b, epsilon = 1e-4);
                }
            }
        }
    }

    #[test]
    fn all_three_methods_agree_on_generated_mdps() {
        // Stochastic transitions (probabilities below one) exercise the
        // simplex constraints with dense probability rows, unlike the
        // deterministic maze encodings.
        for seed in [0, 1, 7] {
            let generator = MdpGenerator {
                num_states: 8,
                num_actions: 3,
                discount: 0.9,
                episodic: true,
                seed,
            };
            let mdp = generator.generate();
            let vi = solve(&mdp, Algorithm::ValueIteration).unwrap();
            let pi = solve(&mdp, Algorithm::PolicyIteration).unwrap();
            let lp = solve(&mdp, Algorithm::LinearProgramming).unwrap();
            assert!(lp.warnings.is_empty(), "seed {seed}: {:?}", lp.warnings);
            for s in 0..mdp.num_states {
                assert_abs_diff_eq!(vi.values[s], pi.values[s], epsilon = 1e-4);
                assert_abs_diff_eq!(vi.values[s], lp.values[s], epsilon = 1e-4);
            }
        }
    }
}
