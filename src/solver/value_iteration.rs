//! Value iteration: Bellman-optimality sweeps to a fixed point.

use log::debug;
use ndarray::Array1;

use crate::error::{Error, Result};
use crate::mdp::Mdp;
use crate::solver::{best_action, greedy_policy, Solution, MAX_SWEEPS, TOLERANCE};

/// Sweeps `V'[s] = max_a Q(V, s, a)` from all-zero values until the
/// Euclidean norm of successive value vectors drops below [`TOLERANCE`],
/// then extracts the greedy policy. Terminal states have no outgoing
/// transitions, so their value stays pinned at zero through every sweep.
pub fn solve(mdp: &Mdp) -> Result<Solution> {
    let mut values = Array1::zeros(mdp.num_states);
    for sweep in 0..MAX_SWEEPS {
        let next = Array1::from_shape_fn(mdp.num_states, |s| best_action(mdp, &values, s).1);
        let delta = (&next - &values).mapv(|d| d * d).sum().sqrt();
        values = next;
        if delta < TOLERANCE {
            debug!("value iteration converged after {} sweeps", sweep + 1);
            let policy = greedy_policy(mdp, &values);
            return Ok(Solution {
                values,
                policy,
                warnings: Vec::new(),
            });
        }
    }
    Err(Error::Internal(format!(
        "value iteration did not converge within {MAX_SWEEPS} sweeps"
    )))
}
