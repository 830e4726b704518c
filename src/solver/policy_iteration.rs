//! Policy iteration: alternate policy evaluation and greedy improvement.

use log::debug;

use crate::error::{Error, Result};
use crate::mdp::Mdp;
use crate::solver::{best_action, evaluate_policy, q_value, Solution, MAX_SWEEPS};

/// Dead-band below which two actions count as equally good. Improvement
/// switches actions only on a strictly larger margin; without it, Q-values
/// tied up to floating-point noise make the policy oscillate forever.
pub const DEAD_BAND: f64 = 3e-6;

/// Starts from action 0 everywhere and alternates full policy evaluation
/// (fixed point to 1e-12) with greedy improvement until no state changes
/// its action.
pub fn solve(mdp: &Mdp) -> Result<Solution> {
    let mut policy = vec![0_usize; mdp.num_states];
    for round in 0..MAX_SWEEPS {
        let values = evaluate_policy(mdp, &policy)?;
        let mut changed = false;
        for state in 0..mdp.num_states {
            let current = q_value(mdp, &values, state, policy[state]);
            let (best, best_q) = best_action(mdp, &values, state);
            if best_q > current + DEAD_BAND {
                policy[state] = best;
                changed = true;
            }
        }
        if !changed {
            debug!("policy iteration stable after {} rounds", round + 1);
            return Ok(Solution {
                values,
                policy,
                warnings: Vec::new(),
            });
        }
    }
    Err(Error::Internal(format!(
        "policy iteration did not stabilize within {MAX_SWEEPS} rounds"
    )))
}
