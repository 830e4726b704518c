//! Linear-programming solution of the Bellman optimality conditions.
//!
//! One free variable per non-terminal state, objective `min Σ V[s]`,
//! constraints `V[s] >= Q(V, s, a)` per state/action pair (linear in the
//! `V` variables), and `V[t] = 0` per terminal state. Terminal values are
//! substituted out instead of constrained, and the remaining free
//! variables are split into positive and negative parts for the
//! standard-form simplex kernel.

use log::warn;
use ndarray::Array1;

use crate::error::Result;
use crate::mdp::Mdp;
use crate::solver::simplex::{self, LinearProgram, SimplexConfig};
use crate::solver::{evaluate_policy, q_value, Solution, SolveWarning};

pub fn solve(mdp: &Mdp) -> Result<Solution> {
    let free: Vec<usize> = (0..mdp.num_states)
        .filter(|&s| !mdp.is_terminal(s))
        .collect();
    let mut variable_of = vec![None; mdp.num_states];
    for (k, &s) in free.iter().enumerate() {
        variable_of[s] = Some(k);
    }
    // Variable 2k is the positive part of V[free[k]], 2k+1 the negative.
    let num_vars = 2 * free.len();

    let mut objective = vec![0.0; num_vars];
    for k in 0..free.len() {
        objective[2 * k] = 1.0;
        objective[2 * k + 1] = -1.0;
    }

    // V[s] >= sum p (r + gamma V[s'])
    //   <=>  sum gamma p V[s'] - V[s] <= -sum p r
    let mut constraints = Vec::new();
    let mut rhs = Vec::new();
    for &s in &free {
        for action in 0..mdp.num_actions {
            let outcomes = &mdp.transitions[s][action];
            if outcomes.is_empty() {
                continue;
            }
            let mut row = vec![0.0; num_vars];
            let mut bound = 0.0;
            if let Some(k) = variable_of[s] {
                row[2 * k] -= 1.0;
                row[2 * k + 1] += 1.0;
            }
            for t in outcomes {
                bound -= t.probability * t.reward;
                // Terminal targets contribute a fixed zero value.
                if let Some(k) = variable_of[t.next] {
                    row[2 * k] += mdp.discount * t.probability;
                    row[2 * k + 1] -= mdp.discount * t.probability;
                }
            }
            constraints.push(row);
            rhs.push(bound);
        }
    }

    let lp = LinearProgram {
        objective,
        constraints,
        rhs,
    };
    let outcome = simplex::minimize(&lp, &SimplexConfig::default());

    let mut warnings = Vec::new();
    if !outcome.converged {
        // Recoverable: keep the returned point, surface the condition.
        warn!(
            "LP solve stopped without proven optimality after {} pivots; using returned values",
            outcome.iterations
        );
        warnings.push(SolveWarning::LpNonOptimal {
            iterations: outcome.iterations,
        });
    }

    let mut values = Array1::zeros(mdp.num_states);
    for (k, &s) in free.iter().enumerate() {
        values[s] = outcome.optimal_point[2 * k] - outcome.optimal_point[2 * k + 1];
    }

    // The LP pins V but leaves the optimal action degenerate; recover the
    // action whose Q-value sits closest to V[s], lowest index on ties.
    let mut policy = vec![0_usize; mdp.num_states];
    for s in 0..mdp.num_states {
        let mut best = 0;
        let mut best_gap = f64::INFINITY;
        for action in 0..mdp.num_actions {
            if mdp.transitions[s][action].is_empty() {
                continue;
            }
            let gap = (q_value(mdp, &values, s, action) - values[s]).abs();
            if gap < best_gap {
                best_gap = gap;
                best = action;
            }
        }
        policy[s] = best;
    }

    // Re-evaluate the recovered policy so the reported values share the
    // fixed-point definition used by value and policy iteration.
    let values = evaluate_policy(mdp, &policy)?;
    Ok(Solution {
        values,
        policy,
        warnings,
    })
}
