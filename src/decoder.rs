//! Policy-to-path decoding.
//!
//! Walks a solved policy from the start state to the terminal state,
//! translating each chosen action into a coordinate step and mapping the
//! resulting coordinate back through the encoder's [`StateMap`]. The same
//! enumeration the encoder used must be supplied; anything else shows up
//! as an [`Error::InvalidTransition`].

use crate::encoder::StateMap;
use crate::error::{Error, Result};
use crate::mdp::Action;

/// Step cap multiplier. An optimal policy never revisits a state, so any
/// walk longer than a few times the state count is cycling.
const STEP_CAP_FACTOR: usize = 4;

pub fn decode(
    map: &StateMap,
    policy: &[usize],
    start: usize,
    terminal: usize,
) -> Result<Vec<Action>> {
    let num_states = map.len();
    if start >= num_states || terminal >= num_states {
        return Err(Error::Precondition(format!(
            "start {start} or terminal {terminal} outside [0, {num_states})"
        )));
    }
    if policy.len() != num_states {
        return Err(Error::Precondition(format!(
            "policy covers {} states, expected {num_states}",
            policy.len()
        )));
    }

    let step_cap = STEP_CAP_FACTOR * num_states;
    let mut state = start;
    let mut path = Vec::new();
    while state != terminal {
        if path.len() >= step_cap {
            return Err(Error::NoPathFound { steps: step_cap });
        }
        let action = Action::from_index(policy[state]).ok_or_else(|| {
            Error::Precondition(format!(
                "policy action {} at state {state} is out of range",
                policy[state]
            ))
        })?;
        let (row, col) = map.coord_of(state);
        let (dr, dc) = action.delta();
        let (row, col) = (row as i64 + dr, col as i64 + dc);
        state = map
            .state_at(row, col)
            .ok_or(Error::InvalidTransition { row, col })?;
        path.push(action);
    }
    Ok(path)
}
