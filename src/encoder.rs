//! Grid-to-MDP encoding and the coordinate/state bijection.
//!
//! The encoder owns the enumeration order that ties grid coordinates to
//! dense state indices: a row-major scan over non-wall cells. The decoder
//! must reproduce it exactly, so the mapping travels as an explicit
//! [`StateMap`] instead of an ordering convention.

use std::collections::HashMap;

use crate::grid::{Cell, Grid};
use crate::mdp::{Action, Mdp, Transition, NUM_ACTIONS};

/// Reward for stepping onto the designated goal cell.
pub const GOAL_REWARD: f64 = 1_000_000.0;
/// Reward for an ordinary step between open cells.
pub const STEP_REWARD: f64 = -1.0;
/// Reward for bumping a wall or the boundary (self-transition).
pub const BLOCKED_REWARD: f64 = -1_000_000.0;
/// Fixed discount of encoded maze MDPs.
pub const DISCOUNT: f64 = 0.9;

/// Bidirectional lookup between grid coordinates and state indices,
/// built by one row-major scan that skips walls.
#[derive(Debug, Clone)]
pub struct StateMap {
    coords: Vec<(usize, usize)>,
    index: HashMap<(usize, usize), usize>,
    start: usize,
    goals: Vec<usize>,
}

impl StateMap {
    pub fn from_grid(grid: &Grid) -> StateMap {
        let mut coords = Vec::new();
        let mut index = HashMap::new();
        let mut start = 0;
        let mut goals = Vec::new();
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let cell = match grid.cell(row as i64, col as i64) {
                    Some(Cell::Wall) | None => continue,
                    Some(cell) => cell,
                };
                let state = coords.len();
                coords.push((row, col));
                index.insert((row, col), state);
                match cell {
                    Cell::Start => start = state,
                    Cell::Goal => goals.push(state),
                    _ => {}
                }
            }
        }
        StateMap {
            coords,
            index,
            start,
            goals,
        }
    }

    /// Number of states (non-wall cells).
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinate of a state index. Panics on an out-of-range index;
    /// callers validate indices at their boundary.
    pub fn coord_of(&self, state: usize) -> (usize, usize) {
        self.coords[state]
    }

    /// State index at a signed coordinate, `None` off-grid or on a wall.
    pub fn state_at(&self, row: i64, col: i64) -> Option<usize> {
        if row < 0 || col < 0 {
            return None;
        }
        self.index.get(&(row as usize, col as usize)).copied()
    }

    pub fn start_state(&self) -> usize {
        self.start
    }

    /// Goal-coded states in enumeration order.
    pub fn goal_states(&self) -> &[usize] {
        &self.goals
    }
}

fn manhattan(a: (usize, usize), b: (usize, usize)) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Encodes a grid as an explicit MDP. Pure and deterministic: the same grid
/// always yields the same state indices, transitions and rewards.
///
/// The terminal state is the goal cell nearest the start by Manhattan
/// distance, first found in enumeration order on ties; any other goal cells
/// are treated as ordinary free cells. Each non-terminal state gets one
/// transition per compass action: onto the terminal cell with
/// [`GOAL_REWARD`], onto an open cell with [`STEP_REWARD`], or a
/// self-transition with [`BLOCKED_REWARD`] when the move is off-grid or
/// into a wall. All transitions have probability 1.0.
pub fn encode(grid: &Grid) -> (Mdp, StateMap) {
    let map = StateMap::from_grid(grid);
    let start = map.start_state();
    let start_coord = map.coord_of(start);

    // Grid validation guarantees at least one goal.
    let mut terminal = map.goal_states()[0];
    for &goal in &map.goal_states()[1..] {
        if manhattan(map.coord_of(goal), start_coord) < manhattan(map.coord_of(terminal), start_coord)
        {
            terminal = goal;
        }
    }

    let mut transitions = vec![vec![Vec::new(); NUM_ACTIONS]; map.len()];
    for state in 0..map.len() {
        if state == terminal {
            continue;
        }
        let (row, col) = map.coord_of(state);
        for action in Action::ALL {
            let (dr, dc) = action.delta();
            let next = map.state_at(row as i64 + dr, col as i64 + dc);
            let transition = match next {
                Some(next) if next == terminal => Transition {
                    next,
                    reward: GOAL_REWARD,
                    probability: 1.0,
                },
                Some(next) => Transition {
                    next,
                    reward: STEP_REWARD,
                    probability: 1.0,
                },
                None => Transition {
                    next: state,
                    reward: BLOCKED_REWARD,
                    probability: 1.0,
                },
            };
            transitions[state][action.index()].push(transition);
        }
    }

    let mdp = Mdp {
        num_states: map.len(),
        num_actions: NUM_ACTIONS,
        start,
        terminals: vec![terminal],
        transitions,
        discount: DISCOUNT,
        episodic: true,
    };
    (mdp, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOXED: &str = "1 1 1 1\n1 2 0 1\n1 0 3 1\n1 1 1 1\n";

    #[test]
    fn state_map_enumerates_open_cells_row_major() {
        let grid = Grid::parse(BOXED).unwrap();
        let map = StateMap::from_grid(&grid);
        assert_eq!(map.len(), 4);
        assert_eq!(map.coord_of(0), (1, 1));
        assert_eq!(map.coord_of(1), (1, 2));
        assert_eq!(map.coord_of(2), (2, 1));
        assert_eq!(map.coord_of(3), (2, 2));
        assert_eq!(map.start_state(), 0);
        assert_eq!(map.goal_states(), &[3]);
        assert_eq!(map.state_at(1, 2), Some(1));
        assert_eq!(map.state_at(0, 0), None); // wall
        assert_eq!(map.state_at(-1, 1), None);
    }

    #[test]
    fn encodes_the_boxed_maze() {
        let grid = Grid::parse(BOXED).unwrap();
        let (mdp, map) = encode(&grid);
        mdp.check().unwrap();
        assert_eq!(mdp.num_states, 4);
        assert_eq!(mdp.num_actions, 4);
        assert_eq!(mdp.start, 0);
        assert_eq!(mdp.terminals, vec![3]);
        assert_eq!(map.len(), 4);

        // The terminal state has no outgoing transitions.
        assert!(mdp.transitions[3].iter().all(|list| list.is_empty()));

        // Start moving east reaches the free cell with a step penalty.
        let east = &mdp.transitions[0][Action::East.index()][0];
        assert_eq!(east.next, 1);
        assert_eq!(east.reward, STEP_REWARD);
        assert_eq!(east.probability, 1.0);

        // Moving south from the free cell enters the goal.
        let south = &mdp.transitions[1][Action::South.index()][0];
        assert_eq!(south.next, 3);
        assert_eq!(south.reward, GOAL_REWARD);

        // Bumping the north wall is a penalized self-transition.
        let north = &mdp.transitions[0][Action::North.index()][0];
        assert_eq!(north.next, 0);
        assert_eq!(north.reward, BLOCKED_REWARD);
    }

    #[test]
    fn encoding_is_deterministic() {
        let grid = Grid::parse(BOXED).unwrap();
        let (first, _) = encode(&grid);
        let (second, _) = encode(&grid);
        assert_eq!(first.to_text(), second.to_text());
    }

    #[test]
    fn nearest_goal_becomes_the_sole_terminal() {
        // Two goals; (0, 2) is two steps from the start, (2, 2) is four.
        let grid = Grid::parse("2 0 3\n0 1 0\n0 0 3\n").unwrap();
        let (mdp, map) = encode(&grid);
        let terminal = mdp.terminals[0];
        assert_eq!(map.coord_of(terminal), (0, 2));
        // The farther goal keeps ordinary outgoing transitions.
        let other = map.state_at(2, 2).unwrap();
        assert!(mdp.transitions[other].iter().any(|list| !list.is_empty()));
        // Stepping onto the far goal is an ordinary step, not a terminal one.
        let west_of_far = map.state_at(2, 1).unwrap();
        let east = &mdp.transitions[west_of_far][Action::East.index()][0];
        assert_eq!(east.next, other);
        assert_eq!(east.reward, STEP_REWARD);
    }

    #[test]
    fn manhattan_ties_break_by_enumeration_order() {
        // Both goals are two steps away; the row-major first one wins.
        let grid = Grid::parse("0 3 0\n3 2 0\n").unwrap();
        let (mdp, map) = encode(&grid);
        assert_eq!(map.coord_of(mdp.terminals[0]), (0, 1));
    }
}
