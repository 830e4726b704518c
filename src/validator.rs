//! Path replay and optimality reporting.
//!
//! Replays a decoded path against the original grid, independent of the
//! MDP machinery that produced it: every step must stay inside the bounds
//! and on non-wall cells, and the walk must end on a goal cell. An
//! optional known-optimal reference path turns the report into an
//! optimality verdict.

use crate::error::{Error, Result};
use crate::grid::{Cell, Grid};
use crate::mdp::Action;

/// Path length compared against the known-optimal reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimality {
    /// Same length as the reference.
    Optimal,
    /// Valid but longer than the reference.
    Longer { by: usize },
    /// Shorter than the reference: anomalous, since it implies the
    /// reference was not optimal after all. Flagged, never a silent pass.
    Shorter { by: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    /// Number of moves in the path.
    pub steps: usize,
    /// Final coordinate of the walk.
    pub end: (usize, usize),
    /// Verdict against the reference, when one was supplied.
    pub optimality: Option<Optimality>,
}

/// Replays every token of `path` from the grid's start cell. Each move
/// must land in bounds and off walls, including moves after a goal cell
/// has been visited; the final position must be a goal cell.
pub fn validate(path: &[Action], grid: &Grid, reference: Option<&[Action]>) -> Result<Validation> {
    let (mut row, mut col) = {
        let (r, c) = grid.start();
        (r as i64, c as i64)
    };
    for (step, action) in path.iter().enumerate() {
        let (dr, dc) = action.delta();
        row += dr;
        col += dc;
        match grid.cell(row, col) {
            None | Some(Cell::Wall) => return Err(Error::IllegalMove { row, col, step }),
            Some(_) => {}
        }
    }
    if grid.cell(row, col) != Some(Cell::Goal) {
        return Err(Error::GoalNotReached {
            row: row as usize,
            col: col as usize,
        });
    }
    let (row, col) = (row as usize, col as usize);
    let steps = path.len();

    let optimality = reference.map(|reference| {
        if steps == reference.len() {
            Optimality::Optimal
        } else if steps > reference.len() {
            Optimality::Longer {
                by: steps - reference.len(),
            }
        } else {
            Optimality::Shorter {
                by: reference.len() - steps,
            }
        }
    });

    Ok(Validation {
        steps,
        end: (row, col),
        optimality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::parse_path;

    const BOXED: &str = "1 1 1 1\n1 2 0 1\n1 0 3 1\n1 1 1 1\n";

    fn boxed_grid() -> Grid {
        Grid::parse(BOXED).unwrap()
    }

    #[test]
    fn accepts_both_shortest_paths() {
        let grid = boxed_grid();
        let reference = parse_path("E S").unwrap();
        for tokens in ["E S", "S E"] {
            let path = parse_path(tokens).unwrap();
            let validation = validate(&path, &grid, Some(&reference)).unwrap();
            assert_eq!(validation.steps, 2);
            assert_eq!(validation.end, (2, 2));
            assert_eq!(validation.optimality, Some(Optimality::Optimal));
        }
    }

    #[test]
    fn flags_longer_paths_as_suboptimal() {
        let grid = boxed_grid();
        let reference = parse_path("E S").unwrap();
        // Valid but wasteful: east, back west, then the short way.
        let path = parse_path("E W E S").unwrap();
        let validation = validate(&path, &grid, Some(&reference)).unwrap();
        assert_eq!(validation.steps, 4);
        assert_eq!(validation.optimality, Some(Optimality::Longer { by: 2 }));
    }

    #[test]
    fn flags_shorter_paths_as_anomalous() {
        let grid = boxed_grid();
        let reference = parse_path("E W E S").unwrap();
        let path = parse_path("E S").unwrap();
        let validation = validate(&path, &grid, Some(&reference)).unwrap();
        assert_eq!(validation.optimality, Some(Optimality::Shorter { by: 2 }));
    }

    #[test]
    fn rejects_steps_into_walls_and_bounds() {
        let grid = boxed_grid();
        for tokens in ["N", "W", "E E", "S S"] {
            let path = parse_path(tokens).unwrap();
            let err = validate(&path, &grid, None).unwrap_err();
            assert!(matches!(err, Error::IllegalMove { .. }), "{tokens}");
        }
    }

    #[test]
    fn rejects_paths_that_stop_short_of_the_goal() {
        let grid = boxed_grid();
        let path = parse_path("E").unwrap();
        let err = validate(&path, &grid, None).unwrap_err();
        assert!(matches!(err, Error::GoalNotReached { row: 1, col: 2 }));
    }

    #[test]
    fn rejects_wall_hits_after_a_goal_visit() {
        let grid = boxed_grid();
        // Reaches the goal at step 1, then walks west into the wall at
        // (2, 0); passing through a goal does not end the replay.
        let path = parse_path("E S W W").unwrap();
        let err = validate(&path, &grid, None).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalMove {
                row: 2,
                col: 0,
                step: 3
            }
        ));
    }

    #[test]
    fn rejects_paths_that_leave_the_goal_again() {
        let grid = boxed_grid();
        // Visits the goal mid-path but ends on a free cell.
        let path = parse_path("E S W").unwrap();
        let err = validate(&path, &grid, None).unwrap_err();
        assert!(matches!(err, Error::GoalNotReached { row: 2, col: 1 }));
    }

    #[test]
    fn counts_every_move_when_the_goal_is_revisited() {
        let grid = boxed_grid();
        let reference = parse_path("E S").unwrap();
        // Goal, detour west, goal again: all four moves count.
        let path = parse_path("E S W E").unwrap();
        let validation = validate(&path, &grid, Some(&reference)).unwrap();
        assert_eq!(validation.steps, 4);
        assert_eq!(validation.end, (2, 2));
        assert_eq!(validation.optimality, Some(Optimality::Longer { by: 2 }));
    }

    #[test]
    fn works_without_a_reference() {
        let grid = boxed_grid();
        let path = parse_path("S E").unwrap();
        let validation = validate(&path, &grid, None).unwrap();
        assert_eq!(validation.optimality, None);
    }
}
