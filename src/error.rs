use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for the planning pipeline.
///
/// Each variant aborts the grid instance it occurred in; batch processing
/// continues with the remaining instances. A non-optimal LP status is a
/// warning carried on the solution, not an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// The grid file is not a rectangular matrix of cell codes with exactly
    /// one start and at least one goal.
    #[error("malformed grid: {0}")]
    MalformedGrid(String),

    /// A solver or decoder input violates its contract (empty MDP, state
    /// index out of range, policy of the wrong length).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The policy steered the decoder to a coordinate with no state index.
    /// Indicates an inconsistent policy/grid pairing.
    #[error("no state at ({row}, {col}); policy and grid disagree")]
    InvalidTransition { row: i64, col: i64 },

    /// The decoder exhausted its step cap without reaching the terminal
    /// state; the policy cycles.
    #[error("no path to the terminal state within {steps} steps")]
    NoPathFound { steps: usize },

    /// A replayed path left the grid bounds or entered a wall cell.
    #[error("illegal move at step {step}: ({row}, {col}) is out of bounds or a wall")]
    IllegalMove { row: i64, col: i64, step: usize },

    /// A replayed path ran out of moves before reaching a goal cell.
    #[error("path ends at ({row}, {col}) without reaching a goal")]
    GoalNotReached { row: usize, col: usize },

    /// An iteration cap was exceeded. Termination is guaranteed by the
    /// discount contraction, so hitting this means a modeling bug.
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
