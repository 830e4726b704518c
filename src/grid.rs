//! Maze grid loading and representation.
//!
//! A grid file is a rectangular matrix of whitespace-separated cell codes:
//! `0` free, `1` wall, `2` start (exactly one), `3` goal (at least one).
//! The grid is read once and immutable thereafter; rendering works on a
//! derived annotated copy, never on the grid itself.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::mdp::Action;

/// Cell code painted over traversed cells in the renderer-facing overlay.
const PATH_MARK: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Free,
    Wall,
    Start,
    Goal,
}

impl Cell {
    fn from_code(code: i64) -> Option<Cell> {
        match code {
            0 => Some(Cell::Free),
            1 => Some(Cell::Wall),
            2 => Some(Cell::Start),
            3 => Some(Cell::Goal),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Cell::Free => 0,
            Cell::Wall => 1,
            Cell::Start => 2,
            Cell::Goal => 3,
        }
    }
}

/// An immutable rectangular maze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    start: (usize, usize),
    goals: Vec<(usize, usize)>,
}

impl Grid {
    /// Reads a grid from a whitespace-separated integer matrix file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Grid> {
        let text = fs::read_to_string(path)?;
        Grid::parse(&text)
    }

    /// Parses a grid from text. Blank lines are skipped; everything else
    /// must be integers in `{0, 1, 2, 3}` forming equal-length rows with
    /// exactly one start and at least one goal.
    pub fn parse(text: &str) -> Result<Grid> {
        let mut cells: Vec<Vec<Cell>> = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                let code: i64 = token.parse().map_err(|_| {
                    Error::MalformedGrid(format!("line {line_no}: `{token}` is not an integer"))
                })?;
                let cell = Cell::from_code(code).ok_or_else(|| {
                    Error::MalformedGrid(format!("line {line_no}: cell code {code} not in 0..=3"))
                })?;
                row.push(cell);
            }
            cells.push(row);
        }
        if cells.is_empty() {
            return Err(Error::MalformedGrid("grid is empty".into()));
        }
        let cols = cells[0].len();
        if cells.iter().any(|row| row.len() != cols) {
            return Err(Error::MalformedGrid("rows have unequal length".into()));
        }

        let mut starts = Vec::new();
        let mut goals = Vec::new();
        for (r, row) in cells.iter().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                match cell {
                    Cell::Start => starts.push((r, c)),
                    Cell::Goal => goals.push((r, c)),
                    _ => {}
                }
            }
        }
        let start = match starts.as_slice() {
            [one] => *one,
            [] => return Err(Error::MalformedGrid("grid has no start cell".into())),
            _ => {
                return Err(Error::MalformedGrid(format!(
                    "grid has {} start cells, expected exactly one",
                    starts.len()
                )))
            }
        };
        if goals.is_empty() {
            return Err(Error::MalformedGrid("grid has no goal cell".into()));
        }

        Ok(Grid {
            cells,
            start,
            goals,
        })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    /// Cell at a signed coordinate; `None` when out of bounds.
    pub fn cell(&self, row: i64, col: i64) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.cells
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
    }

    /// Whether the coordinate is inside the grid and not a wall.
    pub fn is_open(&self, row: i64, col: i64) -> bool {
        matches!(self.cell(row, col), Some(cell) if cell != Cell::Wall)
    }

    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    /// Goal coordinates in row-major discovery order.
    pub fn goals(&self) -> &[(usize, usize)] {
        &self.goals
    }

    /// Renderer-facing view: the raw cell codes with the traversed cells of
    /// `path` repainted as `7` (goal cells keep their code). Returns a new
    /// matrix; the grid itself is never mutated. The path is replayed from
    /// the start cell and must stay on open cells.
    pub fn overlay_path(&self, path: &[Action]) -> Result<Vec<Vec<u8>>> {
        let mut codes: Vec<Vec<u8>> = self
            .cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect();

        let (mut row, mut col) = (self.start.0 as i64, self.start.1 as i64);
        for (step, action) in path.iter().enumerate() {
            let (dr, dc) = action.delta();
            row += dr;
            col += dc;
            match self.cell(row, col) {
                Some(Cell::Goal) => {}
                Some(cell) if cell != Cell::Wall => {
                    codes[row as usize][col as usize] = PATH_MARK;
                }
                _ => return Err(Error::IllegalMove { row, col, step }),
            }
        }
        Ok(codes)
    }
}
