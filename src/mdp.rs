//! Markov decision process description shared by the encoder and the
//! solvers: the four grid actions, the dense transition model, and the
//! line-oriented text format used to persist encoded MDPs.

use std::fmt;
use std::fmt::Write as _;

use crate::error::{Error, Result};

/// Number of actions in a grid MDP, one per compass direction.
pub const NUM_ACTIONS: usize = 4;

/// A compass move. The index order (N=0, S=1, E=2, W=3) is part of the
/// encoded MDP format and must match the encoder's neighbor enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    North,
    South,
    East,
    West,
}

impl Action {
    pub const ALL: [Action; NUM_ACTIONS] =
        [Action::North, Action::South, Action::East, Action::West];

    pub fn index(self) -> usize {
        match self {
            Action::North => 0,
            Action::South => 1,
            Action::East => 2,
            Action::West => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Action::ALL.get(index).copied()
    }

    /// Signed (row, column) displacement of one step.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Action::North => (-1, 0),
            Action::South => (1, 0),
            Action::East => (0, 1),
            Action::West => (0, -1),
        }
    }

    pub fn token(self) -> char {
        match self {
            Action::North => 'N',
            Action::South => 'S',
            Action::East => 'E',
            Action::West => 'W',
        }
    }

    pub fn from_token(token: &str) -> Option<Action> {
        match token {
            "N" => Some(Action::North),
            "S" => Some(Action::South),
            "E" => Some(Action::East),
            "W" => Some(Action::West),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Renders a path as the single-line whitespace-separated token form
/// consumed by external renderers and reference-solution files.
pub fn format_path(path: &[Action]) -> String {
    let tokens: Vec<String> = path.iter().map(|a| a.token().to_string()).collect();
    tokens.join(" ")
}

/// Parses a whitespace-separated sequence of direction tokens.
pub fn parse_path(text: &str) -> Result<Vec<Action>> {
    text.split_whitespace()
        .map(|tok| {
            Action::from_token(tok)
                .ok_or_else(|| Error::Precondition(format!("`{tok}` is not a direction token")))
        })
        .collect()
}

/// One outcome of taking an action in a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next: usize,
    pub reward: f64,
    pub probability: f64,
}

/// An explicit MDP over dense state indices.
///
/// `transitions[s][a]` lists the outcomes of action `a` in state `s`;
/// probabilities of each non-empty list sum to 1.0. Terminal states carry
/// empty lists, which pins their value at zero in every solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Mdp {
    pub num_states: usize,
    pub num_actions: usize,
    pub start: usize,
    pub terminals: Vec<usize>,
    pub transitions: Vec<Vec<Vec<Transition>>>,
    pub discount: f64,
    pub episodic: bool,
}

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-8;

impl Mdp {
    pub fn is_terminal(&self, state: usize) -> bool {
        self.terminals.contains(&state)
    }

    /// Verifies the solver preconditions. Violations are fatal for the
    /// instance: they mean the MDP was not produced by a correct encoder.
    pub fn check(&self) -> Result<()> {
        if self.num_states == 0 {
            return Err(Error::Precondition("MDP has zero states".into()));
        }
        if self.num_actions == 0 {
            return Err(Error::Precondition("MDP has zero actions".into()));
        }
        if self.start >= self.num_states {
            return Err(Error::Precondition(format!(
                "start state {} is outside [0, {})",
                self.start, self.num_states
            )));
        }
        for &t in &self.terminals {
            if t >= self.num_states {
                return Err(Error::Precondition(format!(
                    "terminal state {} is outside [0, {})",
                    t, self.num_states
                )));
            }
        }
        if !(self.discount > 0.0 && self.discount < 1.0) {
            return Err(Error::Precondition(format!(
                "discount {} is outside (0, 1)",
                self.discount
            )));
        }
        if self.transitions.len() != self.num_states {
            return Err(Error::Precondition(format!(
                "transition table has {} states, expected {}",
                self.transitions.len(),
                self.num_states
            )));
        }
        for (s, per_action) in self.transitions.iter().enumerate() {
            if per_action.len() != self.num_actions {
                return Err(Error::Precondition(format!(
                    "state {} has {} action lists, expected {}",
                    s,
                    per_action.len(),
                    self.num_actions
                )));
            }
            for (a, list) in per_action.iter().enumerate() {
                if list.is_empty() {
                    continue;
                }
                for t in list {
                    if t.next >= self.num_states {
                        return Err(Error::Precondition(format!(
                            "transition ({s}, {a}) targets state {} outside [0, {})",
                            t.next, self.num_states
                        )));
                    }
                }
                let sum: f64 = list.iter().map(|t| t.probability).sum();
                if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                    return Err(Error::Precondition(format!(
                        "probabilities of ({s}, {a}) sum to {sum}, expected 1.0"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Serializes to the line-oriented text format:
    /// `numStates` / `numActions` / `start` / `end` / `transition`* /
    /// `mdptype` / `discount`. A continuing MDP writes `end -1`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "numStates {}", self.num_states);
        let _ = writeln!(out, "numActions {}", self.num_actions);
        let _ = writeln!(out, "start {}", self.start);
        if self.terminals.is_empty() {
            let _ = writeln!(out, "end -1");
        } else {
            let ends: Vec<String> = self.terminals.iter().map(|t| t.to_string()).collect();
            let _ = writeln!(out, "end {}", ends.join(" "));
        }
        for (s, per_action) in self.transitions.iter().enumerate() {
            for (a, list) in per_action.iter().enumerate() {
                for t in list {
                    let _ = writeln!(
                        out,
                        "transition {} {} {} {} {}",
                        s, a, t.next, t.reward, t.probability
                    );
                }
            }
        }
        let _ = writeln!(
            out,
            "mdptype {}",
            if self.episodic { "episodic" } else { "continuing" }
        );
        let _ = writeln!(out, "discount {}", self.discount);
        out
    }

    /// Parses the text format written by [`Mdp::to_text`].
    pub fn parse(text: &str) -> Result<Mdp> {
        fn field<T: std::str::FromStr>(tokens: &[&str], pos: usize, line: usize) -> Result<T> {
            tokens
                .get(pos)
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(|| {
                    Error::Precondition(format!("MDP line {line}: missing or bad field {pos}"))
                })
        }

        let mut num_states = None;
        let mut num_actions = None;
        let mut start = None;
        let mut terminals = Vec::new();
        let mut transitions: Vec<Vec<Vec<Transition>>> = Vec::new();
        let mut discount = None;
        let mut episodic = true;

        for (i, line) in text.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(&key) = tokens.first() else {
                continue;
            };
            match key {
                "numStates" => num_states = Some(field::<usize>(&tokens, 1, i)?),
                "numActions" => num_actions = Some(field::<usize>(&tokens, 1, i)?),
                "start" => start = Some(field::<usize>(&tokens, 1, i)?),
                "end" => {
                    for pos in 1..tokens.len() {
                        let t: i64 = field(&tokens, pos, i)?;
                        if t >= 0 {
                            terminals.push(t as usize);
                        }
                    }
                }
                "transition" => {
                    if transitions.is_empty() {
                        let (n, a) = match (num_states, num_actions) {
                            (Some(n), Some(a)) => (n, a),
                            _ => {
                                return Err(Error::Precondition(format!(
                                    "MDP line {i}: transition before numStates/numActions"
                                )))
                            }
                        };
                        transitions = vec![vec![Vec::new(); a]; n];
                    }
                    let s: usize = field(&tokens, 1, i)?;
                    let a: usize = field(&tokens, 2, i)?;
                    let next: usize = field(&tokens, 3, i)?;
                    let reward: f64 = field(&tokens, 4, i)?;
                    let probability: f64 = field(&tokens, 5, i)?;
                    let row = transitions
                        .get_mut(s)
                        .and_then(|per_action| per_action.get_mut(a))
                        .ok_or_else(|| {
                            Error::Precondition(format!(
                                "MDP line {i}: transition ({s}, {a}) out of range"
                            ))
                        })?;
                    row.push(Transition {
                        next,
                        reward,
                        probability,
                    });
                }
                "mdptype" => {
                    episodic = field::<String>(&tokens, 1, i)? == "episodic";
                }
                "discount" => discount = Some(field::<f64>(&tokens, 1, i)?),
                other => {
                    return Err(Error::Precondition(format!(
                        "MDP line {i}: unknown key `{other}`"
                    )))
                }
            }
        }

        let num_states =
            num_states.ok_or_else(|| Error::Precondition("MDP is missing numStates".into()))?;
        let num_actions =
            num_actions.ok_or_else(|| Error::Precondition("MDP is missing numActions".into()))?;
        if transitions.is_empty() {
            transitions = vec![vec![Vec::new(); num_actions]; num_states];
        }
        let mdp = Mdp {
            num_states,
            num_actions,
            start: start.ok_or_else(|| Error::Precondition("MDP is missing start".into()))?,
            terminals,
            transitions,
            discount: discount
                .ok_or_else(|| Error::Precondition("MDP is missing discount".into()))?,
            episodic,
        };
        Ok(mdp)
    }
}
