pub mod decoder;
pub mod encoder;
pub mod error;
pub mod generator;
pub mod grid;
pub mod mdp;
pub mod pipeline;
pub mod solver;
pub mod validator;

pub use decoder::decode;
pub use encoder::{encode, StateMap};
pub use error::{Error, Result};
pub use grid::{Cell, Grid};
pub use mdp::{format_path, parse_path, Action, Mdp, Transition};
pub use pipeline::{plan, plan_file, run_batch, BatchInstance, InstanceReport, Plan};
pub use solver::{solve, Algorithm, Solution, SolveWarning};
pub use validator::{validate, Optimality, Validation};
