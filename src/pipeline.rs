//! Whole-grid planning and batch validation.
//!
//! Each grid file is an independent instance: it owns its MDP, value
//! vector, policy and path, so a batch can fan out across a thread pool
//! with no shared mutable state. A failing instance reports a typed error
//! and never disturbs the others.

use std::path::{Path, PathBuf};

use log::warn;
use rayon::prelude::*;

use crate::decoder::decode;
use crate::encoder::{encode, StateMap};
use crate::error::Result;
use crate::grid::Grid;
use crate::mdp::{Action, Mdp};
use crate::solver::{solve, Algorithm, Solution};
use crate::validator::{validate, Validation};

/// Everything one planning run produces.
#[derive(Debug)]
pub struct Plan {
    pub mdp: Mdp,
    pub map: StateMap,
    pub solution: Solution,
    pub path: Vec<Action>,
}

/// Encode, solve, and decode one grid.
pub fn plan(grid: &Grid, algorithm: Algorithm) -> Result<Plan> {
    let (mdp, map) = encode(grid);
    let solution = solve(&mdp, algorithm)?;
    let terminal = mdp.terminals[0];
    let path = decode(&map, &solution.policy, mdp.start, terminal)?;
    Ok(Plan {
        mdp,
        map,
        solution,
        path,
    })
}

/// Load a grid file and plan a path through it.
pub fn plan_file<P: AsRef<Path>>(path: P, algorithm: Algorithm) -> Result<Plan> {
    let grid = Grid::load(path)?;
    plan(&grid, algorithm)
}

/// One grid file to plan and verify, with an optional known-optimal
/// reference path.
#[derive(Debug, Clone)]
pub struct BatchInstance {
    pub grid_file: PathBuf,
    pub reference: Option<Vec<Action>>,
}

/// Per-instance outcome of a batch run.
#[derive(Debug)]
pub struct InstanceReport {
    pub grid_file: PathBuf,
    pub outcome: Result<Validation>,
}

impl InstanceReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Plans and validates every instance, in parallel across the batch. A
/// failure aborts only its own instance; the report always covers the
/// whole batch in input order.
pub fn run_batch(instances: &[BatchInstance], algorithm: Algorithm) -> Vec<InstanceReport> {
    instances
        .par_iter()
        .map(|instance| {
            let outcome = run_instance(instance, algorithm);
            if let Err(err) = &outcome {
                warn!("{}: {err}", instance.grid_file.display());
            }
            InstanceReport {
                grid_file: instance.grid_file.clone(),
                outcome,
            }
        })
        .collect()
}

fn run_instance(instance: &BatchInstance, algorithm: Algorithm) -> Result<Validation> {
    let grid = Grid::load(&instance.grid_file)?;
    let plan = plan(&grid, algorithm)?;
    validate(&plan.path, &grid, instance.reference.as_deref())
}
