use std::env;
use std::process;

use mazeplan::{format_path, plan, Algorithm, Grid, Result, SolveWarning};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: mazeplan <grid-file> [vi|pi|lp]");
        process::exit(2);
    }
    let algorithm = match args.get(2).map(String::as_str).unwrap_or("pi").parse::<Algorithm>() {
        Ok(algorithm) => algorithm,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };
    if let Err(err) = run(&args[1], algorithm) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(grid_file: &str, algorithm: Algorithm) -> Result<()> {
    let grid = Grid::load(grid_file)?;
    let plan = plan(&grid, algorithm)?;

    for warning in &plan.solution.warnings {
        match warning {
            SolveWarning::LpNonOptimal { iterations } => {
                eprintln!("warning: LP not proven optimal after {iterations} pivots");
            }
        }
    }

    for (value, action) in plan.solution.values.iter().zip(&plan.solution.policy) {
        println!("{value:.6}\t{action}");
    }
    println!("{}", format_path(&plan.path));

    for row in grid.overlay_path(&plan.path)? {
        let cells: Vec<String> = row.iter().map(|code| code.to_string()).collect();
        println!("{}", cells.join(" "));
    }
    Ok(())
}
