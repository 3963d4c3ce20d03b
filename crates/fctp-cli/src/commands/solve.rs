//! `fctp solve`

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use fctp_algo::fctp::{solve_extensive, BendersConfig, BendersSolution, BendersSolver};
use fctp_algo::MicroLpBackend;
use fctp_cli::cli::OutputFormat;
use fctp_core::Instance;
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::{info, warn};

use super::load_run;

/// Command-line values that replace the configuration file's.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    pub penalty: Option<f64>,
}

/// Relative difference allowed between the Benders upper bound and the
/// extensive-form optimum when `--verify` is given.
const VERIFY_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Serialize)]
struct SolveOutput<'a> {
    config: &'a BendersConfig,
    origins: usize,
    destinations: usize,
    arcs: usize,
    solution: &'a BendersSolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    extensive_objective: Option<f64>,
}

pub fn handle(
    config_path: &Path,
    out: Option<&Path>,
    overrides: Overrides,
    verify: bool,
    format: OutputFormat,
) -> Result<()> {
    let (run, instance) = load_run(config_path)?;

    let mut config = BendersConfig {
        max_iterations: run.max_iterations,
        tolerance: run.tolerance,
        penalty_cost: run.penalty_cost,
    };
    if let Some(max_iterations) = overrides.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(tolerance) = overrides.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(penalty) = overrides.penalty {
        config.penalty_cost = penalty;
        if instance.max_unit_cost() >= penalty {
            warn!(
                max_unit_cost = instance.max_unit_cost(),
                penalty, "unit cost reaches the unmet-demand penalty"
            );
        }
    }

    info!(
        origins = instance.num_origins(),
        destinations = instance.num_destinations(),
        arcs = instance.num_arcs(),
        "solving {}",
        config_path.display()
    );

    let solution = BendersSolver::with_config(config.clone())
        .solve(&instance)
        .context("running Benders decomposition")?;

    let extensive_objective = if verify {
        Some(verify_against_extensive(&instance, &config, &solution)?)
    } else {
        None
    };

    let output = SolveOutput {
        config: &config,
        origins: instance.num_origins(),
        destinations: instance.num_destinations(),
        arcs: instance.num_arcs(),
        solution: &solution,
        extensive_objective,
    };

    match format {
        OutputFormat::Table => {
            print_iteration_table(&solution)?;
            println!();
            print!("{}", solution.summary());
            if let Some(objective) = extensive_objective {
                println!("Extensive-form optimum: {objective:.4}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output).context("serializing solution")?;
            println!("{json}");
        }
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&output).context("serializing solution")?;
        let mut file = File::create(path)
            .with_context(|| format!("creating output file '{}'", path.display()))?;
        file.write_all(json.as_bytes()).context("writing output")?;
        info!("solution written to {}", path.display());
    }

    Ok(())
}

fn verify_against_extensive(
    instance: &Instance,
    config: &BendersConfig,
    solution: &BendersSolution,
) -> Result<f64> {
    let exact = solve_extensive(instance, config.penalty_cost, &MicroLpBackend)
        .context("solving extensive form")?;
    let upper = solution.bounds.upper;
    let scale = exact.objective.abs().max(1.0);

    if upper < exact.objective - VERIFY_TOLERANCE * scale {
        bail!(
            "Benders upper bound {upper} is below the extensive-form optimum {}",
            exact.objective
        );
    }
    if solution.converged() && (upper - exact.objective).abs() > VERIFY_TOLERANCE * scale {
        bail!(
            "converged upper bound {upper} differs from the extensive-form optimum {}",
            exact.objective
        );
    }
    if !solution.converged() {
        warn!(
            upper,
            optimum = exact.objective,
            "run did not converge; upper bound is only an estimate"
        );
    }
    Ok(exact.objective)
}

fn print_iteration_table(solution: &BendersSolution) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "ITER\tMASTER\tSUBPROBLEM\tTHETA\tLOWER\tUPPER\tGAP\tOPEN")?;
    for log in &solution.history {
        let subproblem = log
            .subproblem_objective
            .map(|z| format!("{z:.4}"))
            .unwrap_or_else(|| "infeasible".to_string());
        let gap = if log.gap.is_finite() {
            format!("{:.2e}", log.gap)
        } else {
            "-".to_string()
        };
        writeln!(
            writer,
            "{}\t{:.4}\t{}\t{:.4}\t{:.4}\t{:.4}\t{}\t{}",
            log.iteration,
            log.master_objective,
            subproblem,
            log.theta,
            log.lower,
            log.upper,
            gap,
            log.open_arcs
        )?;
    }
    writer.flush()?;
    Ok(())
}
