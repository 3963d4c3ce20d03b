//! Monolithic FCTP model, solved in one MILP call.
//!
//! Used to cross-check the decomposition on small instances.

use fctp_core::Instance;
use serde::Serialize;
use tracing::info;

use super::benders::{BendersError, Stage};
use super::templates::{add_balance_rows, add_flow_columns};
use crate::lp::{LinearModel, Sense};
use crate::solver::{LpBackend, SolveOptions};

/// Optimum of the extensive form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensiveSolution {
    pub objective: f64,
    pub pattern: Vec<bool>,
    pub flows: Vec<f64>,
    pub unmet_demand: Vec<f64>,
}

/// Solve `min Σ f·y + Σ c·x + penalty·Σ u` over the full model with
/// `x_a <= M_a·y_a` linking flows to open indicators.
pub fn solve_extensive(
    instance: &Instance,
    penalty: f64,
    backend: &dyn LpBackend,
) -> Result<ExtensiveSolution, BendersError> {
    let mut model = LinearModel::new("fctp_extensive");
    let (flows, slacks) = add_flow_columns(&mut model, instance, penalty);
    add_balance_rows(&mut model, instance, &flows, &slacks);

    let open: Vec<_> = instance
        .arcs()
        .iter()
        .zip(&flows)
        .map(|(arc, flow)| {
            let label = instance.arc_label(arc);
            let var = model.add_binary(format!("open[{label}]"));
            model.set_objective(var, arc.fixed_cost);
            model.add_constraint(
                format!("link[{label}]"),
                vec![(*flow, 1.0), (var, -instance.flow_limit(arc))],
                Sense::Le,
                0.0,
            );
            var
        })
        .collect();

    let solution = backend
        .solve(&model, &SolveOptions::default())
        .map_err(|source| BendersError::Solver {
            stage: Stage::Extensive,
            source,
        })?;
    if !solution.status.is_optimal() {
        return Err(BendersError::SolverStatus {
            stage: Stage::Extensive,
            status: solution.status,
        });
    }

    info!(objective = solution.objective, "extensive form solved");
    Ok(ExtensiveSolution {
        objective: solution.objective,
        pattern: open.iter().map(|v| solution.value(*v) > 0.5).collect(),
        flows: flows.iter().map(|v| solution.value(*v)).collect(),
        unmet_demand: slacks.iter().map(|v| solution.value(*v)).collect(),
    })
}
