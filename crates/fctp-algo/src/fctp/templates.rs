//! Master and subproblem model construction.
//!
//! Both builders are pure: the model of any pass can be rebuilt from the
//! instance, the cut list and the pattern alone.

use fctp_core::Instance;

use super::cuts::BendersCut;
use crate::lp::{LinearModel, RowId, Sense, VarId};

/// Master model plus the handles needed to read its solution.
#[derive(Debug, Clone)]
pub struct MasterModel {
    pub model: LinearModel,
    /// One open indicator per arc
    pub open: Vec<VarId>,
    pub theta: VarId,
    /// One row per non-vacuous cut, in cut order
    pub cut_rows: Vec<RowId>,
}

/// Subproblem model plus row/column handles.
#[derive(Debug, Clone)]
pub struct SubproblemModel {
    pub model: LinearModel,
    /// One flow per arc
    pub flows: Vec<VarId>,
    /// One unmet-demand slack per destination
    pub slacks: Vec<VarId>,
    pub capacity_rows: Vec<RowId>,
    pub demand_rows: Vec<RowId>,
    /// `x_a <= M_a · pattern_a`, one per arc
    pub flow_limit_rows: Vec<RowId>,
}

/// Build the master problem.
///
/// θ is fixed at zero when `theta_pinned`, free otherwise. Vacuous cuts add
/// no row.
pub fn build_master(instance: &Instance, cuts: &[BendersCut], theta_pinned: bool) -> MasterModel {
    let mut model = LinearModel::new("fctp_master");

    let open: Vec<VarId> = instance
        .arcs()
        .iter()
        .map(|arc| {
            let var = model.add_binary(format!("open[{}]", instance.arc_label(arc)));
            model.set_objective(var, arc.fixed_cost);
            var
        })
        .collect();

    let theta = if theta_pinned {
        model.add_continuous("theta", 0.0, 0.0)
    } else {
        model.add_continuous("theta", f64::NEG_INFINITY, f64::INFINITY)
    };
    model.set_objective(theta, 1.0);

    // θ - Σ coeff_a·open_a >= constant
    let mut cut_rows = Vec::new();
    for cut in cuts.iter().filter(|cut| !cut.vacuous) {
        let mut terms = Vec::with_capacity(open.len() + 1);
        terms.push((theta, 1.0));
        for (var, coeff) in open.iter().zip(&cut.coefficients) {
            if *coeff != 0.0 {
                terms.push((*var, -coeff));
            }
        }
        let row = model.add_constraint(
            format!("cut[{}]", cut.iteration),
            terms,
            Sense::Ge,
            cut.constant,
        );
        cut_rows.push(row);
    }

    MasterModel {
        model,
        open,
        theta,
        cut_rows,
    }
}

/// Build the subproblem for a frozen open pattern.
///
/// Arcs beyond `pattern.len()` count as closed. Every slack is priced at
/// `penalty`, which keeps the model feasible for any pattern.
pub fn build_subproblem(instance: &Instance, pattern: &[bool], penalty: f64) -> SubproblemModel {
    let mut model = LinearModel::new("fctp_subproblem");
    let (flows, slacks) = add_flow_columns(&mut model, instance, penalty);
    let (capacity_rows, demand_rows) = add_balance_rows(&mut model, instance, &flows, &slacks);

    let flow_limit_rows = instance
        .arcs()
        .iter()
        .zip(&flows)
        .map(|(arc, flow)| {
            let is_open = pattern.get(arc.id.value()).copied().unwrap_or(false);
            let limit = if is_open { instance.flow_limit(arc) } else { 0.0 };
            model.add_constraint(
                format!("limit[{}]", instance.arc_label(arc)),
                vec![(*flow, 1.0)],
                Sense::Le,
                limit,
            )
        })
        .collect();

    SubproblemModel {
        model,
        flows,
        slacks,
        capacity_rows,
        demand_rows,
        flow_limit_rows,
    }
}

/// Flow columns (priced at unit cost) and slack columns (priced at `penalty`).
pub(crate) fn add_flow_columns(
    model: &mut LinearModel,
    instance: &Instance,
    penalty: f64,
) -> (Vec<VarId>, Vec<VarId>) {
    let flows = instance
        .arcs()
        .iter()
        .map(|arc| {
            let var = model.add_continuous(
                format!("flow[{}]", instance.arc_label(arc)),
                0.0,
                f64::INFINITY,
            );
            model.set_objective(var, arc.unit_cost);
            var
        })
        .collect();

    let slacks = instance
        .destinations()
        .iter()
        .map(|dest| {
            let var = model.add_continuous(format!("unmet[{}]", dest.id), 0.0, f64::INFINITY);
            model.set_objective(var, penalty);
            var
        })
        .collect();

    (flows, slacks)
}

/// Origin capacity rows and destination demand rows.
pub(crate) fn add_balance_rows(
    model: &mut LinearModel,
    instance: &Instance,
    flows: &[VarId],
    slacks: &[VarId],
) -> (Vec<RowId>, Vec<RowId>) {
    let capacity_rows = instance
        .origins()
        .iter()
        .enumerate()
        .map(|(i, origin)| {
            let terms = instance
                .arcs_from(i)
                .map(|arc| (flows[arc.id.value()], 1.0))
                .collect();
            model.add_constraint(
                format!("capacity[{}]", origin.id),
                terms,
                Sense::Le,
                origin.capacity,
            )
        })
        .collect();

    let demand_rows = instance
        .destinations()
        .iter()
        .enumerate()
        .map(|(j, dest)| {
            let mut terms: Vec<(VarId, f64)> = instance
                .arcs_to(j)
                .map(|arc| (flows[arc.id.value()], 1.0))
                .collect();
            terms.push((slacks[j], 1.0));
            model.add_constraint(format!("demand[{}]", dest.id), terms, Sense::Ge, dest.demand)
        })
        .collect();

    (capacity_rows, demand_rows)
}
