//! Benders run results.

use serde::{Deserialize, Serialize};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Relative gap reached the tolerance
    Converged,
    /// Iteration budget spent first
    Exhausted,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bounds closer than this (relative to `max(1, |upper|)`) count as equal.
pub const BOUND_EPS: f64 = 1e-9;

/// Lower and upper bound on the optimal total cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }
}

impl Bounds {
    /// `|1 − lower/upper|`.
    ///
    /// Zero when the bounds coincide (to within [`BOUND_EPS`], scaled by
    /// `max(1, |upper|)`), infinite when the ratio is undefined: an infinite
    /// bound, or a zero upper bound with a different lower one.
    pub fn gap(&self) -> f64 {
        if self.lower.is_finite()
            && self.upper.is_finite()
            && (self.upper - self.lower).abs() <= BOUND_EPS * self.upper.abs().max(1.0)
        {
            return 0.0;
        }
        if !self.lower.is_finite() || !self.upper.is_finite() || self.upper == 0.0 {
            return f64::INFINITY;
        }
        (1.0 - self.lower / self.upper).abs()
    }

    pub fn is_converged(&self, tolerance: f64) -> bool {
        self.gap() <= tolerance
    }
}

/// One line of the iteration report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationLog {
    pub iteration: usize,
    /// Master objective (Z1)
    pub master_objective: f64,
    /// Subproblem objective (Z2); `None` when the subproblem was infeasible
    pub subproblem_objective: Option<f64>,
    pub theta: f64,
    pub lower: f64,
    pub upper: f64,
    pub gap: f64,
    pub feasible: bool,
    pub open_arcs: usize,
    pub pattern: Vec<bool>,
}

/// The design behind the current upper bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestDesign {
    /// Pass that produced it
    pub iteration: usize,
    pub pattern: Vec<bool>,
    /// `origin->destination` labels of the open arcs
    pub open_arcs: Vec<String>,
    /// Flow per arc
    pub flows: Vec<f64>,
    /// Unmet demand per destination
    pub unmet_demand: Vec<f64>,
    pub fixed_cost: f64,
    pub transport_cost: f64,
    pub penalty_cost: f64,
    pub total_cost: f64,
}

impl BestDesign {
    pub fn total_unmet(&self) -> f64 {
        self.unmet_demand.iter().sum()
    }

    pub fn total_shipped(&self) -> f64 {
        self.flows.iter().sum()
    }
}

/// Outcome of [`BendersSolver::solve`](super::BendersSolver::solve).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BendersSolution {
    pub termination: Termination,
    /// Completed passes
    pub iterations: usize,
    pub bounds: Bounds,
    pub gap: f64,
    /// Cuts in the cut set, vacuous ones included
    pub cuts: usize,
    pub infeasible_subproblems: usize,
    pub best: Option<BestDesign>,
    pub history: Vec<IterationLog>,
    pub solve_time_ms: u128,
}

impl BendersSolution {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Human-readable report.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Benders Solution Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!(
            "Status: {} after {} iteration(s)\n",
            self.termination, self.iterations
        ));
        s.push_str(&format!("Lower Bound: {:.4}\n", self.bounds.lower));
        s.push_str(&format!("Upper Bound: {:.4}\n", self.bounds.upper));
        if self.gap.is_finite() {
            s.push_str(&format!("Gap: {:.6}%\n", self.gap * 100.0));
        } else {
            s.push_str("Gap: undefined\n");
        }
        s.push_str(&format!("Cuts: {}\n", self.cuts));
        if self.infeasible_subproblems > 0 {
            s.push_str(&format!(
                "Infeasible subproblems: {}\n",
                self.infeasible_subproblems
            ));
        }
        s.push_str(&format!("Solve Time: {} ms\n", self.solve_time_ms));

        if let Some(best) = &self.best {
            s.push_str(&format!("\nBest Design (iteration {}):\n", best.iteration));
            s.push_str(&format!("  Fixed cost:     {:.4}\n", best.fixed_cost));
            s.push_str(&format!("  Transport cost: {:.4}\n", best.transport_cost));
            s.push_str(&format!("  Penalty cost:   {:.4}\n", best.penalty_cost));
            s.push_str(&format!("  Total cost:     {:.4}\n", best.total_cost));
            let open_flows = best
                .pattern
                .iter()
                .zip(&best.flows)
                .filter(|(open, _)| **open)
                .map(|(_, flow)| flow);
            for (label, flow) in best.open_arcs.iter().zip(open_flows) {
                s.push_str(&format!("  [OPEN] {label}: {flow:.4}\n"));
            }
            if best.total_unmet() > 0.0 {
                s.push_str(&format!("  Unmet demand: {:.4}\n", best.total_unmet()));
            }
        }
        s
    }
}
