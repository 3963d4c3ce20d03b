//! Iteration records and the optimality cuts derived from them.

use serde::Serialize;

/// What the subproblem reported for one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubproblemOutcome {
    Optimal { objective: f64 },
    Infeasible,
}

impl SubproblemOutcome {
    pub fn objective(&self) -> Option<f64> {
        match self {
            SubproblemOutcome::Optimal { objective } => Some(*objective),
            SubproblemOutcome::Infeasible => None,
        }
    }
}

/// Everything one pass contributes to the cut set. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    /// 1-based
    pub iteration: usize,
    pub pattern: Vec<bool>,
    pub outcome: SubproblemOutcome,
    /// Flow-limit duals, one per arc (all zero for infeasible passes)
    pub duals: Vec<f64>,
}

/// `θ >= constant + Σ_a coefficients[a] · open[a]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BendersCut {
    /// Record this cut was generated from
    pub iteration: usize,
    pub constant: f64,
    pub coefficients: Vec<f64>,
    /// Placeholder for an infeasible pass; adds no master row
    pub vacuous: bool,
}

impl BendersCut {
    pub fn vacuous(iteration: usize, num_arcs: usize) -> Self {
        Self {
            iteration,
            constant: 0.0,
            coefficients: vec![0.0; num_arcs],
            vacuous: true,
        }
    }

    /// Right-hand side of the cut at `open`.
    pub fn evaluate(&self, open: &[bool]) -> f64 {
        self.constant
            + self
                .coefficients
                .iter()
                .zip(open)
                .filter(|(_, is_open)| **is_open)
                .map(|(coeff, _)| coeff)
                .sum::<f64>()
    }
}

/// Turn one record into its cut.
///
/// `θ >= Z2 − Σ_a π_a·M_a·(ȳ_a − y_a)`, rearranged into affine form with
/// `coefficient_a = π_a·M_a` and `constant = Z2 − Σ_a coefficient_a·ȳ_a`.
pub fn generate_cut(record: &IterationRecord, flow_limits: &[f64]) -> BendersCut {
    let objective = match record.outcome {
        SubproblemOutcome::Optimal { objective } => objective,
        SubproblemOutcome::Infeasible => {
            return BendersCut::vacuous(record.iteration, flow_limits.len())
        }
    };

    debug_assert_eq!(
        record.duals.len(),
        flow_limits.len(),
        "one flow-limit dual per arc"
    );

    let coefficients: Vec<f64> = flow_limits
        .iter()
        .enumerate()
        .map(|(a, limit)| record.duals.get(a).copied().unwrap_or(0.0) * limit)
        .collect();
    let constant = objective
        - coefficients
            .iter()
            .zip(&record.pattern)
            .filter(|(_, open)| **open)
            .map(|(coeff, _)| coeff)
            .sum::<f64>();

    BendersCut {
        iteration: record.iteration,
        constant,
        coefficients,
        vacuous: false,
    }
}

/// Append-only store of records and their cuts, one of each per pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CutStore {
    records: Vec<IterationRecord>,
    cuts: Vec<BendersCut>,
}

impl CutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pass and generate its cut. The iteration number is assigned
    /// here, so records stay densely numbered from 1.
    pub fn push(
        &mut self,
        pattern: Vec<bool>,
        outcome: SubproblemOutcome,
        duals: Vec<f64>,
        flow_limits: &[f64],
    ) -> &BendersCut {
        let record = IterationRecord {
            iteration: self.records.len() + 1,
            pattern,
            outcome,
            duals,
        };
        let cut = generate_cut(&record, flow_limits);
        self.records.push(record);
        self.cuts.push(cut);
        &self.cuts[self.cuts.len() - 1]
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn cuts(&self) -> &[BendersCut] {
        &self.cuts
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Cuts that contribute a master row.
    pub fn active_cuts(&self) -> impl Iterator<Item = &BendersCut> {
        self.cuts.iter().filter(|cut| !cut.vacuous)
    }

    pub fn infeasible_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == SubproblemOutcome::Infeasible)
            .count()
    }
}
