//! Clarabel interior-point backend for continuous models.
//!
//! Clarabel solves
//!
//! ```text
//!   minimize    q'x
//!   subject to  Ax + s = b,  s ∈ K
//! ```
//!
//! Rows are mapped onto cones as follows:
//!
//! | Row | Stored as | Cone | Shadow price |
//! |-----|-----------|------|--------------|
//! | `a'x <= b` | `a'x + s = b` | nonnegative | `-z` |
//! | `a'x >= b` | `-a'x + s = -b` | nonnegative | `+z` |
//! | `a'x == b` | `a'x + s = b` | zero | `-z` |
//!
//! Finite variable bounds become extra nonnegative rows after the model rows.

use ::clarabel::{
    algebra::CscMatrix,
    solver::{DefaultSettingsBuilder, IPSolver, SupportedConeT},
};
use tracing::debug;
use web_time::Instant;

use super::{check_request, LpBackend, ProblemClass, SolveOptions, SolverError};
use crate::lp::{LinearModel, LpSolution, Sense, SolveStatus};

const ID: &str = "clarabel";

/// Continuous LP backend with dual prices.
#[derive(Debug, Clone)]
pub struct ClarabelBackend {
    max_iter: u32,
}

impl ClarabelBackend {
    pub fn new() -> Self {
        Self { max_iter: 200 }
    }

    /// Interior-point iteration limit.
    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }
}

impl Default for ClarabelBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Column-wise accumulation of `A`, with the right-hand side and cone list.
struct ConicRows {
    columns: Vec<Vec<(usize, f64)>>,
    rhs: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl ConicRows {
    fn new(n_var: usize) -> Self {
        Self {
            columns: vec![Vec::new(); n_var],
            rhs: Vec::new(),
            cones: Vec::new(),
        }
    }

    fn push_row(&mut self, coeffs: impl Iterator<Item = (usize, f64)>, b: f64) -> usize {
        let row = self.rhs.len();
        for (col, val) in coeffs {
            self.columns[col].push((row, val));
        }
        self.rhs.push(b);
        row
    }

    /// `Σ coeff·x = b` (zero cone)
    fn push_eq(&mut self, coeffs: impl Iterator<Item = (usize, f64)>, b: f64) -> usize {
        let row = self.push_row(coeffs, b);
        match self.cones.last_mut() {
            Some(SupportedConeT::ZeroConeT(n)) => *n += 1,
            _ => self.cones.push(SupportedConeT::ZeroConeT(1)),
        }
        row
    }

    /// `Σ coeff·x <= b` (nonnegative cone)
    fn push_leq(&mut self, coeffs: impl Iterator<Item = (usize, f64)>, b: f64) -> usize {
        let row = self.push_row(coeffs, b);
        match self.cones.last_mut() {
            Some(SupportedConeT::NonnegativeConeT(n)) => *n += 1,
            _ => self.cones.push(SupportedConeT::NonnegativeConeT(1)),
        }
        row
    }

    fn into_csc(mut self) -> (CscMatrix<f64>, Vec<f64>, Vec<SupportedConeT<f64>>) {
        let n_rows = self.rhs.len();
        let n_var = self.columns.len();
        let mut col_ptr = Vec::with_capacity(n_var + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();

        for column in &mut self.columns {
            col_ptr.push(row_idx.len());
            column.sort_by_key(|(r, _)| *r);
            for &(r, v) in column.iter() {
                if v != 0.0 {
                    row_idx.push(r);
                    values.push(v);
                }
            }
        }
        col_ptr.push(row_idx.len());

        (
            CscMatrix::new(n_rows, n_var, col_ptr, row_idx, values),
            self.rhs,
            self.cones,
        )
    }
}

impl LpBackend for ClarabelBackend {
    fn id(&self) -> &str {
        ID
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::LinearProgram]
    }

    fn supports_duals(&self) -> bool {
        true
    }

    fn solve(
        &self,
        model: &LinearModel,
        options: &SolveOptions,
    ) -> Result<LpSolution, SolverError> {
        check_request(self, model, options)?;
        let start = Instant::now();
        let n_var = model.num_variables();
        let mut rows = ConicRows::new(n_var);

        // (row index, sign) turning Clarabel's z into a shadow price
        let mut dual_map = Vec::with_capacity(model.num_constraints());
        for constraint in model.constraints() {
            let terms = constraint.terms.iter().map(|(v, c)| (v.value(), *c));
            let entry = match constraint.sense {
                Sense::Le => (rows.push_leq(terms, constraint.rhs), -1.0),
                Sense::Ge => (
                    rows.push_leq(terms.map(|(v, c)| (v, -c)), -constraint.rhs),
                    1.0,
                ),
                Sense::Eq => (rows.push_eq(terms, constraint.rhs), -1.0),
            };
            dual_map.push(entry);
        }

        for (col, var) in model.variables().iter().enumerate() {
            if var.lower.is_finite() && var.lower == var.upper {
                rows.push_eq(std::iter::once((col, 1.0)), var.lower);
                continue;
            }
            if var.lower.is_finite() {
                rows.push_leq(std::iter::once((col, -1.0)), -var.lower);
            }
            if var.upper.is_finite() {
                rows.push_leq(std::iter::once((col, 1.0)), var.upper);
            }
        }

        let (a_mat, rhs, cones) = rows.into_csc();
        let p_mat = CscMatrix::new(n_var, n_var, vec![0; n_var + 1], Vec::new(), Vec::new());
        let q = model.objective().to_vec();

        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .max_iter(self.max_iter)
            .build()
            .map_err(|e| SolverError::backend(ID, format!("settings error: {:?}", e)))?;

        let mut solver =
            ::clarabel::solver::DefaultSolver::new(&p_mat, &q, &a_mat, &rhs, &cones, settings)
                .map_err(|e| SolverError::backend(ID, format!("initialization failed: {:?}", e)))?;
        solver.solve();
        let sol = solver.solution;

        debug!(
            model = model.name(),
            status = ?sol.status,
            iterations = sol.iterations,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "clarabel solve finished"
        );

        use ::clarabel::solver::SolverStatus as S;
        let status = match sol.status {
            S::Solved | S::AlmostSolved => SolveStatus::Optimal,
            S::PrimalInfeasible | S::AlmostPrimalInfeasible => SolveStatus::Infeasible,
            S::DualInfeasible | S::AlmostDualInfeasible => SolveStatus::Unbounded,
            _ => SolveStatus::Other,
        };
        if !status.is_optimal() {
            return Ok(LpSolution::with_status(status));
        }

        let primal = sol.x.clone();
        let duals = options.duals.then(|| {
            dual_map
                .iter()
                .map(|&(row, sign)| sign * sol.z[row])
                .collect()
        });

        Ok(LpSolution {
            status,
            objective: model.evaluate_objective(&primal),
            primal,
            duals,
        })
    }
}
