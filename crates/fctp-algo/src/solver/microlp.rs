//! good_lp + microlp backend (pure-Rust simplex with branch and bound).

use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use tracing::debug;
use web_time::Instant;

use super::{check_request, LpBackend, ProblemClass, SolveOptions, SolverError};
use crate::lp::{Domain, LinearModel, LpSolution, Sense, SolveStatus};

const ID: &str = "microlp";

/// Solves continuous and mixed-binary models. Never returns duals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend;

impl LpBackend for MicroLpBackend {
    fn id(&self) -> &str {
        ID
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::LinearProgram, ProblemClass::MixedInteger]
    }

    fn supports_duals(&self) -> bool {
        false
    }

    fn solve(
        &self,
        model: &LinearModel,
        options: &SolveOptions,
    ) -> Result<LpSolution, SolverError> {
        check_request(self, model, options)?;
        let start = Instant::now();

        let mut vars = variables!();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| {
                let def = match v.domain {
                    Domain::Continuous => variable().min(v.lower).max(v.upper),
                    Domain::Binary => variable()
                        .integer()
                        .min(v.lower.max(0.0))
                        .max(v.upper.min(1.0)),
                };
                vars.add(def)
            })
            .collect();

        let mut objective = Expression::from(model.objective_constant());
        for (handle, coeff) in handles.iter().zip(model.objective()) {
            if *coeff != 0.0 {
                objective += *coeff * *handle;
            }
        }

        let mut problem = vars.minimise(objective).using(microlp);
        for row in model.constraints() {
            let mut lhs = Expression::from(0.0);
            for (var, coeff) in &row.terms {
                lhs += *coeff * handles[var.value()];
            }
            let rhs = row.rhs;
            problem = match row.sense {
                Sense::Le => problem.with(constraint!(lhs <= rhs)),
                Sense::Ge => problem.with(constraint!(lhs >= rhs)),
                Sense::Eq => problem.with(constraint!(lhs == rhs)),
            };
        }

        let result = problem.solve();
        debug!(
            model = model.name(),
            ok = result.is_ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "microlp solve finished"
        );

        let solution = match result {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                return Ok(LpSolution::with_status(SolveStatus::Infeasible))
            }
            Err(ResolutionError::Unbounded) => {
                return Ok(LpSolution::with_status(SolveStatus::Unbounded))
            }
            Err(e) => return Err(SolverError::backend(ID, format!("{:?}", e))),
        };

        let primal: Vec<f64> = model
            .variables()
            .iter()
            .zip(&handles)
            .map(|(v, handle)| {
                let value = solution.value(*handle);
                match v.domain {
                    Domain::Binary => value.round(),
                    Domain::Continuous => value,
                }
            })
            .collect();

        Ok(LpSolution {
            status: SolveStatus::Optimal,
            objective: model.evaluate_objective(&primal),
            primal,
            duals: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_knapsack_style_milp() {
        // min -5a - 4b - 3c  s.t.  2a + 3b + c <= 5,  binaries → a = 1, b = 1, c = 0
        let mut model = LinearModel::new("knapsack");
        let a = model.add_binary("a");
        let b = model.add_binary("b");
        let c = model.add_binary("c");
        model.set_objective(a, -5.0);
        model.set_objective(b, -4.0);
        model.set_objective(c, -3.0);
        model.add_constraint("weight", vec![(a, 2.0), (b, 3.0), (c, 1.0)], Sense::Le, 5.0);

        let solution = MicroLpBackend.solve(&model, &SolveOptions::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_close(solution.objective, -9.0);
        assert_eq!(solution.value(a), 1.0);
        assert_eq!(solution.value(b), 1.0);
        assert_eq!(solution.value(c), 0.0);
    }

    #[test]
    fn test_mixed_model_with_free_continuous() {
        // min 10y + t  s.t.  t >= 50 - 50y,  t free → y = 1, t = 0
        let mut model = LinearModel::new("mixed");
        let y = model.add_binary("y");
        let t = model.add_continuous("t", f64::NEG_INFINITY, f64::INFINITY);
        model.set_objective(y, 10.0);
        model.set_objective(t, 1.0);
        model.add_constraint("cut", vec![(t, 1.0), (y, 50.0)], Sense::Ge, 50.0);
        model.add_constraint("floor", vec![(t, 1.0)], Sense::Ge, 0.0);

        let solution = MicroLpBackend.solve(&model, &SolveOptions::default()).unwrap();
        assert_close(solution.objective, 10.0);
        assert_eq!(solution.value(y), 1.0);
    }

    #[test]
    fn test_infeasible_status() {
        let mut model = LinearModel::new("infeasible");
        let y = model.add_binary("y");
        model.add_constraint("impossible", vec![(y, 1.0)], Sense::Ge, 2.0);
        let solution = MicroLpBackend.solve(&model, &SolveOptions::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_duals_not_supported() {
        let mut model = LinearModel::new("lp");
        model.add_continuous("x", 0.0, 1.0);
        let err = MicroLpBackend
            .solve(&model, &SolveOptions::with_duals())
            .unwrap_err();
        assert!(matches!(err, SolverError::Unsupported { .. }));
    }
}
