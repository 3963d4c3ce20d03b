//! Routing models to the backend that can solve them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ClarabelBackend, LpBackend, MicroLpBackend, SolveOptions, SolverError};
use crate::lp::{LinearModel, LpSolution};

/// Classification used to match models to backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemClass {
    /// Continuous variables only
    LinearProgram,
    /// At least one binary variable
    MixedInteger,
}

impl ProblemClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemClass::LinearProgram => "linear_program",
            ProblemClass::MixedInteger => "mixed_integer",
        }
    }
}

impl std::fmt::Display for ProblemClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sends continuous models to one backend and mixed-binary models to another.
///
/// The default pairs Clarabel (LP, with duals) with microlp (MILP).
pub struct DispatchBackend {
    lp: Box<dyn LpBackend>,
    milp: Box<dyn LpBackend>,
}

impl DispatchBackend {
    pub fn new(lp: Box<dyn LpBackend>, milp: Box<dyn LpBackend>) -> Self {
        Self { lp, milp }
    }

    /// The backend that would receive a model of `class`.
    pub fn route(&self, class: ProblemClass) -> &dyn LpBackend {
        match class {
            ProblemClass::LinearProgram => self.lp.as_ref(),
            ProblemClass::MixedInteger => self.milp.as_ref(),
        }
    }
}

impl Default for DispatchBackend {
    fn default() -> Self {
        Self::new(Box::new(ClarabelBackend::new()), Box::new(MicroLpBackend))
    }
}

impl std::fmt::Debug for DispatchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchBackend")
            .field("lp", &self.lp.id())
            .field("milp", &self.milp.id())
            .finish()
    }
}

impl LpBackend for DispatchBackend {
    fn id(&self) -> &str {
        "dispatch"
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::LinearProgram, ProblemClass::MixedInteger]
    }

    fn supports_duals(&self) -> bool {
        self.lp.supports_duals()
    }

    fn solve(
        &self,
        model: &LinearModel,
        options: &SolveOptions,
    ) -> Result<LpSolution, SolverError> {
        let class = model.problem_class();
        let backend = self.route(class);
        debug!(model = model.name(), %class, backend = backend.id(), "dispatching solve");
        backend.solve(model, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes() {
        let dispatch = DispatchBackend::default();
        assert_eq!(dispatch.route(ProblemClass::LinearProgram).id(), "clarabel");
        assert_eq!(dispatch.route(ProblemClass::MixedInteger).id(), "microlp");
        assert!(dispatch.supports_duals());
    }

    #[test]
    fn test_problem_class_display() {
        assert_eq!(ProblemClass::MixedInteger.to_string(), "mixed_integer");
    }
}
