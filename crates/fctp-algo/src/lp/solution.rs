use serde::{Deserialize, Serialize};

use super::{RowId, VarId};

/// Termination status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Anything else: iteration limits, numerical trouble, unknown
    Other,
}

impl SolveStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    pub fn is_infeasible(self) -> bool {
        matches!(self, SolveStatus::Infeasible)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Other => "other",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one solve.
///
/// `objective` and `primal` are only meaningful when the status is
/// [`SolveStatus::Optimal`]. `duals` holds one price per constraint, and only
/// when duals were requested for a continuous model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpSolution {
    pub status: SolveStatus,
    pub objective: f64,
    pub primal: Vec<f64>,
    pub duals: Option<Vec<f64>>,
}

impl LpSolution {
    /// A solution carrying only a non-optimal status.
    pub fn with_status(status: SolveStatus) -> Self {
        Self {
            status,
            objective: f64::NAN,
            primal: Vec::new(),
            duals: None,
        }
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.primal.get(var.value()).copied().unwrap_or(0.0)
    }

    pub fn dual(&self, row: RowId) -> Option<f64> {
        self.duals
            .as_ref()
            .and_then(|duals| duals.get(row.value()).copied())
    }
}
