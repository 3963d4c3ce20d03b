//! Solver adapters.
//!
//! Every engine sits behind [`LpBackend`]: hand it a [`LinearModel`], get back
//! a status, objective, primal values and, for continuous models when asked,
//! one dual price per constraint.
//!
//! | Backend | Problem classes | Duals |
//! |---------|-----------------|-------|
//! | [`ClarabelBackend`] | LP | yes |
//! | [`MicroLpBackend`] | LP, MILP | no |
//! | [`DispatchBackend`] | LP → Clarabel, MILP → microlp | LP only |

mod clarabel;
mod dispatch;
mod microlp;

use thiserror::Error;

use crate::lp::{LinearModel, LpSolution};

pub use self::clarabel::ClarabelBackend;
pub use self::dispatch::{DispatchBackend, ProblemClass};
pub use self::microlp::MicroLpBackend;

/// Failures raised by a backend. A non-optimal status is *not* an error; it
/// comes back inside [`LpSolution::status`].
#[derive(Debug, Error)]
pub enum SolverError {
    /// The engine itself failed (setup, numerical breakdown).
    #[error("{backend} failed: {message}")]
    Backend { backend: String, message: String },

    /// The backend cannot handle this request.
    #[error("{backend} does not support {what}")]
    Unsupported { backend: String, what: String },

    /// The model contains data no engine accepts.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl SolverError {
    pub(crate) fn backend(backend: &str, message: impl Into<String>) -> Self {
        SolverError::Backend {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(backend: &str, what: impl Into<String>) -> Self {
        SolverError::Unsupported {
            backend: backend.to_string(),
            what: what.into(),
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Request one dual price per constraint.
    pub duals: bool,
}

impl SolveOptions {
    pub fn with_duals() -> Self {
        Self { duals: true }
    }
}

/// A linear / mixed-binary minimisation engine.
pub trait LpBackend: Send + Sync {
    /// Unique identifier (e.g. "clarabel", "microlp")
    fn id(&self) -> &str;

    /// Problem classes this backend can solve
    fn supported_classes(&self) -> &[ProblemClass];

    /// Whether dual prices can be returned for continuous models
    fn supports_duals(&self) -> bool;

    /// Solve `model`.
    fn solve(&self, model: &LinearModel, options: &SolveOptions)
        -> Result<LpSolution, SolverError>;
}

/// Shared precondition checks for backend implementations.
pub(crate) fn check_request(
    backend: &dyn LpBackend,
    model: &LinearModel,
    options: &SolveOptions,
) -> Result<(), SolverError> {
    model.validate()?;
    let class = model.problem_class();
    if !backend.supported_classes().contains(&class) {
        return Err(SolverError::unsupported(backend.id(), class.as_str()));
    }
    if options.duals && (class != ProblemClass::LinearProgram || !backend.supports_duals()) {
        return Err(SolverError::unsupported(
            backend.id(),
            format!("dual prices for {}", class.as_str()),
        ));
    }
    Ok(())
}
