//! Linear models handed to an [`LpBackend`](crate::solver::LpBackend) and the
//! solutions coming back.
//!
//! Dual prices follow the shadow-price convention: the dual of a row is the
//! rate of change of the optimal objective per unit increase of its
//! right-hand side. Binding `<=` rows of a minimisation therefore carry
//! non-positive duals and binding `>=` rows non-negative ones.

mod model;
mod solution;

pub use model::{Constraint, Domain, LinearModel, RowId, Sense, VarId, Variable};
pub use solution::{LpSolution, SolveStatus};
