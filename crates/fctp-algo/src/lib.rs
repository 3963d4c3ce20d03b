//! # fctp-algo: Benders Decomposition for the Fixed-Charge Transportation Problem
//!
//! The master problem chooses which arcs to open (binary), the subproblem
//! routes flow over the open arcs (continuous) and prices the flow limits.
//! Those prices become optimality cuts that tighten the master until the
//! bounds meet or the iteration budget runs out.
//!
//! ## Modules
//!
//! - [`lp`] - Solver-neutral linear model and solution types
//! - [`solver`] - [`LpBackend`] trait and the Clarabel / microlp backends
//! - [`fctp`] - Model templates, cut store, the Benders loop and the
//!   extensive-form cross-check
//!
//! ## Example
//!
//! ```no_run
//! use fctp_algo::fctp::BendersSolver;
//! use fctp_core::reference;
//!
//! let instance = reference::four_by_three()?;
//! let solution = BendersSolver::new().with_max_iterations(25).solve(&instance)?;
//! println!("{}", solution.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod fctp;
pub mod lp;
pub mod solver;

pub use fctp::{
    solve_extensive, BendersConfig, BendersError, BendersRun, BendersSolution, BendersSolver,
    LoopState, Termination,
};
pub use lp::{Domain, LinearModel, LpSolution, RowId, Sense, SolveStatus, VarId};
pub use solver::{
    ClarabelBackend, DispatchBackend, LpBackend, MicroLpBackend, ProblemClass, SolveOptions,
    SolverError,
};
