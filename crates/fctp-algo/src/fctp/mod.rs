//! Benders decomposition for the Fixed-Charge Transportation Problem (FCTP)
//!
//! ## Problem Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FIXED-CHARGE TRANSPORTATION                                            │
//! │  ───────────────────────────                                            │
//! │                                                                         │
//! │  Given:                                                                 │
//! │    • Origins with capacities, destinations with demands                 │
//! │    • Per arc: a fixed opening cost and a per-unit shipping cost         │
//! │                                                                         │
//! │  Decide:                                                                │
//! │    • Which arcs to open (binary)                                        │
//! │    • How much to ship on each open arc (continuous)                     │
//! │                                                                         │
//! │  Minimize:                                                              │
//! │    Fixed cost + shipping cost + penalty · unmet demand                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decomposition
//!
//! ```text
//! master      min  Σ_a f_a·y_a + θ
//!             s.t. θ ≥ Z2_k − Σ_a π_ka·M_a·(ȳ_ka − y_a)     one row per cut k
//!                  y_a ∈ {0,1}
//!
//! subproblem  min  Σ_a c_a·x_a + P·Σ_j u_j
//!             s.t. Σ_j x_ij ≤ s_i                           capacity
//!                  Σ_i x_ij + u_j ≥ d_j                     demand
//!                  x_a ≤ M_a·ȳ_a                            flow limit  (dual π_a ≤ 0)
//!                  x, u ≥ 0
//! ```
//!
//! with `M_a = min(s_i, d_j)`. The unmet-demand slack `u` keeps the
//! subproblem feasible for every pattern `ȳ`, so only optimality cuts are
//! needed. θ is fixed at zero on the first master solve.
//!
//! Each pass gives a lower bound (the master objective) and a candidate upper
//! bound (the fixed cost of `ȳ` plus the subproblem objective). The loop stops
//! once `|1 − lower/upper|` drops to the tolerance or the iteration budget is
//! spent.
//!
//! ## Usage
//!
//! ```no_run
//! use fctp_algo::fctp::BendersSolver;
//! use fctp_core::reference;
//!
//! let instance = reference::four_by_three()?;
//! let solution = BendersSolver::new()
//!     .with_max_iterations(50)
//!     .with_tolerance(1e-6)
//!     .solve(&instance)?;
//!
//! println!("{}", solution.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## References
//!
//! - Benders, J. F. (1962). Partitioning procedures for solving mixed-variables
//!   programming problems. *Numerische Mathematik*, 4(1), 238-252.

mod benders;
mod cuts;
mod extensive;
mod solution;
mod templates;

pub use benders::{BendersConfig, BendersError, BendersRun, BendersSolver, LoopState, Stage};
pub use cuts::{generate_cut, BendersCut, CutStore, IterationRecord, SubproblemOutcome};
pub use extensive::{solve_extensive, ExtensiveSolution};
pub use solution::{BendersSolution, BestDesign, Bounds, IterationLog, Termination};
pub use templates::{build_master, build_subproblem, MasterModel, SubproblemModel};
