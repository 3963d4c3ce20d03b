//! The Benders control loop.

use std::sync::Arc;

use fctp_core::Instance;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use web_time::Instant;

use super::cuts::{BendersCut, CutStore, IterationRecord, SubproblemOutcome};
use super::solution::{BendersSolution, BestDesign, Bounds, IterationLog, Termination};
use super::templates::{build_master, build_subproblem};
use crate::lp::SolveStatus;
use crate::solver::{DispatchBackend, LpBackend, SolveOptions, SolverError};

/// Loop options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendersConfig {
    /// Maximum number of master/subproblem passes.
    pub max_iterations: usize,

    /// Relative gap `|1 − lower/upper|` at which the run stops.
    pub tolerance: f64,

    /// Cost per unit of unmet demand.
    ///
    /// Must exceed every unit cost for the slack to act as a last resort.
    pub penalty_cost: f64,
}

impl Default for BendersConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: 1e-6,
            penalty_cost: 1000.0,
        }
    }
}

impl BendersConfig {
    pub fn validate(&self) -> Result<(), BendersError> {
        if self.max_iterations == 0 {
            return Err(BendersError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(BendersError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.penalty_cost.is_finite() || self.penalty_cost <= 0.0 {
            return Err(BendersError::InvalidConfig(format!(
                "penalty_cost must be finite and positive, got {}",
                self.penalty_cost
            )));
        }
        Ok(())
    }
}

/// Which model a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Master,
    Subproblem,
    Extensive,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Master => "master",
            Stage::Subproblem => "subproblem",
            Stage::Extensive => "extensive-form",
        })
    }
}

/// Fatal loop errors. Budget exhaustion and subproblem infeasibility are not
/// errors.
#[derive(Debug, Error)]
pub enum BendersError {
    #[error("Invalid Benders configuration: {0}")]
    InvalidConfig(String),

    #[error("{stage} solve failed: {source}")]
    Solver {
        stage: Stage,
        #[source]
        source: SolverError,
    },

    #[error("{stage} problem ended with status '{status}'")]
    SolverStatus { stage: Stage, status: SolveStatus },

    #[error("subproblem returned {got} flow-limit duals, expected {expected}")]
    MissingDuals { expected: usize, got: usize },
}

/// Position in the loop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Init,
    SolveMaster,
    SolveSubproblem,
    Evaluate,
    AddCut,
    Converged,
    Exhausted,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Converged | LoopState::Exhausted)
    }
}

/// Master result carried through the rest of the pass.
#[derive(Debug, Clone)]
struct MasterOutcome {
    objective: f64,
    theta: f64,
    pattern: Vec<bool>,
}

/// Subproblem result carried to evaluation.
#[derive(Debug, Clone)]
struct SubproblemResult {
    outcome: SubproblemOutcome,
    duals: Vec<f64>,
    flows: Vec<f64>,
    unmet: Vec<f64>,
}

/// One decomposition run over a borrowed instance and backend.
///
/// [`step`](Self::step) performs exactly one state transition, so callers can
/// observe the loop between solves. [`run`](Self::run) steps to the end.
pub struct BendersRun<'a> {
    instance: &'a Instance,
    backend: &'a dyn LpBackend,
    config: BendersConfig,
    flow_limits: Vec<f64>,

    state: LoopState,
    iteration: usize,
    theta_pinned: bool,
    bounds: Bounds,
    store: CutStore,
    history: Vec<IterationLog>,
    best: Option<BestDesign>,
    consecutive_infeasible: usize,

    master: Option<MasterOutcome>,
    subproblem: Option<SubproblemResult>,
    started: Instant,
}

impl<'a> BendersRun<'a> {
    pub fn new(
        instance: &'a Instance,
        backend: &'a dyn LpBackend,
        config: BendersConfig,
    ) -> Result<Self, BendersError> {
        config.validate()?;
        Ok(Self {
            instance,
            backend,
            config,
            flow_limits: instance.flow_limits(),
            state: LoopState::Init,
            iteration: 0,
            theta_pinned: true,
            bounds: Bounds::default(),
            store: CutStore::new(),
            history: Vec::new(),
            best: None,
            consecutive_infeasible: 0,
            master: None,
            subproblem: None,
            started: Instant::now(),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Passes started so far (the current one included).
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn theta_pinned(&self) -> bool {
        self.theta_pinned
    }

    pub fn cuts(&self) -> &[BendersCut] {
        self.store.cuts()
    }

    pub fn records(&self) -> &[IterationRecord] {
        self.store.records()
    }

    pub fn history(&self) -> &[IterationLog] {
        &self.history
    }

    pub fn best(&self) -> Option<&BestDesign> {
        self.best.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Perform one transition and return the new state. Terminal states are
    /// absorbing.
    pub fn step(&mut self) -> Result<LoopState, BendersError> {
        self.state = match self.state {
            LoopState::Init => {
                self.bounds = Bounds::default();
                self.theta_pinned = true;
                debug!(
                    arcs = self.instance.num_arcs(),
                    max_iterations = self.config.max_iterations,
                    "starting Benders run"
                );
                LoopState::SolveMaster
            }
            LoopState::SolveMaster => self.solve_master()?,
            LoopState::SolveSubproblem => self.solve_subproblem()?,
            LoopState::Evaluate => self.evaluate(),
            LoopState::AddCut => self.add_cut(),
            terminal => terminal,
        };
        Ok(self.state)
    }

    /// Step until a terminal state and assemble the solution.
    pub fn run(mut self) -> Result<BendersSolution, BendersError> {
        while !self.is_finished() {
            self.step()?;
        }
        Ok(self.into_solution())
    }

    fn solve_master(&mut self) -> Result<LoopState, BendersError> {
        self.iteration += 1;
        let master = build_master(self.instance, self.store.cuts(), self.theta_pinned);
        let solution = self
            .backend
            .solve(&master.model, &SolveOptions::default())
            .map_err(|source| BendersError::Solver {
                stage: Stage::Master,
                source,
            })?;
        if !solution.status.is_optimal() {
            return Err(BendersError::SolverStatus {
                stage: Stage::Master,
                status: solution.status,
            });
        }

        let pattern: Vec<bool> = master
            .open
            .iter()
            .map(|var| solution.value(*var) > 0.5)
            .collect();
        let theta = solution.value(master.theta);
        debug!(
            iteration = self.iteration,
            objective = solution.objective,
            theta,
            open = pattern.iter().filter(|o| **o).count(),
            "master solved"
        );
        self.master = Some(MasterOutcome {
            objective: solution.objective,
            theta,
            pattern,
        });
        Ok(LoopState::SolveSubproblem)
    }

    fn solve_subproblem(&mut self) -> Result<LoopState, BendersError> {
        let pattern = match &self.master {
            Some(master) => master.pattern.as_slice(),
            None => return Ok(LoopState::SolveMaster),
        };
        let sub = build_subproblem(self.instance, pattern, self.config.penalty_cost);
        let solution = self
            .backend
            .solve(&sub.model, &SolveOptions::with_duals())
            .map_err(|source| BendersError::Solver {
                stage: Stage::Subproblem,
                source,
            })?;

        let n_arcs = self.instance.num_arcs();
        let result = match solution.status {
            SolveStatus::Optimal => {
                let duals: Vec<f64> = sub
                    .flow_limit_rows
                    .iter()
                    .filter_map(|row| solution.dual(*row))
                    .collect();
                if duals.len() != n_arcs {
                    return Err(BendersError::MissingDuals {
                        expected: n_arcs,
                        got: duals.len(),
                    });
                }
                SubproblemResult {
                    outcome: SubproblemOutcome::Optimal {
                        objective: solution.objective,
                    },
                    duals,
                    flows: sub.flows.iter().map(|v| solution.value(*v)).collect(),
                    unmet: sub.slacks.iter().map(|v| solution.value(*v)).collect(),
                }
            }
            SolveStatus::Infeasible => SubproblemResult {
                outcome: SubproblemOutcome::Infeasible,
                duals: vec![0.0; n_arcs],
                flows: Vec::new(),
                unmet: Vec::new(),
            },
            status => {
                return Err(BendersError::SolverStatus {
                    stage: Stage::Subproblem,
                    status,
                })
            }
        };
        debug!(
            iteration = self.iteration,
            objective = ?result.outcome.objective(),
            "subproblem solved"
        );
        self.subproblem = Some(result);
        Ok(LoopState::Evaluate)
    }

    fn evaluate(&mut self) -> LoopState {
        let (Some(master), Some(sub)) = (&self.master, &self.subproblem) else {
            return LoopState::SolveMaster;
        };

        match sub.outcome {
            SubproblemOutcome::Infeasible => {
                self.consecutive_infeasible += 1;
                if self.consecutive_infeasible > 1 {
                    error!(
                        iteration = self.iteration,
                        consecutive = self.consecutive_infeasible,
                        "subproblem infeasible again; the unmet-demand slack should rule this out"
                    );
                } else {
                    warn!(
                        iteration = self.iteration,
                        "subproblem infeasible; keeping bounds and adding a vacuous cut"
                    );
                }
            }
            SubproblemOutcome::Optimal { objective } => {
                self.consecutive_infeasible = 0;
                self.bounds.lower = master.objective;
                let candidate = master.objective - master.theta + objective;
                if candidate < self.bounds.upper {
                    self.bounds.upper = candidate;
                    self.best = Some(self.design(master, sub, candidate));
                }
                self.theta_pinned = false;
            }
        }

        self.history.push(IterationLog {
            iteration: self.iteration,
            master_objective: master.objective,
            subproblem_objective: sub.outcome.objective(),
            theta: master.theta,
            lower: self.bounds.lower,
            upper: self.bounds.upper,
            gap: self.bounds.gap(),
            feasible: sub.outcome != SubproblemOutcome::Infeasible,
            open_arcs: master.pattern.iter().filter(|o| **o).count(),
            pattern: master.pattern.clone(),
        });
        LoopState::AddCut
    }

    fn add_cut(&mut self) -> LoopState {
        let (Some(master), Some(sub)) = (self.master.take(), self.subproblem.take()) else {
            return LoopState::SolveMaster;
        };
        self.store
            .push(master.pattern, sub.outcome, sub.duals, &self.flow_limits);

        let gap = self.bounds.gap();
        info!(
            iteration = self.iteration,
            lower = self.bounds.lower,
            upper = self.bounds.upper,
            gap,
            cuts = self.store.len(),
            "Benders iteration"
        );

        if self.bounds.is_converged(self.config.tolerance) {
            info!(
                iterations = self.iteration,
                upper = self.bounds.upper,
                "Benders converged"
            );
            LoopState::Converged
        } else if self.iteration >= self.config.max_iterations {
            warn!(
                iterations = self.iteration,
                lower = self.bounds.lower,
                upper = self.bounds.upper,
                gap,
                "iteration budget exhausted before convergence"
            );
            LoopState::Exhausted
        } else {
            LoopState::SolveMaster
        }
    }

    fn design(&self, master: &MasterOutcome, sub: &SubproblemResult, total: f64) -> BestDesign {
        let instance = self.instance;
        let open_arcs = instance
            .arcs()
            .iter()
            .zip(&master.pattern)
            .filter(|(_, open)| **open)
            .map(|(arc, _)| instance.arc_label(arc))
            .collect();
        let transport_cost = instance
            .arcs()
            .iter()
            .zip(&sub.flows)
            .map(|(arc, flow)| arc.unit_cost * flow)
            .sum();
        let penalty_cost = self.config.penalty_cost * sub.unmet.iter().sum::<f64>();

        BestDesign {
            iteration: self.iteration,
            pattern: master.pattern.clone(),
            open_arcs,
            flows: sub.flows.clone(),
            unmet_demand: sub.unmet.clone(),
            fixed_cost: instance.fixed_cost_of(&master.pattern),
            transport_cost,
            penalty_cost,
            total_cost: total,
        }
    }

    /// Snapshot of the run. Reports `Exhausted` unless the run converged.
    pub fn into_solution(self) -> BendersSolution {
        let termination = if self.state == LoopState::Converged {
            Termination::Converged
        } else {
            Termination::Exhausted
        };
        BendersSolution {
            termination,
            iterations: self.store.len(),
            bounds: self.bounds,
            gap: self.bounds.gap(),
            cuts: self.store.len(),
            infeasible_subproblems: self.store.infeasible_count(),
            best: self.best,
            history: self.history,
            solve_time_ms: self.started.elapsed().as_millis(),
        }
    }
}

/// Benders solver for FCTP instances.
///
/// Holds the configuration and the backend; every [`solve`](Self::solve)
/// creates an independent [`BendersRun`].
#[derive(Clone)]
pub struct BendersSolver {
    config: BendersConfig,
    backend: Arc<dyn LpBackend>,
}

impl BendersSolver {
    /// Default configuration with the Clarabel/microlp dispatcher.
    pub fn new() -> Self {
        Self::with_config(BendersConfig::default())
    }

    pub fn with_config(config: BendersConfig) -> Self {
        Self {
            config,
            backend: Arc::new(DispatchBackend::default()),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn with_penalty_cost(mut self, penalty_cost: f64) -> Self {
        self.config.penalty_cost = penalty_cost;
        self
    }

    /// Use a different solving engine.
    pub fn with_backend(mut self, backend: Arc<dyn LpBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn config(&self) -> &BendersConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn LpBackend {
        self.backend.as_ref()
    }

    /// Start a steppable run.
    pub fn start<'a>(&'a self, instance: &'a Instance) -> Result<BendersRun<'a>, BendersError> {
        BendersRun::new(instance, self.backend.as_ref(), self.config.clone())
    }

    /// Run the decomposition to convergence or budget exhaustion.
    pub fn solve(&self, instance: &Instance) -> Result<BendersSolution, BendersError> {
        self.start(instance)?.run()
    }
}

impl Default for BendersSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BendersSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BendersSolver")
            .field("config", &self.config)
            .field("backend", &self.backend.id())
            .finish()
    }
}
