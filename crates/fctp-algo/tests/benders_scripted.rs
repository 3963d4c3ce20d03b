//! Loop state machine driven by a scripted backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use fctp_algo::fctp::{BendersConfig, BendersError, BendersRun, LoopState, Stage};
use fctp_algo::{
    LinearModel, LpBackend, LpSolution, ProblemClass, SolveOptions, SolveStatus, SolverError,
    Termination,
};
use fctp_core::reference;

type Reply = Result<LpSolution, String>;

/// Replays canned answers: one queue for master (MILP) solves, one for
/// subproblem (LP) solves. Keeps every model it was handed.
#[derive(Default)]
struct ScriptedBackend {
    masters: Mutex<VecDeque<Reply>>,
    subproblems: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<LinearModel>>,
}

impl ScriptedBackend {
    fn master(self, reply: Reply) -> Self {
        self.masters.lock().unwrap().push_back(reply);
        self
    }

    fn subproblem(self, reply: Reply) -> Self {
        self.subproblems.lock().unwrap().push_back(reply);
        self
    }

    fn models(&self) -> Vec<LinearModel> {
        self.seen.lock().unwrap().clone()
    }
}

impl LpBackend for ScriptedBackend {
    fn id(&self) -> &str {
        "scripted"
    }

    fn supported_classes(&self) -> &[ProblemClass] {
        &[ProblemClass::LinearProgram, ProblemClass::MixedInteger]
    }

    fn supports_duals(&self) -> bool {
        true
    }

    fn solve(
        &self,
        model: &LinearModel,
        _options: &SolveOptions,
    ) -> Result<LpSolution, SolverError> {
        self.seen.lock().unwrap().push(model.clone());
        let queue = match model.problem_class() {
            ProblemClass::MixedInteger => &self.masters,
            ProblemClass::LinearProgram => &self.subproblems,
        };
        let reply = queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script ran out".to_string()));
        reply.map_err(|message| SolverError::Backend {
            backend: "scripted".to_string(),
            message,
        })
    }
}

fn optimal(objective: f64, primal: Vec<f64>, duals: Option<Vec<f64>>) -> Reply {
    Ok(LpSolution {
        status: SolveStatus::Optimal,
        objective,
        primal,
        duals,
    })
}

fn status(status: SolveStatus) -> Reply {
    Ok(LpSolution::with_status(status))
}

// Single-arc layouts:
//   master      columns [open, theta]
//   subproblem  columns [flow, unmet], rows [capacity, demand, limit]

fn closed_master() -> Reply {
    optimal(0.0, vec![0.0, 0.0], None)
}

fn open_master() -> Reply {
    optimal(110.0, vec![1.0, 100.0], None)
}

fn all_unmet_subproblem() -> Reply {
    optimal(100_000.0, vec![0.0, 100.0], Some(vec![0.0, 1000.0, -999.0]))
}

fn all_shipped_subproblem() -> Reply {
    optimal(100.0, vec![100.0, 0.0], Some(vec![0.0, 1.0, 0.0]))
}

#[test]
fn test_state_sequence_to_convergence() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(all_unmet_subproblem())
        .master(open_master())
        .subproblem(all_shipped_subproblem());

    let mut run = BendersRun::new(&instance, &backend, BendersConfig::default()).unwrap();
    assert_eq!(run.state(), LoopState::Init);

    let mut states = Vec::new();
    while !run.is_finished() {
        states.push(run.step().unwrap());
    }
    use LoopState::*;
    assert_eq!(
        states,
        vec![
            SolveMaster,
            SolveSubproblem,
            Evaluate,
            AddCut,
            SolveMaster,
            SolveSubproblem,
            Evaluate,
            AddCut,
            Converged,
        ]
    );

    // Terminal state is absorbing
    assert_eq!(run.step().unwrap(), Converged);

    assert_eq!(run.bounds().lower, 110.0);
    assert_eq!(run.bounds().upper, 110.0);
    assert_eq!(run.cuts().len(), 2);
    assert_eq!(run.records().len(), 2);

    let first = &run.cuts()[0];
    assert_eq!(first.coefficients, vec![-99_900.0]);
    assert_eq!(first.constant, 100_000.0);

    let solution = run.into_solution();
    assert_eq!(solution.termination, Termination::Converged);
    assert_eq!(solution.iterations, 2);
    let best = solution.best.unwrap();
    assert_eq!(best.iteration, 2);
    assert_eq!(best.open_arcs, vec!["i1->j1".to_string()]);
    assert_eq!(best.total_cost, 110.0);
    assert_eq!(best.transport_cost, 100.0);
}

#[test]
fn test_theta_pinned_only_until_first_feasible_pass() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(all_unmet_subproblem())
        .master(open_master())
        .subproblem(all_shipped_subproblem());

    let mut run = BendersRun::new(&instance, &backend, BendersConfig::default()).unwrap();
    run.step().unwrap();
    assert!(run.theta_pinned());
    while run.state() != LoopState::AddCut {
        run.step().unwrap();
    }
    assert!(!run.theta_pinned());
    run.run().unwrap();

    let masters: Vec<LinearModel> = backend
        .models()
        .into_iter()
        .filter(|m| m.problem_class() == ProblemClass::MixedInteger)
        .collect();
    assert_eq!(masters.len(), 2);

    let theta_first = &masters[0].variables()[1];
    assert_eq!((theta_first.lower, theta_first.upper), (0.0, 0.0));
    assert_eq!(masters[0].num_constraints(), 0);

    let theta_second = &masters[1].variables()[1];
    assert_eq!(theta_second.lower, f64::NEG_INFINITY);
    assert_eq!(masters[1].num_constraints(), 1);
}

#[test]
fn test_subproblem_sees_master_pattern() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(all_unmet_subproblem())
        .master(open_master())
        .subproblem(all_shipped_subproblem());

    BendersRun::new(&instance, &backend, BendersConfig::default())
        .unwrap()
        .run()
        .unwrap();

    let limits: Vec<f64> = backend
        .models()
        .iter()
        .filter(|m| m.problem_class() == ProblemClass::LinearProgram)
        .map(|m| m.constraints()[2].rhs)
        .collect();
    assert_eq!(limits, vec![0.0, 100.0]);
}

#[test]
fn test_infeasible_subproblem_keeps_bounds() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(status(SolveStatus::Infeasible))
        .master(closed_master())
        .subproblem(status(SolveStatus::Infeasible));

    let config = BendersConfig {
        max_iterations: 2,
        ..BendersConfig::default()
    };
    let mut run = BendersRun::new(&instance, &backend, config).unwrap();
    while run.state() != LoopState::AddCut {
        run.step().unwrap();
    }
    assert!(run.bounds().lower.is_infinite());
    assert!(run.bounds().upper.is_infinite());
    assert!(run.theta_pinned());

    let solution = run.run().unwrap();
    assert_eq!(solution.termination, Termination::Exhausted);
    assert_eq!(solution.iterations, 2);
    assert_eq!(solution.cuts, 2);
    assert_eq!(solution.infeasible_subproblems, 2);
    assert!(solution.best.is_none());
    assert!(solution.gap.is_infinite());
    assert!(solution.history.iter().all(|log| !log.feasible));

    // Vacuous cuts add no rows and theta stays pinned
    let second_master = backend
        .models()
        .into_iter()
        .filter(|m| m.problem_class() == ProblemClass::MixedInteger)
        .nth(1)
        .unwrap();
    assert_eq!(second_master.num_constraints(), 0);
    assert_eq!(second_master.variables()[1].upper, 0.0);
}

#[test]
fn test_budget_exhaustion_is_not_an_error() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(all_unmet_subproblem());

    let config = BendersConfig {
        max_iterations: 1,
        ..BendersConfig::default()
    };
    let solution = BendersRun::new(&instance, &backend, config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(solution.termination, Termination::Exhausted);
    assert_eq!(solution.iterations, 1);
    assert_eq!(solution.bounds.lower, 0.0);
    assert_eq!(solution.bounds.upper, 100_000.0);
    assert_eq!(solution.gap, 1.0);
    assert_eq!(solution.best.unwrap().penalty_cost, 100_000.0);
}

#[test]
fn test_master_engine_failure_is_fatal() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default().master(Err("boom".to_string()));

    let err = BendersRun::new(&instance, &backend, BendersConfig::default())
        .unwrap()
        .run()
        .unwrap_err();
    match err {
        BendersError::Solver { stage, source } => {
            assert_eq!(stage, Stage::Master);
            assert!(source.to_string().contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_master_not_optimal_is_fatal() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default().master(status(SolveStatus::Infeasible));

    let err = BendersRun::new(&instance, &backend, BendersConfig::default())
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        BendersError::SolverStatus {
            stage: Stage::Master,
            status: SolveStatus::Infeasible
        }
    ));
}

#[test]
fn test_unbounded_subproblem_is_fatal() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(status(SolveStatus::Unbounded));

    let err = BendersRun::new(&instance, &backend, BendersConfig::default())
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        BendersError::SolverStatus {
            stage: Stage::Subproblem,
            status: SolveStatus::Unbounded
        }
    ));
}

#[test]
fn test_missing_duals_rejected() {
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(optimal(100_000.0, vec![0.0, 100.0], None));

    let err = BendersRun::new(&instance, &backend, BendersConfig::default())
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        BendersError::MissingDuals {
            expected: 1,
            got: 0
        }
    ));
}

#[test]
fn test_upper_bound_keeps_best_value() {
    // Second pass finds a worse design; the upper bound and best design stay
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(optimal(10.0, vec![1.0, 0.0], None))
        .subproblem(all_shipped_subproblem())
        .master(optimal(50.0, vec![0.0, 50.0], None))
        .subproblem(all_unmet_subproblem());

    let config = BendersConfig {
        max_iterations: 2,
        tolerance: 0.0,
        ..BendersConfig::default()
    };
    let solution = BendersRun::new(&instance, &backend, config)
        .unwrap()
        .run()
        .unwrap();

    // pass 1: lower 10 (theta pinned), upper 110; pass 2: lower 50, upper stays
    assert_eq!(solution.history[0].upper, 110.0);
    assert_eq!(solution.history[1].lower, 50.0);
    assert_eq!(solution.bounds.upper, 110.0);
    assert_eq!(solution.best.unwrap().iteration, 1);
}

#[test]
fn test_negative_master_objective_widens_gap() {
    // Theta freed under a steep first cut drives Z1 below zero
    let instance = reference::single_arc().unwrap();
    let backend = ScriptedBackend::default()
        .master(closed_master())
        .subproblem(all_unmet_subproblem())
        .master(optimal(-50.0, vec![1.0, -60.0], None))
        .subproblem(all_shipped_subproblem());

    let config = BendersConfig {
        max_iterations: 2,
        ..BendersConfig::default()
    };
    let solution = BendersRun::new(&instance, &backend, config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(solution.history[0].gap, 1.0);
    assert_eq!(solution.history[1].lower, -50.0);
    assert_eq!(solution.history[1].upper, 110.0);
    assert!(solution.history[1].gap > solution.history[0].gap);
    assert_eq!(solution.termination, Termination::Exhausted);
}
