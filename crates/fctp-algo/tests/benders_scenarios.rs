//! End-to-end runs on the real Clarabel/microlp backends.

use fctp_algo::fctp::{solve_extensive, BendersSolver};
use fctp_algo::{MicroLpBackend, Termination};
use fctp_core::{reference, Instance};

const EPS: f64 = 1e-4;

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_single_arc_converges_to_110() {
    let instance = reference::single_arc().unwrap();
    let solution = BendersSolver::new().solve(&instance).unwrap();

    assert_eq!(solution.termination, Termination::Converged);
    assert!(solution.iterations <= 3, "took {} passes", solution.iterations);
    assert_close(solution.bounds.upper, 110.0, EPS);
    assert_close(solution.bounds.lower, 110.0, EPS);

    let best = solution.best.unwrap();
    assert_eq!(best.pattern, vec![true]);
    assert_close(best.flows[0], 100.0, EPS);
    assert!(best.total_unmet() < 1e-4);
}

#[test]
fn test_four_by_three_matches_extensive_form() {
    let instance = reference::four_by_three().unwrap();
    let exact = solve_extensive(&instance, 1000.0, &MicroLpBackend).unwrap();

    let solution = BendersSolver::new()
        .with_max_iterations(500)
        .solve(&instance)
        .unwrap();

    assert!(solution.converged(), "gap {} after {} passes", solution.gap, solution.iterations);
    assert_close(solution.bounds.upper, exact.objective, EPS);

    // The reference instance has enough capacity to serve everyone
    let best = solution.best.unwrap();
    assert!(best.total_unmet() < 1e-4);
    assert_close(best.total_shipped(), 100.0, EPS);
}

#[test]
fn test_four_by_three_default_budget_gives_valid_upper_bound() {
    let instance = reference::four_by_three().unwrap();
    let exact = solve_extensive(&instance, 1000.0, &MicroLpBackend).unwrap();
    let solution = BendersSolver::new().solve(&instance).unwrap();

    assert!(solution.iterations <= 10);
    assert!(solution.bounds.upper.is_finite());
    assert!(solution.bounds.upper >= exact.objective - EPS);
    match solution.termination {
        Termination::Converged => {
            assert!(solution.gap <= 1e-6);
            assert_close(solution.bounds.upper, exact.objective, EPS);
        }
        Termination::Exhausted => {
            assert_eq!(solution.iterations, 10);
            assert!(solution.gap > 1e-6);
        }
    }
    assert_eq!(solution.cuts, solution.iterations);
    assert_eq!(solution.history.len(), solution.iterations);
}

#[test]
fn test_bounds_are_monotone_once_theta_is_free() {
    let instance = reference::four_by_three().unwrap();
    let solution = BendersSolver::new()
        .with_max_iterations(30)
        .solve(&instance)
        .unwrap();

    for pair in solution.history.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        assert!(next.upper <= prev.upper, "upper bound increased");
        if prev.iteration >= 2 {
            let slack = 1e-6 * prev.lower.abs().max(1.0);
            assert!(next.lower + slack >= prev.lower, "lower bound decreased");
            assert!(next.lower <= next.upper + slack, "bounds crossed");
        }
        if prev.iteration >= 2 && prev.lower >= 0.0 && prev.gap.is_finite() {
            assert!(
                next.gap <= prev.gap + 1e-6,
                "gap grew from {} to {} after pass {}",
                prev.gap,
                next.gap,
                prev.iteration
            );
        }
    }
}

#[test]
fn test_capacity_shortfall_uses_slack() {
    let instance = Instance::builder()
        .origin("i1", 50.0)
        .destination("j1", 80.0)
        .arc("i1", "j1", 10.0, 1.0)
        .build()
        .unwrap();
    assert!(instance.has_capacity_shortfall());

    let solution = BendersSolver::new().solve(&instance).unwrap();
    assert!(solution.converged());
    assert_eq!(solution.infeasible_subproblems, 0);
    assert!(solution.history.iter().all(|log| log.feasible));

    let best = solution.best.unwrap();
    assert_close(best.unmet_demand[0], 30.0, EPS);
    assert_close(best.penalty_cost, 30_000.0, EPS);
    assert_close(solution.bounds.upper, 10.0 + 50.0 + 30_000.0, EPS);
}

#[test]
fn test_cheap_penalty_leaves_arc_closed() {
    let instance = reference::single_arc().unwrap();
    let solution = BendersSolver::new()
        .with_penalty_cost(0.5)
        .solve(&instance)
        .unwrap();

    assert!(solution.converged());
    assert_close(solution.bounds.upper, 50.0, EPS);
    assert_eq!(solution.best.unwrap().pattern, vec![false]);
}

#[test]
fn test_zero_demand_converges_immediately() {
    let instance = Instance::builder()
        .origin("i1", 10.0)
        .destination("j1", 0.0)
        .arc("i1", "j1", 5.0, 1.0)
        .build()
        .unwrap();

    let solution = BendersSolver::new().solve(&instance).unwrap();
    assert!(solution.converged());
    assert_eq!(solution.iterations, 1);
    assert!(solution.bounds.upper.abs() < EPS);
}

#[test]
fn test_identical_runs_are_identical() {
    let instance = reference::four_by_three().unwrap();
    let solver = BendersSolver::new().with_max_iterations(8);

    let first = solver.solve(&instance).unwrap();
    let second = solver.solve(&instance).unwrap();

    let patterns = |s: &fctp_algo::BendersSolution| {
        s.history
            .iter()
            .map(|log| log.pattern.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(patterns(&first), patterns(&second));
    assert_eq!(first.bounds, second.bounds);
    assert_eq!(first.iterations, second.iterations);
}

#[test]
fn test_independent_runs_on_threads() {
    let solver = std::sync::Arc::new(BendersSolver::new());
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let solver = solver.clone();
            std::thread::spawn(move || {
                let instance = reference::single_arc().unwrap();
                solver.solve(&instance).unwrap().bounds.upper
            })
        })
        .collect();

    for handle in handles {
        assert_close(handle.join().unwrap(), 110.0, EPS);
    }
}

#[test]
fn test_solution_report_serializes() {
    let instance = reference::single_arc().unwrap();
    let solution = BendersSolver::new().solve(&instance).unwrap();

    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(json["termination"], "converged");
    assert_eq!(json["history"].as_array().unwrap().len(), solution.iterations);
    assert_eq!(json["best"]["open_arcs"][0], "i1->j1");
}
