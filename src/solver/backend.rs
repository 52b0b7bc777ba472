//! MILP backends.
//!
//! A backend takes a [`LinearProgram`] and a time budget and reports exactly
//! one [`BackendOutcome`]. The default [`MicrolpBackend`] uses `good_lp` with
//! the pure-Rust microlp solver.

use std::fmt::Debug;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel,
};
use log::{debug, info, warn};

use crate::milp::{LinearProgram, Sense};

/// Terminal status of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    /// Proven optimum: one value per column and the objective.
    Optimal { values: Vec<f64>, objective: f64 },
    /// Proven infeasible.
    Infeasible,
    /// Budget exhausted without a certificate either way.
    TimedOut,
    /// Crash or unexpected solver status.
    Error(String),
}

/// A mixed-integer solver.
pub trait MilpBackend: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Minimizes `program` over binary columns.
    fn solve(&self, program: &LinearProgram, time_limit: Option<Duration>) -> BackendOutcome;
}

/// `good_lp` + microlp backend.
///
/// microlp has no time-limit option, so the solve runs on a worker thread and
/// the caller stops waiting once the budget is spent. A timed-out solve is
/// not cancelled: its worker thread keeps running until microlp returns, and
/// the result is discarded. Repeated time-outs on hard instances leave one
/// such thread per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpBackend;

impl MicrolpBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MilpBackend for MicrolpBackend {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, program: &LinearProgram, time_limit: Option<Duration>) -> BackendOutcome {
        let owned = program.clone();
        run_with_budget(time_limit, move || solve_program(&owned))
    }
}

/// Runs `job` on a named worker thread and waits at most `time_limit`.
///
/// A missing limit waits indefinitely. A worker that dies without answering
/// is reported as [`BackendOutcome::Error`].
fn run_with_budget<F>(time_limit: Option<Duration>, job: F) -> BackendOutcome
where
    F: FnOnce() -> BackendOutcome + Send + 'static,
{
    let started = Instant::now();
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("u-roomalloc-microlp".into())
        .spawn(move || {
            // Receiver may be gone after a timeout.
            let _ = tx.send(job());
        });
    if let Err(e) = spawned {
        return BackendOutcome::Error(format!("failed to spawn solver thread: {e}"));
    }

    let received = match time_limit {
        Some(limit) => rx.recv_timeout(limit),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(outcome) => {
            info!("microlp finished in {:.2?}", started.elapsed());
            outcome
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!("microlp exceeded its time budget of {time_limit:?}; solve left running");
            BackendOutcome::TimedOut
        }
        Err(RecvTimeoutError::Disconnected) => {
            BackendOutcome::Error("solver thread terminated without a result".into())
        }
    }
}

fn solve_program(program: &LinearProgram) -> BackendOutcome {
    let mut problem = ProblemVariables::new();
    let vars = problem.add_vector(variable().binary(), program.num_vars());

    let objective: Expression = program
        .objective
        .iter()
        .zip(&vars)
        .map(|(&coef, &var)| coef * var)
        .sum();

    let mut model = problem.minimise(objective).using(default_solver);
    for row in &program.constraints {
        let lhs: Expression = row
            .terms
            .iter()
            .map(|&(col, coef)| coef * vars[col])
            .sum();
        let rhs = row.rhs;
        match row.sense {
            Sense::Eq => model.add_constraint(constraint!(lhs == rhs)),
            Sense::Le => model.add_constraint(constraint!(lhs <= rhs)),
        };
    }
    debug!(
        "microlp model: {} columns, {} rows",
        vars.len(),
        program.constraints.len()
    );

    match model.solve() {
        Ok(solution) => {
            let values: Vec<f64> = vars.iter().map(|&v| solution.value(v)).collect();
            let objective = program.objective_value(&values);
            BackendOutcome::Optimal { values, objective }
        }
        Err(ResolutionError::Infeasible) => BackendOutcome::Infeasible,
        Err(e) => BackendOutcome::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::{ConstraintFamily, LinearConstraint};

    fn assignment(name: &str, terms: Vec<(usize, f64)>) -> LinearConstraint {
        LinearConstraint {
            name: name.into(),
            family: ConstraintFamily::Assignment,
            terms,
            sense: Sense::Eq,
            rhs: 1.0,
        }
    }

    #[test]
    fn test_microlp_picks_cheapest_column() {
        let program = LinearProgram {
            objective: vec![20.0, 5.0],
            constraints: vec![assignment("assign[S]", vec![(0, 1.0), (1, 1.0)])],
        };
        match MicrolpBackend::new().solve(&program, Some(Duration::from_secs(30))) {
            BackendOutcome::Optimal { values, objective } => {
                assert!(values[1] > 0.5);
                assert!(values[0] < 0.5);
                assert!((objective - 5.0).abs() < 1e-6);
            }
            other => panic!("expected optimum, got {other:?}"),
        }
    }

    #[test]
    fn test_budget_expires_before_slow_job() {
        let outcome = run_with_budget(Some(Duration::from_millis(20)), || {
            thread::sleep(Duration::from_millis(500));
            BackendOutcome::Infeasible
        });
        assert_eq!(outcome, BackendOutcome::TimedOut);
    }

    #[test]
    fn test_budget_returns_finished_job() {
        let outcome = run_with_budget(Some(Duration::from_secs(30)), || BackendOutcome::Infeasible);
        assert_eq!(outcome, BackendOutcome::Infeasible);
    }

    #[test]
    fn test_panicked_job_is_error() {
        let outcome = run_with_budget(None, || panic!("solver crashed"));
        assert!(matches!(outcome, BackendOutcome::Error(_)));
    }

    #[test]
    fn test_microlp_reports_infeasible() {
        // x0 = 1 and x0 <= 0
        let program = LinearProgram {
            objective: vec![1.0],
            constraints: vec![
                assignment("assign[S]", vec![(0, 1.0)]),
                LinearConstraint {
                    name: "capacity[S,R]".into(),
                    family: ConstraintFamily::Capacity,
                    terms: vec![(0, 40.0)],
                    sense: Sense::Le,
                    rhs: 30.0,
                },
            ],
        };
        assert_eq!(
            MicrolpBackend::new().solve(&program, None),
            BackendOutcome::Infeasible
        );
    }
}
