//! Exact allocation with a greedy safety net.

use log::warn;

use super::{AllocationStrategy, ExactSolver, GreedySolver, SolveOutcome};
use crate::compatibility::CompatibilityRule;
use crate::error::Result;
use crate::models::{AllocationStatus, Room, Section};
use crate::progress::ProgressSink;

/// Runs [`ExactSolver`]; on a time-out or backend error, runs
/// [`GreedySolver`] instead.
///
/// A proven infeasibility is returned as is: the greedy pass could not do
/// better than leave the same sections unplaced.
#[derive(Debug, Clone, Default)]
pub struct FallbackSolver {
    exact: ExactSolver,
    greedy: GreedySolver,
}

impl FallbackSolver {
    pub fn new(exact: ExactSolver, greedy: GreedySolver) -> Self {
        Self { exact, greedy }
    }
}

impl AllocationStrategy for FallbackSolver {
    fn name(&self) -> &'static str {
        "exact-then-greedy"
    }

    fn compatibility(&self) -> &dyn CompatibilityRule {
        self.exact.compatibility()
    }

    fn solve(
        &self,
        sections: &[Section],
        rooms: &[Room],
        progress: &mut dyn ProgressSink,
    ) -> Result<SolveOutcome> {
        match self.exact.solve(sections, rooms, progress) {
            Ok(outcome) if outcome.status != AllocationStatus::TimedOut => Ok(outcome),
            Ok(_) => {
                warn!("Exact backend timed out; falling back to greedy");
                self.greedy.solve(sections, rooms, progress)
            }
            Err(e) => {
                warn!("Exact backend failed ({e}); falling back to greedy");
                self.greedy.solve(sections, rooms, progress)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::LinearProgram;
    use crate::progress::NoProgress;
    use crate::solver::{BackendOutcome, MilpBackend};
    use std::time::Duration;

    #[derive(Debug)]
    struct FixedBackend(BackendOutcome);

    impl MilpBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(&self, _program: &LinearProgram, _limit: Option<Duration>) -> BackendOutcome {
            self.0.clone()
        }
    }

    fn sections() -> Vec<Section> {
        vec![Section::new("A", 20, "2M1"), Section::new("B", 20, "3M1")]
    }

    fn rooms() -> Vec<Room> {
        vec![Room::classroom("R1", 30)]
    }

    #[test]
    fn test_falls_back_on_timeout() {
        let solver = FallbackSolver::new(
            ExactSolver::new().with_backend(FixedBackend(BackendOutcome::TimedOut)),
            GreedySolver::new(),
        );
        let outcome = solver.solve(&sections(), &rooms(), &mut NoProgress).unwrap();
        assert_eq!(outcome.strategy, "greedy");
        assert_eq!(outcome.status, AllocationStatus::Success);
    }

    #[test]
    fn test_falls_back_on_error() {
        let solver = FallbackSolver::new(
            ExactSolver::new().with_backend(FixedBackend(BackendOutcome::Error("x".into()))),
            GreedySolver::new(),
        );
        let outcome = solver.solve(&sections(), &rooms(), &mut NoProgress).unwrap();
        assert_eq!(outcome.strategy, "greedy");
    }

    #[test]
    fn test_keeps_exact_result() {
        let solver = FallbackSolver::default();
        let outcome = solver.solve(&sections(), &rooms(), &mut NoProgress).unwrap();
        assert_eq!(outcome.strategy, "exact");
        assert_eq!(outcome.status, AllocationStatus::Success);

        let clash = vec![Section::new("A", 20, "2M1"), Section::new("B", 20, "2M1")];
        let infeasible = solver.solve(&clash, &rooms(), &mut NoProgress).unwrap();
        assert_eq!(infeasible.strategy, "exact");
        assert_eq!(infeasible.status, AllocationStatus::Infeasible);
    }
}
