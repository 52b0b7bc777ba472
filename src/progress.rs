//! Progress notifications for allocation runs.
//!
//! A [`ProgressSink`] observes a run: ordered `(stage, percent)` updates
//! followed by exactly one terminal [`Outcome`]. Sinks are purely
//! observational; passing [`NoProgress`] changes nothing about the result.

use log::info;

use crate::error::AllocError;
use crate::models::AllocationResult;

/// Phases of one allocation run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Validating,
    BuildingModel,
    Solving,
    Extracting,
    Evaluating,
    Finished,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::BuildingModel => "building model",
            Stage::Solving => "solving",
            Stage::Extracting => "extracting",
            Stage::Evaluating => "evaluating",
            Stage::Finished => "finished",
        }
    }
}

/// Terminal notification of a run.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'r, 'a> {
    /// A result was produced (any status, including `Infeasible`).
    Success(&'r AllocationResult<'a>),
    /// The run failed with a hard error.
    Failure(&'r AllocError),
}

/// Receiver of progress notifications.
pub trait ProgressSink {
    /// Called as the run enters a stage or advances within it.
    fn on_progress(&mut self, stage: Stage, percent: u8);

    /// Called once when the run ends.
    fn on_finished(&mut self, _outcome: Outcome<'_, '_>) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _stage: Stage, _percent: u8) {}
}

/// Forwards notifications to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&mut self, stage: Stage, percent: u8) {
        info!("[{percent:>3}%] {}", stage.name());
    }

    fn on_finished(&mut self, outcome: Outcome<'_, '_>) {
        match outcome {
            Outcome::Success(result) => info!(
                "{}: {:?}, {} allocated, {} unplaced",
                result.strategy,
                result.status,
                result.allocation_count(),
                result.unplaced.len()
            ),
            Outcome::Failure(err) => info!("Allocation failed: {err}"),
        }
    }
}
