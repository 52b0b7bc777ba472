//! Allocation strategies.
//!
//! Every strategy implements [`AllocationStrategy`] and is chosen at
//! construction time:
//!
//! - [`ExactSolver`]: builds the binary model and hands it to a
//!   [`MilpBackend`] with a time budget. Atomic: anything but an optimal
//!   solution yields no allocations.
//! - [`GreedySolver`]: deterministic single pass, no external solver. May
//!   leave sections unplaced.
//! - [`FallbackSolver`]: exact first, greedy when the exact backend times out
//!   or fails.
//!
//! Strategies only produce raw [`Placement`]s. Turning them into typed
//! allocations and checking them is done by [`crate::allocate`], the same
//! way for every strategy.

mod backend;
mod exact;
pub mod extract;
mod fallback;
mod greedy;

pub use backend::{BackendOutcome, MicrolpBackend, MilpBackend};
pub use exact::ExactSolver;
pub use extract::SolutionExtractor;
pub use fallback::FallbackSolver;
pub use greedy::GreedySolver;

use std::fmt::Debug;
use std::sync::Arc;

use crate::compatibility::CompatibilityRule;
use crate::error::Result;
use crate::models::{AllocationResult, AllocationStatus, Diagnostic, Placement, Room, Section};
use crate::progress::ProgressSink;

/// An interchangeable allocation algorithm.
pub trait AllocationStrategy: Send + Sync + Debug {
    /// Strategy name (e.g., "exact").
    fn name(&self) -> &'static str;

    /// Rule used to prune (section, room) pairs.
    fn compatibility(&self) -> &dyn CompatibilityRule;

    /// Computes raw placements for the given input.
    ///
    /// Input is assumed valid (see [`crate::validation::validate_input`]).
    fn solve(
        &self,
        sections: &[Section],
        rooms: &[Room],
        progress: &mut dyn ProgressSink,
    ) -> Result<SolveOutcome>;

    /// Runs a full allocation (validate, solve, extract, re-validate).
    fn allocate<'a>(
        &self,
        sections: &'a [Section],
        rooms: &'a [Room],
    ) -> Result<AllocationResult<'a>>
    where
        Self: Sized,
    {
        crate::allocate(sections, rooms, self)
    }
}

/// Raw output of one strategy run.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Name of the strategy that actually produced the placements.
    pub strategy: &'static str,
    /// Rule the placements were computed under.
    pub rule: Arc<dyn CompatibilityRule>,
    pub status: AllocationStatus,
    pub placements: Vec<Placement>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SolveOutcome {
    /// Every section placed.
    pub fn complete(
        strategy: &'static str,
        rule: Arc<dyn CompatibilityRule>,
        placements: Vec<Placement>,
    ) -> Self {
        Self {
            strategy,
            rule,
            status: AllocationStatus::Success,
            placements,
            diagnostics: Vec::new(),
        }
    }

    /// No placements, only a status and its explanation.
    pub fn failed(
        strategy: &'static str,
        rule: Arc<dyn CompatibilityRule>,
        status: AllocationStatus,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            strategy,
            rule,
            status,
            placements: Vec::new(),
            diagnostics,
        }
    }
}
