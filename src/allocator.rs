//! The allocation entry point.
//!
//! # Pipeline
//!
//! 1. Validate input. Blocking issues end the run with `InvalidInput`.
//! 2. Run the strategy to get raw placements.
//! 3. Resolve placements against the inputs ([`SolutionExtractor`]).
//! 4. Compute metrics and re-check every hard constraint
//!    ([`MetricsEngine`]) against the strategy's rule bound to the sections'
//!    location locks. A failed check is an [`AllocError::Validation`].
//!
//! The same steps 1, 3 and 4 apply to every strategy.

use log::{info, warn};

use crate::compatibility::with_section_locks;
use crate::error::{AllocError, Result};
use crate::metrics::MetricsEngine;
use crate::models::{Allocation, AllocationResult, AllocationStatus, Diagnostic, Room, Section};
use crate::progress::{NoProgress, Outcome, ProgressSink, Stage};
use crate::solver::{AllocationStrategy, SolutionExtractor};
use crate::validation::validate_input;

/// Allocates `sections` to `rooms` with `strategy`.
///
/// Infeasibility, rejected input and time-outs are returned as result
/// statuses. `Err` means a backend failure or a result that violates a hard
/// constraint.
///
/// # Example
/// ```
/// use u_roomalloc::allocate;
/// use u_roomalloc::models::{Equipment, Room, Section};
/// use u_roomalloc::solver::ExactSolver;
///
/// let sections = vec![Section::new("S1", 25, "2M12").with_equipment(Equipment::Computers)];
/// let rooms = vec![Room::lab("L1", 30, Equipment::Computers)];
///
/// let result = allocate(&sections, &rooms, &ExactSolver::new()).unwrap();
/// assert_eq!(result.allocations.len(), 1);
/// assert_eq!(result.allocations[0].idle_capacity(), 5);
/// ```
pub fn allocate<'a>(
    sections: &'a [Section],
    rooms: &'a [Room],
    strategy: &dyn AllocationStrategy,
) -> Result<AllocationResult<'a>> {
    allocate_with_progress(sections, rooms, strategy, &mut NoProgress)
}

/// [`allocate`] with progress notifications.
pub fn allocate_with_progress<'a>(
    sections: &'a [Section],
    rooms: &'a [Room],
    strategy: &dyn AllocationStrategy,
    progress: &mut dyn ProgressSink,
) -> Result<AllocationResult<'a>> {
    let result = run(sections, rooms, strategy, progress);
    match &result {
        Ok(r) => progress.on_finished(Outcome::Success(r)),
        Err(e) => progress.on_finished(Outcome::Failure(e)),
    }
    result
}

fn run<'a>(
    sections: &'a [Section],
    rooms: &'a [Room],
    strategy: &dyn AllocationStrategy,
    progress: &mut dyn ProgressSink,
) -> Result<AllocationResult<'a>> {
    progress.on_progress(Stage::Validating, 0);
    let warnings = match validate_input(sections, rooms) {
        Ok(warnings) => warnings,
        Err(issues) => {
            warn!("Input rejected with {} issues", issues.len());
            progress.on_progress(Stage::Finished, 100);
            return Ok(AllocationResult {
                strategy: strategy.name().to_string(),
                status: AllocationStatus::InvalidInput,
                allocations: Vec::new(),
                unplaced: sections.iter().map(|s| s.id().to_string()).collect(),
                diagnostics: issues.into_iter().map(Diagnostic::Input).collect(),
                metrics: MetricsEngine::evaluate(&[], sections, strategy.compatibility()),
            });
        }
    };
    for w in &warnings {
        warn!("{}", w.message);
    }

    let outcome = strategy.solve(sections, rooms, progress)?;

    progress.on_progress(Stage::Extracting, 80);
    let allocations =
        SolutionExtractor::new(sections, rooms).extract(outcome.strategy, &outcome.placements)?;

    progress.on_progress(Stage::Evaluating, 90);
    let rule = with_section_locks(outcome.rule.clone(), sections);
    let metrics = MetricsEngine::evaluate(&allocations, sections, rule.as_ref());
    let mut violations = metrics.violations();
    let unplaced = unplaced_ids(sections, &allocations);
    if let Some(v) = status_violation(outcome.status, &allocations, &unplaced) {
        violations.push(v);
    }
    if !violations.is_empty() {
        return Err(AllocError::Validation {
            strategy: outcome.strategy.to_string(),
            violations,
        });
    }

    let mut diagnostics: Vec<Diagnostic> = warnings.into_iter().map(Diagnostic::Input).collect();
    diagnostics.extend(outcome.diagnostics);

    info!(
        "{}: {:?}, {}/{} sections allocated, objective {:.2}",
        outcome.strategy,
        outcome.status,
        allocations.len(),
        sections.len(),
        metrics.objective_value
    );
    progress.on_progress(Stage::Finished, 100);

    Ok(AllocationResult {
        strategy: outcome.strategy.to_string(),
        status: outcome.status,
        allocations,
        unplaced,
        diagnostics,
        metrics,
    })
}

/// Ids of sections without an allocation, in input order.
fn unplaced_ids(sections: &[Section], allocations: &[Allocation<'_>]) -> Vec<String> {
    sections
        .iter()
        .filter(|s| !allocations.iter().any(|a| a.section.id() == s.id()))
        .map(|s| s.id().to_string())
        .collect()
}

/// Checks that a reported status agrees with the allocations.
fn status_violation(
    status: AllocationStatus,
    allocations: &[Allocation<'_>],
    unplaced: &[String],
) -> Option<String> {
    match status {
        AllocationStatus::Success if !unplaced.is_empty() => Some(format!(
            "status: Success reported with {} sections unplaced",
            unplaced.len()
        )),
        AllocationStatus::Infeasible
        | AllocationStatus::TimedOut
        | AllocationStatus::InvalidInput
            if !allocations.is_empty() =>
        {
            Some(format!(
                "status: {status:?} reported with {} allocations",
                allocations.len()
            ))
        }
        _ => None,
    }
}
