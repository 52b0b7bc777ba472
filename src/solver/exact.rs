//! Exact allocation via binary integer programming.
//!
//! # Algorithm
//!
//! 1. Bind the rule to the sections' location locks and build the model
//!    ([`AllocationModelBuilder`]).
//! 2. If some section has no candidate room, stop: the assignment row is
//!    unsatisfiable by construction.
//! 3. Hand the program to the backend with the configured time budget.
//! 4. Map the backend status: optimal → placements, infeasible → diagnosed
//!    causes, time-out → no certificate, crash → hard error.
//!
//! # Reference
//! Wolsey (2020), "Integer Programming", Ch. 1

use std::sync::Arc;

use log::{info, warn};

use super::{AllocationStrategy, BackendOutcome, MicrolpBackend, MilpBackend, SolveOutcome};
use crate::compatibility::{with_section_locks, CompatibilityRule, StrictCompatibility};
use crate::config::ExactConfig;
use crate::error::{AllocError, Result};
use crate::milp::AllocationModelBuilder;
use crate::models::{AllocationStatus, Diagnostic, Room, Section};
use crate::progress::{ProgressSink, Stage};

/// Optimal allocation through a MILP backend.
///
/// # Example
/// ```
/// use u_roomalloc::models::{AllocationStatus, Room, Section};
/// use u_roomalloc::solver::{AllocationStrategy, ExactSolver};
///
/// let sections = vec![Section::new("MAT001", 25, "2M12")];
/// let rooms = vec![Room::classroom("R1", 60), Room::classroom("R2", 30)];
///
/// let result = ExactSolver::new().allocate(&sections, &rooms).unwrap();
/// assert_eq!(result.status, AllocationStatus::Success);
/// assert_eq!(result.room_for("MAT001").unwrap().id, "R2");
/// ```
#[derive(Debug, Clone)]
pub struct ExactSolver {
    config: ExactConfig,
    rule: Arc<dyn CompatibilityRule>,
    backend: Arc<dyn MilpBackend>,
}

impl Default for ExactSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExactSolver {
    /// Strict compatibility, microlp backend, default time budget.
    pub fn new() -> Self {
        Self {
            config: ExactConfig::default(),
            rule: Arc::new(StrictCompatibility::new()),
            backend: Arc::new(MicrolpBackend::new()),
        }
    }

    pub fn with_config(mut self, config: ExactConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_compatibility(self, rule: impl CompatibilityRule + 'static) -> Self {
        self.with_shared_compatibility(Arc::new(rule))
    }

    pub fn with_shared_compatibility(mut self, rule: Arc<dyn CompatibilityRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_backend(mut self, backend: impl MilpBackend + 'static) -> Self {
        self.backend = Arc::new(backend);
        self
    }

    pub fn config(&self) -> &ExactConfig {
        &self.config
    }
}

impl AllocationStrategy for ExactSolver {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn compatibility(&self) -> &dyn CompatibilityRule {
        self.rule.as_ref()
    }

    fn solve(
        &self,
        sections: &[Section],
        rooms: &[Room],
        progress: &mut dyn ProgressSink,
    ) -> Result<SolveOutcome> {
        progress.on_progress(Stage::BuildingModel, 10);
        let rule = with_section_locks(self.rule.clone(), sections);
        let model = AllocationModelBuilder::new(sections, rooms, rule.as_ref()).build();

        if model.has_unassignable() {
            warn!(
                "Sections without any compatible room: {:?}",
                model.unassignable_sections()
            );
            return Ok(SolveOutcome::failed(
                self.name(),
                rule.clone(),
                AllocationStatus::Infeasible,
                model.diagnose(),
            ));
        }

        progress.on_progress(Stage::Solving, 30);
        let time_limit = self.config.time_limit();
        match self.backend.solve(model.program(), time_limit) {
            BackendOutcome::Optimal { values, objective } => {
                let placements = model.placements(&values);
                info!(
                    "{}: optimal objective {objective:.2}, {} placements",
                    self.backend.name(),
                    placements.len()
                );
                Ok(SolveOutcome::complete(self.name(), rule.clone(), placements))
            }
            BackendOutcome::Infeasible => {
                let diagnostics = model.diagnose();
                warn!("Model is infeasible: {} causes found", diagnostics.len());
                Ok(SolveOutcome::failed(
                    self.name(),
                    rule.clone(),
                    AllocationStatus::Infeasible,
                    diagnostics,
                ))
            }
            BackendOutcome::TimedOut => {
                let limit_ms = self.config.time_limit_ms.unwrap_or_default();
                Ok(SolveOutcome::failed(
                    self.name(),
                    rule.clone(),
                    AllocationStatus::TimedOut,
                    vec![Diagnostic::NoCertificate {
                        message: format!(
                            "{} stopped after {limit_ms} ms without proving optimality or infeasibility",
                            self.backend.name()
                        ),
                    }],
                ))
            }
            BackendOutcome::Error(message) => Err(AllocError::solver(self.backend.name(), message)),
        }
    }
}
