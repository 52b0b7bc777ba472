//! Hard failures of an allocation run.
//!
//! Expected outcomes (rejected input, infeasibility, time-outs) are reported
//! as [`AllocationStatus`](crate::models::AllocationStatus) values, not errors.
//! An `AllocError` always means something went wrong that the caller cannot
//! fix by changing the data: a broken backend or a result that failed
//! re-validation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocError {
    // Backend crash, unexpected optimizer status or malformed raw solution
    #[error("Solver error in {backend}: {message}")]
    Solver { backend: String, message: String },

    // Post-hoc re-validation rejected an accepted solution
    #[error("Allocation from {strategy} failed validation: {}", violations.join("; "))]
    Validation {
        strategy: String,
        violations: Vec<String>,
    },

    // Data source errors
    #[error("Data source error: {0}")]
    Source(String),
}

impl AllocError {
    pub(crate) fn solver(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Solver {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether this error reports a defect in a produced solution.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, AllocError>;
