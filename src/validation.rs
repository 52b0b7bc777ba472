//! Input validation for allocation problems.
//!
//! Checks structural integrity of sections and rooms before any model is
//! built. Detects:
//! - Empty section or room collections
//! - Duplicate IDs
//! - Non-positive enrollment or capacity
//! - Negative or non-finite extra costs
//! - Sections whose schedule code decoded to `Unscheduled` (warning only)
//!
//! All issues are collected; validation never stops at the first one.

use crate::models::{Room, Section};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Validation result: every blocking issue on failure.
pub type ValidationResult = Result<Vec<InputIssue>, Vec<InputIssue>>;

/// One detected input problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputIssue {
    /// Issue category.
    pub kind: InputIssueKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of input issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputIssueKind {
    /// No sections to allocate.
    EmptySections,
    /// No rooms to allocate into.
    EmptyRooms,
    /// Two sections or two rooms share the same ID.
    DuplicateId,
    /// A section has zero enrolled students.
    NonPositiveEnrollment,
    /// A room has zero seats.
    NonPositiveCapacity,
    /// A room's extra cost is negative, NaN or infinite.
    InvalidExtraCost,
    /// A section's schedule code could not be decoded.
    UnscheduledSection,
}

impl InputIssueKind {
    /// Whether this issue prevents allocation.
    ///
    /// Unscheduled sections are still allocatable; they just never conflict.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, InputIssueKind::UnscheduledSection)
    }
}

impl InputIssue {
    fn new(kind: InputIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether this issue prevents allocation.
    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }
}

/// Validates the input collections of an allocation problem.
///
/// # Returns
/// `Ok(warnings)` if nothing blocks allocation, `Err(issues)` with every
/// detected issue (blocking and non-blocking) otherwise.
pub fn validate_input(sections: &[Section], rooms: &[Room]) -> ValidationResult {
    let mut issues = Vec::new();

    if sections.is_empty() {
        issues.push(InputIssue::new(
            InputIssueKind::EmptySections,
            "No sections to allocate",
        ));
    }
    if rooms.is_empty() {
        issues.push(InputIssue::new(
            InputIssueKind::EmptyRooms,
            "No rooms available",
        ));
    }

    let mut section_ids = HashSet::new();
    for s in sections {
        if !section_ids.insert(s.id()) {
            issues.push(InputIssue::new(
                InputIssueKind::DuplicateId,
                format!("Duplicate section ID: {}", s.id()),
            ));
        }
        if s.enrollment() == 0 {
            issues.push(InputIssue::new(
                InputIssueKind::NonPositiveEnrollment,
                format!("Section '{}' has no enrolled students", s.id()),
            ));
        }
        if s.is_unscheduled() {
            issues.push(InputIssue::new(
                InputIssueKind::UnscheduledSection,
                format!(
                    "Section '{}' has unrecognized schedule code '{}'",
                    s.id(),
                    s.schedule_code()
                ),
            ));
        }
    }

    let mut room_ids = HashSet::new();
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            issues.push(InputIssue::new(
                InputIssueKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
        if r.capacity == 0 {
            issues.push(InputIssue::new(
                InputIssueKind::NonPositiveCapacity,
                format!("Room '{}' has zero capacity", r.id),
            ));
        }
        if !r.extra_cost.is_finite() || r.extra_cost < 0.0 {
            issues.push(InputIssue::new(
                InputIssueKind::InvalidExtraCost,
                format!("Room '{}' has invalid extra cost {}", r.id, r.extra_cost),
            ));
        }
    }

    if issues.iter().any(InputIssue::is_blocking) {
        Err(issues)
    } else {
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Equipment;

    fn sample_sections() -> Vec<Section> {
        vec![
            Section::new("MAT001", 45, "2M12"),
            Section::new("COMP001", 30, "2T12").with_equipment(Equipment::Computers),
        ]
    }

    fn sample_rooms() -> Vec<Room> {
        vec![
            Room::classroom("IC101", 50).with_location("IC"),
            Room::lab("IC301", 35, Equipment::Computers).with_location("IC"),
        ]
    }

    #[test]
    fn test_valid_input() {
        let warnings = validate_input(&sample_sections(), &sample_rooms()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_collections() {
        let issues = validate_input(&[], &[]).unwrap_err();
        assert!(issues
            .iter()
            .any(|e| e.kind == InputIssueKind::EmptySections));
        assert!(issues.iter().any(|e| e.kind == InputIssueKind::EmptyRooms));
    }

    #[test]
    fn test_duplicate_section_id() {
        let sections = vec![Section::new("S1", 10, "2M1"), Section::new("S1", 20, "3M1")];
        let issues = validate_input(&sections, &sample_rooms()).unwrap_err();
        assert!(issues
            .iter()
            .any(|e| e.kind == InputIssueKind::DuplicateId && e.message.contains("section")));
    }

    #[test]
    fn test_duplicate_room_id() {
        let rooms = vec![Room::classroom("R1", 10), Room::classroom("R1", 20)];
        let issues = validate_input(&sample_sections(), &rooms).unwrap_err();
        assert!(issues
            .iter()
            .any(|e| e.kind == InputIssueKind::DuplicateId && e.message.contains("room")));
    }

    #[test]
    fn test_non_positive_values() {
        let sections = vec![Section::new("S1", 0, "2M1")];
        let rooms = vec![
            Room::classroom("R1", 0),
            Room::classroom("R2", 10).with_extra_cost(-1.0),
            Room::classroom("R3", 10).with_extra_cost(f64::NAN),
        ];
        let issues = validate_input(&sections, &rooms).unwrap_err();
        assert!(issues
            .iter()
            .any(|e| e.kind == InputIssueKind::NonPositiveEnrollment));
        assert!(issues
            .iter()
            .any(|e| e.kind == InputIssueKind::NonPositiveCapacity));
        assert_eq!(
            issues
                .iter()
                .filter(|e| e.kind == InputIssueKind::InvalidExtraCost)
                .count(),
            2
        );
    }

    #[test]
    fn test_unscheduled_is_warning_only() {
        let sections = vec![Section::new("S1", 10, "A DEFINIR")];
        let warnings = validate_input(&sections, &sample_rooms()).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, InputIssueKind::UnscheduledSection);
        assert!(!warnings[0].is_blocking());
    }

    #[test]
    fn test_multiple_errors() {
        let sections = vec![Section::new("S1", 0, "??"), Section::new("S1", 5, "2M1")];
        let issues = validate_input(&sections, &[]).unwrap_err();
        assert!(issues.len() >= 4);
    }
}
