//! Greedy single-pass allocation.
//!
//! # Algorithm
//!
//! 1. Bind the rule to the sections' location locks, then order sections by
//!    the configured [`OrderingPolicy`] (ties by id).
//! 2. For each section, consider rooms that are compatible, large enough and
//!    free in every one of the section's slots.
//! 3. Take the room with the fewest idle seats (then lowest extra cost, then
//!    id) and commit its (room, slot) pairs.
//! 4. Sections without a remaining room are left unplaced and classified:
//!    no compatible room, every compatible room too small, or every fitting
//!    room already taken in one of their slots.
//!
//! # Complexity
//! O(n log n + n·m·k) where n=sections, m=rooms, k=slots per section.
//!
//! # Reference
//! Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};

use super::{AllocationStrategy, SolveOutcome};
use crate::compatibility::{with_section_locks, CompatibilityRule, StrictCompatibility};
use crate::config::{GreedyConfig, OrderingPolicy};
use crate::error::Result;
use crate::models::{AllocationStatus, Diagnostic, Placement, Room, Section, Slot};
use crate::progress::{ProgressSink, Stage};

/// Deterministic greedy allocator.
///
/// Returns a partial result instead of failing when some sections cannot be
/// placed.
///
/// # Example
/// ```
/// use u_roomalloc::models::{AllocationStatus, Room, Section};
/// use u_roomalloc::solver::{AllocationStrategy, GreedySolver};
///
/// let sections = vec![Section::new("A", 20, "2M12"), Section::new("B", 25, "2M12")];
/// let rooms = vec![Room::classroom("R1", 30)];
///
/// let result = GreedySolver::new().allocate(&sections, &rooms).unwrap();
/// assert_eq!(result.status, AllocationStatus::Partial);
/// assert_eq!(result.room_for("B").unwrap().id, "R1");
/// assert_eq!(result.unplaced, vec!["A".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct GreedySolver {
    config: GreedyConfig,
    rule: Arc<dyn CompatibilityRule>,
}

impl Default for GreedySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GreedySolver {
    /// Strict compatibility, largest enrollment first.
    pub fn new() -> Self {
        Self {
            config: GreedyConfig::default(),
            rule: Arc::new(StrictCompatibility::new()),
        }
    }

    pub fn with_config(mut self, config: GreedyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.config.ordering = ordering;
        self
    }

    pub fn with_compatibility(self, rule: impl CompatibilityRule + 'static) -> Self {
        self.with_shared_compatibility(Arc::new(rule))
    }

    pub fn with_shared_compatibility(mut self, rule: Arc<dyn CompatibilityRule>) -> Self {
        self.rule = rule;
        self
    }

    /// Rooms that are compatible and large enough, ignoring time.
    fn fitting_rooms(rule: &dyn CompatibilityRule, section: &Section, rooms: &[Room]) -> Vec<usize> {
        rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| r.capacity >= section.enrollment() && rule.is_compatible(section, r))
            .map(|(ri, _)| ri)
            .collect()
    }

    /// Section indices in placement order.
    fn order(&self, sections: &[Section], fitting: &[Vec<usize>]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..sections.len()).collect();
        match self.config.ordering {
            OrderingPolicy::LargestEnrollmentFirst => order.sort_by_key(|&si| {
                (Reverse(sections[si].enrollment()), sections[si].id())
            }),
            OrderingPolicy::MostConstrainedFirst => order.sort_by_key(|&si| {
                (
                    fitting[si].len(),
                    Reverse(sections[si].enrollment()),
                    sections[si].id(),
                )
            }),
        }
        order
    }
}

impl AllocationStrategy for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
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
        progress.on_progress(Stage::Solving, 30);
        let rule = with_section_locks(self.rule.clone(), sections);
        let fitting: Vec<Vec<usize>> = sections
            .iter()
            .map(|s| Self::fitting_rooms(rule.as_ref(), s, rooms))
            .collect();
        let order = self.order(sections, &fitting);

        let mut committed: HashSet<(usize, Slot)> = HashSet::new();
        let mut placements = Vec::with_capacity(sections.len());
        let mut unplaced = Vec::new();

        for (done, &si) in order.iter().enumerate() {
            let section = &sections[si];
            let best = fitting[si]
                .iter()
                .copied()
                .filter(|&ri| {
                    section
                        .timed_slots()
                        .all(|slot| !committed.contains(&(ri, *slot)))
                })
                .min_by(|&a, &b| {
                    let (ra, rb) = (&rooms[a], &rooms[b]);
                    ra.capacity
                        .cmp(&rb.capacity)
                        .then(ra.extra_cost.total_cmp(&rb.extra_cost))
                        .then_with(|| ra.id.cmp(&rb.id))
                });

            match best {
                Some(ri) => {
                    for slot in section.timed_slots() {
                        committed.insert((ri, *slot));
                    }
                    debug!("{} -> {}", section.id(), rooms[ri].id);
                    placements.push(Placement::new(section.id(), rooms[ri].id.as_str()));
                }
                None => unplaced.push(si),
            }

            if !sections.is_empty() {
                let pct = 30 + (done + 1) * 50 / sections.len();
                progress.on_progress(Stage::Solving, pct as u8);
            }
        }

        info!(
            "greedy: placed {}/{} sections",
            placements.len(),
            sections.len()
        );
        if unplaced.is_empty() {
            return Ok(SolveOutcome::complete(self.name(), rule, placements));
        }

        unplaced.sort_unstable();
        let ids = |pred: &dyn Fn(usize) -> bool| -> Vec<String> {
            unplaced
                .iter()
                .copied()
                .filter(|&si| pred(si))
                .map(|si| sections[si].id().to_string())
                .collect()
        };
        let no_room = ids(&|si| rule.candidates(&sections[si], rooms).is_empty());
        let too_small = ids(&|si| {
            fitting[si].is_empty() && !rule.candidates(&sections[si], rooms).is_empty()
        });
        warn!(
            "greedy left {} sections unplaced: {:?}",
            unplaced.len(),
            ids(&|_| true)
        );

        let mut diagnostics = Vec::new();
        if !no_room.is_empty() {
            diagnostics.push(Diagnostic::NoCompatibleRoom {
                section_ids: no_room,
            });
        }
        if !too_small.is_empty() {
            diagnostics.push(Diagnostic::CapacityShortfall {
                section_ids: too_small,
            });
        }
        for &si in unplaced.iter().filter(|&&si| !fitting[si].is_empty()) {
            diagnostics.push(rooms_exhausted(&sections[si], &fitting[si], rooms, &committed));
        }

        Ok(SolveOutcome {
            strategy: self.name(),
            rule,
            status: AllocationStatus::Partial,
            placements,
            diagnostics,
        })
    }
}

/// Names the first slot in which every fitting room was already taken.
fn rooms_exhausted(
    section: &Section,
    fitting: &[usize],
    rooms: &[Room],
    committed: &HashSet<(usize, Slot)>,
) -> Diagnostic {
    let slot = section
        .timed_slots()
        .find(|slot| fitting.iter().all(|&ri| committed.contains(&(ri, **slot))))
        .or_else(|| section.timed_slots().next())
        .copied()
        .unwrap_or(Slot::Unscheduled);
    Diagnostic::RoomsExhausted {
        slot,
        section_ids: vec![section.id().to_string()],
        room_ids: fitting.iter().map(|&ri| rooms[ri].id.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::FlexibleCompatibility;
    use crate::models::Equipment;
    use crate::progress::NoProgress;

    fn run(solver: &GreedySolver, sections: &[Section], rooms: &[Room]) -> SolveOutcome {
        solver.solve(sections, rooms, &mut NoProgress).unwrap()
    }

    fn room_of<'o>(outcome: &'o SolveOutcome, section: &str) -> Option<&'o str> {
        outcome
            .placements
            .iter()
            .find(|p| p.section_id == section)
            .map(|p| p.room_id.as_str())
    }

    #[test]
    fn test_tightest_room_chosen() {
        let sections = vec![Section::new("A", 28, "2M1")];
        let rooms = vec![
            Room::classroom("R50", 50),
            Room::classroom("R30", 30),
            Room::classroom("R20", 20),
        ];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(outcome.status, AllocationStatus::Success);
        assert_eq!(room_of(&outcome, "A"), Some("R30"));
    }

    #[test]
    fn test_extra_cost_breaks_ties() {
        let sections = vec![Section::new("A", 28, "2M1")];
        let rooms = vec![
            Room::classroom("FAR", 30).with_extra_cost(10.0),
            Room::classroom("NEAR", 30),
        ];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(room_of(&outcome, "A"), Some("NEAR"));
    }

    #[test]
    fn test_committed_slots_block_room() {
        let sections = vec![
            Section::new("BIG", 30, "2M12"),
            Section::new("SMALL", 20, "2M2"),
            Section::new("OTHER", 20, "3M1"),
        ];
        let rooms = vec![Room::classroom("R30", 30), Room::classroom("R60", 60)];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(room_of(&outcome, "BIG"), Some("R30"));
        assert_eq!(room_of(&outcome, "SMALL"), Some("R60"));
        // Different day: R30 is free again
        assert_eq!(room_of(&outcome, "OTHER"), Some("R30"));
    }

    #[test]
    fn test_overlap_partial_result() {
        let sections = vec![Section::new("A", 20, "2M12"), Section::new("B", 20, "2M12")];
        let rooms = vec![Room::classroom("R1", 30)];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(outcome.status, AllocationStatus::Partial);
        assert_eq!(outcome.placements, vec![Placement::new("A", "R1")]);
    }

    #[test]
    fn test_unplaced_classified() {
        let sections = vec![
            Section::new("ROB", 10, "2M1").with_equipment(Equipment::Robotics),
            Section::new("HUGE", 100, "2M1"),
        ];
        let rooms = vec![Room::classroom("R1", 30)];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert!(outcome.placements.is_empty());
        assert_eq!(
            outcome.diagnostics,
            vec![
                Diagnostic::NoCompatibleRoom {
                    section_ids: vec!["ROB".into()]
                },
                Diagnostic::CapacityShortfall {
                    section_ids: vec!["HUGE".into()]
                },
            ]
        );
    }

    #[test]
    fn test_taken_rooms_named() {
        let sections = vec![
            Section::new("A", 25, "2M12"),
            Section::new("B", 20, "2M2 3M1"),
            Section::new("C", 10, "4T1"),
        ];
        let rooms = vec![Room::classroom("R1", 30)];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(outcome.status, AllocationStatus::Partial);
        assert_eq!(room_of(&outcome, "C"), Some("R1"));
        let b = &sections[1];
        let taken = *b.timed_slots().next().unwrap();
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::RoomsExhausted {
                slot: taken,
                section_ids: vec!["B".into()],
                room_ids: vec!["R1".into()],
            }]
        );
    }

    #[test]
    fn test_locked_building_reserved() {
        let sections = vec![
            Section::new("IF001", 20, "2M12").with_location_lock("IF"),
            Section::new("MAT001", 30, "3M12"),
        ];
        let rooms = vec![
            Room::classroom("IF101", 30).with_location("IF"),
            Room::classroom("IC101", 100).with_location("IC"),
        ];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(outcome.status, AllocationStatus::Success);
        assert_eq!(room_of(&outcome, "IF001"), Some("IF101"));
        assert_eq!(room_of(&outcome, "MAT001"), Some("IC101"));
    }

    #[test]
    fn test_most_constrained_first() {
        // LAB is the only room COMP fits; largest-first would give it to MAT.
        let sections = vec![
            Section::new("MAT", 30, "2M1"),
            Section::new("COMP", 20, "2M1").with_equipment(Equipment::Computers),
        ];
        let rooms = vec![
            Room::lab("LAB", 30, Equipment::Computers),
            Room::classroom("C1", 40),
        ];

        let largest = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(room_of(&largest, "MAT"), Some("LAB"));
        assert_eq!(largest.status, AllocationStatus::Partial);

        let constrained = run(
            &GreedySolver::new().with_ordering(OrderingPolicy::MostConstrainedFirst),
            &sections,
            &rooms,
        );
        assert_eq!(constrained.status, AllocationStatus::Success);
        assert_eq!(room_of(&constrained, "COMP"), Some("LAB"));
        assert_eq!(room_of(&constrained, "MAT"), Some("C1"));
    }

    #[test]
    fn test_flexible_rule_widens_pool() {
        let sections = vec![Section::new("ROB", 10, "2M1").with_equipment(Equipment::Robotics)];
        let rooms = vec![Room::classroom("R1", 30)];
        let solver = GreedySolver::new().with_compatibility(
            FlexibleCompatibility::new(StrictCompatibility::new()).with_optional(Equipment::Robotics),
        );
        let outcome = run(&solver, &sections, &rooms);
        assert_eq!(outcome.status, AllocationStatus::Success);
        assert_eq!(outcome.rule.name(), "flexible");
    }

    #[test]
    fn test_unscheduled_sections_share_room() {
        let sections = vec![Section::new("A", 10, "???"), Section::new("B", 10, "???")];
        let rooms = vec![Room::classroom("R1", 30)];
        let outcome = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(outcome.status, AllocationStatus::Success);
        assert_eq!(outcome.placements.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let sections = vec![
            Section::new("B", 20, "2M1"),
            Section::new("A", 20, "2M1"),
            Section::new("C", 25, "2M1"),
        ];
        let rooms = vec![Room::classroom("R1", 30), Room::classroom("R2", 30)];
        let first = run(&GreedySolver::new(), &sections, &rooms);
        let second = run(&GreedySolver::new(), &sections, &rooms);
        assert_eq!(first.placements, second.placements);
        // C first (largest), then A before B by id
        assert_eq!(first.placements[0], Placement::new("C", "R1"));
        assert_eq!(first.placements[1], Placement::new("A", "R2"));
        assert_eq!(first.status, AllocationStatus::Partial);
    }
}
