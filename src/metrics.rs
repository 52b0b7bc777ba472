//! Allocation quality metrics and constraint re-validation.
//!
//! Computed purely from the allocation list and the input sections, never
//! from solver state. The constraint checks are the correctness oracle for
//! every strategy.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Utilization mean | Mean of `enrollment / capacity * 100` |
//! | Utilization variance | Sample variance (n-1) of the above |
//! | Idle capacity | Σ `capacity - enrollment` |
//! | Allocation rate | `allocations / sections * 100` |
//! | Total cost | Σ extra cost over distinct rooms used |
//! | Objective value | Σ (idle + extra cost) per allocation |
//!
//! # Checks
//!
//! | Name | Condition |
//! |------|-----------|
//! | `assignment_uniqueness` | No section allocated twice |
//! | `capacity` | `enrollment <= capacity` |
//! | `compatibility` | The strategy's rule accepts every pair |
//! | `slot_conflicts` | No two allocations share a (room, slot) |

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::compatibility::CompatibilityRule;
use crate::models::{Allocation, Section, Slot};

pub const CHECK_UNIQUENESS: &str = "assignment_uniqueness";
pub const CHECK_CAPACITY: &str = "capacity";
pub const CHECK_COMPATIBILITY: &str = "compatibility";
pub const CHECK_SLOT_CONFLICTS: &str = "slot_conflicts";

/// Result of one constraint check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCheck {
    pub ok: bool,
    /// "ok", or the violations found.
    pub message: String,
}

impl ConstraintCheck {
    fn from_violations(violations: Vec<String>) -> Self {
        if violations.is_empty() {
            Self {
                ok: true,
                message: "ok".to_string(),
            }
        } else {
            Self {
                ok: false,
                message: violations.join("; "),
            }
        }
    }
}

/// Per-room summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUsage {
    /// Sections hosted.
    pub sections: usize,
    /// Students hosted across all sections.
    pub students: u64,
    pub mean_utilization_pct: f64,
}

/// Allocation performance indicators and constraint checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub utilization_mean: f64,
    pub utilization_variance: f64,
    pub idle_capacity_total: i64,
    pub allocation_rate_pct: f64,
    /// Σ extra cost, each used room counted once.
    pub total_cost: f64,
    pub distinct_rooms_used: usize,
    /// Σ (idle + extra cost) per allocation; the exact model's objective.
    pub objective_value: f64,
    /// Allocations in rooms with a positive extra cost.
    pub secondary_campus_allocations: usize,
    pub room_usage: BTreeMap<String, RoomUsage>,
    pub constraints_satisfied: bool,
    pub per_constraint: BTreeMap<String, ConstraintCheck>,
}

impl MetricsReport {
    /// Messages of the failed checks, prefixed by check name.
    pub fn violations(&self) -> Vec<String> {
        self.per_constraint
            .iter()
            .filter(|(_, c)| !c.ok)
            .map(|(name, c)| format!("{name}: {}", c.message))
            .collect()
    }
}

/// Stateless metrics calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine;

impl MetricsEngine {
    /// Computes metrics and checks from allocations.
    ///
    /// # Arguments
    /// * `allocations` - The produced allocations.
    /// * `sections` - All input sections (for the allocation rate).
    /// * `rule` - The compatibility rule the allocations were computed under.
    pub fn evaluate(
        allocations: &[Allocation<'_>],
        sections: &[Section],
        rule: &dyn CompatibilityRule,
    ) -> MetricsReport {
        let n = allocations.len();
        let utilizations: Vec<f64> = allocations.iter().map(Allocation::utilization_pct).collect();
        let utilization_mean = if n == 0 {
            0.0
        } else {
            utilizations.iter().sum::<f64>() / n as f64
        };
        let utilization_variance = if n < 2 {
            0.0
        } else {
            utilizations
                .iter()
                .map(|u| (u - utilization_mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64
        };

        let allocation_rate_pct = if sections.is_empty() {
            0.0
        } else {
            n as f64 / sections.len() as f64 * 100.0
        };

        // Distinct rooms in first-use order keeps the cost sum deterministic.
        let mut seen_rooms = HashSet::new();
        let mut total_cost = 0.0;
        for a in allocations {
            if seen_rooms.insert(a.room.id.as_str()) {
                total_cost += a.room.extra_cost;
            }
        }

        let mut room_usage: BTreeMap<String, RoomUsage> = BTreeMap::new();
        for a in allocations {
            let usage = room_usage.entry(a.room.id.clone()).or_insert(RoomUsage {
                sections: 0,
                students: 0,
                mean_utilization_pct: 0.0,
            });
            usage.sections += 1;
            usage.students += u64::from(a.section.enrollment());
            usage.mean_utilization_pct += a.utilization_pct();
        }
        for usage in room_usage.values_mut() {
            usage.mean_utilization_pct /= usage.sections as f64;
        }

        let mut per_constraint = BTreeMap::new();
        per_constraint.insert(CHECK_UNIQUENESS.to_string(), check_uniqueness(allocations));
        per_constraint.insert(CHECK_CAPACITY.to_string(), check_capacity(allocations));
        per_constraint.insert(
            CHECK_COMPATIBILITY.to_string(),
            check_compatibility(allocations, rule),
        );
        per_constraint.insert(
            CHECK_SLOT_CONFLICTS.to_string(),
            check_slot_conflicts(allocations),
        );
        let constraints_satisfied = per_constraint.values().all(|c| c.ok);

        MetricsReport {
            utilization_mean,
            utilization_variance,
            idle_capacity_total: allocations.iter().map(Allocation::idle_capacity).sum(),
            allocation_rate_pct,
            total_cost,
            distinct_rooms_used: seen_rooms.len(),
            objective_value: allocations.iter().map(Allocation::cost).sum(),
            secondary_campus_allocations: allocations
                .iter()
                .filter(|a| a.room.is_secondary_campus())
                .count(),
            room_usage,
            constraints_satisfied,
            per_constraint,
        }
    }
}

fn check_uniqueness(allocations: &[Allocation<'_>]) -> ConstraintCheck {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for a in allocations {
        *counts.entry(a.section.id()).or_default() += 1;
    }
    ConstraintCheck::from_violations(
        counts
            .into_iter()
            .filter(|&(_, c)| c > 1)
            .map(|(id, c)| format!("section {id} allocated {c} times"))
            .collect(),
    )
}

fn check_capacity(allocations: &[Allocation<'_>]) -> ConstraintCheck {
    ConstraintCheck::from_violations(
        allocations
            .iter()
            .filter(|a| a.idle_capacity() < 0)
            .map(|a| {
                format!(
                    "section {} ({} students) exceeds room {} ({} seats)",
                    a.section.id(),
                    a.section.enrollment(),
                    a.room.id,
                    a.room.capacity
                )
            })
            .collect(),
    )
}

fn check_compatibility(
    allocations: &[Allocation<'_>],
    rule: &dyn CompatibilityRule,
) -> ConstraintCheck {
    ConstraintCheck::from_violations(
        allocations
            .iter()
            .filter(|a| !rule.is_compatible(a.section, a.room))
            .map(|a| {
                format!(
                    "section {} is not {}-compatible with room {}",
                    a.section.id(),
                    rule.name(),
                    a.room.id
                )
            })
            .collect(),
    )
}

fn check_slot_conflicts(allocations: &[Allocation<'_>]) -> ConstraintCheck {
    let mut occupied: HashMap<(&str, Slot), &str> = HashMap::new();
    let mut violations = Vec::new();
    for a in allocations {
        for slot in a.section.timed_slots() {
            let key = (a.room.id.as_str(), *slot);
            match occupied.get(&key) {
                Some(&other) if other != a.section.id() => violations.push(format!(
                    "sections {other} and {} share room {} at {slot}",
                    a.section.id(),
                    a.room.id
                )),
                Some(_) => {}
                None => {
                    occupied.insert(key, a.section.id());
                }
            }
        }
    }
    ConstraintCheck::from_violations(violations)
}
