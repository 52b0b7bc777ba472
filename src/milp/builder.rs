//! Allocation model construction.
//!
//! # Formulation
//!
//! Variables: `x[s,r] ∈ {0,1}` for every compatible (section, room) pair.
//! Incompatible pairs get no column at all.
//!
//! Objective: `min Σ x[s,r] * ((cap[r] - enr[s]) + extra[r])`
//!
//! Constraints:
//! - Assignment: `Σ_r x[s,r] = 1` for every section (an empty row when the
//!   section has no candidates, which makes the model unsatisfiable)
//! - Capacity: `x[s,r] * enr[s] <= cap[r]`
//! - Time conflict: `Σ_s x[s,r] <= 1` for every (room, slot) shared by two or
//!   more candidate sections
//!
//! # Reference
//! Carter & Laporte (1998), "Recent Developments in Practical Course Timetabling"

use std::collections::{BTreeMap, HashSet};

use log::{debug, info, trace};

use super::{
    diagnose, ConstraintFamily, LinearConstraint, LinearProgram, PairKey, Sense, VariableIndex,
};
use crate::compatibility::CompatibilityRule;
use crate::models::{Diagnostic, Placement, Room, Section, Slot};

/// Builds the binary allocation program from sections, rooms and a rule.
///
/// The builder performs no solving.
///
/// # Example
/// ```
/// use u_roomalloc::compatibility::StrictCompatibility;
/// use u_roomalloc::milp::{AllocationModelBuilder, ConstraintFamily};
/// use u_roomalloc::models::{Room, Section};
///
/// let sections = vec![Section::new("A", 20, "2M12"), Section::new("B", 25, "2M2")];
/// let rooms = vec![Room::classroom("R1", 30), Room::classroom("R2", 40)];
/// let rule = StrictCompatibility::new();
/// let model = AllocationModelBuilder::new(&sections, &rooms, &rule).build();
///
/// assert_eq!(model.variable_count(), 4);
/// assert_eq!(model.program().count(ConstraintFamily::Assignment), 2);
/// ```
pub struct AllocationModelBuilder<'a> {
    sections: &'a [Section],
    rooms: &'a [Room],
    rule: &'a dyn CompatibilityRule,
}

impl<'a> AllocationModelBuilder<'a> {
    /// Creates a new builder.
    pub fn new(
        sections: &'a [Section],
        rooms: &'a [Room],
        rule: &'a dyn CompatibilityRule,
    ) -> Self {
        Self {
            sections,
            rooms,
            rule,
        }
    }

    /// Builds the model.
    pub fn build(&self) -> AllocationModel<'a> {
        let mut variables = VariableIndex::new();
        let mut objective = Vec::new();
        let mut by_section: Vec<Vec<usize>> = vec![Vec::new(); self.sections.len()];

        for (si, section) in self.sections.iter().enumerate() {
            for (ri, room) in self.rooms.iter().enumerate() {
                if !self.rule.is_compatible(section, room) {
                    continue;
                }
                let col = variables.insert(PairKey::new(si, ri));
                let coef = room.idle_capacity(section.enrollment()) as f64 + room.extra_cost;
                objective.push(coef);
                by_section[si].push(col);
                trace!("x[{},{}] -> column {col}, cost {coef}", section.id(), room.id);
            }
        }

        let unassignable: Vec<usize> = by_section
            .iter()
            .enumerate()
            .filter(|(_, cols)| cols.is_empty())
            .map(|(si, _)| si)
            .collect();

        let mut constraints = Vec::new();
        self.add_assignment_rows(&by_section, &mut constraints);
        self.add_capacity_rows(&variables, &mut constraints);
        self.add_conflict_rows(&variables, &mut constraints);

        let program = LinearProgram {
            objective,
            constraints,
        };

        info!(
            "Built allocation model: {} sections, {} rooms, {} variables, {} constraints",
            self.sections.len(),
            self.rooms.len(),
            program.num_vars(),
            program.constraints.len()
        );
        debug!(
            "Constraint families: assignment={}, capacity={}, conflict={}",
            program.count(ConstraintFamily::Assignment),
            program.count(ConstraintFamily::Capacity),
            program.count(ConstraintFamily::TimeConflict)
        );

        AllocationModel {
            sections: self.sections,
            rooms: self.rooms,
            variables,
            by_section,
            program,
            unassignable,
        }
    }

    fn add_assignment_rows(&self, by_section: &[Vec<usize>], out: &mut Vec<LinearConstraint>) {
        for (section, cols) in self.sections.iter().zip(by_section) {
            out.push(LinearConstraint {
                name: format!("assign[{}]", section.id()),
                family: ConstraintFamily::Assignment,
                terms: cols.iter().map(|&c| (c, 1.0)).collect(),
                sense: Sense::Eq,
                rhs: 1.0,
            });
        }
    }

    fn add_capacity_rows(&self, variables: &VariableIndex, out: &mut Vec<LinearConstraint>) {
        for (col, key) in variables.iter() {
            let section = &self.sections[key.section];
            let room = &self.rooms[key.room];
            out.push(LinearConstraint {
                name: format!("capacity[{},{}]", section.id(), room.id),
                family: ConstraintFamily::Capacity,
                terms: vec![(col, f64::from(section.enrollment()))],
                sense: Sense::Le,
                rhs: f64::from(room.capacity),
            });
        }
    }

    fn add_conflict_rows(&self, variables: &VariableIndex, out: &mut Vec<LinearConstraint>) {
        let groups = sections_by_slot(self.sections);
        let mut seen: HashSet<Vec<usize>> = HashSet::new();

        for (slot, members) in &groups {
            if members.len() < 2 {
                continue;
            }
            for (ri, room) in self.rooms.iter().enumerate() {
                let cols: Vec<usize> = members
                    .iter()
                    .filter_map(|&si| variables.column(PairKey::new(si, ri)))
                    .collect();
                // A single column is already bounded by binarity.
                if cols.len() < 2 || !seen.insert(cols.clone()) {
                    continue;
                }
                out.push(LinearConstraint {
                    name: format!("conflict[{},{}]", room.id, slot),
                    family: ConstraintFamily::TimeConflict,
                    terms: cols.into_iter().map(|c| (c, 1.0)).collect(),
                    sense: Sense::Le,
                    rhs: 1.0,
                });
            }
        }
    }
}

/// Groups section indices by the timed slots they occupy.
pub(crate) fn sections_by_slot(sections: &[Section]) -> BTreeMap<Slot, Vec<usize>> {
    let mut groups: BTreeMap<Slot, Vec<usize>> = BTreeMap::new();
    for (si, section) in sections.iter().enumerate() {
        for slot in section.timed_slots() {
            groups.entry(*slot).or_default().push(si);
        }
    }
    groups
}

/// A built allocation model, bound to its input collections.
#[derive(Debug, Clone)]
pub struct AllocationModel<'a> {
    sections: &'a [Section],
    rooms: &'a [Room],
    variables: VariableIndex,
    by_section: Vec<Vec<usize>>,
    program: LinearProgram,
    unassignable: Vec<usize>,
}

impl<'a> AllocationModel<'a> {
    /// The linear program to hand to a backend.
    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    /// Column ↔ (section, room) map.
    pub fn variables(&self) -> &VariableIndex {
        &self.variables
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn sections(&self) -> &'a [Section] {
        self.sections
    }

    pub fn rooms(&self) -> &'a [Room] {
        self.rooms
    }

    /// Columns of one section's candidate pairs.
    pub fn section_columns(&self, section: usize) -> &[usize] {
        self.by_section
            .get(section)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether some section has no candidate room, making the model
    /// unsatisfiable by construction.
    pub fn has_unassignable(&self) -> bool {
        !self.unassignable.is_empty()
    }

    /// Ids of sections without any compatible room.
    pub fn unassignable_sections(&self) -> Vec<&'a str> {
        let sections = self.sections;
        self.unassignable
            .iter()
            .map(|&si| sections[si].id())
            .collect()
    }

    /// Converts a column assignment into (section, room) placements.
    ///
    /// A column counts as selected when its value exceeds 0.5.
    pub fn placements(&self, values: &[f64]) -> Vec<Placement> {
        self.variables
            .iter()
            .filter(|(col, _)| values.get(*col).is_some_and(|v| *v > 0.5))
            .map(|(_, key)| {
                Placement::new(
                    self.sections[key.section].id(),
                    self.rooms[key.room].id.as_str(),
                )
            })
            .collect()
    }

    /// Explains why the model has no solution.
    pub fn diagnose(&self) -> Vec<Diagnostic> {
        diagnose::explain(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::StrictCompatibility;
    use crate::models::Equipment;

    fn build<'a>(
        sections: &'a [Section],
        rooms: &'a [Room],
        rule: &'a StrictCompatibility,
    ) -> AllocationModel<'a> {
        AllocationModelBuilder::new(sections, rooms, rule).build()
    }

    #[test]
    fn test_incompatible_pairs_pruned() {
        let sections = vec![
            Section::new("COMP", 20, "2M12").with_equipment(Equipment::Computers),
            Section::new("MAT", 30, "3M12"),
        ];
        let rooms = vec![
            Room::classroom("C1", 40),
            Room::lab("L1", 25, Equipment::Computers),
        ];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);

        // COMP -> L1 only; MAT -> C1, L1
        assert_eq!(model.variable_count(), 3);
        assert!(model.variables().column(PairKey::new(0, 0)).is_none());
        assert!(model.variables().column(PairKey::new(0, 1)).is_some());
        assert!(!model.has_unassignable());
    }

    #[test]
    fn test_objective_coefficients() {
        let sections = vec![Section::new("A", 25, "2M1")];
        let rooms = vec![
            Room::classroom("R1", 30),
            Room::classroom("R2", 60).with_extra_cost(15.0),
        ];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);

        assert_eq!(model.program().objective, vec![5.0, 50.0]);
    }

    #[test]
    fn test_capacity_rows_linear_form() {
        let sections = vec![Section::new("A", 45, "2M1")];
        let rooms = vec![Room::classroom("R1", 30)];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);

        let cap: Vec<_> = model
            .program()
            .constraints
            .iter()
            .filter(|c| c.family == ConstraintFamily::Capacity)
            .collect();
        assert_eq!(cap.len(), 1);
        assert_eq!(cap[0].terms, vec![(0, 45.0)]);
        assert_eq!(cap[0].rhs, 30.0);
        assert!(!cap[0].is_satisfied_by(&[1.0], 1e-9));
    }

    #[test]
    fn test_unassignable_section_gets_empty_row() {
        let sections = vec![
            Section::new("ROB", 10, "2M1").with_equipment(Equipment::Robotics),
            Section::new("MAT", 10, "2M1"),
        ];
        let rooms = vec![Room::classroom("C1", 40)];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);

        assert!(model.has_unassignable());
        assert_eq!(model.unassignable_sections(), vec!["ROB"]);
        let row = model
            .program()
            .constraints
            .iter()
            .find(|c| c.name == "assign[ROB]")
            .unwrap();
        assert!(row.terms.is_empty());
        assert!(!row.is_satisfied_by(&[1.0], 1e-9));
    }

    #[test]
    fn test_conflict_rows_per_room_and_slot() {
        // A and B share Mon period 2; C is elsewhere.
        let sections = vec![
            Section::new("A", 10, "2M12"),
            Section::new("B", 10, "2M23"),
            Section::new("C", 10, "3M1"),
        ];
        let rooms = vec![Room::classroom("R1", 40), Room::classroom("R2", 40)];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);

        let conflicts: Vec<_> = model
            .program()
            .constraints
            .iter()
            .filter(|c| c.family == ConstraintFamily::TimeConflict)
            .collect();
        assert_eq!(conflicts.len(), 2); // one per room for the shared slot
        for row in &conflicts {
            assert_eq!(row.terms.len(), 2);
            assert_eq!(row.rhs, 1.0);
            assert!(row.name.contains("Mon 08:00-08:50"));
        }
    }

    #[test]
    fn test_identical_conflict_rows_deduplicated() {
        // Same two periods → one row per room, not one per slot.
        let sections = vec![Section::new("A", 10, "2M12"), Section::new("B", 10, "2M12")];
        let rooms = vec![Room::classroom("R1", 40)];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);
        assert_eq!(model.program().count(ConstraintFamily::TimeConflict), 1);
    }

    #[test]
    fn test_unscheduled_sections_never_conflict() {
        let sections = vec![Section::new("A", 10, "???"), Section::new("B", 10, "???")];
        let rooms = vec![Room::classroom("R1", 40)];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);
        assert_eq!(model.program().count(ConstraintFamily::TimeConflict), 0);
    }

    #[test]
    fn test_placements_from_values() {
        let sections = vec![Section::new("A", 10, "2M1"), Section::new("B", 10, "2M1")];
        let rooms = vec![Room::classroom("R1", 40), Room::classroom("R2", 40)];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);

        let a_r2 = model.variables().column(PairKey::new(0, 1)).unwrap();
        let b_r1 = model.variables().column(PairKey::new(1, 0)).unwrap();
        let mut values = vec![0.0; model.variable_count()];
        values[a_r2] = 1.0;
        values[b_r1] = 0.999_999;

        let placements = model.placements(&values);
        assert_eq!(
            placements,
            vec![Placement::new("A", "R2"), Placement::new("B", "R1")]
        );
        for row in &model.program().constraints {
            assert!(row.is_satisfied_by(&values, 1e-3), "{}", row.name);
        }
    }

    #[test]
    fn test_ids_with_separators_stay_distinct() {
        // "A_B" + "C" and "A" + "B_C" would collide under naive concatenation
        let sections = vec![Section::new("A_B", 10, "2M1"), Section::new("A", 10, "3M1")];
        let rooms = vec![Room::classroom("C", 40), Room::classroom("B_C", 40)];
        let rule = StrictCompatibility::new();
        let model = build(&sections, &rooms, &rule);

        let c1 = model.variables().column(PairKey::new(0, 0)).unwrap();
        let c2 = model.variables().column(PairKey::new(1, 1)).unwrap();
        assert_ne!(c1, c2);
        assert_eq!(model.variable_count(), 4);
    }
}
