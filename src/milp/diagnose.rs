//! Infeasibility explanation.
//!
//! Turns an unsatisfiable allocation model into named causes, checked in order:
//!
//! 1. **No compatible room**: the section's assignment row is empty.
//! 2. **Capacity shortfall**: every compatible room is smaller than the
//!    section's enrollment.
//! 3. **Slot contention**: for each time slot, a maximum bipartite matching
//!    between the sections occupying it and their feasible rooms. A section
//!    left unmatched yields a Hall witness: the sections reachable from it by
//!    alternating paths outnumber the rooms they can use.
//!
//! When none of these isolates a cause, a single `NoCertificate` is returned.
//!
//! # Algorithm
//! Kuhn's augmenting-path matching, O(V·E) per slot.
//!
//! # Reference
//! Hall (1935), "On Representatives of Subsets"

use std::collections::{BTreeSet, HashSet, VecDeque};

use log::debug;

use super::builder::sections_by_slot;
use super::AllocationModel;
use crate::models::Diagnostic;

pub(crate) fn explain(model: &AllocationModel<'_>) -> Vec<Diagnostic> {
    let sections = model.sections();
    let rooms = model.rooms();
    let mut diagnostics = Vec::new();
    let mut blamed: HashSet<usize> = HashSet::new();

    // Feasible rooms: compatible and large enough.
    let feasible: Vec<Vec<usize>> = (0..sections.len())
        .map(|si| {
            model
                .section_columns(si)
                .iter()
                .filter_map(|&col| model.variables().key(col))
                .filter(|key| rooms[key.room].capacity >= sections[si].enrollment())
                .map(|key| key.room)
                .collect()
        })
        .collect();

    let no_room: Vec<usize> = (0..sections.len())
        .filter(|&si| model.section_columns(si).is_empty())
        .collect();
    if !no_room.is_empty() {
        blamed.extend(no_room.iter().copied());
        diagnostics.push(Diagnostic::NoCompatibleRoom {
            section_ids: no_room
                .iter()
                .map(|&si| sections[si].id().to_string())
                .collect(),
        });
    }

    let too_small: Vec<usize> = (0..sections.len())
        .filter(|&si| !blamed.contains(&si) && feasible[si].is_empty())
        .collect();
    if !too_small.is_empty() {
        blamed.extend(too_small.iter().copied());
        diagnostics.push(Diagnostic::CapacityShortfall {
            section_ids: too_small
                .iter()
                .map(|&si| sections[si].id().to_string())
                .collect(),
        });
    }

    let mut witnesses: HashSet<(BTreeSet<usize>, BTreeSet<usize>)> = HashSet::new();
    for (slot, members) in sections_by_slot(sections) {
        let members: Vec<usize> = members
            .into_iter()
            .filter(|si| !blamed.contains(si))
            .collect();
        if members.len() < 2 {
            continue;
        }
        for (group, used_rooms) in hall_witnesses(&members, &feasible) {
            if !witnesses.insert((group.clone(), used_rooms.clone())) {
                continue;
            }
            debug!(
                "Slot {slot}: {} sections compete for {} rooms",
                group.len(),
                used_rooms.len()
            );
            diagnostics.push(Diagnostic::SlotContention {
                slot,
                section_ids: group.iter().map(|&si| sections[si].id().to_string()).collect(),
                room_ids: used_rooms.iter().map(|&ri| rooms[ri].id.clone()).collect(),
            });
        }
    }

    if diagnostics.is_empty() {
        diagnostics.push(Diagnostic::NoCertificate {
            message: "no single-slot witness; infeasibility spans several slots".to_string(),
        });
    }
    diagnostics
}

/// Hall-violating (sections, rooms) groups among `members` for one slot.
///
/// Returned groups are in terms of global section and room indices.
fn hall_witnesses(
    members: &[usize],
    feasible: &[Vec<usize>],
) -> Vec<(BTreeSet<usize>, BTreeSet<usize>)> {
    let adj: Vec<&[usize]> = members.iter().map(|&si| feasible[si].as_slice()).collect();
    let room_count = adj.iter().flat_map(|r| r.iter()).max().map_or(0, |m| m + 1);
    let mut room_match: Vec<Option<usize>> = vec![None; room_count];

    let mut unmatched = Vec::new();
    for u in 0..adj.len() {
        let mut visited = vec![false; room_count];
        if !augment(u, &adj, &mut room_match, &mut visited) {
            unmatched.push(u);
        }
    }

    let mut out = Vec::new();
    for u in unmatched {
        // Alternating BFS: every room reached is matched (maximum matching),
        // so the reached sections outnumber the reached rooms by one.
        let mut group = BTreeSet::from([u]);
        let mut reached_rooms = BTreeSet::new();
        let mut queue = VecDeque::from([u]);
        while let Some(v) = queue.pop_front() {
            for &r in adj[v] {
                if !reached_rooms.insert(r) {
                    continue;
                }
                if let Some(w) = room_match[r] {
                    if group.insert(w) {
                        queue.push_back(w);
                    }
                }
            }
        }
        out.push((
            group.into_iter().map(|v| members[v]).collect(),
            reached_rooms,
        ));
    }
    out
}

fn augment(
    u: usize,
    adj: &[&[usize]],
    room_match: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &r in adj[u] {
        if visited[r] {
            continue;
        }
        visited[r] = true;
        let free = match room_match[r] {
            None => true,
            Some(w) => augment(w, adj, room_match, visited),
        };
        if free {
            room_match[r] = Some(u);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use crate::compatibility::StrictCompatibility;
    use crate::milp::AllocationModelBuilder;
    use crate::models::{Diagnostic, Equipment, Room, Section};

    fn diagnose(sections: &[Section], rooms: &[Room]) -> Vec<Diagnostic> {
        let rule = StrictCompatibility::new();
        AllocationModelBuilder::new(sections, rooms, &rule)
            .build()
            .diagnose()
    }

    #[test]
    fn test_two_sections_one_room() {
        let sections = vec![Section::new("A", 20, "2M12"), Section::new("B", 25, "2M12")];
        let rooms = vec![Room::classroom("R1", 30)];
        let diags = diagnose(&sections, &rooms);

        assert_eq!(diags.len(), 1);
        match &diags[0] {
            Diagnostic::SlotContention {
                section_ids,
                room_ids,
                ..
            } => {
                assert_eq!(section_ids, &vec!["A".to_string(), "B".to_string()]);
                assert_eq!(room_ids, &vec!["R1".to_string()]);
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
    }

    #[test]
    fn test_no_compatible_room_named() {
        let sections = vec![
            Section::new("ROB", 10, "2M1").with_equipment(Equipment::Robotics),
            Section::new("MAT", 10, "3M1"),
        ];
        let rooms = vec![Room::classroom("R1", 30)];
        let diags = diagnose(&sections, &rooms);
        assert_eq!(
            diags,
            vec![Diagnostic::NoCompatibleRoom {
                section_ids: vec!["ROB".into()]
            }]
        );
    }

    #[test]
    fn test_capacity_shortfall_named() {
        let sections = vec![Section::new("BIG", 80, "2M1")];
        let rooms = vec![Room::classroom("R1", 30), Room::classroom("R2", 50)];
        let diags = diagnose(&sections, &rooms);
        assert_eq!(
            diags,
            vec![Diagnostic::CapacityShortfall {
                section_ids: vec!["BIG".into()]
            }]
        );
    }

    #[test]
    fn test_witness_excludes_uninvolved_sections() {
        // A and B only fit the lab; C fits both rooms and is not to blame.
        let sections = vec![
            Section::new("A", 10, "2M1").with_equipment(Equipment::Computers),
            Section::new("B", 10, "2M1").with_equipment(Equipment::Computers),
            Section::new("C", 10, "2M1"),
        ];
        let rooms = vec![
            Room::lab("LAB", 30, Equipment::Computers),
            Room::classroom("R1", 30),
        ];
        let diags = diagnose(&sections, &rooms);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].section_ids(), ["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_witness_deduplicated_across_slots() {
        let sections = vec![Section::new("A", 10, "2M123"), Section::new("B", 10, "2M123")];
        let rooms = vec![Room::classroom("R1", 30)];
        assert_eq!(diagnose(&sections, &rooms).len(), 1);
    }

    #[test]
    fn test_no_certificate_when_matching_succeeds() {
        let sections = vec![Section::new("A", 10, "2M1"), Section::new("B", 10, "3M1")];
        let rooms = vec![Room::classroom("R1", 30)];
        let diags = diagnose(&sections, &rooms);
        assert!(matches!(diags[0], Diagnostic::NoCertificate { .. }));
    }
}
