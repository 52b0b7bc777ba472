//! Raw placements to typed allocations.

use std::collections::HashMap;

use crate::error::{AllocError, Result};
use crate::models::{Allocation, Placement, Room, Section};

/// Id lookups over one problem's sections and rooms.
///
/// Built once per run; every lookup is a hash-map hit.
#[derive(Debug)]
pub struct SolutionExtractor<'a> {
    sections: HashMap<&'a str, (usize, &'a Section)>,
    rooms: HashMap<&'a str, &'a Room>,
}

impl<'a> SolutionExtractor<'a> {
    pub fn new(sections: &'a [Section], rooms: &'a [Room]) -> Self {
        Self {
            sections: sections
                .iter()
                .enumerate()
                .map(|(i, s)| (s.id(), (i, s)))
                .collect(),
            rooms: rooms.iter().map(|r| (r.id.as_str(), r)).collect(),
        }
    }

    /// Resolves placements, ordered by the sections' input order.
    ///
    /// An id absent from the inputs is a backend defect and fails the run.
    /// Duplicate placements are kept so that re-validation can report them.
    pub fn extract(&self, strategy: &str, placements: &[Placement]) -> Result<Vec<Allocation<'a>>> {
        let mut resolved = Vec::with_capacity(placements.len());
        for p in placements {
            let &(order, section) = self.sections.get(p.section_id.as_str()).ok_or_else(|| {
                AllocError::solver(strategy, format!("unknown section id '{}'", p.section_id))
            })?;
            let &room = self.rooms.get(p.room_id.as_str()).ok_or_else(|| {
                AllocError::solver(strategy, format!("unknown room id '{}'", p.room_id))
            })?;
            resolved.push((order, Allocation::new(section, room)));
        }
        resolved.sort_by_key(|(order, _)| *order);
        Ok(resolved.into_iter().map(|(_, a)| a).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_section_order() {
        let sections = vec![Section::new("S1", 10, "2M1"), Section::new("S2", 20, "3M1")];
        let rooms = vec![Room::classroom("R1", 30), Room::classroom("R2", 25)];
        let extractor = SolutionExtractor::new(&sections, &rooms);

        let allocations = extractor
            .extract(
                "exact",
                &[Placement::new("S2", "R2"), Placement::new("S1", "R1")],
            )
            .unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].section.id(), "S1");
        assert_eq!(allocations[1].room.id, "R2");
        assert_eq!(allocations[1].idle_capacity(), 5);
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let sections = vec![Section::new("S1", 10, "2M1")];
        let rooms = vec![Room::classroom("R1", 30)];
        let extractor = SolutionExtractor::new(&sections, &rooms);

        let err = extractor
            .extract("exact", &[Placement::new("S9", "R1")])
            .unwrap_err();
        assert!(err.to_string().contains("S9"));
        let err = extractor
            .extract("exact", &[Placement::new("S1", "R9")])
            .unwrap_err();
        assert!(matches!(err, AllocError::Solver { .. }));
    }

    #[test]
    fn test_ids_with_delimiters() {
        let sections = vec![Section::new("A_B", 10, "2M1"), Section::new("A", 10, "3M1")];
        let rooms = vec![Room::classroom("B_C", 30), Room::classroom("C", 30)];
        let extractor = SolutionExtractor::new(&sections, &rooms);
        let allocations = extractor
            .extract(
                "exact",
                &[Placement::new("A_B", "C"), Placement::new("A", "B_C")],
            )
            .unwrap();
        assert_eq!(allocations[0].room.id, "C");
        assert_eq!(allocations[1].room.id, "B_C");
    }
}
