//! Seeded synthetic instances.
//!
//! Produces term-sized problems shaped like real timetable data: mostly
//! classrooms, a few equipment labs and auditoriums, part of the rooms on a
//! secondary campus, and sections meeting for two consecutive periods on one
//! or two weekdays. Every equipment need drawn for a section has at least one
//! matching lab large enough for it, so incompatibility never comes from the
//! generator itself.

use rand::prelude::IndexedRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::models::{Equipment, Room, Section};
use crate::source::Instance;

const SHIFTS: [char; 3] = ['M', 'T', 'N'];
const WEEKDAY_DIGITS: [char; 6] = ['2', '3', '4', '5', '6', '7'];
const LAB_EQUIPMENT: [Equipment; 3] = [
    Equipment::Computers,
    Equipment::Robotics,
    Equipment::Electronics,
];

/// Random instance generator.
///
/// # Example
/// ```
/// use u_roomalloc::generator::InstanceGenerator;
///
/// let instance = InstanceGenerator::new(7).with_sections(12).with_rooms(5).generate();
/// assert_eq!(instance.sections.len(), 12);
/// assert_eq!(instance.rooms.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    seed: u64,
    sections: usize,
    rooms: usize,
    /// Probability that a section needs equipment.
    equipment_share: f64,
    /// Probability that a room is on the secondary campus.
    secondary_share: f64,
}

impl InstanceGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            sections: 20,
            rooms: 8,
            equipment_share: 0.15,
            secondary_share: 0.25,
        }
    }

    pub fn with_sections(mut self, n: usize) -> Self {
        self.sections = n;
        self
    }

    /// Sets the room count (at least one).
    pub fn with_rooms(mut self, n: usize) -> Self {
        self.rooms = n.max(1);
        self
    }

    pub fn with_equipment_share(mut self, p: f64) -> Self {
        self.equipment_share = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_secondary_share(mut self, p: f64) -> Self {
        self.secondary_share = p.clamp(0.0, 1.0);
        self
    }

    /// Generates an instance; the same seed always yields the same instance.
    pub fn generate(&self) -> Instance {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let rooms = self.generate_rooms(&mut rng);
        let sections = self.generate_sections(&mut rng, &rooms);
        Instance::new(sections, rooms)
    }

    fn generate_rooms(&self, rng: &mut SmallRng) -> Vec<Room> {
        (0..self.rooms)
            .map(|i| {
                let id = format!("R{:03}", i + 1);
                let roll: f64 = rng.random();
                let room = if roll < 0.2 {
                    let equipment = LAB_EQUIPMENT[i % LAB_EQUIPMENT.len()];
                    Room::lab(id, rng.random_range(20..=40), equipment)
                } else if roll < 0.3 {
                    Room::auditorium(id, rng.random_range(80..=150))
                } else {
                    Room::classroom(id, rng.random_range(25..=60))
                };
                if rng.random_bool(self.secondary_share) {
                    room.with_location("SEC")
                        .with_extra_cost(f64::from(rng.random_range(5u8..=20)))
                } else {
                    room.with_location("MAIN")
                }
            })
            .collect()
    }

    fn generate_sections(&self, rng: &mut SmallRng, rooms: &[Room]) -> Vec<Section> {
        let labs: Vec<&Room> = rooms.iter().filter(|r| r.equipment.is_specialized()).collect();
        let largest = rooms.iter().map(|r| r.capacity).max().unwrap_or(25);

        (0..self.sections)
            .map(|i| {
                let id = format!("S{:03}", i + 1);
                let code = random_code(rng);
                let lab = if rng.random_bool(self.equipment_share) {
                    labs.choose(rng).copied()
                } else {
                    None
                };
                match lab {
                    Some(lab) => {
                        let enrollment = rng.random_range(5..=lab.capacity);
                        Section::new(id, enrollment, code).with_equipment(lab.equipment)
                    }
                    None => {
                        let enrollment = rng.random_range(10..=largest.clamp(10, 45));
                        Section::new(id, enrollment, code)
                    }
                }
            })
            .collect()
    }
}

/// One or two weekdays, one shift, two consecutive periods.
fn random_code(rng: &mut SmallRng) -> String {
    let day_count = rng.random_range(1..=2);
    let mut days: Vec<char> = WEEKDAY_DIGITS
        .choose_multiple(rng, day_count)
        .copied()
        .collect();
    days.sort_unstable();
    let shift = SHIFTS[rng.random_range(0..SHIFTS.len())];
    let first = rng.random_range(1u8..=5);
    let days: String = days.into_iter().collect();
    format!("{days}{shift}{first}{}", first + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::{CompatibilityRule, StrictCompatibility};

    #[test]
    fn test_same_seed_same_instance() {
        let a = InstanceGenerator::new(42).generate();
        let b = InstanceGenerator::new(42).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_codes_always_decode() {
        let instance = InstanceGenerator::new(3).with_sections(200).generate();
        for s in &instance.sections {
            assert!(!s.is_unscheduled(), "bad code {}", s.schedule_code());
            assert!(s.slots().len() >= 2);
        }
    }

    #[test]
    fn test_every_section_has_a_fitting_room() {
        let rule = StrictCompatibility::new();
        for seed in 0..20 {
            let instance = InstanceGenerator::new(seed)
                .with_equipment_share(0.5)
                .generate();
            for s in &instance.sections {
                assert!(
                    rule.candidates(s, &instance.rooms)
                        .iter()
                        .any(|r| r.capacity >= s.enrollment()),
                    "seed {seed}: {} has no fitting room",
                    s.id()
                );
            }
        }
    }

    #[test]
    fn test_secondary_rooms_carry_cost() {
        let instance = InstanceGenerator::new(9)
            .with_rooms(40)
            .with_secondary_share(1.0)
            .generate();
        assert!(instance.rooms.iter().all(|r| r.is_secondary_campus()));
        assert!(instance.rooms.iter().all(|r| r.location == "SEC"));
    }
}
