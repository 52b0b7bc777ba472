//! Course section model.
//!
//! A section is one course offering that needs exactly one room for its
//! weekly schedule. The schedule is given as a compact code and decoded once,
//! at construction, into the set of slots used for conflict detection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Equipment, Slot};
use crate::timecode;

/// A course section to be allocated.
///
/// Immutable once built: the decoded slot set is derived from the schedule
/// code and the two can never drift apart. Builder methods consume `self`
/// and re-decode when the code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SectionRecord", into = "SectionRecord")]
pub struct Section {
    id: String,
    name: String,
    enrollment: u32,
    schedule_code: String,
    equipment: Equipment,
    location_lock: Option<String>,
    slots: BTreeSet<Slot>,
}

/// Plain serialized form of a [`Section`] (no derived fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SectionRecord {
    id: String,
    #[serde(default)]
    name: String,
    enrollment: u32,
    schedule_code: String,
    #[serde(default)]
    equipment: Equipment,
    #[serde(default)]
    location_lock: Option<String>,
}

impl From<SectionRecord> for Section {
    fn from(r: SectionRecord) -> Self {
        let mut section = Section::new(r.id, r.enrollment, r.schedule_code)
            .with_name(r.name)
            .with_equipment(r.equipment);
        section.location_lock = r.location_lock;
        section
    }
}

impl From<Section> for SectionRecord {
    fn from(s: Section) -> Self {
        Self {
            id: s.id,
            name: s.name,
            enrollment: s.enrollment,
            schedule_code: s.schedule_code,
            equipment: s.equipment,
            location_lock: s.location_lock,
        }
    }
}

impl Section {
    /// Creates a section and decodes its schedule code.
    pub fn new(id: impl Into<String>, enrollment: u32, schedule_code: impl Into<String>) -> Self {
        let schedule_code = schedule_code.into();
        let slots = timecode::decode(&schedule_code);
        Self {
            id: id.into(),
            name: String::new(),
            enrollment,
            schedule_code,
            equipment: Equipment::None,
            location_lock: None,
            slots,
        }
    }

    /// Sets the section name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the required equipment.
    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    /// Restricts the section to rooms in one campus building.
    pub fn with_location_lock(mut self, location: impl Into<String>) -> Self {
        self.location_lock = Some(location.into());
        self
    }

    /// Replaces the schedule code and re-decodes it.
    pub fn with_schedule_code(mut self, schedule_code: impl Into<String>) -> Self {
        self.schedule_code = schedule_code.into();
        self.slots = timecode::decode(&self.schedule_code);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of enrolled students.
    pub fn enrollment(&self) -> u32 {
        self.enrollment
    }

    /// Raw schedule code.
    pub fn schedule_code(&self) -> &str {
        &self.schedule_code
    }

    /// Required equipment (`Equipment::None` if any room will do).
    pub fn equipment(&self) -> Equipment {
        self.equipment
    }

    /// Building this section is locked to, if any.
    pub fn location_lock(&self) -> Option<&str> {
        self.location_lock.as_deref()
    }

    /// Decoded slots.
    pub fn slots(&self) -> &BTreeSet<Slot> {
        &self.slots
    }

    /// Decoded slots that take part in conflict detection.
    pub fn timed_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| !s.is_unscheduled())
    }

    /// Whether the schedule code failed to decode.
    pub fn is_unscheduled(&self) -> bool {
        self.slots.iter().any(Slot::is_unscheduled)
    }

    /// Whether two sections share at least one timed slot.
    pub fn conflicts_with(&self, other: &Section) -> bool {
        self.timed_slots().any(|s| other.slots.contains(s))
    }
}
