//! Section/room compatibility rules.
//!
//! A compatibility rule decides whether a room may host a section at all,
//! independent of capacity and time. Incompatible pairs are pruned before
//! any model is built.
//!
//! # Rules (in order)
//! 1. **Location lock**: a section locked to a building only fits rooms in
//!    that building; rooms in a locked building reject every section not
//!    locked to it.
//! 2. **Equipment**: a section that needs equipment requires a `Lab` whose
//!    equipment matches exactly (no superset matching).
//! 3. A section without equipment needs fits any room type.
//!
//! # Variants
//! - [`StrictCompatibility`]: the rules above, exactly.
//! - [`FlexibleCompatibility`]: treats a configurable set of equipment needs
//!   as optional (rule 2 skipped for them), widening the candidate pool.
//!
//! Strategies wrap their configured rule with [`with_section_locks`] on every
//! run, so the buildings locked by the sections being allocated are always
//! reserved, whatever was configured.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

use crate::models::{Equipment, Room, RoomType, Section};

/// A predicate over (section, room) pairs.
pub trait CompatibilityRule: Send + Sync + Debug {
    /// Rule name (e.g., "strict").
    fn name(&self) -> &'static str;

    /// Whether `room` may host `section`.
    fn is_compatible(&self, section: &Section, room: &Room) -> bool;

    /// Rooms compatible with `section`, in input order.
    fn candidates<'r>(&self, section: &Section, rooms: &'r [Room]) -> Vec<&'r Room> {
        rooms
            .iter()
            .filter(|r| self.is_compatible(section, r))
            .collect()
    }
}

/// Exact location and equipment matching.
///
/// # Example
/// ```
/// use u_roomalloc::compatibility::{CompatibilityRule, StrictCompatibility};
/// use u_roomalloc::models::{Equipment, Room, Section};
///
/// let rule = StrictCompatibility::new();
/// let lab = Room::lab("L1", 30, Equipment::Computers);
/// let s = Section::new("S1", 25, "2M12").with_equipment(Equipment::Computers);
/// assert!(rule.is_compatible(&s, &lab));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StrictCompatibility {
    locked_locations: BTreeSet<String>,
}

impl StrictCompatibility {
    /// Creates a rule with no locked buildings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a building for sections locked to it.
    pub fn with_locked_location(mut self, location: impl Into<String>) -> Self {
        self.locked_locations.insert(location.into());
        self
    }

    /// Locks every building some section is locked to.
    pub fn from_sections(sections: &[Section]) -> Self {
        Self {
            locked_locations: locked_by(sections),
        }
    }

    /// Buildings reserved for locked sections.
    pub fn locked_locations(&self) -> &BTreeSet<String> {
        &self.locked_locations
    }

    /// Rule 1: bidirectional location lock.
    pub fn location_allows(&self, section: &Section, room: &Room) -> bool {
        lock_allows(&self.locked_locations, section, room)
    }

    /// Rules 2 and 3: exact lab equipment for equipment-bound sections.
    pub fn equipment_allows(need: Equipment, room: &Room) -> bool {
        if !need.is_specialized() {
            return true;
        }
        room.room_type == RoomType::Lab && room.equipment == need
    }
}

impl CompatibilityRule for StrictCompatibility {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn is_compatible(&self, section: &Section, room: &Room) -> bool {
        self.location_allows(section, room)
            && Self::equipment_allows(section.equipment(), room)
    }
}

/// Strict matching with some equipment needs treated as non-blocking.
///
/// Sections whose need is in the optional set may use any room that passes
/// the location lock. Intended for the greedy backend, to avoid leaving
/// sections unplaced only because every matching lab is taken.
#[derive(Debug, Clone, Default)]
pub struct FlexibleCompatibility {
    strict: StrictCompatibility,
    optional: BTreeSet<Equipment>,
}

impl FlexibleCompatibility {
    /// Creates a flexible rule on top of a strict one.
    pub fn new(strict: StrictCompatibility) -> Self {
        Self {
            strict,
            optional: BTreeSet::new(),
        }
    }

    /// Marks an equipment need as optional.
    pub fn with_optional(mut self, equipment: Equipment) -> Self {
        if equipment.is_specialized() {
            self.optional.insert(equipment);
        }
        self
    }

    /// Equipment needs treated as optional.
    pub fn optional(&self) -> &BTreeSet<Equipment> {
        &self.optional
    }
}

impl CompatibilityRule for FlexibleCompatibility {
    fn name(&self) -> &'static str {
        "flexible"
    }

    fn is_compatible(&self, section: &Section, room: &Room) -> bool {
        if !self.strict.location_allows(section, room) {
            return false;
        }
        let need = section.equipment();
        self.optional.contains(&need) || StrictCompatibility::equipment_allows(need, room)
    }
}

/// Buildings some section in `sections` is locked to.
fn locked_by(sections: &[Section]) -> BTreeSet<String> {
    sections
        .iter()
        .filter_map(|s| s.location_lock().map(str::to_string))
        .collect()
}

fn lock_allows(locked: &BTreeSet<String>, section: &Section, room: &Room) -> bool {
    match section.location_lock() {
        Some(location) => room.location == location,
        None => !locked.contains(&room.location),
    }
}

/// A rule with the location lock of one section set applied on top.
///
/// Built by [`with_section_locks`]. Keeps the name of the wrapped rule.
#[derive(Debug, Clone)]
pub struct SectionLocked {
    inner: Arc<dyn CompatibilityRule>,
    locked: BTreeSet<String>,
}

impl SectionLocked {
    /// Buildings reserved by the sections this rule was bound to.
    pub fn locked_locations(&self) -> &BTreeSet<String> {
        &self.locked
    }
}

impl CompatibilityRule for SectionLocked {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn is_compatible(&self, section: &Section, room: &Room) -> bool {
        lock_allows(&self.locked, section, room) && self.inner.is_compatible(section, room)
    }
}

/// Binds `rule` to the sections about to be allocated.
///
/// Every building some section is locked to rejects sections not locked to
/// it. Locks configured on `rule` still apply. Returns `rule` itself when no
/// section carries a lock.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use u_roomalloc::compatibility::{with_section_locks, CompatibilityRule, StrictCompatibility};
/// use u_roomalloc::models::{Room, Section};
///
/// let sections = vec![
///     Section::new("IF001", 20, "2M12").with_location_lock("IF"),
///     Section::new("MAT001", 30, "3M12"),
/// ];
/// let rule = with_section_locks(Arc::new(StrictCompatibility::new()), &sections);
/// let if101 = Room::classroom("IF101", 30).with_location("IF");
/// assert!(rule.is_compatible(&sections[0], &if101));
/// assert!(!rule.is_compatible(&sections[1], &if101));
/// ```
pub fn with_section_locks(
    rule: Arc<dyn CompatibilityRule>,
    sections: &[Section],
) -> Arc<dyn CompatibilityRule> {
    let locked = locked_by(sections);
    if locked.is_empty() {
        return rule;
    }
    Arc::new(SectionLocked {
        inner: rule,
        locked,
    })
}
