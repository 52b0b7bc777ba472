//! Allocation (solution) model.
//!
//! An allocation binds one section to one room. An allocation result is the
//! read-only output of a single `allocate()` call: status, allocations,
//! unplaced sections, diagnostics and the independently computed metrics.
//!
//! Allocations borrow the input sections and rooms, so a result can never
//! outlive, or disagree with, the collections it was computed from.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use super::{Room, Section, Slot};
use crate::metrics::MetricsReport;
use crate::validation::InputIssue;

/// A section placed in a room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation<'a> {
    pub section: &'a Section,
    pub room: &'a Room,
}

impl<'a> Allocation<'a> {
    /// Creates an allocation.
    pub fn new(section: &'a Section, room: &'a Room) -> Self {
        Self { section, room }
    }

    /// Empty seats: `room.capacity - section.enrollment`.
    #[inline]
    pub fn idle_capacity(&self) -> i64 {
        self.room.idle_capacity(self.section.enrollment())
    }

    /// Occupancy: `enrollment / capacity * 100`.
    #[inline]
    pub fn utilization_pct(&self) -> f64 {
        self.room.utilization_pct(self.section.enrollment())
    }

    /// Contribution to the allocation objective: idle seats plus room cost.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.idle_capacity() as f64 + self.room.extra_cost
    }
}

impl Serialize for Allocation<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Allocation", 4)?;
        st.serialize_field("section_id", self.section.id())?;
        st.serialize_field("room_id", &self.room.id)?;
        st.serialize_field("idle_capacity", &self.idle_capacity())?;
        st.serialize_field("utilization_pct", &self.utilization_pct())?;
        st.end()
    }
}

/// A raw (section, room) pair reported by a solver backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub section_id: String,
    pub room_id: String,
}

impl Placement {
    pub fn new(section_id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            room_id: room_id.into(),
        }
    }
}

/// Terminal status of an allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationStatus {
    /// Every section was placed.
    Success,
    /// Some sections were placed, the rest are listed as unplaced (heuristics only).
    Partial,
    /// No valid allocation exists; see diagnostics.
    Infeasible,
    /// The exact backend ran out of time without a certificate either way.
    TimedOut,
    /// The input collections were rejected before solving.
    InvalidInput,
}

/// Why a run did not produce a full allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Sections with no compatible room at all (no decision variable).
    NoCompatibleRoom { section_ids: Vec<String> },
    /// Sections whose every compatible room is too small.
    CapacityShortfall { section_ids: Vec<String> },
    /// More sections compete for a slot than their feasible rooms can hold.
    SlotContention {
        slot: Slot,
        section_ids: Vec<String>,
        room_ids: Vec<String>,
    },
    /// A greedy pass found every fitting room already taken in `slot`.
    RoomsExhausted {
        slot: Slot,
        section_ids: Vec<String>,
        room_ids: Vec<String>,
    },
    /// Infeasible or timed out without an isolated witness.
    NoCertificate { message: String },
    /// Rejected input.
    Input(InputIssue),
}

impl Diagnostic {
    /// Section ids named by this diagnostic.
    pub fn section_ids(&self) -> &[String] {
        match self {
            Diagnostic::NoCompatibleRoom { section_ids }
            | Diagnostic::CapacityShortfall { section_ids }
            | Diagnostic::SlotContention { section_ids, .. }
            | Diagnostic::RoomsExhausted { section_ids, .. } => section_ids,
            Diagnostic::NoCertificate { .. } | Diagnostic::Input(_) => &[],
        }
    }
}

/// Output of one `allocate()` call.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationResult<'a> {
    /// Name of the strategy that produced the result.
    pub strategy: String,
    pub status: AllocationStatus,
    /// Allocations in input section order.
    pub allocations: Vec<Allocation<'a>>,
    /// Ids of sections left without a room (empty on success).
    pub unplaced: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub metrics: MetricsReport,
}

impl<'a> AllocationResult<'a> {
    /// Whether every section was placed.
    pub fn is_success(&self) -> bool {
        self.status == AllocationStatus::Success
    }

    /// Number of allocations.
    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    /// Room hosting a given section.
    pub fn room_for(&self, section_id: &str) -> Option<&'a Room> {
        self.allocations
            .iter()
            .find(|a| a.section.id() == section_id)
            .map(|a| a.room)
    }

    /// Allocations grouped by room id (sorted by room id).
    pub fn by_room(&self) -> BTreeMap<&'a str, Vec<Allocation<'a>>> {
        let mut map: BTreeMap<&'a str, Vec<Allocation<'a>>> = BTreeMap::new();
        for a in &self.allocations {
            map.entry(a.room.id.as_str()).or_default().push(*a);
        }
        map
    }

    /// Every section id named by an infeasibility diagnostic.
    pub fn blamed_sections(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .diagnostics
            .iter()
            .flat_map(|d| d.section_ids().iter().map(String::as_str))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
