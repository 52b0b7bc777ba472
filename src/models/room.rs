//! Room model.
//!
//! Rooms are the physical spaces sections are allocated to. Each room has a
//! seat capacity, a type, an equipment kind, a campus-building location,
//! and an extra cost that penalizes rooms away from the primary campus.

use serde::{Deserialize, Serialize};

/// Room classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Regular lecture room.
    Classroom,
    /// Laboratory; the only room type that hosts equipment-bound sections.
    Lab,
    /// Large lecture hall.
    Auditorium,
}

/// Specialized equipment a section needs or a room provides.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Equipment {
    /// No specialized equipment.
    #[default]
    None,
    Computers,
    Robotics,
    Electronics,
}

impl Equipment {
    /// Maps the numeric material code used by timetable exports
    /// (0 = none, 1 = computers, 2 = robotics, 3 = electronics).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Equipment::None),
            1 => Some(Equipment::Computers),
            2 => Some(Equipment::Robotics),
            3 => Some(Equipment::Electronics),
            _ => None,
        }
    }

    /// Whether this is a real equipment requirement.
    #[inline]
    pub fn is_specialized(&self) -> bool {
        *self != Equipment::None
    }
}

/// A physical room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Seats available (must be > 0).
    pub capacity: u32,
    /// Room classification.
    pub room_type: RoomType,
    /// Campus-building tag (e.g. "IC", "IM").
    pub location: String,
    /// Equipment installed in the room.
    pub equipment: Equipment,
    /// Structural penalty for using this room (must be >= 0).
    pub extra_cost: f64,
}

impl Room {
    /// Creates a room with no equipment, no extra cost and empty location.
    pub fn new(id: impl Into<String>, capacity: u32, room_type: RoomType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            room_type,
            location: String::new(),
            equipment: Equipment::None,
            extra_cost: 0.0,
        }
    }

    /// Creates a classroom.
    pub fn classroom(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, capacity, RoomType::Classroom)
    }

    /// Creates a laboratory with the given equipment.
    pub fn lab(id: impl Into<String>, capacity: u32, equipment: Equipment) -> Self {
        Self::new(id, capacity, RoomType::Lab).with_equipment(equipment)
    }

    /// Creates an auditorium.
    pub fn auditorium(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, capacity, RoomType::Auditorium)
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the campus-building location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the installed equipment.
    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    /// Sets the extra cost.
    pub fn with_extra_cost(mut self, extra_cost: f64) -> Self {
        self.extra_cost = extra_cost;
        self
    }

    /// Seats left empty when hosting `enrollment` students.
    ///
    /// Negative when the room is too small.
    #[inline]
    pub fn idle_capacity(&self, enrollment: u32) -> i64 {
        i64::from(self.capacity) - i64::from(enrollment)
    }

    /// Occupancy percentage when hosting `enrollment` students.
    pub fn utilization_pct(&self, enrollment: u32) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(enrollment) / f64::from(self.capacity) * 100.0
    }

    /// Whether the room is off the primary campus (carries a penalty).
    #[inline]
    pub fn is_secondary_campus(&self) -> bool {
        self.extra_cost > 0.0
    }
}
