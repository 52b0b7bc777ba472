//! Room allocation domain models.
//!
//! Provides the core data types for one term's room allocation problem
//! and its solutions.
//!
//! # Mappings
//!
//! | u-roomalloc | Timetabling | Meaning |
//! |-------------|-------------|---------|
//! | Section | Course offering | Needs exactly one room for its weekly schedule |
//! | Room | Classroom / Lab | Capacity, type, equipment, building, cost |
//! | Slot | Weekday + period | Atomic conflict-detection unit |
//! | Allocation | Section → Room | One placement with derived idle seats |

mod allocation;
mod room;
mod section;
mod slot;

pub use allocation::{Allocation, AllocationResult, AllocationStatus, Diagnostic, Placement};
pub use room::{Equipment, Room, RoomType};
pub use section::Section;
pub use slot::{ClockTime, Slot, Weekday};
