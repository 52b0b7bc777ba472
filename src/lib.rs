//! Room allocation for one academic term.
//!
//! Assigns course sections to rooms, respecting capacity, equipment,
//! campus-building locks and time-slot conflicts, while minimizing idle seats
//! plus a cost penalty for secondary-campus rooms.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Section`, `Room`, `Slot`, `Allocation`,
//!   `AllocationResult`
//! - **`timecode`**: Compact schedule codes (`"24M12"`) → time slots
//! - **`compatibility`**: Which rooms may host which sections (strict / flexible)
//! - **`milp`**: Binary integer model (variables, objective, hard constraints)
//!   and infeasibility diagnosis
//! - **`solver`**: Allocation strategies: exact (MILP), greedy, fallback
//! - **`metrics`**: Utilization/cost metrics and solver-independent
//!   constraint re-validation
//! - **`validation`**: Input integrity checks (empty inputs, duplicate IDs, bad values)
//! - **`progress`**: Stage notifications
//! - **`config`**: Serializable strategy configuration
//! - **`source`**: Input collections and data sources
//! - **`generator`**: Seeded synthetic instances
//!
//! # Example
//!
//! ```
//! use u_roomalloc::allocate;
//! use u_roomalloc::models::{AllocationStatus, Equipment, Room, Section};
//! use u_roomalloc::solver::ExactSolver;
//!
//! let sections = vec![
//!     Section::new("MAT001", 45, "24M12"),
//!     Section::new("COMP001", 30, "3T34").with_equipment(Equipment::Computers),
//! ];
//! let rooms = vec![
//!     Room::classroom("IC101", 50).with_location("IC"),
//!     Room::lab("IC301", 35, Equipment::Computers).with_location("IC"),
//! ];
//!
//! let result = allocate(&sections, &rooms, &ExactSolver::new()).unwrap();
//! assert_eq!(result.status, AllocationStatus::Success);
//! assert_eq!(result.room_for("COMP001").unwrap().id, "IC301");
//! assert!(result.metrics.constraints_satisfied);
//! ```
//!
//! # References
//!
//! - Carter & Laporte (1998), "Recent Developments in Practical Course Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"
//! - Wolsey (2020), "Integer Programming"

pub mod allocator;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod milp;
pub mod models;
pub mod progress;
pub mod solver;
pub mod source;
pub mod timecode;
pub mod validation;

pub use allocator::{allocate, allocate_with_progress};
pub use error::{AllocError, Result};
