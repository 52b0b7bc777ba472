//! Binary integer model of the room allocation problem.
//!
//! [`AllocationModelBuilder`] turns sections, rooms and a compatibility rule
//! into a solver-neutral [`LinearProgram`] plus the bookkeeping needed to map
//! columns back to (section, room) pairs. Backends in [`crate::solver`]
//! consume the program; this module never solves anything.
//!
//! # Variable identity
//!
//! Columns are keyed by [`PairKey`] (section index, room index), never by
//! a string built from the ids.

mod builder;
mod diagnose;
mod program;

pub use builder::{AllocationModel, AllocationModelBuilder};
pub use program::{
    ConstraintFamily, LinearConstraint, LinearProgram, PairKey, Sense, VariableIndex,
};
