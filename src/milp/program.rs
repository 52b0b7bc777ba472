//! Solver-neutral linear program representation.
//!
//! The builder emits plain coefficient vectors; backends translate them into
//! their own modelling API. Keeping the program owned and `Clone` lets a
//! backend move it onto a worker thread.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of one decision variable: (section index, room index).
///
/// Indices point into the section/room slices the model was built from, so
/// the key is injective whatever characters the ids contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub section: usize,
    pub room: usize,
}

impl PairKey {
    pub fn new(section: usize, room: usize) -> Self {
        Self { section, room }
    }
}

/// Bidirectional map between pair keys and variable columns.
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    keys: Vec<PairKey>,
    columns: HashMap<PairKey, usize>,
}

impl VariableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key and returns its column (existing column if present).
    pub fn insert(&mut self, key: PairKey) -> usize {
        if let Some(&col) = self.columns.get(&key) {
            return col;
        }
        let col = self.keys.len();
        self.keys.push(key);
        self.columns.insert(key, col);
        col
    }

    /// Column of a key.
    pub fn column(&self, key: PairKey) -> Option<usize> {
        self.columns.get(&key).copied()
    }

    /// Key of a column.
    pub fn key(&self, column: usize) -> Option<PairKey> {
        self.keys.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(column, key)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, PairKey)> + '_ {
        self.keys.iter().copied().enumerate()
    }
}

/// Relation between a constraint's left-hand side and its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Eq,
    Le,
}

/// Hard-constraint families of the allocation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintFamily {
    /// Each section takes exactly one room.
    Assignment,
    /// `x * enrollment <= capacity` per candidate pair.
    Capacity,
    /// At most one section per (room, slot).
    TimeConflict,
}

/// `Σ coef * x[col]  (= | <=)  rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Diagnostic label, e.g. `assign[MAT001]`.
    pub name: String,
    pub family: ConstraintFamily,
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Left-hand side under a variable assignment.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(col, coef)| coef * values.get(col).copied().unwrap_or(0.0))
            .sum()
    }

    /// Whether a variable assignment satisfies this row (within `tol`).
    pub fn is_satisfied_by(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.lhs(values);
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs() <= tol,
            Sense::Le => lhs <= self.rhs + tol,
        }
    }
}

/// A binary minimization program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearProgram {
    /// Objective coefficient per column; every column is binary.
    pub objective: Vec<f64>,
    pub constraints: Vec<LinearConstraint>,
}

impl LinearProgram {
    /// Number of binary columns.
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Objective value under a variable assignment.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }

    /// Number of rows in a family.
    pub fn count(&self, family: ConstraintFamily) -> usize {
        self.constraints
            .iter()
            .filter(|c| c.family == family)
            .count()
    }
}
