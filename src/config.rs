//! Strategy and solver configuration.
//!
//! Plain serde structs with `Default` and `with_*` setters. A
//! [`StrategyConfig`] builds a ready-to-use [`AllocationStrategy`].
//!
//! # Example
//! ```
//! use u_roomalloc::config::{StrategyConfig, StrategyKind};
//!
//! let config = StrategyConfig::new(StrategyKind::Greedy);
//! let strategy = config.build();
//! assert_eq!(strategy.name(), "greedy");
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compatibility::{CompatibilityRule, FlexibleCompatibility, StrictCompatibility};
use crate::models::Equipment;
use crate::solver::{AllocationStrategy, ExactSolver, FallbackSolver, GreedySolver};

/// Default time budget of the exact backend.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 60_000;

/// Exact (MILP) backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactConfig {
    /// Wall-clock budget in milliseconds; `None` waits indefinitely.
    pub time_limit_ms: Option<u64>,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: Some(DEFAULT_TIME_LIMIT_MS),
        }
    }
}

impl ExactConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Removes the time budget.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

/// Order in which the greedy backend places sections.
///
/// Ties are always broken by section id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderingPolicy {
    /// Descending enrollment.
    #[default]
    LargestEnrollmentFirst,
    /// Fewest fitting rooms first, then descending enrollment.
    MostConstrainedFirst,
}

/// Greedy backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyConfig {
    pub ordering: OrderingPolicy,
}

impl GreedyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }
}

/// Compatibility rule selection.
///
/// An empty optional-equipment set selects the strict rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityConfig {
    /// Buildings reserved for sections locked to them.
    pub locked_locations: BTreeSet<String>,
    /// Equipment needs treated as non-blocking.
    pub optional_equipment: BTreeSet<Equipment>,
}

impl CompatibilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locked_location(mut self, location: impl Into<String>) -> Self {
        self.locked_locations.insert(location.into());
        self
    }

    pub fn with_optional_equipment(mut self, equipment: Equipment) -> Self {
        self.optional_equipment.insert(equipment);
        self
    }

    /// Builds the configured rule.
    pub fn build(&self) -> Arc<dyn CompatibilityRule> {
        let strict = self
            .locked_locations
            .iter()
            .fold(StrictCompatibility::new(), |rule, loc| {
                rule.with_locked_location(loc.clone())
            });
        if self.optional_equipment.is_empty() {
            return Arc::new(strict);
        }
        let flexible = self
            .optional_equipment
            .iter()
            .fold(FlexibleCompatibility::new(strict), |rule, eq| {
                rule.with_optional(*eq)
            });
        Arc::new(flexible)
    }
}

/// Which allocation strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    #[default]
    Exact,
    Greedy,
    /// Exact first; greedy if the exact backend times out or fails.
    ExactThenGreedy,
}

/// Full strategy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub exact: ExactConfig,
    pub greedy: GreedyConfig,
    pub compatibility: CompatibilityConfig,
}

impl StrategyConfig {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_exact(mut self, exact: ExactConfig) -> Self {
        self.exact = exact;
        self
    }

    pub fn with_greedy(mut self, greedy: GreedyConfig) -> Self {
        self.greedy = greedy;
        self
    }

    pub fn with_compatibility(mut self, compatibility: CompatibilityConfig) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// Builds the configured strategy.
    pub fn build(&self) -> Box<dyn AllocationStrategy> {
        let rule = self.compatibility.build();
        let exact = || {
            ExactSolver::new()
                .with_config(self.exact.clone())
                .with_shared_compatibility(rule.clone())
        };
        let greedy = || {
            GreedySolver::new()
                .with_config(self.greedy.clone())
                .with_shared_compatibility(rule.clone())
        };
        match self.kind {
            StrategyKind::Exact => Box::new(exact()),
            StrategyKind::Greedy => Box::new(greedy()),
            StrategyKind::ExactThenGreedy => Box::new(FallbackSolver::new(exact(), greedy())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StrategyConfig::default();
        assert_eq!(config.kind, StrategyKind::Exact);
        assert_eq!(config.exact.time_limit(), Some(Duration::from_secs(60)));
        assert_eq!(config.greedy.ordering, OrderingPolicy::LargestEnrollmentFirst);
        assert_eq!(config.compatibility.build().name(), "strict");
    }

    #[test]
    fn test_flexible_selected_by_optional_equipment() {
        let compat = CompatibilityConfig::new()
            .with_locked_location("IF")
            .with_optional_equipment(Equipment::Robotics);
        assert_eq!(compat.build().name(), "flexible");
    }

    #[test]
    fn test_build_strategies() {
        for (kind, name) in [
            (StrategyKind::Exact, "exact"),
            (StrategyKind::Greedy, "greedy"),
            (StrategyKind::ExactThenGreedy, "exact-then-greedy"),
        ] {
            assert_eq!(StrategyConfig::new(kind).build().name(), name);
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = StrategyConfig::new(StrategyKind::ExactThenGreedy)
            .with_exact(ExactConfig::new().with_time_limit_ms(500))
            .with_greedy(GreedyConfig::new().with_ordering(OrderingPolicy::MostConstrainedFirst))
            .with_compatibility(CompatibilityConfig::new().with_optional_equipment(Equipment::Electronics));
        let json = serde_json::to_string(&config).unwrap();
        let back: StrategyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: StrategyConfig = serde_json::from_str(r#"{"kind":"Greedy"}"#).unwrap();
        assert_eq!(config.kind, StrategyKind::Greedy);
        assert_eq!(config.exact, ExactConfig::default());

        let unlimited: ExactConfig = serde_json::from_str(r#"{"time_limit_ms":null}"#).unwrap();
        assert_eq!(unlimited.time_limit(), None);
    }
}
