//! Configuration of the ordering phase.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which heuristic reorders the free layer during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossMinStrategy {
    #[default]
    Barycenter,
    GreedySwitch,
    Median,
    ModelOrder,
    Interactive,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreedySwitchType {
    Off,
    /// Only the layer the sweep comes from is taken into account.
    OneSided,
    /// Both neighboring layers are taken into account.
    #[default]
    TwoSided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchicalSweepMode {
    /// Every nested graph is optimized on its own, deepest first.
    ForcedBottomUp,
    /// Nested graphs that are well connected to their external ports are swept together with
    /// their parent.
    #[default]
    CostBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDistributionStrategy {
    /// Rank-based distribution; the rank policy is drawn per graph.
    #[default]
    Barycenter,
    /// Adjacent port swaps driven by crossing counts.
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchicalOptions {
    pub enabled: bool,
    pub mode: HierarchicalSweepMode,
    /// Nested graphs whose connectivity to their external ports is below this value are
    /// optimized in isolation.
    pub recursive_boundary: f64,
}

impl Default for HierarchicalOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: HierarchicalSweepMode::CostBased,
            recursive_boundary: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossMinOptions {
    pub strategy: CrossMinStrategy,
    /// Mode of the greedy-switch strategy, and of the post-pass run after other strategies.
    pub greedy_switch: GreedySwitchType,
    /// The greedy-switch post-pass only runs on graphs with at most this many nodes (`0` lifts
    /// the limit).
    pub greedy_switch_activation_threshold: usize,
    /// Number of independent randomized runs.
    pub thoroughness: usize,
    pub hierarchical: HierarchicalOptions,
    pub port_distribution: PortDistributionStrategy,
    pub random_seed: u64,
}

impl Default for CrossMinOptions {
    fn default() -> Self {
        Self {
            strategy: CrossMinStrategy::Barycenter,
            greedy_switch: GreedySwitchType::TwoSided,
            greedy_switch_activation_threshold: 40,
            thoroughness: 7,
            hierarchical: HierarchicalOptions::default(),
            port_distribution: PortDistributionStrategy::Barycenter,
            random_seed: 1,
        }
    }
}

impl CrossMinOptions {
    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.thoroughness == 0 {
            return Err(Error::InvalidOptions(
                "thoroughness must be at least 1".to_string(),
            ));
        }
        if self.strategy == CrossMinStrategy::GreedySwitch
            && self.greedy_switch == GreedySwitchType::Off
        {
            return Err(Error::InvalidOptions(
                "the greedy-switch strategy needs a one-sided or two-sided mode".to_string(),
            ));
        }
        if !self.hierarchical.recursive_boundary.is_finite() {
            return Err(Error::InvalidOptions(
                "recursive_boundary must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether every nested graph is optimized on its own.
    pub fn bottom_up(&self) -> bool {
        !self.hierarchical.enabled || self.hierarchical.mode == HierarchicalSweepMode::ForcedBottomUp
    }

    /// Whether the greedy-switch post-pass applies to a graph with `node_count` nodes.
    pub fn greedy_post_pass_applies(&self, node_count: usize) -> bool {
        !matches!(
            self.strategy,
            CrossMinStrategy::GreedySwitch | CrossMinStrategy::Interactive | CrossMinStrategy::None
        ) && self.greedy_switch != GreedySwitchType::Off
            && (self.greedy_switch_activation_threshold == 0
                || node_count <= self.greedy_switch_activation_threshold)
    }
}
