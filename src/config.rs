//! Runtime knobs for a grid.

use serde::{Deserialize, Serialize};

/// Execution settings that do not change automaton semantics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of x-slabs computed in parallel. 0 = available hardware parallelism.
    pub workers: usize,
    /// Neighbourhood radius for the threshold rule. Tree growth always uses 1.
    pub radius: usize,
    /// Seed for tree-growth randomness.
    pub seed: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            workers: 0,
            radius: 1,
            seed: 0,
        }
    }
}

impl GridConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Worker count actually used for a grid of side `dimension`.
    pub fn effective_workers(&self, dimension: usize) -> usize {
        let requested = if self.workers == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            self.workers
        };
        requested.clamp(1, dimension.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.workers, 0);
        assert_eq!(config.radius, 1);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_effective_workers_clamped() {
        assert_eq!(GridConfig::default().with_workers(8).effective_workers(3), 3);
        assert_eq!(GridConfig::default().with_workers(2).effective_workers(10), 2);
        let auto = GridConfig::default().effective_workers(1000);
        assert!(auto >= 1);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: GridConfig = serde_json::from_str(r#"{"workers": 4}"#).unwrap();
        assert_eq!(config, GridConfig::default().with_workers(4));
    }
}
