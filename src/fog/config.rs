//! 运行配置

use serde::{Deserialize, Serialize};

/// Default horizon in time units.
pub const DEFAULT_UNTIL_MS: f64 = 10_000.0;

fn default_until() -> Option<f64> {
    Some(DEFAULT_UNTIL_MS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Inclusive horizon; `None` runs until the queue drains.
    #[serde(default = "default_until")]
    pub until_ms: Option<f64>,
    /// Safety valve for cyclic applications.
    #[serde(default)]
    pub max_events: Option<u64>,
    /// Transmit one tuple at a time per link direction.
    #[serde(default)]
    pub link_queueing: bool,
    /// Seed for selectivity and distribution sampling.
    #[serde(default)]
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            until_ms: default_until(),
            max_events: None,
            link_queueing: false,
            seed: 0,
        }
    }
}
