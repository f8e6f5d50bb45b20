//! 应用边
//!
//! 模块之间以及模块与传感器/执行器之间的数据流连接。

use serde::{Deserialize, Serialize};

/// What the two ends of an edge are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// sensor tag -> module
    SensorInput,
    /// module -> module
    Module,
    /// module -> actuator tag
    ActuatorOutput,
}

/// Logical tuple directions, kept for loop/branch disambiguation.
pub mod direction {
    pub const UP: u32 = 1;
    pub const DOWN: u32 = 2;
    pub const ACTUATOR: u32 = 3;
}

fn default_direction() -> u32 {
    direction::UP
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEdge {
    pub src: String,
    pub dst: String,
    /// Execution cost at the destination (MI).
    pub cpu_length: f64,
    /// Payload size (bytes), used with link bandwidth.
    pub nw_length: f64,
    pub tuple_type: String,
    #[serde(default = "default_direction")]
    pub direction: u32,
    pub kind: EdgeKind,
    /// When set, the source module emits this edge every period instead of
    /// in response to inputs.
    #[serde(default)]
    pub periodicity_ms: Option<f64>,
}

impl AppEdge {
    pub fn new(
        src: impl Into<String>,
        dst: impl Into<String>,
        cpu_length: f64,
        nw_length: f64,
        tuple_type: impl Into<String>,
        direction: u32,
        kind: EdgeKind,
    ) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            cpu_length,
            nw_length,
            tuple_type: tuple_type.into(),
            direction,
            kind,
            periodicity_ms: None,
        }
    }

    pub fn with_periodicity(mut self, period_ms: f64) -> Self {
        self.periodicity_ms = Some(period_ms);
        self
    }

    pub fn is_periodic(&self) -> bool {
        self.periodicity_ms.is_some()
    }
}
