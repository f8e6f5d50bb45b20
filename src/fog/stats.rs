//! 统计信息
//!
//! 定义雾计算仿真统计数据结构。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::DeviceId;
use crate::app::TupleId;
use crate::trace::RoutingFailureReason;

/// Running mean.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mean {
    pub count: u64,
    pub sum: f64,
}

impl Mean {
    pub fn add(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// A dropped tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingFailure {
    pub t_ns: u64,
    pub tuple_id: TupleId,
    pub app: String,
    pub dst: String,
    pub device: DeviceId,
    pub reason: RoutingFailureReason,
}

/// 仿真统计信息
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub tuples_created: u64,
    pub tuples_forwarded: u64,
    pub tuples_executed: u64,
    pub actuator_deliveries: u64,
    pub routing_failures: Vec<RoutingFailure>,
    /// Σ link latency (time units) × network length (bytes)
    pub network_usage: f64,
    /// Time from admission to completion, per tuple type (time units).
    pub cpu_time_by_type: BTreeMap<String, Mean>,
    /// Sensor emission to actuator arrival (time units).
    pub end_to_end: Mean,
    /// Per application, one entry per declared loop (time units).
    pub loop_delays: BTreeMap<String, Vec<Mean>>,
}
