//! 运行报告
//!
//! 运行结束后从 `FogWorld` 汇总的结果，可序列化为 JSON，也可以按行打印。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::world::FogWorld;
use crate::sim::{RunOutcome, StopReason};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReport {
    pub name: String,
    pub level: u32,
    pub energy: f64,
    pub cost: f64,
    /// Utilization at the end of the run.
    pub utilization: f64,
    pub ram_in_use: u64,
    pub uplink_bandwidth: f64,
    pub downlink_bandwidth: f64,
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopReport {
    pub endpoints: Vec<String>,
    pub samples: u64,
    pub average_delay_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub final_time_ms: f64,
    pub events: u64,
    pub reason: StopReason,
    pub devices: Vec<DeviceReport>,
    pub total_energy: f64,
    pub total_cost: f64,
    pub tuples_created: u64,
    pub tuples_forwarded: u64,
    pub tuples_executed: u64,
    pub actuator_deliveries: u64,
    pub routing_failures: usize,
    pub network_usage: f64,
    /// Average admission-to-completion time per tuple type.
    pub cpu_time_by_type: BTreeMap<String, f64>,
    pub average_end_to_end_ms: Option<f64>,
    pub loops: BTreeMap<String, Vec<LoopReport>>,
}

impl SimReport {
    /// Meters must already be closed (the run loop does it on exit).
    pub fn collect(world: &FogWorld, outcome: RunOutcome) -> Self {
        let devices: Vec<DeviceReport> = world
            .topology
            .devices()
            .map(|d| DeviceReport {
                name: d.name().to_string(),
                level: d.level(),
                energy: d.energy(),
                cost: d.cost(),
                utilization: d.utilization(),
                ram_in_use: d.ram_in_use(),
                uplink_bandwidth: d.uplink_bandwidth(),
                downlink_bandwidth: d.downlink_bandwidth(),
                modules: d
                    .modules()
                    .iter()
                    .map(|m| format!("{}/{}", m.app_id, m.module))
                    .collect(),
            })
            .collect();

        let stats = &world.stats;
        let loops = world
            .applications()
            .map(|app| {
                let means = stats.loop_delays.get(&app.id);
                let reports = app
                    .loops()
                    .iter()
                    .enumerate()
                    .map(|(i, l)| {
                        let m = means.and_then(|v| v.get(i)).copied().unwrap_or_default();
                        LoopReport {
                            endpoints: l.endpoints.clone(),
                            samples: m.count,
                            average_delay_ms: m.mean(),
                        }
                    })
                    .collect();
                (app.id.clone(), reports)
            })
            .collect();

        Self {
            final_time_ms: outcome.final_time.as_millis_f64(),
            events: outcome.events,
            reason: outcome.reason,
            total_energy: devices.iter().map(|d| d.energy).sum(),
            total_cost: devices.iter().map(|d| d.cost).sum(),
            devices,
            tuples_created: stats.tuples_created,
            tuples_forwarded: stats.tuples_forwarded,
            tuples_executed: stats.tuples_executed,
            actuator_deliveries: stats.actuator_deliveries,
            routing_failures: stats.routing_failures.len(),
            network_usage: stats.network_usage,
            cpu_time_by_type: stats
                .cpu_time_by_type
                .iter()
                .filter_map(|(k, m)| m.mean().map(|v| (k.clone(), v)))
                .collect(),
            average_end_to_end_ms: stats.end_to_end.mean(),
            loops,
        }
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "finished: reason={:?} events={} time={:.3}ms",
            self.reason, self.events, self.final_time_ms
        )?;
        for d in &self.devices {
            writeln!(
                f,
                "device {} level={} energy={:.3} cost={:.3} utilization={:.3}",
                d.name, d.level, d.energy, d.cost, d.utilization
            )?;
        }
        writeln!(
            f,
            "tuples: created={} forwarded={} executed={} actuated={} dropped={}",
            self.tuples_created,
            self.tuples_forwarded,
            self.tuples_executed,
            self.actuator_deliveries,
            self.routing_failures
        )?;
        writeln!(f, "network_usage {:.3}", self.network_usage)?;
        for (ty, v) in &self.cpu_time_by_type {
            writeln!(f, "cpu_time {ty} {v:.6}")?;
        }
        if let Some(v) = self.average_end_to_end_ms {
            writeln!(f, "end_to_end {v:.6}")?;
        }
        for (app, loops) in &self.loops {
            for l in loops {
                match l.average_delay_ms {
                    Some(v) => writeln!(f, "loop {app} [{}] {v:.6}", l.endpoints.join(" -> "))?,
                    None => writeln!(f, "loop {app} [{}] -", l.endpoints.join(" -> "))?,
                }
            }
        }
        Ok(())
    }
}
