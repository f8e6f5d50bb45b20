//! 雾设备
//!
//! 设备持有 PE（经由调度器）、到父节点的链路、能耗计量器以及部署在其上的模块实例。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::{ActuatorId, DeviceId, SensorId};
use super::power::{EnergyMeter, PowerModel};
use crate::app::Tuple;
use crate::sched::{ProcessorScheduler, RequestId, SchedulerKind};
use crate::sim::SimTime;

/// Construction parameters of a device (also the scenario JSON shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub name: String,
    /// 0 = cloud, increasing toward the edge.
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub parent: Option<String>,
    /// MIPS of each processing element.
    pub pe_mips: Vec<f64>,
    #[serde(default)]
    pub ram: u64,
    /// bytes per time unit
    pub uplink_bandwidth: f64,
    /// bytes per time unit
    pub downlink_bandwidth: f64,
    #[serde(default)]
    pub uplink_latency_ms: f64,
    pub busy_power: f64,
    pub idle_power: f64,
    #[serde(default)]
    pub rate_per_mips: f64,
    #[serde(default)]
    pub scheduler: SchedulerKind,
}

impl DeviceSpec {
    /// Single-PE device with unit bandwidth and zero power draw.
    pub fn new(name: impl Into<String>, mips: f64) -> Self {
        Self {
            name: name.into(),
            level: 0,
            parent: None,
            pe_mips: vec![mips],
            ram: 0,
            uplink_bandwidth: 1.0,
            downlink_bandwidth: 1.0,
            uplink_latency_ms: 0.0,
            busy_power: 0.0,
            idle_power: 0.0,
            rate_per_mips: 0.0,
            scheduler: SchedulerKind::TimeShared,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>, level: u32) -> Self {
        self.parent = Some(parent.into());
        self.level = level;
        self
    }

    pub fn with_pes(mut self, pe_mips: Vec<f64>) -> Self {
        self.pe_mips = pe_mips;
        self
    }

    pub fn with_ram(mut self, ram: u64) -> Self {
        self.ram = ram;
        self
    }

    pub fn with_bandwidth(mut self, uplink: f64, downlink: f64) -> Self {
        self.uplink_bandwidth = uplink;
        self.downlink_bandwidth = downlink;
        self
    }

    pub fn with_uplink_latency(mut self, latency_ms: f64) -> Self {
        self.uplink_latency_ms = latency_ms;
        self
    }

    pub fn with_power(mut self, busy_power: f64, idle_power: f64) -> Self {
        self.busy_power = busy_power;
        self.idle_power = idle_power;
        self
    }

    pub fn with_rate_per_mips(mut self, rate: f64) -> Self {
        self.rate_per_mips = rate;
        self
    }

    pub fn with_scheduler(mut self, kind: SchedulerKind) -> Self {
        self.scheduler = kind;
        self
    }
}

/// A module placed on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInstance {
    pub app_id: String,
    pub module: String,
    pub ram: u64,
}

/// One tuple being processed by a module.
#[derive(Debug, Clone)]
pub struct Execution {
    pub request: RequestId,
    pub module: String,
    pub tuple: Tuple,
    pub admitted_at: SimTime,
}

#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    name: String,
    level: u32,
    pub(crate) parent: Option<DeviceId>,
    pub(crate) children: Vec<DeviceId>,
    pe_mips: Vec<f64>,
    ram: u64,
    uplink_bandwidth: f64,
    downlink_bandwidth: f64,
    uplink_latency: SimTime,
    scheduler: Box<dyn ProcessorScheduler>,
    meter: EnergyMeter,
    modules: Vec<ModuleInstance>,
    executions: BTreeMap<RequestId, Execution>,
    tick_generation: u64,
    pub(crate) uplink_busy_until: SimTime,
    pub(crate) downlink_busy_until: SimTime,
    pub(crate) sensors: Vec<SensorId>,
    pub(crate) actuators: Vec<ActuatorId>,
}

impl Device {
    /// Build a device from an already-validated spec.
    pub(crate) fn new(
        id: DeviceId,
        spec: &DeviceSpec,
        parent: Option<DeviceId>,
        uplink_latency: SimTime,
        now: SimTime,
    ) -> Self {
        let total_mips: f64 = spec.pe_mips.iter().sum();
        Self {
            id,
            name: spec.name.clone(),
            level: spec.level,
            parent,
            children: Vec::new(),
            pe_mips: spec.pe_mips.clone(),
            ram: spec.ram,
            uplink_bandwidth: spec.uplink_bandwidth,
            downlink_bandwidth: spec.downlink_bandwidth,
            uplink_latency,
            scheduler: spec.scheduler.build(&spec.pe_mips),
            meter: EnergyMeter::new(
                PowerModel::new(spec.busy_power, spec.idle_power),
                spec.rate_per_mips,
                total_mips,
                now,
            ),
            modules: Vec::new(),
            executions: BTreeMap::new(),
            tick_generation: 0,
            uplink_busy_until: SimTime::ZERO,
            downlink_busy_until: SimTime::ZERO,
            sensors: Vec::new(),
            actuators: Vec::new(),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn parent(&self) -> Option<DeviceId> {
        self.parent
    }

    pub fn children(&self) -> &[DeviceId] {
        &self.children
    }

    pub fn pe_mips(&self) -> &[f64] {
        &self.pe_mips
    }

    pub fn total_mips(&self) -> f64 {
        self.pe_mips.iter().sum()
    }

    pub fn ram(&self) -> u64 {
        self.ram
    }

    pub fn uplink_bandwidth(&self) -> f64 {
        self.uplink_bandwidth
    }

    pub fn downlink_bandwidth(&self) -> f64 {
        self.downlink_bandwidth
    }

    pub fn uplink_latency(&self) -> SimTime {
        self.uplink_latency
    }

    pub fn modules(&self) -> &[ModuleInstance] {
        &self.modules
    }

    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    pub fn actuators(&self) -> &[ActuatorId] {
        &self.actuators
    }

    pub fn hosts(&self, app_id: &str, module: &str) -> bool {
        self.modules
            .iter()
            .any(|m| m.app_id == app_id && m.module == module)
    }

    /// RAM requested by the hosted modules.
    pub fn ram_in_use(&self) -> u64 {
        self.modules.iter().map(|m| m.ram).sum()
    }

    pub fn energy(&self) -> f64 {
        self.meter.energy()
    }

    pub fn cost(&self) -> f64 {
        self.meter.cost()
    }

    pub fn utilization(&self) -> f64 {
        self.scheduler.utilization()
    }

    pub(crate) fn instantiate(&mut self, app_id: &str, module: &str, ram: u64) {
        if !self.hosts(app_id, module) {
            self.modules.push(ModuleInstance {
                app_id: app_id.to_string(),
                module: module.to_string(),
                ram,
            });
        }
    }

    /// Hand an execution to the scheduler; returns the projected completion.
    pub(crate) fn admit(&mut self, exec: Execution, now: SimTime) -> SimTime {
        let done_at = self
            .scheduler
            .admit(exec.request, exec.tuple.cpu_length, now);
        self.executions.insert(exec.request, exec);
        done_at
    }

    pub(crate) fn take_finished(&mut self, now: SimTime) -> Vec<Execution> {
        self.scheduler
            .take_finished(now)
            .into_iter()
            .filter_map(|id| self.executions.remove(&id))
            .collect()
    }

    /// Re-read utilization after a scheduler change. Returns the new
    /// `(utilization, power)` when the level changed.
    pub(crate) fn sample_power(&mut self, now: SimTime) -> Option<(f64, f64)> {
        let u = self.scheduler.utilization();
        if self.meter.update(now, u) {
            Some((u, self.meter.power()))
        } else {
            None
        }
    }

    pub(crate) fn close_meter(&mut self, now: SimTime) {
        self.meter.close(now);
    }

    /// Invalidate outstanding ticks and return the next one to schedule.
    pub(crate) fn next_tick(&mut self) -> Option<(SimTime, u64)> {
        self.tick_generation = self.tick_generation.wrapping_add(1);
        self.scheduler
            .next_completion()
            .map(|at| (at, self.tick_generation))
    }

    pub(crate) fn is_current_tick(&self, generation: u64) -> bool {
        self.tick_generation == generation
    }
}
