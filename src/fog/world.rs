//! 雾计算世界
//!
//! `FogWorld` 是显式的仿真上下文：持有设备树、已提交的应用、模块目录、
//! 传感器、执行器、带种子的 RNG、统计信息与可选的追踪日志。
//! 每次运行一个世界，同一进程内的多个仿真互不干扰。

use std::any::Any;
use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::config::SimConfig;
use super::device::DeviceSpec;
use super::endpoint::{Actuator, ActuatorSpec, Sensor, SensorSpec};
use super::id::{ActuatorId, DeviceId, SensorId};
use super::stats::{Mean, Stats};
use super::topology::{Topology, TopologyError};
use crate::app::{Application, TupleId};
use crate::sched::RequestId;
use crate::sim::{SimError, SimTime, World};
use crate::trace::{TraceKind, TraceLog};

pub struct FogWorld {
    pub topology: Topology,
    apps: BTreeMap<String, Application>,
    /// (app, module) -> hosting device
    directory: BTreeMap<(String, String), DeviceId>,
    sensors: Vec<Sensor>,
    actuators: Vec<Actuator>,
    pub(crate) rng: ChaCha8Rng,
    config: SimConfig,
    next_tuple_id: u64,
    next_request_id: u64,
    pub stats: Stats,
    pub trace: Option<TraceLog>,
}

impl Default for FogWorld {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl FogWorld {
    pub fn new(config: SimConfig) -> Self {
        Self {
            topology: Topology::default(),
            apps: BTreeMap::new(),
            directory: BTreeMap::new(),
            sensors: Vec::new(),
            actuators: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            next_tuple_id: 0,
            next_request_id: 0,
            stats: Stats::default(),
            trace: None,
        }
    }

    /// Start collecting a [`TraceLog`].
    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(TraceLog::default);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn add_device(&mut self, spec: &DeviceSpec) -> Result<DeviceId, TopologyError> {
        self.topology.add_device(spec, SimTime::ZERO)
    }

    pub fn add_sensor(&mut self, spec: SensorSpec) -> SensorId {
        let id = SensorId(self.sensors.len());
        self.sensors.push(Sensor {
            id,
            spec,
            gateway: None,
            emitted: 0,
        });
        id
    }

    pub fn add_actuator(&mut self, spec: ActuatorSpec) -> ActuatorId {
        let id = ActuatorId(self.actuators.len());
        self.actuators.push(Actuator {
            id,
            spec,
            gateway: None,
            received: 0,
        });
        id
    }

    pub fn device_id(&self, name: &str) -> Option<DeviceId> {
        self.topology.lookup(name)
    }

    pub fn application(&self, id: &str) -> Option<&Application> {
        self.apps.get(id)
    }

    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.apps.values()
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn sensor(&self, id: SensorId) -> &Sensor {
        &self.sensors[id.0]
    }

    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    pub fn actuator(&self, id: ActuatorId) -> &Actuator {
        &self.actuators[id.0]
    }

    /// Device hosting `module` of `app`, if placed.
    pub fn host_of(&self, app: &str, module: &str) -> Option<DeviceId> {
        self.directory
            .get(&(app.to_string(), module.to_string()))
            .copied()
    }

    pub(crate) fn register_application(&mut self, app: Application) {
        self.stats
            .loop_delays
            .insert(app.id.clone(), vec![Mean::default(); app.loops().len()]);
        self.apps.insert(app.id.clone(), app);
    }

    pub(crate) fn place(&mut self, app: &str, module: &str, ram: u64, device: DeviceId) {
        self.topology
            .device_mut(device)
            .instantiate(app, module, ram);
        self.directory
            .insert((app.to_string(), module.to_string()), device);
        debug!(app, module, device = device.0, "module instantiated");
    }

    pub(crate) fn bind_sensor(&mut self, id: SensorId, gateway: DeviceId) {
        self.sensors[id.0].gateway = Some(gateway);
        self.topology.device_mut(gateway).sensors.push(id);
    }

    pub(crate) fn bind_actuator(&mut self, id: ActuatorId, gateway: DeviceId) {
        self.actuators[id.0].gateway = Some(gateway);
        self.topology.device_mut(gateway).actuators.push(id);
    }

    pub(crate) fn sensors_mut(&mut self) -> &mut [Sensor] {
        &mut self.sensors
    }

    pub(crate) fn actuators_mut(&mut self) -> &mut [Actuator] {
        &mut self.actuators
    }

    pub(crate) fn alloc_tuple_id(&mut self) -> TupleId {
        let id = TupleId(self.next_tuple_id);
        self.next_tuple_id = self.next_tuple_id.wrapping_add(1);
        id
    }

    pub(crate) fn alloc_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request_id);
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }

    pub(crate) fn record(&mut self, now: SimTime, kind: TraceKind) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(now.0, kind);
        }
    }

    /// Close every energy meter at `now`.
    pub fn finish(&mut self, now: SimTime) {
        for dev in self.topology.devices_mut() {
            dev.close_meter(now);
        }
    }

    pub fn total_energy(&self) -> f64 {
        self.topology.devices().map(|d| d.energy()).sum()
    }
}

impl World for FogWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_stop(&mut self, now: SimTime) {
        self.finish(now);
    }
}

/// 事件辅助：把 `dyn World` 向下转型为 `FogWorld`。
pub(crate) fn fog_world<'a>(
    world: &'a mut dyn World,
    event: &'static str,
) -> Result<&'a mut FogWorld, SimError> {
    world
        .as_any_mut()
        .downcast_mut::<FogWorld>()
        .ok_or(SimError::WorldMismatch { event })
}

/// Float time units to [`SimTime`], rejecting negative or non-finite values.
pub(crate) fn millis(value: f64, what: &'static str) -> Result<SimTime, SimError> {
    SimTime::try_from_millis_f64(value).ok_or_else(|| SimError::InvalidDuration {
        what,
        value: value.to_string(),
    })
}
