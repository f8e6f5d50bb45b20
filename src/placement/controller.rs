//! 控制器
//!
//! `submit` 先完整校验，再修改世界：校验失败时世界保持原样。
//! `run` 按配置的时间上限 / 事件预算驱动仿真并生成报告。

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use super::mapping::{ModulePlacement, PlacementMapping};
use super::PlacementError;
use crate::app::Application;
use crate::fog::{ActuatorId, DeviceId, FogWorld, PeriodicEmit, SensorEmit, SensorId, SimReport};
use crate::sim::{SimError, SimTime, Simulator};

/// Drives application submission and the run loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Controller;

/// Everything `submit` needs, resolved before the world is touched.
struct Plan {
    modules: Vec<(String, u64, DeviceId)>,
    sensors: Vec<(SensorId, DeviceId)>,
    actuators: Vec<(ActuatorId, DeviceId)>,
    periodic: Vec<(usize, SimTime)>,
}

impl Controller {
    /// Place the modules of `app` with the policy's mapping and submit it.
    pub fn submit_with(
        world: &mut FogWorld,
        sim: &mut Simulator,
        app: Application,
        policy: &dyn ModulePlacement,
    ) -> Result<(), PlacementError> {
        let mapping = policy.place(&app, world)?;
        Self::submit(world, sim, app, &mapping)
    }

    /// Validate `app` against `mapping` and the world, then instantiate its
    /// modules, bind its sensors/actuators and schedule the first emissions.
    #[tracing::instrument(skip_all, fields(app = %app.id))]
    pub fn submit(
        world: &mut FogWorld,
        sim: &mut Simulator,
        app: Application,
        mapping: &PlacementMapping,
    ) -> Result<(), PlacementError> {
        let plan = Self::plan(world, sim.now(), &app, mapping)?;

        let app_id = app.id.clone();
        world.register_application(app);
        for (module, ram, device) in &plan.modules {
            world.place(&app_id, module, *ram, *device);
        }
        for &(sensor, gateway) in &plan.sensors {
            world.bind_sensor(sensor, gateway);
        }
        for &(actuator, gateway) in &plan.actuators {
            world.bind_actuator(actuator, gateway);
        }

        let touched: BTreeSet<DeviceId> = plan.modules.iter().map(|(_, _, d)| *d).collect();
        for id in touched {
            let dev = world.topology.device(id);
            if dev.ram() > 0 && dev.ram_in_use() > dev.ram() {
                warn!(
                    device = dev.name(),
                    ram = dev.ram(),
                    in_use = dev.ram_in_use(),
                    "device RAM overcommitted"
                );
            }
        }

        let now = sim.now();
        for &(sensor, _) in &plan.sensors {
            sim.schedule(now, SensorEmit { sensor })?;
        }
        for &(edge, at) in &plan.periodic {
            sim.schedule(
                at,
                PeriodicEmit {
                    app: app_id.clone(),
                    edge,
                },
            )?;
        }

        info!(
            modules = plan.modules.len(),
            sensors = plan.sensors.len(),
            actuators = plan.actuators.len(),
            periodic = plan.periodic.len(),
            "application submitted"
        );
        Ok(())
    }

    fn plan(
        world: &FogWorld,
        now: SimTime,
        app: &Application,
        mapping: &PlacementMapping,
    ) -> Result<Plan, PlacementError> {
        if world.application(&app.id).is_some() {
            return Err(PlacementError::DuplicateApplication(app.id.clone()));
        }

        let device = |name: &str| {
            world
                .device_id(name)
                .ok_or_else(|| PlacementError::UnknownDevice(name.to_string()))
        };
        let latency_ok = |ms: f64| SimTime::try_from_millis_f64(ms).is_some();

        let mut sensor_tags = BTreeSet::new();
        let mut sensors = Vec::new();
        for s in world.sensors().iter().filter(|s| s.spec.app_id == app.id) {
            let gateway = s.spec.gateway.as_deref().ok_or_else(|| PlacementError::MissingGateway {
                app: app.id.clone(),
                endpoint: s.spec.name.clone(),
            })?;
            if !latency_ok(s.spec.latency_ms) {
                return Err(PlacementError::InvalidLatency {
                    endpoint: s.spec.name.clone(),
                });
            }
            if !s.spec.distribution.advances() {
                return Err(PlacementError::InvalidDistribution {
                    sensor: s.spec.name.clone(),
                });
            }
            sensors.push((s.id, device(gateway)?));
            sensor_tags.insert(s.spec.tuple_type.clone());
        }

        let mut actuator_tags = BTreeSet::new();
        let mut actuators = Vec::new();
        for a in world.actuators().iter().filter(|a| a.spec.app_id == app.id) {
            let gateway = a.spec.gateway.as_deref().ok_or_else(|| PlacementError::MissingGateway {
                app: app.id.clone(),
                endpoint: a.spec.name.clone(),
            })?;
            if !latency_ok(a.spec.latency_ms) {
                return Err(PlacementError::InvalidLatency {
                    endpoint: a.spec.name.clone(),
                });
            }
            actuators.push((a.id, device(gateway)?));
            actuator_tags.insert(a.spec.actuator_type.clone());
        }

        app.validate(&sensor_tags, &actuator_tags)?;

        let mut modules = Vec::new();
        let mut hosts: BTreeMap<&str, DeviceId> = BTreeMap::new();
        for m in app.modules() {
            let name = mapping
                .device_for(&m.name)
                .ok_or_else(|| PlacementError::UnplacedModule {
                    app: app.id.clone(),
                    module: m.name.clone(),
                })?;
            let id = device(name)?;
            hosts.insert(m.name.as_str(), id);
            modules.push((m.name.clone(), m.ram, id));
        }
        for (module, _) in mapping.iter() {
            if !hosts.contains_key(module) {
                return Err(PlacementError::UnknownEndpoint {
                    app: app.id.clone(),
                    endpoint: module.to_string(),
                });
            }
        }

        let mut periodic = Vec::new();
        for (i, e) in app.edges().iter().enumerate() {
            if let Some(p) = e.periodicity_ms {
                let period = SimTime::try_from_millis_f64(p).ok_or_else(|| {
                    PlacementError::InvalidPeriodicity {
                        app: app.id.clone(),
                        tuple_type: e.tuple_type.clone(),
                    }
                })?;
                periodic.push((i, now.saturating_add(period)));
            }
        }

        Ok(Plan {
            modules,
            sensors,
            actuators,
            periodic,
        })
    }

    /// Run until the queue drains, the configured horizon (inclusive), the
    /// event budget, or an explicit stop. Energy meters are closed at the
    /// final time before the report is collected.
    pub fn run(sim: &mut Simulator, world: &mut FogWorld) -> Result<SimReport, SimError> {
        let config = world.config().clone();
        sim.set_event_budget(config.max_events);
        let outcome = match config.until_ms {
            Some(ms) => {
                let until = SimTime::try_from_millis_f64(ms).ok_or_else(|| {
                    SimError::InvalidDuration {
                        what: "run horizon",
                        value: ms.to_string(),
                    }
                })?;
                sim.run_until(until, world)?
            }
            None => sim.run(world)?,
        };
        Ok(SimReport::collect(world, outcome))
    }
}
