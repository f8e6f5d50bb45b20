//! 场景文件
//!
//! 用 JSON 描述一次完整的仿真：运行配置、设备树、应用、放置、传感器与执行器。
//! 字段风格与其他 JSON 输入一致：可选字段都带 `#[serde(default)]`。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::app::Application;
use crate::fog::{
    ActuatorSpec, DeviceSpec, FogWorld, SensorSpec, SimConfig, SimReport, TopologyError,
};
use crate::placement::{Controller, PlacementError, PlacementMapping};
use crate::sim::{SimError, Simulator};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema_version {0} (expected {SCHEMA_VERSION})")]
    UnsupportedSchema(u32),

    #[error("placement names unknown application {0:?}")]
    UnknownApplication(String),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// One `module -> device` assignment of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSpec {
    pub app: String,
    pub module: String,
    pub device: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub sim: SimConfig,
    /// Parents must come before their children.
    pub devices: Vec<DeviceSpec>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub placements: Vec<PlacementSpec>,
    #[serde(default)]
    pub sensors: Vec<SensorSpec>,
    #[serde(default)]
    pub actuators: Vec<ActuatorSpec>,
}

/// A built scenario, ready to run.
pub struct Scenario {
    pub sim: Simulator,
    pub world: FogWorld,
}

impl Scenario {
    pub fn run(&mut self) -> Result<SimReport, SimError> {
        Controller::run(&mut self.sim, &mut self.world)
    }
}

impl ScenarioSpec {
    pub fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(ScenarioError::UnsupportedSchema(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Per-application placement mappings.
    pub fn mappings(&self) -> Result<BTreeMap<String, PlacementMapping>, ScenarioError> {
        let mut out: BTreeMap<String, PlacementMapping> = BTreeMap::new();
        for p in &self.placements {
            if !self.applications.iter().any(|a| a.id == p.app) {
                return Err(ScenarioError::UnknownApplication(p.app.clone()));
            }
            out.entry(p.app.clone())
                .or_default()
                .add(p.module.as_str(), p.device.as_str())?;
        }
        Ok(out)
    }

    /// Build the topology, register endpoints and submit every application.
    pub fn build(&self) -> Result<Scenario, ScenarioError> {
        let mut sim = Simulator::default();
        let mut world = FogWorld::new(self.sim.clone());
        for d in &self.devices {
            world.add_device(d)?;
        }
        for s in &self.sensors {
            world.add_sensor(s.clone());
        }
        for a in &self.actuators {
            world.add_actuator(a.clone());
        }

        let mut mappings = self.mappings()?;
        for app in &self.applications {
            let mapping = mappings.remove(&app.id).unwrap_or_default();
            Controller::submit(&mut world, &mut sim, app.clone(), &mapping)?;
        }
        info!(
            devices = world.topology.len(),
            applications = self.applications.len(),
            sensors = self.sensors.len(),
            actuators = self.actuators.len(),
            "scenario built"
        );
        Ok(Scenario { sim, world })
    }
}
