//! 设备树（扁平表 + 下标引用）
//!
//! 父子关系只通过 `DeviceId` 表达，拓扑表是唯一的所有者。路由沿树走：
//! 目标在子树内则下行到对应子节点，否则上行到父节点。

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::device::{Device, DeviceSpec};
use super::id::DeviceId;
use crate::sim::SimTime;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("device {0:?} already exists")]
    DuplicateDevice(String),

    #[error("device {device:?} names unknown parent {parent:?}")]
    UnknownParent { device: String, parent: String },

    #[error("device {device:?} at level {level} must sit below parent {parent:?} at level {parent_level}")]
    LevelOrder {
        device: String,
        level: u32,
        parent: String,
        parent_level: u32,
    },

    #[error("device {device:?} has no parent but {root:?} is already the root")]
    MultipleRoots { device: String, root: String },

    #[error("device {device:?}: {reason}")]
    InvalidCapacity { device: String, reason: String },
}

#[derive(Debug, Default)]
pub struct Topology {
    devices: Vec<Device>,
    by_name: HashMap<String, DeviceId>,
    root: Option<DeviceId>,
}

fn check_capacity(spec: &DeviceSpec) -> Result<SimTime, TopologyError> {
    let invalid = |reason: &str| TopologyError::InvalidCapacity {
        device: spec.name.clone(),
        reason: reason.to_string(),
    };
    if spec.pe_mips.is_empty() {
        return Err(invalid("at least one processing element is required"));
    }
    if spec.pe_mips.iter().any(|m| !(m.is_finite() && *m > 0.0)) {
        return Err(invalid("PE MIPS must be positive"));
    }
    if !(spec.uplink_bandwidth > 0.0 && spec.downlink_bandwidth > 0.0) {
        return Err(invalid("link bandwidth must be positive"));
    }
    if spec.busy_power < 0.0 || spec.idle_power < 0.0 {
        return Err(invalid("power coefficients must be non-negative"));
    }
    SimTime::try_from_millis_f64(spec.uplink_latency_ms)
        .ok_or_else(|| invalid("uplink latency must be a non-negative number"))
}

impl Topology {
    /// Add a device. Parents must be added before their children.
    pub fn add_device(&mut self, spec: &DeviceSpec, now: SimTime) -> Result<DeviceId, TopologyError> {
        if self.by_name.contains_key(&spec.name) {
            return Err(TopologyError::DuplicateDevice(spec.name.clone()));
        }
        let uplink_latency = check_capacity(spec)?;

        let parent = match &spec.parent {
            Some(parent_name) => {
                let pid = *self.by_name.get(parent_name).ok_or_else(|| {
                    TopologyError::UnknownParent {
                        device: spec.name.clone(),
                        parent: parent_name.clone(),
                    }
                })?;
                let parent_level = self.devices[pid.0].level();
                if spec.level <= parent_level {
                    return Err(TopologyError::LevelOrder {
                        device: spec.name.clone(),
                        level: spec.level,
                        parent: parent_name.clone(),
                        parent_level,
                    });
                }
                Some(pid)
            }
            None => {
                if let Some(root) = self.root {
                    return Err(TopologyError::MultipleRoots {
                        device: spec.name.clone(),
                        root: self.devices[root.0].name().to_string(),
                    });
                }
                None
            }
        };

        let id = DeviceId(self.devices.len());
        self.devices
            .push(Device::new(id, spec, parent, uplink_latency, now));
        self.by_name.insert(spec.name.clone(), id);
        match parent {
            Some(pid) => self.devices[pid.0].children.push(id),
            None => self.root = Some(id),
        }
        debug!(device = %spec.name, id = id.0, parent = ?parent, level = spec.level, "added device");
        Ok(id)
    }

    pub fn root(&self) -> Option<DeviceId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<DeviceId> {
        self.by_name.get(name).copied()
    }

    pub fn device(&self, id: DeviceId) -> &Device {
        &self.devices[id.0]
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> &mut Device {
        &mut self.devices[id.0]
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.0)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub(crate) fn devices_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    /// Next device on the tree path from `from` toward `to`.
    pub fn next_hop(&self, from: DeviceId, to: DeviceId) -> Option<DeviceId> {
        if from == to || self.get(from).is_none() || self.get(to).is_none() {
            return None;
        }
        let mut cur = to;
        while let Some(p) = self.devices[cur.0].parent {
            if p == from {
                return Some(cur);
            }
            cur = p;
        }
        self.devices[from.0].parent
    }

    /// Full hop sequence from `from` to `to` (both included).
    pub fn path(&self, from: DeviceId, to: DeviceId) -> Option<Vec<DeviceId>> {
        self.get(from)?;
        self.get(to)?;
        let mut path = vec![from];
        let mut cur = from;
        while cur != to {
            cur = self.next_hop(cur, to)?;
            path.push(cur);
            if path.len() > self.devices.len() {
                return None;
            }
        }
        Some(path)
    }
}
