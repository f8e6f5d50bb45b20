//! 静态模块放置

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PlacementError;
use crate::app::Application;
use crate::fog::FogWorld;

/// Module name -> device name, one entry per module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementMapping {
    entries: BTreeMap<String, String>,
}

impl PlacementMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        module: impl Into<String>,
        device: impl Into<String>,
    ) -> Result<&mut Self, PlacementError> {
        let module = module.into();
        if self.entries.contains_key(&module) {
            return Err(PlacementError::DuplicatePlacement(module));
        }
        self.entries.insert(module, device.into());
        Ok(self)
    }

    pub fn device_for(&self, module: &str) -> Option<&str> {
        self.entries.get(module).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(m, d)| (m.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A placement policy: decides where each module of an application runs.
pub trait ModulePlacement {
    fn place(&self, app: &Application, world: &FogWorld) -> Result<PlacementMapping, PlacementError>;
}

/// Hands out a fixed, user-supplied mapping.
#[derive(Debug, Clone, Default)]
pub struct MappingPlacement {
    mapping: PlacementMapping,
}

impl MappingPlacement {
    pub fn new(mapping: PlacementMapping) -> Self {
        Self { mapping }
    }
}

impl ModulePlacement for MappingPlacement {
    fn place(&self, _app: &Application, _world: &FogWorld) -> Result<PlacementMapping, PlacementError> {
        Ok(self.mapping.clone())
    }
}
