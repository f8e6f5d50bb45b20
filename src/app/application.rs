//! 应用图
//!
//! 模块、边、元组映射与环路；`validate` 在提交前检查端点、长度与周期。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::edge::{AppEdge, EdgeKind};
use super::selectivity::Selectivity;
use crate::placement::PlacementError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppModule {
    pub name: String,
    /// Informational only.
    #[serde(default)]
    pub ram: u64,
}

/// `(module, input type) -> output type` with the selectivity deciding how
/// many outputs are produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TupleMapping {
    pub module: String,
    pub input_type: String,
    pub output_type: String,
    pub selectivity: Selectivity,
}

/// An ordered chain of endpoints whose end-to-end delay is measured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppLoop {
    pub endpoints: Vec<String>,
}

impl AppLoop {
    pub fn head(&self) -> Option<&str> {
        self.endpoints.first().map(String::as_str)
    }

    pub fn tail(&self) -> Option<&str> {
        self.endpoints.last().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    #[serde(default)]
    modules: Vec<AppModule>,
    #[serde(default)]
    edges: Vec<AppEdge>,
    #[serde(default)]
    tuple_mappings: Vec<TupleMapping>,
    #[serde(default)]
    loops: Vec<AppLoop>,
}

impl Application {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn add_module(&mut self, name: impl Into<String>, ram: u64) -> &mut Self {
        self.modules.push(AppModule {
            name: name.into(),
            ram,
        });
        self
    }

    pub fn add_edge(&mut self, edge: AppEdge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_app_edge(
        &mut self,
        src: &str,
        dst: &str,
        cpu_length: f64,
        nw_length: f64,
        tuple_type: &str,
        direction: u32,
        kind: EdgeKind,
    ) -> &mut Self {
        self.add_edge(AppEdge::new(
            src, dst, cpu_length, nw_length, tuple_type, direction, kind,
        ))
    }

    pub fn add_tuple_mapping(
        &mut self,
        module: &str,
        input_type: &str,
        output_type: &str,
        selectivity: Selectivity,
    ) -> &mut Self {
        self.tuple_mappings.push(TupleMapping {
            module: module.to_string(),
            input_type: input_type.to_string(),
            output_type: output_type.to_string(),
            selectivity,
        });
        self
    }

    pub fn add_loop<S: AsRef<str>>(&mut self, endpoints: &[S]) -> &mut Self {
        self.loops.push(AppLoop {
            endpoints: endpoints.iter().map(|s| s.as_ref().to_string()).collect(),
        });
        self
    }

    pub fn modules(&self) -> &[AppModule] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&AppModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn edges(&self) -> &[AppEdge] {
        &self.edges
    }

    pub fn loops(&self) -> &[AppLoop] {
        &self.loops
    }

    /// Output edges of `module` triggered by an input of `input_type`, each
    /// with its selectivity. A miss is not an error: the module is a sink for
    /// that input type.
    pub fn outputs_for(&self, module: &str, input_type: &str) -> Vec<(&AppEdge, &Selectivity)> {
        self.edges
            .iter()
            .filter(|e| e.src == module && e.kind != EdgeKind::SensorInput && !e.is_periodic())
            .filter_map(|e| {
                self.tuple_mappings
                    .iter()
                    .find(|m| {
                        m.module == module
                            && m.input_type == input_type
                            && m.output_type == e.tuple_type
                    })
                    .map(|m| (e, &m.selectivity))
            })
            .collect()
    }

    /// Edges fed by sensors with the given tag.
    pub fn sensor_edges<'a>(&'a self, sensor_tag: &'a str) -> impl Iterator<Item = &'a AppEdge> {
        self.edges
            .iter()
            .filter(move |e| e.kind == EdgeKind::SensorInput && e.src == sensor_tag)
    }

    /// Periodic edges emitted by `module`, with their index.
    pub fn periodic_edges<'a>(
        &'a self,
        module: &'a str,
    ) -> impl Iterator<Item = (usize, &'a AppEdge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.src == module && e.is_periodic())
    }

    /// Check that every endpoint resolves to a module or to the tag of a
    /// sensor/actuator bound to this application.
    pub fn validate(
        &self,
        sensor_tags: &BTreeSet<String>,
        actuator_tags: &BTreeSet<String>,
    ) -> Result<(), PlacementError> {
        let mut names = BTreeSet::new();
        for m in &self.modules {
            if !names.insert(m.name.as_str()) {
                return Err(PlacementError::DuplicateModule {
                    app: self.id.clone(),
                    module: m.name.clone(),
                });
            }
        }

        let unknown = |endpoint: &str| PlacementError::UnknownEndpoint {
            app: self.id.clone(),
            endpoint: endpoint.to_string(),
        };
        let is_module = |name: &str| names.contains(name);

        for e in &self.edges {
            let (src_ok, dst_ok) = match e.kind {
                EdgeKind::SensorInput => (sensor_tags.contains(&e.src), is_module(e.dst.as_str())),
                EdgeKind::Module => (is_module(e.src.as_str()), is_module(e.dst.as_str())),
                EdgeKind::ActuatorOutput => {
                    (is_module(e.src.as_str()), actuator_tags.contains(&e.dst))
                }
            };
            if !src_ok {
                return Err(unknown(e.src.as_str()));
            }
            if !dst_ok {
                return Err(unknown(e.dst.as_str()));
            }
            let length_ok = |v: f64| v.is_finite() && v >= 0.0;
            if !(length_ok(e.cpu_length) && length_ok(e.nw_length)) {
                return Err(PlacementError::InvalidEdge {
                    app: self.id.clone(),
                    tuple_type: e.tuple_type.clone(),
                });
            }
            if let Some(p) = e.periodicity_ms {
                if !(p.is_finite() && p > 0.0) || e.kind == EdgeKind::SensorInput {
                    return Err(PlacementError::InvalidPeriodicity {
                        app: self.id.clone(),
                        tuple_type: e.tuple_type.clone(),
                    });
                }
            }
        }

        for m in &self.tuple_mappings {
            if !is_module(m.module.as_str()) {
                return Err(unknown(m.module.as_str()));
            }
        }

        for l in &self.loops {
            for ep in &l.endpoints {
                if !is_module(ep.as_str())
                    && !sensor_tags.contains(ep)
                    && !actuator_tags.contains(ep)
                {
                    return Err(unknown(ep.as_str()));
                }
            }
        }
        Ok(())
    }
}
