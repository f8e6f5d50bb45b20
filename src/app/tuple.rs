//! 元组
//!
//! 沿应用边流动的数据/计算单元。按值传递，每跳产生新的副本。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::edge::{AppEdge, EdgeKind};
use crate::fog::ActuatorId;
use crate::sim::SimTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TupleId(pub u64);

/// A tuple in flight.
///
/// Tuples are treated as values: forwarding consumes a tuple and yields the
/// next hop's copy (see [`Tuple::hop`]); processing synthesizes new tuples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuple {
    pub id: TupleId,
    pub app_id: String,
    /// Source module or sensor tag.
    pub src: String,
    /// Destination module or actuator tag.
    pub dst: String,
    pub tuple_type: String,
    pub kind: EdgeKind,
    pub direction: u32,
    /// MI
    pub cpu_length: f64,
    /// bytes
    pub nw_length: f64,
    pub created_at: SimTime,
    /// Emission time of the sensor (or periodic) tuple this one descends from.
    pub emitted_at: SimTime,
    /// Time spent on links and sensor/actuator attachments so far.
    pub network_latency: SimTime,
    pub hops: u32,
    /// Set on the per-actuator copies of an actuator-bound tuple.
    pub actuator: Option<ActuatorId>,
    /// Application loop index -> time the tuple's lineage entered the loop head.
    #[serde(default)]
    pub loop_marks: BTreeMap<usize, SimTime>,
}

impl Tuple {
    /// A fresh tuple with no ancestry (sensor or periodic emission).
    pub fn from_edge(id: TupleId, app_id: &str, edge: &AppEdge, now: SimTime) -> Self {
        Self {
            id,
            app_id: app_id.to_string(),
            src: edge.src.clone(),
            dst: edge.dst.clone(),
            tuple_type: edge.tuple_type.clone(),
            kind: edge.kind,
            direction: edge.direction,
            cpu_length: edge.cpu_length,
            nw_length: edge.nw_length,
            created_at: now,
            emitted_at: now,
            network_latency: SimTime::ZERO,
            hops: 0,
            actuator: None,
            loop_marks: BTreeMap::new(),
        }
    }

    /// An output tuple produced while processing `self`.
    pub fn derive(&self, id: TupleId, edge: &AppEdge, now: SimTime) -> Self {
        Self {
            emitted_at: self.emitted_at,
            loop_marks: self.loop_marks.clone(),
            ..Self::from_edge(id, &self.app_id, edge, now)
        }
    }

    /// The copy that arrives at the next device after `delay`.
    pub fn hop(mut self, delay: SimTime) -> Self {
        self.hops = self.hops.saturating_add(1);
        self.network_latency = self.network_latency.saturating_add(delay);
        self
    }

    /// The copy that crosses a sensor/actuator attachment after `delay`.
    pub fn delayed(mut self, delay: SimTime) -> Self {
        self.network_latency = self.network_latency.saturating_add(delay);
        self
    }

    /// The copy addressed to one specific actuator.
    pub fn for_actuator(mut self, id: TupleId, actuator: ActuatorId) -> Self {
        self.id = id;
        self.actuator = Some(actuator);
        self
    }

    pub fn targets_actuator(&self) -> bool {
        self.kind == EdgeKind::ActuatorOutput
    }
}
