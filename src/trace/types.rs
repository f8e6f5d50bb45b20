use serde::{Deserialize, Serialize};

/// Why a tuple could not be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingFailureReason {
    /// No device hosts the destination module.
    NoHost,
    /// No actuator with the destination tag is bound to the application.
    NoActuator,
    /// The target device is not reachable through the tree.
    Unreachable,
    /// The tuple names an application that was never submitted.
    UnknownApplication,
}

/// 轨迹事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceKind {
    /// A sensor or a periodic edge produced a new tuple.
    TupleCreated {
        tuple_id: u64,
        app: String,
        src: String,
        dst: String,
        tuple_type: String,
        device: Option<usize>,
    },
    /// The tuple was put on a link toward the next device.
    TupleForwarded {
        tuple_id: u64,
        from: usize,
        to: usize,
        arrive_ns: u64,
    },
    /// The tuple reached the device hosting its destination module and was
    /// handed to the scheduler.
    TupleDelivered {
        tuple_id: u64,
        device: usize,
        module: String,
        projected_done_ns: u64,
    },
    /// A module finished processing a tuple.
    ModuleCompleted {
        tuple_id: u64,
        device: usize,
        module: String,
        outputs: u32,
    },
    /// An actuator consumed a tuple.
    ActuatorReceived {
        tuple_id: u64,
        actuator: usize,
        end_to_end_ns: u64,
    },
    /// Device utilization (and therefore power draw) changed.
    EnergySample {
        device: usize,
        utilization: f64,
        power: f64,
    },
    /// The tuple was dropped because it could not be routed.
    RoutingFailure {
        tuple_id: u64,
        device: usize,
        dst: String,
        reason: RoutingFailureReason,
    },
}

/// 一条带时间戳的轨迹记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    #[serde(flatten)]
    pub kind: TraceKind,
}

/// 内存中的轨迹收集器
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, t_ns: u64, kind: TraceKind) {
        self.events.push(TraceEvent { t_ns, kind });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events matching a predicate on their kind.
    pub fn filter<'a, F>(&'a self, mut pred: F) -> impl Iterator<Item = &'a TraceEvent>
    where
        F: FnMut(&TraceKind) -> bool + 'a,
    {
        self.events.iter().filter(move |ev| pred(&ev.kind))
    }
}
