//! 元组到达事件
//!
//! 元组经过链路（或传感器接入时延）到达某个设备。

use tracing::trace;

use super::id::DeviceId;
use super::world::fog_world;
use crate::app::Tuple;
use crate::sim::{Event, SimError, Simulator, World};

/// 事件：把一个元组交给某个设备处理。
#[derive(Debug)]
pub struct TupleArrived {
    pub device: DeviceId,
    pub tuple: Tuple,
}

impl Event for TupleArrived {
    #[tracing::instrument(skip(self, sim, world), fields(tuple_id = self.tuple.id.0, device = self.device.0))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let TupleArrived { device, tuple } = *self;
        trace!(hops = tuple.hops, now = ?sim.now(), "元组到达设备");
        let w = fog_world(world, "TupleArrived")?;
        w.receive_tuple(device, tuple, sim)
    }
}
