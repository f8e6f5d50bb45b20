//! 执行器接收事件

use super::id::ActuatorId;
use super::world::fog_world;
use crate::app::Tuple;
use crate::sim::{Event, SimError, Simulator, World};

/// 事件：元组经过执行器接入时延后到达执行器。
#[derive(Debug)]
pub struct ActuatorArrival {
    pub actuator: ActuatorId,
    pub tuple: Tuple,
}

impl Event for ActuatorArrival {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let ActuatorArrival { actuator, tuple } = *self;
        let w = fog_world(world, "ActuatorArrival")?;
        w.on_actuator_arrival(actuator, tuple, sim)
    }
}
