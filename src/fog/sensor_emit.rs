//! 周期性发射事件：传感器按分布间隔发射，周期边按固定周期发射。

use super::id::SensorId;
use super::world::fog_world;
use crate::sim::{Event, SimError, Simulator, World};

/// 事件：传感器发射一次。
#[derive(Debug)]
pub struct SensorEmit {
    pub sensor: SensorId,
}

impl Event for SensorEmit {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let w = fog_world(world, "SensorEmit")?;
        w.emit_sensor(self.sensor, sim)
    }
}

/// 事件：应用 `app` 的第 `edge` 条周期边发射一次。
#[derive(Debug)]
pub struct PeriodicEmit {
    pub app: String,
    pub edge: usize,
}

impl Event for PeriodicEmit {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let PeriodicEmit { app, edge } = *self;
        let w = fog_world(world, "PeriodicEmit")?;
        w.emit_periodic(&app, edge, sim)
    }
}
