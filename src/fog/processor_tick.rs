//! 处理器完成事件（驱动 PE 调度器出队）

use super::id::DeviceId;
use super::world::fog_world;
use crate::sim::{Event, SimError, Simulator, World};

/// 事件：设备上最早的执行请求在此刻完成。`generation` 与设备当前代号不一致
/// 时说明调度器状态已变，事件作废。
#[derive(Debug)]
pub struct ProcessorTick {
    pub device: DeviceId,
    pub generation: u64,
}

impl Event for ProcessorTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let ProcessorTick { device, generation } = *self;
        let w = fog_world(world, "ProcessorTick")?;
        w.on_processor_tick(device, generation, sim)
    }
}
