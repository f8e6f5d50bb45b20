//! 世界 trait
//!
//! 定义仿真世界接口：事件通过 `as_any_mut` 向下转型访问具体世界。

use super::simulator::Simulator;
use super::time::SimTime;
use std::any::Any;

/// 仿真世界：由业务层实现（例如雾计算拓扑、能耗统计等）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每个事件执行完后调用。
    fn on_tick(&mut self, _sim: &mut Simulator) {}

    /// 运行循环结束时调用（队列耗尽、到达时间上限、事件预算用尽或显式停止）。
    fn on_stop(&mut self, _now: SimTime) {}
}
