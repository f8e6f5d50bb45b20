//! 处理器调度策略（PE scheduling disciplines）
//!
//! 每个设备持有一个调度器，把有限的 PE 算力分配给排队的模块执行请求，
//! 并给出完成时间。目前提供时间共享（默认）与空间共享两种策略。

use serde::{Deserialize, Serialize};

use crate::sim::SimTime;

mod space_shared;
mod time_shared;

pub use space_shared::SpaceSharedScheduler;
pub use time_shared::TimeSharedScheduler;

/// 执行请求标识符（在一次仿真内唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// 调度策略类型（设备构造时选择）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    #[default]
    TimeShared,
    SpaceShared,
}

impl SchedulerKind {
    /// 用给定的 PE 列表（每个 PE 的 MIPS）构建调度器
    pub fn build(self, pe_mips: &[f64]) -> Box<dyn ProcessorScheduler> {
        match self {
            SchedulerKind::TimeShared => Box::new(TimeSharedScheduler::new(pe_mips)),
            SchedulerKind::SpaceShared => Box::new(SpaceSharedScheduler::new(pe_mips)),
        }
    }
}

/// PE 调度器抽象
///
/// 调用方在任意状态变化前先 `advance_to(now)`；实现内部也会在 `admit`
/// / `take_finished` 中自行推进，所以重复推进到同一时刻是无害的。
pub trait ProcessorScheduler: std::fmt::Debug + Send {
    /// 接纳一个长度为 `length_mi`（百万指令）的请求，返回其当前预计完成时间。
    fn admit(&mut self, id: RequestId, length_mi: f64, now: SimTime) -> SimTime;

    /// 请求离开（完成或被移除）；其余请求的完成时间随之重新推导。
    fn on_departure(&mut self, id: RequestId, now: SimTime);

    /// 把所有进行中请求的进度推进到 `now`
    fn advance_to(&mut self, now: SimTime);

    /// 最早的预计完成时间
    fn next_completion(&self) -> Option<SimTime>;

    /// 取出在 `now` 之前（含）已完成的请求，按接纳顺序返回。
    fn take_finished(&mut self, now: SimTime) -> Vec<RequestId>;

    /// 当前 PE 利用率（0..=1）
    fn utilization(&self) -> f64;

    /// 进行中 + 等待中的请求数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 所有 PE 的 MIPS 总和
    fn capacity_mips(&self) -> f64;
}

/// 在 1ns 内可完成的工作量以下视为已完成（吸收纳秒取整误差）。
pub(crate) fn finish_threshold(rate_mips: f64) -> f64 {
    rate_mips * 1e-6 + 1e-9
}

/// 以给定速率执行剩余工作所需时间
pub(crate) fn duration_for(remaining_mi: f64, rate_mips: f64) -> SimTime {
    if remaining_mi <= finish_threshold(rate_mips) {
        return SimTime::ZERO;
    }
    if rate_mips <= 0.0 {
        return SimTime::MAX;
    }
    SimTime::try_from_millis_f64(remaining_mi / rate_mips).unwrap_or(SimTime::MAX)
}
