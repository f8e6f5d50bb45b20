//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::error::SimError;
use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use tracing::{debug, info, trace, warn};

/// 运行循环结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// 事件队列耗尽（`EmptyQueue`）
    Drained,
    /// 下一个事件晚于时间上限
    TimeLimit,
    /// 已执行事件数达到预算
    EventBudget,
    /// 显式调用了 `stop()`
    Stopped,
}

/// 一次运行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub events: u64,
    pub final_time: SimTime,
    pub reason: StopReason,
}

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
    dispatched: u64,
    event_budget: Option<u64>,
    stopped: bool,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中待执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 已执行的事件总数
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// 下一个事件的时间（不出队）
    pub fn peek_time(&self) -> Option<SimTime> {
        self.q.peek().map(|e| e.at)
    }

    /// 设置事件预算：执行到该数量后运行循环停止（防止环形应用无限运行）。
    pub fn set_event_budget(&mut self, budget: Option<u64>) {
        self.event_budget = budget;
    }

    /// 请求停止：当前事件执行完后运行循环退出。
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// 调度事件在指定时间执行
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) -> Result<(), SimError> {
        if at < self.now {
            warn!(now = ?self.now, "refusing to schedule into the past");
            return Err(SimError::CausalityViolation { now: self.now, at });
        }

        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            kind: short_type_name::<E>(),
            ev: Box::new(ev),
        });

        debug!(queue_size = self.q.len(), "事件已加入队列");
        Ok(())
    }

    /// 调度事件在 `now + delay` 执行
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) -> Result<(), SimError> {
        self.schedule(self.now.saturating_add(delay), ev)
    }

    /// 以浮点时间单位（毫秒）给出延迟；负延迟视为因果性违反。
    pub fn schedule_in_millis<E: Event>(&mut self, delay_ms: f64, ev: E) -> Result<(), SimError> {
        if delay_ms.is_finite() && delay_ms < 0.0 {
            let back = SimTime::try_from_millis_f64(-delay_ms).unwrap_or(SimTime::MAX);
            return Err(SimError::CausalityViolation {
                now: self.now,
                at: self.now.saturating_sub(back),
            });
        }
        let delay = SimTime::try_from_millis_f64(delay_ms).ok_or_else(|| {
            SimError::InvalidDuration {
                what: "event delay",
                value: delay_ms.to_string(),
            }
        })?;
        self.schedule_in(delay, ev)
    }

    /// 弹出最早的事件、推进时钟并执行；队列为空时返回 `EmptyQueue`。
    pub fn advance(&mut self, world: &mut dyn World) -> Result<SimTime, SimError> {
        let item = self.q.pop().ok_or(SimError::EmptyQueue)?;
        debug_assert!(item.at >= self.now, "heap yielded an event from the past");
        self.now = item.at;
        self.dispatched = self.dispatched.saturating_add(1);

        debug!(
            event_num = self.dispatched,
            now = ?self.now,
            seq = item.seq,
            kind = item.kind,
            remaining_queue = self.q.len(),
            "执行事件"
        );

        item.ev.execute(self, world)?;
        world.on_tick(self);
        Ok(self.now)
    }

    /// 运行直到事件队列为空、被停止或用尽预算。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) -> Result<RunOutcome, SimError> {
        self.run_bounded(None, world)
    }

    /// 运行直到队列为空或到达 `until`（恰好在 `until` 的事件也会执行）。
    pub fn run_until(
        &mut self,
        until: SimTime,
        world: &mut dyn World,
    ) -> Result<RunOutcome, SimError> {
        self.run_bounded(Some(until), world)
    }

    fn run_bounded(
        &mut self,
        until: Option<SimTime>,
        world: &mut dyn World,
    ) -> Result<RunOutcome, SimError> {
        info!(until = ?until, queue_size = self.q.len(), "▶️  开始运行仿真");
        self.stopped = false;
        let start_count = self.dispatched;

        let reason = loop {
            if self.stopped {
                break StopReason::Stopped;
            }
            if self
                .event_budget
                .is_some_and(|budget| self.dispatched >= budget)
            {
                break StopReason::EventBudget;
            }
            if let (Some(limit), Some(next)) = (until, self.peek_time()) {
                if next > limit {
                    self.now = self.now.max(limit);
                    break StopReason::TimeLimit;
                }
            }
            match self.advance(world) {
                Ok(_) => {}
                Err(SimError::EmptyQueue) => break StopReason::Drained,
                Err(e) => return Err(e),
            }
        };

        world.on_stop(self.now);
        let outcome = RunOutcome {
            events: self.dispatched - start_count,
            final_time: self.now,
            reason,
        };
        info!(
            total_events = outcome.events,
            final_time = ?outcome.final_time,
            reason = ?outcome.reason,
            "✅ 仿真完成"
        );
        Ok(outcome)
    }
}

fn short_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}
