//! 时间共享调度（流式算子语义）
//!
//! 设备所有 PE 的总 MIPS 在所有活跃请求之间平均分配，单个请求的份额
//! 不超过最快的单个 PE。活跃集合变化时份额随之变化，因此所有请求的
//! 完成时间都要重新推导。

use crate::sim::SimTime;

use super::{ProcessorScheduler, RequestId, duration_for, finish_threshold};

#[derive(Debug, Clone)]
struct Active {
    id: RequestId,
    remaining_mi: f64,
}

#[derive(Debug)]
pub struct TimeSharedScheduler {
    total_mips: f64,
    max_pe_mips: f64,
    active: Vec<Active>,
    last_update: SimTime,
}

impl TimeSharedScheduler {
    pub fn new(pe_mips: &[f64]) -> Self {
        Self {
            total_mips: pe_mips.iter().sum(),
            max_pe_mips: pe_mips.iter().copied().fold(0.0, f64::max),
            active: Vec::new(),
            last_update: SimTime::ZERO,
        }
    }

    /// 当前每个活跃请求获得的 MIPS
    pub fn share_mips(&self) -> f64 {
        if self.active.is_empty() {
            return 0.0;
        }
        (self.total_mips / self.active.len() as f64).min(self.max_pe_mips)
    }
}

impl ProcessorScheduler for TimeSharedScheduler {
    fn admit(&mut self, id: RequestId, length_mi: f64, now: SimTime) -> SimTime {
        self.advance_to(now);
        let remaining_mi = length_mi.max(0.0);
        self.active.push(Active { id, remaining_mi });
        now.saturating_add(duration_for(remaining_mi, self.share_mips()))
    }

    fn on_departure(&mut self, id: RequestId, now: SimTime) {
        self.advance_to(now);
        self.active.retain(|a| a.id != id);
    }

    fn advance_to(&mut self, now: SimTime) {
        if now <= self.last_update {
            return;
        }
        let dt_ms = now.saturating_sub(self.last_update).as_millis_f64();
        let done = self.share_mips() * dt_ms;
        for a in &mut self.active {
            a.remaining_mi = (a.remaining_mi - done).max(0.0);
        }
        self.last_update = now;
    }

    fn next_completion(&self) -> Option<SimTime> {
        let rate = self.share_mips();
        self.active
            .iter()
            .map(|a| self.last_update.saturating_add(duration_for(a.remaining_mi, rate)))
            .min()
    }

    fn take_finished(&mut self, now: SimTime) -> Vec<RequestId> {
        self.advance_to(now);
        let threshold = finish_threshold(self.share_mips());
        let mut finished = Vec::new();
        self.active.retain(|a| {
            if a.remaining_mi <= threshold {
                finished.push(a.id);
                false
            } else {
                true
            }
        });
        finished
    }

    fn utilization(&self) -> f64 {
        if self.total_mips <= 0.0 {
            return 0.0;
        }
        (self.share_mips() * self.active.len() as f64 / self.total_mips).min(1.0)
    }

    fn len(&self) -> usize {
        self.active.len()
    }

    fn capacity_mips(&self) -> f64 {
        self.total_mips
    }
}
