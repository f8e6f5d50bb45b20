//! 空间共享调度
//!
//! 每个请求独占一个 PE；没有空闲 PE 时按 FCFS 排队。

use std::collections::VecDeque;

use crate::sim::SimTime;

use super::{ProcessorScheduler, RequestId, duration_for, finish_threshold};

#[derive(Debug, Clone)]
struct Request {
    id: RequestId,
    seq: u64,
    remaining_mi: f64,
}

#[derive(Debug)]
struct Slot {
    mips: f64,
    running: Option<Request>,
}

#[derive(Debug)]
pub struct SpaceSharedScheduler {
    slots: Vec<Slot>,
    waiting: VecDeque<Request>,
    /// 长度为 0 的请求：到达即完成，不占用 PE
    instant: Vec<Request>,
    next_seq: u64,
    last_update: SimTime,
}

impl SpaceSharedScheduler {
    pub fn new(pe_mips: &[f64]) -> Self {
        Self {
            slots: pe_mips
                .iter()
                .map(|&mips| Slot {
                    mips,
                    running: None,
                })
                .collect(),
            waiting: VecDeque::new(),
            instant: Vec::new(),
            next_seq: 0,
            last_update: SimTime::ZERO,
        }
    }

    /// 等待队列长度
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    fn fill_free_slots(&mut self) {
        for slot in &mut self.slots {
            if slot.running.is_none() {
                match self.waiting.pop_front() {
                    Some(req) => slot.running = Some(req),
                    None => break,
                }
            }
        }
    }

    /// 按 FCFS 推演整个等待队列，得到队尾请求的完成时间。
    fn projected_tail_completion(&self) -> SimTime {
        let mut free_at: Vec<SimTime> = self
            .slots
            .iter()
            .map(|s| match &s.running {
                Some(r) => self
                    .last_update
                    .saturating_add(duration_for(r.remaining_mi, s.mips)),
                None => self.last_update,
            })
            .collect();

        let mut last = self.last_update;
        for req in &self.waiting {
            let Some((idx, start)) = free_at
                .iter()
                .copied()
                .enumerate()
                .min_by_key(|&(idx, t)| (t, idx))
            else {
                return SimTime::MAX;
            };
            let finish = start.saturating_add(duration_for(req.remaining_mi, self.slots[idx].mips));
            free_at[idx] = finish;
            last = finish;
        }
        last
    }
}

impl ProcessorScheduler for SpaceSharedScheduler {
    fn admit(&mut self, id: RequestId, length_mi: f64, now: SimTime) -> SimTime {
        self.advance_to(now);
        let req = Request {
            id,
            seq: self.next_seq,
            remaining_mi: length_mi.max(0.0),
        };
        self.next_seq = self.next_seq.wrapping_add(1);

        if req.remaining_mi <= finish_threshold(0.0) {
            self.instant.push(req);
            return now;
        }

        if let Some(slot) = self.slots.iter_mut().find(|s| s.running.is_none()) {
            let done_at = now.saturating_add(duration_for(req.remaining_mi, slot.mips));
            slot.running = Some(req);
            return done_at;
        }

        self.waiting.push_back(req);
        self.projected_tail_completion()
    }

    fn on_departure(&mut self, id: RequestId, now: SimTime) {
        self.advance_to(now);
        self.instant.retain(|r| r.id != id);
        self.waiting.retain(|r| r.id != id);
        for slot in &mut self.slots {
            if slot.running.as_ref().is_some_and(|r| r.id == id) {
                slot.running = None;
            }
        }
        self.fill_free_slots();
    }

    fn advance_to(&mut self, now: SimTime) {
        if now <= self.last_update {
            return;
        }
        let dt_ms = now.saturating_sub(self.last_update).as_millis_f64();
        for slot in &mut self.slots {
            if let Some(r) = slot.running.as_mut() {
                r.remaining_mi = (r.remaining_mi - slot.mips * dt_ms).max(0.0);
            }
        }
        self.last_update = now;
    }

    fn next_completion(&self) -> Option<SimTime> {
        if !self.instant.is_empty() {
            return Some(self.last_update);
        }
        self.slots
            .iter()
            .filter_map(|s| {
                s.running.as_ref().map(|r| {
                    self.last_update
                        .saturating_add(duration_for(r.remaining_mi, s.mips))
                })
            })
            .min()
    }

    fn take_finished(&mut self, now: SimTime) -> Vec<RequestId> {
        self.advance_to(now);
        let mut finished: Vec<Request> = std::mem::take(&mut self.instant);
        for slot in &mut self.slots {
            let done = slot
                .running
                .as_ref()
                .is_some_and(|r| r.remaining_mi <= finish_threshold(slot.mips));
            if done {
                if let Some(r) = slot.running.take() {
                    finished.push(r);
                }
            }
        }
        self.fill_free_slots();
        finished.sort_by_key(|r| r.seq);
        finished.into_iter().map(|r| r.id).collect()
    }

    fn utilization(&self) -> f64 {
        let total = self.capacity_mips();
        if total <= 0.0 {
            return 0.0;
        }
        let busy: f64 = self
            .slots
            .iter()
            .filter(|s| s.running.is_some())
            .map(|s| s.mips)
            .sum();
        busy / total
    }

    fn len(&self) -> usize {
        self.instant.len()
            + self.waiting.len()
            + self.slots.iter().filter(|s| s.running.is_some()).count()
    }

    fn capacity_mips(&self) -> f64 {
        self.slots.iter().map(|s| s.mips).sum()
    }
}
