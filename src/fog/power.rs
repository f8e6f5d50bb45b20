//! 线性功率模型与设备能耗/费用累计。

use serde::{Deserialize, Serialize};

use crate::sim::SimTime;

/// `idle + (busy - idle) * utilization`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerModel {
    pub busy_power: f64,
    pub idle_power: f64,
}

impl PowerModel {
    pub fn new(busy_power: f64, idle_power: f64) -> Self {
        Self {
            busy_power,
            idle_power,
        }
    }

    pub fn power(&self, utilization: f64) -> f64 {
        let u = utilization.clamp(0.0, 1.0);
        self.idle_power + (self.busy_power - self.idle_power) * u
    }
}

/// Integrates a step function of power (and cost) over simulated time.
///
/// The level set by [`EnergyMeter::update`] holds until the next update.
#[derive(Debug, Clone)]
pub struct EnergyMeter {
    model: PowerModel,
    rate_per_mips: f64,
    total_mips: f64,
    last_change: SimTime,
    utilization: f64,
    energy: f64,
    cost: f64,
}

impl EnergyMeter {
    pub fn new(model: PowerModel, rate_per_mips: f64, total_mips: f64, start: SimTime) -> Self {
        Self {
            model,
            rate_per_mips,
            total_mips,
            last_change: start,
            utilization: 0.0,
            energy: 0.0,
            cost: 0.0,
        }
    }

    fn integrate(&mut self, now: SimTime) {
        if now <= self.last_change {
            return;
        }
        let dt = now.saturating_sub(self.last_change).as_millis_f64();
        self.energy += self.model.power(self.utilization) * dt;
        self.cost += self.rate_per_mips * self.utilization * self.total_mips * dt;
        self.last_change = now;
    }

    /// Close the current step at `now` and switch to `utilization`.
    /// Returns whether the level actually changed.
    pub fn update(&mut self, now: SimTime, utilization: f64) -> bool {
        self.integrate(now);
        let changed = (utilization - self.utilization).abs() > f64::EPSILON;
        self.utilization = utilization;
        changed
    }

    /// Account the current level up to `now` (end of run).
    pub fn close(&mut self, now: SimTime) {
        self.integrate(now);
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn utilization(&self) -> f64 {
        self.utilization
    }

    pub fn power(&self) -> f64 {
        self.model.power(self.utilization)
    }

    pub fn model(&self) -> PowerModel {
        self.model
    }
}
