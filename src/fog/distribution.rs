//! 传感器发射间隔分布
//!
//! 间隔以时间单位（1 ms）计。仿真时钟分辨率为 1 ns，低于该分辨率的间隔
//! 会被舍入为 0，因此 `advances` 要求分布的典型取值至少为 1 ns。

use rand::{Rng, RngCore};
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

const NORMAL_RESAMPLE_LIMIT: usize = 64;

/// 时钟分辨率（1 ns）对应的时间单位数。
pub const MIN_INTERVAL_MS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Deterministic { value: f64 },
    Uniform { min: f64, max: f64 },
    /// 取值非正时重采样；多次失败后退回 `mean`（不小于 1 ns）。
    Normal { mean: f64, stdev: f64 },
}

impl Distribution {
    pub fn deterministic(value: f64) -> Self {
        Distribution::Deterministic { value }
    }

    /// Next interval in time units, always `>= 0`.
    pub fn next_interval(&self, rng: &mut dyn RngCore) -> f64 {
        let v = match *self {
            Distribution::Deterministic { value } => value,
            Distribution::Uniform { min, max } => {
                if max > min {
                    rng.gen_range(min..max)
                } else {
                    min
                }
            }
            Distribution::Normal { mean, stdev } => {
                let fallback = mean.max(MIN_INTERVAL_MS);
                match Normal::new(mean, stdev) {
                    Ok(normal) => (0..NORMAL_RESAMPLE_LIMIT)
                        .map(|_| normal.sample(&mut *rng))
                        .find(|v| *v > 0.0)
                        .unwrap_or(fallback),
                    Err(_) => fallback,
                }
            }
        };
        if v.is_finite() { v.max(0.0) } else { 0.0 }
    }

    /// 分布能否推进时钟：参数有限，且典型间隔不低于时钟分辨率。
    /// 单次随机取值仍可能为 0。
    pub fn advances(&self) -> bool {
        match *self {
            Distribution::Deterministic { value } => value.is_finite() && value >= MIN_INTERVAL_MS,
            Distribution::Uniform { min, max } => {
                min.is_finite()
                    && max.is_finite()
                    && min >= 0.0
                    && max >= min
                    && max >= MIN_INTERVAL_MS
            }
            Distribution::Normal { mean, stdev } => {
                mean.is_finite() && stdev.is_finite() && stdev >= 0.0 && mean >= MIN_INTERVAL_MS
            }
        }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            Distribution::Deterministic { value } => value,
            Distribution::Uniform { min, max } => (min + max) / 2.0,
            Distribution::Normal { mean, .. } => mean,
        }
    }
}
