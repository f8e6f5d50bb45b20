//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换。一个“时间单位”对应 1 毫秒。

use serde::{Deserialize, Serialize};

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// 仿真时间（纳秒）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub const MAX: SimTime = SimTime(u64::MAX);

    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }

    /// 把浮点毫秒（时间单位）四舍五入到纳秒。负数或非有限值返回 `None`。
    pub fn try_from_millis_f64(ms: f64) -> Option<SimTime> {
        if !ms.is_finite() || ms < 0.0 {
            return None;
        }
        let nanos = (ms * NANOS_PER_MILLI).round();
        if nanos >= u64::MAX as f64 {
            return Some(SimTime::MAX);
        }
        Some(SimTime(nanos as u64))
    }

    /// 以浮点毫秒（时间单位）表示。
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_MILLI
    }

    pub fn saturating_add(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(other.0))
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}ms", self.as_millis_f64())
    }
}
