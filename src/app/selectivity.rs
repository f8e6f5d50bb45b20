//! 输出选择性：每个输入元组产生多少个输出元组。

use std::fmt;
use std::sync::Arc;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::tuple::Tuple;
use crate::sim::SimTime;

type SelectFn = dyn Fn(&Tuple, SimTime, &mut dyn RngCore) -> u32 + Send + Sync;

/// User-supplied selectivity closure.
#[derive(Clone)]
pub struct CustomSelectivity(Arc<SelectFn>);

impl CustomSelectivity {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Tuple, SimTime, &mut dyn RngCore) -> u32 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for CustomSelectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomSelectivity(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selectivity {
    /// One output with probability `p`.
    Fractional { p: f64 },
    /// One output while inside a "high" window of a periodic burst pattern.
    ///
    /// Windows repeat every `high_ms + low_ms`, the first one opening at
    /// `first_high_ms`. Nothing is emitted before the first window.
    Bursty {
        low_ms: f64,
        high_ms: f64,
        #[serde(default)]
        first_high_ms: f64,
    },
    #[serde(skip)]
    Custom(CustomSelectivity),
}

impl Selectivity {
    pub fn fractional(p: f64) -> Self {
        Selectivity::Fractional { p }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Tuple, SimTime, &mut dyn RngCore) -> u32 + Send + Sync + 'static,
    {
        Selectivity::Custom(CustomSelectivity::new(f))
    }

    /// Number of output tuples to emit for `input` processed at `now`.
    pub fn output_count(&self, input: &Tuple, now: SimTime, rng: &mut dyn RngCore) -> u32 {
        match self {
            Selectivity::Fractional { p } => {
                if *p >= 1.0 {
                    1
                } else if *p <= 0.0 || p.is_nan() {
                    0
                } else {
                    u32::from(rng.gen_bool(*p))
                }
            }
            Selectivity::Bursty {
                low_ms,
                high_ms,
                first_high_ms,
            } => {
                let t = now.as_millis_f64() - first_high_ms;
                let period = high_ms + low_ms;
                if t < 0.0 || *high_ms <= 0.0 {
                    return 0;
                }
                if period <= 0.0 {
                    return 1;
                }
                u32::from(t % period < *high_ms)
            }
            Selectivity::Custom(f) => (f.0)(input, now, rng),
        }
    }
}
