//! 内核错误
//!
//! `EmptyQueue` 不是真正的错误，而是正常结束信号。

use super::time::SimTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Attempt to schedule an event before the current simulated time.
    #[error("causality violation: event scheduled at {at} while clock is at {now}")]
    CausalityViolation { now: SimTime, at: SimTime },

    /// Nothing left to dispatch.
    #[error("event queue is empty")]
    EmptyQueue,

    /// A floating-point duration was negative or not finite.
    #[error("invalid duration {value} for {what}")]
    InvalidDuration { what: &'static str, value: String },

    /// An event was dispatched against a world of a different type.
    #[error("event {event} dispatched against an unexpected world type")]
    WorldMismatch { event: &'static str },
}
