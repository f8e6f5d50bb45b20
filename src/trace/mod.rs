//! 结构化仿真轨迹
//!
//! 核心只产生带时间戳的事件记录，不负责格式化或持久化；二进制程序把
//! `TraceLog` 序列化为 JSON。相同输入 + 相同种子必须得到相同的轨迹。

mod types;

pub use types::{RoutingFailureReason, TraceEvent, TraceKind, TraceLog};
