//! 标识符类型
//!
//! 设备、传感器、执行器都存放在扁平表中，用下标互相引用。

use serde::{Deserialize, Serialize};

/// 设备标识符（拓扑表下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub usize);

/// 传感器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SensorId(pub usize);

/// 执行器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActuatorId(pub usize);
