//! 雾计算层
//!
//! 设备树、传感器/执行器、元组路由与模块执行，以及把它们串起来的
//! `FogWorld`。事件只负责把控制权交回 `FogWorld` 的对应方法。

mod actuator_arrival;
mod config;
mod device;
mod distribution;
mod emission;
mod endpoint;
mod execution;
mod id;
mod power;
mod processor_tick;
mod report;
mod routing;
mod sensor_emit;
mod stats;
mod topology;
mod tuple_arrived;
mod world;

pub use actuator_arrival::ActuatorArrival;
pub use config::{DEFAULT_UNTIL_MS, SimConfig};
pub use device::{Device, DeviceSpec, Execution, ModuleInstance};
pub use distribution::{Distribution, MIN_INTERVAL_MS};
pub use endpoint::{Actuator, ActuatorSpec, Sensor, SensorSpec};
pub use id::{ActuatorId, DeviceId, SensorId};
pub use power::{EnergyMeter, PowerModel};
pub use processor_tick::ProcessorTick;
pub use report::{DeviceReport, LoopReport, SimReport};
pub use sensor_emit::{PeriodicEmit, SensorEmit};
pub use stats::{Mean, RoutingFailure, Stats};
pub use topology::{Topology, TopologyError};
pub use tuple_arrived::TupleArrived;
pub use world::FogWorld;
