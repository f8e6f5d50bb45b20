//! 模块放置
//!
//! 静态放置映射（模块名 -> 设备名）、可插拔的放置策略，以及把应用提交到
//! `FogWorld` 并驱动运行的 `Controller`。

use thiserror::Error;

use crate::sim::SimError;

mod controller;
mod mapping;

pub use controller::Controller;
pub use mapping::{MappingPlacement, ModulePlacement, PlacementMapping};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("module {0:?} is already placed")]
    DuplicatePlacement(String),

    #[error("module {module:?} of application {app:?} has no placement")]
    UnplacedModule { app: String, module: String },

    #[error("unknown device {0:?}")]
    UnknownDevice(String),

    #[error("application {app:?} references unknown endpoint {endpoint:?}")]
    UnknownEndpoint { app: String, endpoint: String },

    #[error("{endpoint:?} of application {app:?} has no gateway device")]
    MissingGateway { app: String, endpoint: String },

    #[error("application {0:?} was already submitted")]
    DuplicateApplication(String),

    #[error("application {app:?} declares module {module:?} twice")]
    DuplicateModule { app: String, module: String },

    #[error("edge {tuple_type:?} of application {app:?} has an invalid periodicity")]
    InvalidPeriodicity { app: String, tuple_type: String },

    #[error("edge {tuple_type:?} of application {app:?} has a negative or non-finite length")]
    InvalidEdge { app: String, tuple_type: String },

    #[error("sensor {sensor:?} has an interval distribution that never advances time")]
    InvalidDistribution { sensor: String },

    #[error("{endpoint:?} has an invalid attachment latency")]
    InvalidLatency { endpoint: String },

    #[error(transparent)]
    Sim(#[from] SimError),
}
