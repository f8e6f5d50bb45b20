//! 传感器与执行器：元组在边界上的产生者和消费者。

use serde::{Deserialize, Serialize};

use super::distribution::Distribution;
use super::id::{ActuatorId, DeviceId, SensorId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSpec {
    pub name: String,
    /// Tag matched against the `src` of sensor-input edges.
    pub tuple_type: String,
    pub app_id: String,
    /// Name of the device the sensor is attached to.
    #[serde(default)]
    pub gateway: Option<String>,
    /// Attachment latency to the gateway (time units).
    #[serde(default)]
    pub latency_ms: f64,
    pub distribution: Distribution,
}

impl SensorSpec {
    pub fn new(
        name: impl Into<String>,
        tuple_type: impl Into<String>,
        app_id: impl Into<String>,
        distribution: Distribution,
    ) -> Self {
        Self {
            name: name.into(),
            tuple_type: tuple_type.into(),
            app_id: app_id.into(),
            gateway: None,
            latency_ms: 0.0,
            distribution,
        }
    }

    pub fn with_gateway(mut self, device: impl Into<String>) -> Self {
        self.gateway = Some(device.into());
        self
    }

    pub fn with_latency(mut self, latency_ms: f64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorSpec {
    pub name: String,
    pub app_id: String,
    /// Tag matched against the `dst` of actuator-output edges.
    pub actuator_type: String,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub latency_ms: f64,
}

impl ActuatorSpec {
    pub fn new(
        name: impl Into<String>,
        app_id: impl Into<String>,
        actuator_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            app_id: app_id.into(),
            actuator_type: actuator_type.into(),
            gateway: None,
            latency_ms: 0.0,
        }
    }

    pub fn with_gateway(mut self, device: impl Into<String>) -> Self {
        self.gateway = Some(device.into());
        self
    }

    pub fn with_latency(mut self, latency_ms: f64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Sensor {
    pub id: SensorId,
    pub spec: SensorSpec,
    /// Resolved when the owning application is submitted.
    pub gateway: Option<DeviceId>,
    pub emitted: u64,
}

#[derive(Debug, Clone)]
pub struct Actuator {
    pub id: ActuatorId,
    pub spec: ActuatorSpec,
    pub gateway: Option<DeviceId>,
    pub received: u64,
}
