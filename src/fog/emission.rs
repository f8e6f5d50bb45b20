//! 边界上的元组收发
//!
//! 传感器发射、周期边发射，以及执行器接收（端到端时延与环路闭合）。

use tracing::{debug, warn};

use super::id::{ActuatorId, SensorId};
use super::sensor_emit::{PeriodicEmit, SensorEmit};
use super::tuple_arrived::TupleArrived;
use super::world::{millis, FogWorld};
use crate::app::{AppEdge, Tuple};
use crate::sim::{SimError, Simulator};
use crate::trace::TraceKind;

impl FogWorld {
    /// Emit one tuple per matching sensor-input edge and schedule the next
    /// emission.
    #[tracing::instrument(skip(self, sim), fields(sensor = id.0))]
    pub(crate) fn emit_sensor(&mut self, id: SensorId, sim: &mut Simulator) -> Result<(), SimError> {
        let now = sim.now();
        let sensor = self.sensor(id);
        let Some(gateway) = sensor.gateway else {
            warn!("sensor has no gateway, stopping its emissions");
            return Ok(());
        };
        let spec = sensor.spec.clone();
        let edges: Vec<AppEdge> = match self.application(&spec.app_id) {
            Some(app) => app.sensor_edges(&spec.tuple_type).cloned().collect(),
            None => Vec::new(),
        };
        let latency = millis(spec.latency_ms, "sensor latency")?;

        for edge in &edges {
            let tuple_id = self.alloc_tuple_id();
            let mut tuple = Tuple::from_edge(tuple_id, &spec.app_id, edge, now);
            self.open_loops(&mut tuple, now);
            self.stats.tuples_created += 1;
            self.record(
                now,
                TraceKind::TupleCreated {
                    tuple_id: tuple_id.0,
                    app: spec.app_id.clone(),
                    src: tuple.src.clone(),
                    dst: tuple.dst.clone(),
                    tuple_type: tuple.tuple_type.clone(),
                    device: Some(gateway.0),
                },
            );
            sim.schedule_in(
                latency,
                TupleArrived {
                    device: gateway,
                    tuple: tuple.delayed(latency),
                },
            )?;
        }
        self.sensors_mut()[id.0].emitted += 1;

        let interval = spec.distribution.next_interval(&mut self.rng);
        debug!(tuples = edges.len(), interval, "sensor emitted");
        sim.schedule_in_millis(interval, SensorEmit { sensor: id })
    }

    /// Emit the periodic edge `edge` of `app` from its source module.
    pub(crate) fn emit_periodic(
        &mut self,
        app: &str,
        edge: usize,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        let now = sim.now();
        let Some(e) = self.application(app).and_then(|a| a.edges().get(edge)).cloned() else {
            return Ok(());
        };
        let Some(period) = e.periodicity_ms else {
            return Ok(());
        };
        let Some(host) = self.host_of(app, &e.src) else {
            warn!(app, module = %e.src, "periodic source is not placed");
            return Ok(());
        };

        let tuple_id = self.alloc_tuple_id();
        let mut tuple = Tuple::from_edge(tuple_id, app, &e, now);
        self.open_loops(&mut tuple, now);
        self.stats.tuples_created += 1;
        self.record(
            now,
            TraceKind::TupleCreated {
                tuple_id: tuple_id.0,
                app: app.to_string(),
                src: e.src.clone(),
                dst: e.dst.clone(),
                tuple_type: e.tuple_type.clone(),
                device: Some(host.0),
            },
        );
        self.receive_tuple(host, tuple, sim)?;
        sim.schedule_in_millis(
            period,
            PeriodicEmit {
                app: app.to_string(),
                edge,
            },
        )
    }

    pub(crate) fn on_actuator_arrival(
        &mut self,
        id: ActuatorId,
        mut tuple: Tuple,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        let now = sim.now();
        let end_to_end = now.saturating_sub(tuple.emitted_at);
        self.actuators_mut()[id.0].received += 1;
        self.stats.actuator_deliveries += 1;
        self.stats.end_to_end.add(end_to_end.as_millis_f64());

        let tag = self.actuator(id).spec.actuator_type.clone();
        self.close_loops(&mut tuple, &tag, now);
        self.record(
            now,
            TraceKind::ActuatorReceived {
                tuple_id: tuple.id.0,
                actuator: id.0,
                end_to_end_ns: end_to_end.0,
            },
        );
        debug!(actuator = id.0, tuple_id = tuple.id.0, ?end_to_end, "actuator received tuple");
        Ok(())
    }
}
