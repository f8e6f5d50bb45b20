//! 元组路由
//!
//! 设备收到元组后：目标模块在本地则交给调度器；目标执行器挂在本地则经过
//! 执行器时延交付；否则沿树转发一跳。无法路由的元组记录后丢弃，仿真继续。

use tracing::{debug, trace, warn};

use super::actuator_arrival::ActuatorArrival;
use super::id::{ActuatorId, DeviceId};
use super::stats::RoutingFailure;
use super::tuple_arrived::TupleArrived;
use super::world::{millis, FogWorld};
use crate::app::Tuple;
use crate::sim::{SimError, SimTime, Simulator};
use crate::trace::{RoutingFailureReason, TraceKind};

/// Where a tuple has to end up.
enum Target {
    Module(DeviceId),
    Actuator(ActuatorId, DeviceId),
}

impl FogWorld {
    /// A tuple is present at device `at` at `sim.now()`.
    #[tracing::instrument(skip(self, tuple, sim), fields(tuple_id = tuple.id.0, dst = %tuple.dst, at = at.0))]
    pub(crate) fn receive_tuple(
        &mut self,
        at: DeviceId,
        tuple: Tuple,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        if self.application(&tuple.app_id).is_none() {
            self.routing_failure(at, &tuple, RoutingFailureReason::UnknownApplication, sim.now());
            return Ok(());
        }

        if tuple.targets_actuator() && tuple.actuator.is_none() {
            return self.fan_out_to_actuators(at, tuple, sim);
        }

        match self.resolve(&tuple) {
            Ok(Target::Module(host)) if host == at => self.admit_local(at, tuple, sim),
            Ok(Target::Actuator(id, gateway)) if gateway == at => {
                self.deliver_to_actuator(id, tuple, sim)
            }
            Ok(Target::Module(dev)) | Ok(Target::Actuator(_, dev)) => {
                self.forward(at, dev, tuple, sim)
            }
            Err(reason) => {
                self.routing_failure(at, &tuple, reason, sim.now());
                Ok(())
            }
        }
    }

    fn resolve(&self, tuple: &Tuple) -> Result<Target, RoutingFailureReason> {
        match tuple.actuator {
            Some(id) => self
                .actuator(id)
                .gateway
                .map(|gw| Target::Actuator(id, gw))
                .ok_or(RoutingFailureReason::NoActuator),
            None => self
                .host_of(&tuple.app_id, &tuple.dst)
                .map(Target::Module)
                .ok_or(RoutingFailureReason::NoHost),
        }
    }

    /// One copy per bound actuator carrying the destination tag. The first
    /// copy keeps the tuple id.
    fn fan_out_to_actuators(
        &mut self,
        at: DeviceId,
        tuple: Tuple,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        let targets: Vec<ActuatorId> = self
            .actuators()
            .iter()
            .filter(|a| {
                a.gateway.is_some()
                    && a.spec.app_id == tuple.app_id
                    && a.spec.actuator_type == tuple.dst
            })
            .map(|a| a.id)
            .collect();

        if targets.is_empty() {
            self.routing_failure(at, &tuple, RoutingFailureReason::NoActuator, sim.now());
            return Ok(());
        }

        let first_id = tuple.id;
        for (i, actuator) in targets.into_iter().enumerate() {
            let id = if i == 0 { first_id } else { self.alloc_tuple_id() };
            let copy = tuple.clone().for_actuator(id, actuator);
            self.receive_tuple(at, copy, sim)?;
        }
        Ok(())
    }

    /// Put the tuple on the link toward the next device on the tree path.
    fn forward(
        &mut self,
        at: DeviceId,
        target: DeviceId,
        tuple: Tuple,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        let now = sim.now();
        let Some(next) = self.topology.next_hop(at, target) else {
            self.routing_failure(at, &tuple, RoutingFailureReason::Unreachable, now);
            return Ok(());
        };

        let upward = self.topology.device(at).parent() == Some(next);
        let (latency, bandwidth) = if upward {
            let dev = self.topology.device(at);
            (dev.uplink_latency(), dev.uplink_bandwidth())
        } else {
            (
                self.topology.device(next).uplink_latency(),
                self.topology.device(at).downlink_bandwidth(),
            )
        };
        let tx = millis(tuple.nw_length / bandwidth, "transmission time")?;

        let start = if self.config().link_queueing {
            let dev = self.topology.device_mut(at);
            let busy = if upward {
                &mut dev.uplink_busy_until
            } else {
                &mut dev.downlink_busy_until
            };
            let start = now.max(*busy);
            *busy = start.saturating_add(tx);
            start
        } else {
            now
        };
        let arrive = start.saturating_add(tx).saturating_add(latency);

        self.stats.network_usage += latency.as_millis_f64() * tuple.nw_length;
        self.stats.tuples_forwarded += 1;
        self.record(
            now,
            TraceKind::TupleForwarded {
                tuple_id: tuple.id.0,
                from: at.0,
                to: next.0,
                arrive_ns: arrive.0,
            },
        );
        trace!(from = at.0, to = next.0, upward, ?arrive, "forwarding tuple");

        let hopped = tuple.hop(arrive.saturating_sub(now));
        sim.schedule(
            arrive,
            TupleArrived {
                device: next,
                tuple: hopped,
            },
        )
    }

    fn deliver_to_actuator(
        &mut self,
        id: ActuatorId,
        tuple: Tuple,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        let latency = millis(self.actuator(id).spec.latency_ms, "actuator latency")?;
        debug!(actuator = id.0, ?latency, "tuple leaves gateway for actuator");
        sim.schedule_in(
            latency,
            ActuatorArrival {
                actuator: id,
                tuple: tuple.delayed(latency),
            },
        )
    }

    /// Record and drop an unroutable tuple.
    pub(crate) fn routing_failure(
        &mut self,
        device: DeviceId,
        tuple: &Tuple,
        reason: RoutingFailureReason,
        now: SimTime,
    ) {
        warn!(
            tuple_id = tuple.id.0,
            app = %tuple.app_id,
            dst = %tuple.dst,
            device = device.0,
            ?reason,
            "dropping unroutable tuple"
        );
        self.stats.routing_failures.push(RoutingFailure {
            t_ns: now.0,
            tuple_id: tuple.id,
            app: tuple.app_id.clone(),
            dst: tuple.dst.clone(),
            device,
            reason,
        });
        self.record(
            now,
            TraceKind::RoutingFailure {
                tuple_id: tuple.id.0,
                device: device.0,
                dst: tuple.dst.clone(),
                reason,
            },
        );
    }
}
