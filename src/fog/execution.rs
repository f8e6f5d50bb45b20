//! 模块执行
//!
//! 元组到达宿主设备后交给 PE 调度器；调度器状态每次变化都会重新采样功率，
//! 并以新的代号调度下一个 `ProcessorTick`，旧代号的 tick 到达时直接忽略。

use tracing::{debug, trace};

use super::device::Execution;
use super::id::DeviceId;
use super::processor_tick::ProcessorTick;
use super::world::FogWorld;
use crate::app::{AppEdge, Selectivity, Tuple};
use crate::sim::{SimError, SimTime, Simulator};
use crate::trace::TraceKind;

impl FogWorld {
    /// Hand `tuple` to the module instance hosted on `at`.
    #[tracing::instrument(skip(self, tuple, sim), fields(tuple_id = tuple.id.0, module = %tuple.dst))]
    pub(crate) fn admit_local(
        &mut self,
        at: DeviceId,
        tuple: Tuple,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        let now = sim.now();
        let request = self.alloc_request_id();
        let tuple_id = tuple.id.0;
        let module = tuple.dst.clone();
        let projected = self.topology.device_mut(at).admit(
            Execution {
                request,
                module: module.clone(),
                tuple,
                admitted_at: now,
            },
            now,
        );
        debug!(request = request.0, ?projected, "admitted to scheduler");
        self.record(
            now,
            TraceKind::TupleDelivered {
                tuple_id,
                device: at.0,
                module,
                projected_done_ns: projected.0,
            },
        );
        self.after_scheduler_change(at, sim)
    }

    /// Re-sample power and replace the device's pending completion tick.
    fn after_scheduler_change(&mut self, at: DeviceId, sim: &mut Simulator) -> Result<(), SimError> {
        let now = sim.now();
        let dev = self.topology.device_mut(at);
        let sample = dev.sample_power(now);
        let tick = dev.next_tick();
        if let Some((utilization, power)) = sample {
            self.record(
                now,
                TraceKind::EnergySample {
                    device: at.0,
                    utilization,
                    power,
                },
            );
        }
        match tick {
            Some((when, generation)) => sim.schedule(
                when.max(now),
                ProcessorTick {
                    device: at,
                    generation,
                },
            ),
            None => Ok(()),
        }
    }

    pub(crate) fn on_processor_tick(
        &mut self,
        at: DeviceId,
        generation: u64,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        if !self.topology.device(at).is_current_tick(generation) {
            trace!(device = at.0, generation, "stale processor tick");
            return Ok(());
        }
        let finished = self.topology.device_mut(at).take_finished(sim.now());
        self.after_scheduler_change(at, sim)?;
        for exec in finished {
            self.on_execution_complete(at, exec, sim)?;
        }
        Ok(())
    }

    /// Account the finished execution and route whatever the module emits.
    fn on_execution_complete(
        &mut self,
        at: DeviceId,
        exec: Execution,
        sim: &mut Simulator,
    ) -> Result<(), SimError> {
        let now = sim.now();
        let Execution {
            module,
            tuple: mut input,
            admitted_at,
            ..
        } = exec;

        self.stats.tuples_executed += 1;
        self.stats
            .cpu_time_by_type
            .entry(input.tuple_type.clone())
            .or_default()
            .add(now.saturating_sub(admitted_at).as_millis_f64());
        self.close_loops(&mut input, &module, now);

        let rules: Vec<(AppEdge, Selectivity)> = self
            .application(&input.app_id)
            .map(|app| {
                app.outputs_for(&module, &input.tuple_type)
                    .into_iter()
                    .map(|(e, s)| (e.clone(), s.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let mut outputs = Vec::new();
        for (edge, selectivity) in &rules {
            let count = selectivity.output_count(&input, now, &mut self.rng);
            for _ in 0..count {
                let id = self.alloc_tuple_id();
                let mut out = input.derive(id, edge, now);
                self.open_loops(&mut out, now);
                outputs.push(out);
            }
        }
        self.stats.tuples_created += outputs.len() as u64;

        self.record(
            now,
            TraceKind::ModuleCompleted {
                tuple_id: input.id.0,
                device: at.0,
                module,
                outputs: outputs.len() as u32,
            },
        );
        for out in outputs {
            self.receive_tuple(at, out, sim)?;
        }
        Ok(())
    }

    /// Mark every loop whose head is the tuple's source, unless the lineage
    /// is already inside it.
    pub(crate) fn open_loops(&self, tuple: &mut Tuple, now: SimTime) {
        let Some(app) = self.application(&tuple.app_id) else {
            return;
        };
        for (i, l) in app.loops().iter().enumerate() {
            if l.head() == Some(tuple.src.as_str()) {
                tuple.loop_marks.entry(i).or_insert(now);
            }
        }
    }

    /// Close the loops ending at `endpoint` that the tuple's lineage entered.
    pub(crate) fn close_loops(&mut self, tuple: &mut Tuple, endpoint: &str, now: SimTime) {
        let closing: Vec<usize> = match self.application(&tuple.app_id) {
            Some(app) => app
                .loops()
                .iter()
                .enumerate()
                .filter(|(i, l)| l.tail() == Some(endpoint) && tuple.loop_marks.contains_key(i))
                .map(|(i, _)| i)
                .collect(),
            None => return,
        };
        for i in closing {
            let Some(start) = tuple.loop_marks.remove(&i) else {
                continue;
            };
            if let Some(slot) = self
                .stats
                .loop_delays
                .get_mut(&tuple.app_id)
                .and_then(|v| v.get_mut(i))
            {
                slot.add(now.saturating_sub(start).as_millis_f64());
            }
        }
    }
}
