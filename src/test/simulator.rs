use crate::sim::{Event, SimError, SimTime, Simulator, StopReason, World};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct DummyWorld {
    ticks: usize,
    stopped_at: Option<SimTime>,
}

impl World for DummyWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sim: &mut Simulator) {
        self.ticks = self.ticks.saturating_add(1);
    }

    fn on_stop(&mut self, now: SimTime) {
        self.stopped_at = Some(now);
    }
}

struct Push {
    id: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Event for Push {
    fn execute(self: Box<Self>, _sim: &mut Simulator, _world: &mut dyn World) -> Result<(), SimError> {
        let Push { id, log } = *self;
        log.lock().expect("log lock").push(id);
        Ok(())
    }
}

struct PushThenScheduleNow {
    id: u32,
    next_id: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Event for PushThenScheduleNow {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) -> Result<(), SimError> {
        let PushThenScheduleNow { id, next_id, log } = *self;
        log.lock().expect("log lock").push(id);
        let now = sim.now();
        sim.schedule(now, Push { id: next_id, log })
    }
}

/// Reschedules itself forever.
struct Forever {
    period: SimTime,
}

impl Event for Forever {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) -> Result<(), SimError> {
        let period = self.period;
        sim.schedule_in(period, Forever { period })
    }
}

struct StopNow;

impl Event for StopNow {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) -> Result<(), SimError> {
        sim.stop();
        Ok(())
    }
}

/// Tries to schedule into the past from inside an event.
struct TimeTravel;

impl Event for TimeTravel {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) -> Result<(), SimError> {
        sim.schedule(SimTime::ZERO, StopNow)
    }
}

fn push(id: u32, log: &Arc<Mutex<Vec<u32>>>) -> Push {
    Push {
        id,
        log: Arc::clone(log),
    }
}

#[test]
fn scheduled_events_order_by_time_then_seq() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(SimTime(10), push(1, &log)).expect("schedule");
    sim.schedule(SimTime(5), push(2, &log)).expect("schedule");
    sim.schedule(SimTime(10), push(3, &log)).expect("schedule");

    let mut world = DummyWorld::default();
    let outcome = sim.run(&mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[2, 1, 3]);
    assert_eq!(world.ticks, 3);
    assert_eq!(sim.now(), SimTime(10));
    assert_eq!(outcome.events, 3);
    assert_eq!(outcome.reason, StopReason::Drained);
    assert_eq!(world.stopped_at, Some(SimTime(10)));
}

#[test]
fn event_scheduled_at_same_time_inside_event_runs_after_current_event() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(
        SimTime::ZERO,
        PushThenScheduleNow {
            id: 1,
            next_id: 2,
            log: Arc::clone(&log),
        },
    )
    .expect("schedule");

    let mut world = DummyWorld::default();
    sim.run(&mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[1, 2]);
    assert_eq!(world.ticks, 2);
    assert_eq!(sim.now(), SimTime::ZERO);
}

#[test]
fn run_until_skips_events_after_until_and_advances_time() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(SimTime::ZERO, push(1, &log)).expect("schedule");
    sim.schedule(SimTime(10), push(2, &log)).expect("schedule");

    let mut world = DummyWorld::default();
    let outcome = sim.run_until(SimTime(5), &mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[1]);
    assert_eq!(world.ticks, 1);
    assert_eq!(sim.now(), SimTime(5));
    assert_eq!(outcome.reason, StopReason::TimeLimit);

    sim.run(&mut world).expect("run");
    assert_eq!(&*log.lock().expect("log lock"), &[1, 2]);
    assert_eq!(world.ticks, 2);
    assert_eq!(sim.now(), SimTime(10));
}

#[test]
fn run_until_executes_events_scheduled_exactly_at_until() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut sim = Simulator::default();
    sim.schedule(SimTime(5), push(1, &log)).expect("schedule");

    let mut world = DummyWorld::default();
    sim.run_until(SimTime(5), &mut world).expect("run");

    assert_eq!(&*log.lock().expect("log lock"), &[1]);
    assert_eq!(world.ticks, 1);
    assert_eq!(sim.now(), SimTime(5));
}

#[test]
fn run_until_with_empty_queue_reports_drained() {
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();

    let outcome = sim.run_until(SimTime(7), &mut world).expect("run");
    assert_eq!(outcome.reason, StopReason::Drained);
    assert_eq!(outcome.events, 0);
    assert_eq!(world.ticks, 0);
}

#[test]
fn scheduling_before_now_is_a_causality_violation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    sim.schedule(SimTime(10), push(1, &log)).expect("schedule");
    let mut world = DummyWorld::default();
    sim.advance(&mut world).expect("advance");

    let err = sim.schedule(SimTime(3), push(2, &log)).unwrap_err();
    assert_eq!(
        err,
        SimError::CausalityViolation {
            now: SimTime(10),
            at: SimTime(3)
        }
    );
    assert_eq!(sim.pending(), 0);
}

#[test]
fn negative_and_nan_delays_are_rejected() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();

    assert!(matches!(
        sim.schedule_in_millis(-1.0, push(1, &log)),
        Err(SimError::CausalityViolation { .. })
    ));
    assert!(matches!(
        sim.schedule_in_millis(f64::NAN, push(2, &log)),
        Err(SimError::InvalidDuration { .. })
    ));
    sim.schedule_in_millis(2.5, push(3, &log)).expect("schedule");
    assert_eq!(sim.peek_time(), Some(SimTime(2_500_000)));
}

#[test]
fn advance_on_empty_queue_returns_empty_queue() {
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();
    assert_eq!(sim.advance(&mut world), Err(SimError::EmptyQueue));
}

#[test]
fn errors_raised_by_events_abort_the_run() {
    let mut sim = Simulator::default();
    sim.schedule(SimTime(4), TimeTravel).expect("schedule");
    let mut world = DummyWorld::default();

    let err = sim.run(&mut world).unwrap_err();
    assert_eq!(
        err,
        SimError::CausalityViolation {
            now: SimTime(4),
            at: SimTime::ZERO
        }
    );
}

#[test]
fn event_budget_bounds_a_self_rescheduling_event() {
    let mut sim = Simulator::default();
    sim.schedule(SimTime::ZERO, Forever { period: SimTime(1) })
        .expect("schedule");
    sim.set_event_budget(Some(50));
    let mut world = DummyWorld::default();

    let outcome = sim.run(&mut world).expect("run");
    assert_eq!(outcome.reason, StopReason::EventBudget);
    assert_eq!(outcome.events, 50);
    assert_eq!(sim.now(), SimTime(49));
    assert_eq!(world.stopped_at, Some(SimTime(49)));
}

#[test]
fn stop_exits_after_the_current_event() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    sim.schedule(SimTime(1), StopNow).expect("schedule");
    sim.schedule(SimTime(1), push(1, &log)).expect("schedule");
    let mut world = DummyWorld::default();

    let outcome = sim.run(&mut world).expect("run");
    assert_eq!(outcome.reason, StopReason::Stopped);
    assert!(log.lock().expect("log lock").is_empty());
    assert_eq!(sim.pending(), 1);
}
