use crate::sched::{
    ProcessorScheduler, RequestId, SchedulerKind, SpaceSharedScheduler, TimeSharedScheduler,
};
use crate::sim::SimTime;

fn ms(v: u64) -> SimTime {
    SimTime::from_millis(v)
}

#[test]
fn single_request_completes_after_length_over_capacity() {
    let mut s = TimeSharedScheduler::new(&[10.0]);
    let done = s.admit(RequestId(1), 30.0, SimTime::ZERO);
    assert_eq!(done, ms(3));
    assert_eq!(s.next_completion(), Some(ms(3)));
    assert!((s.utilization() - 1.0).abs() < 1e-12);

    assert!(s.take_finished(ms(2)).is_empty());
    assert_eq!(s.take_finished(ms(3)), vec![RequestId(1)]);
    assert!(s.is_empty());
    assert_eq!(s.utilization(), 0.0);
}

#[test]
fn time_shared_requests_split_capacity_and_redistribute_on_departure() {
    let mut s = TimeSharedScheduler::new(&[10.0]);
    assert_eq!(s.admit(RequestId(1), 10.0, SimTime::ZERO), ms(1));
    // Projection at admission time assumes the share stays at 5 MIPS.
    assert_eq!(s.admit(RequestId(2), 30.0, SimTime::ZERO), ms(6));
    assert_eq!(s.share_mips(), 5.0);

    assert_eq!(s.next_completion(), Some(ms(2)));
    assert_eq!(s.take_finished(ms(2)), vec![RequestId(1)]);

    // The survivor gets the whole PE for its remaining 20 MI.
    assert_eq!(s.share_mips(), 10.0);
    assert_eq!(s.next_completion(), Some(ms(4)));
    assert_eq!(s.take_finished(ms(4)), vec![RequestId(2)]);
}

#[test]
fn time_shared_share_is_capped_at_the_fastest_pe() {
    let mut s = TimeSharedScheduler::new(&[10.0, 10.0, 10.0, 10.0]);
    s.admit(RequestId(1), 10.0, SimTime::ZERO);
    assert_eq!(s.share_mips(), 10.0);
    assert!((s.utilization() - 0.25).abs() < 1e-12);
    assert_eq!(s.next_completion(), Some(ms(1)));
}

#[test]
fn departure_rederives_remaining_completions() {
    let mut s = TimeSharedScheduler::new(&[10.0]);
    s.admit(RequestId(1), 100.0, SimTime::ZERO);
    s.admit(RequestId(2), 20.0, SimTime::ZERO);
    s.on_departure(RequestId(1), ms(2));
    // 10 MI done at 5 MIPS, 10 left at 10 MIPS.
    assert_eq!(s.next_completion(), Some(ms(3)));
    assert_eq!(s.len(), 1);
}

#[test]
fn zero_length_requests_complete_at_arrival() {
    for kind in [SchedulerKind::TimeShared, SchedulerKind::SpaceShared] {
        let mut s = kind.build(&[10.0]);
        assert_eq!(s.admit(RequestId(7), 0.0, ms(5)), ms(5), "{kind:?}");
        assert_eq!(s.next_completion(), Some(ms(5)), "{kind:?}");
        assert_eq!(s.take_finished(ms(5)), vec![RequestId(7)], "{kind:?}");
        assert!(s.is_empty(), "{kind:?}");
    }
}

#[test]
fn space_shared_queues_fcfs_when_all_pes_are_busy() {
    let mut s = SpaceSharedScheduler::new(&[10.0]);
    assert_eq!(s.admit(RequestId(1), 10.0, SimTime::ZERO), ms(1));
    // Waits for request 1, then runs alone.
    assert_eq!(s.admit(RequestId(2), 30.0, SimTime::ZERO), ms(4));
    assert_eq!(s.admit(RequestId(3), 10.0, SimTime::ZERO), ms(5));
    assert_eq!(s.waiting(), 2);
    assert_eq!(s.utilization(), 1.0);

    assert_eq!(s.take_finished(ms(1)), vec![RequestId(1)]);
    assert_eq!(s.waiting(), 1);
    assert_eq!(s.next_completion(), Some(ms(4)));
    assert_eq!(s.take_finished(ms(4)), vec![RequestId(2)]);
    assert_eq!(s.take_finished(ms(5)), vec![RequestId(3)]);
    assert!(s.is_empty());
    assert_eq!(s.utilization(), 0.0);
}

#[test]
fn space_shared_uses_every_pe() {
    let mut s = SpaceSharedScheduler::new(&[10.0, 20.0]);
    assert_eq!(s.admit(RequestId(1), 20.0, SimTime::ZERO), ms(2));
    assert_eq!(s.admit(RequestId(2), 20.0, SimTime::ZERO), ms(1));
    assert_eq!(s.waiting(), 0);
    assert_eq!(s.capacity_mips(), 30.0);
    assert_eq!(s.take_finished(ms(1)), vec![RequestId(2)]);
    assert!((s.utilization() - 10.0 / 30.0).abs() < 1e-12);
}

#[test]
fn fractional_lengths_finish_despite_nanosecond_rounding() {
    let mut s = TimeSharedScheduler::new(&[3.0]);
    let done = s.admit(RequestId(1), 1.0, SimTime::ZERO);
    // 1/3 ms rounds to 333_333 ns.
    assert_eq!(done, SimTime(333_333));
    assert_eq!(s.take_finished(done), vec![RequestId(1)]);
}
