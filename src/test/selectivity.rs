use crate::app::{AppEdge, EdgeKind, Selectivity, Tuple, TupleId, direction};
use crate::sim::SimTime;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn input() -> Tuple {
    let edge = AppEdge::new("s", "m", 100.0, 10.0, "IN", direction::UP, EdgeKind::SensorInput);
    Tuple::from_edge(TupleId(0), "app", &edge, SimTime::ZERO)
}

#[test]
fn fractional_extremes_never_touch_the_rng() {
    let t = input();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let before = rng.clone();

    assert_eq!(Selectivity::fractional(1.0).output_count(&t, SimTime::ZERO, &mut rng), 1);
    assert_eq!(Selectivity::fractional(2.0).output_count(&t, SimTime::ZERO, &mut rng), 1);
    assert_eq!(Selectivity::fractional(0.0).output_count(&t, SimTime::ZERO, &mut rng), 0);
    assert_eq!(Selectivity::fractional(-1.0).output_count(&t, SimTime::ZERO, &mut rng), 0);
    assert_eq!(rng, before);
}

#[test]
fn fractional_probability_is_reproducible_for_a_seed() {
    let t = input();
    let sel = Selectivity::fractional(0.5);
    let draw = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..200)
            .map(|_| sel.output_count(&t, SimTime::ZERO, &mut rng))
            .collect::<Vec<_>>()
    };
    let a = draw(11);
    assert_eq!(a, draw(11));
    let ones = a.iter().filter(|&&n| n == 1).count();
    assert!((60..=140).contains(&ones), "ones={ones}");
}

#[test]
fn bursty_emits_only_inside_high_windows() {
    let t = input();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let sel = Selectivity::Bursty {
        low_ms: 6.0,
        high_ms: 4.0,
        first_high_ms: 10.0,
    };
    let at = |ms: u64, rng: &mut ChaCha8Rng| sel.output_count(&t, SimTime::from_millis(ms), rng);

    assert_eq!(at(5, &mut rng), 0);
    assert_eq!(at(10, &mut rng), 1);
    assert_eq!(at(13, &mut rng), 1);
    assert_eq!(at(14, &mut rng), 0);
    assert_eq!(at(19, &mut rng), 0);
    assert_eq!(at(20, &mut rng), 1);
}

#[test]
fn custom_selectivity_sees_the_input_tuple() {
    let t = input();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let sel = Selectivity::custom(|tuple, now, _rng| {
        if tuple.tuple_type == "IN" && now >= SimTime::from_millis(1) { 3 } else { 0 }
    });
    assert_eq!(sel.output_count(&t, SimTime::ZERO, &mut rng), 0);
    assert_eq!(sel.output_count(&t, SimTime::from_millis(1), &mut rng), 3);
}

#[test]
fn selectivity_json_uses_a_kind_tag() {
    let sel: Selectivity =
        serde_json::from_str(r#"{ "kind": "bursty", "low_ms": 1.0, "high_ms": 2.0 }"#)
            .expect("parse selectivity");
    match sel {
        Selectivity::Bursty {
            low_ms,
            high_ms,
            first_high_ms,
        } => {
            assert_eq!((low_ms, high_ms, first_high_ms), (1.0, 2.0, 0.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}
