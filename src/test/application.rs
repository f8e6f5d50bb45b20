use crate::app::{AppEdge, Application, EdgeKind, Selectivity, direction};
use crate::placement::PlacementError;
use std::collections::BTreeSet;

fn tags(v: &[&str]) -> BTreeSet<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn pipeline() -> Application {
    let mut app = Application::new("app");
    app.add_module("client", 10)
        .add_module("proc", 10)
        .add_app_edge("SENSOR", "client", 100.0, 50.0, "SENSOR", direction::UP, EdgeKind::SensorInput)
        .add_app_edge("client", "proc", 200.0, 100.0, "DATA", direction::UP, EdgeKind::Module)
        .add_app_edge("proc", "DISPLAY", 50.0, 10.0, "RESULT", direction::DOWN, EdgeKind::ActuatorOutput)
        .add_tuple_mapping("client", "SENSOR", "DATA", Selectivity::fractional(1.0))
        .add_tuple_mapping("proc", "DATA", "RESULT", Selectivity::fractional(1.0))
        .add_loop(&["SENSOR", "client", "proc", "DISPLAY"]);
    app
}

#[test]
fn outputs_follow_tuple_mappings() {
    let app = pipeline();
    let outs = app.outputs_for("client", "SENSOR");
    assert_eq!(outs.len(), 1);
    assert_eq!(outs[0].0.tuple_type, "DATA");

    // No mapping for this input type: the module is a sink for it.
    assert!(app.outputs_for("client", "RESULT").is_empty());
    assert!(app.outputs_for("unknown", "SENSOR").is_empty());
}

#[test]
fn periodic_edges_are_not_triggered_by_inputs() {
    let mut app = pipeline();
    app.add_edge(
        AppEdge::new("client", "proc", 1.0, 1.0, "HEARTBEAT", direction::UP, EdgeKind::Module)
            .with_periodicity(5.0),
    )
    .add_tuple_mapping("client", "SENSOR", "HEARTBEAT", Selectivity::fractional(1.0));

    let types: Vec<_> = app
        .outputs_for("client", "SENSOR")
        .into_iter()
        .map(|(e, _)| e.tuple_type.as_str())
        .collect();
    assert_eq!(types, vec!["DATA"]);
    let periodic: Vec<_> = app.periodic_edges("client").map(|(i, _)| i).collect();
    assert_eq!(periodic, vec![3]);
}

#[test]
fn validate_accepts_bound_endpoints() {
    let app = pipeline();
    app.validate(&tags(&["SENSOR"]), &tags(&["DISPLAY"]))
        .expect("valid application");
    assert_eq!(app.loops()[0].head(), Some("SENSOR"));
    assert_eq!(app.loops()[0].tail(), Some("DISPLAY"));
}

#[test]
fn validate_rejects_unknown_endpoints() {
    let app = pipeline();
    let err = app.validate(&tags(&["SENSOR"]), &tags(&[])).unwrap_err();
    assert_eq!(
        err,
        PlacementError::UnknownEndpoint {
            app: "app".into(),
            endpoint: "DISPLAY".into()
        }
    );
}

#[test]
fn validate_rejects_duplicate_modules() {
    let mut app = pipeline();
    app.add_module("proc", 1);
    let err = app
        .validate(&tags(&["SENSOR"]), &tags(&["DISPLAY"]))
        .unwrap_err();
    assert!(matches!(err, PlacementError::DuplicateModule { module, .. } if module == "proc"));
}

#[test]
fn validate_rejects_bad_lengths_and_periods() {
    let mut app = pipeline();
    app.add_app_edge("client", "proc", -1.0, 0.0, "BAD", direction::UP, EdgeKind::Module);
    assert!(matches!(
        app.validate(&tags(&["SENSOR"]), &tags(&["DISPLAY"])),
        Err(PlacementError::InvalidEdge { .. })
    ));

    let mut app = pipeline();
    app.add_edge(
        AppEdge::new("client", "proc", 1.0, 1.0, "TICK", direction::UP, EdgeKind::Module)
            .with_periodicity(0.0),
    );
    assert!(matches!(
        app.validate(&tags(&["SENSOR"]), &tags(&["DISPLAY"])),
        Err(PlacementError::InvalidPeriodicity { .. })
    ));
}

#[test]
fn application_round_trips_through_json() {
    let app = pipeline();
    let raw = serde_json::to_string(&app).expect("serialize");
    let back: Application = serde_json::from_str(&raw).expect("parse");
    assert_eq!(back.id, "app");
    assert_eq!(back.modules().len(), 2);
    assert_eq!(back.edges().len(), 3);
    assert_eq!(back.loops().len(), 1);
}
