//! Editing-session tests for mallea-solver.

use mallea_graph::{PinKind, ScalarField};
use mallea_math::DVec2;
use mallea_solver::{WarpConfig, WarpSession};
use mallea_telemetry::{EventKind, VecSink};
use mallea_types::{PinId, WarpError};

fn small_config() -> WarpConfig {
    let mut config = WarpConfig::for_image(100.0, 100.0);
    config.graph.node_count = 25;
    config.mesh_resolution = 10.0;
    config
}

fn anchor(at: DVec2) -> PinKind {
    PinKind::Anchor {
        rest: at,
        target: at,
    }
}

#[test]
fn new_session_is_at_rest() {
    let session = WarpSession::new(small_config()).unwrap();
    assert_eq!(session.frame(), 0);
    assert_eq!(session.graph().node_count(), 25);
    assert_eq!(session.mesh().vertex_count(), 121);
    assert!(session.mesh().is_skinned());
    assert!(session.state().is_initialized());
    assert!(!session.state().is_stale(session.graph()));
    assert_eq!(session.material().name, "balanced");
    assert_eq!(session.options().iterations, 3);
    for (p, node) in session.node_positions().iter().zip(&session.graph().nodes) {
        assert_eq!(*p, node.rest);
    }
}

#[test]
fn unknown_material_rejected() {
    let mut config = small_config();
    config.material = "velvet".into();
    assert!(matches!(
        WarpSession::new(config),
        Err(WarpError::InvalidMaterial(_))
    ));
}

#[test]
fn drag_moves_node_and_mesh() {
    let mut session = WarpSession::new(small_config()).unwrap();
    let id = session.add_pin(anchor(DVec2::new(50.0, 50.0)), 1.0, 80.0).unwrap();
    session.move_pin(id, DVec2::new(70.0, 50.0)).unwrap();
    assert!(!session.state().is_stale(session.graph()));

    for _ in 0..5 {
        session.update().unwrap();
    }
    assert_eq!(session.frame(), 5);

    let center = session.graph().nearest_node(DVec2::new(50.0, 50.0)).unwrap();
    let p = session.graph().node(center).unwrap().position;
    assert!(p.distance(DVec2::new(70.0, 50.0)) < 2.0);

    // A point on the node follows it exactly.
    let rest = session.graph().node(center).unwrap().rest;
    assert!(session.deform_point(rest).distance(p) < 1e-9);

    let mesh = session.mesh();
    let moved = (0..mesh.vertex_count())
        .filter(|&i| mesh.deformed_position(i).distance(mesh.rest_position(i)) > 1.0)
        .count();
    assert!(moved > mesh.vertex_count() / 2);
}

#[test]
fn pin_ids_are_per_session() {
    let mut a = WarpSession::new(small_config()).unwrap();
    let mut b = WarpSession::new(small_config()).unwrap();
    let a0 = a.add_pin(anchor(DVec2::new(10.0, 10.0)), 1.0, 20.0).unwrap();
    let a1 = a.add_pin(anchor(DVec2::new(90.0, 90.0)), 1.0, 20.0).unwrap();
    let b0 = b.add_pin(anchor(DVec2::new(10.0, 10.0)), 1.0, 20.0).unwrap();
    assert_eq!(a0, PinId(0));
    assert_eq!(a1, PinId(1));
    assert_eq!(b0, PinId(0));
}

#[test]
fn invalid_pin_does_not_consume_an_id() {
    let mut session = WarpSession::new(small_config()).unwrap();
    assert!(matches!(
        session.add_pin(anchor(DVec2::new(10.0, 10.0)), 2.0, 20.0),
        Err(WarpError::InvalidPin(_))
    ));
    assert!(session.pins().is_empty());
    let id = session.add_pin(anchor(DVec2::new(10.0, 10.0)), 0.5, 20.0).unwrap();
    assert_eq!(id, PinId(0));
}

#[test]
fn pin_editing() {
    let mut session = WarpSession::new(small_config()).unwrap();
    let id = session.add_pin(anchor(DVec2::new(50.0, 50.0)), 1.0, 30.0).unwrap();

    let mut pin = session.pin(id).unwrap().clone();
    pin.radius = 45.0;
    session.update_pin(pin).unwrap();
    assert_eq!(session.pin(id).unwrap().radius, 45.0);

    let influenced = session
        .graph()
        .nodes
        .iter()
        .filter(|n| n.pin_weight > 0.0)
        .count();
    assert!(influenced >= 5);

    let removed = session.remove_pin(id).unwrap();
    assert_eq!(removed.id, id);
    assert!(session.graph().nodes.iter().all(|n| n.pin_weight == 0.0));

    assert!(matches!(session.remove_pin(id), Err(WarpError::InvalidPin(_))));
    assert!(session.move_pin(id, DVec2::ZERO).is_err());

    session.add_pin(anchor(DVec2::ZERO), 1.0, 10.0).unwrap();
    session.add_pin(anchor(DVec2::new(100.0, 0.0)), 1.0, 10.0).unwrap();
    session.clear_pins().unwrap();
    assert!(session.pins().is_empty());
}

#[test]
fn reset_restores_rest_and_keeps_counting_ids() {
    let mut session = WarpSession::new(small_config()).unwrap();
    let id = session.add_pin(anchor(DVec2::new(50.0, 50.0)), 1.0, 80.0).unwrap();
    session.move_pin(id, DVec2::new(60.0, 40.0)).unwrap();
    session.update().unwrap();
    assert!(session.graph().max_displacement() > 1.0);

    session.reset().unwrap();
    assert_eq!(session.frame(), 0);
    assert!(session.pins().is_empty());
    assert_eq!(session.graph().max_displacement(), 0.0);
    assert_eq!(session.mesh().deformed_x, session.mesh().pos_x);

    let next = session.add_pin(anchor(DVec2::new(50.0, 50.0)), 1.0, 80.0).unwrap();
    assert_eq!(next, PinId(1));
}

#[test]
fn material_changes_stiffness_and_iterations() {
    let mut session = WarpSession::new(small_config()).unwrap();
    assert!(session.set_material("velvet").is_err());
    assert_eq!(session.material().name, "balanced");

    session.set_material("rigid").unwrap();
    let rigid = session.material().clone();
    assert_eq!(session.options().iterations, rigid.solve_iterations());
    let expected = rigid.stiffness_multiplier();
    assert!(session
        .graph()
        .nodes
        .iter()
        .all(|n| (n.stiffness - expected).abs() < 1e-12));
    assert_eq!(session.config().material, "rigid");
}

#[test]
fn fixed_iterations_when_material_ignored() {
    let mut config = small_config();
    config.iterations_from_material = false;
    config.solve.iterations = 7;
    config.material = "jelly".into();
    let mut session = WarpSession::new(config).unwrap();
    assert_eq!(session.options().iterations, 7);
    let report = session.update().unwrap();
    assert_eq!(report.iterations, 7);
}

#[test]
fn stiffer_material_lags_behind_pin() {
    let lag = |material: &str| {
        let mut config = small_config();
        config.system.boundary_damping = 1.0;
        config.material = material.into();
        let mut session = WarpSession::new(config).unwrap();
        let id = session.add_pin(anchor(DVec2::new(50.0, 50.0)), 1.0, 30.0).unwrap();
        session.move_pin(id, DVec2::new(65.0, 50.0)).unwrap();
        for _ in 0..10 {
            session.update().unwrap();
        }
        let center = session.graph().nearest_node(DVec2::new(50.0, 50.0)).unwrap();
        session
            .graph()
            .node(center)
            .unwrap()
            .position
            .distance(DVec2::new(65.0, 50.0))
    };
    assert!(lag("jelly") < lag("rigid"));
}

#[test]
fn fields_must_match_image() {
    let mut session = WarpSession::new(small_config()).unwrap();
    let wrong = ScalarField::constant(40, 40, 0.0).unwrap();
    assert!(session.set_stiffness_field(Some(wrong.clone())).is_err());
    assert!(session.set_boundary_field(Some(wrong)).is_err());
    assert!(session.boundary_field().is_none());

    let band = ScalarField::from_fn(100, 100, |x, _| if x > 50 { 1.0 } else { 0.0 }).unwrap();
    session.set_boundary_field(Some(band.clone())).unwrap();
    session.set_stiffness_field(Some(band)).unwrap();
    assert!(session.boundary_field().is_some());
    assert!(session.stiffness_field().is_some());
    assert!(!session.state().is_stale(session.graph()));

    session.set_boundary_field(None).unwrap();
    assert!(session
        .graph()
        .nodes
        .iter()
        .all(|n| n.edges.iter().all(|e| e.weight == e.base_weight)));
}

#[test]
fn final_quality_pass_runs_long_solve() {
    let mut session = WarpSession::new(small_config()).unwrap();
    let id = session.add_pin(anchor(DVec2::new(50.0, 50.0)), 1.0, 80.0).unwrap();
    session.move_pin(id, DVec2::new(70.0, 50.0)).unwrap();
    let report = session.final_quality_pass().unwrap();
    assert_eq!(report.iterations, 20);
    assert_eq!(session.frame(), 1);
}

#[test]
fn events_follow_frame_lifecycle() {
    let mut session = WarpSession::new(small_config()).unwrap();
    let sink = VecSink::new();
    session.add_sink(Box::new(sink.clone()));

    let id = session.add_pin(anchor(DVec2::new(50.0, 50.0)), 1.0, 80.0).unwrap();
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0].kind,
        EventKind::PinsApplied {
            pins: 1,
            influenced_nodes
        } if influenced_nodes > 0
    ));
    assert!(matches!(events[1].kind, EventKind::SystemRebuilt { nodes: 25, .. }));

    sink.clear();
    session.move_pin(id, DVec2::new(60.0, 50.0)).unwrap();
    session.update().unwrap();
    session.finish();

    let kinds: Vec<EventKind> = sink.events().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds.len(), 2 + 1 + 3 + 1);
    assert!(matches!(kinds[2], EventKind::SolveBegin { iterations: 3 }));
    for (k, kind) in kinds[3..6].iter().enumerate() {
        assert!(matches!(kind, EventKind::ArapIteration { iteration, .. } if *iteration == k as u32 + 1));
    }
    assert!(matches!(kinds[6], EventKind::SolveEnd { iterations: 3, .. }));
    assert!(sink.events().iter().all(|e| e.frame == 0));
}
