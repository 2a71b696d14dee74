//! Integration tests for mallea-solver.

use mallea_graph::{
    apply_pins, apply_seam_barriers, create_control_graph, ControlGraph, Pin, PinKind,
    ScalarField, SeamOptions, SystemOptions,
};
use mallea_math::decomposition::rotation_angle;
use mallea_math::{DMat2, DVec2};
use mallea_solver::{
    arap_iteration, local_step, solve, ArapState, LinearSolverKind, SolveOptions, WarpConfig,
};
use mallea_types::{NodeId, PinId, WarpError};

fn drag_setup(target: DVec2) -> (ControlGraph, ArapState, NodeId) {
    let mut graph = create_control_graph(100.0, 100.0, 25, 0.1).unwrap();
    let mut pin = Pin::anchor(PinId(0), DVec2::new(50.0, 50.0), 1.0, 80.0);
    pin.set_target(target);
    apply_pins(&mut graph, &[pin]).unwrap();
    let state = ArapState::for_graph(&graph, SystemOptions::default());
    let center = graph.nearest_node(DVec2::new(50.0, 50.0)).unwrap();
    (graph, state, center)
}

fn position(graph: &ControlGraph, id: NodeId) -> DVec2 {
    graph.node(id).unwrap().position
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn solve_options_presets() {
    let interactive = SolveOptions::interactive();
    assert_eq!(interactive, SolveOptions::default());
    assert_eq!(interactive.iterations, 3);
    assert_eq!(interactive.linear_solver, LinearSolverKind::ConjugateGradient);

    let fq = SolveOptions::final_quality();
    assert_eq!(fq.iterations, 20);
    assert!(fq.cg_tolerance < interactive.cg_tolerance);
    assert!(fq.cg_max_iterations > interactive.cg_max_iterations);

    let rigid = mallea_material::MaterialDatabase::with_defaults();
    let rigid = rigid.get("rigid").unwrap();
    assert_eq!(SolveOptions::for_material(rigid).iterations, rigid.solve_iterations());
}

#[test]
fn solve_options_validation() {
    assert!(SolveOptions::default().validate().is_ok());
    let zero = SolveOptions {
        iterations: 0,
        ..Default::default()
    };
    assert!(matches!(zero.validate(), Err(WarpError::InvalidConfig(_))));
    let bad_tol = SolveOptions {
        cg_tolerance: 0.0,
        ..Default::default()
    };
    assert!(bad_tol.validate().is_err());
}

#[test]
fn config_toml_round_trip() {
    let mut config = WarpConfig::for_image(640.0, 480.0);
    config.material = "rubber".into();
    config.system.boundary_damping = 0.5;
    config.solve.linear_solver = LinearSolverKind::JacobiConjugateGradient;
    let text = config.to_toml_string().unwrap();
    assert!(text.contains("jacobi_conjugate_gradient"));
    let back = WarpConfig::from_toml_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn config_partial_toml_uses_defaults() {
    let config = WarpConfig::from_toml_str(
        r#"
        width = 300.0
        height = 200.0

        [graph]
        node_count = 60

        [solve]
        linear_solver = "cholesky"
        "#,
    )
    .unwrap();
    assert_eq!(config.width, 300.0);
    assert_eq!(config.graph.node_count, 60);
    assert_eq!(config.graph.jitter_ratio, 0.1);
    assert_eq!(config.solve.iterations, 3);
    assert_eq!(config.solve.linear_solver, LinearSolverKind::Cholesky);
    assert_eq!(config.material, "balanced");
    assert!(config.validate().is_ok());
}

#[test]
fn config_rejects_bad_input() {
    assert!(matches!(
        WarpConfig::from_toml_str("width = \"wide\""),
        Err(WarpError::Serialization(_))
    ));

    let mut config = WarpConfig::default();
    config.width = 0.0;
    assert!(config.validate().is_err());

    let mut config = WarpConfig::default();
    config.skin_neighbors = 0;
    assert!(config.validate().is_err());

    let mut config = WarpConfig::default();
    config.system.boundary_damping = -1.0;
    assert!(config.validate().is_err());

    let mut config = WarpConfig::default();
    config.graph.node_count = 0;
    assert!(matches!(config.validate(), Err(WarpError::InvalidGraph(_))));
}

// ─── State Tests ──────────────────────────────────────────────

#[test]
fn uninitialized_state_refuses_to_solve() {
    let mut graph = create_control_graph(100.0, 100.0, 25, 0.1).unwrap();
    let mut state = ArapState::new(SystemOptions::default());
    assert!(!state.is_initialized());
    let opts = SolveOptions::default();
    assert!(matches!(
        solve(&mut graph, &mut state, &opts),
        Err(WarpError::NotInitialized(_))
    ));
    assert!(matches!(
        arap_iteration(&mut graph, &mut state, &opts),
        Err(WarpError::NotInitialized(_))
    ));
}

#[test]
fn state_for_other_graph_is_rejected() {
    let small = create_control_graph(100.0, 100.0, 9, 0.1).unwrap();
    let mut big = create_control_graph(100.0, 100.0, 100, 0.1).unwrap();
    let mut state = ArapState::for_graph(&small, SystemOptions::default());
    assert!(matches!(
        solve(&mut big, &mut state, &SolveOptions::default()),
        Err(WarpError::DimensionMismatch { .. })
    ));
}

#[test]
fn staleness_tracks_pin_edits() {
    let (mut graph, mut state, _) = drag_setup(DVec2::new(70.0, 50.0));
    assert!(!state.is_stale(&graph));
    assert_eq!(state.node_count(), graph.node_count());
    assert_eq!(state.sol_x.len(), graph.node_count());

    apply_pins(&mut graph, &[]).unwrap();
    assert!(state.is_stale(&graph));

    // A stale matrix is still solved against (with a warning).
    assert!(solve(&mut graph, &mut state, &SolveOptions::default()).is_ok());

    state.update_system_matrix(&graph);
    assert!(!state.is_stale(&graph));
}

#[test]
fn matrix_diagonal_carries_pin_weight() {
    let (graph, state, center) = drag_setup(DVec2::new(70.0, 50.0));
    let a = state.matrix().unwrap();
    let i = center.index();
    let off: f64 = (a.row_ptr[i]..a.row_ptr[i + 1])
        .filter(|&k| a.col_idx[k] != i)
        .map(|k| a.values[k])
        .sum();
    let pin_weight = graph.nodes[i].pin_weight;
    assert!((a.get(i, i) + off - pin_weight).abs() < 1e-12);
    assert!(pin_weight > 0.9);
}

// ─── Local Step Tests ─────────────────────────────────────────

#[test]
fn local_step_recovers_rigid_rotation() {
    let mut graph = create_control_graph(100.0, 100.0, 49, 0.2).unwrap();
    let center = DVec2::new(50.0, 50.0);
    let r = DMat2::from_angle(0.6);
    for node in &mut graph.nodes {
        node.position = center + r * (node.rest - center) + DVec2::new(3.0, -7.0);
    }
    local_step(&mut graph);
    for node in &graph.nodes {
        assert!((rotation_angle(node.rotation) - 0.6).abs() < 1e-9);
    }
}

#[test]
fn local_step_identity_at_rest() {
    let mut graph = create_control_graph(100.0, 100.0, 25, 0.1).unwrap();
    local_step(&mut graph);
    for node in &graph.nodes {
        let d = node.rotation - DMat2::IDENTITY;
        assert!(d.x_axis.length() + d.y_axis.length() < 1e-9);
    }
}

// ─── Solve Tests ──────────────────────────────────────────────

#[test]
fn unpinned_rest_graph_is_fixed_point() {
    let mut graph = create_control_graph(100.0, 100.0, 25, 0.1).unwrap();
    let mut state = ArapState::for_graph(&graph, SystemOptions::default());
    let report = solve(&mut graph, &mut state, &SolveOptions::default()).unwrap();
    assert_eq!(report.iterations, 3);
    assert_eq!(report.history.len(), 3);
    for node in &graph.nodes {
        assert!(node.position.distance(node.rest) < 1e-6, "{:?}", node);
    }
    assert!(report.max_step < 1e-6);
}

#[test]
fn dragged_anchor_reaches_target() {
    let target = DVec2::new(70.0, 50.0);
    let (mut graph, mut state, center) = drag_setup(target);
    let opts = SolveOptions::default();
    for _ in 0..5 {
        solve(&mut graph, &mut state, &opts).unwrap();
    }
    let p = position(&graph, center);
    assert!(p.distance(target) < 2.0, "center ended at {p:?}");
}

#[test]
fn linear_solvers_agree() {
    let target = DVec2::new(70.0, 50.0);
    let mut results = Vec::new();
    for kind in [
        LinearSolverKind::ConjugateGradient,
        LinearSolverKind::JacobiConjugateGradient,
        LinearSolverKind::Cholesky,
    ] {
        let (mut graph, mut state, _) = drag_setup(target);
        let opts = SolveOptions {
            linear_solver: kind,
            cg_tolerance: 1e-10,
            cg_max_iterations: 500,
            ..Default::default()
        };
        let report = solve(&mut graph, &mut state, &opts).unwrap();
        if kind == LinearSolverKind::Cholesky {
            assert_eq!(report.cg_iterations, 0);
        } else {
            assert!(report.cg_iterations > 0);
        }
        results.push(graph.positions());
    }
    for other in &results[1..] {
        for (a, b) in results[0].iter().zip(other) {
            assert!(a.distance(*b) < 1e-4, "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn cholesky_with_damping_only() {
    let mut graph = create_control_graph(100.0, 100.0, 25, 0.1).unwrap();
    let opts = SolveOptions {
        linear_solver: LinearSolverKind::Cholesky,
        ..Default::default()
    };
    let damped = SystemOptions {
        boundary_damping: 1.0,
    };
    let mut state = ArapState::for_graph(&graph, damped);
    solve(&mut graph, &mut state, &opts).unwrap();
    for node in &graph.nodes {
        assert!(node.position.distance(node.rest) < 1e-8);
    }
}

#[test]
fn pose_pin_produces_rigid_motion() {
    let mut graph = create_control_graph(100.0, 100.0, 25, 0.1).unwrap();
    let rest = DVec2::new(50.0, 50.0);
    let target = DVec2::new(55.0, 45.0);
    let angle = 0.3;
    let pin = Pin::new(
        PinId(0),
        PinKind::Pose {
            rest,
            target,
            angle,
            scale: 1.0,
        },
        1.0,
        200.0,
    );
    apply_pins(&mut graph, &[pin]).unwrap();
    let mut state = ArapState::for_graph(&graph, SystemOptions::default());
    for _ in 0..10 {
        solve(&mut graph, &mut state, &SolveOptions::default()).unwrap();
    }

    let r = DMat2::from_angle(angle);
    for node in &graph.nodes {
        let expected = target + r * (node.rest - rest);
        assert!(node.position.distance(expected) < 0.5);
        assert!((rotation_angle(node.rotation) - angle).abs() < 0.05);
    }
}

#[test]
fn repeated_solves_settle() {
    let (mut graph, mut state, _) = drag_setup(DVec2::new(70.0, 50.0));
    let opts = SolveOptions::default();
    let first = solve(&mut graph, &mut state, &opts).unwrap();
    for _ in 0..4 {
        solve(&mut graph, &mut state, &opts).unwrap();
    }
    let later = solve(&mut graph, &mut state, &opts).unwrap();
    assert!(later.max_step < first.max_step);
    assert_eq!(later.history.last().map(|h| h.max_step), Some(later.max_step));
}

#[test]
fn seam_barrier_limits_spread() {
    let run = |seam: bool| {
        let mut graph = create_control_graph(100.0, 100.0, 100, 0.1).unwrap();
        if seam {
            let band = ScalarField::from_fn(101, 101, |x, _| {
                if (45..=55).contains(&x) {
                    1.0
                } else {
                    0.0
                }
            })
            .unwrap();
            apply_seam_barriers(&mut graph, &band, &SeamOptions::default()).unwrap();
        }
        let mut pin = Pin::anchor(PinId(0), DVec2::new(25.0, 50.0), 1.0, 30.0);
        pin.set_target(DVec2::new(25.0, 30.0));
        apply_pins(&mut graph, &[pin]).unwrap();
        let damping = SystemOptions {
            boundary_damping: 0.5,
        };
        let mut state = ArapState::for_graph(&graph, damping);
        for _ in 0..5 {
            solve(&mut graph, &mut state, &SolveOptions::default()).unwrap();
        }
        let far = graph.nearest_node(DVec2::new(75.0, 50.0)).unwrap();
        graph.node(far).unwrap().displacement().length()
    };
    let coupled = run(false);
    let separated = run(true);
    assert!(separated < coupled, "seam {separated} vs none {coupled}");
}

#[test]
fn boundary_damping_holds_border() {
    let run = |damping: f64| {
        let (mut graph, _, _) = drag_setup(DVec2::new(70.0, 50.0));
        let mut state = ArapState::for_graph(
            &graph,
            SystemOptions {
                boundary_damping: damping,
            },
        );
        for _ in 0..5 {
            solve(&mut graph, &mut state, &SolveOptions::default()).unwrap();
        }
        graph
            .nodes
            .iter()
            .filter(|n| n.border)
            .map(|n| n.displacement().length())
            .fold(0.0, f64::max)
    };
    assert!(run(5.0) < run(0.0));
}
