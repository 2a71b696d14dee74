//! CLI command implementations.

use mallea_bench::metrics::BenchmarkMetrics;
use mallea_bench::runner::{pin_error, BenchmarkRunner};
use mallea_bench::scenarios::{Scenario, ScenarioKind};
use mallea_material::MaterialDatabase;
use mallea_solver::{WarpConfig, WarpSession};
use mallea_telemetry::TracingSink;
use serde::Serialize;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Warped mesh written by `simulate`.
#[derive(Serialize)]
struct MeshExport<'a> {
    scenario: &'a str,
    material: &'a str,
    frames: u64,
    width: f64,
    height: f64,
    cols: usize,
    rows: usize,
    /// Deformed positions, interleaved `[x0, y0, x1, y1, ...]`.
    positions: Vec<f32>,
    /// Texture coordinates, interleaved like `positions`.
    uvs: Vec<f32>,
    indices: &'a [u32],
    /// Deformed control node positions.
    nodes: Vec<[f64; 2]>,
}

impl<'a> MeshExport<'a> {
    fn from_session(scenario: &'a str, session: &'a WarpSession) -> Self {
        let mesh = session.mesh();
        let uvs = mesh
            .uv_u
            .iter()
            .zip(&mesh.uv_v)
            .flat_map(|(&u, &v)| [u, v])
            .collect();
        Self {
            scenario,
            material: &session.material().name,
            frames: session.frame(),
            width: session.config().width,
            height: session.config().height,
            cols: mesh.cols,
            rows: mesh.rows,
            positions: mesh.deformed_interleaved(),
            uvs,
            indices: &mesh.indices,
            nodes: session
                .node_positions()
                .iter()
                .map(|p| [p.x, p.y])
                .collect(),
        }
    }
}

fn parse_scenario(name: &str) -> Result<ScenarioKind, Box<dyn std::error::Error>> {
    ScenarioKind::from_name(name).ok_or_else(|| {
        let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
        format!(
            "Unknown scenario: '{name}'. Available: {}",
            available.join(", ")
        )
        .into()
    })
}

fn check_material(name: &str) -> CliResult {
    let db = MaterialDatabase::with_defaults();
    if db.get(name).is_none() {
        return Err(format!(
            "Unknown material: '{name}'. Available: {}",
            db.names().join(", ")
        )
        .into());
    }
    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    material_name: Option<&str>,
    output_path: Option<&str>,
) -> CliResult {
    println!("Mallea Benchmark Suite");
    println!("══════════════════════");
    println!();

    if let Some(name) = material_name {
        check_material(name)?;
        println!("Material: {name}");
        println!();
    }

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![parse_scenario(scenario_name)?]
    };

    let mut all_metrics = Vec::new();

    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind)?;
        if let Some(name) = material_name {
            scenario = scenario.with_material(name);
        }

        println!(
            "Running: {} ({}×{} image, {} pins, {} frames)",
            kind.name(),
            scenario.config.width,
            scenario.config.height,
            scenario.pins.len(),
            scenario.frames,
        );

        let metrics =
            BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Nodes / verts: {} / {}", metrics.node_count, metrics.vertex_count);
        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg frame:     {:.3}ms", metrics.avg_frame_time * 1000.0);
        println!("  Avg CG iters:  {:.1}", metrics.avg_cg_iterations);
        println!("  Pin error:     {:.4}", metrics.final_pin_error);
        println!("  Max displace:  {:.4}", metrics.max_displacement);
        println!();

        all_metrics.push(metrics);
    }

    if let Some(path) = output_path {
        let csv = BenchmarkMetrics::to_csv(&all_metrics);
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
    }

    Ok(())
}

/// Run one scenario frame by frame and write the warped mesh as JSON.
pub fn simulate(
    config_path: Option<&str>,
    scenario_name: &str,
    frames: Option<u32>,
    settle: bool,
    output_path: &str,
) -> CliResult {
    println!("Mallea Simulation");
    println!("─────────────────");

    let kind = parse_scenario(scenario_name)?;
    let mut scenario = Scenario::from_kind(kind)?;

    if let Some(path) = config_path {
        println!("Config:    {path}");
        let mut config = WarpConfig::from_file(path)?;
        if config.width != scenario.config.width || config.height != scenario.config.height {
            tracing::info!(
                config_width = config.width,
                config_height = config.height,
                "image size taken from scenario"
            );
        }
        config.width = scenario.config.width;
        config.height = scenario.config.height;
        config.validate()?;
        scenario.config = config;
    }
    if let Some(frames) = frames {
        scenario.frames = frames;
    }

    println!("Scenario:  {}", kind.name());
    println!("Material:  {}", scenario.config.material);
    println!("Frames:    {}", scenario.frames);
    println!();

    let (mut session, ids) = BenchmarkRunner::start(&scenario)?;
    session.add_sink(Box::new(TracingSink::default()));

    for frame in 1..=scenario.frames {
        let report = BenchmarkRunner::step(&mut session, &scenario, &ids, frame)?;
        println!(
            "  frame {frame:>3}: {} passes, {} CG iters, max step {:.4}, {:.3}ms",
            report.iterations,
            report.cg_iterations,
            report.max_step,
            report.wall_time.as_secs_f64() * 1000.0,
        );
    }

    if settle {
        let report = session.final_quality_pass()?;
        println!(
            "  settle:    {} passes, {} CG iters, {:.3}ms",
            report.iterations,
            report.cg_iterations,
            report.wall_time.as_secs_f64() * 1000.0,
        );
    }
    session.finish();

    for pin in session.pins() {
        println!("  {}: error {:.4}", pin.id, pin_error(&session, pin));
    }

    let export = MeshExport::from_session(kind.name(), &session);
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(output_path, json)?;
    println!();
    println!(
        "Mesh written to: {output_path} ({} verts, {} tris)",
        session.mesh().vertex_count(),
        session.mesh().triangle_count()
    );

    Ok(())
}

/// Validate a warp config.
pub fn validate(path: &str) -> CliResult {
    println!("Mallea Validator");
    println!("────────────────");
    println!();

    if !path.ends_with(".toml") {
        println!("Unsupported file format. Use .toml (warp config).");
        return Ok(());
    }

    println!("Validating config: {path}");
    let config = WarpConfig::from_file(path)?;
    config.validate()?;
    check_material(&config.material)?;

    // Building the session also checks the graph and mesh can be generated.
    match WarpSession::new(config) {
        Ok(session) => println!(
            "✅ Config is valid ({} nodes, {} verts, material '{}').",
            session.graph().node_count(),
            session.mesh().vertex_count(),
            session.material().name
        ),
        Err(e) => println!("❌ Config validation failed: {e}"),
    }

    Ok(())
}

/// List the material presets.
pub fn materials() -> CliResult {
    let db = MaterialDatabase::with_defaults();
    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>8} {:>10} {:>6}",
        "name", "rigidity", "stretch", "shear", "bending", "stiffness", "iters"
    );
    for name in db.names() {
        let m = db.lookup(name)?;
        println!(
            "{:<10} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>10.3} {:>6}",
            m.name,
            m.rigidity,
            m.stretch,
            m.shear,
            m.bending,
            m.stiffness_multiplier(),
            m.solve_iterations()
        );
    }
    Ok(())
}
