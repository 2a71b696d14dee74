//! Benchmark runner: drives a warp session through a scenario and collects metrics.

use std::time::Instant;

use mallea_graph::{Pin, PinKind};
use mallea_solver::{SolveReport, WarpSession};
use mallea_types::{PinId, WarpResult};

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Builds the session for `scenario`: installs the boundary field and
    /// adds every pin in its frame-0 geometry.
    ///
    /// Returns the session and the id of each scripted pin, in order.
    pub fn start(scenario: &Scenario) -> WarpResult<(WarpSession, Vec<PinId>)> {
        let mut session = WarpSession::new(scenario.config.clone())?;
        if let Some(boundary) = &scenario.boundary {
            session.set_boundary_field(Some(boundary.clone()))?;
        }
        let mut ids = Vec::with_capacity(scenario.pins.len());
        for scripted in &scenario.pins {
            ids.push(session.add_pin(scripted.kind.clone(), scripted.stiffness, scripted.radius)?);
        }
        Ok((session, ids))
    }

    /// Applies the pin script for `frame` (1-based) and solves it.
    pub fn step(
        session: &mut WarpSession,
        scenario: &Scenario,
        ids: &[PinId],
        frame: u32,
    ) -> WarpResult<SolveReport> {
        for (scripted, &id) in scenario.pins.iter().zip(ids) {
            if scripted.is_animated() {
                let pin = Pin::new(id, scripted.kind_at(frame), scripted.stiffness, scripted.radius);
                session.update_pin(pin)?;
            }
        }
        session.update()
    }

    /// Run a single scenario.
    ///
    /// Returns metrics for the completed run.
    pub fn run(scenario: &Scenario) -> WarpResult<BenchmarkMetrics> {
        let total_start = Instant::now();
        let (mut session, ids) = Self::start(scenario)?;

        let mut frame_times: Vec<f64> = Vec::with_capacity(scenario.frames as usize);
        let mut total_cg: usize = 0;

        for frame in 1..=scenario.frames {
            let frame_start = Instant::now();
            let report = Self::step(&mut session, scenario, &ids, frame)?;
            frame_times.push(frame_start.elapsed().as_secs_f64());
            total_cg += report.cg_iterations;
        }
        session.finish();

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let final_pin_error = session
            .pins()
            .iter()
            .map(|pin| pin_error(&session, pin))
            .fold(0.0, f64::max);

        let avg_frame = if frame_times.is_empty() {
            0.0
        } else {
            frame_times.iter().sum::<f64>() / frame_times.len() as f64
        };
        let min_frame = frame_times.iter().copied().fold(f64::MAX, f64::min);
        let max_frame = frame_times.iter().copied().fold(0.0, f64::max);
        let avg_cg = if scenario.frames > 0 {
            total_cg as f64 / scenario.frames as f64
        } else {
            0.0
        };

        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            material: session.material().name.clone(),
            node_count: session.graph().node_count(),
            vertex_count: session.mesh().vertex_count(),
            frames: scenario.frames,
            total_wall_time,
            avg_frame_time: avg_frame,
            min_frame_time: min_frame,
            max_frame_time: max_frame,
            avg_cg_iterations: avg_cg,
            final_pin_error,
            max_displacement: session.graph().max_displacement(),
        };
        tracing::info!(
            scenario = %metrics.scenario,
            frames = metrics.frames,
            avg_frame_ms = metrics.avg_frame_time * 1000.0,
            pin_error = metrics.final_pin_error,
            "benchmark scenario finished"
        );
        Ok(metrics)
    }

    /// Run all scenarios with the given material preset (or each scenario's
    /// own, with `None`) and return metrics for each.
    pub fn run_all(material: Option<&str>) -> WarpResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            let mut scenario = Scenario::from_kind(kind)?;
            if let Some(name) = material {
                scenario = scenario.with_material(name);
            }
            results.push(Self::run(&scenario)?);
        }
        Ok(results)
    }
}

/// Distance between where the warped image puts a pin's handle and where
/// the pin asks for it.
///
/// Anchor and pose pins measure their rest point against their target; a
/// rail measures how far its own points drift off themselves.
pub fn pin_error(session: &WarpSession, pin: &Pin) -> f64 {
    match &pin.kind {
        PinKind::Anchor { rest, target } | PinKind::Pose { rest, target, .. } => {
            session.deform_point(*rest).distance(*target)
        }
        PinKind::Rail { points } => points
            .iter()
            .map(|p| session.deform_point(*p).distance(*p))
            .fold(0.0, f64::max),
    }
}
