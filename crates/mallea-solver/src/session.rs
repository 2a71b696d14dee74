//! Editing session: one image, its control graph, pins and render mesh.
//!
//! The session owns all mutable warp state. Every pin, stiffness or seam
//! edit re-applies the pin set and rebuilds the system matrix before the
//! next solve.

use mallea_graph::{
    apply_pins, apply_seam_barriers, apply_stiffness_field, clear_seam_barriers,
    set_uniform_stiffness, ControlGraph, Pin, PinKind, ScalarField,
};
use mallea_material::{MaterialDatabase, WarpMaterial};
use mallea_math::DVec2;
use mallea_mesh::{compute_skin_weights, deform_mesh, deform_point, generate_render_mesh, RenderMesh};
use mallea_telemetry::{EventBus, EventKind, EventSink, WarpEvent};
use mallea_types::{PinId, PinIdAllocator, WarpError, WarpResult};

use crate::arap::{self, SolveReport};
use crate::config::{SolveOptions, WarpConfig};
use crate::state::ArapState;

/// Interactive warp session.
///
/// ```text
/// let mut session = WarpSession::new(config)?;
/// let id = session.add_pin(kind, 1.0, 80.0)?;
/// loop {
///     session.move_pin(id, cursor)?;
///     session.update()?;
///     draw(session.mesh());
/// }
/// ```
#[derive(Debug)]
pub struct WarpSession {
    config: WarpConfig,
    materials: MaterialDatabase,
    material: WarpMaterial,
    options: SolveOptions,
    graph: ControlGraph,
    mesh: RenderMesh,
    state: ArapState,
    pins: Vec<Pin>,
    pin_ids: PinIdAllocator,
    boundary: Option<ScalarField>,
    stiffness: Option<ScalarField>,
    bus: EventBus,
    frame: u64,
}

impl WarpSession {
    /// Starts a session with the built-in material presets.
    pub fn new(config: WarpConfig) -> WarpResult<Self> {
        Self::with_materials(config, MaterialDatabase::with_defaults())
    }

    /// Starts a session resolving the material name against `materials`.
    pub fn with_materials(config: WarpConfig, materials: MaterialDatabase) -> WarpResult<Self> {
        config.validate()?;
        let material = materials.lookup(&config.material)?.clone();
        let options = frame_options(&config, &material);
        let (graph, mesh) = build_geometry(&config)?;
        let state = ArapState::new(config.system.clone());

        let mut session = Self {
            config,
            materials,
            material,
            options,
            graph,
            mesh,
            state,
            pins: Vec::new(),
            pin_ids: PinIdAllocator::new(),
            boundary: None,
            stiffness: None,
            bus: EventBus::new(),
            frame: 0,
        };
        session.apply_stiffness()?;
        session.refresh_constraints()?;
        tracing::info!(
            width = session.config.width,
            height = session.config.height,
            nodes = session.graph.node_count(),
            vertices = session.mesh.vertex_count(),
            material = %session.material.name,
            "warp session started"
        );
        Ok(session)
    }

    // ─── Pins ─────────────────────────────────────────────────

    /// Adds a pin and returns its id.
    pub fn add_pin(&mut self, kind: PinKind, stiffness: f64, radius: f64) -> WarpResult<PinId> {
        let mut pin = Pin::new(PinId(self.pin_ids.issued()), kind, stiffness, radius);
        pin.validate()?;
        pin.id = self.pin_ids.allocate();
        let id = pin.id;
        self.pins.push(pin);
        self.refresh_constraints()?;
        Ok(id)
    }

    /// Replaces the pin with the same id.
    pub fn update_pin(&mut self, pin: Pin) -> WarpResult<()> {
        pin.validate()?;
        let slot = self.pin_mut(pin.id)?;
        *slot = pin;
        self.refresh_constraints()
    }

    /// Moves a pin's target (Anchor and Pose; Rail ignores it).
    pub fn move_pin(&mut self, id: PinId, target: DVec2) -> WarpResult<()> {
        if !target.is_finite() {
            return Err(WarpError::InvalidPin(format!("{id}: non-finite target")));
        }
        self.pin_mut(id)?.set_target(target);
        self.refresh_constraints()
    }

    /// Removes a pin and returns it.
    pub fn remove_pin(&mut self, id: PinId) -> WarpResult<Pin> {
        let index = self
            .pins
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| unknown_pin(id))?;
        let pin = self.pins.remove(index);
        self.refresh_constraints()?;
        Ok(pin)
    }

    /// Removes every pin.
    pub fn clear_pins(&mut self) -> WarpResult<()> {
        self.pins.clear();
        self.refresh_constraints()
    }

    /// Current pins.
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Pin with the given id.
    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    fn pin_mut(&mut self, id: PinId) -> WarpResult<&mut Pin> {
        self.pins
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| unknown_pin(id))
    }

    // ─── Fields and material ──────────────────────────────────

    /// Installs (or removes, with `None`) the per-pixel boundary field used
    /// for seam barriers.
    pub fn set_boundary_field(&mut self, field: Option<ScalarField>) -> WarpResult<()> {
        match &field {
            Some(f) => apply_seam_barriers(&mut self.graph, f, &self.config.seam)?,
            None => clear_seam_barriers(&mut self.graph),
        }
        self.boundary = field;
        self.refresh_constraints()
    }

    /// Installs (or removes) the per-pixel stiffness field.
    pub fn set_stiffness_field(&mut self, field: Option<ScalarField>) -> WarpResult<()> {
        if let Some(f) = &field {
            f.check_aligned(self.graph.width, self.graph.height)?;
        }
        self.stiffness = field;
        self.apply_stiffness()?;
        self.refresh_constraints()
    }

    /// Switches to another preset by name.
    pub fn set_material(&mut self, name: &str) -> WarpResult<()> {
        self.material = self.materials.lookup(name)?.clone();
        self.config.material = self.material.name.clone();
        self.options = frame_options(&self.config, &self.material);
        self.apply_stiffness()?;
        self.refresh_constraints()
    }

    /// Boundary field in use, if any.
    pub fn boundary_field(&self) -> Option<&ScalarField> {
        self.boundary.as_ref()
    }

    /// Stiffness field in use, if any.
    pub fn stiffness_field(&self) -> Option<&ScalarField> {
        self.stiffness.as_ref()
    }

    /// Active material.
    pub fn material(&self) -> &WarpMaterial {
        &self.material
    }

    /// Per-frame solve settings in use.
    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    fn apply_stiffness(&mut self) -> WarpResult<()> {
        let base = self.material.stiffness_multiplier();
        match &self.stiffness {
            Some(field) => apply_stiffness_field(&mut self.graph, field, base),
            None => set_uniform_stiffness(&mut self.graph, base),
        }
    }

    /// Re-applies pins and rebuilds the system matrix.
    fn refresh_constraints(&mut self) -> WarpResult<()> {
        let stats = apply_pins(&mut self.graph, &self.pins)?;
        self.emit(EventKind::PinsApplied {
            pins: stats.pins,
            influenced_nodes: stats.influenced_nodes,
        });

        self.state.update_system_matrix(&self.graph);
        let nnz = self.state.matrix().map_or(0, |m| m.nnz());
        self.emit(EventKind::SystemRebuilt {
            nodes: self.graph.node_count(),
            nnz,
        });
        self.bus.flush();
        Ok(())
    }

    // ─── Frame ────────────────────────────────────────────────

    /// Solves with the per-frame settings and deforms the render mesh.
    pub fn update(&mut self) -> WarpResult<SolveReport> {
        let options = self.options.clone();
        self.run_frame(&options)
    }

    /// Settles the deformation with many more passes, keeping the
    /// configured linear solver.
    pub fn final_quality_pass(&mut self) -> WarpResult<SolveReport> {
        let options = SolveOptions {
            linear_solver: self.options.linear_solver,
            ..SolveOptions::final_quality()
        };
        self.run_frame(&options)
    }

    fn run_frame(&mut self, options: &SolveOptions) -> WarpResult<SolveReport> {
        self.emit(EventKind::SolveBegin {
            iterations: options.iterations,
        });

        let report = arap::solve(&mut self.graph, &mut self.state, options)?;
        for (iteration, pass) in (1u32..).zip(&report.history) {
            self.emit(EventKind::ArapIteration {
                iteration,
                cg_iterations: pass.cg_iterations,
                max_step: pass.max_step,
            });
        }

        deform_mesh(&mut self.mesh, &self.graph)?;

        self.emit(EventKind::SolveEnd {
            iterations: report.iterations,
            wall_time: report.wall_time.as_secs_f64(),
        });
        self.bus.flush();
        self.frame += 1;
        Ok(report)
    }

    /// Discards all deformation: drops pins and fields and rebuilds the
    /// graph and render mesh from the configuration. Pin ids keep counting.
    pub fn reset(&mut self) -> WarpResult<()> {
        let (graph, mesh) = build_geometry(&self.config)?;
        self.graph = graph;
        self.mesh = mesh;
        self.state = ArapState::new(self.config.system.clone());
        self.pins.clear();
        self.boundary = None;
        self.stiffness = None;
        self.frame = 0;
        self.apply_stiffness()?;
        self.refresh_constraints()?;
        tracing::debug!("warp session reset");
        Ok(())
    }

    // ─── Outputs ──────────────────────────────────────────────

    /// Current (deformed) node positions.
    pub fn node_positions(&self) -> Vec<DVec2> {
        self.graph.positions()
    }

    /// Control graph.
    pub fn graph(&self) -> &ControlGraph {
        &self.graph
    }

    /// Render mesh with the deformed buffer from the last update.
    pub fn mesh(&self) -> &RenderMesh {
        &self.mesh
    }

    /// Solver state.
    pub fn state(&self) -> &ArapState {
        &self.state
    }

    /// Where a rest-space point currently is.
    pub fn deform_point(&self, point: DVec2) -> DVec2 {
        deform_point(&self.graph, point, self.config.skin_neighbors)
    }

    /// Completed updates since start or the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Configuration the session was started with (material name tracks
    /// `set_material`).
    pub fn config(&self) -> &WarpConfig {
        &self.config
    }

    // ─── Telemetry ────────────────────────────────────────────

    /// Registers a telemetry sink.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.bus.add_sink(sink);
    }

    /// Flushes pending events and finalizes sinks.
    pub fn finish(&mut self) {
        self.bus.finish();
    }

    fn emit(&mut self, kind: EventKind) {
        self.bus.emit(WarpEvent::new(self.frame, kind));
    }
}

fn frame_options(config: &WarpConfig, material: &WarpMaterial) -> SolveOptions {
    let mut options = config.solve.clone();
    if config.iterations_from_material {
        options.iterations = material.solve_iterations();
    }
    options
}

fn build_geometry(config: &WarpConfig) -> WarpResult<(ControlGraph, RenderMesh)> {
    let graph = ControlGraph::new(config.width, config.height, &config.graph)?;
    let mut mesh = generate_render_mesh(config.width, config.height, config.mesh_resolution)?;
    compute_skin_weights(&mut mesh, &graph, config.skin_neighbors)?;
    Ok((graph, mesh))
}

fn unknown_pin(id: PinId) -> WarpError {
    WarpError::InvalidPin(format!("{id}: no such pin"))
}
