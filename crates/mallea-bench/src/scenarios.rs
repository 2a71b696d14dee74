//! Benchmark scenarios: image size, graph config and a pin script for each case.
//!
//! Four canonical scenarios for regression testing:
//! 1. **Drag anchor**: one anchor dragged sideways across a small image
//! 2. **Twist pose**: a pose pin rotated a quarter turn about the center
//! 3. **Rail slide**: a rail holds one edge while an anchor pulls the body
//! 4. **Seam drag**: an anchor dragged toward a strong vertical boundary

use std::f64::consts::FRAC_PI_2;

use mallea_graph::{GraphOptions, PinKind, ScalarField};
use mallea_math::DVec2;
use mallea_solver::WarpConfig;
use mallea_types::WarpResult;
use serde::{Deserialize, Serialize};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// One anchor dragged 20 units to the right.
    DragAnchor,
    /// Pose pin rotated by 90° over several frames.
    TwistPose,
    /// Rail along the bottom edge, anchor pulled along it.
    RailSlide,
    /// Drag next to a seam in the boundary field.
    SeamDrag,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::DragAnchor,
            ScenarioKind::TwistPose,
            ScenarioKind::RailSlide,
            ScenarioKind::SeamDrag,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::DragAnchor => "drag_anchor",
            ScenarioKind::TwistPose => "twist_pose",
            ScenarioKind::RailSlide => "rail_slide",
            ScenarioKind::SeamDrag => "seam_drag",
        }
    }

    /// Parses a name produced by [`ScenarioKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// How a scripted pin changes from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinMotion {
    /// Never edited.
    Static,
    /// Target moves linearly to `to`, arriving on frame `over`.
    Drag { to: DVec2, over: u32 },
    /// Pose angle and scale move linearly to the given values, arriving on
    /// frame `over`. Only meaningful for pose pins.
    Twist { angle: f64, scale: f64, over: u32 },
}

/// A pin plus the script that edits it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedPin {
    /// Pin geometry on frame 0.
    pub kind: PinKind,
    pub stiffness: f64,
    pub radius: f64,
    pub motion: PinMotion,
}

impl ScriptedPin {
    /// Static pin.
    pub fn fixed(kind: PinKind, stiffness: f64, radius: f64) -> Self {
        Self {
            kind,
            stiffness,
            radius,
            motion: PinMotion::Static,
        }
    }

    /// Same pin with a different script.
    pub fn with_motion(mut self, motion: PinMotion) -> Self {
        self.motion = motion;
        self
    }

    /// Pin geometry on `frame` (1-based; frame 0 is the initial geometry).
    pub fn kind_at(&self, frame: u32) -> PinKind {
        let mut kind = self.kind.clone();
        match self.motion {
            PinMotion::Static => {}
            PinMotion::Drag { to, over } => {
                let t = progress(frame, over);
                if let PinKind::Anchor { target, .. } | PinKind::Pose { target, .. } = &mut kind {
                    *target = target.lerp(to, t);
                }
            }
            PinMotion::Twist {
                angle: to_angle,
                scale: to_scale,
                over,
            } => {
                let t = progress(frame, over);
                if let PinKind::Pose { angle, scale, .. } = &mut kind {
                    *angle += (to_angle - *angle) * t;
                    *scale += (to_scale - *scale) * t;
                }
            }
        }
        kind
    }

    /// Whether the script edits the pin after frame 0.
    pub fn is_animated(&self) -> bool {
        self.motion != PinMotion::Static
    }
}

fn progress(frame: u32, over: u32) -> f64 {
    if over == 0 {
        return 1.0;
    }
    (frame as f64 / over as f64).min(1.0)
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario type.
    pub kind: ScenarioKind,
    /// Session configuration (image size, graph, material, solve settings).
    pub config: WarpConfig,
    /// Pins, added in order before the first frame.
    pub pins: Vec<ScriptedPin>,
    /// Optional boundary field for seam barriers.
    pub boundary: Option<ScalarField>,
    /// Number of frames to run.
    pub frames: u32,
}

impl Scenario {
    /// Create the drag anchor scenario.
    ///
    /// A 100×100 image with about 25 nodes; one anchor at the center
    /// (radius 80, stiffness 1) jumps to (70, 50) on the first frame and is
    /// held there for 5 frames.
    pub fn drag_anchor() -> Self {
        let mut config = WarpConfig::for_image(100.0, 100.0);
        config.graph = GraphOptions::with_nodes(25, 0.1);

        let center = DVec2::new(50.0, 50.0);
        let pin = ScriptedPin::fixed(
            PinKind::Anchor {
                rest: center,
                target: center,
            },
            1.0,
            80.0,
        )
        .with_motion(PinMotion::Drag {
            to: DVec2::new(70.0, 50.0),
            over: 1,
        });

        Self {
            kind: ScenarioKind::DragAnchor,
            config,
            pins: vec![pin],
            boundary: None,
            frames: 5,
        }
    }

    /// Create the twist pose scenario.
    ///
    /// A 200×200 image; a pose pin at the center turns a quarter turn over
    /// 8 frames while a corner anchor keeps the image from spinning freely.
    pub fn twist_pose() -> Self {
        let mut config = WarpConfig::for_image(200.0, 200.0);
        config.graph = GraphOptions::with_nodes(64, 0.1);

        let center = DVec2::new(100.0, 100.0);
        let corner = DVec2::new(10.0, 10.0);
        let twist = ScriptedPin::fixed(
            PinKind::Pose {
                rest: center,
                target: center,
                angle: 0.0,
                scale: 1.0,
            },
            1.0,
            60.0,
        )
        .with_motion(PinMotion::Twist {
            angle: FRAC_PI_2,
            scale: 1.0,
            over: 8,
        });
        let hold = ScriptedPin::fixed(
            PinKind::Anchor {
                rest: corner,
                target: corner,
            },
            1.0,
            40.0,
        );

        Self {
            kind: ScenarioKind::TwistPose,
            config,
            pins: vec![twist, hold],
            boundary: None,
            frames: 10,
        }
    }

    /// Create the rail slide scenario.
    ///
    /// A 200×100 image; a rail along the bottom edge pins it in place while
    /// an anchor above it is pulled 40 units right over 6 frames.
    pub fn rail_slide() -> Self {
        let mut config = WarpConfig::for_image(200.0, 100.0);
        config.graph = GraphOptions::with_nodes(50, 0.1);

        let rail = ScriptedPin::fixed(
            PinKind::Rail {
                points: vec![DVec2::new(0.0, 100.0), DVec2::new(200.0, 100.0)],
            },
            1.0,
            20.0,
        );
        let grab = DVec2::new(100.0, 30.0);
        let drag = ScriptedPin::fixed(
            PinKind::Anchor {
                rest: grab,
                target: grab,
            },
            1.0,
            40.0,
        )
        .with_motion(PinMotion::Drag {
            to: DVec2::new(140.0, 30.0),
            over: 6,
        });

        Self {
            kind: ScenarioKind::RailSlide,
            config,
            pins: vec![rail, drag],
            boundary: None,
            frames: 8,
        }
    }

    /// Create the seam drag scenario.
    ///
    /// A 200×100 image split by a bright vertical seam at x = 100. The left
    /// half is dragged away from the seam while an anchor holds the right
    /// half; the seam barrier keeps the pull from leaking across.
    pub fn seam_drag() -> WarpResult<Self> {
        let mut config = WarpConfig::for_image(200.0, 100.0);
        config.graph = GraphOptions::with_nodes(72, 0.1);

        let boundary = ScalarField::from_fn(200, 100, |x, _| {
            if x.abs_diff(100) <= 3 {
                1.0
            } else {
                0.0
            }
        })?;

        let left = DVec2::new(60.0, 50.0);
        let right = DVec2::new(150.0, 50.0);
        let drag = ScriptedPin::fixed(
            PinKind::Anchor {
                rest: left,
                target: left,
            },
            1.0,
            50.0,
        )
        .with_motion(PinMotion::Drag {
            to: DVec2::new(30.0, 50.0),
            over: 3,
        });
        let hold = ScriptedPin::fixed(
            PinKind::Anchor {
                rest: right,
                target: right,
            },
            1.0,
            40.0,
        );

        Ok(Self {
            kind: ScenarioKind::SeamDrag,
            config,
            pins: vec![drag, hold],
            boundary: Some(boundary),
            frames: 6,
        })
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> WarpResult<Self> {
        Ok(match kind {
            ScenarioKind::DragAnchor => Self::drag_anchor(),
            ScenarioKind::TwistPose => Self::twist_pose(),
            ScenarioKind::RailSlide => Self::rail_slide(),
            ScenarioKind::SeamDrag => Self::seam_drag()?,
        })
    }

    /// Run this scenario with another material preset.
    pub fn with_material(mut self, name: &str) -> Self {
        self.config.material = name.to_string();
        self
    }
}
