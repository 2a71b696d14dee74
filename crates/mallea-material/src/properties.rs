//! Warp material parameters.

use mallea_types::constants::DEFAULT_ARAP_ITERATIONS;
use mallea_types::{WarpError, WarpResult};
use serde::{Deserialize, Serialize};

/// Stiffness multiplier range covered by `rigidity` 0..1.
const MIN_MULTIPLIER: f64 = 0.25;
const MAX_MULTIPLIER: f64 = 4.0;

/// How an image region resists deformation.
///
/// All knobs are normalized to `[0, 1]`:
///
/// | Field | Effect |
/// |---|---|
/// | `rigidity` | Overall coupling strength between control nodes |
/// | `stretch` | Resistance to edge length change |
/// | `shear` | Resistance to angle change |
/// | `bending` | How far a local rotation propagates per frame |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpMaterial {
    /// Preset name (e.g. "rubber").
    pub name: String,
    pub rigidity: f64,
    pub stretch: f64,
    pub shear: f64,
    pub bending: f64,
}

impl WarpMaterial {
    /// Base stiffness multiplier for graph couplings.
    ///
    /// Geometric between 0.25 and 4 over a blend that is half rigidity and
    /// a quarter each stretch and shear. The balanced preset maps to 1.
    pub fn stiffness_multiplier(&self) -> f64 {
        let blend = 0.5 * self.rigidity + 0.25 * (self.stretch + self.shear);
        MIN_MULTIPLIER * (MAX_MULTIPLIER / MIN_MULTIPLIER).powf(blend.clamp(0.0, 1.0))
    }

    /// ARAP iterations per interactive frame: 2 for floppy materials up to 6
    /// for stiff ones, 3 for the balanced preset.
    pub fn solve_iterations(&self) -> u32 {
        let extra = (4.0 * self.bending.clamp(0.0, 1.0)).round() as u32;
        (DEFAULT_ARAP_ITERATIONS - 1 + extra).max(2)
    }

    /// Checks that every knob is in `[0, 1]` and the name is non-empty.
    pub fn validate(&self) -> WarpResult<()> {
        if self.name.trim().is_empty() {
            return Err(WarpError::InvalidMaterial("material name is empty".into()));
        }
        let knobs = [
            ("rigidity", self.rigidity),
            ("stretch", self.stretch),
            ("shear", self.shear),
            ("bending", self.bending),
        ];
        for (field, value) in knobs {
            if !(0.0..=1.0).contains(&value) {
                return Err(WarpError::InvalidMaterial(format!(
                    "{}: {field} must be in [0, 1], got {value}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for WarpMaterial {
    fn default() -> Self {
        Self {
            name: "balanced".into(),
            rigidity: 0.5,
            stretch: 0.5,
            shear: 0.5,
            bending: 0.25,
        }
    }
}
