//! Material database with the built-in warp presets.

use std::collections::HashMap;

use mallea_types::{WarpError, WarpResult};

use crate::properties::WarpMaterial;

/// A named collection of warp material presets.
///
/// Materials are looked up by name (e.g., "rubber", "paper").
/// Custom materials can be registered at runtime.
#[derive(Debug, Clone)]
pub struct MaterialDatabase {
    materials: HashMap<String, WarpMaterial>,
}

impl MaterialDatabase {
    /// Creates a new database with the 5 built-in presets.
    pub fn with_defaults() -> Self {
        let mut db = Self::empty();

        db.materials.insert("balanced".into(), WarpMaterial::default());
        for preset in [rubber(), rigid(), jelly(), paper()] {
            db.materials.insert(preset.name.clone(), preset);
        }

        db
    }

    /// Creates an empty database.
    pub fn empty() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// Registers a material after validating it. Overwrites if the name
    /// already exists.
    pub fn register(&mut self, material: WarpMaterial) -> WarpResult<()> {
        material.validate()?;
        self.materials.insert(material.name.clone(), material);
        Ok(())
    }

    /// Looks up a material by name. Returns `None` if not found.
    pub fn get(&self, name: &str) -> Option<&WarpMaterial> {
        self.materials.get(name)
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn lookup(&self, name: &str) -> WarpResult<&WarpMaterial> {
        self.get(name)
            .ok_or_else(|| WarpError::InvalidMaterial(format!("unknown material '{name}'")))
    }

    /// Returns all registered material names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns true if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialDatabase {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ─── Built-in Presets ─────────────────────────────────────────────────

/// Soft and stretchy. Bulges readily around pins.
fn rubber() -> WarpMaterial {
    WarpMaterial {
        name: "rubber".into(),
        rigidity: 0.25,
        stretch: 0.2,
        shear: 0.4,
        bending: 0.25,
    }
}

/// Nearly rigid. Regions move as a block and rotate as a whole.
fn rigid() -> WarpMaterial {
    WarpMaterial {
        name: "rigid".into(),
        rigidity: 0.95,
        stretch: 0.95,
        shear: 0.9,
        bending: 1.0,
    }
}

/// Very soft. Deformation stays local to the dragged pin.
fn jelly() -> WarpMaterial {
    WarpMaterial {
        name: "jelly".into(),
        rigidity: 0.05,
        stretch: 0.1,
        shear: 0.1,
        bending: 0.0,
    }
}

/// Resists stretching but shears and bends easily.
fn paper() -> WarpMaterial {
    WarpMaterial {
        name: "paper".into(),
        rigidity: 0.6,
        stretch: 0.9,
        shear: 0.3,
        bending: 0.5,
    }
}
