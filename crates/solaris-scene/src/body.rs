//! Body descriptors and the handles that tie them to scene resources.

use std::path::PathBuf;

use glam::Vec3;
use solaris_config::BodyConfig;

use crate::error::SceneError;

/// Handle to a mesh owned by a [`crate::Scene`]. Several bodies may share one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Handle to a body in a [`crate::Scene`]. Ids follow insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub u32);

/// How a body looks, independent of where it is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Appearance {
    /// Image file for the surface; `None` renders the fallback texture.
    pub texture: Option<PathBuf>,
    /// Emissive bodies are drawn unlit (the sun).
    pub emissive: bool,
}

/// Everything needed to place one body at any point in time.
///
/// Angles are in degrees and rates in degrees per second of simulation time.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDescriptor {
    pub name: String,
    pub mesh: Option<MeshId>,
    /// Offset from the parent's centre at `t = 0`, before the orbit rotation.
    pub resting_offset: Vec3,
    pub orbit_rate: f32,
    pub spin_rate: f32,
    /// Fixed rotation about +Z applied beneath the spin.
    pub axial_tilt: f32,
    pub parent: Option<BodyId>,
    pub appearance: Appearance,
}

impl BodyDescriptor {
    /// A still body at the origin with no mesh, parent or texture.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            resting_offset: Vec3::ZERO,
            orbit_rate: 0.0,
            spin_rate: 0.0,
            axial_tilt: 0.0,
            parent: None,
            appearance: Appearance::default(),
        }
    }

    /// Build a descriptor from its config entry.
    ///
    /// The body rests at `(orbit_radius, 0, 0)` from its parent and turns at
    /// `360 / period` degrees per second on each axis.
    pub fn from_config(
        name: impl Into<String>,
        config: &BodyConfig,
        texture: Option<PathBuf>,
    ) -> Result<Self, SceneError> {
        let name = name.into();
        if !config.orbit_radius.is_finite() || config.orbit_radius < 0.0 {
            return Err(SceneError::InvalidBody {
                body: name,
                reason: format!("orbit radius {} must be finite and >= 0", config.orbit_radius),
            });
        }
        for (what, period) in [
            ("orbit period", config.orbit_period),
            ("spin period", config.spin_period),
        ] {
            if !period.is_finite() {
                return Err(SceneError::InvalidBody {
                    body: name,
                    reason: format!("{what} {period} is not finite"),
                });
            }
        }

        Ok(Self {
            resting_offset: Vec3::new(config.orbit_radius, 0.0, 0.0),
            orbit_rate: config.orbit_rate(),
            spin_rate: config.spin_rate(),
            axial_tilt: config.axial_tilt,
            appearance: Appearance {
                texture,
                emissive: config.emissive,
            },
            ..Self::new(name)
        })
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_parent(mut self, parent: BodyId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Reject values that would poison every matrix derived from this body.
    pub(crate) fn validate(&self) -> Result<(), SceneError> {
        let finite = self.resting_offset.is_finite()
            && self.orbit_rate.is_finite()
            && self.spin_rate.is_finite()
            && self.axial_tilt.is_finite();
        if finite {
            Ok(())
        } else {
            Err(SceneError::InvalidBody {
                body: self.name.clone(),
                reason: "offset, rates and tilt must be finite".to_string(),
            })
        }
    }
}
