//! Field-wide wind sources

use crate::core_types::vec3::{safe_normalize, Vec3};
use serde::{Deserialize, Serialize};

/// How a global source acts on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GlobalWindKind {
    /// Uniform push along the source direction
    #[default]
    Directional,
    /// Noise-driven turbulence drifting against the source direction
    Turbulent,
}

/// Per-tick value snapshot of a global source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalWindSource {
    pub active: bool,
    pub kind: GlobalWindKind,
    /// Unit direction (zero if the emitter had no usable direction)
    pub direction: Vec3,
    pub strength: f32,
    pub speed: f32,
    /// Spatial frequency of the turbulence noise
    pub noise_scale: f32,
}

/// Live emitter owned by the host, snapshotted once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalWindEmitter {
    pub enabled: bool,
    pub kind: GlobalWindKind,
    /// Forward vector of the emitter; normalized when snapshotted
    pub forward: Vec3,
    pub strength: f32,
    pub speed: f32,
    pub noise_scale: f32,
}

impl Default for GlobalWindEmitter {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: GlobalWindKind::Directional,
            forward: Vec3::z(),
            strength: 1.0,
            speed: 1.0,
            noise_scale: 1.0,
        }
    }
}

impl GlobalWindEmitter {
    /// Directional emitter blowing along `forward`.
    #[must_use]
    pub fn directional(forward: Vec3, strength: f32, speed: f32) -> Self {
        Self {
            forward,
            strength,
            speed,
            ..Default::default()
        }
    }

    /// Turbulent emitter drifting against `forward`.
    #[must_use]
    pub fn turbulent(forward: Vec3, strength: f32, speed: f32, noise_scale: f32) -> Self {
        Self {
            kind: GlobalWindKind::Turbulent,
            forward,
            strength,
            speed,
            noise_scale,
            ..Default::default()
        }
    }

    /// A zero-strength emitter deactivates itself, as does one with any
    /// non-finite parameter.
    pub fn is_active(&self) -> bool {
        self.enabled && self.strength != 0.0 && self.is_finite()
    }

    fn is_finite(&self) -> bool {
        self.forward.iter().all(|c| c.is_finite())
            && self.strength.is_finite()
            && self.speed.is_finite()
            && self.noise_scale.is_finite()
    }

    pub fn snapshot(&self) -> GlobalWindSource {
        GlobalWindSource {
            active: self.is_active(),
            kind: self.kind,
            direction: safe_normalize(&self.forward),
            strength: self.strength,
            speed: self.speed,
            noise_scale: self.noise_scale,
        }
    }
}
