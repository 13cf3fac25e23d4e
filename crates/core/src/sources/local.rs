//! Spatially bounded wind sources

use crate::core_types::vec3::{safe_normalize, Vec3};
use serde::{Deserialize, Serialize};

/// Shape and effect of a local source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocalWindKind {
    /// Cylinder along the source direction, `speed` long
    #[default]
    Directional,
    /// Sphere blowing outward from its centre
    Omni,
    /// Sphere swirling around the source direction
    Vortex,
}

/// Per-tick value snapshot of a local source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalWindSource {
    pub active: bool,
    pub kind: LocalWindKind,
    /// Replace the cell velocity instead of adding to it
    pub overwrite: bool,
    pub position: Vec3,
    pub direction: Vec3,
    /// Contribution magnitude; also the cylinder height for `Directional`
    pub speed: f32,
    pub radius: f32,
}

/// Live emitter owned by the host, snapshotted once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalWindEmitter {
    pub enabled: bool,
    pub kind: LocalWindKind,
    pub overwrite: bool,
    pub position: Vec3,
    /// Forward vector of the emitter; normalized when snapshotted
    pub forward: Vec3,
    pub speed: f32,
    pub radius: f32,
}

impl Default for LocalWindEmitter {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: LocalWindKind::Directional,
            overwrite: false,
            position: Vec3::zeros(),
            forward: Vec3::z(),
            speed: 1.0,
            radius: 5.0,
        }
    }
}

impl LocalWindEmitter {
    #[must_use]
    pub fn new(kind: LocalWindKind, position: Vec3, forward: Vec3, speed: f32, radius: f32) -> Self {
        Self {
            kind,
            position,
            forward,
            speed,
            radius,
            ..Default::default()
        }
    }

    /// Mark the emitter as overwriting.
    pub fn overwriting(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// A zero-speed emitter deactivates itself, as does one with any
    /// non-finite parameter.
    pub fn is_active(&self) -> bool {
        self.enabled && self.speed != 0.0 && self.is_finite()
    }

    fn is_finite(&self) -> bool {
        self.position.iter().chain(self.forward.iter()).all(|c| c.is_finite())
            && self.speed.is_finite()
            && self.radius.is_finite()
    }

    pub fn snapshot(&self) -> LocalWindSource {
        LocalWindSource {
            active: self.is_active(),
            kind: self.kind,
            overwrite: self.overwrite,
            position: self.position,
            direction: safe_normalize(&self.forward),
            speed: self.speed,
            radius: self.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let emitter = LocalWindEmitter::default();
        assert_eq!(emitter.speed, 1.0);
        assert_eq!(emitter.radius, 5.0);
        assert!(!emitter.overwrite);
    }

    #[test]
    fn test_zero_speed_deactivates() {
        let emitter = LocalWindEmitter::new(LocalWindKind::Omni, Vec3::zeros(), Vec3::y(), 0.0, 2.0);
        assert!(!emitter.snapshot().active);

        let emitter = LocalWindEmitter { speed: -1.0, ..emitter };
        assert!(emitter.snapshot().active);
    }

    #[test]
    fn test_non_finite_parameters_deactivate() {
        let emitter = LocalWindEmitter::new(LocalWindKind::Omni, Vec3::zeros(), Vec3::y(), 1.0, f32::NAN);
        assert!(!emitter.snapshot().active);

        let emitter = LocalWindEmitter {
            radius: 2.0,
            position: Vec3::new(0.0, f32::INFINITY, 0.0),
            ..emitter
        };
        assert!(!emitter.snapshot().active);

        let emitter = LocalWindEmitter {
            position: Vec3::zeros(),
            speed: f32::NAN,
            ..emitter
        };
        assert!(!emitter.snapshot().active);
    }

    #[test]
    fn test_snapshot_carries_fields() {
        let emitter = LocalWindEmitter::new(
            LocalWindKind::Vortex,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 2.0, 0.0),
            4.0,
            6.0,
        )
        .overwriting();
        let snapshot = emitter.snapshot();
        assert_eq!(snapshot.kind, LocalWindKind::Vortex);
        assert!(snapshot.overwrite);
        assert_eq!(snapshot.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(snapshot.direction, Vec3::y());
        assert_eq!(snapshot.speed, 4.0);
        assert_eq!(snapshot.radius, 6.0);
    }
}
