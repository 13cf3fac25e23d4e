//! Moving spherical obstacles

use crate::core_types::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Per-tick value snapshot of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec3,
    /// World-space velocity over the last tick
    pub velocity: Vec3,
    pub radius: f32,
    pub push_strength: f32,
    pub shadow_strength: f32,
    pub shadow_distance: f32,
}

impl Obstacle {
    /// Whether the solver should consider this obstacle at all: positive
    /// radius and every parameter finite.
    pub fn is_usable(&self) -> bool {
        self.radius > 0.0
            && self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
            && self.radius.is_finite()
            && self.push_strength.is_finite()
            && self.shadow_strength.is_finite()
            && self.shadow_distance.is_finite()
    }
}

/// Live sphere collider. Its velocity is derived from how far it moved
/// between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereObstacle {
    pub position: Vec3,
    pub radius: f32,
    pub push_strength: f32,
    pub shadow_strength: f32,
    pub shadow_distance: f32,
    #[serde(skip)]
    previous_position: Option<Vec3>,
}

impl Default for SphereObstacle {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            radius: 1.0,
            push_strength: 0.05,
            shadow_strength: 1.0,
            shadow_distance: 1.0,
            previous_position: None,
        }
    }
}

impl SphereObstacle {
    #[must_use]
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            ..Default::default()
        }
    }

    /// Move the obstacle; the displacement shows up as velocity in the next snapshot.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Snapshot with velocity `(position - previous) / dt`.
    ///
    /// The first snapshot, or one with `dt <= 0`, reports zero velocity, as
    /// does a displacement that comes out non-finite.
    pub fn snapshot(&mut self, dt: f32) -> Obstacle {
        let velocity = match self.previous_position {
            Some(previous) if dt > 0.0 => (self.position - previous) / dt,
            _ => Vec3::zeros(),
        };
        let velocity = if velocity.iter().all(|c| c.is_finite()) {
            velocity
        } else {
            Vec3::zeros()
        };
        self.previous_position = Some(self.position);

        Obstacle {
            position: self.position,
            velocity,
            radius: self.radius,
            push_strength: self.push_strength,
            shadow_strength: self.shadow_strength,
            shadow_distance: self.shadow_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let obstacle = SphereObstacle::default();
        assert_eq!(obstacle.radius, 1.0);
        assert_eq!(obstacle.push_strength, 0.05);
        assert_eq!(obstacle.shadow_strength, 1.0);
        assert_eq!(obstacle.shadow_distance, 1.0);
    }

    #[test]
    fn test_velocity_from_displacement() {
        let mut obstacle = SphereObstacle::new(Vec3::new(1.0, 0.0, 0.0), 2.0);
        assert_eq!(obstacle.snapshot(0.5).velocity, Vec3::zeros());

        obstacle.set_position(Vec3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(obstacle.snapshot(0.5).velocity, Vec3::new(2.0, 2.0, 0.0));

        // Standing still
        assert_eq!(obstacle.snapshot(0.5).velocity, Vec3::zeros());
    }

    #[test]
    fn test_zero_dt_gives_zero_velocity() {
        let mut obstacle = SphereObstacle::default();
        obstacle.snapshot(0.1);
        obstacle.set_position(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(obstacle.snapshot(0.0).velocity, Vec3::zeros());
    }

    #[test]
    fn test_non_finite_obstacle_is_unusable() {
        let mut obstacle = SphereObstacle::new(Vec3::zeros(), 1.0);
        assert!(obstacle.snapshot(0.1).is_usable());

        obstacle.shadow_strength = f32::NAN;
        assert!(!obstacle.snapshot(0.1).is_usable());

        obstacle.shadow_strength = 1.0;
        obstacle.set_position(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(!obstacle.snapshot(0.1).is_usable());

        // Back to a finite position: the NaN displacement reads as standing still.
        obstacle.set_position(Vec3::zeros());
        let snapshot = obstacle.snapshot(0.1);
        assert_eq!(snapshot.velocity, Vec3::zeros());
        assert!(snapshot.is_usable());

        obstacle.radius = 0.0;
        assert!(!obstacle.snapshot(0.1).is_usable());
    }
}
